#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bacteria engine.
//!
//! This crate defines the vocabulary that connects the authoritative world
//! store, the action executor and the bytecode driver. The world owns every
//! unit and the occupancy grid, the executor mutates it one primitive effect
//! at a time through the [`WorldStore`] contract, and the driver feeds
//! decoded [`Instruction`] values to an [`ActionExecutor`] until each unit's
//! per-move budget runs out.

use serde::{Deserialize, Serialize};

mod contracts;
mod error;
mod random;

pub use contracts::{ActionExecutor, WorldStore};
pub use error::{ChangerError, ModelError};
pub use random::{ChaChaSource, RandomSource};

/// Mass assigned to every unit placed during world initialization.
pub const DEFAULT_MASS: i32 = 5;

/// Smallest permitted board width.
pub const MIN_WIDTH: i32 = 5;

/// Largest permitted board width.
pub const MAX_WIDTH: i32 = 500;

/// Smallest permitted board height.
pub const MIN_HEIGHT: i32 = 5;

/// Largest permitted board height.
pub const MAX_HEIGHT: i32 = 500;

/// Mass gained by a single `eat` effect.
pub const EAT_MASS: i32 = 1;

/// Mass change applied by a single `go` effect.
pub const GO_MASS: i32 = -1;

/// Mass change paid by a unit that clones itself.
pub const CLON_MASS: i32 = -10;

/// Mass of a freshly cloned unit, also granted to an occupied clone target.
pub const DEFAULT_CLON_MASS: i32 = 5;

/// Mass change paid by a unit that strikes its neighbour.
pub const STR_MASS: i32 = -1;

/// Mass change inflicted on the unit that receives a strike.
pub const STR_DAMAGE: i32 = -3;

/// Action budget granted to every unit at the start of a move.
pub const MAX_ACTIONS: u32 = 1;

/// Pseudo-action budget granted to every unit at the start of a move.
pub const MAX_PSEUDO_ACTIONS: u32 = 30;

/// Upper bound (inclusive) of a randomly drawn repeat count.
pub const RANDOM_MAX_ACTIONS: u32 = 5;

/// Exclusive lower bound for an explicit repeat count.
pub const MIN_COMMANDS_PER_INSTRUCTION: i32 = 0;

/// Exclusive upper bound for an explicit repeat count.
pub const MAX_COMMANDS_PER_INSTRUCTION: i32 = 100;

/// Sentinel stored in [`Params`] when an operand was not supplied.
pub const NO_OPERAND: i32 = -1;

/// Location of a single board cell.
///
/// Coordinates are signed so that neighbour arithmetic can step past the
/// board edge before being clamped or rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    /// Zero-based column.
    pub x: i32,
    /// Zero-based row.
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Facing of a unit.
///
/// `Left` and `Right` move along the x axis, `Forward` and `Backward` along
/// the y axis (`Forward` increases y).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards decreasing x.
    Left,
    /// Towards increasing y.
    Forward,
    /// Towards increasing x.
    Right,
    /// Towards decreasing y.
    Backward,
}

impl Direction {
    /// Every facing in index order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Forward,
        Direction::Right,
        Direction::Backward,
    ];

    /// Resolves a facing from its numeric index in `0..4`.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }

    /// Draws a facing uniformly from `rng`.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
    {
        match rng.random(4) {
            0 => Self::Left,
            1 => Self::Forward,
            2 => Self::Right,
            _ => Self::Backward,
        }
    }

    /// Numeric index of the facing.
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Left => 0,
            Self::Forward => 1,
            Self::Right => 2,
            Self::Backward => 3,
        }
    }

    /// Facing after a quarter turn to the right.
    #[must_use]
    pub const fn turned_right(self) -> Self {
        match self {
            Self::Left => Self::Forward,
            Self::Forward => Self::Right,
            Self::Right => Self::Backward,
            Self::Backward => Self::Left,
        }
    }

    /// Facing after a quarter turn to the left.
    #[must_use]
    pub const fn turned_left(self) -> Self {
        match self {
            Self::Left => Self::Backward,
            Self::Forward => Self::Left,
            Self::Right => Self::Forward,
            Self::Backward => Self::Right,
        }
    }

    /// Facing after an about-face.
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Forward => Self::Backward,
            Self::Right => Self::Left,
            Self::Backward => Self::Forward,
        }
    }
}

/// Occupancy of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// No unit occupies the cell.
    Empty,
    /// A living unit occupies the cell.
    Occupied,
}

/// Identifies a roster slot: the team and the stable index within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitRef {
    /// Team owning the slot.
    pub team: usize,
    /// Index of the slot within the team roster.
    pub index: usize,
}

impl UnitRef {
    /// Creates a new slot reference.
    #[must_use]
    pub const fn new(team: usize, index: usize) -> Self {
        Self { team, index }
    }
}

/// Attributes of the unit occupying a cell, as seen from the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellAttributes {
    /// Current mass of the unit.
    pub mass: i32,
    /// Current facing of the unit.
    pub direction: Direction,
    /// Team owning the unit.
    pub team: usize,
}

/// Attributes of a unit, as seen from its roster slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitAttributes {
    /// Cell the unit occupies.
    pub position: Point,
    /// Current mass of the unit.
    pub mass: i32,
    /// Current facing of the unit.
    pub direction: Direction,
    /// Index of the next instruction in the team program.
    pub instruction: usize,
}

/// Budget a primitive effect draws from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BudgetClass {
    /// Mass and movement effects.
    Action,
    /// Orientation and control-flow effects.
    PseudoAction,
}

/// The fixed instruction set understood by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// Gain mass.
    Eat,
    /// Step along the current facing.
    Go,
    /// Produce an offspring in the facing cell.
    Clon,
    /// Strike the unit in the facing cell.
    Str,
    /// Quarter turn to the left.
    Left,
    /// Quarter turn to the right.
    Right,
    /// About-face.
    Back,
    /// Face an explicit or random direction.
    Turn,
    /// Jump when mass is greater than the operand.
    Jg,
    /// Jump when mass is less than the operand.
    Jl,
    /// Unconditional jump.
    J,
    /// Jump when mass equals the operand.
    Je,
}

impl Opcode {
    /// Every opcode in dispatch-table order.
    pub const ALL: [Opcode; 12] = [
        Opcode::Eat,
        Opcode::Go,
        Opcode::Clon,
        Opcode::Str,
        Opcode::Left,
        Opcode::Right,
        Opcode::Back,
        Opcode::Turn,
        Opcode::Jg,
        Opcode::Jl,
        Opcode::J,
        Opcode::Je,
    ];

    /// Budget consumed by every repetition of the opcode.
    #[must_use]
    pub const fn budget_class(self) -> BudgetClass {
        match self {
            Self::Eat | Self::Go | Self::Clon | Self::Str => BudgetClass::Action,
            Self::Left
            | Self::Right
            | Self::Back
            | Self::Turn
            | Self::Jg
            | Self::Jl
            | Self::J
            | Self::Je => BudgetClass::PseudoAction,
        }
    }

    /// Reports whether the opcode may replace the sequential successor.
    #[must_use]
    pub const fn is_jump(self) -> bool {
        matches!(self, Self::Jg | Self::Jl | Self::J | Self::Je)
    }
}

/// Operands of a decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Params {
    /// First operand, or [`NO_OPERAND`].
    pub p1: i32,
    /// Second operand, or [`NO_OPERAND`].
    pub p2: i32,
    /// Marks an instruction whose repeat count or facing is randomized.
    pub special: bool,
}

impl Params {
    /// Creates operands from raw values.
    #[must_use]
    pub const fn new(p1: i32, p2: i32, special: bool) -> Self {
        Self { p1, p2, special }
    }

    /// Operands for an instruction written without arguments.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(NO_OPERAND, NO_OPERAND, false)
    }

    /// Operands for an instruction carrying a single argument.
    #[must_use]
    pub const fn one(p1: i32) -> Self {
        Self::new(p1, NO_OPERAND, false)
    }

    /// Operands for an instruction carrying two arguments.
    #[must_use]
    pub const fn two(p1: i32, p2: i32) -> Self {
        Self::new(p1, p2, false)
    }

    /// Operands for a randomized instruction.
    #[must_use]
    pub const fn special() -> Self {
        Self::new(NO_OPERAND, NO_OPERAND, true)
    }

    /// First operand when present.
    #[must_use]
    pub const fn operand1(&self) -> Option<i32> {
        if self.p1 == NO_OPERAND {
            None
        } else {
            Some(self.p1)
        }
    }

    /// Second operand when present.
    #[must_use]
    pub const fn operand2(&self) -> Option<i32> {
        if self.p2 == NO_OPERAND {
            None
        } else {
            Some(self.p2)
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::none()
    }
}

/// A single decoded bytecode instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    /// Operation to dispatch.
    pub opcode: Opcode,
    /// Operands handed to the operation.
    pub params: Params,
}

impl Instruction {
    /// Creates a new instruction.
    #[must_use]
    pub const fn new(opcode: Opcode, params: Params) -> Self {
        Self { opcode, params }
    }

    /// Creates an instruction without operands.
    #[must_use]
    pub const fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Params::none())
    }
}

/// Sequential successor of `pointer` in a program of `program_len`
/// instructions, wrapping to the first instruction past the end.
#[must_use]
pub const fn next_instruction(pointer: usize, program_len: usize) -> usize {
    if pointer + 1 < program_len {
        pointer + 1
    } else {
        0
    }
}
