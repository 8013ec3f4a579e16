use thiserror::Error;

use crate::Opcode;

/// Misuse of the world store. Every failing operation leaves the store untouched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    /// Board dimensions fall outside the permitted range.
    #[error("board of {width}x{height} cells is out of the allowed range")]
    InvalidDimensions {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// More units were requested than half the board can hold.
    #[error("{units} units do not fit on a board of {cells} cells")]
    TooManyUnits {
        /// Requested number of units across all teams.
        units: usize,
        /// Number of cells on the board.
        cells: usize,
    },
    /// A coordinate lies outside the board.
    #[error("cell ({x}, {y}) is out of range")]
    OutOfRange {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },
    /// A team id does not name an existing roster.
    #[error("team {team} is out of range")]
    InvalidTeam {
        /// Requested team.
        team: usize,
    },
    /// A roster index lies past the end of the team roster.
    #[error("unit index {index} is out of range for team {team}")]
    InvalidIndex {
        /// Team of the requested slot.
        team: usize,
        /// Requested roster index.
        index: usize,
    },
    /// The requested roster slot is a tombstone.
    #[error("unit {index} of team {team} is dead")]
    DeadUnit {
        /// Team of the requested slot.
        team: usize,
        /// Requested roster index.
        index: usize,
    },
    /// A unit was expected in an empty cell.
    #[error("cell ({x}, {y}) is empty")]
    EmptyCell {
        /// Column of the cell.
        x: i32,
        /// Row of the cell.
        y: i32,
    },
    /// A unit cannot be placed into an occupied cell.
    #[error("cell ({x}, {y}) is already occupied")]
    CellOccupied {
        /// Column of the cell.
        x: i32,
        /// Row of the cell.
        y: i32,
    },
}

/// Failures raised while executing a unit's instruction.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChangerError {
    /// An operand lies outside the range accepted by the opcode.
    #[error("invalid operand {value} for {opcode:?}")]
    InvalidOperand {
        /// Opcode that rejected the operand.
        opcode: Opcode,
        /// Offending operand.
        value: i32,
    },
    /// An opcode that requires an operand received none.
    #[error("{opcode:?} requires an operand")]
    MissingOperand {
        /// Opcode missing its operand.
        opcode: Opcode,
    },
    /// The executor has no budget slot for the unit.
    #[error("unit index {index} is out of range for the executor")]
    InvalidIndex {
        /// Requested roster index.
        index: usize,
    },
    /// A budget counter would have gone below zero.
    ///
    /// Correct drivers stop at `end_of_move`, so this signals a broken
    /// dispatch loop rather than a recoverable condition.
    #[error("too many commands for one move (team {team}, unit {index})")]
    TooManyCommands {
        /// Team of the unit.
        team: usize,
        /// Roster index of the unit.
        index: usize,
    },
    /// The world store rejected an operation.
    #[error(transparent)]
    World(#[from] ModelError),
}

impl ChangerError {
    /// Reports whether the error is an invariant violation rather than misuse by content.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::TooManyCommands { .. })
    }
}
