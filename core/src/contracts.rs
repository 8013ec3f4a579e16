use crate::{
    CellAttributes, CellState, ChangerError, Direction, ModelError, Params, Point,
    UnitAttributes, UnitRef,
};

/// Authoritative store for the board and the team rosters.
///
/// Position-taking operations fail with [`ModelError::OutOfRange`] outside the
/// board. Slot-taking operations fail with [`ModelError::InvalidTeam`] or
/// [`ModelError::InvalidIndex`] for unknown slots and with
/// [`ModelError::DeadUnit`] for tombstones. A failing call never mutates.
pub trait WorldStore {
    /// Number of columns on the board.
    fn width(&self) -> i32;

    /// Number of rows on the board.
    fn height(&self) -> i32;

    /// Number of team rosters.
    fn team_count(&self) -> usize;

    /// Occupancy of a cell.
    fn cell_state(&self, point: Point) -> Result<CellState, ModelError>;

    /// Attributes of the unit occupying a cell.
    fn attributes_at(&self, point: Point) -> Result<CellAttributes, ModelError>;

    /// Roster slot of the unit occupying a cell, if any.
    fn unit_at(&self, point: Point) -> Result<Option<UnitRef>, ModelError>;

    /// Number of living units in a team.
    fn living_count(&self, team: usize) -> Result<usize, ModelError>;

    /// Number of roster slots in a team, tombstones included.
    fn roster_len(&self, team: usize) -> Result<usize, ModelError>;

    /// Reports whether a roster slot holds a living unit.
    fn is_alive(&self, team: usize, index: usize) -> Result<bool, ModelError>;

    /// Attributes of a living unit.
    fn attributes_of(&self, team: usize, index: usize) -> Result<UnitAttributes, ModelError>;

    /// Moves a unit's instruction pointer.
    fn set_instruction(
        &mut self,
        team: usize,
        index: usize,
        instruction: usize,
    ) -> Result<(), ModelError>;

    /// Adds `delta` to a unit's mass and returns the resulting mass.
    fn change_mass(&mut self, team: usize, index: usize, delta: i32) -> Result<i32, ModelError>;

    /// Changes a unit's facing.
    fn set_direction(
        &mut self,
        team: usize,
        index: usize,
        direction: Direction,
    ) -> Result<(), ModelError>;

    /// Moves a unit to another cell, which must be empty or its own.
    fn set_position(&mut self, team: usize, index: usize, point: Point) -> Result<(), ModelError>;

    /// Places a new unit into an empty cell and returns its roster slot.
    fn create_unit_at(
        &mut self,
        point: Point,
        mass: i32,
        direction: Direction,
        team: usize,
        instruction: usize,
    ) -> Result<UnitRef, ModelError>;

    /// Tombstones a roster slot and clears its cell.
    fn kill(&mut self, team: usize, index: usize) -> Result<(), ModelError>;

    /// Adds `delta` to the mass of the unit occupying a cell and returns the resulting mass.
    fn change_mass_at(&mut self, point: Point, delta: i32) -> Result<i32, ModelError>;

    /// Kills the unit occupying a cell and returns its former slot.
    fn kill_at(&mut self, point: Point) -> Result<UnitRef, ModelError>;
}

/// Per-team executor exposing one operation per opcode.
///
/// Operations consume the unit's per-move budget. Once
/// [`ActionExecutor::end_of_move`] reports `true` the caller must stop
/// dispatching for that unit until [`ActionExecutor::clear_after_move`].
pub trait ActionExecutor {
    /// Team the executor is bound to.
    fn team(&self) -> usize;

    /// Number of roster slots covered by the executor's budgets.
    fn roster_len(&self) -> usize;

    /// Reports whether a roster slot holds a living unit.
    fn is_alive(&self, index: usize) -> Result<bool, ChangerError>;

    /// Current instruction pointer of a living unit.
    fn instruction(&self, index: usize) -> Result<usize, ChangerError>;

    /// Reports whether either budget of a unit is exhausted.
    fn end_of_move(&self, index: usize) -> Result<bool, ChangerError>;

    /// Restores full budgets for every living unit.
    fn clear_after_move(&mut self) -> Result<(), ChangerError>;

    /// Gains mass.
    fn eat(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Steps along the current facing.
    fn go(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Produces an offspring in the facing cell.
    fn clon(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Strikes the unit in the facing cell.
    fn str(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Quarter turn to the left.
    fn left(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Quarter turn to the right.
    fn right(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// About-face.
    fn back(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Faces an explicit or random direction.
    fn turn(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Jumps when the unit's mass is greater than the first operand.
    fn jg(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Jumps when the unit's mass is less than the first operand.
    fn jl(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Jumps unconditionally.
    fn j(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;

    /// Jumps when the unit's mass equals the first operand.
    fn je(&mut self, params: &Params, index: usize) -> Result<(), ChangerError>;
}
