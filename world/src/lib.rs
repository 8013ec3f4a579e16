#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bacteria.
//!
//! Units live in a flat arena owned by the [`World`]. Team rosters and the
//! board both hold arena slots rather than references, so a unit is found in
//! O(1) from either its cell or its `(team, index)` pair. Roster slots are
//! never reused: a dead unit leaves a tombstone behind and keeps every other
//! index stable for the rest of the simulation.

mod occupancy;

use bacteria_core::{
    CellAttributes, CellState, Direction, ModelError, Point, RandomSource, UnitAttributes,
    UnitRef, WorldStore, DEFAULT_MASS, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
};
use tracing::{debug, info};

use occupancy::{OccupancyGrid, Slot};

/// Parameters required to build a populated world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    width: i32,
    height: i32,
    bacteria_per_team: usize,
    teams: usize,
}

impl WorldConfig {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(width: i32, height: i32, bacteria_per_team: usize, teams: usize) -> Self {
        Self {
            width,
            height,
            bacteria_per_team,
            teams,
        }
    }

    /// Requested board width.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Requested board height.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Units placed for every team during initialization.
    #[must_use]
    pub const fn bacteria_per_team(&self) -> usize {
        self.bacteria_per_team
    }

    /// Number of teams.
    #[must_use]
    pub const fn teams(&self) -> usize {
        self.teams
    }
}

/// Builds a world from `config`, placing every initial unit with `rng`.
///
/// Dimensions must lie within `[5, 500]` and the total unit count may not
/// exceed half the board. Both checks run before any unit is placed.
pub fn make_world<R>(config: WorldConfig, rng: &mut R) -> Result<World, ModelError>
where
    R: RandomSource + ?Sized,
{
    let mut world = World::empty(config.width, config.height, config.teams)?;
    let cells = world.grid.cell_count();
    let units = config
        .bacteria_per_team
        .checked_mul(config.teams)
        .ok_or(ModelError::TooManyUnits {
            units: usize::MAX,
            cells,
        })?;
    if units > cells / 2 {
        return Err(ModelError::TooManyUnits { units, cells });
    }

    for team in 0..config.teams {
        for _ in 0..config.bacteria_per_team {
            world.place_randomly(team, rng);
        }
    }

    info!(
        width = config.width,
        height = config.height,
        teams = config.teams,
        units,
        "world initialized"
    );
    Ok(world)
}

/// Represents the authoritative Bacteria world state.
#[derive(Clone, Debug)]
pub struct World {
    units: Vec<Unit>,
    rosters: Vec<Vec<Option<Slot>>>,
    grid: OccupancyGrid,
}

impl World {
    /// Creates a board without units.
    pub fn empty(width: i32, height: i32, teams: usize) -> Result<Self, ModelError> {
        let width_ok = (MIN_WIDTH..=MAX_WIDTH).contains(&width);
        let height_ok = (MIN_HEIGHT..=MAX_HEIGHT).contains(&height);
        if !(width_ok && height_ok) {
            return Err(ModelError::InvalidDimensions { width, height });
        }

        Ok(Self {
            units: Vec::new(),
            rosters: vec![Vec::new(); teams],
            grid: OccupancyGrid::new(width, height),
        })
    }

    fn place_randomly<R>(&mut self, team: usize, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        let mut point = self.random_point(rng);
        while !self.grid.is_free(point) {
            point = self.random_point(rng);
        }
        let direction = Direction::random(rng);
        let _ = self.insert(point, DEFAULT_MASS, direction, team, 0);
    }

    fn random_point<R>(&self, rng: &mut R) -> Point
    where
        R: RandomSource + ?Sized,
    {
        let x = rng.random(self.grid.width().unsigned_abs());
        let y = rng.random(self.grid.height().unsigned_abs());
        Point::new(to_coordinate(x), to_coordinate(y))
    }

    fn insert(
        &mut self,
        point: Point,
        mass: i32,
        direction: Direction,
        team: usize,
        instruction: usize,
    ) -> UnitRef {
        let slot = Slot(self.units.len());
        let roster = &mut self.rosters[team];
        let unit = UnitRef::new(team, roster.len());
        roster.push(Some(slot));
        self.units.push(Unit {
            unit,
            position: point,
            mass,
            direction,
            instruction,
        });
        self.grid.occupy(slot, point);
        unit
    }

    fn check_point(&self, point: Point) -> Result<(), ModelError> {
        if self.grid.contains(point) {
            Ok(())
        } else {
            Err(ModelError::OutOfRange {
                x: point.x,
                y: point.y,
            })
        }
    }

    fn roster(&self, team: usize) -> Result<&[Option<Slot>], ModelError> {
        self.rosters
            .get(team)
            .map(Vec::as_slice)
            .ok_or(ModelError::InvalidTeam { team })
    }

    fn live_slot(&self, team: usize, index: usize) -> Result<Slot, ModelError> {
        let roster = self.roster(team)?;
        let entry = roster
            .get(index)
            .ok_or(ModelError::InvalidIndex { team, index })?;
        entry.ok_or(ModelError::DeadUnit { team, index })
    }

    fn unit(&self, team: usize, index: usize) -> Result<&Unit, ModelError> {
        let Slot(slot) = self.live_slot(team, index)?;
        Ok(&self.units[slot])
    }

    fn unit_mut(&mut self, team: usize, index: usize) -> Result<&mut Unit, ModelError> {
        let Slot(slot) = self.live_slot(team, index)?;
        Ok(&mut self.units[slot])
    }

    fn occupant(&self, point: Point) -> Result<Option<&Unit>, ModelError> {
        self.check_point(point)?;
        Ok(self.grid.occupant(point).map(|Slot(slot)| &self.units[slot]))
    }

    fn occupant_ref(&self, point: Point) -> Result<UnitRef, ModelError> {
        self.occupant(point)?
            .map(|unit| unit.unit)
            .ok_or(ModelError::EmptyCell {
                x: point.x,
                y: point.y,
            })
    }
}

impl WorldStore for World {
    fn width(&self) -> i32 {
        self.grid.width()
    }

    fn height(&self) -> i32 {
        self.grid.height()
    }

    fn team_count(&self) -> usize {
        self.rosters.len()
    }

    fn cell_state(&self, point: Point) -> Result<CellState, ModelError> {
        Ok(match self.occupant(point)? {
            Some(_) => CellState::Occupied,
            None => CellState::Empty,
        })
    }

    fn attributes_at(&self, point: Point) -> Result<CellAttributes, ModelError> {
        let unit = self.occupant(point)?.ok_or(ModelError::EmptyCell {
            x: point.x,
            y: point.y,
        })?;
        Ok(CellAttributes {
            mass: unit.mass,
            direction: unit.direction,
            team: unit.unit.team,
        })
    }

    fn unit_at(&self, point: Point) -> Result<Option<UnitRef>, ModelError> {
        Ok(self.occupant(point)?.map(|unit| unit.unit))
    }

    fn living_count(&self, team: usize) -> Result<usize, ModelError> {
        Ok(self.roster(team)?.iter().flatten().count())
    }

    fn roster_len(&self, team: usize) -> Result<usize, ModelError> {
        Ok(self.roster(team)?.len())
    }

    fn is_alive(&self, team: usize, index: usize) -> Result<bool, ModelError> {
        match self.live_slot(team, index) {
            Ok(_) => Ok(true),
            Err(ModelError::DeadUnit { .. }) => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn attributes_of(&self, team: usize, index: usize) -> Result<UnitAttributes, ModelError> {
        let unit = self.unit(team, index)?;
        Ok(UnitAttributes {
            position: unit.position,
            mass: unit.mass,
            direction: unit.direction,
            instruction: unit.instruction,
        })
    }

    fn set_instruction(
        &mut self,
        team: usize,
        index: usize,
        instruction: usize,
    ) -> Result<(), ModelError> {
        self.unit_mut(team, index)?.instruction = instruction;
        Ok(())
    }

    fn change_mass(&mut self, team: usize, index: usize, delta: i32) -> Result<i32, ModelError> {
        let unit = self.unit_mut(team, index)?;
        unit.mass = unit.mass.saturating_add(delta);
        Ok(unit.mass)
    }

    fn set_direction(
        &mut self,
        team: usize,
        index: usize,
        direction: Direction,
    ) -> Result<(), ModelError> {
        self.unit_mut(team, index)?.direction = direction;
        Ok(())
    }

    fn set_position(&mut self, team: usize, index: usize, point: Point) -> Result<(), ModelError> {
        let slot = self.live_slot(team, index)?;
        self.check_point(point)?;
        match self.grid.occupant(point) {
            Some(other) if other != slot => {
                return Err(ModelError::CellOccupied {
                    x: point.x,
                    y: point.y,
                });
            }
            Some(_) => return Ok(()),
            None => {}
        }

        let unit = &mut self.units[slot.0];
        let from = unit.position;
        unit.position = point;
        self.grid.vacate(from);
        self.grid.occupy(slot, point);
        Ok(())
    }

    fn create_unit_at(
        &mut self,
        point: Point,
        mass: i32,
        direction: Direction,
        team: usize,
        instruction: usize,
    ) -> Result<UnitRef, ModelError> {
        self.check_point(point)?;
        let _ = self.roster(team)?;
        if !self.grid.is_free(point) {
            return Err(ModelError::CellOccupied {
                x: point.x,
                y: point.y,
            });
        }

        let unit = self.insert(point, mass, direction, team, instruction);
        debug!(team, index = unit.index, x = point.x, y = point.y, mass, "unit created");
        Ok(unit)
    }

    fn kill(&mut self, team: usize, index: usize) -> Result<(), ModelError> {
        let Slot(slot) = self.live_slot(team, index)?;
        let position = self.units[slot].position;
        self.rosters[team][index] = None;
        self.grid.vacate(position);
        debug!(team, index, x = position.x, y = position.y, "unit died");
        Ok(())
    }

    fn change_mass_at(&mut self, point: Point, delta: i32) -> Result<i32, ModelError> {
        let UnitRef { team, index } = self.occupant_ref(point)?;
        self.change_mass(team, index, delta)
    }

    fn kill_at(&mut self, point: Point) -> Result<UnitRef, ModelError> {
        let unit = self.occupant_ref(point)?;
        self.kill(unit.team, unit.index)?;
        Ok(unit)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bacteria_core::{Direction, Point, UnitRef};

    use super::{OccupancyGrid, World};

    /// Captures a read-only view of every living unit.
    #[must_use]
    pub fn unit_view(world: &World) -> UnitView {
        let mut snapshots: Vec<UnitSnapshot> = world
            .rosters
            .iter()
            .flatten()
            .flatten()
            .map(|slot| {
                let unit = &world.units[slot.0];
                UnitSnapshot {
                    unit: unit.unit,
                    position: unit.position,
                    mass: unit.mass,
                    direction: unit.direction,
                    instruction: unit.instruction,
                }
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.unit);
        UnitView { snapshots }
    }

    /// Exposes a read-only view of the board.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView { world, grid: &world.grid }
    }

    /// Number of living units of every team, in team order.
    #[must_use]
    pub fn living_counts(world: &World) -> Vec<usize> {
        world
            .rosters
            .iter()
            .map(|roster| roster.iter().flatten().count())
            .collect()
    }

    /// Read-only snapshot describing all living units.
    #[derive(Clone, Debug, Default)]
    pub struct UnitView {
        snapshots: Vec<UnitSnapshot>,
    }

    impl UnitView {
        /// Iterator over the captured snapshots ordered by team, then roster index.
        pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured units.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no unit is alive.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<UnitSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single unit's state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct UnitSnapshot {
        /// Roster slot of the unit.
        pub unit: UnitRef,
        /// Cell occupied by the unit.
        pub position: Point,
        /// Current mass.
        pub mass: i32,
        /// Current facing.
        pub direction: Direction,
        /// Current instruction pointer.
        pub instruction: usize,
    }

    /// Read-only view into the dense occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        world: &'a World,
        grid: &'a OccupancyGrid,
    }

    impl<'a> OccupancyView<'a> {
        /// Returns the unit occupying the provided cell, if any.
        #[must_use]
        pub fn occupant(&self, point: Point) -> Option<UnitRef> {
            self.grid
                .occupant(point)
                .map(|slot| self.world.units[slot.0].unit)
        }

        /// Reports whether the cell lies on the board and holds no unit.
        #[must_use]
        pub fn is_free(&self, point: Point) -> bool {
            self.grid.contains(point) && self.grid.is_free(point)
        }

        /// Iterates over every occupied cell in row-major order.
        pub fn occupied(&self) -> impl Iterator<Item = (Point, UnitRef)> + 'a {
            let world = self.world;
            let grid = self.grid;
            grid.cells()
                .iter()
                .enumerate()
                .filter_map(move |(index, cell)| {
                    let slot = (*cell)?;
                    let point = grid.point_of(index)?;
                    Some((point, world.units[slot.0].unit))
                })
        }

        /// Provides the dimensions of the board.
        #[must_use]
        pub fn dimensions(&self) -> (i32, i32) {
            (self.grid.width(), self.grid.height())
        }
    }
}

#[derive(Clone, Debug)]
struct Unit {
    unit: UnitRef,
    position: Point,
    mass: i32,
    direction: Direction,
    instruction: usize,
}

fn to_coordinate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
