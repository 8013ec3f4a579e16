#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Action executor that applies one team's instructions to the world.
//!
//! A [`Changer`] lives for a single move and borrows the world, the shared
//! random source and the team's [`Ledger`]. Every opcode resolves a repeat
//! count, then drives its primitive effect through the repeater, which
//! charges the unit's action or pseudo-action budget once per repetition and
//! stops as soon as that budget runs out. Only a fully completed instruction
//! moves the unit's instruction pointer; an interrupted one resumes, partially
//! done, at the unit's next move.

mod ledger;

use bacteria_core::{
    next_instruction, ActionExecutor, CellState, ChangerError, Direction, Opcode, Params, Point,
    RandomSource, WorldStore, CLON_MASS, DEFAULT_CLON_MASS, EAT_MASS, GO_MASS,
    MAX_COMMANDS_PER_INSTRUCTION, MIN_COMMANDS_PER_INSTRUCTION, RANDOM_MAX_ACTIONS, STR_DAMAGE,
    STR_MASS,
};
use tracing::debug;

pub use ledger::Ledger;

/// Outcome of one primitive effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    /// The unit survived; the instruction continues sequentially.
    Done,
    /// The unit survived and the instruction selected a jump target.
    Jump(usize),
    /// The unit died; nothing more may touch its slot.
    Died,
}

#[derive(Clone, Copy, Debug)]
enum Comparison {
    Greater,
    Less,
    Equal,
}

impl Comparison {
    fn holds(self, mass: i32, threshold: i32) -> bool {
        match self {
            Self::Greater => mass > threshold,
            Self::Less => mass < threshold,
            Self::Equal => mass == threshold,
        }
    }
}

/// Per-move executor bound to one team.
pub struct Changer<'a, W: ?Sized, R: ?Sized> {
    world: &'a mut W,
    rng: &'a mut R,
    ledger: &'a mut Ledger,
    team: usize,
    move_number: u64,
    program_len: usize,
}

impl<'a, W, R> Changer<'a, W, R>
where
    W: WorldStore + ?Sized,
    R: RandomSource + ?Sized,
{
    /// Binds an executor to `team` for move `move_number`.
    ///
    /// The ledger is extended to cover every roster slot that exists now;
    /// units created later in the move only gain budgets at
    /// [`ActionExecutor::clear_after_move`].
    pub fn new(
        world: &'a mut W,
        rng: &'a mut R,
        ledger: &'a mut Ledger,
        team: usize,
        move_number: u64,
        program_len: usize,
    ) -> Result<Self, ChangerError> {
        let roster_len = world.roster_len(team)?;
        ledger.cover(roster_len);
        Ok(Self {
            world,
            rng,
            ledger,
            team,
            move_number,
            program_len,
        })
    }

    /// Move the executor was created for.
    #[must_use]
    pub const fn move_number(&self) -> u64 {
        self.move_number
    }

    /// Length of the team program.
    #[must_use]
    pub const fn program_len(&self) -> usize {
        self.program_len
    }

    fn repeat_count(
        &mut self,
        opcode: Opcode,
        params: &Params,
        index: usize,
    ) -> Result<u32, ChangerError> {
        if let Some(pending) = self.ledger.pending(index)? {
            return Ok(pending);
        }
        if params.special {
            return Ok(1 + self.rng.random(RANDOM_MAX_ACTIONS));
        }
        match params.operand1() {
            Some(value) => check_commands_number(opcode, value),
            None => Ok(1),
        }
    }

    fn repeater<F>(
        &mut self,
        opcode: Opcode,
        index: usize,
        commands: u32,
        mut effect: F,
    ) -> Result<(), ChangerError>
    where
        F: FnMut(&mut Self, usize) -> Result<Step, ChangerError>,
    {
        let instruction = self.world.attributes_of(self.team, index)?.instruction;
        self.ledger.begin(index, commands)?;

        let class = opcode.budget_class();
        let mut jump = None;
        let mut finished = false;
        while self.ledger.completed(index)? < commands && !finished {
            finished = !self.ledger.spend(class, index)?;
            match effect(self, index)? {
                Step::Done => {}
                Step::Jump(target) => jump = Some(target),
                Step::Died => {
                    self.ledger.reset_progress(index)?;
                    return Ok(());
                }
            }
        }

        if self.ledger.completed(index)? >= commands {
            self.ledger.reset_progress(index)?;
            let next = jump.unwrap_or_else(|| next_instruction(instruction, self.program_len));
            self.world.set_instruction(self.team, index, next)?;
        }
        Ok(())
    }

    fn next_point(&self, index: usize) -> Result<Point, ChangerError> {
        let attributes = self.world.attributes_of(self.team, index)?;
        Ok(step_towards(
            attributes.position,
            attributes.direction,
            self.world.width(),
            self.world.height(),
        ))
    }

    fn die(&mut self, index: usize, cause: &'static str) -> Result<Step, ChangerError> {
        self.world.kill(self.team, index)?;
        debug!(
            team = self.team,
            index,
            move_number = self.move_number,
            cause,
            "unit died"
        );
        Ok(Step::Died)
    }

    fn eat_effect(&mut self, index: usize) -> Result<Step, ChangerError> {
        let _ = self.world.change_mass(self.team, index, EAT_MASS)?;
        Ok(Step::Done)
    }

    fn go_effect(&mut self, index: usize) -> Result<Step, ChangerError> {
        let mass = self.world.change_mass(self.team, index, GO_MASS)?;
        if mass <= 0 {
            return self.die(index, "exhausted while moving");
        }
        let destination = self.next_point(index)?;
        if self.world.cell_state(destination)? == CellState::Empty {
            self.world.set_position(self.team, index, destination)?;
        }
        Ok(Step::Done)
    }

    fn clon_effect(&mut self, index: usize) -> Result<Step, ChangerError> {
        let mass = self.world.change_mass(self.team, index, CLON_MASS)?;
        let target = self.next_point(index)?;
        if mass < 0 {
            return self.die(index, "exhausted while cloning");
        }
        if mass == 0 {
            let step = self.die(index, "spent on its offspring")?;
            self.spawn(target)?;
            return Ok(step);
        }
        self.spawn(target)?;
        Ok(Step::Done)
    }

    fn spawn(&mut self, target: Point) -> Result<(), ChangerError> {
        if self.world.cell_state(target)? == CellState::Empty {
            let direction = Direction::random(&mut *self.rng);
            let offspring =
                self.world
                    .create_unit_at(target, DEFAULT_CLON_MASS, direction, self.team, 0)?;
            debug!(
                team = self.team,
                index = offspring.index,
                move_number = self.move_number,
                "offspring created"
            );
        } else {
            let _ = self.world.change_mass_at(target, DEFAULT_CLON_MASS)?;
        }
        Ok(())
    }

    fn str_effect(&mut self, index: usize) -> Result<Step, ChangerError> {
        let mass = self.world.change_mass(self.team, index, STR_MASS)?;
        if mass <= 0 {
            return self.die(index, "exhausted while striking");
        }
        let position = self.world.attributes_of(self.team, index)?.position;
        let target = self.next_point(index)?;
        if target == position || self.world.unit_at(target)?.is_none() {
            return Ok(Step::Done);
        }
        if self.world.change_mass_at(target, STR_DAMAGE)? <= 0 {
            let victim = self.world.kill_at(target)?;
            debug!(
                team = self.team,
                index,
                victim_team = victim.team,
                victim_index = victim.index,
                move_number = self.move_number,
                "unit struck down"
            );
        }
        Ok(Step::Done)
    }

    fn rotate_effect(
        &mut self,
        index: usize,
        rotate: fn(Direction) -> Direction,
    ) -> Result<Step, ChangerError> {
        let direction = self.world.attributes_of(self.team, index)?.direction;
        self.world.set_direction(self.team, index, rotate(direction))?;
        Ok(Step::Done)
    }

    fn face_effect(&mut self, index: usize, facing: Option<Direction>) -> Result<Step, ChangerError> {
        let direction = match facing {
            Some(direction) => direction,
            None => Direction::random(&mut *self.rng),
        };
        self.world.set_direction(self.team, index, direction)?;
        Ok(Step::Done)
    }

    fn compare_effect(
        &mut self,
        index: usize,
        comparison: Comparison,
        threshold: i32,
        target: usize,
    ) -> Result<Step, ChangerError> {
        let mass = self.world.attributes_of(self.team, index)?.mass;
        if comparison.holds(mass, threshold) {
            Ok(Step::Jump(target))
        } else {
            Ok(Step::Done)
        }
    }

    fn jump_target(&self, opcode: Opcode, operand: Option<i32>) -> Result<usize, ChangerError> {
        let value = operand.ok_or(ChangerError::MissingOperand { opcode })?;
        usize::try_from(value)
            .ok()
            .filter(|target| *target < self.program_len)
            .ok_or(ChangerError::InvalidOperand { opcode, value })
    }

    fn repeated(
        &mut self,
        opcode: Opcode,
        params: &Params,
        index: usize,
        effect: fn(&mut Self, usize) -> Result<Step, ChangerError>,
    ) -> Result<(), ChangerError> {
        let commands = self.repeat_count(opcode, params, index)?;
        self.repeater(opcode, index, commands, effect)
    }

    fn conditional_jump(
        &mut self,
        opcode: Opcode,
        comparison: Comparison,
        params: &Params,
        index: usize,
    ) -> Result<(), ChangerError> {
        let threshold = params
            .operand1()
            .ok_or(ChangerError::MissingOperand { opcode })?;
        let target = self.jump_target(opcode, params.operand2())?;
        self.repeater(opcode, index, 1, move |changer: &mut Self, index| {
            changer.compare_effect(index, comparison, threshold, target)
        })
    }
}

impl<'a, W, R> ActionExecutor for Changer<'a, W, R>
where
    W: WorldStore + ?Sized,
    R: RandomSource + ?Sized,
{
    fn team(&self) -> usize {
        self.team
    }

    fn roster_len(&self) -> usize {
        self.ledger.len()
    }

    fn is_alive(&self, index: usize) -> Result<bool, ChangerError> {
        Ok(self.world.is_alive(self.team, index)?)
    }

    fn instruction(&self, index: usize) -> Result<usize, ChangerError> {
        Ok(self.world.attributes_of(self.team, index)?.instruction)
    }

    fn end_of_move(&self, index: usize) -> Result<bool, ChangerError> {
        self.ledger.is_exhausted(index)
    }

    fn clear_after_move(&mut self) -> Result<(), ChangerError> {
        let roster_len = self.world.roster_len(self.team)?;
        self.ledger.cover(roster_len);
        for index in 0..roster_len {
            if self.world.is_alive(self.team, index)? {
                self.ledger.refill(index)?;
            }
        }
        Ok(())
    }

    fn eat(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.repeated(Opcode::Eat, params, index, Self::eat_effect)
    }

    fn go(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.repeated(Opcode::Go, params, index, Self::go_effect)
    }

    fn clon(&mut self, _params: &Params, index: usize) -> Result<(), ChangerError> {
        self.repeater(Opcode::Clon, index, 1, Self::clon_effect)
    }

    fn str(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.repeated(Opcode::Str, params, index, Self::str_effect)
    }

    fn left(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.repeated(Opcode::Left, params, index, |changer, index| {
            changer.rotate_effect(index, Direction::turned_left)
        })
    }

    fn right(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.repeated(Opcode::Right, params, index, |changer, index| {
            changer.rotate_effect(index, Direction::turned_right)
        })
    }

    fn back(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.repeated(Opcode::Back, params, index, |changer, index| {
            changer.rotate_effect(index, Direction::reversed)
        })
    }

    fn turn(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        let facing = match params.operand1() {
            Some(value) if !params.special => Some(
                u32::try_from(value)
                    .ok()
                    .and_then(Direction::from_index)
                    .ok_or(ChangerError::InvalidOperand {
                        opcode: Opcode::Turn,
                        value,
                    })?,
            ),
            _ => None,
        };
        self.repeater(Opcode::Turn, index, 1, move |changer: &mut Self, index| {
            changer.face_effect(index, facing)
        })
    }

    fn jg(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.conditional_jump(Opcode::Jg, Comparison::Greater, params, index)
    }

    fn jl(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.conditional_jump(Opcode::Jl, Comparison::Less, params, index)
    }

    fn j(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        let target = self.jump_target(Opcode::J, params.operand1())?;
        self.repeater(Opcode::J, index, 1, move |_: &mut Self, _| Ok(Step::Jump(target)))
    }

    fn je(&mut self, params: &Params, index: usize) -> Result<(), ChangerError> {
        self.conditional_jump(Opcode::Je, Comparison::Equal, params, index)
    }
}

/// Validates an explicit repeat count.
fn check_commands_number(opcode: Opcode, value: i32) -> Result<u32, ChangerError> {
    let greater = value > MIN_COMMANDS_PER_INSTRUCTION;
    let less = value < MAX_COMMANDS_PER_INSTRUCTION;
    if greater && less {
        u32::try_from(value).map_err(|_| ChangerError::InvalidOperand { opcode, value })
    } else {
        Err(ChangerError::InvalidOperand { opcode, value })
    }
}

/// Neighbour of `from` along `direction`, clamped to the board.
fn step_towards(from: Point, direction: Direction, width: i32, height: i32) -> Point {
    let mut point = from;
    match direction {
        Direction::Left if point.x > 0 => point.x -= 1,
        Direction::Right if point.x < width - 1 => point.x += 1,
        Direction::Backward if point.y > 0 => point.y -= 1,
        Direction::Forward if point.y < height - 1 => point.y += 1,
        _ => {}
    }
    point
}
