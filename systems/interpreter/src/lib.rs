#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Driver that runs every unit's bytecode for one move.
//!
//! The interpreter owns one [`Program`] per team. A move walks the team
//! roster in index order, skipping tombstones, and for each living unit
//! repeatedly fetches the instruction at its pointer and dispatches it to the
//! team's [`ActionExecutor`] until the executor reports the end of the unit's
//! move or the unit dies.

mod program;

use bacteria_core::{ActionExecutor, ChangerError, Instruction, Opcode};
use thiserror::Error;
use tracing::{debug, info};

pub use program::{Assembler, AssemblyError, Program, ProgramError};

/// Failures surfaced by the driver.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterpreterError {
    /// The assembler rejected the script of a team.
    #[error("script of team {team} failed to compile")]
    Compile {
        /// Team whose script failed.
        team: usize,
        /// Reason reported by the assembler.
        #[source]
        source: AssemblyError,
    },
    /// No program is loaded for the executor's team.
    #[error("no program loaded for team {team}")]
    MissingProgram {
        /// Team without a program.
        team: usize,
    },
    /// A unit's instruction pointer lies outside its team program.
    #[error("unit {index} of team {team} points at instruction {pointer}, past the program end")]
    PointerOutOfRange {
        /// Team of the unit.
        team: usize,
        /// Roster index of the unit.
        index: usize,
        /// Offending pointer.
        pointer: usize,
    },
    /// The executor rejected an instruction.
    #[error("unit {index} of team {team} failed to execute")]
    Changer {
        /// Team of the unit.
        team: usize,
        /// Roster index of the unit.
        index: usize,
        /// Reason reported by the executor.
        #[source]
        source: ChangerError,
    },
}

/// Holds the team programs and drives moves through them.
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    programs: Vec<Program>,
}

impl Interpreter {
    /// Creates an interpreter without programs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an interpreter from already validated programs, one per team.
    #[must_use]
    pub fn from_programs(programs: Vec<Program>) -> Self {
        Self { programs }
    }

    /// Compiles one script per team, in team order.
    ///
    /// All scripts are compiled before any program is replaced; on failure the
    /// previously loaded programs remain in place.
    pub fn make_bytecode<A, S>(
        &mut self,
        scripts: &[S],
        assembler: &A,
    ) -> Result<(), InterpreterError>
    where
        A: Assembler + ?Sized,
        S: AsRef<str>,
    {
        let programs = scripts
            .iter()
            .enumerate()
            .map(|(team, script)| {
                assembler
                    .assemble(script.as_ref())
                    .map_err(|source| InterpreterError::Compile { team, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!(teams = programs.len(), "bytecode loaded");
        self.programs = programs;
        Ok(())
    }

    /// Number of loaded programs.
    #[must_use]
    pub fn team_count(&self) -> usize {
        self.programs.len()
    }

    /// Program of `team`.
    #[must_use]
    pub fn program(&self, team: usize) -> Option<&Program> {
        self.programs.get(team)
    }

    /// Runs one move for every living unit of the executor's team.
    ///
    /// Returns the number of dispatched instructions. Units created during
    /// the move are not visited until the next one.
    pub fn make_move<E>(&self, executor: &mut E) -> Result<usize, InterpreterError>
    where
        E: ActionExecutor + ?Sized,
    {
        let team = executor.team();
        let program = self
            .program(team)
            .ok_or(InterpreterError::MissingProgram { team })?;
        let failed = |index: usize| {
            move |source: ChangerError| InterpreterError::Changer {
                team,
                index,
                source,
            }
        };

        let roster_len = executor.roster_len();
        let mut dispatched = 0;
        for index in 0..roster_len {
            if !executor.is_alive(index).map_err(failed(index))? {
                continue;
            }
            while !executor.end_of_move(index).map_err(failed(index))? {
                let pointer = executor.instruction(index).map_err(failed(index))?;
                let instruction =
                    program
                        .get(pointer)
                        .ok_or(InterpreterError::PointerOutOfRange {
                            team,
                            index,
                            pointer,
                        })?;
                dispatch(executor, instruction, index).map_err(failed(index))?;
                dispatched += 1;
                if !executor.is_alive(index).map_err(failed(index))? {
                    break;
                }
            }
        }
        debug!(team, units = roster_len, dispatched, "team moved");
        Ok(dispatched)
    }
}

/// Routes one instruction to the matching executor operation.
pub fn dispatch<E>(
    executor: &mut E,
    instruction: &Instruction,
    index: usize,
) -> Result<(), ChangerError>
where
    E: ActionExecutor + ?Sized,
{
    let params = &instruction.params;
    match instruction.opcode {
        Opcode::Eat => executor.eat(params, index),
        Opcode::Go => executor.go(params, index),
        Opcode::Clon => executor.clon(params, index),
        Opcode::Str => executor.str(params, index),
        Opcode::Left => executor.left(params, index),
        Opcode::Right => executor.right(params, index),
        Opcode::Back => executor.back(params, index),
        Opcode::Turn => executor.turn(params, index),
        Opcode::Jg => executor.jg(params, index),
        Opcode::Jl => executor.jl(params, index),
        Opcode::J => executor.j(params, index),
        Opcode::Je => executor.je(params, index),
    }
}
