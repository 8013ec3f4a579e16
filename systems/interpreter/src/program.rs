use bacteria_core::{Instruction, Opcode};
use thiserror::Error;

/// Reasons a sequence of instructions cannot form a program.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    /// A program needs at least one instruction.
    #[error("program contains no instructions")]
    Empty,
    /// A jump was written without the operand naming its target.
    #[error("{opcode:?} at {position} has no target")]
    MissingTarget {
        /// Offset of the offending instruction.
        position: usize,
        /// Jump opcode.
        opcode: Opcode,
    },
    /// A jump names an instruction outside the program.
    #[error("{opcode:?} at {position} targets {target}, past the {len} instructions of the program")]
    TargetOutOfRange {
        /// Offset of the offending instruction.
        position: usize,
        /// Jump opcode.
        opcode: Opcode,
        /// Requested target.
        target: i32,
        /// Number of instructions in the program.
        len: usize,
    },
}

/// Failure reported by an [`Assembler`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    /// The script text could not be parsed.
    #[error("line {line}: {message}")]
    Syntax {
        /// One-based line of the script.
        line: usize,
        /// Human readable reason.
        message: String,
    },
    /// The parsed instructions do not form a valid program.
    #[error(transparent)]
    Program(#[from] ProgramError),
}

/// Compiler turning a team script into bytecode.
pub trait Assembler {
    /// Compiles one script.
    fn assemble(&self, script: &str) -> Result<Program, AssemblyError>;
}

/// Immutable bytecode of one team.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Validates and wraps a decoded instruction sequence.
    ///
    /// Every jump must name a target inside the program, so a unit's
    /// instruction pointer can never leave it.
    pub fn new(instructions: Vec<Instruction>) -> Result<Self, ProgramError> {
        if instructions.is_empty() {
            return Err(ProgramError::Empty);
        }
        let len = instructions.len();
        for (position, instruction) in instructions.iter().enumerate() {
            let opcode = instruction.opcode;
            let target = match opcode {
                Opcode::J => instruction.params.operand1(),
                Opcode::Jg | Opcode::Jl | Opcode::Je => {
                    if instruction.params.operand1().is_none() {
                        return Err(ProgramError::MissingTarget { position, opcode });
                    }
                    instruction.params.operand2()
                }
                _ => continue,
            };
            let target = target.ok_or(ProgramError::MissingTarget { position, opcode })?;
            let inside = usize::try_from(target).map_or(false, |target| target < len);
            if !inside {
                return Err(ProgramError::TargetOutOfRange {
                    position,
                    opcode,
                    target,
                    len,
                });
            }
        }
        Ok(Self { instructions })
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Reports whether the program has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instruction at `pointer`.
    #[must_use]
    pub fn get(&self, pointer: usize) -> Option<&Instruction> {
        self.instructions.get(pointer)
    }

    /// The whole instruction sequence.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }
}
