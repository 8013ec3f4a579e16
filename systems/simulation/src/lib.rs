#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game loop tying the world, the executors and the interpreter together.
//!
//! A [`Simulation`] owns the only random source, the world and one ledger
//! per team. Each [`Simulation::step`] plays one move: every team in order
//! gets a fresh executor, the interpreter drives all of its living units and
//! the executor restores their budgets before the next team runs.

mod config;

use bacteria_core::{ActionExecutor, ChaChaSource, ChangerError, ModelError};
use bacteria_system_changer::{Changer, Ledger};
use bacteria_system_interpreter::{Assembler, Interpreter, InterpreterError};
use bacteria_world::{make_world, query, World};
use thiserror::Error;
use tracing::info;

pub use config::{load_config, SimulationConfig};

/// Failures raised while setting up or advancing a simulation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// A simulation needs at least one team script.
    #[error("no team scripts were supplied")]
    NoTeams,
    /// Compilation or execution failed.
    #[error(transparent)]
    Interpreter(#[from] InterpreterError),
    /// The world could not be built.
    #[error(transparent)]
    World(#[from] ModelError),
    /// An executor could not be bound to its team.
    #[error(transparent)]
    Changer(#[from] ChangerError),
}

/// State of the board after a completed move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveSummary {
    /// Number of moves played so far.
    pub move_number: u64,
    /// Living units per team.
    pub living: Vec<usize>,
}

impl MoveSummary {
    /// The only team with living units, if exactly one remains.
    #[must_use]
    pub fn winner(&self) -> Option<usize> {
        let mut alive = self
            .living
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(team, _)| team);
        match (alive.next(), alive.next()) {
            (Some(team), None) => Some(team),
            _ => None,
        }
    }
}

/// A running game.
pub struct Simulation {
    world: World,
    rng: ChaChaSource,
    interpreter: Interpreter,
    ledgers: Vec<Ledger>,
    move_number: u64,
}

impl Simulation {
    /// Compiles one script per team and populates a fresh world.
    pub fn new<A, S>(
        config: &SimulationConfig,
        scripts: &[S],
        assembler: &A,
    ) -> Result<Self, SimulationError>
    where
        A: Assembler + ?Sized,
        S: AsRef<str>,
    {
        if scripts.is_empty() {
            return Err(SimulationError::NoTeams);
        }
        let mut interpreter = Interpreter::new();
        interpreter.make_bytecode(scripts, assembler)?;

        let mut rng = config
            .seed()
            .map_or_else(ChaChaSource::from_entropy, ChaChaSource::from_seed);
        let teams = scripts.len();
        let world = make_world(config.world_config(teams), &mut rng)?;
        info!(
            width = config.width(),
            height = config.height(),
            teams,
            seed = ?config.seed(),
            "simulation ready"
        );

        Ok(Self {
            world,
            rng,
            interpreter,
            ledgers: (0..teams).map(Ledger::new).collect(),
            move_number: 0,
        })
    }

    /// Read-only access to the board and rosters.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Loaded team programs.
    #[must_use]
    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Number of moves played.
    #[must_use]
    pub const fn move_number(&self) -> u64 {
        self.move_number
    }

    /// Reports whether the game is over.
    ///
    /// A single-team game ends when its last unit dies; otherwise the game
    /// ends once at most one team still has living units.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        let living = query::living_counts(&self.world);
        let surviving = living.iter().filter(|count| **count > 0).count();
        if living.len() == 1 {
            surviving == 0
        } else {
            surviving <= 1
        }
    }

    /// Plays one move for every team in team order.
    pub fn step(&mut self) -> Result<MoveSummary, SimulationError> {
        for (team, ledger) in self.ledgers.iter_mut().enumerate() {
            let program_len = self
                .interpreter
                .program(team)
                .map_or(0, |program| program.len());
            let mut changer = Changer::new(
                &mut self.world,
                &mut self.rng,
                ledger,
                team,
                self.move_number,
                program_len,
            )?;
            let _ = self.interpreter.make_move(&mut changer)?;
            changer.clear_after_move()?;
        }
        self.move_number += 1;

        let summary = MoveSummary {
            move_number: self.move_number,
            living: query::living_counts(&self.world),
        };
        info!(move_number = summary.move_number, living = ?summary.living, "move finished");
        Ok(summary)
    }

    /// Plays moves until the game is finished or `max_moves` more moves were played.
    pub fn run(&mut self, max_moves: u64) -> Result<MoveSummary, SimulationError> {
        let mut summary = MoveSummary {
            move_number: self.move_number,
            living: query::living_counts(&self.world),
        };
        for _ in 0..max_moves {
            if self.is_finished() {
                break;
            }
            summary = self.step()?;
        }
        if self.is_finished() {
            info!(
                move_number = summary.move_number,
                winner = ?summary.winner(),
                "game over"
            );
        }
        Ok(summary)
    }
}
