use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use bacteria_core::{MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use bacteria_world::WorldConfig;
use serde::Deserialize;
use tracing::warn;

/// Parameters of a simulation run.
///
/// The number of teams is not configured here; it follows from the number of
/// scripts handed to [`crate::Simulation::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    width: i32,
    height: i32,
    bacteria_per_team: usize,
    #[serde(default)]
    seed: Option<u64>,
}

impl SimulationConfig {
    /// Creates a configuration seeded from entropy.
    #[must_use]
    pub const fn new(width: i32, height: i32, bacteria_per_team: usize) -> Self {
        Self {
            width,
            height,
            bacteria_per_team,
            seed: None,
        }
    }

    /// Fixes the seed of the shared random source.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse simulation config toml contents")?;
        config.validate()?;
        Ok(config)
    }

    /// Board width in cells.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Board height in cells.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Units placed per team at construction.
    #[must_use]
    pub const fn bacteria_per_team(&self) -> usize {
        self.bacteria_per_team
    }

    /// Seed of the shared random source, if fixed.
    #[must_use]
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// World parameters for `teams` teams.
    #[must_use]
    pub const fn world_config(&self, teams: usize) -> WorldConfig {
        WorldConfig::new(self.width, self.height, self.bacteria_per_team, teams)
    }

    fn validate(&self) -> Result<()> {
        let width_ok = (MIN_WIDTH..=MAX_WIDTH).contains(&self.width);
        let height_ok = (MIN_HEIGHT..=MAX_HEIGHT).contains(&self.height);
        if !(width_ok && height_ok) {
            warn!(
                width = self.width,
                height = self.height,
                "rejected simulation config"
            );
            bail!(
                "board of {}x{} cells is outside {MIN_WIDTH}..={MAX_WIDTH} by {MIN_HEIGHT}..={MAX_HEIGHT}",
                self.width,
                self.height
            );
        }
        Ok(())
    }
}

/// Reads a simulation config from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<SimulationConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read simulation config {}", path.display()))?;
    SimulationConfig::from_toml_str(&contents)
        .with_context(|| format!("invalid simulation config {}", path.display()))
}
