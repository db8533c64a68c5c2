use crate::pso::FormationKind;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seed of the random number generator (seeded from the OS if absent).
    #[serde(default)]
    pub seed: Option<u64>,

    pub swarm: SwarmConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Swarm to simulate, tagged by `kind`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SwarmConfig {
    Abc(AbcConfig),
    Aco(AcoConfig),
    Pso(PsoConfig),
}

impl SwarmConfig {
    /// Tick budget of the simulation.
    pub fn n_steps(&self) -> usize {
        match self {
            SwarmConfig::Abc(cfg) => cfg.n_steps,
            SwarmConfig::Aco(cfg) => cfg.n_steps,
            SwarmConfig::Pso(cfg) => cfg.n_steps,
        }
    }
}

/// Bee colony parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbcConfig {
    pub n_workers: usize,
    pub n_observers: usize,
    pub n_scouts: usize,
    /// Side of the square greenhouse.
    pub greenhouse_size: f64,
    pub n_flowers: usize,
    pub n_steps: usize,
}

impl Default for AbcConfig {
    fn default() -> Self {
        Self {
            n_workers: 8,
            n_observers: 4,
            n_scouts: 3,
            greenhouse_size: 20.0,
            n_flowers: 50,
            n_steps: 200,
        }
    }
}

/// Ant colony parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
    pub n_drones: usize,
    pub width: usize,
    pub height: usize,
    pub n_debris: usize,
    pub n_survivors: usize,
    pub n_resources: usize,
    pub alpha: f64,
    pub beta: f64,
    pub exploration_factor: f64,
    pub evaporation_rate: f64,
    /// Ticks between debris falls (0 disables them).
    pub obstacle_period: usize,
    /// Ticks between target assignments (0 disables them).
    pub target_period: usize,
    pub n_steps: usize,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            n_drones: 12,
            width: 30,
            height: 30,
            n_debris: 40,
            n_survivors: 15,
            n_resources: 10,
            alpha: 1.0,
            beta: 2.0,
            exploration_factor: 0.1,
            evaporation_rate: 0.1,
            obstacle_period: 20,
            target_period: 15,
            n_steps: 150,
        }
    }
}

/// Particle swarm parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
    pub n_drones: usize,
    pub n_steps: usize,
    pub formation: FormationKind,
    /// Disable one drone halfway through the run.
    pub fault_tolerance: bool,
}

impl Default for PsoConfig {
    fn default() -> Self {
        Self {
            n_drones: 15,
            n_steps: 60,
            formation: FormationKind::Dragon,
            fault_tolerance: true,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Number of steps between progress messages.
    pub steps_per_log: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { steps_per_log: 20 }
    }
}

impl Config {
    /// Load a [`Config`] from a TOML file and validate it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;
        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;
        config.validate().context("failed to validate config")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.swarm {
            SwarmConfig::Abc(cfg) => validate_abc(cfg)?,
            SwarmConfig::Aco(cfg) => validate_aco(cfg)?,
            SwarmConfig::Pso(cfg) => validate_pso(cfg)?,
        }

        check_num(self.output.steps_per_log, 1..).context("invalid number of steps per log")?;

        Ok(())
    }
}

fn validate_abc(cfg: &AbcConfig) -> Result<()> {
    check_num(cfg.n_workers, 0..10_000).context("invalid number of workers")?;
    check_num(cfg.n_observers, 0..10_000).context("invalid number of observers")?;
    check_num(cfg.n_scouts, 0..10_000).context("invalid number of scouts")?;
    check_num(cfg.greenhouse_size, 4.0..10_000.0).context("invalid greenhouse size")?;
    check_num(cfg.n_flowers, 0..100_000).context("invalid number of flowers")?;
    check_num(cfg.n_steps, 0..1_000_000).context("invalid number of steps")?;
    Ok(())
}

fn validate_aco(cfg: &AcoConfig) -> Result<()> {
    check_num(cfg.n_drones, 0..10_000).context("invalid number of drones")?;
    check_num(cfg.width, 1..10_000).context("invalid zone width")?;
    check_num(cfg.height, 1..10_000).context("invalid zone height")?;
    check_num(cfg.n_debris, 0..100_000).context("invalid number of debris clusters")?;
    check_num(cfg.n_survivors, 0..100_000).context("invalid number of survivors")?;
    check_num(cfg.n_resources, 0..100_000).context("invalid number of resources")?;
    check_num(cfg.alpha, 0.0..100.0).context("invalid pheromone exponent")?;
    check_num(cfg.beta, 0.0..100.0).context("invalid heuristic exponent")?;
    check_num(cfg.exploration_factor, 0.0..=1.0).context("invalid exploration factor")?;
    check_num(cfg.evaporation_rate, 0.0..=1.0).context("invalid evaporation rate")?;
    check_num(cfg.n_steps, 0..1_000_000).context("invalid number of steps")?;

    let n_cells = cfg.width * cfg.height;
    let n_placed = cfg.n_survivors + cfg.n_resources + cfg.n_drones;
    if n_placed > n_cells {
        bail!("{n_placed} survivors, resources and drones do not fit in {n_cells} cells");
    }
    Ok(())
}

fn validate_pso(cfg: &PsoConfig) -> Result<()> {
    check_num(cfg.n_drones, 0..10_000).context("invalid number of drones")?;
    check_num(cfg.n_steps, 0..1_000_000).context("invalid number of steps")?;
    Ok(())
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}
