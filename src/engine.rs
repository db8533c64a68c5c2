use crate::abc::BeeSwarm;
use crate::aco::AntSwarm;
use crate::config::{Config, SwarmConfig};
use crate::pso::FormationSwarm;
use crate::swarm::Swarm;
use crate::types::{Record, RecordRef, SnapshotRef};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rmp_serde::{decode, encode};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Swarm being simulated.
pub enum Simulation {
    Abc(BeeSwarm),
    Aco(AntSwarm),
    Pso(FormationSwarm),
}

impl Simulation {
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        match self {
            Simulation::Abc(swarm) => swarm.step(rng),
            Simulation::Aco(swarm) => swarm.step(rng),
            Simulation::Pso(swarm) => swarm.step(rng),
        }
    }

    fn is_finished(&self) -> bool {
        match self {
            Simulation::Abc(swarm) => swarm.is_finished(),
            Simulation::Aco(swarm) => swarm.is_finished(),
            Simulation::Pso(swarm) => swarm.is_finished(),
        }
    }

    fn tick(&self) -> usize {
        match self {
            Simulation::Abc(swarm) => swarm.tick(),
            Simulation::Aco(swarm) => swarm.tick(),
            Simulation::Pso(swarm) => swarm.tick(),
        }
    }

    /// Borrowed snapshots of every tick, wrapped for export.
    pub fn snapshots(&self) -> Vec<SnapshotRef<'_>> {
        match self {
            Simulation::Abc(swarm) => swarm.history().iter().map(SnapshotRef::Abc).collect(),
            Simulation::Aco(swarm) => swarm.history().iter().map(SnapshotRef::Aco).collect(),
            Simulation::Pso(swarm) => swarm.history().iter().map(SnapshotRef::Pso).collect(),
        }
    }

    fn latest_metrics(&self) -> Vec<(&'static str, f64)> {
        let metrics = match self {
            Simulation::Abc(swarm) => swarm.latest().map(|s| s.metrics()),
            Simulation::Aco(swarm) => swarm.latest().map(|s| s.metrics()),
            Simulation::Pso(swarm) => swarm.latest().map(|s| s.metrics()),
        };
        metrics.unwrap_or_default()
    }
}

/// Simulation engine.
///
/// Holds the configuration, the simulated swarm and the random number
/// generator shared by every stochastic decision of the run.
pub struct Engine {
    cfg: Config,
    sim: Simulation,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with a freshly generated swarm.
    ///
    /// The generator is seeded once here, with `seed + run_idx` if the
    /// configuration has a seed, and from the OS otherwise.
    pub fn new(cfg: Config, run_idx: usize) -> Result<Self> {
        let mut rng = match cfg.seed {
            Some(seed) => ChaCha12Rng::seed_from_u64(seed.wrapping_add(run_idx as u64)),
            None => ChaCha12Rng::try_from_os_rng()?,
        };

        let sim = match &cfg.swarm {
            SwarmConfig::Abc(abc) => Simulation::Abc(BeeSwarm::generate(abc, &mut rng)),
            SwarmConfig::Aco(aco) => Simulation::Aco(
                AntSwarm::generate(aco, &mut rng).context("failed to generate ant swarm")?,
            ),
            SwarmConfig::Pso(pso) => Simulation::Pso(FormationSwarm::generate(pso, &mut rng)),
        };

        Ok(Self { cfg, sim, rng })
    }

    pub fn cfg(&self) -> &Config {
        &self.cfg
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Run the tick loop until the step budget is spent or the swarm is done.
    pub fn run(&mut self) -> Result<()> {
        let n_steps = self.cfg.swarm.n_steps();
        let steps_per_log = self.cfg.output.steps_per_log;

        for i_step in 0..n_steps {
            self.sim
                .step(&mut self.rng)
                .with_context(|| format!("failed to perform step {i_step}"))?;

            if (i_step + 1) % steps_per_log == 0 {
                let progress = 100.0 * (i_step + 1) as f64 / n_steps as f64;
                let metrics = format_metrics(&self.sim.latest_metrics());
                log::info!("completed {progress:06.2}% ({metrics})");
            }

            if self.sim.is_finished() {
                log::info!("goal reached at step {}", self.sim.tick());
                break;
            }
        }

        Ok(())
    }

    /// Log the end-of-run figures of the swarm.
    pub fn log_summary(&self) {
        log::info!("finished after {} steps", self.sim.tick());
        match &self.sim {
            Simulation::Abc(swarm) => {
                let summary = swarm.summary();
                log::info!("{}", format_metrics(&self.sim.latest_metrics()));
                log::info!(
                    "well pollinated flowers (>=80%): {}/{}",
                    summary.well_pollinated,
                    summary.n_flowers
                );
                for (role, count) in summary.pollinated_by_role {
                    log::info!("flowers pollinated by {role:?} drones: {count}");
                }
            }
            Simulation::Aco(swarm) => {
                let metrics = swarm.calculate_metrics();
                log::info!(
                    "coverage {:.2}%, survivors {}/{}, energy {}",
                    metrics.coverage,
                    metrics.survivors_found,
                    metrics.total_survivors,
                    metrics.total_energy
                );
            }
            Simulation::Pso(swarm) => {
                let (best, fitness) = swarm.global_best();
                log::info!(
                    "best fitness {fitness:.3} at {best:?}, active drones {}/{}",
                    swarm.active_count(),
                    swarm.positions().len()
                );
                if let Some(failure) = swarm.failure() {
                    log::info!("drone {} failed at tick {}", failure.drone, failure.tick);
                }
            }
        }
    }

    /// Write every snapshot to a binary trajectory file.
    ///
    /// The file holds the number of records followed by the records themselves.
    pub fn save_trajectory<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let file = file.as_ref();
        let file = File::create(file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(file);

        let snapshots = self.sim.snapshots();
        encode::write(&mut writer, &snapshots.len()).context("failed to serialize length")?;
        for (step, snapshot) in snapshots.into_iter().enumerate() {
            let record = RecordRef { step, snapshot };
            encode::write(&mut writer, &record).context("failed to serialize record")?;
        }

        writer.flush().context("failed to flush writer stream")?;

        Ok(())
    }
}

/// Read back every record of a trajectory file.
pub fn load_trajectory<P: AsRef<Path>>(file: P) -> Result<Vec<Record>> {
    let file = file.as_ref();
    let file = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut reader = BufReader::new(file);

    let n_records: usize = decode::from_read(&mut reader).context("failed to read length")?;
    let mut records = Vec::with_capacity(n_records);
    for _ in 0..n_records {
        let record = decode::from_read(&mut reader).context("failed to read record")?;
        records.push(record);
    }

    Ok(records)
}

pub fn format_metrics(metrics: &[(&str, f64)]) -> String {
    metrics
        .iter()
        .map(|(name, val)| format!("{name} = {val:.3}"))
        .collect::<Vec<_>>()
        .join(", ")
}
