use crate::aco::ant::{AcoParams, AntDrone};
use crate::aco::zone::{Cell, DisasterZone, GridPos, ZoneLayout};
use crate::config::AcoConfig;
use crate::swarm::Swarm;
use anyhow::{Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

const TARGET_PERCENTILE: f64 = 80.0;

/// Aggregate metrics of the search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcoMetrics {
    pub coverage: f64,
    pub total_energy: u64,
    pub survivors_found: usize,
    pub total_survivors: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcoSnapshot {
    pub tick: usize,
    pub width: usize,
    pub height: usize,
    pub drones: Vec<GridPos>,
    pub grid: Vec<Cell>,
    pub visited: Vec<bool>,
    pub pheromone: Vec<f64>,
    pub metrics: AcoMetrics,
}

impl AcoSnapshot {
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("coverage", self.metrics.coverage),
            ("total_energy", self.metrics.total_energy as f64),
            ("survivors_found", self.metrics.survivors_found as f64),
        ]
    }
}

/// Schedule of the periodic events of the search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcoSchedule {
    pub evaporation_rate: f64,
    /// New debris falls every `obstacle_period` ticks, offset by half a period.
    pub obstacle_period: usize,
    /// Idle drones are sent to pheromone hot spots every `target_period` ticks.
    pub target_period: usize,
}

impl Default for AcoSchedule {
    fn default() -> Self {
        Self {
            evaporation_rate: 0.1,
            obstacle_period: 20,
            target_period: 15,
        }
    }
}

/// Ant colony of drones searching a disaster zone for survivors.
pub struct AntSwarm {
    zone: DisasterZone,
    drones: Vec<AntDrone>,
    params: AcoParams,
    schedule: AcoSchedule,
    tick: usize,
    history: Vec<AcoSnapshot>,
}

impl AntSwarm {
    /// Build a zone from its configuration and drop the drones on random free cells.
    pub fn generate<R: Rng + ?Sized>(cfg: &AcoConfig, rng: &mut R) -> Result<Self> {
        let layout = ZoneLayout {
            n_debris: cfg.n_debris,
            n_survivors: cfg.n_survivors,
            n_resources: cfg.n_resources,
        };
        let zone = DisasterZone::generate(cfg.width, cfg.height, layout, rng)
            .context("failed to generate zone")?;

        let mut drones = Vec::with_capacity(cfg.n_drones);
        for id in 0..cfg.n_drones {
            let pos = zone
                .random_free_cell(rng)
                .with_context(|| format!("failed to place drone {id}"))?;
            drones.push(AntDrone::new(id, pos));
        }

        let params = AcoParams {
            alpha: cfg.alpha,
            beta: cfg.beta,
            exploration_factor: cfg.exploration_factor,
        };
        let schedule = AcoSchedule {
            evaporation_rate: cfg.evaporation_rate,
            obstacle_period: cfg.obstacle_period,
            target_period: cfg.target_period,
        };

        Ok(Self::new(zone, drones, params, schedule))
    }

    /// Build a swarm from an existing zone and drones.
    pub fn new(
        zone: DisasterZone,
        drones: Vec<AntDrone>,
        params: AcoParams,
        schedule: AcoSchedule,
    ) -> Self {
        let mut swarm = Self {
            zone,
            drones,
            params,
            schedule,
            tick: 0,
            history: Vec::new(),
        };
        swarm.record_state();
        swarm
    }

    pub fn zone(&self) -> &DisasterZone {
        &self.zone
    }

    pub fn drones(&self) -> &[AntDrone] {
        &self.drones
    }

    pub fn calculate_metrics(&self) -> AcoMetrics {
        AcoMetrics {
            coverage: self.zone.coverage(),
            total_energy: self.drones.iter().map(|d| d.energy_consumed() as u64).sum(),
            survivors_found: self.zone.survivors_found(),
            total_survivors: self.zone.total_survivors(),
        }
    }

    /// Send idle drones to random cells in the top pheromone quintile.
    pub fn assign_targets<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let threshold = self.zone.pheromone_percentile(TARGET_PERCENTILE);
        let hot_cells = self.zone.cells_above(threshold);
        if hot_cells.is_empty() {
            return;
        }

        let idle = self.drones.iter_mut().filter(|d| d.target().is_none());
        for drone in idle.take(hot_cells.len()) {
            let target = hot_cells[rng.random_range(0..hot_cells.len())];
            drone.set_target(target);
        }
    }

    fn is_periodic(&self, period: usize, offset: usize) -> bool {
        period > 0 && self.tick > 0 && self.tick % period == offset
    }

    fn record_state(&mut self) {
        self.history.push(AcoSnapshot {
            tick: self.tick,
            width: self.zone.width(),
            height: self.zone.height(),
            drones: self.drones.iter().map(|d| d.pos()).collect(),
            grid: self.zone.grid().to_vec(),
            visited: self.zone.visited_grid().to_vec(),
            pheromone: self.zone.pheromone_grid().to_vec(),
            metrics: self.calculate_metrics(),
        });
    }
}

impl Swarm for AntSwarm {
    type Snapshot = AcoSnapshot;

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.zone.evaporate(self.schedule.evaporation_rate);

        for drone in &mut self.drones {
            drone
                .step(&mut self.zone, &self.params, rng)
                .with_context(|| format!("failed to move drone {}", drone.id()))?;
        }

        let obstacle_period = self.schedule.obstacle_period;
        if self.is_periodic(obstacle_period, obstacle_period / 2) {
            let (center, size) = self.zone.add_dynamic_obstacle(rng);
            log::debug!("tick {}: debris of size {size} fell at {center:?}", self.tick);
        }

        if self.is_periodic(self.schedule.target_period, 0) {
            self.assign_targets(rng);
        }

        self.tick += 1;
        self.record_state();
        Ok(())
    }

    fn tick(&self) -> usize {
        self.tick
    }

    fn is_finished(&self) -> bool {
        self.zone.survivors_found() >= self.zone.total_survivors()
    }

    fn history(&self) -> &[AcoSnapshot] {
        &self.history
    }
}
