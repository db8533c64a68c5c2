use crate::abc::bee::{BeeDrone, BeeRole, BeeState};
use crate::abc::greenhouse::{ChargingStation, Flower, Greenhouse};
use crate::config::AbcConfig;
use crate::space::Point;
use crate::swarm::Swarm;
use anyhow::{Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

const WELL_POLLINATED: f64 = 80.0;

/// Bee drone as seen in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeeView {
    pub id: usize,
    pub role: BeeRole,
    pub pos: Point,
    pub state: BeeState,
    pub battery: f64,
}

/// Aggregate metrics of the colony.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbcMetrics {
    pub avg_pollination: f64,
    pub total_energy: f64,
    pub total_visits: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcSnapshot {
    pub tick: usize,
    pub drones: Vec<BeeView>,
    pub flowers: Vec<Flower>,
    pub stations: Vec<ChargingStation>,
    pub metrics: AbcMetrics,
}

impl AbcSnapshot {
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("avg_pollination", self.metrics.avg_pollination),
            ("total_energy", self.metrics.total_energy),
            ("total_visits", self.metrics.total_visits as f64),
        ]
    }
}

/// End-of-run summary of the colony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcSummary {
    pub metrics: AbcMetrics,
    pub well_pollinated: usize,
    pub n_flowers: usize,
    /// Flowers brought to full pollination, per role.
    pub pollinated_by_role: Vec<(BeeRole, u32)>,
}

/// Artificial bee colony pollinating a greenhouse.
pub struct BeeSwarm {
    greenhouse: Greenhouse,
    drones: Vec<BeeDrone>,
    tick: usize,
    history: Vec<AbcSnapshot>,
}

impl BeeSwarm {
    /// Build a colony from its configuration. Drones spawn away from the walls.
    pub fn generate<R: Rng + ?Sized>(cfg: &AbcConfig, rng: &mut R) -> Self {
        let size = cfg.greenhouse_size;
        let greenhouse = Greenhouse::generate(size, size, cfg.n_flowers, rng);

        let roles = [
            (BeeRole::Worker, cfg.n_workers),
            (BeeRole::Observer, cfg.n_observers),
            (BeeRole::Scout, cfg.n_scouts),
        ];
        let mut drones = Vec::with_capacity(cfg.n_workers + cfg.n_observers + cfg.n_scouts);
        for (role, count) in roles {
            for _ in 0..count {
                let pos = Point::new(
                    rng.random_range(2.0..=size - 2.0),
                    rng.random_range(2.0..=size - 2.0),
                );
                drones.push(BeeDrone::new(drones.len(), role, pos));
            }
        }

        Self::new(greenhouse, drones)
    }

    /// Build a colony from an existing greenhouse and drones.
    pub fn new(greenhouse: Greenhouse, drones: Vec<BeeDrone>) -> Self {
        let mut swarm = Self {
            greenhouse,
            drones,
            tick: 0,
            history: Vec::new(),
        };
        swarm.record_state();
        swarm
    }

    pub fn greenhouse(&self) -> &Greenhouse {
        &self.greenhouse
    }

    pub fn drones(&self) -> &[BeeDrone] {
        &self.drones
    }

    pub fn calculate_metrics(&self) -> AbcMetrics {
        AbcMetrics {
            avg_pollination: self.greenhouse.avg_pollination(),
            total_energy: self.drones.iter().map(|d| d.battery()).sum(),
            total_visits: self.greenhouse.total_visits(),
        }
    }

    pub fn summary(&self) -> AbcSummary {
        let well_pollinated = self
            .greenhouse
            .flowers()
            .iter()
            .filter(|f| f.pollination_level() >= WELL_POLLINATED)
            .count();

        let pollinated_by_role = BeeRole::ALL
            .iter()
            .map(|&role| {
                let count = self
                    .drones
                    .iter()
                    .filter(|d| d.role() == role)
                    .map(|d| d.stats().flowers_pollinated)
                    .sum();
                (role, count)
            })
            .collect();

        AbcSummary {
            metrics: self.calculate_metrics(),
            well_pollinated,
            n_flowers: self.greenhouse.flowers().len(),
            pollinated_by_role,
        }
    }

    fn record_state(&mut self) {
        let drones = self
            .drones
            .iter()
            .map(|d| BeeView {
                id: d.id(),
                role: d.role(),
                pos: d.pos(),
                state: d.state(),
                battery: d.battery(),
            })
            .collect();

        self.history.push(AbcSnapshot {
            tick: self.tick,
            drones,
            flowers: self.greenhouse.flowers().to_vec(),
            stations: self.greenhouse.stations().to_vec(),
            metrics: self.calculate_metrics(),
        });
    }
}

impl Swarm for BeeSwarm {
    type Snapshot = AbcSnapshot;

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        self.greenhouse.age_flowers(rng);

        for drone in &mut self.drones {
            drone
                .update(&mut self.greenhouse, rng)
                .with_context(|| format!("failed to update drone {}", drone.id()))?;
        }

        self.tick += 1;
        self.record_state();
        Ok(())
    }

    fn tick(&self) -> usize {
        self.tick
    }

    fn history(&self) -> &[AbcSnapshot] {
        &self.history
    }
}
