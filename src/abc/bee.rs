use crate::abc::greenhouse::{Flower, Greenhouse};
use crate::space::Point;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const MAX_BATTERY: f64 = 100.0;
const CHARGING_RATE: f64 = 5.0;
const CHARGED_BATTERY: f64 = 95.0;
const LOW_BATTERY: f64 = 20.0;
const CONSUMPTION_RATE: f64 = 0.5;

const SPEED: f64 = 0.3;
const DISCOVERY_RADIUS: f64 = 3.0;
const STATION_REACH: f64 = 0.5;
const FLOWER_REACH: f64 = 0.3;
const WANDER_STEP: f64 = 2.0;

/// Role of a bee drone in the colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeeRole {
    /// Exploits flowers of known quality.
    Worker,
    /// Follows high-maturity, under-pollinated flowers.
    Observer,
    /// Favors rarely visited flowers.
    Scout,
}

impl BeeRole {
    pub const ALL: [BeeRole; 3] = [BeeRole::Worker, BeeRole::Observer, BeeRole::Scout];

    /// Probability of wandering instead of selecting a known flower.
    pub fn exploration_factor(self) -> f64 {
        match self {
            BeeRole::Worker => 0.1,
            BeeRole::Observer => 0.05,
            BeeRole::Scout => 0.3,
        }
    }

    pub fn pollination_efficiency(self) -> f64 {
        match self {
            BeeRole::Worker => 1.0,
            BeeRole::Observer => 0.8,
            BeeRole::Scout => 0.6,
        }
    }

    /// Selection weight of a known flower given its remembered quality.
    fn flower_weight<R: Rng + ?Sized>(self, flower: &Flower, memory: Option<f64>, rng: &mut R) -> f64 {
        let base = memory.unwrap_or(flower.maturity() as f64);
        match self {
            BeeRole::Worker => base * (1.0 - flower.visits() as f64 * 0.1).max(0.0),
            BeeRole::Observer => {
                let maturity_bonus = flower.maturity() as f64 * 2.0;
                let pollination_penalty = (1.0 - flower.pollination_level() / 100.0).max(0.1);
                base * maturity_bonus * pollination_penalty
            }
            BeeRole::Scout => {
                let visit_weight = (1.0 - flower.visits() as f64 * 0.2).max(0.1);
                visit_weight * rng.random_range(0.5..1.5)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeeState {
    Exploring,
    Pollinating,
    Charging,
    Returning,
}

/// Cumulative work done by a bee drone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeeStats {
    pub flowers_pollinated: u32,
    pub total_pollination: f64,
    pub distance_traveled: f64,
    pub charging_time: u32,
}

/// Drone behaving like a honey bee.
#[derive(Debug, Clone)]
pub struct BeeDrone {
    id: usize,
    role: BeeRole,
    pos: Point,
    battery: f64,
    state: BeeState,
    target: Option<usize>,
    known_flowers: Vec<usize>,
    flower_memory: HashMap<usize, f64>,
    path: Vec<Point>,
    stats: BeeStats,
}

impl BeeDrone {
    pub fn new(id: usize, role: BeeRole, pos: Point) -> Self {
        Self {
            id,
            role,
            pos,
            battery: MAX_BATTERY,
            state: BeeState::Exploring,
            target: None,
            known_flowers: Vec::new(),
            flower_memory: HashMap::new(),
            path: vec![pos],
            stats: BeeStats::default(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn role(&self) -> BeeRole {
        self.role
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn state(&self) -> BeeState {
        self.state
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn known_flowers(&self) -> &[usize] {
        &self.known_flowers
    }

    pub fn flower_memory(&self, id: usize) -> Option<f64> {
        self.flower_memory.get(&id).copied()
    }

    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn stats(&self) -> &BeeStats {
        &self.stats
    }

    /// Head for the given flower on the next update.
    pub fn assign_target(&mut self, flower_id: usize) {
        self.target = Some(flower_id);
        self.state = BeeState::Pollinating;
    }

    /// Advance the drone by one tick.
    pub fn update<R: Rng + ?Sized>(&mut self, greenhouse: &mut Greenhouse, rng: &mut R) -> Result<()> {
        self.update_battery();
        self.update_known_flowers(greenhouse);

        match (self.state, self.target) {
            (BeeState::Returning, _) => {
                if let Some(station) = greenhouse.nearest_station(self.pos) {
                    let distance = self.move_toward(station.pos);
                    if distance < STATION_REACH {
                        self.state = BeeState::Charging;
                    }
                }
            }
            (BeeState::Charging, _) => {}
            (BeeState::Pollinating, Some(flower_id)) => {
                let Some(flower) = greenhouse.flower_mut(flower_id) else {
                    self.state = BeeState::Exploring;
                    self.target = None;
                    return Ok(());
                };
                let distance = self.move_toward(flower.pos());
                if distance < FLOWER_REACH {
                    self.pollinate(flower);
                    self.state = BeeState::Exploring;
                    self.target = None;
                }
            }
            _ => self.explore(greenhouse, rng).context("failed to explore")?,
        }

        Ok(())
    }

    /// Charge while docked, otherwise drain the battery by the last distance moved.
    pub fn update_battery(&mut self) {
        if self.state == BeeState::Charging {
            self.battery = (self.battery + CHARGING_RATE).min(MAX_BATTERY);
            self.stats.charging_time += 1;
            if self.battery >= CHARGED_BATTERY {
                self.state = BeeState::Exploring;
            }
            return;
        }

        if let [.., last, current] = self.path[..] {
            let distance = last.distance(current);
            self.battery = (self.battery - distance * CONSUMPTION_RATE).max(0.0);
        }

        if self.battery < LOW_BATTERY && self.state != BeeState::Returning {
            self.state = BeeState::Returning;
            self.target = None;
        }
    }

    /// Learn about nearby flowers and refresh the quality of every known one.
    pub fn update_known_flowers(&mut self, greenhouse: &Greenhouse) {
        for flower in greenhouse.flowers() {
            let id = flower.id();
            let known = self.flower_memory.contains_key(&id);
            let near = self.pos.distance(flower.pos()) < DISCOVERY_RADIUS;
            if near && !known {
                self.known_flowers.push(id);
            }
            if near || known {
                self.flower_memory.insert(id, flower.quality());
            }
        }
    }

    /// Pick one known flower by roulette-wheel selection over role-specific weights.
    ///
    /// Returns `None` if no flower is known or every weight is zero.
    pub fn select_flower<R: Rng + ?Sized>(
        &self,
        greenhouse: &Greenhouse,
        rng: &mut R,
    ) -> Result<Option<usize>> {
        if self.known_flowers.is_empty() {
            return Ok(None);
        }

        let weights: Vec<f64> = self
            .known_flowers
            .iter()
            .map(|&id| match greenhouse.flower(id) {
                Some(flower) => self.role.flower_weight(flower, self.flower_memory(id), rng),
                None => 0.0,
            })
            .collect();

        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Ok(None);
        }

        let dist = WeightedIndex::new(&weights).context("failed to build flower distribution")?;
        Ok(Some(self.known_flowers[dist.sample(rng)]))
    }

    /// Deposit pollen on a flower. Returns whether any pollination took place.
    pub fn pollinate(&mut self, flower: &mut Flower) -> bool {
        let amount = self.role.pollination_efficiency() * (5.0 + flower.maturity() as f64);
        if !flower.receive_pollen(amount) {
            return false;
        }
        if flower.is_fully_pollinated() {
            self.stats.flowers_pollinated += 1;
        }
        self.stats.total_pollination += amount;
        true
    }

    fn explore<R: Rng + ?Sized>(&mut self, greenhouse: &Greenhouse, rng: &mut R) -> Result<()> {
        let wander = rng.random::<f64>() < self.role.exploration_factor();
        if wander || self.known_flowers.is_empty() {
            let step = Point::new(
                rng.random_range(-WANDER_STEP..WANDER_STEP),
                rng.random_range(-WANDER_STEP..WANDER_STEP),
            );
            let target = greenhouse.confine(self.pos + step);
            self.move_toward(target);
            self.pos = greenhouse.confine(self.pos);
            if let Some(last) = self.path.last_mut() {
                *last = self.pos;
            }
            return Ok(());
        }

        if let Some(flower_id) = self.select_flower(greenhouse, rng)? {
            self.assign_target(flower_id);
        }
        Ok(())
    }

    /// Take one fixed-length step toward `target` and return the distance before moving.
    fn move_toward(&mut self, target: Point) -> f64 {
        let delta = target - self.pos;
        let distance = delta.norm();
        if distance > 0.0 {
            self.pos += delta * (SPEED / distance);
            self.stats.distance_traveled += SPEED;
        }
        self.path.push(self.pos);
        distance
    }
}
