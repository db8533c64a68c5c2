use crate::config::PsoConfig;
use crate::pso::formation::FormationKind;
use crate::space::Point;
use crate::swarm::Swarm;
use anyhow::Result;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Half-width of the square airspace centered at the origin.
pub const BOUND: f64 = 8.0;

const FORMATION_RADIUS: f64 = 3.0;

const INERTIA: f64 = 0.8;
const COGNITIVE: f64 = 1.5;
const SOCIAL: f64 = 1.5;

const OBSTACLE_HIT: f64 = 100.0;
const SAFE_DISTANCE: f64 = 0.5;
const COLLISION_WEIGHT: f64 = 10.0;
const ENERGY_WEIGHT: f64 = 0.1;
const MIN_OBSTACLE_GAP: f64 = 1e-9;

/// Static circular obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub center: Point,
    pub radius: f64,
}

impl Obstacle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Obstacles of the default airspace.
    pub fn defaults() -> Vec<Obstacle> {
        vec![
            Obstacle::new(Point::new(-2.0, 1.0), 1.2),
            Obstacle::new(Point::new(3.0, -2.0), 1.5),
            Obstacle::new(Point::new(0.0, -3.0), 1.0),
        ]
    }

    /// Cost of being at `pos`: a flat penalty inside the obstacle,
    /// a penalty growing as `1/gap - 1` when closer than one unit outside.
    pub fn penalty(&self, pos: Point) -> f64 {
        let distance = pos.distance(self.center);
        if distance < self.radius {
            OBSTACLE_HIT
        } else {
            let gap = (distance - self.radius).max(MIN_OBSTACLE_GAP);
            (1.0 / gap - 1.0).max(0.0)
        }
    }
}

/// Drone taken out of the formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub drone: usize,
    pub tick: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsoMetrics {
    pub active_drones: usize,
    pub best_fitness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsoSnapshot {
    pub tick: usize,
    pub positions: Vec<Point>,
    pub active: Vec<bool>,
    pub formation: Vec<Point>,
    pub obstacles: Vec<Obstacle>,
    pub global_best: Point,
    pub failure: Option<Failure>,
    pub metrics: PsoMetrics,
}

impl PsoSnapshot {
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("active_drones", self.metrics.active_drones as f64),
            ("best_fitness", self.metrics.best_fitness),
        ]
    }
}

/// Particle swarm flying into formation, tolerant to the loss of one drone.
///
/// Particles are stored as parallel arrays indexed by drone id.
pub struct FormationSwarm {
    kind: FormationKind,
    n_steps: usize,
    fault_tolerance: bool,

    positions: Vec<Point>,
    velocities: Vec<Point>,
    personal_best: Vec<Point>,
    personal_best_fitness: Vec<f64>,
    global_best: Point,
    global_best_fitness: f64,
    active: Vec<bool>,
    failure: Option<Failure>,

    formation: Vec<Point>,
    obstacles: Vec<Obstacle>,

    tick: usize,
    history: Vec<PsoSnapshot>,
}

impl FormationSwarm {
    /// Scatter the drones uniformly over the airspace.
    pub fn generate<R: Rng + ?Sized>(cfg: &PsoConfig, rng: &mut R) -> Self {
        let positions = (0..cfg.n_drones)
            .map(|_| {
                Point::new(
                    rng.random_range(-BOUND..BOUND),
                    rng.random_range(-BOUND..BOUND),
                )
            })
            .collect();
        Self::new(
            cfg.formation,
            positions,
            Obstacle::defaults(),
            cfg.n_steps,
            cfg.fault_tolerance,
        )
    }

    /// Build a swarm at rest at the given positions.
    ///
    /// A failure is injected at tick `n_steps / 2` when `fault_tolerance` is set.
    pub fn new(
        kind: FormationKind,
        positions: Vec<Point>,
        obstacles: Vec<Obstacle>,
        n_steps: usize,
        fault_tolerance: bool,
    ) -> Self {
        let n_drones = positions.len();
        let mut swarm = Self {
            kind,
            n_steps,
            fault_tolerance,
            velocities: vec![Point::ORIGIN; n_drones],
            personal_best: positions.clone(),
            personal_best_fitness: vec![f64::INFINITY; n_drones],
            positions,
            global_best: Point::ORIGIN,
            global_best_fitness: f64::INFINITY,
            active: vec![true; n_drones],
            failure: None,
            formation: kind.points(FORMATION_RADIUS, Point::ORIGIN, n_drones),
            obstacles,
            tick: 0,
            history: Vec::new(),
        };

        swarm.personal_best_fitness = (0..n_drones)
            .map(|i| swarm.fitness(swarm.positions[i], i))
            .collect();
        if let Some(i_best) = swarm.best_drone() {
            swarm.global_best = swarm.personal_best[i_best];
            swarm.global_best_fitness = swarm.personal_best_fitness[i_best];
        }

        swarm.record_state();
        swarm
    }

    pub fn kind(&self) -> FormationKind {
        self.kind
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Point] {
        &self.velocities
    }

    pub fn personal_best_fitness(&self) -> &[f64] {
        &self.personal_best_fitness
    }

    pub fn global_best(&self) -> (Point, f64) {
        (self.global_best, self.global_best_fitness)
    }

    pub fn active(&self) -> &[bool] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    pub fn failure(&self) -> Option<Failure> {
        self.failure
    }

    pub fn formation(&self) -> &[Point] {
        &self.formation
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Cost of drone `i_drone` standing at `pos`; lower is better.
    ///
    /// Sums the distance to the drone's formation point, the obstacle and
    /// collision penalties and an energy term proportional to its speed.
    /// Inactive or unknown drones always cost infinity.
    pub fn fitness(&self, pos: Point, i_drone: usize) -> f64 {
        if self.active.get(i_drone) != Some(&true) {
            return f64::INFINITY;
        }

        // The formation point follows the drone's rank among active drones.
        let rank = self.active[..i_drone].iter().filter(|&&a| a).count();
        let target = self.formation.get(rank).or(self.formation.first());
        let distance_to_target = target.map_or(0.0, |&target| pos.distance(target));

        let energy_penalty = ENERGY_WEIGHT * self.velocities[i_drone].norm();

        distance_to_target
            + self.obstacle_penalty(pos)
            + self.collision_penalty(pos, i_drone)
            + energy_penalty
    }

    pub fn obstacle_penalty(&self, pos: Point) -> f64 {
        self.obstacles.iter().map(|o| o.penalty(pos)).sum()
    }

    fn collision_penalty(&self, pos: Point, i_drone: usize) -> f64 {
        self.positions
            .iter()
            .zip(&self.active)
            .enumerate()
            .filter(|&(i, (_, &active))| i != i_drone && active)
            .map(|(_, (&other, _))| pos.distance(other))
            .filter(|&distance| distance < SAFE_DISTANCE)
            .map(|distance| COLLISION_WEIGHT * (SAFE_DISTANCE - distance))
            .sum()
    }

    /// Drone holding the lowest personal best (first one on ties).
    fn best_drone(&self) -> Option<usize> {
        self.personal_best_fitness
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
    }

    /// Permanently disable one random active drone other than the best one
    /// and rebuild the formation for the survivors.
    ///
    /// Does nothing if a drone already failed or fewer than two drones are active.
    pub fn inject_failure<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Failure> {
        if self.failure.is_some() {
            return None;
        }

        let active: Vec<usize> = (0..self.active.len()).filter(|&i| self.active[i]).collect();
        if active.len() < 2 {
            return None;
        }

        let best = self.best_drone();
        let candidates: Vec<usize> = active.into_iter().filter(|&i| Some(i) != best).collect();
        let &drone = candidates.choose(rng)?;

        self.active[drone] = false;
        let failure = Failure {
            drone,
            tick: self.tick,
        };
        self.failure = Some(failure);

        self.formation = self
            .kind
            .points(FORMATION_RADIUS, Point::ORIGIN, self.active_count());

        log::warn!("drone {drone} failed at tick {}", self.tick);
        Some(failure)
    }

    fn update_drone<R: Rng + ?Sized>(&mut self, i: usize, rng: &mut R) {
        let r1: f64 = rng.random();
        let r2: f64 = rng.random();

        let pos = self.positions[i];
        let inertia = self.velocities[i] * INERTIA;
        let memory = (self.personal_best[i] - pos) * (COGNITIVE * r1);
        let social = (self.global_best - pos) * (SOCIAL * r2);
        self.velocities[i] = inertia + memory + social;

        let lo = Point::new(-BOUND, -BOUND);
        let hi = Point::new(BOUND, BOUND);
        self.positions[i] = (pos + self.velocities[i]).clamp(lo, hi);

        let fitness = self.fitness(self.positions[i], i);
        if fitness < self.personal_best_fitness[i] {
            self.personal_best[i] = self.positions[i];
            self.personal_best_fitness[i] = fitness;

            if fitness < self.global_best_fitness {
                self.global_best = self.positions[i];
                self.global_best_fitness = fitness;
            }
        }
    }

    fn record_state(&mut self) {
        self.history.push(PsoSnapshot {
            tick: self.tick,
            positions: self.positions.clone(),
            active: self.active.clone(),
            formation: self.formation.clone(),
            obstacles: self.obstacles.clone(),
            global_best: self.global_best,
            failure: self.failure,
            metrics: PsoMetrics {
                active_drones: self.active_count(),
                best_fitness: self.global_best_fitness,
            },
        });
    }
}

impl Swarm for FormationSwarm {
    type Snapshot = PsoSnapshot;

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        if self.fault_tolerance && self.tick == self.n_steps / 2 {
            self.inject_failure(rng);
        }

        for i in 0..self.positions.len() {
            if self.active[i] {
                self.update_drone(i, rng);
            }
        }

        self.tick += 1;
        self.record_state();
        Ok(())
    }

    fn tick(&self) -> usize {
        self.tick
    }

    fn history(&self) -> &[PsoSnapshot] {
        &self.history
    }
}
