use crate::aco::zone::{Cell, DisasterZone, GridPos};
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};

/// Pheromone laid on every cell an ant drone steps on.
pub const PHEROMONE_STRENGTH: f64 = 10.0;

const SURVIVOR_BONUS: f64 = 5.0;
const RESOURCE_BONUS: f64 = 3.0;
const PHEROMONE_FLOOR: f64 = 0.1;

/// Weights of the ant movement rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcoParams {
    /// Exponent of the pheromone term.
    pub alpha: f64,
    /// Exponent of the heuristic term.
    pub beta: f64,
    /// Probability of boosting a candidate's heuristic at random.
    pub exploration_factor: f64,
}

impl Default for AcoParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 2.0,
            exploration_factor: 0.1,
        }
    }
}

/// Drone searching the zone like a foraging ant.
#[derive(Debug, Clone)]
pub struct AntDrone {
    id: usize,
    pos: GridPos,
    path: Vec<GridPos>,
    survivors_found: u32,
    resources_found: u32,
    energy_consumed: u32,
    target: Option<GridPos>,
}

impl AntDrone {
    pub fn new(id: usize, pos: GridPos) -> Self {
        Self {
            id,
            pos,
            path: vec![pos],
            survivors_found: 0,
            resources_found: 0,
            energy_consumed: 0,
            target: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn pos(&self) -> GridPos {
        self.pos
    }

    pub fn path(&self) -> &[GridPos] {
        &self.path
    }

    pub fn survivors_found(&self) -> u32 {
        self.survivors_found
    }

    pub fn resources_found(&self) -> u32 {
        self.resources_found
    }

    pub fn energy_consumed(&self) -> u32 {
        self.energy_consumed
    }

    pub fn target(&self) -> Option<GridPos> {
        self.target
    }

    pub fn set_target(&mut self, target: GridPos) {
        self.target = Some(target);
    }

    /// Move one cell, toward the target if there is one.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        zone: &mut DisasterZone,
        params: &AcoParams,
        rng: &mut R,
    ) -> Result<()> {
        match self.target {
            Some(target) => {
                self.move_toward_target(zone, target);
                Ok(())
            }
            None => self.move_by_pheromone(zone, params, rng),
        }
    }

    /// Passable cells among the eight surrounding ones, column by column.
    pub fn valid_neighbors(&self, zone: &DisasterZone) -> Vec<GridPos> {
        let mut neighbors = Vec::with_capacity(8);
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let pos = GridPos::new(self.pos.x + dx, self.pos.y + dy);
                if zone.is_passable(pos) {
                    neighbors.push(pos);
                }
            }
        }
        neighbors
    }

    /// Desirability of a cell: unvisited cells double it, survivors and resources multiply it.
    fn heuristic<R: Rng + ?Sized>(
        zone: &DisasterZone,
        pos: GridPos,
        exploration_factor: f64,
        rng: &mut R,
    ) -> f64 {
        let mut heuristic = 1.0;
        if !zone.is_visited(pos) {
            heuristic *= 2.0;
        }
        match zone.cell(pos) {
            Some(Cell::Survivor) => heuristic *= 5.0,
            Some(Cell::Resource) => heuristic *= 3.0,
            _ => {}
        }
        if rng.random::<f64>() < exploration_factor {
            heuristic *= rng.random_range(1.0..3.0);
        }
        heuristic
    }

    /// Pick a neighbor with probability proportional to
    /// `(pheromone + 0.1)^alpha * heuristic^beta`.
    ///
    /// Falls back to a uniform choice when every weight vanishes.
    pub fn choose_neighbor<R: Rng + ?Sized>(
        &self,
        zone: &DisasterZone,
        params: &AcoParams,
        rng: &mut R,
    ) -> Result<Option<GridPos>> {
        let neighbors = self.valid_neighbors(zone);
        if neighbors.is_empty() {
            return Ok(None);
        }

        let weights: Vec<f64> = neighbors
            .iter()
            .map(|&pos| {
                let pheromone = zone.pheromone(pos) + PHEROMONE_FLOOR;
                let heuristic = Self::heuristic(zone, pos, params.exploration_factor, rng);
                pheromone.powf(params.alpha) * heuristic.powf(params.beta)
            })
            .collect();

        let total: f64 = weights.iter().sum();
        let i_next = if total > 0.0 && total.is_finite() {
            let dist =
                WeightedIndex::new(&weights).context("failed to build neighbor distribution")?;
            dist.sample(rng)
        } else {
            rng.random_range(0..neighbors.len())
        };

        Ok(Some(neighbors[i_next]))
    }

    fn move_by_pheromone<R: Rng + ?Sized>(
        &mut self,
        zone: &mut DisasterZone,
        params: &AcoParams,
        rng: &mut R,
    ) -> Result<()> {
        let Some(next) = self.choose_neighbor(zone, params, rng)? else {
            return Ok(());
        };
        self.arrive(zone, next);
        self.check_cell_content(zone);
        Ok(())
    }

    /// Step along the axis with the larger offset to the target, or to the
    /// neighbor closest to it (Manhattan) if that step is blocked.
    fn move_toward_target(&mut self, zone: &mut DisasterZone, target: GridPos) {
        let dx = target.x - self.pos.x;
        let dy = target.y - self.pos.y;
        let direct = if dx.abs() > dy.abs() {
            GridPos::new(self.pos.x + unit_step(dx), self.pos.y)
        } else {
            GridPos::new(self.pos.x, self.pos.y + unit_step(dy))
        };

        let next = if zone.is_passable(direct) {
            direct
        } else {
            let neighbors = self.valid_neighbors(zone);
            let mut best = neighbors.first().copied().unwrap_or(self.pos);
            let mut best_dist = i32::MAX;
            for pos in neighbors {
                let dist = pos.manhattan(target);
                if dist < best_dist {
                    best_dist = dist;
                    best = pos;
                }
            }
            best
        };

        self.arrive(zone, next);
        if self.pos == target {
            self.target = None;
        }
        self.check_cell_content(zone);
    }

    fn arrive(&mut self, zone: &mut DisasterZone, pos: GridPos) {
        self.pos = pos;
        self.path.push(pos);
        self.energy_consumed += 1;
        zone.mark_visited(pos);
        zone.deposit_pheromone(pos, PHEROMONE_STRENGTH);
    }

    /// Rescue whatever lies on the current cell and reinforce the trail to it.
    pub fn check_cell_content(&mut self, zone: &mut DisasterZone) {
        match zone.take_content(self.pos) {
            Some(Cell::Survivor) => {
                self.survivors_found += 1;
                zone.deposit_pheromone(self.pos, PHEROMONE_STRENGTH * SURVIVOR_BONUS);
                log::info!(
                    "drone {} found a survivor at {:?} ({}/{})",
                    self.id,
                    self.pos,
                    zone.survivors_found(),
                    zone.total_survivors()
                );
            }
            Some(Cell::Resource) => {
                self.resources_found += 1;
                zone.deposit_pheromone(self.pos, PHEROMONE_STRENGTH * RESOURCE_BONUS);
            }
            _ => {}
        }
    }
}

/// Unit step toward a positive offset, `-1` otherwise (a zero offset steps back).
fn unit_step(delta: i32) -> i32 {
    if delta > 0 { 1 } else { -1 }
}
