use anyhow::{Result, bail};
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Content of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Free,
    Obstacle,
    Survivor,
    Resource,
}

/// Integer position on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: GridPos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Amounts of debris, survivors and resources scattered over a new zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneLayout {
    pub n_debris: usize,
    pub n_survivors: usize,
    pub n_resources: usize,
}

const PROB_DEBRIS: f64 = 0.7;
const PROB_DYNAMIC_DEBRIS: f64 = 0.6;

/// Grid-shaped disaster zone with its pheromone and visited fields.
///
/// All fields are stored row-major, indexed by `y * width + x`.
#[derive(Debug, Clone)]
pub struct DisasterZone {
    width: usize,
    height: usize,
    grid: Vec<Cell>,
    pheromone: Vec<f64>,
    visited: Vec<bool>,
    survivors_found: usize,
    total_survivors: usize,
}

impl DisasterZone {
    /// Create an empty zone with every cell free.
    pub fn new(width: usize, height: usize) -> Self {
        let n_cells = width * height;
        Self {
            width,
            height,
            grid: vec![Cell::Free; n_cells],
            pheromone: vec![0.0; n_cells],
            visited: vec![false; n_cells],
            survivors_found: 0,
            total_survivors: 0,
        }
    }

    /// Create a zone littered with debris, survivors and resources.
    pub fn generate<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        layout: ZoneLayout,
        rng: &mut R,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("zone must have at least one cell, but is {width}x{height}");
        }
        let mut zone = Self::new(width, height);

        for _ in 0..layout.n_debris {
            let center = zone.random_cell(rng);
            let size = rng.random_range(1..=3);
            zone.scatter_debris(center, size, PROB_DEBRIS, rng);
        }

        for _ in 0..layout.n_survivors {
            let pos = zone.random_free_cell(rng)?;
            zone.place_survivor(pos);
        }

        for _ in 0..layout.n_resources {
            let pos = zone.random_free_cell(rng)?;
            zone.set_cell(pos, Cell::Resource);
        }

        Ok(zone)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn grid(&self) -> &[Cell] {
        &self.grid
    }

    pub fn pheromone_grid(&self) -> &[f64] {
        &self.pheromone
    }

    pub fn visited_grid(&self) -> &[bool] {
        &self.visited
    }

    pub fn survivors_found(&self) -> usize {
        self.survivors_found
    }

    pub fn total_survivors(&self) -> usize {
        self.total_survivors
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        let in_bounds =
            (0..self.width as i32).contains(&pos.x) && (0..self.height as i32).contains(&pos.y);
        in_bounds.then(|| pos.y as usize * self.width + pos.x as usize)
    }

    pub fn pos_of(&self, idx: usize) -> GridPos {
        GridPos::new((idx % self.width) as i32, (idx / self.width) as i32)
    }

    pub fn cell(&self, pos: GridPos) -> Option<Cell> {
        self.index(pos).map(|idx| self.grid[idx])
    }

    /// Overwrite a cell. Obstacles are permanent, so this is a no-op on obstacle cells.
    pub fn set_cell(&mut self, pos: GridPos, cell: Cell) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        if self.grid[idx] == Cell::Obstacle {
            return;
        }
        self.grid[idx] = cell;
    }

    /// Place a survivor on a cell and count it.
    pub fn place_survivor(&mut self, pos: GridPos) {
        if self.cell(pos) == Some(Cell::Free) {
            self.set_cell(pos, Cell::Survivor);
            self.total_survivors += 1;
        }
    }

    /// Whether an agent may stand on the cell.
    pub fn is_passable(&self, pos: GridPos) -> bool {
        matches!(self.cell(pos), Some(cell) if cell != Cell::Obstacle)
    }

    pub fn pheromone(&self, pos: GridPos) -> f64 {
        self.index(pos).map_or(0.0, |idx| self.pheromone[idx])
    }

    pub fn is_visited(&self, pos: GridPos) -> bool {
        self.index(pos).is_some_and(|idx| self.visited[idx])
    }

    /// Scale the whole pheromone field by `1 - rate`.
    pub fn evaporate(&mut self, rate: f64) {
        let factor = (1.0 - rate).clamp(0.0, 1.0);
        self.pheromone.iter_mut().for_each(|p| *p *= factor);
    }

    /// Add pheromone to a cell. Out-of-range positions are ignored.
    pub fn deposit_pheromone(&mut self, pos: GridPos, amount: f64) {
        if let Some(idx) = self.index(pos) {
            self.pheromone[idx] += amount.max(0.0);
        }
    }

    pub fn mark_visited(&mut self, pos: GridPos) {
        if let Some(idx) = self.index(pos) {
            self.visited[idx] = true;
        }
    }

    /// Remove the survivor or resource on a cell, returning what was there.
    ///
    /// Free and obstacle cells are left as they are.
    pub fn take_content(&mut self, pos: GridPos) -> Option<Cell> {
        let idx = self.index(pos)?;
        let cell = self.grid[idx];
        match cell {
            Cell::Survivor => {
                self.grid[idx] = Cell::Free;
                self.survivors_found += 1;
                Some(cell)
            }
            Cell::Resource => {
                self.grid[idx] = Cell::Free;
                Some(cell)
            }
            Cell::Free | Cell::Obstacle => None,
        }
    }

    /// Drop a new debris cluster on free cells and return its center and size.
    pub fn add_dynamic_obstacle<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (GridPos, i32) {
        let center = self.random_cell(rng);
        let size = rng.random_range(2..=4);
        self.scatter_debris(center, size, PROB_DYNAMIC_DEBRIS, rng);
        (center, size)
    }

    /// Percentage of non-obstacle cells that have been visited.
    pub fn coverage(&self) -> f64 {
        let accessible = self.grid.iter().filter(|&&c| c != Cell::Obstacle).count();
        if accessible == 0 {
            return 0.0;
        }
        let visited = self
            .grid
            .iter()
            .zip(&self.visited)
            .filter(|&(&c, &v)| v && c != Cell::Obstacle)
            .count();
        100.0 * visited as f64 / accessible as f64
    }

    /// Percentile `q` (0-100) of the pheromone field, linearly interpolated.
    pub fn pheromone_percentile(&self, q: f64) -> f64 {
        let mut sorted = self.pheromone.clone();
        if sorted.is_empty() {
            return 0.0;
        }
        sorted.sort_by(f64::total_cmp);

        let rank = q.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }

    /// Passable cells whose pheromone is at least `threshold`, in row-major order.
    pub fn cells_above(&self, threshold: f64) -> Vec<GridPos> {
        (0..self.grid.len())
            .filter(|&idx| self.grid[idx] != Cell::Obstacle && self.pheromone[idx] >= threshold)
            .map(|idx| self.pos_of(idx))
            .collect()
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> GridPos {
        GridPos::new(
            rng.random_range(0..self.width as i32),
            rng.random_range(0..self.height as i32),
        )
    }

    /// Draw random cells until a free one turns up.
    pub fn random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GridPos> {
        if !self.grid.contains(&Cell::Free) {
            bail!("zone has no free cell left");
        }
        loop {
            let pos = self.random_cell(rng);
            if self.cell(pos) == Some(Cell::Free) {
                return Ok(pos);
            }
        }
    }

    fn scatter_debris<R: Rng + ?Sized>(&mut self, center: GridPos, size: i32, prob: f64, rng: &mut R) {
        let x_range = (center.x - size).max(0)..(center.x + size + 1).min(self.width as i32);
        for x in x_range {
            let y_range = (center.y - size).max(0)..(center.y + size + 1).min(self.height as i32);
            for y in y_range {
                let pos = GridPos::new(x, y);
                if rng.random::<f64>() < prob && self.cell(pos) == Some(Cell::Free) {
                    self.set_cell(pos, Cell::Obstacle);
                }
            }
        }
    }
}
