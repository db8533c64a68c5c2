use crate::space::Point;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// Highest flower maturity.
pub const MAX_MATURITY: u8 = 5;

/// Full pollination level.
pub const FULL_POLLINATION: f64 = 100.0;

const PROB_MATURE: f64 = 0.02;
const PROB_DECAY: f64 = 0.05;
const DECAY_FACTOR: f64 = 0.98;

/// Flower growing in the greenhouse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    id: usize,
    pos: Point,
    maturity: u8,
    pollination_level: f64,
    visits: u32,
}

impl Flower {
    /// Create an unvisited flower. Maturity is clamped to `1..=MAX_MATURITY`
    /// and the pollination level to `0..=FULL_POLLINATION`.
    pub fn new(id: usize, pos: Point, maturity: u8, pollination_level: f64) -> Self {
        Self {
            id,
            pos,
            maturity: maturity.clamp(1, MAX_MATURITY),
            pollination_level: pollination_level.clamp(0.0, FULL_POLLINATION),
            visits: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn maturity(&self) -> u8 {
        self.maturity
    }

    pub fn pollination_level(&self) -> f64 {
        self.pollination_level
    }

    pub fn visits(&self) -> u32 {
        self.visits
    }

    /// Quality score remembered by drones that know this flower.
    pub fn quality(&self) -> f64 {
        self.maturity as f64 * (self.pollination_level / FULL_POLLINATION)
    }

    /// Add pollen to the flower and count the visit.
    ///
    /// Returns `false` (and leaves the flower untouched) if it is already fully pollinated.
    pub fn receive_pollen(&mut self, amount: f64) -> bool {
        if self.pollination_level >= FULL_POLLINATION {
            return false;
        }
        self.pollination_level = (self.pollination_level + amount).min(FULL_POLLINATION);
        self.visits += 1;
        true
    }

    pub fn is_fully_pollinated(&self) -> bool {
        self.pollination_level >= FULL_POLLINATION
    }
}

/// Charging station. The capacity is informational and not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargingStation {
    pub pos: Point,
    pub capacity: u32,
}

/// Bounded rectangular greenhouse holding the flowers and charging stations.
///
/// Flowers are stored in an arena indexed by their id.
#[derive(Debug, Clone)]
pub struct Greenhouse {
    width: f64,
    height: f64,
    flowers: Vec<Flower>,
    stations: Vec<ChargingStation>,
}

impl Greenhouse {
    /// Create a greenhouse with `n_flowers` randomly placed flowers of random maturity.
    pub fn generate<R: Rng + ?Sized>(width: f64, height: f64, n_flowers: usize, rng: &mut R) -> Self {
        let flowers = (0..n_flowers)
            .map(|id| {
                let pos = Point::new(rng.random_range(0.0..=width), rng.random_range(0.0..=height));
                let maturity = rng.random_range(1..=MAX_MATURITY);
                Flower::new(id, pos, maturity, 0.0)
            })
            .collect();
        Self::with_flowers(width, height, flowers)
    }

    /// Create a greenhouse with the given flowers, re-assigning their ids to their arena index.
    pub fn with_flowers(width: f64, height: f64, mut flowers: Vec<Flower>) -> Self {
        for (id, flower) in flowers.iter_mut().enumerate() {
            flower.id = id;
        }

        let stations = vec![
            ChargingStation {
                pos: Point::new(2.0, 2.0),
                capacity: 3,
            },
            ChargingStation {
                pos: Point::new(width - 3.0, height - 3.0),
                capacity: 3,
            },
            ChargingStation {
                pos: Point::new(width - 3.0, 2.0),
                capacity: 2,
            },
            ChargingStation {
                pos: Point::new(2.0, height - 3.0),
                capacity: 2,
            },
        ];

        Self {
            width,
            height,
            flowers,
            stations,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn flowers(&self) -> &[Flower] {
        &self.flowers
    }

    pub fn stations(&self) -> &[ChargingStation] {
        &self.stations
    }

    pub fn flower(&self, id: usize) -> Option<&Flower> {
        self.flowers.get(id)
    }

    pub fn flower_mut(&mut self, id: usize) -> Option<&mut Flower> {
        self.flowers.get_mut(id)
    }

    /// Clamp a point to the greenhouse floor.
    pub fn confine(&self, pos: Point) -> Point {
        pos.clamp(Point::ORIGIN, Point::new(self.width, self.height))
    }

    pub fn nearest_station(&self, pos: Point) -> Option<&ChargingStation> {
        self.stations
            .iter()
            .min_by(|a, b| pos.distance(a.pos).total_cmp(&pos.distance(b.pos)))
    }

    /// Age every flower by one tick.
    ///
    /// Flowers below full maturity mature by one level with probability 0.02,
    /// and pollinated flowers lose 2% of their pollination with probability 0.05.
    pub fn age_flowers<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for flower in &mut self.flowers {
            if flower.maturity < MAX_MATURITY && rng.random::<f64>() < PROB_MATURE {
                flower.maturity += 1;
            }
            if flower.pollination_level > 0.0 && rng.random::<f64>() < PROB_DECAY {
                flower.pollination_level *= DECAY_FACTOR;
            }
        }
    }

    pub fn avg_pollination(&self) -> f64 {
        if self.flowers.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.flowers.iter().map(|f| f.pollination_level).sum();
        sum / self.flowers.len() as f64
    }

    pub fn total_visits(&self) -> u64 {
        self.flowers.iter().map(|f| f.visits as u64).sum()
    }
}
