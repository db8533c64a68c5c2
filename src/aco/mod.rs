//! Ant colony of drones exploring a disaster zone.

pub mod ant;
pub mod swarm;
pub mod zone;

pub use ant::{AcoParams, AntDrone};
pub use swarm::{AcoSchedule, AcoSnapshot, AntSwarm};
pub use zone::{Cell, DisasterZone, GridPos, ZoneLayout};
