//! Artificial bee colony pollinating a greenhouse.

pub mod bee;
pub mod greenhouse;
pub mod swarm;

pub use bee::{BeeDrone, BeeRole, BeeState};
pub use greenhouse::{ChargingStation, Flower, Greenhouse};
pub use swarm::{AbcSnapshot, AbcSummary, BeeSwarm};
