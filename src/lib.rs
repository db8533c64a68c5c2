//! Bio-inspired drone swarm simulations.
//!
//! Three independent discrete-time models share the same driver:
//! an artificial bee colony pollinating a greenhouse ([`abc`]), an ant
//! colony searching a disaster zone ([`aco`]) and a particle swarm flying
//! in formation while tolerating the loss of a drone ([`pso`]).

pub mod abc;
pub mod aco;
pub mod analysis;
pub mod config;
pub mod engine;
pub mod manager;
pub mod pso;
pub mod space;
pub mod stats;
pub mod swarm;
pub mod types;
