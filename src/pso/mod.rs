//! Particle swarm flying in formation.

pub mod formation;
pub mod swarm;

pub use formation::FormationKind;
pub use swarm::{Failure, FormationSwarm, Obstacle, PsoSnapshot};
