//! Simulation output types.

use crate::abc::AbcSnapshot;
use crate::aco::AcoSnapshot;
use crate::pso::PsoSnapshot;
use serde::{Deserialize, Serialize};

/// State of any of the swarms at a single tick.
///
/// Decoupled from the live simulation so that later ticks never alter it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Snapshot {
    Abc(AbcSnapshot),
    Aco(AcoSnapshot),
    Pso(PsoSnapshot),
}

impl Snapshot {
    /// Named aggregate metrics of the tick.
    pub fn metrics(&self) -> Vec<(&'static str, f64)> {
        match self {
            Snapshot::Abc(snapshot) => snapshot.metrics(),
            Snapshot::Aco(snapshot) => snapshot.metrics(),
            Snapshot::Pso(snapshot) => snapshot.metrics(),
        }
    }
}

/// Record of the simulation at a single step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Simulation step (0 is the initial state).
    pub step: usize,

    /// Full state of the swarm at this step.
    pub snapshot: Snapshot,
}

/// Borrowed view of a [`Snapshot`], serialized exactly like it.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum SnapshotRef<'a> {
    Abc(&'a AbcSnapshot),
    Aco(&'a AcoSnapshot),
    Pso(&'a PsoSnapshot),
}

/// Borrowed view of a [`Record`], serialized exactly like it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RecordRef<'a> {
    pub step: usize,
    pub snapshot: SnapshotRef<'a>,
}
