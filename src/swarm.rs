use anyhow::Result;
use rand::Rng;

/// Controller of a swarm simulation.
///
/// Owns the environment and the agents, advances them one tick at a time
/// and keeps a snapshot of every tick (the initial state included).
pub trait Swarm {
    type Snapshot: Clone;

    /// Advance the simulation by one tick.
    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()>;

    /// Number of ticks performed so far.
    fn tick(&self) -> usize;

    /// Whether the simulation reached its goal and should stop early.
    fn is_finished(&self) -> bool {
        false
    }

    /// Snapshots of every tick so far, oldest first.
    fn history(&self) -> &[Self::Snapshot];

    /// Snapshot of the current tick.
    fn latest(&self) -> Option<&Self::Snapshot> {
        self.history().last()
    }
}
