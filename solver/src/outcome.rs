use std::cell::Cell;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Work done by a single solve call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Search nodes visited; what counts as a node is documented per strategy
    pub nodes: u64,
    pub elapsed: Duration,
}

/// A solver result together with the metrics of the search that produced it
#[derive(Clone, Debug)]
pub struct Outcome<S> {
    pub solution: S,
    pub stats: SearchStats,
}

/// Nodes between two reads of the clock
const CLOCK_STRIDE: u64 = 256;

/// Cooperative limits on one search.
///
/// Searches poll the budget with their node count and give up with
/// [`Error::Interrupted`] once the node cap is passed or the deadline has
/// gone by. The clock is read on the first poll and then every few hundred
/// nodes.
#[derive(Clone, Debug, Default)]
pub struct Budget {
    deadline: Option<Instant>,
    max_nodes: Option<u64>,
    next_clock: Cell<u64>,
}

impl Budget {
    pub fn unlimited() -> Budget {
        Budget::default()
    }

    /// A deadline `limit` from now
    pub fn timeout(limit: Duration) -> Budget {
        Budget {
            deadline: Instant::now().checked_add(limit),
            ..Budget::default()
        }
    }

    pub fn with_max_nodes(self, max_nodes: u64) -> Budget {
        Budget { max_nodes: Some(max_nodes), ..self }
    }

    pub(crate) fn check(&self, nodes: u64) -> Result<()> {
        if self.max_nodes.map_or(false, |max| nodes > max) {
            return Err(Error::Interrupted { nodes });
        }
        if let Some(deadline) = self.deadline {
            if nodes >= self.next_clock.get() {
                self.next_clock.set(nodes.saturating_add(CLOCK_STRIDE));
                if Instant::now() >= deadline {
                    return Err(Error::Interrupted { nodes });
                }
            }
        }
        Ok(())
    }
}

/// Runs a search and measures its wall-clock time
pub(crate) fn try_timed<S>(search: impl FnOnce() -> Result<(S, u64)>) -> Result<Outcome<S>> {
    let start = Instant::now();
    let (solution, nodes) = search()?;
    Ok(Outcome {
        solution,
        stats: SearchStats { nodes, elapsed: start.elapsed() },
    })
}
