//! Observable scheduler transitions.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::probe::Outcome;

/// Emitted by the scheduler and dispatcher as a cycle progresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleEvent {
    CycleStarted { cycle: u64, total: usize },
    TaskScheduled { cycle: u64, name: String, delay: Duration },
    TaskCompleted { cycle: u64, name: String, outcome: Outcome, counter: u64 },
    CycleCompleted { cycle: u64, successes: usize, failures: usize, counter: u64 },
    CoolingDown { cycle: u64, delay: Duration },
}

/// Optional channel the scheduler reports to.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink {
    tx: Option<mpsc::UnboundedSender<CycleEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<CycleEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub(crate) fn emit(&self, event: CycleEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).is_err() {
                debug!("Cycle event receiver dropped");
            }
        }
    }
}
