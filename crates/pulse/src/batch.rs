//! Jittered dispatch of one batch of probes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::barrier::CompletionBarrier;
use crate::counter::SuccessCounter;
use crate::events::{CycleEvent, EventSink};
use crate::jitter::JitterBounds;
use crate::probe::{Outcome, ProbeDescriptor, run_probe};

/// How one probe in a batch went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub name: String,
    /// Start jitter the task waited before probing
    pub delay: Duration,
    pub outcome: Outcome,
    /// Success counter right after this task settled
    pub counter: u64,
}

/// Every task of a finished batch, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub cycle: u64,
    pub tasks: Vec<TaskReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn successes(&self) -> usize {
        self.tasks.iter().filter(|task| task.outcome.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.total() - self.successes()
    }
}

/// Starts every probe of a batch after its own random delay and waits for all
/// of them to settle.
pub struct BatchDispatcher {
    start_bounds: JitterBounds,
    probe_timeout: Option<Duration>,
    counter: Arc<SuccessCounter>,
    events: EventSink,
}

impl BatchDispatcher {
    pub fn new(
        start_bounds: JitterBounds,
        probe_timeout: Option<Duration>,
        counter: Arc<SuccessCounter>,
    ) -> Self {
        Self { start_bounds, probe_timeout, counter, events: EventSink::default() }
    }

    pub(crate) fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn counter(&self) -> &Arc<SuccessCounter> {
        &self.counter
    }

    /// Run `descriptors` once. Returns after every task has settled.
    ///
    /// All start delays run concurrently. A failed or panicked probe counts
    /// toward completion exactly like a successful one and never affects its
    /// siblings.
    pub async fn run_batch(&self, cycle: u64, descriptors: &[ProbeDescriptor]) -> BatchReport {
        let mut delays = Vec::with_capacity(descriptors.len());
        let mut handles = Vec::with_capacity(descriptors.len());

        for descriptor in descriptors {
            let delay = self.start_bounds.delay();
            info!("{} waiting {} seconds before starting...", descriptor.name(), delay.as_secs());
            self.events.emit(CycleEvent::TaskScheduled {
                cycle,
                name: descriptor.name().to_string(),
                delay,
            });

            let probe = descriptor.probe();
            let deadline = self.probe_timeout;
            handles.push(tokio::spawn(async move {
                sleep(delay).await;
                run_probe(probe.as_ref(), deadline).await
            }));
            delays.push(delay);
        }

        let mut barrier = CompletionBarrier::new(handles);
        let mut report = BatchReport { cycle, tasks: Vec::with_capacity(descriptors.len()) };

        while let Some(arrival) = barrier.next().await {
            let name = descriptors[arrival.index].name();
            let outcome = arrival
                .result
                .unwrap_or_else(|e| Outcome::Failure(format!("probe task aborted: {e}")));

            let counter = if outcome.is_success() {
                self.counter.increment()
            } else {
                self.counter.get()
            };

            match &outcome {
                Outcome::Success(_) => {
                    info!("{name} completed, {outcome}. Current counter: {counter}")
                }
                Outcome::Failure(_) => {
                    warn!("{name} completed, {outcome}. Current counter: {counter}")
                }
            }

            self.events.emit(CycleEvent::TaskCompleted {
                cycle,
                name: name.to_string(),
                outcome: outcome.clone(),
                counter,
            });

            report.tasks.push(TaskReport {
                name: name.to_string(),
                delay: delays[arrival.index],
                outcome,
                counter,
            });

            if arrival.is_last {
                let state = barrier.state();
                debug!(cycle, completed = state.completed(), total = state.total(), "Batch drained");
            }
        }

        report
    }
}
