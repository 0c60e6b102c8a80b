//! The never-ending dispatch / cool-down loop.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::info;

use crate::batch::{BatchDispatcher, BatchReport};
use crate::counter::SuccessCounter;
use crate::events::{CycleEvent, EventSink};
use crate::jitter::JitterBounds;
use crate::probe::ProbeDescriptor;

const BANNER: &str = "-----------------------------------";

/// Timing knobs of the scheduling loop. Fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Delay before each probe of a batch starts
    pub start_bounds: JitterBounds,
    /// Pause between the end of one batch and the start of the next
    pub cycle_bounds: JitterBounds,
    /// Upper bound on a single probe invocation
    pub probe_timeout: Option<Duration>,
}

/// Runs the configured probe set forever.
///
/// Each cycle dispatches every probe, waits until all of them settled, logs the
/// success counter, sleeps for the inter-cycle jitter and starts over. Cycles
/// never overlap.
pub struct Scheduler {
    descriptors: Vec<ProbeDescriptor>,
    dispatcher: BatchDispatcher,
    cycle_bounds: JitterBounds,
    counter: Arc<SuccessCounter>,
    events: EventSink,
}

impl Scheduler {
    pub fn new(descriptors: Vec<ProbeDescriptor>, config: SchedulerConfig) -> Self {
        let counter = Arc::new(SuccessCounter::new());
        let dispatcher =
            BatchDispatcher::new(config.start_bounds, config.probe_timeout, counter.clone());

        Self {
            descriptors,
            dispatcher,
            cycle_bounds: config.cycle_bounds,
            counter,
            events: EventSink::default(),
        }
    }

    /// Report every transition on `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<CycleEvent>) -> Self {
        let sink = EventSink::new(tx);
        self.dispatcher = self.dispatcher.with_events(sink.clone());
        self.events = sink;
        self
    }

    /// Successful probes since the scheduler was created.
    pub fn success_count(&self) -> u64 {
        self.counter.get()
    }

    /// Dispatch one batch and wait for it to drain.
    pub async fn run_cycle(&self, cycle: u64) -> BatchReport {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        info!("{BANNER}");
        info!("CYCLE {cycle} - {timestamp}");
        info!("{BANNER}");
        self.events.emit(CycleEvent::CycleStarted { cycle, total: self.descriptors.len() });

        let report = self.dispatcher.run_batch(cycle, &self.descriptors).await;

        let counter = self.counter.get();
        info!(
            successes = report.successes(),
            failures = report.failures(),
            "All operations have been completed. Total operations counter: {counter}"
        );
        self.events.emit(CycleEvent::CycleCompleted {
            cycle,
            successes: report.successes(),
            failures: report.failures(),
            counter,
        });

        report
    }

    /// Sleep for one inter-cycle delay.
    pub async fn cool_down(&self, cycle: u64) -> Duration {
        let delay = self.cycle_bounds.delay();
        info!("Waiting {} seconds before starting all operations again...", delay.as_secs());
        self.events.emit(CycleEvent::CoolingDown { cycle, delay });

        sleep(delay).await;
        delay
    }

    /// Alternate between dispatching and cooling down until the process is stopped.
    pub async fn run(&self) -> Infallible {
        info!(
            probes = self.descriptors.len(),
            cycle_bounds = %self.cycle_bounds,
            "Starting scheduler"
        );

        let mut cycle = 1;
        loop {
            self.run_cycle(cycle).await;
            self.cool_down(cycle).await;
            cycle += 1;
        }
    }
}
