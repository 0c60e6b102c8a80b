//! Pulse - jittered batch scheduling for chain liveness probes
//!
//! A fixed set of named probes is dispatched once per cycle. Every probe starts
//! after its own random delay, the cycle completes once every probe has settled
//! (successfully or not), and the next cycle begins after another random pause.

pub mod barrier;
pub mod batch;
pub mod counter;
pub mod events;
pub mod jitter;
pub mod probe;
pub mod sample;
pub mod scheduler;

// Re-export main types
pub use batch::{BatchDispatcher, BatchReport, TaskReport};
pub use counter::SuccessCounter;
pub use events::CycleEvent;
pub use jitter::{BoundsError, JitterBounds};
pub use probe::{Outcome, Probe, ProbeDescriptor, probe_fn};
pub use sample::{SampleError, pick_sample};
pub use scheduler::{Scheduler, SchedulerConfig};

/// Re-export common error types
pub use anyhow;

/// Result type returned by [`Probe::check`]
pub type Result<T> = anyhow::Result<T>;
