//! The contract between the scheduler and network-specific checks.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::Result;
use tokio::time::timeout;

/// A single liveness check against one remote source.
///
/// On success the probe returns a short human-readable observation (for
/// example `block 19876543`). Any error is reported as a failed outcome.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    async fn check(&self) -> Result<String>;
}

/// Adapter turning an async closure into a [`Probe`].
pub struct FnProbe<F> {
    f: F,
}

/// Wrap an async closure as a probe.
///
/// ```rust
/// let probe = pulse::probe_fn(|| async { Ok::<_, pulse::anyhow::Error>("block 1".to_string()) });
/// ```
pub fn probe_fn<F, Fut>(f: F) -> FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send,
{
    FnProbe { f }
}

#[async_trait::async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send,
{
    async fn check(&self) -> Result<String> {
        (self.f)().await
    }
}

/// Settled result of one probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Failure(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl From<Result<String>> for Outcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(detail) => Outcome::Success(detail),
            Err(e) => Outcome::Failure(format!("{e:#}")),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(detail) if detail.is_empty() => write!(f, "ok"),
            Outcome::Success(detail) => write!(f, "ok ({detail})"),
            Outcome::Failure(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// A named probe as it appears in a batch.
#[derive(Clone)]
pub struct ProbeDescriptor {
    name: String,
    probe: Arc<dyn Probe>,
}

impl ProbeDescriptor {
    pub fn new(name: impl Into<String>, probe: impl Probe + 'static) -> Self {
        Self { name: name.into(), probe: Arc::new(probe) }
    }

    pub fn from_arc(name: impl Into<String>, probe: Arc<dyn Probe>) -> Self {
        Self { name: name.into(), probe }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn probe(&self) -> Arc<dyn Probe> {
        self.probe.clone()
    }
}

impl fmt::Debug for ProbeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProbeDescriptor").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Run `probe` once, bounded by `deadline` when one is set.
pub async fn run_probe(probe: &dyn Probe, deadline: Option<Duration>) -> Outcome {
    match deadline {
        Some(limit) => match timeout(limit, probe.check()).await {
            Ok(result) => result.into(),
            Err(_) => Outcome::Failure(format!("timed out after {}s", limit.as_secs())),
        },
        None => probe.check().await.into(),
    }
}
