//! Uniform random delays inside a configured window.

use std::time::Duration;

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("jitter minimum {min}s is greater than maximum {max}s")]
    Inverted { min: u64, max: u64 },
}

/// Inclusive `[min, max]` window in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterBounds {
    min_secs: u64,
    max_secs: u64,
}

impl JitterBounds {
    pub fn new(min_secs: u64, max_secs: u64) -> Result<Self, BoundsError> {
        if min_secs > max_secs {
            return Err(BoundsError::Inverted { min: min_secs, max: max_secs });
        }

        Ok(Self { min_secs, max_secs })
    }

    /// Window that always yields zero.
    pub const fn none() -> Self {
        Self { min_secs: 0, max_secs: 0 }
    }

    pub fn min_secs(&self) -> u64 {
        self.min_secs
    }

    pub fn max_secs(&self) -> u64 {
        self.max_secs
    }

    /// Draw a number of seconds from `rng`.
    pub fn sample_secs<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min_secs..=self.max_secs)
    }

    /// Draw a delay from the thread-local generator.
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.sample_secs(&mut rand::thread_rng()))
    }
}

impl std::fmt::Display for JitterBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s..={}s", self.min_secs, self.max_secs)
    }
}
