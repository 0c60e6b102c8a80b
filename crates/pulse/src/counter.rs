use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime count of probes that settled successfully.
///
/// Only ever incremented; the scheduler owns it and hands out shared
/// references to its dispatcher.
#[derive(Debug, Default)]
pub struct SuccessCounter {
    value: AtomicU64,
}

impl SuccessCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one success and return the new total.
    pub fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_returns_new_total() {
        let counter = SuccessCounter::new();
        assert_eq!(counter.get(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }
}
