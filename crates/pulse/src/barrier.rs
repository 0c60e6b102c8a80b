//! Completion barrier over the spawned tasks of one batch.

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::task::{JoinError, JoinHandle};

/// Progress of a single batch. Created fresh every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchState {
    total: usize,
    completed: usize,
}

impl BatchState {
    pub fn new(total: usize) -> Self {
        Self { total, completed: 0 }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// An empty batch is done as soon as it exists.
    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }

    /// Count one completion. Returns `true` for the completion that finishes the batch.
    fn record(&mut self) -> bool {
        debug_assert!(self.completed < self.total, "completion recorded past batch size");
        self.completed += 1;
        self.completed == self.total
    }
}

/// One settled task as seen by the barrier.
#[derive(Debug)]
pub struct Arrival<T> {
    /// Position of the task in the batch it was spawned from
    pub index: usize,
    pub result: Result<T, JoinError>,
    /// Completions so far, this one included
    pub completed: usize,
    /// Set on exactly one arrival per batch
    pub is_last: bool,
}

/// Drains a fixed set of tasks in completion order.
///
/// The size is fixed when the barrier is built. [`CompletionBarrier::next`]
/// yields each task exactly once and returns `None` once every task has
/// arrived, immediately so for an empty batch.
pub struct CompletionBarrier<T> {
    pending: FuturesUnordered<BoxFuture<'static, (usize, Result<T, JoinError>)>>,
    state: BatchState,
}

impl<T: Send + 'static> CompletionBarrier<T> {
    pub fn new(handles: Vec<JoinHandle<T>>) -> Self {
        let state = BatchState::new(handles.len());
        let pending = handles
            .into_iter()
            .enumerate()
            .map(|(index, handle)| async move { (index, handle.await) }.boxed())
            .collect();

        Self { pending, state }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub async fn next(&mut self) -> Option<Arrival<T>> {
        if self.state.is_done() {
            return None;
        }

        let (index, result) = self.pending.next().await?;
        let is_last = self.state.record();

        Some(Arrival { index, result, completed: self.state.completed, is_last })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_empty_barrier_is_done_immediately() {
        let mut barrier = CompletionBarrier::<()>::new(Vec::new());
        assert!(barrier.state().is_done());
        assert!(barrier.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_flag_set_once_in_completion_order() {
        let handles = [30u64, 10, 20]
            .into_iter()
            .map(|ms| {
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    ms
                })
            })
            .collect();
        let mut barrier = CompletionBarrier::new(handles);
        assert_eq!(barrier.state().total(), 3);
        assert_eq!(barrier.state().completed(), 0);

        let mut seen = Vec::new();
        while let Some(arrival) = barrier.next().await {
            assert_eq!(arrival.completed, seen.len() + 1);
            assert_eq!(arrival.is_last, arrival.completed == 3);
            seen.push((arrival.index, arrival.result.unwrap()));
        }

        assert_eq!(seen, vec![(1, 10), (2, 20), (0, 30)]);
        assert_eq!(barrier.state().completed(), 3);
        assert!(barrier.state().is_done());
        assert!(barrier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_panicked_task_still_arrives() {
        let handles = vec![tokio::spawn(async { panic!("probe exploded"); }), tokio::spawn(async {})];
        let mut barrier = CompletionBarrier::new(handles);

        let mut panics = 0;
        let mut arrivals = 0;
        while let Some(arrival) = barrier.next().await {
            arrivals += 1;
            if arrival.result.as_ref().is_err_and(|e| e.is_panic()) {
                panics += 1;
            }
        }

        assert_eq!(arrivals, 2);
        assert_eq!(panics, 1);
    }
}
