//! Concurrency limiting for per-host scan tasks.
//!
//! The default is unbounded fan-out: one task per live host, started
//! immediately. A bounded limiter caps the number of tasks in flight with a
//! semaphore; submission then waits for a free slot. Either way callers see
//! the same `submit` interface and the same results.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Gatekeeper for spawning scan tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskLimiter {
    bound: Option<(usize, Arc<Semaphore>)>,
}

impl TaskLimiter {
    /// No cap on concurrent tasks.
    pub fn unbounded() -> Self {
        Self { bound: None }
    }

    /// At most `limit` tasks in flight. A limit of 0 means unbounded.
    pub fn bounded(limit: usize) -> Self {
        if limit == 0 {
            return Self::unbounded();
        }
        Self {
            bound: Some((limit, Arc::new(Semaphore::new(limit)))),
        }
    }

    /// The configured cap, if any.
    pub fn limit(&self) -> Option<usize> {
        self.bound.as_ref().map(|(limit, _)| *limit)
    }

    /// Slots currently free, if bounded.
    pub fn available(&self) -> Option<usize> {
        self.bound.as_ref().map(|(_, s)| s.available_permits())
    }

    /// Spawn `task` into `tasks`, waiting for a slot if bounded.
    pub async fn submit<F>(&self, tasks: &mut JoinSet<()>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Some((_, semaphore)) = &self.bound else {
            tasks.spawn(task);
            return;
        };

        // The semaphore is never closed, so acquisition only fails if that
        // invariant is broken; the task is then not started.
        let Ok(permit) = Arc::clone(semaphore).acquire_owned().await else {
            return;
        };
        tasks.spawn(async move {
            task.await;
            drop(permit);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_zero_is_unbounded() {
        assert_eq!(TaskLimiter::bounded(0).limit(), None);
        assert_eq!(TaskLimiter::unbounded().available(), None);
        assert_eq!(TaskLimiter::bounded(4).limit(), Some(4));
    }

    #[tokio::test]
    async fn test_bounded_caps_in_flight_tasks() {
        let limiter = TaskLimiter::bounded(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();

        for _ in 0..6 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            limiter
                .submit(&mut tasks, async move {
                    let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    running.fetch_sub(1, Ordering::SeqCst);
                })
                .await;
        }
        while tasks.join_next().await.is_some() {}

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(limiter.available(), Some(2));
    }

    #[tokio::test]
    async fn test_unbounded_runs_everything() {
        let limiter = TaskLimiter::unbounded();
        let done = Arc::new(AtomicUsize::new(0));
        let mut tasks = JoinSet::new();
        for _ in 0..10 {
            let done = Arc::clone(&done);
            limiter
                .submit(&mut tasks, async move {
                    done.fetch_add(1, Ordering::SeqCst);
                })
                .await;
        }
        while tasks.join_next().await.is_some() {}
        assert_eq!(done.load(Ordering::SeqCst), 10);
    }
}
