//! Per-key single-flight execution.
//!
//! The first caller for a key runs the operation; concurrent callers for the
//! same key await the published result of that one run instead of starting a
//! second. Distinct keys never serialize against each other. The in-flight
//! entry is removed when the leader finishes or is dropped, so a later cache
//! miss starts a fresh run.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;
use tokio::sync::watch;

/// Registry of in-flight operations, keyed by `K`, publishing `V`.
pub struct SingleFlight<K, V> {
    inflight: Mutex<HashMap<K, watch::Receiver<Option<V>>>>,
}

enum Role<V> {
    Leader(watch::Sender<Option<V>>),
    Waiter(watch::Receiver<Option<V>>),
}

/// Removes the in-flight entry when the leader finishes or is dropped, so
/// waiters are never left watching a dead channel forever.
struct FlightGuard<'a, K: Eq + Hash, V> {
    owner: &'a SingleFlight<K, V>,
    key: K,
}

impl<K: Eq + Hash, V> Drop for FlightGuard<'_, K, V> {
    fn drop(&mut self) {
        self.owner.inflight.lock().unwrap().remove(&self.key);
    }
}

impl<K, V> SingleFlight<K, V> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for SingleFlight<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    /// Runs `op` under `key`, or joins the in-flight run for the same key.
    ///
    /// Returns `None` only when the leading run was dropped before it could
    /// publish a result (its caller was cancelled); callers should treat
    /// that as a failed attempt.
    pub async fn run<F, Fut>(&self, key: &K, op: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let role = {
            let mut inflight = self.inflight.lock().unwrap();
            if let Some(rx) = inflight.get(key) {
                Role::Waiter(rx.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                inflight.insert(key.clone(), rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Leader(tx) => {
                let guard = FlightGuard {
                    owner: self,
                    key: key.clone(),
                };
                let value = op().await;
                // Publish before removing the entry so every waiter that
                // joined this flight observes the result.
                let _ = tx.send(Some(value.clone()));
                drop(guard);
                Some(value)
            }
            Role::Waiter(mut rx) => match rx.wait_for(Option::is_some).await {
                Ok(published) => published.clone(),
                // Leader dropped without publishing.
                Err(_) => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_run() {
        let flights: Arc<SingleFlight<String, u64>> = Arc::new(SingleFlight::new());
        let runs = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(Notify::new());

        // The leader's op is gated so every other caller joins the same
        // flight before it can complete. Single-threaded test runtime:
        // yield_now gives each spawned task a chance to register.
        let mut handles = Vec::new();
        for _ in 0..32 {
            let flights = Arc::clone(&flights);
            let runs = Arc::clone(&runs);
            let release = Arc::clone(&release);
            handles.push(tokio::spawn(async move {
                flights
                    .run(&"key".to_string(), || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        release.notified().await;
                        42u64
                    })
                    .await
            }));
        }
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
        release.notify_one();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some(42));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_waiters_observe_leader_result() {
        let flights: Arc<SingleFlight<u32, String>> = Arc::new(SingleFlight::new());
        let release = Arc::new(Notify::new());

        let leader = {
            let flights = Arc::clone(&flights);
            let release = Arc::clone(&release);
            tokio::spawn(async move {
                flights
                    .run(&1, || async {
                        release.notified().await;
                        "leader-value".to_string()
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        let waiter = {
            let flights = Arc::clone(&flights);
            tokio::spawn(async move {
                flights
                    .run(&1, || async { panic!("waiter must not execute the op") })
                    .await
            })
        };
        tokio::task::yield_now().await;

        release.notify_one();
        assert_eq!(leader.await.unwrap().as_deref(), Some("leader-value"));
        assert_eq!(waiter.await.unwrap().as_deref(), Some("leader-value"));
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_serialize() {
        let flights: Arc<SingleFlight<u32, u32>> = Arc::new(SingleFlight::new());
        let release = Arc::new(Notify::new());

        // Key 1 is stuck until released.
        let stuck = {
            let flights = Arc::clone(&flights);
            let release = Arc::clone(&release);
            tokio::spawn(async move {
                flights
                    .run(&1, || async {
                        release.notified().await;
                        1
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;

        // Key 2 completes immediately despite key 1 being in flight.
        let free = flights.run(&2, || async { 2 }).await;
        assert_eq!(free, Some(2));

        release.notify_one();
        assert_eq!(stuck.await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_dropped_leader_wakes_waiters_with_no_result() {
        let flights: Arc<SingleFlight<u32, u32>> = Arc::new(SingleFlight::new());
        let started = Arc::new(Notify::new());

        let leader = {
            let flights = Arc::clone(&flights);
            let started = Arc::clone(&started);
            tokio::spawn(async move {
                flights
                    .run(&1, || async {
                        started.notify_one();
                        std::future::pending::<u32>().await
                    })
                    .await
            })
        };
        started.notified().await;

        let waiter = {
            let flights = Arc::clone(&flights);
            tokio::spawn(async move { flights.run(&1, || async { 99 }).await })
        };
        tokio::task::yield_now().await;

        leader.abort();
        assert!(leader.await.is_err());
        // The waiter joined the aborted flight, so it gets no result.
        assert_eq!(waiter.await.unwrap(), None);

        // The key is free again: a fresh run executes normally.
        assert_eq!(flights.run(&1, || async { 7 }).await, Some(7));
    }
}
