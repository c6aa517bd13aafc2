//! Activation-keyed asynchronous loads exposed as an observable [`LoadState`].
//!
//! A [`LoadController`] owns one fetch function. Each call to
//! [`LoadController::activate`] flips the state to `Loading` before returning and
//! spawns exactly one fetch. Only the most recent activation may commit its
//! outcome; results from superseded activations are dropped on arrival.

use std::{
    fmt,
    future::Future,
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use futures::future::{BoxFuture, FutureExt};
use shared::error::ErrorInfo;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Loaded(T),
    Failed(ErrorInfo),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// True once the current activation has produced an outcome.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Failed(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

type FetchFn<K, T> = dyn Fn(K) -> BoxFuture<'static, Result<T, ErrorInfo>> + Send + Sync;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Activation<K> {
    key: K,
    generation: u64,
}

struct Slot<K> {
    active: Option<Activation<K>>,
    next_generation: u64,
}

struct Shared<K, T> {
    slot: Mutex<Slot<K>>,
    state_tx: watch::Sender<LoadState<T>>,
}

impl<K, T> Shared<K, T>
where
    K: PartialEq + fmt::Debug,
{
    /// Publishes `outcome` if `origin` is still the active activation.
    ///
    /// The slot lock is held across the comparison and the publish so a
    /// concurrent `activate` cannot slip in between.
    fn commit(&self, origin: &Activation<K>, outcome: Result<T, ErrorInfo>) -> bool {
        let slot = lock(&self.slot);
        if slot.active.as_ref() != Some(origin) {
            debug!(
                key = ?origin.key,
                generation = origin.generation,
                "discarding result of superseded load"
            );
            return false;
        }

        match outcome {
            Ok(value) => {
                info!(key = ?origin.key, generation = origin.generation, "load completed");
                self.state_tx.send_replace(LoadState::Loaded(value));
            }
            Err(error) => {
                warn!(
                    key = ?origin.key,
                    generation = origin.generation,
                    error = %error,
                    "load failed"
                );
                self.state_tx.send_replace(LoadState::Failed(error));
            }
        }
        true
    }
}

/// Drives one fetch per activation and exposes its outcome.
///
/// The controller is the only writer of its state; views read it through
/// [`state`](Self::state) or [`subscribe`](Self::subscribe). Dropping the
/// controller aborts fetches that are still in flight.
pub struct LoadController<K, T> {
    shared: Arc<Shared<K, T>>,
    fetch: Arc<FetchFn<K, T>>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<K, T> LoadController<K, T>
where
    K: Clone + PartialEq + fmt::Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Errors returned by `fetch` are converted into an [`ErrorInfo`], so the
    /// fetch side decides the hint shown for each concrete failure.
    pub fn new<F, Fut, E>(fetch: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<ErrorInfo> + Send + 'static,
    {
        let fetch: Arc<FetchFn<K, T>> = Arc::new(move |key: K| {
            let pending = fetch(key);
            async move { pending.await.map_err(Into::into) }.boxed()
        });
        let (state_tx, _) = watch::channel(LoadState::Idle);

        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    active: None,
                    next_generation: 0,
                }),
                state_tx,
            }),
            fetch,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Starts a fresh load for `key`, superseding any earlier activation.
    ///
    /// The state is `Loading` when this returns. Must be called from within a
    /// Tokio runtime.
    pub fn activate(&self, key: K) {
        let activation = {
            let mut slot = lock(&self.shared.slot);
            slot.next_generation += 1;
            let activation = Activation {
                key: key.clone(),
                generation: slot.next_generation,
            };
            if let Some(previous) = slot.active.replace(activation.clone()) {
                if previous.key != key {
                    debug!(from = ?previous.key, to = ?key, "superseding active load");
                }
            }
            self.shared.state_tx.send_replace(LoadState::Loading);
            activation
        };
        debug!(key = ?activation.key, generation = activation.generation, "activating load");

        let pending = (self.fetch)(key);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            // A panicking fetch still settles the activation instead of
            // leaving it in `Loading`.
            let outcome = AssertUnwindSafe(pending)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ErrorInfo::network_or_decode("fetch task panicked")));
            shared.commit(&activation, outcome);
        });

        let mut in_flight = lock(&self.in_flight);
        in_flight.retain(|task| !task.is_finished());
        in_flight.push(handle);
    }

    /// Re-runs the load for the active key. Returns false if never activated.
    pub fn refresh(&self) -> bool {
        match self.active_key() {
            Some(key) => {
                self.activate(key);
                true
            }
            None => false,
        }
    }

    pub fn active_key(&self) -> Option<K> {
        lock(&self.shared.slot)
            .active
            .as_ref()
            .map(|activation| activation.key.clone())
    }

    pub fn state(&self) -> LoadState<T> {
        self.shared.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.shared.state_tx.subscribe()
    }

    /// Waits until the current activation settles, or returns at once when idle.
    pub async fn settled(&self) -> LoadState<T> {
        let mut rx = self.subscribe();
        let outcome = rx
            .wait_for(|state| !state.is_loading())
            .await
            .map(|state| state.clone());
        outcome.unwrap_or_else(|_| self.state())
    }
}

impl<K, T> Drop for LoadController<K, T> {
    fn drop(&mut self) {
        let in_flight = self
            .in_flight
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for task in in_flight.drain(..) {
            task.abort();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/load_tests.rs"]
mod tests;
