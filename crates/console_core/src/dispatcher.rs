//! Per-key serialization of row mutations.
//!
//! A key stays registered for exactly as long as its mutation future runs;
//! unrelated keys never wait on each other.

use std::{
    collections::BTreeSet,
    fmt,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{debug, warn};

use crate::{
    controller::{FetchOutcome, ResourceListController},
    error::{ClientError, ClientResult},
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionKey(String);

impl ActionKey {
    pub fn status(id: impl fmt::Display) -> Self {
        Self(format!("status-{id}"))
    }

    pub fn visibility(id: impl fmt::Display) -> Self {
        Self(format!("visibility-{id}"))
    }

    pub fn decision(order_id: impl fmt::Display) -> Self {
        Self(format!("decision-{order_id}"))
    }

    pub fn close(problem_id: impl fmt::Display) -> Self {
        Self(format!("close-{problem_id}"))
    }

    pub fn horoscope(id: impl fmt::Display) -> Self {
        Self(format!("horoscope-{id}"))
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of the keys currently in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionState {
    in_flight: BTreeSet<ActionKey>,
}

impl ActionState {
    pub fn is_in_flight(&self, key: &ActionKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ActionKey> {
        self.in_flight.iter()
    }
}

#[derive(Clone, Default)]
pub struct ActionDispatcher {
    in_flight: Arc<Mutex<BTreeSet<ActionKey>>>,
}

struct InFlight {
    key: ActionKey,
    registry: Arc<Mutex<BTreeSet<ActionKey>>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ActionState {
        ActionState {
            in_flight: self
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }

    fn acquire(&self, key: ActionKey) -> ClientResult<InFlight> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.contains(&key) {
            debug!(%key, "rejecting duplicate action");
            return Err(ClientError::ActionInProgress {
                key: key.to_string(),
            });
        }
        in_flight.insert(key.clone());
        Ok(InFlight {
            key,
            registry: Arc::clone(&self.in_flight),
        })
    }

    /// Runs `mutation` unless `key` is already in flight. The mutation is not
    /// invoked at all when the key is busy.
    pub async fn run<T, F, Fut>(&self, key: ActionKey, mutation: F) -> ClientResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let guard = self.acquire(key)?;
        let result = mutation().await;
        if let Err(err) = &result {
            warn!(key = %guard.key, error = %err, "action failed");
        }
        drop(guard);
        result
    }

    /// Like [`Self::run`], calling `on_success` after the key is released.
    pub async fn run_with<T, F, Fut>(
        &self,
        key: ActionKey,
        mutation: F,
        on_success: impl FnOnce(&T),
    ) -> ClientResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let value = self.run(key, mutation).await?;
        on_success(&value);
        Ok(value)
    }

    /// Runs the mutation and, only if it succeeded, refreshes `controller`.
    pub async fn run_then_refresh<T, R, F, Fut>(
        &self,
        key: ActionKey,
        mutation: F,
        controller: &ResourceListController<R>,
    ) -> ClientResult<T>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let value = self.run(key, mutation).await?;
        if let FetchOutcome::Failed(err) = controller.refresh().await {
            debug!(resource = controller.label(), error = %err, "refresh after action failed");
        }
        Ok(value)
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
