//! Request id → cancellation handle bookkeeping.
//!
//! Entries live exactly as long as their task: a guard owned by the spawned
//! future removes the entry when the future finishes, panics or is dropped,
//! so ids become reusable the moment a request reaches a terminal state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::data::RequestId;
use crate::error::{Error, Result};

/// Result of [`CancellationRegistry::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelStatus {
    /// The request was in flight and has been asked to stop.
    Signalled,
    /// No request with that id is in flight.
    Unknown,
}

#[derive(Debug)]
struct Registration {
    token: CancellationToken,
    generation: u64,
}

type Entries = Arc<Mutex<HashMap<RequestId, Registration>>>;

/// Spawns request tasks and tracks their cancellation handles by id.
#[derive(Debug)]
pub struct CancellationRegistry {
    entries: Entries,
    generation: AtomicU64,
    runtime: Handle,
}

impl CancellationRegistry {
    pub fn new(runtime: Handle) -> Self {
        Self {
            entries: Arc::default(),
            generation: AtomicU64::new(0),
            runtime,
        }
    }

    /// Start `work` under a fresh cancellation token keyed by `id`.
    ///
    /// Fails with [`Error::DuplicateId`] if `id` is still in flight; `work`
    /// is not started in that case.
    pub fn register<F, Fut>(&self, id: RequestId, work: F) -> Result<JoinHandle<Fut::Output>>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let token = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        {
            let mut entries = lock(&self.entries);
            if entries.contains_key(&id) {
                return Err(Error::DuplicateId(id));
            }
            entries.insert(
                id,
                Registration {
                    token: token.clone(),
                    generation,
                },
            );
        }

        let guard = RegistrationGuard {
            entries: Arc::clone(&self.entries),
            id,
            generation,
        };
        let task = work(token);
        Ok(self.runtime.spawn(async move {
            let _guard = guard;
            task.await
        }))
    }

    /// Ask the request `id` to stop. Unknown ids are a no-op.
    pub fn cancel(&self, id: RequestId) -> CancelStatus {
        match lock(&self.entries).get(&id) {
            Some(registration) => {
                registration.token.cancel();
                CancelStatus::Signalled
            }
            None => CancelStatus::Unknown,
        }
    }

    /// Signal every in-flight request once. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let entries = lock(&self.entries);
        for registration in entries.values() {
            registration.token.cancel();
        }
        entries.len()
    }

    pub fn contains(&self, id: RequestId) -> bool {
        lock(&self.entries).contains_key(&id)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The map holds no cross-entry invariant, so a poisoned lock is still usable.
fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<RequestId, Registration>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

struct RegistrationGuard {
    entries: Entries,
    id: RequestId,
    generation: u64,
}

impl Drop for RegistrationGuard {
    fn drop(&mut self) {
        let mut entries = lock(&self.entries);
        if entries
            .get(&self.id)
            .is_some_and(|registration| registration.generation == self.generation)
        {
            entries.remove(&self.id);
        }
    }
}
