// Uploads that have started but not yet settled

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use uuid::Uuid;

/// Identity of one upload, independent of its position in the set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadId(Uuid);

impl UploadId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

type Settled = Shared<BoxFuture<'static, ()>>;
type Uploads = HashMap<UploadId, Settled>;

/// Set of in-flight uploads.
///
/// Each upload runs as its own Tokio task and removes itself from the set
/// when it settles, whatever the outcome.
#[derive(Clone, Default)]
pub struct PendingUploads {
    inner: Arc<Mutex<Uploads>>,
}

/// Removes an upload from the set when its task finishes or unwinds
struct SettleGuard {
    id: UploadId,
    uploads: Arc<Mutex<Uploads>>,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        let mut uploads = match self.uploads.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        uploads.remove(&self.id);
        tracing::debug!(upload = %self.id, remaining = uploads.len(), "upload settled");
    }
}

impl PendingUploads {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Uploads> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Start `upload` on `runtime` and track it until it settles
    pub fn track<F>(&self, runtime: &Handle, upload: F) -> UploadId
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = UploadId::new();
        let shared = Arc::clone(&self.inner);

        // Hold the lock across spawn and insert so the guard cannot remove
        // the entry before it exists.
        let mut uploads = self.lock();
        let handle = runtime.spawn(async move {
            let _guard = SettleGuard {
                id,
                uploads: shared,
            };
            upload.await;
        });
        let settled = handle.map(|_| ()).boxed().shared();
        uploads.insert(id, settled);
        tracing::debug!(upload = %id, pending = uploads.len(), "upload started");

        id
    }

    fn snapshot(&self) -> Vec<Settled> {
        self.lock().values().cloned().collect()
    }

    /// Resolves once every upload pending at call time has settled
    pub fn settle_all(&self) -> BoxFuture<'static, ()> {
        let pending = self.snapshot();
        async move {
            futures::future::join_all(pending).await;
        }
        .boxed()
    }

    pub fn contains(&self, id: UploadId) -> bool {
        self.lock().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget all tracked uploads. Their tasks keep running.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl fmt::Debug for PendingUploads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingUploads")
            .field("pending", &self.len())
            .finish()
    }
}
