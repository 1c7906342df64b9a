//! Remote store abstraction
//!
//! The realtime store is a tree of JSON records addressed by slash separated
//! paths (`comments`, `scores/{uid}`). Records are appended under
//! store-generated keys and watched through snapshot subscriptions.
//! The in-memory implementation can be swapped for a hosted database.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::{StoreError, StoreResult};

pub mod blob;
pub mod identity;
pub mod memory;

pub use blob::{BlobStore, InMemoryBlobStore};
pub use identity::{IdentityProvider, InMemoryIdentity, ProfileUpdate, UserProfile};
pub use memory::InMemoryStore;

/// A snapshot of one path: an object of `record id -> record`, or `None`
/// when nothing was ever written there
pub type Snapshot = Option<Value>;

/// Trait for the shared, eventually consistent record store
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Append `value` under `path` with a generated key and return the key
    async fn push(&self, path: &str, value: Value) -> StoreResult<String>;

    /// Watch the snapshot selected by `query`
    fn subscribe(&self, query: Query) -> StoreResult<SnapshotReceiver>;
}

/// Selects the records a subscription observes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub path: String,
    pub limit_to_last: Option<usize>,
}

impl Query {
    /// All records under `path`
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            limit_to_last: None,
        }
    }

    /// Keep only the last `n` records in insertion order
    pub fn limit_to_last(mut self, n: usize) -> Self {
        self.limit_to_last = Some(n);
        self
    }
}

/// Receiving half of a subscription.
///
/// Yields the current snapshot first, then one snapshot per change. Only the
/// latest snapshot is kept: changes arriving faster than they are read
/// collapse into one.
#[derive(Debug)]
pub struct SnapshotReceiver {
    rx: watch::Receiver<Snapshot>,
    limit_to_last: Option<usize>,
    primed: bool,
}

impl SnapshotReceiver {
    pub fn new(rx: watch::Receiver<Snapshot>, limit_to_last: Option<usize>) -> Self {
        Self {
            rx,
            limit_to_last,
            primed: false,
        }
    }

    /// Wait for the next snapshot. Returns `None` once the store side is gone.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if self.primed && self.rx.changed().await.is_err() {
            return None;
        }
        self.primed = true;

        let snapshot = self.rx.borrow_and_update().clone();
        Some(match self.limit_to_last {
            Some(n) => keep_last(snapshot, n),
            None => snapshot,
        })
    }
}

/// Trim an object snapshot to its last `n` entries
fn keep_last(snapshot: Snapshot, n: usize) -> Snapshot {
    match snapshot {
        Some(Value::Object(map)) if map.len() > n => {
            let skip = map.len() - n;
            Some(Value::Object(map.into_iter().skip(skip).collect()))
        }
        other => other,
    }
}

/// Validate a slash separated store path
pub(crate) fn validate_path(path: &str) -> StoreResult<()> {
    let valid = !path.is_empty()
        && path.split('/').all(|segment| {
            !segment.is_empty() && !segment.contains(['.', '#', '$', '[', ']'])
        });

    if valid {
        Ok(())
    } else {
        Err(StoreError::invalid_path(path))
    }
}
