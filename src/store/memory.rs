//! In-memory realtime store backed by one watch channel per path

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use super::{validate_path, Query, RealtimeStore, Snapshot, SnapshotReceiver};
use crate::error::{StoreError, StoreResult};

/// In-memory realtime store
pub struct InMemoryStore {
    /// Snapshot channel per path
    paths: DashMap<String, watch::Sender<Snapshot>>,
    /// When false every write fails with `StoreError::Unavailable`
    online: AtomicBool,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            paths: DashMap::new(),
            online: AtomicBool::new(true),
        }
    }

    /// Toggle simulated connectivity for writes
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Current snapshot of a path
    pub fn snapshot(&self, path: &str) -> Snapshot {
        self.paths.get(path).and_then(|tx| tx.borrow().clone())
    }

    /// Get the number of live subscriptions on a path
    pub fn subscriber_count(&self, path: &str) -> usize {
        self.paths.get(path).map(|tx| tx.receiver_count()).unwrap_or(0)
    }

    fn sender(&self, path: &str) -> dashmap::mapref::one::RefMut<'_, String, watch::Sender<Snapshot>> {
        self.paths
            .entry(path.to_string())
            .or_insert_with(|| watch::channel(None).0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RealtimeStore for InMemoryStore {
    async fn push(&self, path: &str, value: Value) -> StoreResult<String> {
        validate_path(path)?;
        if !self.online.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("push to {path} rejected: offline")));
        }

        let key = Uuid::new_v4().simple().to_string();

        self.sender(path).send_modify(|snapshot| {
            if !matches!(snapshot, Some(Value::Object(_))) {
                *snapshot = Some(Value::Object(Map::new()));
            }
            if let Some(Value::Object(records)) = snapshot {
                records.insert(key.clone(), value);
            }
        });

        debug!("Pushed record {} to {}", key, path);
        Ok(key)
    }

    fn subscribe(&self, query: Query) -> StoreResult<SnapshotReceiver> {
        validate_path(&query.path)?;
        let rx = self.sender(&query.path).subscribe();
        Ok(SnapshotReceiver::new(rx, query.limit_to_last))
    }
}
