//! Persists final scores to the per-user score log

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::config::SCORES_PATH;
use crate::error::StoreResult;
use crate::records::ScoreRecord;
use crate::store::RealtimeStore;

/// Appends finished games to `scores/{uid}`
#[derive(Clone)]
pub struct ScoreRecorder {
    store: Arc<dyn RealtimeStore>,
}

impl ScoreRecorder {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }

    /// Record a final score.
    ///
    /// Empty games and anonymous players are not recorded; `Ok(None)` is
    /// returned for them. Otherwise the generated record key is returned.
    pub async fn record_score(&self, user_id: &str, points: u32) -> StoreResult<Option<String>> {
        if points == 0 || user_id.is_empty() {
            debug!("Not recording score {} for user {:?}", points, user_id);
            return Ok(None);
        }

        let path = format!("{}/{}", SCORES_PATH, user_id);
        let key = self
            .store
            .push(&path, ScoreRecord::to_value(points, Utc::now()))
            .await?;

        info!("Recorded score {} for user {} ({})", points, user_id, key);
        Ok(Some(key))
    }
}
