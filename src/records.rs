//! Typed records stored in the realtime store
//!
//! Snapshots arrive as JSON objects keyed by record id. Decoding never fails:
//! a missing snapshot is an empty list and malformed records are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::store::Snapshot;

/// One finished game in a user's score log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreRecord {
    /// Store-generated record id
    pub key: String,
    pub points: u32,
    /// When the game ended; absent for records written by older clients
    pub date: Option<ScoreDate>,
}

/// Timestamp of a score record as far as it could be understood
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ScoreDate {
    /// RFC 3339 text or epoch milliseconds
    Parsed(DateTime<Utc>),
    /// Free-form text such as a locale formatted date, shown as is
    Raw(String),
}

impl ScoreDate {
    /// Interpret a stored `date` field. Unusable values give `None`.
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Some(
                DateTime::parse_from_rfc3339(text)
                    .map(|d| ScoreDate::Parsed(d.with_timezone(&Utc)))
                    .unwrap_or_else(|_| ScoreDate::Raw(text.clone())),
            ),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .map(ScoreDate::Parsed),
            _ => None,
        }
    }
}

/// One entry of the global comment feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    /// Store-generated record id
    pub id: String,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
struct StoredScore {
    points: u32,
    #[serde(default)]
    date: Value,
}

#[derive(Debug, Deserialize)]
struct StoredComment {
    #[serde(alias = "comment")]
    text: String,
}

impl ScoreRecord {
    /// Stored form of a new score
    pub fn to_value(points: u32, date: DateTime<Utc>) -> Value {
        json!({ "points": points, "date": date.to_rfc3339() })
    }
}

impl CommentRecord {
    /// Stored form of a new comment
    pub fn to_value(text: &str) -> Value {
        json!({ "text": text })
    }
}

/// Entries of an object snapshot in store order
fn entries(snapshot: &Snapshot) -> impl Iterator<Item = (&String, &Value)> {
    snapshot
        .as_ref()
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|records| records.iter())
}

/// Project a comments snapshot into the feed, keeping store order
pub fn decode_comments(snapshot: &Snapshot) -> Vec<CommentRecord> {
    entries(snapshot)
        .filter_map(|(id, value)| match StoredComment::deserialize(value) {
            Ok(stored) => Some(CommentRecord {
                id: id.clone(),
                comment: stored.text,
            }),
            Err(e) => {
                warn!("Skipping malformed comment {}: {}", id, e);
                None
            }
        })
        .collect()
}

/// Project a score-log snapshot into a most-recent-first history
pub fn decode_recent_scores(snapshot: &Snapshot) -> Vec<ScoreRecord> {
    let mut scores: Vec<ScoreRecord> = entries(snapshot)
        .filter_map(|(key, value)| match StoredScore::deserialize(value) {
            Ok(stored) => Some(ScoreRecord {
                key: key.clone(),
                points: stored.points,
                date: ScoreDate::from_value(&stored.date),
            }),
            Err(e) => {
                warn!("Skipping malformed score {}: {}", key, e);
                None
            }
        })
        .collect();
    scores.reverse();
    scores
}
