//! Live feed subscriptions
//!
//! Each feed projects one store subscription into a read model. The read
//! model is a watch channel written only by the feed's subscription task and
//! replaced wholesale on every snapshot.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{COMMENTS_PATH, RECENT_SCORES_LIMIT, SCORES_PATH};
use crate::error::StoreResult;
use crate::records::{decode_comments, decode_recent_scores, CommentRecord, ScoreRecord};
use crate::store::{Query, RealtimeStore, Snapshot, SnapshotReceiver};

/// A running store subscription. Dropping it cancels the task.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    fn spawn<T, F>(mut receiver: SnapshotReceiver, model: Arc<watch::Sender<Vec<T>>>, decode: F, feed: &'static str) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Snapshot) -> Vec<T> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            while let Some(snapshot) = receiver.next().await {
                let items = decode(&snapshot);
                debug!("{} feed: {} records", feed, items.len());
                model.send_replace(items);
            }
            debug!("{} feed: store closed the subscription", feed);
        });
        Self { handle }
    }

    /// Cancel and wait until the task is gone, so it can no longer write
    pub async fn cancel(mut self) {
        self.handle.abort();
        let _ = (&mut self.handle).await;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A read model plus at most one subscription feeding it
pub struct LiveFeed<T> {
    model: Arc<watch::Sender<Vec<T>>>,
    active: Option<Subscription>,
}

impl<T: Clone + Send + Sync + 'static> LiveFeed<T> {
    pub fn new() -> Self {
        let (model, _) = watch::channel(Vec::new());
        Self {
            model: Arc::new(model),
            active: None,
        }
    }

    /// Observe the read model
    pub fn watch(&self) -> watch::Receiver<Vec<T>> {
        self.model.subscribe()
    }

    /// Current contents of the read model
    pub fn items(&self) -> Vec<T> {
        self.model.borrow().clone()
    }

    /// Whether a subscription is feeding the read model
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Replace the current subscription, if any, with a new one
    async fn start<F>(&mut self, receiver: SnapshotReceiver, decode: F, feed: &'static str)
    where
        F: Fn(&Snapshot) -> Vec<T> + Send + 'static,
    {
        self.stop().await;
        self.active = Some(Subscription::spawn(receiver, self.model.clone(), decode, feed));
    }

    /// Unsubscribe. The read model keeps its last contents.
    pub async fn stop(&mut self) {
        if let Some(subscription) = self.active.take() {
            subscription.cancel().await;
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for LiveFeed<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Feed read models of one screen session
pub struct FeedState {
    store: Arc<dyn RealtimeStore>,
    pub comments: LiveFeed<CommentRecord>,
    pub recent_scores: LiveFeed<ScoreRecord>,
    scores_user: Option<String>,
}

impl FeedState {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self {
            store,
            comments: LiveFeed::new(),
            recent_scores: LiveFeed::new(),
            scores_user: None,
        }
    }

    /// Subscribe to the whole comment feed
    pub async fn open_comments(&mut self) -> StoreResult<()> {
        let receiver = self.store.subscribe(Query::path(COMMENTS_PATH))?;
        self.comments.start(receiver, decode_comments, "comments").await;
        Ok(())
    }

    pub async fn close_comments(&mut self) {
        self.comments.stop().await;
    }

    /// Subscribe to the last few scores of `user_id`.
    ///
    /// Replaces a subscription for another user. Without a user id nothing is
    /// subscribed and any previous subscription is closed.
    pub async fn open_recent_scores(&mut self, user_id: &str) -> StoreResult<()> {
        if user_id.is_empty() {
            self.close_recent_scores().await;
            return Ok(());
        }

        let query = Query::path(format!("{}/{}", SCORES_PATH, user_id)).limit_to_last(RECENT_SCORES_LIMIT);
        let receiver = self.store.subscribe(query)?;
        self.recent_scores.start(receiver, decode_recent_scores, "scores").await;
        self.scores_user = Some(user_id.to_string());
        Ok(())
    }

    pub async fn close_recent_scores(&mut self) {
        self.recent_scores.stop().await;
        self.scores_user = None;
    }

    /// User whose scores are currently subscribed
    pub fn scores_user(&self) -> Option<&str> {
        self.scores_user.as_deref()
    }

    /// Close every subscription
    pub async fn close_all(&mut self) {
        self.close_comments().await;
        self.close_recent_scores().await;
    }
}
