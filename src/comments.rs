//! Posting to the global comment feed

use tracing::info;

use crate::config::{COMMENTS_PATH, MAX_COMMENT_LEN};
use crate::error::CommentError;
use crate::records::CommentRecord;
use crate::store::RealtimeStore;

/// Append a comment to the feed and return its record id
pub async fn post_comment(store: &dyn RealtimeStore, text: &str) -> Result<String, CommentError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CommentError::Empty);
    }
    if text.chars().count() > MAX_COMMENT_LEN {
        return Err(CommentError::TooLong { max: MAX_COMMENT_LEN });
    }

    let id = store.push(COMMENTS_PATH, CommentRecord::to_value(text)).await?;
    info!("Comment {} posted", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::decode_comments;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn test_post_trims_and_stores() {
        let store = InMemoryStore::new();
        let id = post_comment(&store, "  great game ").await.unwrap();

        let comments = decode_comments(&store.snapshot(COMMENTS_PATH));
        assert_eq!(comments, vec![CommentRecord { id, comment: "great game".into() }]);
    }

    #[tokio::test]
    async fn test_rejects_blank_and_long() {
        let store = InMemoryStore::new();
        assert!(matches!(post_comment(&store, " \n ").await, Err(CommentError::Empty)));

        let long = "x".repeat(MAX_COMMENT_LEN + 1);
        assert!(matches!(post_comment(&store, &long).await, Err(CommentError::TooLong { .. })));
        assert_eq!(store.snapshot(COMMENTS_PATH), None);
    }

    #[tokio::test]
    async fn test_store_failure() {
        let store = InMemoryStore::new();
        store.set_online(false);
        assert!(matches!(post_comment(&store, "hi").await, Err(CommentError::Store(_))));
    }
}
