//! Application state shared across all handlers

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use uuid::Uuid;

use crate::config::TICK_DELAY_MS;
use crate::event_logger::EventLogger;
use crate::profile::ProfileService;
use crate::score_recorder::ScoreRecorder;
use crate::store::{BlobStore, IdentityProvider, InMemoryBlobStore, InMemoryIdentity, InMemoryStore, RealtimeStore};

/// Shared application state
pub struct AppState {
    /// Realtime store holding scores and comments
    pub store: Arc<dyn RealtimeStore>,
    /// Authentication service
    pub identity: Arc<dyn IdentityProvider>,
    /// Avatar storage
    pub blobs: Arc<dyn BlobStore>,
    /// Event logger for replay/analysis
    pub event_logger: Arc<EventLogger>,
    /// Mounted screen sessions, keyed by session id, with their user id
    pub sessions: DashMap<Uuid, String>,
    /// Period of every session's game loop
    pub tick_period: Duration,
}

impl AppState {
    /// Create a new application state with in-memory collaborators
    pub fn new() -> Self {
        Self::with_services(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryIdentity::new()),
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(EventLogger::new()),
        )
    }

    /// Create with custom collaborators (for testing or hosted services)
    pub fn with_services(
        store: Arc<dyn RealtimeStore>,
        identity: Arc<dyn IdentityProvider>,
        blobs: Arc<dyn BlobStore>,
        event_logger: Arc<EventLogger>,
    ) -> Self {
        Self {
            store,
            identity,
            blobs,
            event_logger,
            sessions: DashMap::new(),
            tick_period: Duration::from_millis(TICK_DELAY_MS),
        }
    }

    /// Override the game loop period
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Score recorder bound to the store
    pub fn recorder(&self) -> ScoreRecorder {
        ScoreRecorder::new(self.store.clone())
    }

    /// Profile operations bound to the identity provider and blob store
    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.identity.clone(), self.blobs.clone())
    }

    /// Get the number of mounted screen sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
