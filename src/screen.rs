//! Screen session - everything one mounted game screen owns
//!
//! A screen owns its game session and tick loop, the feed subscriptions of
//! its open views, and the profile edits in progress. Every update for the
//! client goes through the outbox channel.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::comments::post_comment;
use crate::config::GRID_SIZE;
use crate::feeds::FeedState;
use crate::game::input::{Command, InputOutcome};
use crate::game::scheduler::{SharedSession, TickScheduler};
use crate::profile::ProfileEditState;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::GameSession;
use crate::state::AppState;
use crate::store::UserProfile;

/// One mounted screen
pub struct ScreenSession {
    id: Uuid,
    token: String,
    app: Arc<AppState>,
    user: Option<UserProfile>,
    game: SharedSession,
    scheduler: TickScheduler,
    feeds: FeedState,
    /// Present while the profile view is open
    profile_edit: Option<ProfileEditState>,
    outbox: UnboundedSender<ServerMessage>,
    forwarders: Vec<JoinHandle<()>>,
}

impl ScreenSession {
    /// Mount a screen for the user behind `token` and start its game loop.
    /// Unknown tokens get an anonymous screen whose scores are not recorded.
    pub async fn mount(app: Arc<AppState>, token: &str, outbox: UnboundedSender<ServerMessage>) -> Self {
        let id = Uuid::new_v4();
        let user = app.identity.current_user(token).await;
        let uid = user.as_ref().map(|u| u.uid.as_str());

        let game = GameSession::new(id.to_string(), uid, app.recorder(), app.event_logger.clone());
        let game: SharedSession = Arc::new(Mutex::new(game));

        app.sessions.insert(id, uid.unwrap_or_default().to_string());
        app.event_logger.log_session_start(&id.to_string(), uid);
        info!("Screen {} mounted (user {:?})", id, uid);

        let feeds = FeedState::new(app.store.clone());
        let forwarders = vec![
            forward(feeds.comments.watch(), outbox.clone(), |data| ServerMessage::Comments { data }),
            forward(feeds.recent_scores.watch(), outbox.clone(), |data| ServerMessage::Scores { data }),
        ];

        let _ = outbox.send(ServerMessage::Welcome {
            session: id.to_string(),
            user: user.clone(),
            grid_size: GRID_SIZE,
            tick_ms: app.tick_period.as_millis() as u64,
        });
        let _ = outbox.send(ServerMessage::State {
            state: game.lock().await.state().clone(),
        });

        let mut scheduler = TickScheduler::new(app.tick_period);
        scheduler.start(game.clone(), outbox.clone()).await;

        Self {
            id,
            token: token.to_string(),
            app,
            user,
            game,
            scheduler,
            feeds,
            profile_edit: None,
            outbox,
            forwarders,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// The game session driven by this screen
    pub fn game(&self) -> &SharedSession {
        &self.game
    }

    /// Feed subscriptions of this screen
    pub fn feeds(&self) -> &FeedState {
        &self.feeds
    }

    /// Handle one client message. `Break` means the screen should close.
    pub async fn handle(&mut self, msg: ClientMessage) -> ControlFlow<()> {
        match msg {
            ClientMessage::Direction { direction } => {
                let outcome = self.game.lock().await.command(Command::Turn(direction));
                if outcome == InputOutcome::Ignored {
                    debug!("Screen {} ignored {:?}: game over", self.id, direction);
                }
            }
            ClientMessage::Restart => {
                let state = {
                    let mut game = self.game.lock().await;
                    game.command(Command::Restart);
                    game.state().clone()
                };
                self.send(ServerMessage::State { state });
            }
            ClientMessage::OpenComments => {
                if let Err(e) = self.feeds.open_comments().await {
                    warn!("Screen {} could not open comments: {}", self.id, e);
                    self.send(ServerMessage::notice("Comments", e.to_string()));
                }
            }
            ClientMessage::CloseComments => self.feeds.close_comments().await,
            ClientMessage::OpenProfile => self.open_profile().await,
            ClientMessage::CloseProfile => self.close_profile().await,
            ClientMessage::ProfileName { name } => {
                if let Some(edit) = self.profile_edit.as_mut() {
                    edit.name = name;
                }
            }
            ClientMessage::ProfileAvatar { bytes } => {
                if let Some(edit) = self.profile_edit.as_mut() {
                    edit.pending_avatar = Some(bytes);
                }
            }
            ClientMessage::SaveProfile => self.save_profile().await,
            ClientMessage::PostComment { text } => {
                if let Err(e) = post_comment(self.app.store.as_ref(), &text).await {
                    self.send(ServerMessage::notice("Comment", e.to_string()));
                }
            }
            ClientMessage::SignOut => match self.app.profiles().sign_out(&self.token).await {
                Ok(()) => {
                    info!("Screen {} signed out", self.id);
                    self.send(ServerMessage::SignedOut);
                    return ControlFlow::Break(());
                }
                Err(_) => {
                    self.send(ServerMessage::alert("Error", "Could not sign out."));
                }
            },
            ClientMessage::Ping => {
                debug!("Ping from screen {}", self.id);
            }
        }
        ControlFlow::Continue(())
    }

    async fn open_profile(&mut self) {
        let Some(user) = self.user.as_ref() else {
            self.send(ServerMessage::notice("Profile", "Sign in to see your profile."));
            return;
        };

        self.profile_edit = Some(ProfileEditState::from_profile(user));
        let uid = user.uid.clone();
        if let Err(e) = self.feeds.open_recent_scores(&uid).await {
            warn!("Screen {} could not open score history: {}", self.id, e);
            self.send(ServerMessage::notice("Scores", e.to_string()));
        }
    }

    async fn close_profile(&mut self) {
        self.profile_edit = None;
        self.feeds.close_recent_scores().await;
    }

    async fn save_profile(&mut self) {
        if self.user.is_none() || self.profile_edit.is_none() {
            self.send(ServerMessage::notice("Profile", "Open your profile first."));
            return;
        }
        let (Some(user), Some(edit)) = (self.user.as_ref(), self.profile_edit.as_mut()) else {
            return;
        };

        let result = self.app.profiles().save(user, edit).await;
        match result {
            Ok(updated) => {
                self.user = Some(updated.clone());
                self.close_profile().await;
                self.send(ServerMessage::Profile { user: updated });
                self.send(ServerMessage::notice("Profile", "Profile updated."));
            }
            Err(e) => {
                warn!("Screen {} profile update failed: {}", self.id, e);
                self.send(ServerMessage::notice("Profile", e.to_string()));
            }
        }
    }

    fn send(&self, msg: ServerMessage) {
        let _ = self.outbox.send(msg);
    }

    /// Tear the screen down: stop the game loop and every subscription
    pub async fn unmount(mut self) {
        self.scheduler.stop().await;
        self.feeds.close_all().await;
        for forwarder in self.forwarders.drain(..) {
            forwarder.abort();
        }

        self.app.sessions.remove(&self.id);
        self.app.event_logger.log_session_end(&self.id.to_string());
        info!("Screen {} unmounted", self.id);
    }
}

impl Drop for ScreenSession {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}

/// Push every read model change to the client
fn forward<T, F>(mut rx: watch::Receiver<Vec<T>>, outbox: UnboundedSender<ServerMessage>, wrap: F) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(Vec<T>) -> ServerMessage + Send + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let items = rx.borrow_and_update().clone();
            if outbox.send(wrap(items)).is_err() {
                break;
            }
        }
    })
}
