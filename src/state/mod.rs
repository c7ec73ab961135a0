//! Shared application state.

use std::sync::Arc;

use dashmap::DashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cards::source::CardSource;
use crate::config::AppConfig;
use crate::state::game::Tournament;
use crate::state::hub::EventHub;
use crate::state::timer::TimerEngine;

/// Single-elimination bracket construction.
pub mod bracket;
/// Tournament and match domain model.
pub mod game;
/// Broadcast hub for server events.
pub mod hub;
/// Countdown task slot.
pub mod timer;

/// Bookkeeping for one connected websocket client.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    /// When the socket was accepted.
    pub connected_at: OffsetDateTime,
}

/// State shared by every handler and background task.
pub struct AppState {
    /// Runtime configuration.
    pub config: AppConfig,
    /// Card repository backend.
    pub cards: Arc<dyn CardSource>,
    /// The one live tournament, when a session is open.
    pub session: RwLock<Option<Tournament>>,
    /// Countdown task slot of the active match.
    pub timer: TimerEngine,
    /// Fan-out channel for server events.
    pub hub: EventHub,
    /// Connected websocket clients, keyed by connection id.
    pub clients: DashMap<Uuid, ClientConnection>,
}

/// Cheaply clonable handle to [`AppState`].
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Build the shared state around a card backend.
    pub fn new(config: AppConfig, cards: Arc<dyn CardSource>) -> SharedState {
        Arc::new(Self {
            config,
            cards,
            session: RwLock::new(None),
            timer: TimerEngine::new(),
            hub: EventHub::new(),
            clients: DashMap::new(),
        })
    }
}
