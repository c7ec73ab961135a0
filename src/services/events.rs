//! Helpers broadcasting fresh state snapshots to every client.

use crate::dto::game::{MatchSnapshot, TournamentSnapshot};
use crate::dto::ws::ServerMessage;
use crate::state::SharedState;

/// Broadcast a fresh tournament snapshot, when a session is open.
pub async fn broadcast_tournament(state: &SharedState) {
    let session = state.session.read().await;
    if let Some(tournament) = session.as_ref() {
        state
            .hub
            .publish(ServerMessage::TournamentState(TournamentSnapshot::from(
                tournament,
            )));
    }
}

/// Broadcast a fresh snapshot of the current match, when one exists.
pub async fn broadcast_match(state: &SharedState) {
    let session = state.session.read().await;
    if let Some(current) = session.as_ref().and_then(|t| t.current_match()) {
        state
            .hub
            .publish(ServerMessage::MatchState(MatchSnapshot::from(current)));
    }
}
