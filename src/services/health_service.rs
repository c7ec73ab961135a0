//! Liveness reporting.

use crate::dto::health::HealthResponse;
use crate::state::SharedState;

/// Build the liveness report.
pub async fn health(state: &SharedState) -> HealthResponse {
    HealthResponse {
        status: "ok",
        connected_clients: state.clients.len(),
        tournament_active: state.session.read().await.is_some(),
    }
}
