//! Health check payloads.

use serde::Serialize;
use utoipa::ToSchema;

/// Liveness report.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `ok` while the process answers.
    pub status: &'static str,
    /// Websocket clients currently connected.
    pub connected_clients: usize,
    /// Whether a tournament session is open.
    pub tournament_active: bool,
}
