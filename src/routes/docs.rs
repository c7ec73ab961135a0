//! Swagger UI for the card administration REST surface.
//!
//! Game flow runs over the websocket and is not described here; the document
//! covers the health check and the card admin endpoints.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::services::documentation::ApiDoc;
use crate::state::SharedState;

/// Mount the interactive docs under `/docs`, backed by the raw OpenAPI
/// document at `/api-doc/openapi.json`.
pub fn router(state: SharedState) -> Router<SharedState> {
    let swagger = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());
    Router::from(swagger).with_state(state)
}
