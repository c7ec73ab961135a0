/// Card and category administration.
pub mod admin_service;
/// OpenAPI description.
pub mod documentation;
/// State broadcast helpers.
pub mod events;
/// Liveness reporting.
pub mod health_service;
/// Round state machine of a running match.
pub mod match_service;
/// Countdown control.
pub mod timer_service;
/// Tournament session lifecycle.
pub mod tournament_service;
/// Websocket connection handling.
pub mod websocket_service;
