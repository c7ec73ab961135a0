/// REST payloads for the card administration surface.
pub mod admin;
/// Wire snapshots of tournaments and matches.
pub mod game;
/// Health check payloads.
pub mod health;
/// Websocket protocol envelopes.
pub mod ws;
