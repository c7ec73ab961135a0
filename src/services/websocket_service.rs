//! Websocket connection handling.
//!
//! Each connection gets a writer task fed by an mpsc channel; broadcast
//! events from the hub and direct replies both go through it, so a slow peer
//! only ever blocks its own channel. Request-level errors are sent to the
//! requesting client alone and never broadcast.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use time::OffsetDateTime;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dto::game::{MatchSnapshot, TournamentSnapshot};
use crate::dto::ws::{ClientRequest, ErrorPayload, ServerMessage};
use crate::error::ServiceError;
use crate::services::{match_service, timer_service, tournament_service};
use crate::state::{ClientConnection, SharedState};

/// Per-connection outbound queue size.
const OUTBOUND_CAPACITY: usize = 64;

/// Drive one websocket connection until the peer disconnects.
pub async fn handle_socket(socket: WebSocket, state: SharedState) {
    let client_id = Uuid::new_v4();
    state.clients.insert(
        client_id,
        ClientConnection {
            connected_at: OffsetDateTime::now_utc(),
        },
    );
    info!(%client_id, clients = state.clients.len(), "client connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_CAPACITY);

    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(text) => {
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(err) => warn!(error = %err, "failed to serialize outbound event"),
            }
        }
        let _ = sink.close().await;
    });

    let mut events = state.hub.subscribe();
    let forward_tx = tx.clone();
    let forwarder = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(message) => {
                    if forward_tx.send(message).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "client fell behind the event stream");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    send_initial_state(&state, &tx).await;

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => handle_text(&state, &tx, text.as_str()).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    drop(tx);
    forwarder.abort();
    let _ = writer.await;
    state.clients.remove(&client_id);
    info!(%client_id, clients = state.clients.len(), "client disconnected");
}

/// Catch a freshly connected client up with the current state.
async fn send_initial_state(state: &SharedState, tx: &mpsc::Sender<ServerMessage>) {
    let session = state.session.read().await;
    if let Some(tournament) = session.as_ref() {
        let _ = tx
            .send(ServerMessage::TournamentState(TournamentSnapshot::from(
                tournament,
            )))
            .await;
        if let Some(current) = tournament.current_match() {
            let _ = tx
                .send(ServerMessage::MatchState(MatchSnapshot::from(current)))
                .await;
        }
    }
}

async fn handle_text(state: &SharedState, tx: &mpsc::Sender<ServerMessage>, text: &str) {
    let request: ClientRequest = match serde_json::from_str(text) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "unparseable client message");
            send_error(tx, format!("invalid message: {err}")).await;
            return;
        }
    };
    if let Err(err) = dispatch(state, tx, request).await {
        send_error(tx, err.to_string()).await;
    }
}

async fn dispatch(
    state: &SharedState,
    tx: &mpsc::Sender<ServerMessage>,
    request: ClientRequest,
) -> Result<(), ServiceError> {
    match request {
        ClientRequest::TournamentCreate(payload) => tournament_service::create(state, payload).await,
        ClientRequest::TournamentUpdate(payload) => {
            tournament_service::update(state, payload.name).await
        }
        ClientRequest::TournamentUpdateSettings(payload) => {
            tournament_service::update_settings(state, payload).await
        }
        ClientRequest::TournamentRandomize(payload) => {
            tournament_service::randomize_teams(state, payload).await
        }
        ClientRequest::TournamentValidate => {
            let report = tournament_service::validate_start(state).await?;
            let _ = tx.send(ServerMessage::TournamentValidation(report)).await;
            Ok(())
        }
        ClientRequest::TournamentStart => tournament_service::start_tournament(state).await,
        ClientRequest::TournamentNextMatch => tournament_service::next_match(state).await,
        ClientRequest::TournamentEnd => tournament_service::end_tournament(state).await,
        ClientRequest::TournamentGetState => {
            let session = state.session.read().await;
            let tournament = session.as_ref().ok_or(ServiceError::NoTournament)?;
            let _ = tx
                .send(ServerMessage::TournamentState(TournamentSnapshot::from(
                    tournament,
                )))
                .await;
            Ok(())
        }

        ClientRequest::TeamRegister(payload) => {
            tournament_service::register_team(state, payload).await
        }
        ClientRequest::TeamUpdate(payload) => {
            tournament_service::update_team(state, payload.team_id, payload.name).await
        }
        ClientRequest::TeamDelete(payload) => {
            tournament_service::delete_team(state, payload.team_id).await
        }
        ClientRequest::TeamAddMember(payload) => {
            tournament_service::add_member(state, payload.team_id, payload.name, payload.role).await
        }
        ClientRequest::TeamUpdateMember(payload) => {
            tournament_service::update_member(
                state,
                payload.team_id,
                payload.member_id,
                payload.name,
                payload.role,
            )
            .await
        }
        ClientRequest::TeamRemoveMember(payload) => {
            tournament_service::remove_member(state, payload.team_id, payload.member_id).await
        }
        ClientRequest::TeamUpdateColor(payload) => {
            tournament_service::update_color(state, payload.team_id, payload.color).await
        }
        ClientRequest::TeamUpdateImage(payload) => {
            tournament_service::update_image(state, payload.team_id, payload.image).await
        }

        ClientRequest::MatchGetState => {
            let session = state.session.read().await;
            let current = session
                .as_ref()
                .ok_or(ServiceError::NoTournament)?
                .current_match()
                .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
            let _ = tx
                .send(ServerMessage::MatchState(MatchSnapshot::from(current)))
                .await;
            Ok(())
        }
        ClientRequest::MatchStart(payload) => {
            match_service::start_match(state, payload.match_id).await
        }
        ClientRequest::MatchUpdateRounds(payload) => {
            match_service::update_rounds(state, payload.match_id, payload.total_rounds).await
        }
        ClientRequest::MatchEnd => match_service::end_match(state).await,

        ClientRequest::GameCheckCode(payload) => {
            let result = match_service::check_code(state, &payload.code).await?;
            let _ = tx.send(ServerMessage::CodeResult(result)).await;
            Ok(())
        }
        ClientRequest::GameBuzzer(payload) => {
            match_service::press_buzzer(state, payload.team_id).await
        }
        ClientRequest::GameJudgeBuzzer(payload) => {
            match_service::judge_buzzer(state, payload.team_id).await
        }
        ClientRequest::GameSelectOption(payload) => {
            match_service::select_option(state, payload.option_index).await
        }
        ClientRequest::GameSelectAnswer(payload) => {
            match_service::select_answer(state, payload.answer).await
        }
        ClientRequest::GameApproveAnswer(payload) => {
            match_service::approve_answer(state, payload.approved).await
        }
        ClientRequest::GameSelectStrategy(payload) => {
            match_service::select_strategy(state, &payload.strategy).await
        }
        ClientRequest::GameConfirmReveal => match_service::confirm_reveal(state).await,
        ClientRequest::GameScoreAction(payload) => {
            match_service::score_action(state, payload.success).await
        }
        ClientRequest::GameNextRound => match_service::next_round(state).await,

        ClientRequest::TimerStart(payload) => {
            timer_service::start_timer(state, payload.seconds).await
        }
        ClientRequest::TimerStop => timer_service::stop_timer(state).await,
        ClientRequest::TimerAdd(payload) => timer_service::add_time(state, payload.seconds).await,
    }
}

async fn send_error(tx: &mpsc::Sender<ServerMessage>, message: String) {
    let _ = tx
        .send(ServerMessage::Error(ErrorPayload { message }))
        .await;
}
