//! Countdown control for the active match.
//!
//! The countdown runs as a dedicated task ticking once per second. Every tick
//! re-resolves the current match under the session write lock, so the loop
//! survives match changes and simply ends itself when its match is gone. The
//! loop never touches the engine slot, which lets stop operations await the
//! task for an acknowledged shutdown.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::dto::ws::{ServerMessage, TimerPayload};
use crate::error::ServiceError;
use crate::services::events;
use crate::state::SharedState;

/// Start or restart the countdown.
///
/// With `seconds` given the clock is reset to that value first; otherwise the
/// countdown resumes from whatever is on the clock. Zero seconds on the clock
/// end the countdown on its first tick.
pub async fn start_timer(state: &SharedState, seconds: Option<u32>) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        let current = tournament
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if let Some(seconds) = seconds {
            current.timer = seconds;
        }
        current.timer_running = true;
    }
    spawn_countdown(state).await;
    events::broadcast_match(state).await;
    Ok(())
}

/// Stop the countdown, keeping the remaining seconds on the clock.
pub async fn stop_timer(state: &SharedState) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        if let Some(current) = tournament.current_match_mut() {
            current.timer_running = false;
        }
    }
    state.timer.stop().await;
    events::broadcast_match(state).await;
    Ok(())
}

/// Add (or with a negative value, remove) seconds from the clock.
pub async fn add_time(state: &SharedState, seconds: i32) -> Result<(), ServiceError> {
    let remaining = {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        let current = tournament
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        current.timer = current.timer.saturating_add_signed(seconds);
        current.timer
    };
    state
        .hub
        .publish(ServerMessage::TimerUpdate(TimerPayload { seconds: remaining }));
    events::broadcast_match(state).await;
    Ok(())
}

/// Install a fresh countdown task, stopping any previous one first.
pub async fn spawn_countdown(state: &SharedState) {
    let task_state = state.clone();
    state
        .timer
        .replace(move |cancelled| tokio::spawn(countdown_loop(task_state, cancelled)))
        .await;
}

/// Stop the countdown task without touching match state.
pub async fn halt_countdown(state: &SharedState) {
    state.timer.stop().await;
}

enum Tick {
    Running(u32),
    Ended,
}

async fn countdown_loop(state: SharedState, mut cancelled: watch::Receiver<bool>) {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval fires immediately; swallow it so the
    // clock only moves after a full second.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancelled.changed() => return,
            _ = ticker.tick() => {}
        }
        if *cancelled.borrow() {
            return;
        }

        let tick = advance_clock(&state).await;
        match tick {
            Tick::Running(seconds) => {
                state
                    .hub
                    .publish(ServerMessage::TimerUpdate(TimerPayload { seconds }));
            }
            Tick::Ended => {
                state.hub.publish(ServerMessage::TimerEnd);
                events::broadcast_match(&state).await;
                debug!("countdown finished");
                return;
            }
        }
    }
}

/// Decrement the clock of the current match by one second.
///
/// Reaching zero still announces the zero; the end is reported on the tick
/// after, once the clock has sat at zero for a full second.
async fn advance_clock(state: &SharedState) -> Tick {
    let mut session = state.session.write().await;
    let current = session.as_mut().and_then(|t| t.current_match_mut());
    let Some(current) = current else {
        return Tick::Ended;
    };
    if !current.timer_running || current.timer == 0 {
        current.timer_running = false;
        return Tick::Ended;
    }
    current.timer -= 1;
    Tick::Running(current.timer)
}
