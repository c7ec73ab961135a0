//! Round state machine of a running match.
//!
//! Game actions arriving in the wrong phase are ignored without an error so
//! stale clients cannot corrupt a round. Operations that need a card draw
//! release the session lock while the card source is queried and re-validate
//! the phase before committing, so a slow draw can never overwrite a state
//! that moved on in the meantime.

use rand::{rng, seq::IndexedRandom, seq::SliceRandom};
use tracing::{debug, info};
use uuid::Uuid;

use crate::cards::model::{Card, CardType, Category, Difficulty};
use crate::cards::source::draw_for_option;
use crate::dto::game::CodeCheckResult;
use crate::dto::ws::{NoCardsNotice, ServerMessage};
use crate::error::ServiceError;
use crate::services::{events, timer_service};
use crate::state::SharedState;
use crate::state::game::{ActiveCard, CategoryOption, MatchPhase, Strategy};

/// Timer action decided under the session lock, applied after it is released.
enum TimerCmd {
    None,
    Start,
    Stop,
}

/// Whether an operation changed state. Ignored operations broadcast nothing.
enum Outcome {
    Applied(TimerCmd),
    Ignored,
}

/// Start a match, opening the buzzer race.
///
/// Without a `match_id` the tournament's current match starts. Every match
/// opens in the buzzer phase; the race decides which team picks first and the
/// round counter stays at zero until the race is judged. Starting a match
/// that already left the idle phase is ignored.
pub async fn start_match(state: &SharedState, match_id: Option<Uuid>) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        if let Some(id) = match_id {
            if tournament.match_by_id_mut(id).is_none() {
                return Err(ServiceError::NotFound(format!("match {id} does not exist")));
            }
            tournament.current_match = Some(id);
        }
        let current = tournament
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::Idle {
            Outcome::Ignored
        } else {
            current.phase = MatchPhase::Buzzer;
            current.active_card = ActiveCard::None;
            info!(match_id = %current.id, "match started");
            Outcome::Applied(TimerCmd::None)
        }
    };
    finish(state, outcome, true).await
}

/// Latch the buzzer on the first press.
///
/// Later presses, presses outside the buzzer phase and presses from teams not
/// playing this match are ignored. A latched buzzer freezes the clock.
pub async fn press_buzzer(state: &SharedState, team_id: Uuid) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::Buzzer || current.buzzer_locked || !current.has_team(team_id)
        {
            Outcome::Ignored
        } else {
            current.buzzer_winner = Some(team_id);
            current.buzzer_locked = true;
            current.timer_running = false;
            debug!(%team_id, "buzzer latched");
            Outcome::Applied(TimerCmd::Stop)
        }
    };
    finish(state, outcome, false).await
}

/// Judge the buzzer race.
///
/// Confirming a team makes it the on-turn team, opens round one and moves to
/// category selection; judging without a team reopens the race. When no
/// category options can be drawn the race reopens instead of advancing.
pub async fn judge_buzzer(state: &SharedState, team_id: Option<Uuid>) -> Result<(), ServiceError> {
    let categories = state.cards.list_categories().await?;
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::Buzzer {
            Outcome::Ignored
        } else {
            match team_id {
                Some(team_id) if current.has_team(team_id) => {
                    let options = generate_options(&categories);
                    if options.is_empty() {
                        current.buzzer_winner = None;
                        current.buzzer_locked = false;
                    } else {
                        current.current_turn_team = Some(team_id);
                        current.answering_team = None;
                        current.current_round = 1;
                        current.phase = MatchPhase::CategorySelect;
                        current.available_options = options;
                    }
                    Outcome::Applied(TimerCmd::None)
                }
                Some(_) => Outcome::Ignored,
                None => {
                    current.buzzer_winner = None;
                    current.buzzer_locked = false;
                    Outcome::Applied(TimerCmd::None)
                }
            }
        }
    };
    finish(state, outcome, false).await
}

/// Commit one of the offered options and deal a card for it.
///
/// The draw prefers cards matching both category and difficulty, falls back
/// to the category alone and never repeats a card already dealt in this
/// tournament. When nothing is left a `game:no_cards` event is broadcast and
/// the phase stays put.
pub async fn select_option(state: &SharedState, option_index: usize) -> Result<(), ServiceError> {
    // Phase one: validate and collect what the draw needs.
    let (option, exclude) = {
        let session = state.session.read().await;
        let tournament = session.as_ref().ok_or(ServiceError::NoTournament)?;
        let current = tournament
            .current_match()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::CategorySelect {
            return Ok(());
        }
        let Some(option) = current.available_options.get(option_index).cloned() else {
            return Err(ServiceError::InvalidInput(format!(
                "option index {option_index} out of range"
            )));
        };
        (option, tournament.used_card_ids.clone())
    };

    let drawn =
        draw_for_option(state.cards.as_ref(), &option.category, option.difficulty, &exclude)
            .await?;
    let Some(card) = drawn else {
        info!(category = %option.category, "no cards left for the committed option");
        state.hub.publish(ServerMessage::NoCards(NoCardsNotice {
            category: option.category,
            difficulty: option.difficulty,
        }));
        return Ok(());
    };

    // Phase two: commit, unless the state moved on during the draw.
    let outcome = {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        let question_time = tournament.default_question_time;
        let card_id = card.id;
        let current = tournament
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::CategorySelect {
            Outcome::Ignored
        } else {
            current.selected_option = Some(option);
            let cmd = deal_card(current, card, question_time);
            tournament.used_card_ids.insert(card_id);
            Outcome::Applied(cmd)
        }
    };
    finish(state, outcome, true).await
}

/// Put a freshly drawn card into play and move to its answer phase.
fn deal_card(current: &mut crate::state::game::Match, card: Card, question_time: u32) -> TimerCmd {
    match card.card_type {
        CardType::Truth => {
            current.answering_team = current.current_turn_team;
            current.active_card = ActiveCard::Question(card);
            current.phase = MatchPhase::AnswerSelect;
            current.timer = question_time;
            if question_time > 0 {
                current.timer_running = true;
                TimerCmd::Start
            } else {
                TimerCmd::None
            }
        }
        CardType::Dare => {
            current.answering_team = current.current_turn_team;
            current.active_card = ActiveCard::Dare(card);
            current.phase = MatchPhase::StrategySelect;
            TimerCmd::None
        }
    }
}

/// Submit an answer to the question in play.
///
/// Correctness is precomputed here (trimmed, case-insensitive) but only
/// becomes final once the game master approves.
pub async fn select_answer(state: &SharedState, answer: String) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::AnswerSelect {
            Outcome::Ignored
        } else {
            let correct = current
                .active_card
                .card()
                .map(|card| answers_match(&answer, &card.correct_answer))
                .unwrap_or(false);
            current.selected_answer = Some(answer);
            current.answer_correct = Some(correct);
            current.phase = MatchPhase::AnswerApproval;
            current.timer_running = false;
            Outcome::Applied(TimerCmd::Stop)
        }
    };
    finish(state, outcome, false).await
}

/// Approve or reject the submitted answer and score the round.
///
/// A question pays full points to the on-turn team when the game master
/// approves and the precomputed comparison agreed. A dare answered truthfully
/// pays half points (rounded down) to the answering team; a rejected dare
/// answer pays half points to the on-turn team instead.
pub async fn approve_answer(state: &SharedState, approved: bool) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::AnswerApproval {
            Outcome::Ignored
        } else {
            let correct = approved && current.answer_correct.unwrap_or(false);
            current.answer_correct = Some(correct);
            let points = current
                .active_card
                .card()
                .map(|c| i64::from(c.points))
                .unwrap_or(0);
            let award = match &current.active_card {
                ActiveCard::Question(_) if correct => {
                    current.current_turn_team.map(|id| (id, points))
                }
                ActiveCard::Dare(_) if correct => {
                    current.answering_team.map(|id| (id, points / 2))
                }
                ActiveCard::Dare(_) => current.current_turn_team.map(|id| (id, points / 2)),
                _ => None,
            };
            if let Some((team_id, points)) = award {
                if let Some(team) = current.team_mut(team_id) {
                    team.score += points;
                }
            }
            current.phase = MatchPhase::Scoring;
            Outcome::Applied(TimerCmd::None)
        }
    };
    finish(state, outcome, true).await
}

/// Choose how the dare in play is answered.
///
/// `TRUTH` keeps the dare with the on-turn team for full points; anything
/// else challenges the opposing team for half points.
pub async fn select_strategy(state: &SharedState, strategy: &str) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::StrategySelect {
            Outcome::Ignored
        } else {
            let chosen = if strategy.eq_ignore_ascii_case("truth") {
                Strategy::Truth
            } else {
                Strategy::Dare
            };
            current.selected_strategy = Some(chosen);
            current.answering_team = match chosen {
                Strategy::Truth => current.current_turn_team,
                Strategy::Dare => current
                    .current_turn_team
                    .and_then(|id| current.other_team_id(id)),
            };
            current.phase = MatchPhase::Reveal;
            Outcome::Applied(TimerCmd::None)
        }
    };
    finish(state, outcome, false).await
}

/// Confirm the revealed dare and start the performance clock.
pub async fn confirm_reveal(state: &SharedState) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        let dare_time = tournament.default_dare_time;
        let current = tournament
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::Reveal {
            Outcome::Ignored
        } else {
            current.phase = MatchPhase::Action;
            current.timer = dare_time;
            if dare_time > 0 {
                current.timer_running = true;
                Outcome::Applied(TimerCmd::Start)
            } else {
                Outcome::Applied(TimerCmd::None)
            }
        }
    };
    finish(state, outcome, false).await
}

/// Score the dare performance.
///
/// Self-play pays full points on success and nothing on failure. A challenge
/// pays half points (rounded down) to the performing team on success, or half
/// points to the on-turn team when the performance fails.
pub async fn score_action(state: &SharedState, success: bool) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::Action {
            Outcome::Ignored
        } else {
            let points = current
                .active_card
                .card()
                .map(|c| i64::from(c.points))
                .unwrap_or(0);
            let award = match (current.selected_strategy, success) {
                (Some(Strategy::Truth), true) => current.current_turn_team.map(|id| (id, points)),
                (Some(Strategy::Truth), false) => None,
                (Some(Strategy::Dare), true) => {
                    current.answering_team.map(|id| (id, points / 2))
                }
                (Some(Strategy::Dare), false) => {
                    current.current_turn_team.map(|id| (id, points / 2))
                }
                (None, _) => None,
            };
            if let Some((team_id, points)) = award {
                if let Some(team) = current.team_mut(team_id) {
                    team.score += points;
                }
            }
            current.phase = MatchPhase::Scoring;
            current.timer_running = false;
            Outcome::Applied(TimerCmd::Stop)
        }
    };
    finish(state, outcome, true).await
}

/// Advance to the next round, or finish the match after the last one.
///
/// The turn passes to the other team and all per-round state is reset. The
/// buzzer race only happens once per match, so later rounds go straight to
/// category selection. When every round is played the team with the higher
/// score wins; a tie goes to the first team slot.
pub async fn next_round(state: &SharedState) -> Result<(), ServiceError> {
    let categories = state.cards.list_categories().await?;
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if current.phase != MatchPhase::Scoring {
            Outcome::Ignored
        } else {
            current.current_round += 1;
            if current.current_round > current.total_rounds {
                current.phase = MatchPhase::Finished;
                current.winner = Some(if current.team_b.score > current.team_a.score {
                    current.team_b.id
                } else {
                    current.team_a.id
                });
                current.clear_round_state();
                info!(match_id = %current.id, winner = ?current.winner, "match finished");
            } else {
                current.current_turn_team = current
                    .current_turn_team
                    .and_then(|id| current.other_team_id(id));
                current.clear_round_state();
                current.phase = MatchPhase::CategorySelect;
                current.available_options = generate_options(&categories);
            }
            Outcome::Applied(TimerCmd::Stop)
        }
    };
    finish(state, outcome, true).await
}

/// Terminate the current match from any phase.
pub async fn end_match(state: &SharedState) -> Result<(), ServiceError> {
    let outcome = {
        let mut session = state.session.write().await;
        let current = session
            .as_mut()
            .ok_or(ServiceError::NoTournament)?
            .current_match_mut()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        current.phase = MatchPhase::End;
        current.timer_running = false;
        current.timer = 0;
        info!(match_id = %current.id, "match terminated");
        Outcome::Applied(TimerCmd::Stop)
    };
    finish(state, outcome, true).await
}

/// Change the round count of a match.
pub async fn update_rounds(
    state: &SharedState,
    match_id: Uuid,
    total_rounds: u32,
) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        let target = tournament
            .match_by_id_mut(match_id)
            .ok_or_else(|| ServiceError::NotFound(format!("match {match_id} does not exist")))?;
        if total_rounds == 0 {
            return Err(ServiceError::InvalidInput("round count must be positive".into()));
        }
        if target.phase != MatchPhase::Idle && total_rounds < target.current_round {
            return Err(ServiceError::InvalidInput(
                "round count cannot drop below the round being played".into(),
            ));
        }
        target.total_rounds = total_rounds;
    }
    events::broadcast_tournament(state).await;
    events::broadcast_match(state).await;
    Ok(())
}

/// Check a join code against the match currently being played.
///
/// Codes of other bracket matches are not valid; players can only join the
/// room that is live.
pub async fn check_code(state: &SharedState, code: &str) -> Result<CodeCheckResult, ServiceError> {
    let session = state.session.read().await;
    let found = session
        .as_ref()
        .and_then(|tournament| tournament.current_match())
        .filter(|m| m.join_code == code);
    Ok(CodeCheckResult {
        valid: found.is_some(),
        match_id: found.map(|m| m.id),
    })
}

/// Offer three options, each with its own random difficulty, cycling through
/// the shuffled categories when fewer than three exist.
fn generate_options(categories: &[Category]) -> Vec<CategoryOption> {
    if categories.is_empty() {
        return Vec::new();
    }
    let mut names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    names.shuffle(&mut rng());
    (0..3)
        .map(|i| CategoryOption {
            category: names[i % names.len()].to_string(),
            difficulty: *Difficulty::ALL
                .choose(&mut rng())
                .unwrap_or(&Difficulty::Easy),
        })
        .collect()
}

/// Trimmed, case-insensitive answer comparison.
fn answers_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

/// Apply the timer command and broadcast the results of an applied operation.
async fn finish(
    state: &SharedState,
    outcome: Outcome,
    include_tournament: bool,
) -> Result<(), ServiceError> {
    let Outcome::Applied(cmd) = outcome else {
        return Ok(());
    };
    match cmd {
        TimerCmd::None => {}
        TimerCmd::Start => timer_service::spawn_countdown(state).await,
        TimerCmd::Stop => timer_service::halt_countdown(state).await,
    }
    if include_tournament {
        events::broadcast_tournament(state).await;
    }
    events::broadcast_match(state).await;
    Ok(())
}
