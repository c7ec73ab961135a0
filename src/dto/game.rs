//! Wire representations of the tournament and match state.
//!
//! Domain state is never serialized directly; these snapshots fix the field
//! names clients rely on and project the active card into the shape the
//! frontend expects.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cards::model::Card;
use crate::state::game::{
    ActiveCard, CategoryOption, Match, MatchPhase, Strategy, Team, Tournament, TournamentStatus,
};

/// Which slot the card in play occupies, as clients read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActiveCardKind {
    /// A trivia question is being answered.
    Question,
    /// A dare is being performed.
    Dare,
}

/// Snapshot of a single match as sent to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    /// Match identifier.
    pub id: Uuid,
    /// Join code for this match room.
    pub game_code: String,
    /// First team, including its match score.
    pub team_a: Team,
    /// Second team, including its match score.
    pub team_b: Team,
    /// Current phase of the round state machine.
    pub phase: MatchPhase,
    /// Team whose turn it is.
    pub current_turn_team_id: Option<Uuid>,
    /// Team answering the current card.
    pub answering_team_id: Option<Uuid>,
    /// Team that won the buzzer race.
    pub buzzer_winner_id: Option<Uuid>,
    /// Whether the buzzer has latched.
    pub buzzer_locked: bool,
    /// Option committed for this round.
    pub selected_option: Option<CategoryOption>,
    /// Strategy chosen for a dare.
    pub selected_strategy: Option<Strategy>,
    /// Answer submitted for a question.
    pub selected_answer: Option<String>,
    /// Whether the submitted answer matched.
    pub answer_correct: Option<bool>,
    /// Question card in play, when the active card is a question.
    pub current_question: Option<Card>,
    /// Dare card in play, when the active card is a dare.
    pub current_card: Option<Card>,
    /// Type of the card in play.
    pub current_card_type: Option<ActiveCardKind>,
    /// Options offered for the current pick.
    pub available_options: Vec<CategoryOption>,
    /// Seconds remaining on the countdown.
    pub timer: u32,
    /// Whether the countdown is ticking.
    pub timer_running: bool,
    /// Winner once the match finishes.
    pub winner_id: Option<Uuid>,
    /// One-based round counter.
    pub current_round: u32,
    /// Rounds to play.
    pub total_rounds: u32,
    /// Match the winner advances into.
    pub next_match_id: Option<Uuid>,
}

impl From<&Match> for MatchSnapshot {
    fn from(value: &Match) -> Self {
        let (current_question, current_card, current_card_type) = match &value.active_card {
            ActiveCard::None => (None, None, None),
            ActiveCard::Question(card) => {
                (Some(card.clone()), None, Some(ActiveCardKind::Question))
            }
            ActiveCard::Dare(card) => (None, Some(card.clone()), Some(ActiveCardKind::Dare)),
        };
        Self {
            id: value.id,
            game_code: value.join_code.clone(),
            team_a: value.team_a.clone(),
            team_b: value.team_b.clone(),
            phase: value.phase,
            current_turn_team_id: value.current_turn_team,
            answering_team_id: value.answering_team,
            buzzer_winner_id: value.buzzer_winner,
            buzzer_locked: value.buzzer_locked,
            selected_option: value.selected_option.clone(),
            selected_strategy: value.selected_strategy,
            selected_answer: value.selected_answer.clone(),
            answer_correct: value.answer_correct,
            current_question,
            current_card,
            current_card_type,
            available_options: value.available_options.clone(),
            timer: value.timer,
            timer_running: value.timer_running,
            winner_id: value.winner,
            current_round: value.current_round,
            total_rounds: value.total_rounds,
            next_match_id: value.next_match,
        }
    }
}

/// Snapshot of the whole tournament as sent to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSnapshot {
    /// Tournament identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Registered teams, in registration order.
    pub teams: Vec<Team>,
    /// Bracket matches, first round first.
    pub matches: Vec<MatchSnapshot>,
    /// Match currently being played.
    pub current_match_id: Option<Uuid>,
    /// Lifecycle status.
    pub status: TournamentStatus,
    /// Maximum number of teams.
    pub max_teams: usize,
    /// Minimum number of teams required to start.
    pub min_teams: usize,
    /// Minimum members per team required to start.
    pub min_members_per_team: usize,
    /// Countdown seconds for questions.
    pub default_question_time: u32,
    /// Countdown seconds for dares.
    pub default_dare_time: u32,
    /// Rounds per match.
    pub default_rounds: u32,
    /// Whether rounds open with a buzzer race.
    pub buzzer_enabled: bool,
    /// Cards already dealt in this tournament.
    pub used_card_ids: Vec<Uuid>,
}

impl From<&Tournament> for TournamentSnapshot {
    fn from(value: &Tournament) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            teams: value.teams.values().cloned().collect(),
            matches: value.matches.iter().map(MatchSnapshot::from).collect(),
            current_match_id: value.current_match,
            status: value.status,
            max_teams: value.max_teams,
            min_teams: value.min_teams,
            min_members_per_team: value.min_members_per_team,
            default_question_time: value.default_question_time,
            default_dare_time: value.default_dare_time,
            default_rounds: value.default_rounds,
            buzzer_enabled: value.buzzer_enabled,
            used_card_ids: value.used_card_ids.iter().copied().collect(),
        }
    }
}

/// Result of checking whether a tournament may start.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// Whether every start requirement is met.
    pub is_valid: bool,
    /// Blocking problems.
    pub errors: Vec<String>,
    /// Non-blocking remarks.
    pub warnings: Vec<String>,
}

/// Result of a join-code lookup.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CodeCheckResult {
    /// Whether the code matched a match room.
    pub valid: bool,
    /// The matched room, when valid.
    pub match_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::model::{CardType, Difficulty};
    use serde_json::Value;

    fn sample_match() -> Match {
        let team = |name: &str| Team {
            id: Uuid::new_v4(),
            name: name.to_string(),
            score: 0,
            members: Vec::new(),
            color: "#e6194b".to_string(),
            image: "shield".to_string(),
        };
        Match::new("123456".into(), team("A"), team("B"), 10)
    }

    #[test]
    fn snapshot_uses_wire_field_names() {
        let snapshot = MatchSnapshot::from(&sample_match());
        let json: Value = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("gameCode").is_some());
        assert!(json.get("currentTurnTeamId").is_some());
        assert!(json.get("timerRunning").is_some());
        assert_eq!(json["phase"], "IDLE");
    }

    #[test]
    fn active_card_projects_into_the_matching_slot() {
        let mut m = sample_match();
        m.active_card = ActiveCard::Dare(Card {
            id: Uuid::new_v4(),
            category: "Music".into(),
            text: "sing".into(),
            difficulty: Difficulty::Easy,
            points: 100,
            card_type: CardType::Dare,
            answers: Vec::new(),
            correct_answer: String::new(),
        });

        let snapshot = MatchSnapshot::from(&m);
        assert!(snapshot.current_question.is_none());
        assert!(snapshot.current_card.is_some());
        assert_eq!(snapshot.current_card_type, Some(ActiveCardKind::Dare));
    }

    #[test]
    fn card_type_and_card_kind_use_their_own_wire_values() {
        let mut m = sample_match();
        m.active_card = ActiveCard::Dare(Card {
            id: Uuid::new_v4(),
            category: "Music".into(),
            text: "sing".into(),
            difficulty: Difficulty::Easy,
            points: 100,
            card_type: CardType::Dare,
            answers: Vec::new(),
            correct_answer: String::new(),
        });

        let json: Value = serde_json::to_value(MatchSnapshot::from(&m)).unwrap();
        assert_eq!(json["currentCardType"], "dare");
        assert_eq!(json["currentCard"]["type"], "DARE");

        let truth = serde_json::to_value(CardType::Truth).unwrap();
        assert_eq!(truth, "TRUTH");
    }
}
