//! Domain model for tournaments, matches and the per-round state machine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cards::model::{Card, Difficulty};

/// Role given to members the server creates on its own.
pub const DEFAULT_MEMBER_ROLE: &str = "Member";

/// A single player belonging to a team.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamMember {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Role within the team, e.g. captain.
    pub role: String,
}

/// A competing team.
///
/// Teams are registered on the tournament, then copied into each match they
/// play so per-match scores stay independent of later matches.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Team {
    /// Stable identifier. The nil UUID marks a placeholder slot.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Score within the current match.
    pub score: i64,
    /// Registered players.
    pub members: Vec<TeamMember>,
    /// Display color, as a hex string.
    pub color: String,
    /// Avatar image identifier.
    pub image: String,
}

impl Team {
    /// Slot for a team not yet known, used in later bracket rounds.
    pub fn placeholder() -> Self {
        Self {
            id: Uuid::nil(),
            name: "TBD".to_string(),
            score: 0,
            members: Vec::new(),
            color: String::new(),
            image: String::new(),
        }
    }

    /// Whether this slot still waits for a winner from an earlier match.
    pub fn is_placeholder(&self) -> bool {
        self.id.is_nil()
    }
}

/// Phase of the per-round match state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchPhase {
    /// Match created but not started.
    Idle,
    /// Waiting for the first buzzer press.
    Buzzer,
    /// On-turn team picks one of the offered options.
    CategorySelect,
    /// Question dealt, answering team picks an answer.
    AnswerSelect,
    /// Game master approves or rejects the submitted answer.
    AnswerApproval,
    /// Dare dealt, answering team chooses truth or challenge.
    StrategySelect,
    /// Dare text revealed, waiting for confirmation to start.
    Reveal,
    /// Dare being performed, game master scores the outcome.
    Action,
    /// Round resolved, waiting for advancement.
    Scoring,
    /// All rounds played, match has a winner.
    Finished,
    /// Match terminated by the game master.
    End,
}

/// How the answering team responds to a dare card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Perform the dare themselves for full points.
    Truth,
    /// Challenge the opposing team to perform it for half points.
    Dare,
}

/// One of the category choices offered to the on-turn team.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryOption {
    /// Category name.
    pub category: String,
    /// Difficulty tier of this option.
    pub difficulty: Difficulty,
}

/// The card currently in play, if any.
#[derive(Debug, Clone, Default)]
pub enum ActiveCard {
    /// No card dealt.
    #[default]
    None,
    /// Truth card awaiting an answer.
    Question(Card),
    /// Dare card awaiting a strategy and performance.
    Dare(Card),
}

impl ActiveCard {
    /// The underlying card regardless of variant.
    pub fn card(&self) -> Option<&Card> {
        match self {
            ActiveCard::None => None,
            ActiveCard::Question(card) | ActiveCard::Dare(card) => Some(card),
        }
    }

    /// Whether no card is in play.
    pub fn is_none(&self) -> bool {
        matches!(self, ActiveCard::None)
    }
}

/// A bracket match between two teams.
#[derive(Debug, Clone)]
pub struct Match {
    /// Stable identifier.
    pub id: Uuid,
    /// Six-digit code players use to join the match room.
    pub join_code: String,
    /// First team slot.
    pub team_a: Team,
    /// Second team slot.
    pub team_b: Team,
    /// Current phase of the round state machine.
    pub phase: MatchPhase,
    /// Team whose turn it is to pick a category.
    pub current_turn_team: Option<Uuid>,
    /// Team answering the current card.
    pub answering_team: Option<Uuid>,
    /// Team that won the buzzer race, pending judgement.
    pub buzzer_winner: Option<Uuid>,
    /// Whether the buzzer has latched and further presses are ignored.
    pub buzzer_locked: bool,
    /// Option committed by the on-turn team.
    pub selected_option: Option<CategoryOption>,
    /// Strategy chosen for a dare card.
    pub selected_strategy: Option<Strategy>,
    /// Answer submitted for a truth card.
    pub selected_answer: Option<String>,
    /// Precomputed correctness of the submitted answer.
    pub answer_correct: Option<bool>,
    /// Card currently in play.
    pub active_card: ActiveCard,
    /// Options offered for the current pick.
    pub available_options: Vec<CategoryOption>,
    /// Seconds remaining on the countdown.
    pub timer: u32,
    /// Whether the countdown is ticking.
    pub timer_running: bool,
    /// Winner once the match finishes.
    pub winner: Option<Uuid>,
    /// One-based round counter; zero until the opening buzzer is judged.
    pub current_round: u32,
    /// Rounds to play before the match finishes.
    pub total_rounds: u32,
    /// Match the winner advances into, if any.
    pub next_match: Option<Uuid>,
}

impl Match {
    /// Create a fresh match in the idle phase.
    pub fn new(join_code: String, team_a: Team, team_b: Team, total_rounds: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            join_code,
            team_a,
            team_b,
            phase: MatchPhase::Idle,
            current_turn_team: None,
            answering_team: None,
            buzzer_winner: None,
            buzzer_locked: false,
            selected_option: None,
            selected_strategy: None,
            selected_answer: None,
            answer_correct: None,
            active_card: ActiveCard::None,
            available_options: Vec::new(),
            timer: 0,
            timer_running: false,
            winner: None,
            current_round: 0,
            total_rounds,
            next_match: None,
        }
    }

    /// Mutable reference to one of the two teams by id.
    pub fn team_mut(&mut self, id: Uuid) -> Option<&mut Team> {
        if self.team_a.id == id {
            Some(&mut self.team_a)
        } else if self.team_b.id == id {
            Some(&mut self.team_b)
        } else {
            None
        }
    }

    /// Id of the team opposing `id`, when `id` plays in this match.
    pub fn other_team_id(&self, id: Uuid) -> Option<Uuid> {
        if self.team_a.id == id {
            Some(self.team_b.id)
        } else if self.team_b.id == id {
            Some(self.team_a.id)
        } else {
            None
        }
    }

    /// Whether `id` plays in this match.
    pub fn has_team(&self, id: Uuid) -> bool {
        self.team_a.id == id || self.team_b.id == id
    }

    /// Reset everything that only lives for one round.
    pub fn clear_round_state(&mut self) {
        self.answering_team = None;
        self.buzzer_winner = None;
        self.buzzer_locked = false;
        self.selected_option = None;
        self.selected_strategy = None;
        self.selected_answer = None;
        self.answer_correct = None;
        self.active_card = ActiveCard::None;
        self.available_options = Vec::new();
        self.timer = 0;
        self.timer_running = false;
    }
}

/// Lifecycle of a tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Teams may register and settings may change.
    Registration,
    /// Bracket built, matches being played.
    Active,
    /// Final match resolved.
    Finished,
}

/// A tournament and its full bracket.
#[derive(Debug, Clone)]
pub struct Tournament {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Registered teams, in registration order.
    pub teams: IndexMap<Uuid, Team>,
    /// Bracket matches, first round first.
    pub matches: Vec<Match>,
    /// Match currently being played.
    pub current_match: Option<Uuid>,
    /// Lifecycle status.
    pub status: TournamentStatus,
    /// Maximum number of teams allowed to register.
    pub max_teams: usize,
    /// Minimum number of teams required to start.
    pub min_teams: usize,
    /// Minimum members every team needs before starting.
    pub min_members_per_team: usize,
    /// Countdown seconds for question cards.
    pub default_question_time: u32,
    /// Countdown seconds for dare performances.
    pub default_dare_time: u32,
    /// Rounds per match unless overridden on the match.
    pub default_rounds: u32,
    /// Whether rounds open with a buzzer race.
    pub buzzer_enabled: bool,
    /// Cards already dealt anywhere in the tournament.
    pub used_card_ids: std::collections::HashSet<Uuid>,
}

impl Tournament {
    /// The match currently being played, if any.
    pub fn current_match(&self) -> Option<&Match> {
        let id = self.current_match?;
        self.matches.iter().find(|m| m.id == id)
    }

    /// Mutable access to the match currently being played.
    pub fn current_match_mut(&mut self) -> Option<&mut Match> {
        let id = self.current_match?;
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Look up a match by id.
    pub fn match_by_id_mut(&mut self, id: Uuid) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }
}
