//! Websocket protocol envelopes.
//!
//! Clients send `{"action": "...", "payload": {...}}`; the server replies and
//! broadcasts `{"event": "...", "data": {...}}`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::cards::model::Difficulty;
use crate::dto::game::{CodeCheckResult, MatchSnapshot, TournamentSnapshot, ValidationReport};

/// Payload for `tournament:create`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentPayload {
    /// Tournament display name.
    pub name: String,
    /// Registration cap; defaults to eight when omitted.
    pub max_teams: Option<usize>,
}

/// Payload for `tournament:update`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTournamentPayload {
    /// New display name.
    pub name: String,
}

/// Payload for `tournament:update_settings`. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    /// Registration cap.
    pub max_teams: Option<usize>,
    /// Minimum teams required to start.
    pub min_teams: Option<usize>,
    /// Minimum members per team required to start.
    pub min_members_per_team: Option<usize>,
    /// Countdown seconds for questions.
    pub default_question_time: Option<u32>,
    /// Countdown seconds for dares.
    pub default_dare_time: Option<u32>,
    /// Rounds per match.
    pub default_rounds: Option<u32>,
    /// Whether rounds open with a buzzer race.
    pub buzzer_enabled: Option<bool>,
}

/// Payload for `tournament:randomize`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RandomizePayload {
    /// Player names to shuffle across the teams.
    #[serde(default)]
    pub names: Vec<String>,
}

/// Payload for `team:register`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeamPayload {
    /// Team display name.
    pub name: String,
    /// Initial member names.
    #[serde(default)]
    pub members: Vec<String>,
    /// Display color; must not already be taken. Defaults to the palette.
    pub color: Option<String>,
    /// Avatar image identifier.
    pub image: Option<String>,
}

/// Payload addressing a team by id with a new name.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamNamePayload {
    /// Team to modify.
    pub team_id: Uuid,
    /// New name.
    pub name: String,
}

/// Payload addressing a team by id.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamIdPayload {
    /// Team to act on.
    pub team_id: Uuid,
}

/// Payload for `team:add_member`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberPayload {
    /// Team to extend.
    pub team_id: Uuid,
    /// Member display name.
    pub name: String,
    /// Member role; defaults to `Member` when omitted.
    #[serde(default)]
    pub role: String,
}

/// Payload addressing a member within a team.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPayload {
    /// Team the member belongs to.
    pub team_id: Uuid,
    /// Member to act on.
    pub member_id: Uuid,
    /// New name, where applicable.
    #[serde(default)]
    pub name: String,
    /// New role; the existing role is kept when omitted.
    pub role: Option<String>,
}

/// Payload for `team:update_color`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamColorPayload {
    /// Team to modify.
    pub team_id: Uuid,
    /// New display color.
    pub color: String,
}

/// Payload for `team:update_image`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeamImagePayload {
    /// Team to modify.
    pub team_id: Uuid,
    /// New avatar image identifier.
    pub image: String,
}

/// Payload for `match:start`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartMatchPayload {
    /// Match to start; defaults to the tournament's current match.
    pub match_id: Option<Uuid>,
}

/// Payload for `match:update_rounds`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoundsPayload {
    /// Match to modify.
    pub match_id: Uuid,
    /// New round count.
    pub total_rounds: u32,
}

/// Payload for `game:check_code`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckCodePayload {
    /// Join code entered by the player.
    pub code: String,
}

/// Payload for `game:buzzer`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuzzerPayload {
    /// Team pressing the buzzer.
    pub team_id: Uuid,
}

/// Payload for `game:judge_buzzer`. An absent team unlocks the buzzer.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JudgeBuzzerPayload {
    /// Confirmed winner, or none to reopen the race.
    pub team_id: Option<Uuid>,
}

/// Payload for `game:select_option`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectOptionPayload {
    /// Index into the offered options.
    pub option_index: usize,
}

/// Payload for `game:select_answer`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectAnswerPayload {
    /// Answer text chosen by the answering team.
    pub answer: String,
}

/// Payload for `game:approve_answer`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAnswerPayload {
    /// Game master's verdict on the submission.
    pub approved: bool,
}

/// Payload for `game:select_strategy`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectStrategyPayload {
    /// `TRUTH` to self-play; anything else counts as a challenge.
    pub strategy: String,
}

/// Payload for `game:score_action`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreActionPayload {
    /// Whether the dare was performed successfully.
    pub success: bool,
}

/// Payload for `timer:start`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerStartPayload {
    /// Seconds to count down from; defaults to the time already on the clock.
    pub seconds: Option<u32>,
}

/// Payload for `timer:add`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerAddPayload {
    /// Seconds to add; negative values subtract.
    pub seconds: i32,
}

/// Every action a client may send.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", content = "payload")]
pub enum ClientRequest {
    /// Open a new tournament session.
    #[serde(rename = "tournament:create")]
    TournamentCreate(CreateTournamentPayload),
    /// Rename the tournament.
    #[serde(rename = "tournament:update")]
    TournamentUpdate(UpdateTournamentPayload),
    /// Change tournament settings during registration.
    #[serde(rename = "tournament:update_settings")]
    TournamentUpdateSettings(UpdateSettingsPayload),
    /// Shuffle members across auto-filled teams.
    #[serde(rename = "tournament:randomize")]
    TournamentRandomize(RandomizePayload),
    /// Check whether the tournament may start.
    #[serde(rename = "tournament:validate")]
    TournamentValidate,
    /// Build the bracket and activate the tournament.
    #[serde(rename = "tournament:start")]
    TournamentStart,
    /// Resolve the current match and advance the bracket.
    #[serde(rename = "tournament:next_match")]
    TournamentNextMatch,
    /// Terminate the tournament session.
    #[serde(rename = "tournament:end")]
    TournamentEnd,
    /// Request a fresh tournament snapshot.
    #[serde(rename = "tournament:get_state")]
    TournamentGetState,

    /// Register a team.
    #[serde(rename = "team:register")]
    TeamRegister(RegisterTeamPayload),
    /// Rename a team.
    #[serde(rename = "team:update")]
    TeamUpdate(TeamNamePayload),
    /// Remove a team.
    #[serde(rename = "team:delete")]
    TeamDelete(TeamIdPayload),
    /// Add a member to a team.
    #[serde(rename = "team:add_member")]
    TeamAddMember(AddMemberPayload),
    /// Rename a team member.
    #[serde(rename = "team:update_member")]
    TeamUpdateMember(MemberPayload),
    /// Remove a team member.
    #[serde(rename = "team:remove_member")]
    TeamRemoveMember(MemberPayload),
    /// Change a team's display color.
    #[serde(rename = "team:update_color")]
    TeamUpdateColor(TeamColorPayload),
    /// Change a team's avatar image.
    #[serde(rename = "team:update_image")]
    TeamUpdateImage(TeamImagePayload),

    /// Request a fresh match snapshot.
    #[serde(rename = "match:get_state")]
    MatchGetState,
    /// Start a match.
    #[serde(rename = "match:start")]
    MatchStart(StartMatchPayload),
    /// Change the round count of a match.
    #[serde(rename = "match:update_rounds")]
    MatchUpdateRounds(UpdateRoundsPayload),
    /// Terminate the current match.
    #[serde(rename = "match:end")]
    MatchEnd,

    /// Look up a join code.
    #[serde(rename = "game:check_code")]
    GameCheckCode(CheckCodePayload),
    /// Press the buzzer.
    #[serde(rename = "game:buzzer")]
    GameBuzzer(BuzzerPayload),
    /// Confirm or reject the buzzer winner.
    #[serde(rename = "game:judge_buzzer")]
    GameJudgeBuzzer(JudgeBuzzerPayload),
    /// Commit one of the offered options.
    #[serde(rename = "game:select_option")]
    GameSelectOption(SelectOptionPayload),
    /// Submit an answer to a question.
    #[serde(rename = "game:select_answer")]
    GameSelectAnswer(SelectAnswerPayload),
    /// Approve or reject the submitted answer.
    #[serde(rename = "game:approve_answer")]
    GameApproveAnswer(ApproveAnswerPayload),
    /// Choose self-play or challenge for a dare.
    #[serde(rename = "game:select_strategy")]
    GameSelectStrategy(SelectStrategyPayload),
    /// Start performing the revealed dare.
    #[serde(rename = "game:confirm_reveal")]
    GameConfirmReveal,
    /// Score the dare performance.
    #[serde(rename = "game:score_action")]
    GameScoreAction(ScoreActionPayload),
    /// Advance to the next round.
    #[serde(rename = "game:next_round")]
    GameNextRound,

    /// Start or restart the countdown.
    #[serde(rename = "timer:start")]
    TimerStart(TimerStartPayload),
    /// Stop the countdown.
    #[serde(rename = "timer:stop")]
    TimerStop,
    /// Adjust the remaining seconds.
    #[serde(rename = "timer:add")]
    TimerAdd(TimerAddPayload),
}

/// Notice that no card could be drawn for the committed option.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoCardsNotice {
    /// Category that ran dry.
    pub category: String,
    /// Difficulty that was requested.
    pub difficulty: Difficulty,
}

/// Remaining seconds on the countdown.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimerPayload {
    /// Seconds left.
    pub seconds: u32,
}

/// Error surfaced to the requesting client only.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    /// Human-readable description.
    pub message: String,
}

/// Every event the server emits.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Full tournament snapshot.
    #[serde(rename = "tournament:state")]
    TournamentState(TournamentSnapshot),
    /// Full snapshot of the current match.
    #[serde(rename = "match:state")]
    MatchState(MatchSnapshot),
    /// Start-validation report.
    #[serde(rename = "tournament:validation")]
    TournamentValidation(ValidationReport),
    /// Join-code lookup result.
    #[serde(rename = "game:code_result")]
    CodeResult(CodeCheckResult),
    /// The committed option had no card left to deal.
    #[serde(rename = "game:no_cards")]
    NoCards(NoCardsNotice),
    /// Countdown tick.
    #[serde(rename = "timer:update")]
    TimerUpdate(TimerPayload),
    /// Countdown reached zero or lost its match.
    #[serde(rename = "timer:end")]
    TimerEnd,
    /// Request-level error, sent to the requester only.
    #[serde(rename = "error")]
    Error(ErrorPayload),
}
