//! Tournament session lifecycle: registration, bracket play-through and
//! team management.

use indexmap::IndexMap;
use rand::{rng, seq::SliceRandom};
use tracing::info;
use uuid::Uuid;

use crate::dto::game::ValidationReport;
use crate::dto::ws::{
    CreateTournamentPayload, RandomizePayload, RegisterTeamPayload, UpdateSettingsPayload,
};
use crate::error::ServiceError;
use crate::services::{events, timer_service};
use crate::state::game::{
    DEFAULT_MEMBER_ROLE, MatchPhase, Team, TeamMember, Tournament, TournamentStatus,
};
use crate::state::{SharedState, bracket};

/// Registration cap used when a tournament is created without one.
const DEFAULT_MAX_TEAMS: usize = 8;

/// Open a new tournament session, replacing any previous one.
pub async fn create(
    state: &SharedState,
    payload: CreateTournamentPayload,
) -> Result<(), ServiceError> {
    if payload.name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("tournament name must not be empty".into()));
    }
    let tournament = Tournament {
        id: Uuid::new_v4(),
        name: payload.name.trim().to_string(),
        teams: IndexMap::new(),
        matches: Vec::new(),
        current_match: None,
        status: TournamentStatus::Registration,
        max_teams: payload.max_teams.unwrap_or(DEFAULT_MAX_TEAMS).max(2),
        min_teams: state.config.min_teams,
        min_members_per_team: state.config.min_members_per_team,
        default_question_time: state.config.default_question_time,
        default_dare_time: state.config.default_dare_time,
        default_rounds: state.config.default_rounds_per_game,
        buzzer_enabled: true,
        used_card_ids: Default::default(),
    };
    info!(tournament_id = %tournament.id, name = %tournament.name, "tournament created");
    {
        let mut session = state.session.write().await;
        *session = Some(tournament);
    }
    timer_service::halt_countdown(state).await;
    events::broadcast_tournament(state).await;
    Ok(())
}

/// Rename the tournament.
pub async fn update(state: &SharedState, name: String) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("tournament name must not be empty".into()));
    }
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        tournament.name = name.trim().to_string();
    }
    events::broadcast_tournament(state).await;
    Ok(())
}

/// Change tournament settings. Only allowed during registration.
pub async fn update_settings(
    state: &SharedState,
    payload: UpdateSettingsPayload,
) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        require_registration(tournament)?;
        if let Some(max_teams) = payload.max_teams {
            if max_teams < tournament.teams.len() {
                return Err(ServiceError::InvalidInput(
                    "cap cannot drop below the number of registered teams".into(),
                ));
            }
            tournament.max_teams = max_teams.max(2);
        }
        if let Some(min_teams) = payload.min_teams {
            tournament.min_teams = min_teams.max(2);
        }
        if let Some(min_members) = payload.min_members_per_team {
            tournament.min_members_per_team = min_members.max(1);
        }
        if let Some(seconds) = payload.default_question_time {
            tournament.default_question_time = seconds;
        }
        if let Some(seconds) = payload.default_dare_time {
            tournament.default_dare_time = seconds;
        }
        if let Some(rounds) = payload.default_rounds {
            tournament.default_rounds = rounds.max(1);
        }
        if let Some(enabled) = payload.buzzer_enabled {
            tournament.buzzer_enabled = enabled;
        }
    }
    events::broadcast_tournament(state).await;
    Ok(())
}

/// Register a team during registration.
///
/// A requested color must not already belong to another team; omitted color
/// and image fall back to the palette and the default avatar.
pub async fn register_team(
    state: &SharedState,
    payload: RegisterTeamPayload,
) -> Result<(), ServiceError> {
    if payload.name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("team name must not be empty".into()));
    }
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        require_registration(tournament)?;
        if tournament.teams.len() >= tournament.max_teams {
            return Err(ServiceError::InvalidInput("tournament is full".into()));
        }
        let used: Vec<String> = tournament.teams.values().map(|t| t.color.clone()).collect();
        let color = match payload.color.as_deref().map(str::trim) {
            Some(color) if !color.is_empty() => {
                if used.iter().any(|c| c.eq_ignore_ascii_case(color)) {
                    return Err(ServiceError::InvalidInput(
                        "color is already taken by another team".into(),
                    ));
                }
                color.to_string()
            }
            _ => state.config.first_unused_color(&used),
        };
        let image = match payload.image.as_deref().map(str::trim) {
            Some(image) if !image.is_empty() => image.to_string(),
            _ => state.config.default_team_image().to_string(),
        };
        let team = Team {
            id: Uuid::new_v4(),
            name: payload.name.trim().to_string(),
            score: 0,
            members: payload
                .members
                .into_iter()
                .filter(|name| !name.trim().is_empty())
                .map(|name| TeamMember {
                    id: Uuid::new_v4(),
                    name: name.trim().to_string(),
                    role: DEFAULT_MEMBER_ROLE.to_string(),
                })
                .collect(),
            color,
            image,
        };
        info!(team_id = %team.id, name = %team.name, "team registered");
        tournament.teams.insert(team.id, team);
    }
    events::broadcast_tournament(state).await;
    Ok(())
}

/// Rename a team.
pub async fn update_team(state: &SharedState, team_id: Uuid, name: String) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("team name must not be empty".into()));
    }
    mutate_team(state, team_id, |team| {
        team.name = name.trim().to_string();
    })
    .await
}

/// Remove a team during registration.
pub async fn delete_team(state: &SharedState, team_id: Uuid) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        require_registration(tournament)?;
        if tournament.teams.shift_remove(&team_id).is_none() {
            return Err(ServiceError::NotFound(format!("team {team_id} does not exist")));
        }
    }
    events::broadcast_tournament(state).await;
    Ok(())
}

/// Add a member to a team. An empty role falls back to the default.
pub async fn add_member(
    state: &SharedState,
    team_id: Uuid,
    name: String,
    role: String,
) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("member name must not be empty".into()));
    }
    let role = if role.trim().is_empty() {
        DEFAULT_MEMBER_ROLE.to_string()
    } else {
        role.trim().to_string()
    };
    mutate_team(state, team_id, |team| {
        team.members.push(TeamMember {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            role,
        });
    })
    .await
}

/// Rename a team member. The existing role is kept when none is given.
pub async fn update_member(
    state: &SharedState,
    team_id: Uuid,
    member_id: Uuid,
    name: String,
    role: Option<String>,
) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidInput("member name must not be empty".into()));
    }
    let mut found = false;
    mutate_team(state, team_id, |team| {
        if let Some(member) = team.members.iter_mut().find(|m| m.id == member_id) {
            member.name = name.trim().to_string();
            if let Some(role) = role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
                member.role = role.to_string();
            }
            found = true;
        }
    })
    .await?;
    if found {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("member {member_id} does not exist")))
    }
}

/// Remove a team member.
pub async fn remove_member(
    state: &SharedState,
    team_id: Uuid,
    member_id: Uuid,
) -> Result<(), ServiceError> {
    let mut found = false;
    mutate_team(state, team_id, |team| {
        let before = team.members.len();
        team.members.retain(|m| m.id != member_id);
        found = team.members.len() != before;
    })
    .await?;
    if found {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("member {member_id} does not exist")))
    }
}

/// Change a team's display color. A color used by another team is rejected.
pub async fn update_color(state: &SharedState, team_id: Uuid, color: String) -> Result<(), ServiceError> {
    let color = color.trim().to_string();
    if color.is_empty() {
        return Err(ServiceError::InvalidInput("color must not be empty".into()));
    }
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        if tournament
            .teams
            .values()
            .any(|t| t.id != team_id && t.color.eq_ignore_ascii_case(&color))
        {
            return Err(ServiceError::InvalidInput(
                "color is already taken by another team".into(),
            ));
        }
        let team = tournament
            .teams
            .get_mut(&team_id)
            .ok_or_else(|| ServiceError::NotFound(format!("team {team_id} does not exist")))?;
        team.color = color;
    }
    events::broadcast_tournament(state).await;
    Ok(())
}

/// Change a team's avatar image.
pub async fn update_image(state: &SharedState, team_id: Uuid, image: String) -> Result<(), ServiceError> {
    mutate_team(state, team_id, |team| {
        team.image = image;
    })
    .await
}

/// Deal the submitted player names across evenly filled teams.
///
/// Missing teams are created up to the registration cap using the palette,
/// every existing roster is cleared, then the shuffled names are dealt out
/// round-robin with the default role.
pub async fn randomize_teams(
    state: &SharedState,
    payload: RandomizePayload,
) -> Result<(), ServiceError> {
    let mut names: Vec<String> = payload
        .names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        return Err(ServiceError::InvalidInput(
            "at least one player name is required".into(),
        ));
    }
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        require_registration(tournament)?;

        while tournament.teams.len() < tournament.max_teams {
            let used: Vec<String> = tournament.teams.values().map(|t| t.color.clone()).collect();
            let team = Team {
                id: Uuid::new_v4(),
                name: format!("Team {}", tournament.teams.len() + 1),
                score: 0,
                members: Vec::new(),
                color: state.config.first_unused_color(&used),
                image: state.config.default_team_image().to_string(),
            };
            tournament.teams.insert(team.id, team);
        }

        for team in tournament.teams.values_mut() {
            team.members.clear();
        }
        names.shuffle(&mut rng());

        let team_ids: Vec<Uuid> = tournament.teams.keys().copied().collect();
        for (index, name) in names.into_iter().enumerate() {
            let team_id = team_ids[index % team_ids.len()];
            if let Some(team) = tournament.teams.get_mut(&team_id) {
                team.members.push(TeamMember {
                    id: Uuid::new_v4(),
                    name,
                    role: DEFAULT_MEMBER_ROLE.to_string(),
                });
            }
        }
        info!(teams = team_ids.len(), "teams randomized");
    }
    events::broadcast_tournament(state).await;
    Ok(())
}

/// Check whether the tournament meets every start requirement.
pub async fn validate_start(state: &SharedState) -> Result<ValidationReport, ServiceError> {
    let session = state.session.read().await;
    let tournament = session.as_ref().ok_or(ServiceError::NoTournament)?;
    Ok(build_report(tournament))
}

/// Build the bracket and activate the tournament.
pub async fn start_tournament(state: &SharedState) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        require_registration(tournament)?;

        let report = build_report(tournament);
        if !report.is_valid {
            return Err(ServiceError::InvalidState(report.errors.join("; ")));
        }

        let mut seeds: Vec<Team> = tournament.teams.values().cloned().collect();
        for team in &mut seeds {
            team.score = 0;
        }
        let (matches, first) = bracket::build(&seeds, tournament.default_rounds.max(1));
        tournament.matches = matches;
        tournament.current_match = first;
        tournament.status = TournamentStatus::Active;
        info!(
            tournament_id = %tournament.id,
            matches = tournament.matches.len(),
            "tournament started"
        );
    }
    events::broadcast_tournament(state).await;
    events::broadcast_match(state).await;
    Ok(())
}

/// Resolve the current match and move on to the next playable one.
///
/// The winner is seeded into the placeholder slot of the match it advances
/// into. When no playable match remains the tournament finishes.
pub async fn next_match(state: &SharedState) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        if tournament.status != TournamentStatus::Active {
            return Err(ServiceError::InvalidState("tournament is not active".into()));
        }
        let current = tournament
            .current_match()
            .ok_or_else(|| ServiceError::InvalidState("no match is being played".into()))?;
        if !matches!(current.phase, MatchPhase::Finished | MatchPhase::End) {
            return Err(ServiceError::InvalidState(
                "the current match is still being played".into(),
            ));
        }

        // Resolve the winner; a terminated match falls back to the score.
        let winner_id = current.winner.unwrap_or_else(|| {
            if current.team_b.score > current.team_a.score {
                current.team_b.id
            } else {
                current.team_a.id
            }
        });
        let mut winner = if current.team_a.id == winner_id {
            current.team_a.clone()
        } else {
            current.team_b.clone()
        };
        winner.score = 0;
        let advance_to = current.next_match;

        if let Some(next_id) = advance_to {
            if let Some(next) = tournament.match_by_id_mut(next_id) {
                if next.team_a.is_placeholder() {
                    next.team_a = winner;
                } else if next.team_b.is_placeholder() {
                    next.team_b = winner;
                }
            }
        }

        let playable = tournament
            .matches
            .iter()
            .find(|m| {
                m.phase == MatchPhase::Idle
                    && !m.team_a.is_placeholder()
                    && !m.team_b.is_placeholder()
            })
            .map(|m| m.id);
        match playable {
            Some(id) => {
                tournament.current_match = Some(id);
                info!(match_id = %id, "advanced to the next match");
            }
            None => {
                tournament.current_match = None;
                tournament.status = TournamentStatus::Finished;
                info!(tournament_id = %tournament.id, champion = %winner_id, "tournament finished");
            }
        }
    }
    timer_service::halt_countdown(state).await;
    events::broadcast_tournament(state).await;
    events::broadcast_match(state).await;
    Ok(())
}

/// Terminate the tournament session.
pub async fn end_tournament(state: &SharedState) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        tournament.status = TournamentStatus::Finished;
        tournament.current_match = None;
        info!(tournament_id = %tournament.id, "tournament terminated");
    }
    timer_service::halt_countdown(state).await;
    events::broadcast_tournament(state).await;
    Ok(())
}

fn require_registration(tournament: &Tournament) -> Result<(), ServiceError> {
    if tournament.status == TournamentStatus::Registration {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(
            "only allowed while registration is open".into(),
        ))
    }
}

fn build_report(tournament: &Tournament) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if tournament.status != TournamentStatus::Registration {
        errors.push("registration is closed".to_string());
    }
    if tournament.teams.len() < tournament.min_teams {
        errors.push(format!(
            "at least {} teams are required, {} registered",
            tournament.min_teams,
            tournament.teams.len()
        ));
    }
    for team in tournament.teams.values() {
        if team.members.len() < tournament.min_members_per_team {
            errors.push(format!(
                "team '{}' needs at least {} members",
                team.name, tournament.min_members_per_team
            ));
        }
    }
    let mut colors = std::collections::HashSet::new();
    if tournament
        .teams
        .values()
        .any(|team| !colors.insert(team.color.to_lowercase()))
    {
        errors.push("some teams have duplicate colors".to_string());
    }
    if tournament.teams.len() >= 2 && tournament.teams.len() % 2 != 0 {
        warnings.push("odd number of teams, the last registered team will sit out".to_string());
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

async fn mutate_team(
    state: &SharedState,
    team_id: Uuid,
    mutate: impl FnOnce(&mut Team),
) -> Result<(), ServiceError> {
    {
        let mut session = state.session.write().await;
        let tournament = session.as_mut().ok_or(ServiceError::NoTournament)?;
        let team = tournament
            .teams
            .get_mut(&team_id)
            .ok_or_else(|| ServiceError::NotFound(format!("team {team_id} does not exist")))?;
        mutate(team);
    }
    events::broadcast_tournament(state).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::cards::memory::MemoryCardSource;
    use crate::config::AppConfig;
    use crate::state::{AppState, SharedState};

    async fn fresh_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryCardSource::new()))
    }

    async fn registered_state(teams: usize, members_each: usize) -> SharedState {
        let state = fresh_state().await;
        create(
            &state,
            CreateTournamentPayload {
                name: "Cup".into(),
                max_teams: Some(8),
            },
        )
        .await
        .unwrap();
        for i in 0..teams {
            register_team(
                &state,
                RegisterTeamPayload {
                    name: format!("Team {i}"),
                    members: (0..members_each).map(|j| format!("Player {i}-{j}")).collect(),
                    color: None,
                    image: None,
                },
            )
            .await
            .unwrap();
        }
        state
    }

    #[tokio::test]
    async fn team_operations_require_an_open_session() {
        let state = fresh_state().await;
        let err = register_team(
            &state,
            RegisterTeamPayload {
                name: "Lonely".into(),
                members: Vec::new(),
                color: None,
                image: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NoTournament));
    }

    #[tokio::test]
    async fn registered_teams_get_distinct_palette_colors() {
        let state = registered_state(3, 1).await;
        let session = state.session.read().await;
        let tournament = session.as_ref().unwrap();
        let colors: std::collections::HashSet<String> =
            tournament.teams.values().map(|t| t.color.clone()).collect();
        assert_eq!(colors.len(), 3);
    }

    #[tokio::test]
    async fn registration_is_capped() {
        let state = registered_state(2, 1).await;
        update_settings(
            &state,
            UpdateSettingsPayload {
                max_teams: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = register_team(
            &state,
            RegisterTeamPayload {
                name: "Extra".into(),
                members: Vec::new(),
                color: None,
                image: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn registering_a_taken_color_is_rejected() {
        let state = registered_state(0, 0).await;
        register_team(
            &state,
            RegisterTeamPayload {
                name: "Reds".into(),
                members: Vec::new(),
                color: Some("#ff0000".into()),
                image: Some("flame".into()),
            },
        )
        .await
        .unwrap();

        let err = register_team(
            &state,
            RegisterTeamPayload {
                name: "Crimsons".into(),
                members: Vec::new(),
                color: Some("#FF0000".into()),
                image: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let session = state.session.read().await;
        let team = session.as_ref().unwrap().teams.values().next().unwrap().clone();
        assert_eq!(team.color, "#ff0000");
        assert_eq!(team.image, "flame");
    }

    #[tokio::test]
    async fn changing_to_another_teams_color_is_rejected() {
        let state = registered_state(2, 1).await;
        let (first, second) = {
            let session = state.session.read().await;
            let tournament = session.as_ref().unwrap();
            let mut teams = tournament.teams.values();
            let first = teams.next().unwrap().clone();
            let second = teams.next().unwrap().clone();
            (first, second)
        };

        let err = update_color(&state, second.id, first.color.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        // Re-committing a team's own color stays allowed.
        update_color(&state, first.id, first.color.clone())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn validation_flags_duplicate_colors() {
        let state = registered_state(2, 1).await;
        let ids: Vec<Uuid> = {
            let session = state.session.read().await;
            session.as_ref().unwrap().teams.keys().copied().collect()
        };
        {
            let mut session = state.session.write().await;
            let tournament = session.as_mut().unwrap();
            let color = tournament.teams[&ids[0]].color.clone();
            tournament.teams.get_mut(&ids[1]).unwrap().color = color;
        }

        let report = validate_start(&state).await.unwrap();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("duplicate colors")));
    }

    #[tokio::test]
    async fn validation_reports_missing_teams_and_members() {
        let state = registered_state(1, 0).await;
        let report = validate_start(&state).await.unwrap();
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
    }

    #[tokio::test]
    async fn validation_warns_about_odd_team_counts() {
        let state = registered_state(3, 1).await;
        let report = validate_start(&state).await.unwrap();
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn starting_an_invalid_tournament_fails() {
        let state = registered_state(1, 1).await;
        let err = start_tournament(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn starting_builds_the_bracket_and_activates() {
        let state = registered_state(4, 1).await;
        start_tournament(&state).await.unwrap();

        let session = state.session.read().await;
        let tournament = session.as_ref().unwrap();
        assert_eq!(tournament.status, TournamentStatus::Active);
        assert_eq!(tournament.matches.len(), 3);
        assert_eq!(tournament.current_match, Some(tournament.matches[0].id));
    }

    #[tokio::test]
    async fn winners_advance_until_a_champion_emerges() {
        let state = registered_state(4, 1).await;
        start_tournament(&state).await.unwrap();

        // Play through all three matches by score.
        for _ in 0..3 {
            {
                let mut session = state.session.write().await;
                let current = session.as_mut().unwrap().current_match_mut().unwrap();
                current.team_a.score = 100;
                current.phase = MatchPhase::Finished;
                current.winner = Some(current.team_a.id);
            }
            next_match(&state).await.unwrap();
        }

        let session = state.session.read().await;
        let tournament = session.as_ref().unwrap();
        assert_eq!(tournament.status, TournamentStatus::Finished);
        assert_eq!(tournament.current_match, None);
        // The final received real teams from both semifinals.
        assert!(!tournament.matches[2].team_a.is_placeholder());
        assert!(!tournament.matches[2].team_b.is_placeholder());
    }

    #[tokio::test]
    async fn next_match_rejects_an_unfinished_match() {
        let state = registered_state(2, 1).await;
        start_tournament(&state).await.unwrap();
        let err = next_match(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn randomize_replaces_rosters_with_the_submitted_names() {
        let state = registered_state(2, 3).await;
        let names: Vec<String> = (0..9).map(|i| format!("Player {i}")).collect();
        randomize_teams(&state, RandomizePayload { names: names.clone() })
            .await
            .unwrap();

        let session = state.session.read().await;
        let tournament = session.as_ref().unwrap();
        // Teams are created up to the registration cap.
        assert_eq!(tournament.teams.len(), 8);
        let dealt: Vec<&TeamMember> = tournament
            .teams
            .values()
            .flat_map(|t| t.members.iter())
            .collect();
        // The six previously registered players are gone.
        assert_eq!(dealt.len(), 9);
        assert!(dealt.iter().all(|m| names.contains(&m.name)));
        assert!(dealt.iter().all(|m| m.role == DEFAULT_MEMBER_ROLE));
        let sizes: Vec<usize> = tournament.teams.values().map(|t| t.members.len()).collect();
        assert_eq!(sizes.iter().max(), Some(&2));
        assert_eq!(sizes.iter().min(), Some(&1));
    }

    #[tokio::test]
    async fn randomize_requires_player_names() {
        let state = registered_state(2, 1).await;
        let err = randomize_teams(&state, RandomizePayload { names: Vec::new() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn member_management_round_trip() {
        let state = registered_state(1, 0).await;
        let team_id = {
            let session = state.session.read().await;
            *session.as_ref().unwrap().teams.keys().next().unwrap()
        };

        add_member(&state, team_id, "Alex".into(), String::new())
            .await
            .unwrap();
        let member_id = {
            let session = state.session.read().await;
            let member = &session.as_ref().unwrap().teams[&team_id].members[0];
            assert_eq!(member.role, DEFAULT_MEMBER_ROLE);
            member.id
        };

        update_member(&state, team_id, member_id, "Sam".into(), Some("Captain".into()))
            .await
            .unwrap();
        {
            let session = state.session.read().await;
            let member = &session.as_ref().unwrap().teams[&team_id].members[0];
            assert_eq!(member.name, "Sam");
            assert_eq!(member.role, "Captain");
        }

        // A rename without a role keeps the existing one.
        update_member(&state, team_id, member_id, "Samantha".into(), None)
            .await
            .unwrap();
        {
            let session = state.session.read().await;
            let member = &session.as_ref().unwrap().teams[&team_id].members[0];
            assert_eq!(member.name, "Samantha");
            assert_eq!(member.role, "Captain");
        }

        remove_member(&state, team_id, member_id).await.unwrap();
        let session = state.session.read().await;
        assert!(session.as_ref().unwrap().teams[&team_id].members.is_empty());
    }

    #[tokio::test]
    async fn settings_are_locked_once_the_tournament_starts() {
        let state = registered_state(2, 1).await;
        start_tournament(&state).await.unwrap();

        let err = update_settings(
            &state,
            UpdateSettingsPayload {
                buzzer_enabled: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }
}
