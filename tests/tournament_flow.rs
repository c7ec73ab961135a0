//! Drives a complete tournament through the service layer: registration,
//! bracket play with mixed question and dare rounds, and advancement to a
//! champion.

use std::sync::Arc;

use dare_gambit_back::cards::memory::MemoryCardSource;
use dare_gambit_back::cards::model::{Card, CardType, Difficulty};
use dare_gambit_back::config::AppConfig;
use dare_gambit_back::dto::ws::{
    CreateTournamentPayload, RegisterTeamPayload, UpdateSettingsPayload,
};
use dare_gambit_back::services::{match_service, tournament_service};
use dare_gambit_back::state::game::{MatchPhase, TournamentStatus};
use dare_gambit_back::state::{AppState, SharedState};
use uuid::Uuid;

fn question(category: &str, answer: &str) -> Card {
    Card {
        id: Uuid::new_v4(),
        category: category.to_string(),
        text: format!("question about {category}"),
        difficulty: Difficulty::Medium,
        points: 100,
        card_type: CardType::Truth,
        answers: vec![answer.to_string(), "wrong".to_string()],
        correct_answer: answer.to_string(),
    }
}

fn dare(category: &str) -> Card {
    Card {
        id: Uuid::new_v4(),
        category: category.to_string(),
        text: "perform".to_string(),
        difficulty: Difficulty::Medium,
        points: 100,
        card_type: CardType::Dare,
        answers: Vec::new(),
        correct_answer: String::new(),
    }
}

async fn setup(teams: usize) -> SharedState {
    let source = MemoryCardSource::new();
    // Enough cards that no match ever runs dry.
    source.preload(
        (0..40)
            .map(|i| {
                if i % 2 == 0 {
                    question("General", "yes")
                } else {
                    dare("General")
                }
            })
            .collect(),
    );
    let state = AppState::new(AppConfig::default(), Arc::new(source));

    tournament_service::create(
        &state,
        CreateTournamentPayload {
            name: "Summer Cup".into(),
            max_teams: Some(teams),
        },
    )
    .await
    .unwrap();
    // Timers stay off so rounds resolve synchronously.
    tournament_service::update_settings(
        &state,
        UpdateSettingsPayload {
            default_question_time: Some(0),
            default_dare_time: Some(0),
            default_rounds: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    for i in 0..teams {
        tournament_service::register_team(
            &state,
            RegisterTeamPayload {
                name: format!("Team {i}"),
                members: vec![format!("Player {i}")],
                color: None,
                image: None,
            },
        )
        .await
        .unwrap();
    }
    state
}

async fn current_phase(state: &SharedState) -> MatchPhase {
    let session = state.session.read().await;
    session.as_ref().unwrap().current_match().unwrap().phase
}

/// Play the current match's single round to the finished state.
async fn play_current_match(state: &SharedState) {
    match_service::start_match(state, None).await.unwrap();
    assert_eq!(current_phase(state).await, MatchPhase::Buzzer);

    let team_a = {
        let session = state.session.read().await;
        session.as_ref().unwrap().current_match().unwrap().team_a.id
    };
    match_service::press_buzzer(state, team_a).await.unwrap();
    match_service::judge_buzzer(state, Some(team_a)).await.unwrap();
    assert_eq!(current_phase(state).await, MatchPhase::CategorySelect);

    match_service::select_option(state, 0).await.unwrap();
    match current_phase(state).await {
        MatchPhase::AnswerSelect => {
            match_service::select_answer(state, "yes".into()).await.unwrap();
            match_service::approve_answer(state, true).await.unwrap();
        }
        MatchPhase::StrategySelect => {
            match_service::select_strategy(state, "TRUTH").await.unwrap();
            match_service::confirm_reveal(state).await.unwrap();
            match_service::score_action(state, true).await.unwrap();
        }
        phase => panic!("unexpected phase after the deal: {phase:?}"),
    }
    assert_eq!(current_phase(state).await, MatchPhase::Scoring);

    match_service::next_round(state).await.unwrap();
    assert_eq!(current_phase(state).await, MatchPhase::Finished);
}

#[tokio::test]
async fn four_team_tournament_produces_a_champion() {
    let state = setup(4).await;

    let report = tournament_service::validate_start(&state).await.unwrap();
    assert!(report.is_valid, "unexpected errors: {:?}", report.errors);

    tournament_service::start_tournament(&state).await.unwrap();
    {
        let session = state.session.read().await;
        let tournament = session.as_ref().unwrap();
        assert_eq!(tournament.status, TournamentStatus::Active);
        assert_eq!(tournament.matches.len(), 3);
    }

    for _ in 0..3 {
        play_current_match(&state).await;
        tournament_service::next_match(&state).await.unwrap();
    }

    let session = state.session.read().await;
    let tournament = session.as_ref().unwrap();
    assert_eq!(tournament.status, TournamentStatus::Finished);
    assert_eq!(tournament.current_match, None);
    // The final was played by real teams and recorded a winner.
    let last = tournament.matches.last().unwrap();
    assert!(!last.team_a.is_placeholder());
    assert!(!last.team_b.is_placeholder());
    assert!(last.winner.is_some());
}

#[tokio::test]
async fn used_cards_never_repeat_across_matches() {
    let state = setup(2).await;
    tournament_service::start_tournament(&state).await.unwrap();
    play_current_match(&state).await;

    let session = state.session.read().await;
    let tournament = session.as_ref().unwrap();
    assert_eq!(tournament.used_card_ids.len(), 1);
}

#[tokio::test]
async fn join_codes_resolve_through_check_code() {
    let state = setup(2).await;
    tournament_service::start_tournament(&state).await.unwrap();

    let (code, id) = {
        let session = state.session.read().await;
        let current = session.as_ref().unwrap().current_match().unwrap();
        (current.join_code.clone(), current.id)
    };

    let result = match_service::check_code(&state, &code).await.unwrap();
    assert!(result.valid);
    assert_eq!(result.match_id, Some(id));
}
