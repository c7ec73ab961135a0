//! Single-elimination bracket construction.

use std::collections::HashSet;

use rand::{Rng, rng};
use tracing::warn;
use uuid::Uuid;

use crate::state::game::{Match, Team};

/// Pair teams into a full single-elimination bracket.
///
/// Teams are paired in the order given. With an odd count the last team is
/// dropped from the bracket. Later rounds are created up front with
/// placeholder slots; each match carries a back-reference to the match its
/// winner advances into.
///
/// Returns the matches (first round first) and the id of the opening match,
/// or `None` when fewer than two teams were supplied.
pub fn build(teams: &[Team], total_rounds: u32) -> (Vec<Match>, Option<Uuid>) {
    if teams.len() < 2 {
        return (Vec::new(), None);
    }
    let paired = teams.len() - (teams.len() % 2);
    if paired < teams.len() {
        warn!(
            dropped = %teams[paired].name,
            "odd team count, last registered team left out of the bracket"
        );
    }

    let mut codes = HashSet::new();
    let mut matches: Vec<Match> = Vec::new();

    // First round from real teams.
    let mut round: Vec<Uuid> = Vec::new();
    for pair in teams[..paired].chunks_exact(2) {
        let m = Match::new(
            unique_join_code(&mut codes),
            pair[0].clone(),
            pair[1].clone(),
            total_rounds,
        );
        round.push(m.id);
        matches.push(m);
    }

    // Later rounds from placeholder slots, halving until a single final.
    while round.len() > 1 {
        let mut next_round: Vec<Uuid> = Vec::new();
        for feeders in round.chunks(2) {
            let m = Match::new(
                unique_join_code(&mut codes),
                Team::placeholder(),
                Team::placeholder(),
                total_rounds,
            );
            for feeder in feeders {
                if let Some(source) = matches.iter_mut().find(|s| s.id == *feeder) {
                    source.next_match = Some(m.id);
                }
            }
            next_round.push(m.id);
            matches.push(m);
        }
        round = next_round;
    }

    let first = matches.first().map(|m| m.id);
    (matches, first)
}

/// Six-digit join code not already present in `taken`.
fn unique_join_code(taken: &mut HashSet<String>) -> String {
    loop {
        let code = format!("{:06}", rng().random_range(0..1_000_000u32));
        if taken.insert(code.clone()) {
            return code;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teams(n: usize) -> Vec<Team> {
        (0..n)
            .map(|i| Team {
                id: Uuid::new_v4(),
                name: format!("Team {i}"),
                score: 0,
                members: Vec::new(),
                color: "#e6194b".to_string(),
                image: "shield".to_string(),
            })
            .collect()
    }

    #[test]
    fn two_teams_yield_a_single_final() {
        let input = teams(2);
        let (matches, first) = build(&input, 10);
        assert_eq!(matches.len(), 1);
        assert_eq!(first, Some(matches[0].id));
        assert_eq!(matches[0].next_match, None);
        assert_eq!(matches[0].team_a.id, input[0].id);
        assert_eq!(matches[0].team_b.id, input[1].id);
    }

    #[test]
    fn four_teams_yield_two_semis_feeding_one_final() {
        let (matches, first) = build(&teams(4), 10);
        assert_eq!(matches.len(), 3);
        assert_eq!(first, Some(matches[0].id));

        let final_id = matches[2].id;
        assert_eq!(matches[0].next_match, Some(final_id));
        assert_eq!(matches[1].next_match, Some(final_id));
        assert!(matches[2].team_a.is_placeholder());
        assert!(matches[2].team_b.is_placeholder());
        assert_eq!(matches[2].next_match, None);
    }

    #[test]
    fn odd_team_count_drops_the_last_team() {
        let input = teams(5);
        let (matches, _) = build(&input, 10);
        assert_eq!(matches.len(), 3);
        let dropped = input[4].id;
        assert!(matches.iter().all(|m| !m.has_team(dropped)));
    }

    #[test]
    fn join_codes_are_unique_six_digit_strings() {
        let (matches, _) = build(&teams(8), 10);
        let codes: HashSet<&str> = matches.iter().map(|m| m.join_code.as_str()).collect();
        assert_eq!(codes.len(), matches.len());
        assert!(codes.iter().all(|c| c.len() == 6));
    }

    #[test]
    fn fewer_than_two_teams_build_nothing() {
        let (matches, first) = build(&teams(1), 10);
        assert!(matches.is_empty());
        assert_eq!(first, None);
    }
}
