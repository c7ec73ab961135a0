use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Whether a card asks a trivia question or issues a dare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardType {
    /// Trivia question with a known correct answer.
    Truth,
    /// Physical or performative challenge judged by the game master.
    Dare,
}

/// Difficulty tier of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    /// Low-point warm-up cards.
    Easy,
    /// Mid-tier cards.
    Medium,
    /// High-point cards.
    Hard,
}

impl Difficulty {
    /// All difficulty tiers, in ascending order.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

/// A named card category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name, unique within the source.
    pub name: String,
}

/// A single truth or dare card.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Stable identifier, used for tournament-wide deduplication.
    pub id: Uuid,
    /// Category name the card belongs to.
    pub category: String,
    /// Question or dare text shown to players.
    pub text: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Points awarded for this card.
    pub points: u32,
    /// Truth (question) or dare.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Answer choices offered for truth cards.
    #[serde(default)]
    pub answers: Vec<String>,
    /// Expected answer for truth cards, compared case-insensitively.
    #[serde(default)]
    pub correct_answer: String,
}
