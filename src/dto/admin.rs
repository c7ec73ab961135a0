//! REST payloads for the card administration surface.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::cards::model::{CardType, Difficulty};

/// Body for creating or replacing a card.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CardRequest {
    /// Category the card belongs to.
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    /// Question or dare text.
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Points awarded.
    pub points: u32,
    /// Question or dare.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Answer choices, for question cards.
    #[serde(default)]
    pub answers: Vec<String>,
    /// Expected answer, for question cards.
    #[serde(default)]
    pub correct_answer: String,
}

/// Body for creating a category.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    /// Category name.
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

/// Body for renaming a category.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenameCategoryRequest {
    /// New category name.
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

/// Acknowledgement for deletions and renames.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    /// Whether the targeted entity existed.
    pub updated: bool,
}
