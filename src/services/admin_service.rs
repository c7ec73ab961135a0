//! Card and category administration over the card source.

use uuid::Uuid;

use crate::cards::model::{Card, Category};
use crate::dto::admin::{CardRequest, CategoryRequest, RenameCategoryRequest};
use crate::error::ServiceError;
use crate::state::SharedState;

/// List all categories.
pub async fn list_categories(state: &SharedState) -> Result<Vec<Category>, ServiceError> {
    Ok(state.cards.list_categories().await?)
}

/// Create a category, returning the existing one when the name is taken.
pub async fn add_category(
    state: &SharedState,
    request: CategoryRequest,
) -> Result<Category, ServiceError> {
    Ok(state.cards.add_category(request.name.trim().to_string()).await?)
}

/// Rename a category, cascading into its cards.
pub async fn rename_category(
    state: &SharedState,
    old_name: &str,
    request: RenameCategoryRequest,
) -> Result<(), ServiceError> {
    let renamed = state
        .cards
        .rename_category(old_name.to_string(), request.name.trim().to_string())
        .await?;
    if renamed {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("category '{old_name}' does not exist")))
    }
}

/// Delete a category and every card in it.
pub async fn delete_category(state: &SharedState, name: &str) -> Result<(), ServiceError> {
    let deleted = state.cards.delete_category(name.to_string()).await?;
    if deleted {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("category '{name}' does not exist")))
    }
}

/// List all cards.
pub async fn list_cards(state: &SharedState) -> Result<Vec<Card>, ServiceError> {
    Ok(state.cards.list_cards().await?)
}

/// Create a card.
pub async fn add_card(state: &SharedState, request: CardRequest) -> Result<Card, ServiceError> {
    let card = card_from_request(Uuid::new_v4(), request);
    state.cards.add_card(card.clone()).await?;
    Ok(card)
}

/// Replace a card.
pub async fn update_card(
    state: &SharedState,
    id: Uuid,
    request: CardRequest,
) -> Result<Card, ServiceError> {
    let card = card_from_request(id, request);
    let updated = state.cards.update_card(id, card.clone()).await?;
    if updated {
        Ok(card)
    } else {
        Err(ServiceError::NotFound(format!("card {id} does not exist")))
    }
}

/// Delete a card.
pub async fn delete_card(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let deleted = state.cards.delete_card(id).await?;
    if deleted {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("card {id} does not exist")))
    }
}

fn card_from_request(id: Uuid, request: CardRequest) -> Card {
    Card {
        id,
        category: request.category.trim().to_string(),
        text: request.text,
        difficulty: request.difficulty,
        points: request.points,
        card_type: request.card_type,
        answers: request.answers,
        correct_answer: request.correct_answer,
    }
}
