use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    cards::model::{Card, Category},
    dto::admin::{AckResponse, CardRequest, CategoryRequest, RenameCategoryRequest},
    error::AppError,
    services::admin_service,
    state::SharedState,
};

/// Routes administering the card pool.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/categories", get(list_categories).post(add_category))
        .route(
            "/categories/{name}",
            put(rename_category).delete(delete_category),
        )
        .route("/cards", get(list_cards).post(add_card))
        .route("/cards/{id}", put(update_card).delete(delete_card))
}

/// List every card category.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "admin",
    responses((status = 200, description = "All categories", body = [Category]))
)]
pub async fn list_categories(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(admin_service::list_categories(&state).await?))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/categories",
    tag = "admin",
    request_body = CategoryRequest,
    responses((status = 200, description = "Category created", body = Category))
)]
pub async fn add_category(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CategoryRequest>>,
) -> Result<Json<Category>, AppError> {
    Ok(Json(admin_service::add_category(&state, payload).await?))
}

/// Rename a category, cascading into its cards.
#[utoipa::path(
    put,
    path = "/categories/{name}",
    tag = "admin",
    params(("name" = String, Path, description = "Current category name")),
    request_body = RenameCategoryRequest,
    responses((status = 200, description = "Category renamed", body = AckResponse))
)]
pub async fn rename_category(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    Valid(Json(payload)): Valid<Json<RenameCategoryRequest>>,
) -> Result<Json<AckResponse>, AppError> {
    admin_service::rename_category(&state, &name, payload).await?;
    Ok(Json(AckResponse { updated: true }))
}

/// Delete a category together with its cards.
#[utoipa::path(
    delete,
    path = "/categories/{name}",
    tag = "admin",
    params(("name" = String, Path, description = "Category name")),
    responses((status = 200, description = "Category deleted", body = AckResponse))
)]
pub async fn delete_category(
    State(state): State<SharedState>,
    Path(name): Path<String>,
) -> Result<Json<AckResponse>, AppError> {
    admin_service::delete_category(&state, &name).await?;
    Ok(Json(AckResponse { updated: true }))
}

/// List every card.
#[utoipa::path(
    get,
    path = "/cards",
    tag = "admin",
    responses((status = 200, description = "All cards", body = [Card]))
)]
pub async fn list_cards(State(state): State<SharedState>) -> Result<Json<Vec<Card>>, AppError> {
    Ok(Json(admin_service::list_cards(&state).await?))
}

/// Create a card.
#[utoipa::path(
    post,
    path = "/cards",
    tag = "admin",
    request_body = CardRequest,
    responses((status = 200, description = "Card created", body = Card))
)]
pub async fn add_card(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CardRequest>>,
) -> Result<Json<Card>, AppError> {
    Ok(Json(admin_service::add_card(&state, payload).await?))
}

/// Replace a card.
#[utoipa::path(
    put,
    path = "/cards/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Card identifier")),
    request_body = CardRequest,
    responses((status = 200, description = "Card replaced", body = Card))
)]
pub async fn update_card(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<CardRequest>>,
) -> Result<Json<Card>, AppError> {
    Ok(Json(admin_service::update_card(&state, id, payload).await?))
}

/// Delete a card.
#[utoipa::path(
    delete,
    path = "/cards/{id}",
    tag = "admin",
    params(("id" = Uuid, Path, description = "Card identifier")),
    responses((status = 200, description = "Card deleted", body = AckResponse))
)]
pub async fn delete_card(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AckResponse>, AppError> {
    admin_service::delete_card(&state, id).await?;
    Ok(Json(AckResponse { updated: true }))
}
