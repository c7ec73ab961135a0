//! OpenAPI description of the REST surface.

use utoipa::OpenApi;

use crate::cards::model::{Card, CardType, Category, Difficulty};
use crate::dto::admin::{AckResponse, CardRequest, CategoryRequest, RenameCategoryRequest};
use crate::dto::health::HealthResponse;

/// OpenAPI document served next to the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dare Gambit",
        description = "Live truth-or-dare trivia tournament server. Game flow runs \
                       over the websocket at `/ws`; this document covers the REST \
                       surface for health checks and card administration."
    ),
    paths(
        crate::routes::health::health,
        crate::routes::admin::list_categories,
        crate::routes::admin::add_category,
        crate::routes::admin::rename_category,
        crate::routes::admin::delete_category,
        crate::routes::admin::list_cards,
        crate::routes::admin::add_card,
        crate::routes::admin::update_card,
        crate::routes::admin::delete_card,
    ),
    components(schemas(
        HealthResponse,
        Card,
        CardType,
        Category,
        Difficulty,
        CardRequest,
        CategoryRequest,
        RenameCategoryRequest,
        AckResponse,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "admin", description = "Card and category administration"),
    )
)]
pub struct ApiDoc;
