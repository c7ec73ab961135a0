use std::collections::HashSet;
use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::cards::model::{Card, Category, Difficulty};

/// Result alias for card source operations.
pub type CardResult<T> = Result<T, CardError>;

/// Error raised by card backends regardless of the underlying storage.
#[derive(Debug, Error)]
pub enum CardError {
    /// The backend could not be reached or answered with a failure.
    #[error("card source unavailable: {message}")]
    Unavailable {
        /// Human-readable failure description.
        message: String,
        /// Backend-specific cause.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl CardError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        CardError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Abstraction over the card repository consumed by the match engine and the
/// admin CRUD surface.
///
/// Every random lookup takes an exclusion set so a card dealt once in a
/// tournament is never dealt again.
pub trait CardSource: Send + Sync {
    /// Names of all known categories, in insertion order.
    fn list_categories(&self) -> BoxFuture<'static, CardResult<Vec<Category>>>;
    /// Random card matching both category and difficulty, skipping `exclude`.
    fn random_by_category_and_difficulty(
        &self,
        category: String,
        difficulty: Difficulty,
        exclude: HashSet<Uuid>,
    ) -> BoxFuture<'static, CardResult<Option<Card>>>;
    /// Random card from the category regardless of difficulty, skipping `exclude`.
    fn random_by_category(
        &self,
        category: String,
        exclude: HashSet<Uuid>,
    ) -> BoxFuture<'static, CardResult<Option<Card>>>;
    /// Random card from the whole pool, skipping `exclude`.
    fn random_any(&self, exclude: HashSet<Uuid>) -> BoxFuture<'static, CardResult<Option<Card>>>;

    /// All cards, for the admin surface.
    fn list_cards(&self) -> BoxFuture<'static, CardResult<Vec<Card>>>;
    /// Insert a new card.
    fn add_card(&self, card: Card) -> BoxFuture<'static, CardResult<()>>;
    /// Replace an existing card, returning whether it was found.
    fn update_card(&self, id: Uuid, card: Card) -> BoxFuture<'static, CardResult<bool>>;
    /// Delete a card, returning whether it was found.
    fn delete_card(&self, id: Uuid) -> BoxFuture<'static, CardResult<bool>>;

    /// Create a category if it does not already exist.
    fn add_category(&self, name: String) -> BoxFuture<'static, CardResult<Category>>;
    /// Rename a category and cascade the rename into its cards.
    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
    ) -> BoxFuture<'static, CardResult<bool>>;
    /// Delete a category together with every card it contains.
    fn delete_category(&self, name: String) -> BoxFuture<'static, CardResult<bool>>;
}

/// Convenience helper drawing a card for an option pick: exact
/// (category, difficulty) match first, then a category-only fallback.
pub async fn draw_for_option(
    source: &dyn CardSource,
    category: &str,
    difficulty: Difficulty,
    exclude: &HashSet<Uuid>,
) -> CardResult<Option<Card>> {
    if let Some(card) = source
        .random_by_category_and_difficulty(category.to_string(), difficulty, exclude.clone())
        .await?
    {
        return Ok(Some(card));
    }
    source
        .random_by_category(category.to_string(), exclude.clone())
        .await
}
