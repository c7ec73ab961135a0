use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use rand::{rng, seq::IndexedRandom};
use tracing::info;
use uuid::Uuid;

use crate::cards::{
    model::{Card, Category, Difficulty},
    source::{CardResult, CardSource},
};

/// Categories seeded when the source starts empty so a fresh deployment can
/// run a game immediately.
const SEED_CATEGORIES: [&str; 6] = [
    "Pop Culture",
    "Music",
    "Food & Travel",
    "History",
    "Science",
    "Movies & Series",
];

/// Card source keeping categories and cards in process memory.
///
/// All lookups are synchronous under the hood; the async trait surface exists
/// so a persistent backend can be swapped in without touching the callers.
#[derive(Clone)]
pub struct MemoryCardSource {
    inner: Arc<RwLock<Inner>>,
}

struct Inner {
    categories: Vec<Category>,
    cards: Vec<Card>,
}

impl MemoryCardSource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                categories: Vec::new(),
                cards: Vec::new(),
            })),
        }
    }

    /// Create a source pre-populated with the default category set.
    pub fn with_seed_categories() -> Self {
        let source = Self::new();
        {
            let mut inner = source.inner.write().unwrap_or_else(|e| e.into_inner());
            for name in SEED_CATEGORIES {
                inner.categories.push(Category {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                });
            }
        }
        info!(count = SEED_CATEGORIES.len(), "seeded default categories");
        source
    }

    /// Bulk-load cards, creating their categories on demand. Used by tests
    /// and import tooling.
    pub fn preload(&self, cards: Vec<Card>) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        for card in cards {
            if !inner.categories.iter().any(|c| c.name == card.category) {
                inner.categories.push(Category {
                    id: Uuid::new_v4(),
                    name: card.category.clone(),
                });
            }
            inner.cards.push(card);
        }
    }

    fn pick<F>(&self, exclude: &HashSet<Uuid>, filter: F) -> Option<Card>
    where
        F: Fn(&Card) -> bool,
    {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let eligible: Vec<&Card> = inner
            .cards
            .iter()
            .filter(|card| !exclude.contains(&card.id) && filter(card))
            .collect();
        eligible.choose(&mut rng()).map(|card| (*card).clone())
    }
}

impl Default for MemoryCardSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CardSource for MemoryCardSource {
    fn list_categories(&self) -> BoxFuture<'static, CardResult<Vec<Category>>> {
        let this = self.clone();
        Box::pin(async move {
            let inner = this.inner.read().unwrap_or_else(|e| e.into_inner());
            Ok(inner.categories.clone())
        })
    }

    fn random_by_category_and_difficulty(
        &self,
        category: String,
        difficulty: Difficulty,
        exclude: HashSet<Uuid>,
    ) -> BoxFuture<'static, CardResult<Option<Card>>> {
        let this = self.clone();
        Box::pin(async move {
            Ok(this.pick(&exclude, |card| {
                card.category == category && card.difficulty == difficulty
            }))
        })
    }

    fn random_by_category(
        &self,
        category: String,
        exclude: HashSet<Uuid>,
    ) -> BoxFuture<'static, CardResult<Option<Card>>> {
        let this = self.clone();
        Box::pin(async move { Ok(this.pick(&exclude, |card| card.category == category)) })
    }

    fn random_any(&self, exclude: HashSet<Uuid>) -> BoxFuture<'static, CardResult<Option<Card>>> {
        let this = self.clone();
        Box::pin(async move { Ok(this.pick(&exclude, |_| true)) })
    }

    fn list_cards(&self) -> BoxFuture<'static, CardResult<Vec<Card>>> {
        let this = self.clone();
        Box::pin(async move {
            let inner = this.inner.read().unwrap_or_else(|e| e.into_inner());
            Ok(inner.cards.clone())
        })
    }

    fn add_card(&self, card: Card) -> BoxFuture<'static, CardResult<()>> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.inner.write().unwrap_or_else(|e| e.into_inner());
            if !inner.categories.iter().any(|c| c.name == card.category) {
                inner.categories.push(Category {
                    id: Uuid::new_v4(),
                    name: card.category.clone(),
                });
            }
            inner.cards.push(card);
            Ok(())
        })
    }

    fn update_card(&self, id: Uuid, mut card: Card) -> BoxFuture<'static, CardResult<bool>> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.inner.write().unwrap_or_else(|e| e.into_inner());
            match inner.cards.iter_mut().find(|c| c.id == id) {
                Some(existing) => {
                    card.id = id;
                    *existing = card;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn delete_card(&self, id: Uuid) -> BoxFuture<'static, CardResult<bool>> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.inner.write().unwrap_or_else(|e| e.into_inner());
            let before = inner.cards.len();
            inner.cards.retain(|c| c.id != id);
            Ok(inner.cards.len() != before)
        })
    }

    fn add_category(&self, name: String) -> BoxFuture<'static, CardResult<Category>> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.inner.write().unwrap_or_else(|e| e.into_inner());
            if let Some(existing) = inner.categories.iter().find(|c| c.name == name) {
                return Ok(existing.clone());
            }
            let category = Category {
                id: Uuid::new_v4(),
                name,
            };
            inner.categories.push(category.clone());
            Ok(category)
        })
    }

    fn rename_category(
        &self,
        old_name: String,
        new_name: String,
    ) -> BoxFuture<'static, CardResult<bool>> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.inner.write().unwrap_or_else(|e| e.into_inner());
            let Some(category) = inner.categories.iter_mut().find(|c| c.name == old_name) else {
                return Ok(false);
            };
            category.name = new_name.clone();
            for card in inner.cards.iter_mut() {
                if card.category == old_name {
                    card.category = new_name.clone();
                }
            }
            Ok(true)
        })
    }

    fn delete_category(&self, name: String) -> BoxFuture<'static, CardResult<bool>> {
        let this = self.clone();
        Box::pin(async move {
            let mut inner = this.inner.write().unwrap_or_else(|e| e.into_inner());
            let before = inner.categories.len();
            inner.categories.retain(|c| c.name != name);
            inner.cards.retain(|c| c.category != name);
            Ok(inner.categories.len() != before)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::model::CardType;

    fn card(category: &str, difficulty: Difficulty) -> Card {
        Card {
            id: Uuid::new_v4(),
            category: category.to_string(),
            text: "text".into(),
            difficulty,
            points: 100,
            card_type: CardType::Truth,
            answers: vec!["a".into()],
            correct_answer: "a".into(),
        }
    }

    #[tokio::test]
    async fn exclusion_set_is_honoured() {
        let source = MemoryCardSource::new();
        let only = card("Music", Difficulty::Easy);
        let id = only.id;
        source.preload(vec![only]);

        let drawn = source
            .random_by_category("Music".into(), HashSet::new())
            .await
            .unwrap();
        assert_eq!(drawn.map(|c| c.id), Some(id));

        let excluded = source
            .random_by_category("Music".into(), HashSet::from([id]))
            .await
            .unwrap();
        assert!(excluded.is_none());
    }

    #[tokio::test]
    async fn difficulty_filter_narrows_the_pool() {
        let source = MemoryCardSource::new();
        let easy = card("Music", Difficulty::Easy);
        let hard = card("Music", Difficulty::Hard);
        let hard_id = hard.id;
        source.preload(vec![easy, hard]);

        let drawn = source
            .random_by_category_and_difficulty("Music".into(), Difficulty::Hard, HashSet::new())
            .await
            .unwrap();
        assert_eq!(drawn.map(|c| c.id), Some(hard_id));
    }

    #[tokio::test]
    async fn rename_category_cascades_into_cards() {
        let source = MemoryCardSource::new();
        source.preload(vec![card("Old", Difficulty::Medium)]);

        assert!(
            source
                .rename_category("Old".into(), "New".into())
                .await
                .unwrap()
        );
        let cards = source.list_cards().await.unwrap();
        assert_eq!(cards[0].category, "New");
    }

    #[tokio::test]
    async fn delete_category_removes_its_cards() {
        let source = MemoryCardSource::new();
        source.preload(vec![card("Gone", Difficulty::Easy)]);

        assert!(source.delete_category("Gone".into()).await.unwrap());
        assert!(source.list_cards().await.unwrap().is_empty());
        assert!(source.random_any(HashSet::new()).await.unwrap().is_none());
    }
}
