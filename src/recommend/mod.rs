/// Recommendation engine
///
/// Ties the catalog, the interaction store and an injectable random source to
/// the selection strategies in `selection` and the reason pools in `reasons`.
/// Nothing is cached between calls: each request snapshots the catalog and the
/// user's interactions afresh.

pub mod reasons;
pub mod selection;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Product, ProductCatalog};
use crate::errors::ShoprecError;
use crate::store::{Action, InteractionRecord, InteractionStore};

/// Selection strategy requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Hybrid,
    Collaborative,
    Content,
    Popular,
    Trending,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Hybrid,
        Algorithm::Collaborative,
        Algorithm::Content,
        Algorithm::Popular,
        Algorithm::Trending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hybrid => "hybrid",
            Algorithm::Collaborative => "collaborative",
            Algorithm::Content => "content",
            Algorithm::Popular => "popular",
            Algorithm::Trending => "trending",
        }
    }

    /// Map a caller-supplied name onto a strategy, falling back to hybrid.
    ///
    /// A missing name is a plain default; an unrecognized one is reported back
    /// in `unrecognized` so the caller can log it.
    pub fn resolve(name: Option<&str>) -> ResolvedAlgorithm {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            None => ResolvedAlgorithm {
                algorithm: Algorithm::default(),
                unrecognized: None,
            },
            Some(name) => match name.parse() {
                Ok(algorithm) => ResolvedAlgorithm {
                    algorithm,
                    unrecognized: None,
                },
                Err(_) => ResolvedAlgorithm {
                    algorithm: Algorithm::default(),
                    unrecognized: Some(name.to_string()),
                },
            },
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ShoprecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                ShoprecError::validation(
                    "algorithm",
                    &format!(
                        "Unknown algorithm '{}': expected one of hybrid, collaborative, content, popular, trending",
                        s
                    ),
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAlgorithm {
    pub algorithm: Algorithm,
    pub unrecognized: Option<String>,
}

impl ResolvedAlgorithm {
    pub fn is_fallback(&self) -> bool {
        self.unrecognized.is_some()
    }
}

/// One recommended product as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResult {
    #[serde(flatten)]
    pub product: Product,
    pub id: String,
    pub reason: String,
    pub generated_at: DateTime<Utc>,
}

pub struct RecommendationEngine {
    catalog: Arc<ProductCatalog>,
    store: Arc<dyn InteractionStore + Send + Sync>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<ProductCatalog>, store: Arc<dyn InteractionStore + Send + Sync>) -> Self {
        Self::with_rng(catalog, store, Box::new(StdRng::from_entropy()))
    }

    /// Use a caller-provided random source, e.g. a seeded `StdRng` in tests.
    pub fn with_rng(
        catalog: Arc<ProductCatalog>,
        store: Arc<dyn InteractionStore + Send + Sync>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            catalog,
            store,
            rng: Mutex::new(rng),
        }
    }

    pub fn catalog(&self) -> &Arc<ProductCatalog> {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn InteractionStore + Send + Sync> {
        &self.store
    }

    /// Run `f` with the shared random source. Never held across an await.
    fn with_rng_locked<R>(&self, f: impl FnOnce(&mut dyn RngCore) -> R) -> Result<R, ShoprecError> {
        let mut guard = self
            .rng
            .lock()
            .map_err(|_| ShoprecError::Internal("random source lock poisoned".to_string()))?;
        Ok(f(&mut **guard))
    }

    /// Pick products for `user_id` with `algorithm`, without annotation.
    pub async fn select(
        &self,
        user_id: &str,
        algorithm: Algorithm,
        limit: usize,
    ) -> Result<Vec<Product>, ShoprecError> {
        let catalog = self.catalog.snapshot().await;

        match algorithm {
            Algorithm::Popular => Ok(selection::popular(&catalog, limit)),
            Algorithm::Trending => Ok(selection::trending(&catalog, limit)),
            Algorithm::Collaborative => {
                let tally = self.store.get_category_preferences(user_id).await?;
                self.with_rng_locked(|rng| selection::collaborative(&catalog, &tally, limit, rng))
            }
            Algorithm::Content => {
                let history = self.store.get_history(user_id).await?;
                self.with_rng_locked(|rng| selection::content_based(&catalog, &history, limit, rng))
            }
            Algorithm::Hybrid => {
                let (history, tally) = self.store.get_activity(user_id).await?;
                self.with_rng_locked(|rng| selection::hybrid(&catalog, &history, &tally, limit, rng))
            }
        }
    }

    /// Select and annotate: every result gets a reason, a fresh id and a timestamp.
    pub async fn recommend(
        &self,
        user_id: &str,
        algorithm: Algorithm,
        limit: usize,
    ) -> Result<Vec<RecommendationResult>, ShoprecError> {
        let products = self.select(user_id, algorithm, limit).await?;
        let generated_at = Utc::now();

        let results = self.with_rng_locked(|rng| {
            products
                .into_iter()
                .map(|product| RecommendationResult {
                    reason: reasons::pick_reason(algorithm, &product, rng),
                    id: Uuid::new_v4().to_string(),
                    generated_at,
                    product,
                })
                .collect::<Vec<_>>()
        })?;

        tracing::debug!(
            user_id = %user_id,
            algorithm = %algorithm,
            limit = limit,
            count = results.len(),
            "Recommendations generated"
        );
        Ok(results)
    }

    pub async fn record_interaction(
        &self,
        user_id: &str,
        product: &Product,
        action: Action,
    ) -> Result<InteractionRecord, ShoprecError> {
        self.store.record_interaction(user_id, product, action).await
    }

    pub async fn categories(&self) -> Vec<String> {
        self.catalog.categories().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::product;
    use crate::store::memory::InMemoryInteractionStore;
    use std::collections::HashSet;

    fn abc_engine(seed: u64) -> RecommendationEngine {
        let catalog = ProductCatalog::new(vec![
            product("A", "Electronics", 4.5, 0, true),
            product("B", "Electronics", 4.0, 30, true),
            product("C", "Books", 4.8, 0, false),
        ])
        .unwrap();
        RecommendationEngine::with_rng(
            Arc::new(catalog),
            Arc::new(InMemoryInteractionStore::new()),
            Box::new(StdRng::seed_from_u64(seed)),
        )
    }

    fn builtin_engine(seed: u64) -> RecommendationEngine {
        RecommendationEngine::with_rng(
            Arc::new(ProductCatalog::builtin()),
            Arc::new(InMemoryInteractionStore::new()),
            Box::new(StdRng::seed_from_u64(seed)),
        )
    }

    fn titles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_resolve_known_names() {
        for algorithm in Algorithm::ALL {
            let resolved = Algorithm::resolve(Some(algorithm.as_str()));
            assert_eq!(resolved.algorithm, algorithm);
            assert!(!resolved.is_fallback());
        }
    }

    #[test]
    fn test_resolve_defaults_and_fallback() {
        assert_eq!(Algorithm::resolve(None).algorithm, Algorithm::Hybrid);
        assert!(!Algorithm::resolve(Some("  ")).is_fallback());

        let resolved = Algorithm::resolve(Some("deep-learning"));
        assert_eq!(resolved.algorithm, Algorithm::Hybrid);
        assert_eq!(resolved.unrecognized.as_deref(), Some("deep-learning"));
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        let err = "Popular".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, ShoprecError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_abc_scenario_end_to_end() {
        let engine = abc_engine(1);
        let popular = engine.select("u", Algorithm::Popular, 2).await.unwrap();
        assert_eq!(titles(&popular), vec!["A", "B"]);
        let trending = engine.select("u", Algorithm::Trending, 5).await.unwrap();
        assert_eq!(titles(&trending), vec!["B"]);
        let collab = engine.select("u", Algorithm::Collaborative, 5).await.unwrap();
        assert_eq!(titles(&collab), vec!["B"]);

        let a = engine.catalog().find_by_title("A").await.unwrap();
        engine.record_interaction("u", &a, Action::View).await.unwrap();
        let tally = engine.store().get_category_preferences("u").await.unwrap();
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![("Electronics", 1)]);
    }

    #[tokio::test]
    async fn test_content_without_history_matches_popular() {
        let engine = builtin_engine(8);
        let content = engine.select("new-user", Algorithm::Content, 6).await.unwrap();
        let popular = engine.select("new-user", Algorithm::Popular, 6).await.unwrap();
        assert_eq!(content, popular);
    }

    #[tokio::test]
    async fn test_recommend_annotates_each_result() {
        let engine = builtin_engine(17);
        let results = engine.recommend("u", Algorithm::Trending, 4).await.unwrap();
        assert_eq!(results.len(), 4);
        let ids: HashSet<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        for r in &results {
            let pool = reasons::reason_pool(Algorithm::Trending, &r.product);
            assert!(pool.contains(&r.reason));
            assert!(Uuid::parse_str(&r.id).is_ok());
        }
    }

    #[tokio::test]
    async fn test_result_serializes_flat() {
        let engine = abc_engine(2);
        let results = engine.recommend("u", Algorithm::Popular, 1).await.unwrap();
        let json = serde_json::to_value(&results[0]).unwrap();
        assert_eq!(json["title"], "A");
        assert_eq!(json["inStock"], true);
        assert!(json["reason"].is_string());
        assert!(json["id"].is_string());
        assert!(json["generated_at"].is_string());
    }

    #[tokio::test]
    async fn test_history_shapes_content_recommendations() {
        let engine = builtin_engine(31);
        let book = engine
            .catalog()
            .find_by_title("Atomic Habits by James Clear")
            .await
            .unwrap();
        engine.record_interaction("reader", &book, Action::Click).await.unwrap();

        let results = engine.select("reader", Algorithm::Content, 10).await.unwrap();
        assert_eq!(titles(&results), vec!["The Psychology of Money by Morgan Housel"]);
    }

    #[tokio::test]
    async fn test_catalog_changes_are_seen_immediately() {
        let engine = abc_engine(4);
        engine
            .catalog()
            .update(|products| products[1].in_stock = false)
            .await;
        assert!(engine.select("u", Algorithm::Trending, 5).await.unwrap().is_empty());
        assert_eq!(titles(&engine.select("u", Algorithm::Popular, 5).await.unwrap()), vec!["A"]);
    }

    #[tokio::test]
    async fn test_hybrid_for_active_user_respects_limits() {
        let engine = builtin_engine(77);
        let shoes = engine
            .catalog()
            .find_by_title("Adidas Ultraboost 22 Running Shoes")
            .await
            .unwrap();
        engine.record_interaction("runner", &shoes, Action::View).await.unwrap();
        for limit in [3usize, 12, 40] {
            let results = engine.recommend("runner", Algorithm::Hybrid, limit).await.unwrap();
            assert!(results.len() <= limit.min(selection::HYBRID_DEFAULT_LIMIT));
            let unique: HashSet<&str> = results.iter().map(|r| r.product.title.as_str()).collect();
            assert_eq!(unique.len(), results.len());
            assert!(results.iter().all(|r| r.product.in_stock));
        }
    }
}
