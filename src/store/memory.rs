/// In-memory implementation of InteractionStore
///
/// All state lives behind one RwLock, so concurrent writers are serialized
/// globally and every user's tally stays in step with their log. Nothing is
/// persisted and the log is never trimmed.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::catalog::Product;
use crate::errors::ShoprecError;
use crate::store::{
    conversion_rate, Action, CategoryTally, FeedbackEntry, InteractionAnalytics,
    InteractionRecord, InteractionStore, UserProfile,
};

const TOP_CATEGORIES: usize = 5;

#[derive(Default)]
struct UserActivity {
    history: Vec<InteractionRecord>,
    tally: CategoryTally,
}

#[derive(Default)]
struct StoreState {
    users: HashMap<String, UserActivity>,
    total_views: u64,
    total_clicks: u64,
    popular_categories: CategoryTally,
    profiles: HashMap<String, UserProfile>,
    feedback: Vec<FeedbackEntry>,
}

#[derive(Default)]
pub struct InMemoryInteractionStore {
    state: RwLock<StoreState>,
}

impl InMemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InteractionStore for InMemoryInteractionStore {
    async fn record_interaction(
        &self,
        user_id: &str,
        product: &Product,
        action: Action,
    ) -> Result<InteractionRecord, ShoprecError> {
        let record = InteractionRecord {
            user_id: user_id.to_string(),
            product: product.clone(),
            action,
            timestamp: Utc::now(),
        };

        let mut state = self.state.write().await;
        state.total_views += 1;
        if record.action == Action::Click {
            state.total_clicks += 1;
        }
        state.popular_categories.increment(&product.category);

        let activity = state.users.entry(user_id.to_string()).or_default();
        activity.tally.increment(&product.category);
        activity.history.push(record.clone());

        Ok(record)
    }

    async fn get_history(&self, user_id: &str) -> Result<Vec<InteractionRecord>, ShoprecError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(user_id)
            .map(|a| a.history.clone())
            .unwrap_or_default())
    }

    async fn get_category_preferences(&self, user_id: &str) -> Result<CategoryTally, ShoprecError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(user_id)
            .map(|a| a.tally.clone())
            .unwrap_or_default())
    }

    async fn get_activity(
        &self,
        user_id: &str,
    ) -> Result<(Vec<InteractionRecord>, CategoryTally), ShoprecError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .get(user_id)
            .map(|a| (a.history.clone(), a.tally.clone()))
            .unwrap_or_default())
    }

    async fn analytics(&self) -> Result<InteractionAnalytics, ShoprecError> {
        let state = self.state.read().await;
        Ok(InteractionAnalytics {
            total_views: state.total_views,
            total_clicks: state.total_clicks,
            conversion_rate: conversion_rate(state.total_clicks, state.total_views),
            top_categories: state.popular_categories.top(TOP_CATEGORIES),
            popular_categories: state.popular_categories.clone(),
            active_users: state.users.len(),
        })
    }

    async fn update_profile(
        &self,
        user_id: &str,
        preferences: Option<serde_json::Value>,
        feedback: Option<String>,
    ) -> Result<(), ShoprecError> {
        let now = Utc::now();
        let mut state = self.state.write().await;
        if let Some(preferences) = preferences {
            state.profiles.insert(
                user_id.to_string(),
                UserProfile {
                    user_id: user_id.to_string(),
                    preferences,
                    updated_at: now,
                },
            );
        }
        if let Some(feedback) = feedback {
            state.feedback.push(FeedbackEntry {
                user_id: user_id.to_string(),
                feedback,
                timestamp: now,
            });
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ShoprecError> {
        Ok(self.state.read().await.profiles.get(user_id).cloned())
    }

    async fn get_feedback(&self, user_id: &str) -> Result<Vec<FeedbackEntry>, ShoprecError> {
        let state = self.state.read().await;
        Ok(state
            .feedback
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }
}
