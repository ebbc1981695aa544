/// Interaction store abstraction layer
///
/// Provides the InteractionStore trait and the records it keeps: the per-user
/// append-only interaction log, the derived category tally, global analytics,
/// and user profile/feedback entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::catalog::Product;
use crate::errors::ShoprecError;

pub mod memory;

/// What the user did with a product. Unknown actions are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Action {
    View,
    Click,
    Wishlist,
    Share,
    Compare,
    Other(String),
}

impl Action {
    pub fn is_known(&self) -> bool {
        !matches!(self, Action::Other(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::View => write!(f, "view"),
            Action::Click => write!(f, "click"),
            Action::Wishlist => write!(f, "wishlist"),
            Action::Share => write!(f, "share"),
            Action::Compare => write!(f, "compare"),
            Action::Other(raw) => write!(f, "{}", raw),
        }
    }
}

impl FromStr for Action {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "view" => Action::View,
            "click" => Action::Click,
            "wishlist" => Action::Wishlist,
            "share" => Action::Share,
            "compare" => Action::Compare,
            other => Action::Other(other.to_string()),
        })
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(action) => action,
            Err(never) => match never {},
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

/// One tracked event. The product is stored as it looked when the event arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_id: String,
    pub product: Product,
    pub action: Action,
    pub timestamp: DateTime<Utc>,
}

/// Category counts that remember the order each category was first counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTally {
    entries: Vec<(String, u64)>,
}

impl CategoryTally {
    pub fn increment(&mut self, category: &str) {
        match self.entries.iter_mut().find(|(c, _)| c == category) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((category.to_string(), 1)),
        }
    }

    pub fn get(&self, category: &str) -> u64 {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Categories in first-occurrence order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), *n))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Up to `n` categories by count descending; ties keep first-occurrence order.
    pub fn top(&self, n: usize) -> Vec<CategoryCount> {
        let mut ranked: Vec<CategoryCount> = self
            .iter()
            .map(|(category, count)| CategoryCount {
                category: category.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }
}

impl Serialize for CategoryTally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (category, count) in &self.entries {
            map.serialize_entry(category, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Global interaction counters across all users.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionAnalytics {
    /// Every recorded interaction counts as a view
    pub total_views: u64,
    pub total_clicks: u64,
    /// clicks / views * 100, two decimals; 0 without clicks
    pub conversion_rate: f64,
    pub popular_categories: CategoryTally,
    pub top_categories: Vec<CategoryCount>,
    /// Users with at least one recorded interaction
    pub active_users: usize,
}

pub fn conversion_rate(total_clicks: u64, total_views: u64) -> f64 {
    if total_clicks == 0 || total_views == 0 {
        return 0.0;
    }
    let rate = total_clicks as f64 / total_views as f64 * 100.0;
    (rate * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub preferences: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub user_id: String,
    pub feedback: String,
    pub timestamp: DateTime<Utc>,
}

/// Core abstraction for interaction tracking.
///
/// Implementations must serialize writers so that a user's tally always
/// matches their log. Unknown users read as empty, never as errors.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Append an interaction and bump the user's tally for the product's category.
    async fn record_interaction(
        &self,
        user_id: &str,
        product: &Product,
        action: Action,
    ) -> Result<InteractionRecord, ShoprecError>;

    /// The user's interactions in insertion order.
    async fn get_history(&self, user_id: &str) -> Result<Vec<InteractionRecord>, ShoprecError>;

    async fn get_category_preferences(&self, user_id: &str) -> Result<CategoryTally, ShoprecError>;

    /// History and tally read together, so the tally always sums to the history length.
    async fn get_activity(
        &self,
        user_id: &str,
    ) -> Result<(Vec<InteractionRecord>, CategoryTally), ShoprecError>;

    async fn analytics(&self) -> Result<InteractionAnalytics, ShoprecError>;

    /// Replace stored preferences when given; append feedback when given.
    async fn update_profile(
        &self,
        user_id: &str,
        preferences: Option<serde_json::Value>,
        feedback: Option<String>,
    ) -> Result<(), ShoprecError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, ShoprecError>;

    async fn get_feedback(&self, user_id: &str) -> Result<Vec<FeedbackEntry>, ShoprecError>;
}
