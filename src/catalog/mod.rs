/// Product catalog
///
/// The catalog is constructed once at startup and shared as an `Arc`.
/// Readers always take a fresh snapshot; only the simulator writes.

mod seed;
pub mod simulator;

use std::collections::HashSet;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::errors::ShoprecError;

/// A marketplace listing. Serialized in camelCase to match storefront payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique within a catalog; used as the identity key
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub marketplace: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub original_price: u64,
    /// 0-100. Derived from the two prices on load when zero.
    #[serde(default)]
    pub discount_percent: u8,
    /// 0.0-5.0
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub in_stock: bool,
    #[serde(default)]
    pub fast_delivery: bool,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Product {
    /// Percentage saved relative to `original_price`, rounded to the nearest integer.
    pub fn derived_discount(&self) -> u8 {
        if self.original_price == 0 || self.price >= self.original_price {
            return 0;
        }
        let saved = (self.original_price - self.price) as f64;
        ((saved * 100.0 / self.original_price as f64).round() as u64).min(100) as u8
    }

    fn validate(&self) -> Result<(), ShoprecError> {
        if self.title.trim().is_empty() {
            return Err(ShoprecError::Catalog("product title cannot be empty".to_string()));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ShoprecError::Catalog(format!(
                "rating {} out of range 0-5 for '{}'",
                self.rating, self.title
            )));
        }
        if self.discount_percent > 100 {
            return Err(ShoprecError::Catalog(format!(
                "discount {}% out of range for '{}'",
                self.discount_percent, self.title
            )));
        }
        Ok(())
    }
}

pub struct ProductCatalog {
    products: RwLock<Vec<Product>>,
}

impl ProductCatalog {
    /// Build a catalog, rejecting duplicate titles and out-of-range fields.
    pub fn new(mut products: Vec<Product>) -> Result<Self, ShoprecError> {
        let mut seen = HashSet::new();
        for product in products.iter_mut() {
            if product.discount_percent == 0 {
                product.discount_percent = product.derived_discount();
            }
            product.validate()?;
            if !seen.insert(product.title.clone()) {
                return Err(ShoprecError::Catalog(format!(
                    "duplicate product title '{}'",
                    product.title
                )));
            }
        }
        Ok(Self {
            products: RwLock::new(products),
        })
    }

    /// The 16-product marketplace dataset shipped with the server.
    pub fn builtin() -> Self {
        Self {
            products: RwLock::new(seed::builtin_products()),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ShoprecError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ShoprecError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ShoprecError::Catalog(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// Current state of every product, in catalog order.
    pub async fn snapshot(&self) -> Vec<Product> {
        self.products.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    pub async fn find_by_title(&self, title: &str) -> Option<Product> {
        self.products
            .read()
            .await
            .iter()
            .find(|p| p.title == title)
            .cloned()
    }

    /// Distinct categories in order of first appearance.
    pub async fn categories(&self) -> Vec<String> {
        let products = self.products.read().await;
        let mut seen = HashSet::new();
        products
            .iter()
            .filter(|p| seen.insert(p.category.as_str()))
            .map(|p| p.category.clone())
            .collect()
    }

    /// Apply an in-place mutation under the write lock.
    pub async fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut [Product]) -> R,
    {
        let mut products = self.products.write().await;
        f(products.as_mut_slice())
    }
}
