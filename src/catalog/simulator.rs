/// Background price and stock drift for the catalog.
///
/// Each tick walks every product once: with `price_change_probability` the
/// price moves by `floor(price * 0.05 * (r - 0.5))`, and with
/// `stock_change_probability` the stock flag is re-rolled (in stock with
/// probability 0.9). Recommendation requests see the drift on their next
/// snapshot.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use tokio::task::JoinHandle;

use super::{Product, ProductCatalog};
use crate::config::SimulatorConfig;

const PRICE_SWING: f64 = 0.05;
const RESTOCK_PROBABILITY: f64 = 0.9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriftReport {
    pub price_changes: usize,
    pub stock_changes: usize,
}

/// Apply one drift pass to `products`.
pub fn drift(products: &mut [Product], config: &SimulatorConfig, rng: &mut dyn RngCore) -> DriftReport {
    let mut report = DriftReport::default();
    for product in products.iter_mut() {
        if rng.gen::<f64>() < config.price_change_probability {
            let base = product.price as f64;
            let variation = (base * PRICE_SWING * (rng.gen::<f64>() - 0.5)).floor();
            product.price = (base + variation).max(0.0) as u64;
            report.price_changes += 1;
        }
        if rng.gen::<f64>() < config.stock_change_probability {
            product.in_stock = rng.gen::<f64>() < RESTOCK_PROBABILITY;
            report.stock_changes += 1;
        }
    }
    report
}

pub struct CatalogSimulator {
    catalog: Arc<ProductCatalog>,
    config: SimulatorConfig,
}

impl CatalogSimulator {
    pub fn new(catalog: Arc<ProductCatalog>, config: SimulatorConfig) -> Self {
        Self { catalog, config }
    }

    pub async fn tick(&self, rng: &mut (dyn RngCore + Send)) -> DriftReport {
        let config = &self.config;
        self.catalog
            .update(|products| drift(products, config, rng))
            .await
    }

    /// Run ticks every `interval_secs` until the runtime shuts down.
    pub fn spawn(self) -> JoinHandle<()> {
        let period = Duration::from_secs(self.config.interval_secs.max(1));
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; skip it so startup state is served as-is.
            interval.tick().await;
            loop {
                interval.tick().await;
                let report = self.tick(&mut rng).await;
                if report.price_changes > 0 || report.stock_changes > 0 {
                    tracing::debug!(
                        price_changes = report.price_changes,
                        stock_changes = report.stock_changes,
                        "Catalog drift applied"
                    );
                }
            }
        })
    }
}
