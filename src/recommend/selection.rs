/// Product selection strategies
///
/// Every function here is a pure pass over a catalog snapshot (plus the
/// user's history or tally where relevant). Out-of-stock products never
/// appear in a result and no result is longer than its `limit`.
///
/// Identity is the product title: when lists are merged the first occurrence
/// wins and the order of first appearance is kept until a shuffle step.

use std::cmp::Ordering;
use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::catalog::Product;
use crate::store::{CategoryTally, InteractionRecord};

/// Products must be discounted strictly more than this to count as trending.
pub const TRENDING_MIN_DISCOUNT: u8 = 20;
/// Trending products appended to the collaborative candidate pool.
pub const COLLABORATIVE_TRENDING: usize = 5;
/// Fixed size of each half of the hybrid merge, independent of the caller's limit.
pub const HYBRID_SUB_LIMIT: usize = 6;
pub const HYBRID_DEFAULT_LIMIT: usize = 12;

fn in_stock(catalog: &[Product]) -> impl Iterator<Item = &Product> {
    catalog.iter().filter(|p| p.in_stock)
}

/// Drop repeated titles, keeping the first occurrence in place.
pub fn dedup_by_title(products: Vec<Product>) -> Vec<Product> {
    let mut seen = HashSet::new();
    products
        .into_iter()
        .filter(|p| seen.insert(p.title.clone()))
        .collect()
}

fn shuffled(mut products: Vec<Product>, limit: usize, rng: &mut dyn RngCore) -> Vec<Product> {
    products.shuffle(rng);
    products.truncate(limit);
    products
}

/// In-stock products by rating, highest first. Equal ratings keep catalog order.
pub fn popular(catalog: &[Product], limit: usize) -> Vec<Product> {
    let mut products: Vec<Product> = in_stock(catalog).cloned().collect();
    products.sort_by(|a, b| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal));
    products.truncate(limit);
    products
}

/// In-stock products discounted more than 20%, biggest discount first.
pub fn trending(catalog: &[Product], limit: usize) -> Vec<Product> {
    let mut products: Vec<Product> = in_stock(catalog)
        .filter(|p| p.discount_percent > TRENDING_MIN_DISCOUNT)
        .cloned()
        .collect();
    products.sort_by(|a, b| b.discount_percent.cmp(&a.discount_percent));
    products.truncate(limit);
    products
}

/// Everything in stock from the user's counted categories plus the top trending
/// products, de-duplicated and shuffled.
pub fn collaborative(
    catalog: &[Product],
    tally: &CategoryTally,
    limit: usize,
    rng: &mut dyn RngCore,
) -> Vec<Product> {
    let mut candidates: Vec<Product> = Vec::new();
    for category in tally.categories() {
        candidates.extend(in_stock(catalog).filter(|p| p.category == category).cloned());
    }
    candidates.extend(trending(catalog, COLLABORATIVE_TRENDING));
    shuffled(dedup_by_title(candidates), limit, rng)
}

/// Unseen in-stock products from categories the user has interacted with.
/// Users without history get `popular(limit)` instead.
pub fn content_based(
    catalog: &[Product],
    history: &[InteractionRecord],
    limit: usize,
    rng: &mut dyn RngCore,
) -> Vec<Product> {
    if history.is_empty() {
        return popular(catalog, limit);
    }

    let seen_titles: HashSet<&str> = history.iter().map(|r| r.product.title.as_str()).collect();
    let mut categories: Vec<&str> = Vec::new();
    for record in history {
        let category = record.product.category.as_str();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    let mut candidates: Vec<Product> = Vec::new();
    for category in categories {
        candidates.extend(
            in_stock(catalog)
                .filter(|p| p.category == category && !seen_titles.contains(p.title.as_str()))
                .cloned(),
        );
    }
    shuffled(candidates, limit, rng)
}

/// Collaborative and content-based picks (six each) merged, de-duplicated,
/// shuffled and cut to `limit`. Never longer than twelve.
pub fn hybrid(
    catalog: &[Product],
    history: &[InteractionRecord],
    tally: &CategoryTally,
    limit: usize,
    rng: &mut dyn RngCore,
) -> Vec<Product> {
    let mut combined = collaborative(catalog, tally, HYBRID_SUB_LIMIT, rng);
    combined.extend(content_based(catalog, history, HYBRID_SUB_LIMIT, rng));
    shuffled(dedup_by_title(combined), limit, rng)
}
