/// Human-readable justifications attached to recommendations.
///
/// Reasons are presentation only; nothing here reads or changes ordering.

use rand::{Rng, RngCore};

use super::Algorithm;
use crate::catalog::Product;

/// Candidate reasons for `product` under `algorithm`.
pub fn reason_pool(algorithm: Algorithm, product: &Product) -> Vec<String> {
    match algorithm {
        Algorithm::Hybrid => vec![
            format!("Trending in {}", product.category),
            format!("{}% off - Limited time", product.discount_percent),
            format!("Highly rated ({:.1}★)", product.rating),
            format!("Popular on {}", product.marketplace),
            "Based on your interests".to_string(),
        ],
        Algorithm::Collaborative => vec![
            "Users like you also bought this".to_string(),
            "Popular in your area".to_string(),
            "Recommended by similar shoppers".to_string(),
        ],
        Algorithm::Content => vec![
            "Similar to your recent views".to_string(),
            "Matches your preferences".to_string(),
            "From your favorite category".to_string(),
        ],
        Algorithm::Popular => vec![
            format!("Bestseller on {}", product.marketplace),
            "Top rated product".to_string(),
            "Customer favorite".to_string(),
        ],
        Algorithm::Trending => vec![
            "Trending now".to_string(),
            "Hot deal alert".to_string(),
            "Limited time offer".to_string(),
        ],
    }
}

/// Pick one reason uniformly at random.
pub fn pick_reason(algorithm: Algorithm, product: &Product, rng: &mut dyn RngCore) -> String {
    let mut pool = reason_pool(algorithm, product);
    let index = rng.gen_range(0..pool.len());
    pool.swap_remove(index)
}
