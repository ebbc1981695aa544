/// Built-in marketplace dataset loaded when no `catalog_path` is configured.

use super::Product;

#[derive(Debug, Clone, Copy)]
struct ProductSeed {
    title: &'static str,
    category: &'static str,
    marketplace: &'static str,
    price: u64,
    original_price: u64,
    discount_percent: u8,
    rating: f64,
    review_count: u64,
    url: &'static str,
    features: &'static [&'static str],
    in_stock: bool,
    fast_delivery: bool,
}

const PRODUCT_SEEDS: &[ProductSeed] = &[
    ProductSeed {
        title: "Apple iPhone 15 (128GB) - Natural Titanium",
        category: "Electronics",
        marketplace: "Amazon",
        price: 79_900,
        original_price: 89_900,
        discount_percent: 11,
        rating: 4.5,
        review_count: 12_456,
        url: "https://www.amazon.in/dp/B0CHX1W00X",
        features: &["A17 Pro chip", "48MP camera", "USB-C", "Action Button"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Samsung Galaxy S24 Ultra 5G (256GB)",
        category: "Electronics",
        marketplace: "Amazon",
        price: 124_999,
        original_price: 134_999,
        discount_percent: 7,
        rating: 4.4,
        review_count: 8_234,
        url: "https://www.amazon.in/dp/B0CMDRCZBX",
        features: &["200MP camera", "S Pen", "AI features", "Titanium build"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "OnePlus 12R 5G (128GB) - Cool Blue",
        category: "Electronics",
        marketplace: "Amazon",
        price: 39_999,
        original_price: 42_999,
        discount_percent: 7,
        rating: 4.3,
        review_count: 5_678,
        url: "https://www.amazon.in/dp/B0CQVBZJX8",
        features: &["Snapdragon 8 Gen 2", "100W charging", "50MP camera"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Nike Revolution 6 Next Nature Men's Running Shoes",
        category: "Footwear",
        marketplace: "Amazon",
        price: 3_495,
        original_price: 4_995,
        discount_percent: 30,
        rating: 4.2,
        review_count: 15_234,
        url: "https://www.amazon.in/dp/B09JQPX8VH",
        features: &["Lightweight", "Breathable mesh", "Durable outsole"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Adidas Ultraboost 22 Running Shoes",
        category: "Footwear",
        marketplace: "Amazon",
        price: 11_999,
        original_price: 16_999,
        discount_percent: 29,
        rating: 4.4,
        review_count: 3_456,
        url: "https://www.amazon.in/dp/B09TQXM8PL",
        features: &["Boost midsole", "Primeknit upper", "Continental rubber"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Philips Air Fryer HD9252/90 (4.1L)",
        category: "Home & Kitchen",
        marketplace: "Amazon",
        price: 7_999,
        original_price: 12_995,
        discount_percent: 38,
        rating: 4.3,
        review_count: 45_678,
        url: "https://www.amazon.in/dp/B077GBQZPX",
        features: &["Rapid Air Technology", "Digital display", "7 presets"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Prestige Deluxe Alpha Pressure Cooker 5L",
        category: "Home & Kitchen",
        marketplace: "Amazon",
        price: 1_899,
        original_price: 2_850,
        discount_percent: 33,
        rating: 4.5,
        review_count: 67_890,
        url: "https://www.amazon.in/dp/B00KDWVS8A",
        features: &["Stainless steel", "Induction compatible", "5L capacity"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Maybelline New York Lash Sensational Mascara",
        category: "Beauty",
        marketplace: "Amazon",
        price: 399,
        original_price: 599,
        discount_percent: 33,
        rating: 4.1,
        review_count: 23_456,
        url: "https://www.amazon.in/dp/B00VQH8JOW",
        features: &["Curved brush", "Waterproof", "10x volume"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Lakme Absolute Perfect Radiance Skin Lightening Facewash",
        category: "Beauty",
        marketplace: "Amazon",
        price: 175,
        original_price: 220,
        discount_percent: 20,
        rating: 4.2,
        review_count: 12_345,
        url: "https://www.amazon.in/dp/B00DQKM8JG",
        features: &["Skin lightening", "Vitamin E", "100g"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Boldfit Gym Shaker Bottle 700ml",
        category: "Sports",
        marketplace: "Amazon",
        price: 299,
        original_price: 999,
        discount_percent: 70,
        rating: 4.3,
        review_count: 34_567,
        url: "https://www.amazon.in/dp/B07QMKX8VN",
        features: &["BPA free", "Leak proof", "Wire whisk ball"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Strauss Yoga Mat Anti Skid EVA (6mm)",
        category: "Sports",
        marketplace: "Amazon",
        price: 699,
        original_price: 1_999,
        discount_percent: 65,
        rating: 4.0,
        review_count: 8_901,
        url: "https://www.amazon.in/dp/B01AVDVHTI",
        features: &["Anti-skid", "6mm thick", "Eco-friendly"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Atomic Habits by James Clear",
        category: "Books",
        marketplace: "Amazon",
        price: 399,
        original_price: 599,
        discount_percent: 33,
        rating: 4.6,
        review_count: 89_012,
        url: "https://www.amazon.in/dp/1847941834",
        features: &["Bestseller", "Self-help", "Paperback"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "The Psychology of Money by Morgan Housel",
        category: "Books",
        marketplace: "Amazon",
        price: 299,
        original_price: 399,
        discount_percent: 25,
        rating: 4.5,
        review_count: 45_678,
        url: "https://www.amazon.in/dp/9390166268",
        features: &["Finance", "Bestseller", "Paperback"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Levi's Men's 511 Slim Jeans",
        category: "Fashion",
        marketplace: "Amazon",
        price: 2_399,
        original_price: 3_999,
        discount_percent: 40,
        rating: 4.2,
        review_count: 12_345,
        url: "https://www.amazon.in/dp/B07BQXM8VN",
        features: &["Slim fit", "Cotton blend", "Multiple sizes"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Allen Solly Women's Regular Fit Shirt",
        category: "Fashion",
        marketplace: "Amazon",
        price: 899,
        original_price: 1_799,
        discount_percent: 50,
        rating: 4.1,
        review_count: 6_789,
        url: "https://www.amazon.in/dp/B08XQMN8VB",
        features: &["Regular fit", "Cotton", "Formal wear"],
        in_stock: true,
        fast_delivery: true,
    },
    ProductSeed {
        title: "Bosch Car Battery 12V-35Ah",
        category: "Automotive",
        marketplace: "Amazon",
        price: 3_299,
        original_price: 4_500,
        discount_percent: 27,
        rating: 4.4,
        review_count: 2_345,
        url: "https://www.amazon.in/dp/B07QXMN8VC",
        features: &["12V", "35Ah capacity", "2 year warranty"],
        in_stock: true,
        fast_delivery: false,
    },
];

pub(crate) fn builtin_products() -> Vec<Product> {
    PRODUCT_SEEDS
        .iter()
        .map(|seed| Product {
            title: seed.title.to_string(),
            category: seed.category.to_string(),
            marketplace: seed.marketplace.to_string(),
            price: seed.price,
            original_price: seed.original_price,
            discount_percent: seed.discount_percent,
            rating: seed.rating,
            review_count: seed.review_count,
            in_stock: seed.in_stock,
            fast_delivery: seed.fast_delivery,
            url: seed.url.to_string(),
            features: seed.features.iter().map(|f| f.to_string()).collect(),
        })
        .collect()
}
