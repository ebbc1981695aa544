use rmcp::{
    ServerHandler,
    tool,
    model::{
        ServerCapabilities, Implementation, ProtocolVersion, CallToolResult,
        RawResource, ListResourcesResult, ReadResourceResult, ResourceContents,
        ReadResourceRequestParams, AnnotateAble,
    },
    handler::server::wrapper::Parameters,
    service::{RequestContext, RoleServer},
    ErrorData as McpError,
};
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::Product;
use crate::errors::ShoprecError;
use crate::recommend::{Algorithm, RecommendationEngine};
use crate::store::Action;

pub const MAX_LIMIT: u32 = 100;

pub struct RecommendationService {
    engine: Arc<RecommendationEngine>,
    default_limit: u32,
    start_time: Instant,
}

impl RecommendationService {
    pub fn new(engine: Arc<RecommendationEngine>, default_limit: u32) -> Self {
        Self {
            engine,
            default_limit: default_limit.clamp(1, MAX_LIMIT),
            start_time: Instant::now(),
        }
    }

    /// Zero is rejected; values above the cap are reduced to it.
    fn resolve_limit(&self, limit: Option<u32>) -> Result<usize, ShoprecError> {
        match limit {
            None => Ok(self.default_limit as usize),
            Some(0) => Err(ShoprecError::validation(
                "limit",
                "Field 'limit' must be a positive integer",
            )),
            Some(n) => Ok(n.min(MAX_LIMIT) as usize),
        }
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    async fn resolve_product(&self, product: ProductRef) -> Result<Product, ShoprecError> {
        match product {
            ProductRef::Title(title) => {
                if title.trim().is_empty() {
                    return Err(ShoprecError::validation("product", "Product title cannot be empty"));
                }
                self.engine
                    .catalog()
                    .find_by_title(&title)
                    .await
                    .ok_or_else(|| ShoprecError::not_found(format!("product '{}'", title)))
            }
            ProductRef::Full(product) => {
                if product.title.trim().is_empty() || product.category.trim().is_empty() {
                    return Err(ShoprecError::validation(
                        "product",
                        "Product payload needs a non-empty title and category",
                    ));
                }
                Ok(product)
            }
        }
    }
}

// Parameter structs

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetRecommendationsParams {
    /// Shopper to recommend for (required; unknown users are treated as new)
    pub user_id: String,
    /// hybrid, collaborative, content, popular or trending (default: hybrid)
    pub algorithm: Option<String>,
    /// Maximum results to return (positive; above 100 is capped; default: 12)
    pub limit: Option<u32>,
}

/// A product given either by catalog title or as a full payload.
#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ProductRef {
    Title(String),
    Full(Product),
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct RecordInteractionParams {
    /// Shopper who interacted (required)
    pub user_id: String,
    /// Catalog title, or a full product object in storefront (camelCase) shape
    pub product: ProductRef,
    /// view, click, wishlist, share, compare; other values are recorded as-is
    pub action: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UserParams {
    /// Shopper id (required)
    pub user_id: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct UpdateProfileParams {
    /// Shopper id (required)
    pub user_id: String,
    /// Arbitrary preference object; replaces any stored preferences
    pub preferences: Option<serde_json::Value>,
    /// Free-text feedback appended to the user's feedback log
    pub feedback: Option<String>,
}

// Helper: convert ShoprecError to CallToolResult with isError: true
fn error_to_result(err: ShoprecError) -> CallToolResult {
    match err {
        ShoprecError::NotFound { what } => {
            CallToolResult::structured_error(json!({
                "isError": true,
                "error": format!("Not found: {}", what),
                "hint": "Use the catalog://products resource to see available product titles"
            }))
        }
        ShoprecError::Validation { message, field } => {
            let mut obj = json!({
                "isError": true,
                "error": message,
            });
            if let Some(f) = field {
                obj["field"] = json!(f);
            }
            CallToolResult::structured_error(obj)
        }
        other => {
            tracing::error!(error = %other, "Tool failed");
            CallToolResult::structured_error(json!({
                "isError": true,
                "error": "Internal error while handling the request"
            }))
        }
    }
}

fn require_user_id(user_id: &str) -> Result<(), CallToolResult> {
    if user_id.trim().is_empty() {
        return Err(CallToolResult::structured_error(json!({
            "isError": true,
            "error": "Field 'user_id' is required and cannot be empty",
            "field": "user_id"
        })));
    }
    Ok(())
}

// Tool implementations
#[rmcp::tool_router]
impl RecommendationService {
    #[tool(description = "Get product recommendations for a user. Algorithms: hybrid (default), collaborative, content, popular, trending. Unknown algorithms fall back to hybrid.")]
    async fn get_recommendations(
        &self,
        Parameters(params): Parameters<GetRecommendationsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "get_recommendations",
            user_id = %params.user_id,
            algorithm = ?params.algorithm,
            limit = ?params.limit,
            "Tool called"
        );

        if let Err(result) = require_user_id(&params.user_id) {
            return Ok(result);
        }

        let resolved = Algorithm::resolve(params.algorithm.as_deref());
        if let Some(ref requested) = resolved.unrecognized {
            tracing::warn!(
                requested = %requested,
                fallback = %resolved.algorithm,
                "Unknown recommendation algorithm, falling back"
            );
        }

        let limit = match self.resolve_limit(params.limit) {
            Ok(limit) => limit,
            Err(e) => return Ok(error_to_result(e)),
        };

        match self
            .engine
            .recommend(&params.user_id, resolved.algorithm, limit)
            .await
        {
            Ok(results) => Ok(CallToolResult::structured(json!({
                "algorithm": resolved.algorithm.as_str(),
                "fallback": resolved.is_fallback(),
                "requested_algorithm": resolved.unrecognized,
                "count": results.len(),
                "recommendations": results,
                "generated_at": chrono::Utc::now().to_rfc3339(),
            }))),
            Err(e) => Ok(error_to_result(e)),
        }
    }

    #[tool(description = "Record a user interaction (view, click, wishlist, share, compare) with a product given by catalog title or full payload.")]
    async fn record_interaction(
        &self,
        Parameters(params): Parameters<RecordInteractionParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "record_interaction",
            user_id = %params.user_id,
            action = %params.action,
            "Tool called"
        );

        if let Err(result) = require_user_id(&params.user_id) {
            return Ok(result);
        }

        let product = match self.resolve_product(params.product).await {
            Ok(p) => p,
            Err(e) => return Ok(error_to_result(e)),
        };

        let action: Action = params.action.into();
        if !action.is_known() {
            tracing::debug!(action = %action, "Recording unrecognized action verbatim");
        }

        match self
            .engine
            .record_interaction(&params.user_id, &product, action)
            .await
        {
            Ok(record) => Ok(CallToolResult::structured(json!({
                "recorded": true,
                "user_id": record.user_id,
                "title": record.product.title,
                "category": record.product.category,
                "action": record.action,
                "timestamp": record.timestamp.to_rfc3339(),
                "hint": "Use get_recommendations with algorithm 'content' or 'collaborative' to see the effect"
            }))),
            Err(e) => Ok(error_to_result(e)),
        }
    }

    #[tool(description = "List the distinct product categories in the catalog.")]
    async fn get_categories(
        &self,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_categories", "Tool called");

        let categories = self.engine.categories().await;
        Ok(CallToolResult::structured(json!({
            "count": categories.len(),
            "categories": categories,
        })))
    }

    #[tool(description = "Show a user's category preference tally, interaction count, stored profile and feedback.")]
    async fn get_user_preferences(
        &self,
        Parameters(params): Parameters<UserParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "get_user_preferences",
            user_id = %params.user_id,
            "Tool called"
        );

        if let Err(result) = require_user_id(&params.user_id) {
            return Ok(result);
        }

        let store = self.engine.store();
        let (history, tally) = match store.get_activity(&params.user_id).await {
            Ok(activity) => activity,
            Err(e) => return Ok(error_to_result(e)),
        };
        let profile = match store.get_profile(&params.user_id).await {
            Ok(p) => p,
            Err(e) => return Ok(error_to_result(e)),
        };
        let feedback = match store.get_feedback(&params.user_id).await {
            Ok(f) => f,
            Err(e) => return Ok(error_to_result(e)),
        };

        Ok(CallToolResult::structured(json!({
            "user_id": params.user_id,
            "category_preferences": tally,
            "interaction_count": history.len(),
            "profile": profile,
            "feedback": feedback,
        })))
    }

    #[tool(description = "Store user preferences and/or append feedback. At least one of preferences or feedback must be provided.")]
    async fn update_profile(
        &self,
        Parameters(params): Parameters<UpdateProfileParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(
            tool = "update_profile",
            user_id = %params.user_id,
            has_preferences = params.preferences.is_some(),
            has_feedback = params.feedback.is_some(),
            "Tool called"
        );

        if let Err(result) = require_user_id(&params.user_id) {
            return Ok(result);
        }

        if params.preferences.is_none() && params.feedback.is_none() {
            return Ok(CallToolResult::structured_error(json!({
                "isError": true,
                "error": "At least one of 'preferences' or 'feedback' must be provided"
            })));
        }

        match self
            .engine
            .store()
            .update_profile(&params.user_id, params.preferences, params.feedback)
            .await
        {
            Ok(()) => Ok(CallToolResult::structured(json!({
                "updated": true,
                "user_id": params.user_id,
            }))),
            Err(e) => Ok(error_to_result(e)),
        }
    }

    #[tool(description = "Interaction analytics: total views and clicks, conversion rate, top categories, catalog size and active users.")]
    async fn get_analytics(
        &self,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "get_analytics", "Tool called");

        let analytics = match self.engine.store().analytics().await {
            Ok(a) => a,
            Err(e) => return Ok(error_to_result(e)),
        };

        Ok(CallToolResult::structured(json!({
            "total_views": analytics.total_views,
            "total_clicks": analytics.total_clicks,
            "conversion_rate": analytics.conversion_rate,
            "popular_categories": analytics.popular_categories,
            "top_categories": analytics.top_categories,
            "total_products": self.engine.catalog().len().await,
            "active_users": analytics.active_users,
        })))
    }

    #[tool(description = "Check server health and status")]
    async fn health_check(
        &self,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(tool = "health_check", "Tool called");

        Ok(CallToolResult::structured(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": self.uptime_seconds(),
            "products": self.engine.catalog().len().await,
        })))
    }
}

// Helper: one line per product for the catalog resource
fn format_catalog_text(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| {
            format!(
                "[{}] {} | {} | {} (was {}, {}% off) | {:.1}★ ({} reviews) | {}",
                p.category,
                p.title,
                p.marketplace,
                p.price,
                p.original_price,
                p.discount_percent,
                p.rating,
                p.review_count,
                if p.in_stock { "in stock" } else { "out of stock" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ServerHandler implementation
#[rmcp::tool_handler(router = Self::tool_router())]
impl ServerHandler for RecommendationService {
    fn get_info(&self) -> rmcp::model::InitializeResult {
        rmcp::model::InitializeResult {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "shoprec".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some("Multi-marketplace product recommendation server with in-memory interaction tracking".to_string()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Product recommendation server. Tools: get_recommendations, record_interaction, get_categories, get_user_preferences, update_profile, get_analytics, health_check. Resources: catalog://products (current catalog).".to_string()
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            meta: None,
            resources: vec![
                RawResource {
                    uri: "catalog://products".to_string(),
                    name: "products".to_string(),
                    title: Some("Product Catalog".to_string()),
                    description: Some("Current products with price, discount, rating and stock".to_string()),
                    mime_type: Some("text/plain".to_string()),
                    size: None,
                    icons: None,
                    meta: None,
                }
                .no_annotation(),
            ],
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match request.uri.as_str() {
            "catalog://products" => {
                let products = self.engine.catalog().snapshot().await;
                let text = if products.is_empty() {
                    "The catalog is empty.".to_string()
                } else {
                    format_catalog_text(&products)
                };

                Ok(ReadResourceResult {
                    contents: vec![ResourceContents::text(text, request.uri)],
                })
            }
            uri => Err(McpError::resource_not_found(
                format!("Resource not found: {}", uri),
                None,
            )),
        }
    }
}
