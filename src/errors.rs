/// Domain-specific error types for shoprec
///
/// Tool handlers turn these into structured `isError` results so a caller can
/// tell a rejected request apart from an empty recommendation list.

#[derive(Debug, thiserror::Error)]
pub enum ShoprecError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>
    },

    #[error("Not found: {what}")]
    NotFound {
        what: String
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ShoprecError {
    fn from(e: serde_json::Error) -> Self {
        ShoprecError::Catalog(e.to_string())
    }
}

impl ShoprecError {
    /// Helper to create validation errors with field names
    ///
    /// Example:
    /// ```
    /// use shoprec::errors::ShoprecError;
    /// let err = ShoprecError::validation("user_id", "User id cannot be empty");
    /// ```
    pub fn validation(field: &str, message: &str) -> Self {
        ShoprecError::Validation {
            message: message.to_string(),
            field: Some(field.to_string()),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ShoprecError::NotFound { what: what.into() }
    }
}
