//! Qogita client contract
//!
//! Error types, credentials and the `VariantCatalog` trait the exporter is
//! written against. `QogitaClient` is the production implementation.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{SearchPage, Session, Variant};
use super::query::SearchQuery;

// ============================================================================
// Error Types
// ============================================================================

/// Qogita API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Result type for Qogita API operations
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Credentials
// ============================================================================

/// Login credentials for a Qogita buyer account
#[derive(Clone, Default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Read `QOGITA_EMAIL` and `QOGITA_PASSWORD` from the process environment.
    ///
    /// Missing variables become empty strings; the API rejects them at login.
    pub fn from_env() -> Self {
        Credentials {
            email: std::env::var("QOGITA_EMAIL").unwrap_or_default(),
            password: std::env::var("QOGITA_PASSWORD").unwrap_or_default(),
        }
    }

    /// Check if both values are non-empty
    pub fn is_configured(&self) -> bool {
        !self.email.is_empty() && !self.password.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Catalog Trait
// ============================================================================

/// The slice of the Qogita API the deals exporter needs.
#[async_trait]
pub trait VariantCatalog: Send + Sync {
    /// Authenticate and open a session
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session>;

    /// Fetch one page of the variant search
    async fn search_variants(
        &self,
        session: &Session,
        query: &SearchQuery,
    ) -> ApiResult<SearchPage<Variant>>;
}
