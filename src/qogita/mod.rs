//! Qogita API Integration Module
//!
//! Client for the Qogita wholesale API: login, variant search, carts,
//! allocation, addresses and checkout.
//!
//! ```text
//!   VariantCatalog trait ──► QogitaClient ──► ApiHttpClient ──► reqwest
//!         ▲
//!         └── export::DealsExporter
//! ```

pub mod client;
pub mod http_client;
pub mod models;
pub mod query;
pub mod traits;

pub use client::QogitaClient;
pub use http_client::ApiHttpClient;
pub use models::{SearchPage, Session, Variant};
pub use query::SearchQuery;
pub use traits::{ApiError, ApiResult, Credentials, VariantCatalog};
