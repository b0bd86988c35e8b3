//! Qogita API Client Implementation
//!
//! Typed operations for login, variant search, cart management, allocation,
//! addresses and checkout. Every authenticated call takes the `Session`
//! returned by `login`.
//!
//! API Docs: https://qogita.readme.io/

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::http_client::ApiHttpClient;
use super::models::*;
use super::query::SearchQuery;
use super::traits::{ApiError, ApiResult, Credentials, VariantCatalog};
use crate::config::ApiSettings;

/// Qogita API client
#[derive(Clone)]
pub struct QogitaClient {
    http: ApiHttpClient,
}

impl QogitaClient {
    /// Create a client from API settings
    pub fn new(settings: &ApiSettings) -> ApiResult<Self> {
        let timeout = (settings.timeout_secs > 0).then(|| Duration::from_secs(settings.timeout_secs));
        Ok(QogitaClient {
            http: ApiHttpClient::new(&settings.base_url, timeout)?,
        })
    }

    /// Create a client against an arbitrary base URL with no timeout
    pub fn with_base_url(base_url: &str) -> ApiResult<Self> {
        Ok(QogitaClient {
            http: ApiHttpClient::new(base_url, None)?,
        })
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Authenticate with email and password
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let response: LoginResponse = self
            .http
            .post("/auth/login/")
            .json(&LoginRequest { email, password })
            .send_json()
            .await?;

        let session = Session::from(response);
        info!(cart_qid = %session.cart_qid, "Qogita login successful");
        Ok(session)
    }

    /// Search catalog variants
    pub async fn search_variants(
        &self,
        session: &Session,
        query: &SearchQuery,
    ) -> ApiResult<SearchPage<Variant>> {
        self.http
            .get("/variants/search/")
            .query(&query.to_pairs())
            .bearer_auth(session)
            .send_json()
            .await
    }

    /// Get the session's active cart
    pub async fn get_cart(&self, session: &Session) -> ApiResult<Value> {
        self.http
            .get(&format!("/carts/{}/", session.cart_qid))
            .bearer_auth(session)
            .send_json()
            .await
    }

    /// Remove every line from the active cart
    pub async fn empty_cart(&self, session: &Session) -> ApiResult<()> {
        self.http
            .post(&format!("/carts/{}/empty/", session.cart_qid))
            .bearer_auth(session)
            .send()
            .await?;
        Ok(())
    }

    /// Add a product line to the active cart
    pub async fn add_product_to_cart(
        &self,
        session: &Session,
        gtin: &str,
        quantity: u32,
    ) -> ApiResult<()> {
        self.http
            .post(&format!("/carts/{}/lines/", session.cart_qid))
            .json(&CartLineRequest { gtin, quantity })
            .bearer_auth(session)
            .send()
            .await?;
        Ok(())
    }

    /// Optimize the cart allocation, then fetch the allocation summary.
    ///
    /// The two calls are not atomic: if the summary fetch fails the cart on
    /// the server stays optimized.
    pub async fn allocate_cart(&self, session: &Session) -> ApiResult<Value> {
        self.http
            .post(&format!("/carts/{}/optimize/", session.cart_qid))
            .bearer_auth(session)
            .send()
            .await?;

        self.http
            .get(&format!("/carts/{}/allocation-summary/", session.cart_qid))
            .bearer_auth(session)
            .send_json()
            .await
    }

    /// Get one page of allocation lines for the active cart
    pub async fn get_allocation_lines(
        &self,
        session: &Session,
        page: u32,
        size: u32,
    ) -> ApiResult<Value> {
        self.http
            .get(&format!("/carts/{}/allocation-lines/", session.cart_qid))
            .query(&[("page", page), ("size", size)])
            .bearer_auth(session)
            .send_json()
            .await
    }

    /// Get one page of the account's addresses
    pub async fn get_addresses(&self, session: &Session, page: u32, size: u32) -> ApiResult<Value> {
        self.http
            .get("/addresses/")
            .query(&[("page", page), ("size", size)])
            .bearer_auth(session)
            .send_json()
            .await
    }

    /// Set addresses on the cart's checkout and complete it
    pub async fn checkout(
        &self,
        session: &Session,
        shipping_address_qid: &str,
        billing_address_qid: &str,
    ) -> ApiResult<Value> {
        let cart = self.get_cart(session).await?;
        let checkout_qid = cart
            .get("checkoutQid")
            .and_then(Value::as_str)
            .ok_or(ApiError::MissingField("checkoutQid"))?
            .to_string();
        debug!(checkout_qid = %checkout_qid, "Completing checkout");

        self.http
            .patch(&format!("/checkouts/{}/", checkout_qid))
            .json(&CheckoutAddressesRequest {
                shipping_address_qid,
                billing_address_qid,
            })
            .bearer_auth(session)
            .send()
            .await?;

        self.http
            .post(&format!("/checkouts/{}/complete/", checkout_qid))
            .bearer_auth(session)
            .send_json()
            .await
    }
}

#[async_trait]
impl VariantCatalog for QogitaClient {
    async fn login(&self, credentials: &Credentials) -> ApiResult<Session> {
        QogitaClient::login(self, &credentials.email, &credentials.password).await
    }

    async fn search_variants(
        &self,
        session: &Session,
        query: &SearchQuery,
    ) -> ApiResult<SearchPage<Variant>> {
        QogitaClient::search_variants(self, session, query).await
    }
}
