//! Qogita API Models
//!
//! Only the fields the client chains on are typed. Cart, allocation, address
//! and checkout payloads pass through as `serde_json::Value`.

use serde::{Deserialize, Serialize};

// ============================================================================
// Authentication
// ============================================================================

/// Body of `POST /auth/login/`
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of `POST /auth/login/`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: LoginUser,
}

/// The `user` object embedded in the login response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub active_cart_qid: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An authenticated session.
///
/// Produced by `login` and passed by reference into every later call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub cart_qid: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>, cart_qid: impl Into<String>) -> Self {
        Session {
            access_token: access_token.into(),
            cart_qid: cart_qid.into(),
        }
    }
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Session {
            access_token: response.access_token,
            cart_qid: response.user.active_cart_qid,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("cart_qid", &self.cart_qid)
            .finish()
    }
}

// ============================================================================
// Search
// ============================================================================

/// One page of a paginated listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> SearchPage<T> {
    /// Whether the server pointed at a following page
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|next| !next.is_empty())
    }
}

/// Variant from the search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub gtin: String,
    /// Name, brand, category, price and the rest, unused by the exporter
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Variant {
    pub fn with_gtin(gtin: impl Into<String>) -> Self {
        Variant {
            gtin: gtin.into(),
            extra: serde_json::Map::new(),
        }
    }
}

// ============================================================================
// Cart / Checkout
// ============================================================================

/// Body of `POST /carts/{qid}/lines/`
#[derive(Debug, Serialize)]
pub struct CartLineRequest<'a> {
    pub gtin: &'a str,
    pub quantity: u32,
}

/// Body of `PATCH /checkouts/{qid}/`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutAddressesRequest<'a> {
    pub shipping_address_qid: &'a str,
    pub billing_address_qid: &'a str,
}
