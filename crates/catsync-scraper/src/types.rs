//! Wire types for the catalog `products.json` endpoints.
//!
//! Both catalogs speak the Shopify storefront shape, but B2B portals built on
//! top of it are not consistent about scalar types:
//!
//! - ids arrive as JSON numbers or as strings,
//! - `price` arrives as a decimal string (`"30.00"`) or a bare number,
//! - `sku` and option values arrive as strings or, for purely numeric codes,
//!   as bare numbers,
//! - `tags` arrives as an array of strings or a comma-separated string.
//!
//! The untagged enums below accept both forms; [`crate::normalize`] turns them
//! into domain values.

use serde::Deserialize;

/// Top-level response body: `{ "products": [...] }`.
#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<WireProduct>,
}

#[derive(Debug, Deserialize)]
pub struct WireProduct {
    pub id: WireScalar,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub vendor: Option<String>,

    #[serde(default)]
    pub tags: Option<WireTags>,

    #[serde(default)]
    pub variants: Vec<WireVariant>,

    #[serde(default)]
    pub options: Vec<WireOption>,
}

#[derive(Debug, Deserialize)]
pub struct WireVariant {
    pub id: WireScalar,

    #[serde(default)]
    pub title: Option<String>,

    /// Present but may be `null` or `""` on some stores.
    #[serde(default)]
    pub sku: Option<WireScalar>,

    #[serde(default)]
    pub price: Option<WireScalar>,

    #[serde(default)]
    pub option1: Option<WireScalar>,

    #[serde(default)]
    pub option2: Option<WireScalar>,

    #[serde(default)]
    pub option3: Option<WireScalar>,
}

#[derive(Debug, Deserialize)]
pub struct WireOption {
    pub name: String,

    #[serde(default)]
    pub values: Vec<WireScalar>,
}

/// A scalar that may be encoded as a JSON number or a JSON string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Number(serde_json::Number),
    Text(String),
}

impl WireScalar {
    /// Textual form with surrounding whitespace removed.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            WireScalar::Number(n) => n.to_string(),
            WireScalar::Text(s) => s.trim().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireTags {
    List(Vec<String>),
    Joined(String),
}
