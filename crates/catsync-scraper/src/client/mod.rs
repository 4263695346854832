//! HTTP client for paginated catalog `products.json` endpoints.

use std::time::Duration;

use catsync_core::SourceProduct;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};

use crate::error::FetchError;
use crate::headers;
use crate::normalize::normalize_product;
use crate::types::ProductsResponse;

/// One decoded page of a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub products: Vec<SourceProduct>,
}

/// Fetches single catalog pages with session cookies and captured headers.
///
/// A `304 Not Modified` answer is retried exactly once with cache-defeating
/// headers. Every other non-200 status, an empty body, or an undecodable body
/// is returned as a typed [`FetchError`].
pub struct CatalogClient {
    client: Client,
}

impl CatalogClient {
    /// Creates a `CatalogClient` with a fixed timeout, bounded redirects, and
    /// a default `User-Agent` that captured headers may override.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        max_redirects: usize,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .user_agent(user_agent)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Performs one GET against `url` and decodes `{ "products": [...] }`.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidHeader`] if a header name or value is not valid HTTP.
    /// - [`FetchError::Http`] on network, TLS, timeout, or redirect-limit failure.
    /// - [`FetchError::NotModified`] when the cache-busting retry also returns 304.
    /// - [`FetchError::UnexpectedStatus`] for any other non-200 status.
    /// - [`FetchError::EmptyBody`] for a blank body.
    /// - [`FetchError::Deserialize`] when the body is not a products document.
    pub async fn fetch_page(
        &self,
        url: &str,
        cookies: &str,
        extra_headers: &[(String, String)],
    ) -> Result<CatalogPage, FetchError> {
        let merged = merge_headers(cookies, extra_headers);
        let mut response = self.send(url, &merged).await?;

        if response.status() == StatusCode::NOT_MODIFIED {
            tracing::debug!(url, "304 Not Modified; retrying with cache-busting headers");
            let busted = cache_busting_headers(merged);
            response = self.send(url, &busted).await?;
        }

        let status = response.status();
        if status == StatusCode::NOT_MODIFIED {
            return Err(FetchError::NotModified {
                url: url.to_owned(),
            });
        }
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_owned(),
            source,
        })?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_owned(),
            });
        }

        let parsed = serde_json::from_str::<ProductsResponse>(&body).map_err(|e| {
            FetchError::Deserialize {
                context: format!("products page from {url}"),
                source: e,
            }
        })?;

        let products: Vec<SourceProduct> =
            parsed.products.into_iter().map(normalize_product).collect();
        tracing::debug!(url, count = products.len(), "fetched catalog page");

        Ok(CatalogPage { products })
    }

    async fn send(&self, url: &str, header_list: &[(String, String)]) -> Result<Response, FetchError> {
        let header_map = to_header_map(header_list)?;
        self.client
            .get(url)
            .headers(header_map)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_owned(),
                source,
            })
    }
}

/// Builds the URL for `page` of a catalog: the query string of `base_url` is
/// discarded and replaced by `page` and `limit`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if `base_url` does not parse.
pub fn page_url(base_url: &str, page: u32, limit: u32) -> Result<String, FetchError> {
    let mut url = reqwest::Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("limit", &limit.to_string());
    Ok(url.to_string())
}

/// Storefront search URL for `query`, e.g. `{base}/search?q=AB+12`.
///
/// Returns `None` if `base` is not an absolute URL.
#[must_use]
pub fn search_url(base: &str, query: &str) -> Option<String> {
    let mut url = reqwest::Url::parse(&format!("{}/search", base.trim_end_matches('/'))).ok()?;
    url.query_pairs_mut().append_pair("q", query);
    Some(url.to_string())
}

/// Scheme, host, and port of `url` without a trailing slash, e.g.
/// `https://b2b.example.com`.
#[must_use]
pub fn store_origin(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin
        .is_tuple()
        .then(|| origin.ascii_serialization())
}

/// Default cache-avoiding headers, overridden by captured headers; the
/// `Cookie` header always comes from `cookies` and conditional-request
/// headers are dropped.
fn merge_headers(cookies: &str, extra_headers: &[(String, String)]) -> Vec<(String, String)> {
    let mut merged = vec![
        ("cache-control".to_string(), "no-cache".to_string()),
        ("pragma".to_string(), "no-cache".to_string()),
    ];
    for (name, value) in extra_headers {
        headers::set(&mut merged, name, value);
    }
    headers::remove(&mut merged, "cookie");
    headers::remove(&mut merged, "if-none-match");
    headers::remove(&mut merged, "if-modified-since");
    if !cookies.trim().is_empty() {
        headers::set(&mut merged, "Cookie", cookies.trim());
    }
    merged
}

fn cache_busting_headers(mut header_list: Vec<(String, String)>) -> Vec<(String, String)> {
    headers::set(
        &mut header_list,
        "cache-control",
        "no-cache, no-store, must-revalidate",
    );
    headers::set(&mut header_list, "pragma", "no-cache");
    headers::set(&mut header_list, "expires", "0");
    headers::remove(&mut header_list, "if-none-match");
    headers::remove(&mut header_list, "if-modified-since");
    header_list
}

fn to_header_map(header_list: &[(String, String)]) -> Result<HeaderMap, FetchError> {
    let mut map = HeaderMap::with_capacity(header_list.len());
    for (name, value) in header_list {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| FetchError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
