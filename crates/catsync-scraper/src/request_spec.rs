//! Parsing of captured curl commands into request descriptors.
//!
//! Operators obtain an authenticated catalog request by copying it from a
//! browser's developer tools ("Copy as cURL"). Only the URL, the cookie
//! string, and `-H` headers are kept; every other curl flag is ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;
use crate::headers;

static CURL_QUOTED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"curl\s+['"]([^'"]+)['"]"#).expect("valid regex"));
static CURL_BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"curl\s+(https?://\S+)").expect("valid regex"));
static QUOTED_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"](https?://[^'"]+)['"]"#).expect("valid regex"));
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(https?://[^\s'"]+)"#).expect("valid regex"));
static COOKIE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)(?:-b|--cookie)\s+\$?(?:'([^']*)'|"([^"]*)")"#).expect("valid regex")
});
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|\s)(?:-H|--header)\s+\$?(?:'([^']*)'|"([^"]*)")"#).expect("valid regex")
});

/// Immutable description of an authenticated catalog request.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub url: String,
    /// Raw `Cookie` header value; empty when the request carries no cookies.
    pub cookies: String,
    /// Extra request headers in capture order. Never contains `Cookie`.
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    /// Parses a curl-style descriptor.
    ///
    /// The URL is taken from the first argument after `curl` when present,
    /// otherwise from the first `http(s)://` token anywhere in the text.
    /// Cookies come from `-b`/`--cookie`; a `Cookie:` header is used only
    /// when neither flag is given.
    ///
    /// # Errors
    ///
    /// - [`ParseError::Empty`] for a blank descriptor.
    /// - [`ParseError::MissingUrl`] when no URL can be located.
    /// - [`ParseError::InvalidUrl`] when the located URL does not parse.
    pub fn parse(descriptor: &str) -> Result<Self, ParseError> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Err(ParseError::Empty);
        }

        let url = extract_url(descriptor).ok_or(ParseError::MissingUrl)?;
        reqwest::Url::parse(&url).map_err(|e| ParseError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let explicit_cookies = COOKIE_RE
            .captures(descriptor)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().trim().to_string());

        let mut header_cookie: Option<String> = None;
        let mut header_list: Vec<(String, String)> = Vec::new();
        for caps in HEADER_RE.captures_iter(descriptor) {
            let Some(raw) = caps.get(1).or_else(|| caps.get(2)) else {
                continue;
            };
            let Some((name, value)) = raw.as_str().split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() {
                continue;
            }
            if name.eq_ignore_ascii_case("cookie") {
                header_cookie = Some(value.to_string());
                continue;
            }
            headers::set(&mut header_list, name, value);
        }

        let cookies = explicit_cookies.or(header_cookie).unwrap_or_default();

        Ok(Self {
            url,
            cookies,
            headers: header_list,
        })
    }

    /// Value of the header named `name`, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        headers::get(&self.headers, name)
    }
}

// Cookies and auth headers are session credentials.
impl std::fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("RequestSpec")
            .field("url", &self.url)
            .field(
                "cookies",
                &if self.cookies.is_empty() { "" } else { "[redacted]" },
            )
            .field("headers", &header_names)
            .finish()
    }
}

fn extract_url(descriptor: &str) -> Option<String> {
    [
        &*CURL_QUOTED_URL_RE,
        &*CURL_BARE_URL_RE,
        &*QUOTED_URL_RE,
        &*BARE_URL_RE,
    ]
    .iter()
    .find_map(|re| re.captures(descriptor))
    .and_then(|caps| caps.get(1))
    .map(|m| m.as_str().trim().to_string())
    .filter(|url| !url.is_empty())
}
