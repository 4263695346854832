use thiserror::Error;

/// A request descriptor could not be turned into a [`crate::RequestSpec`].
///
/// Raised before any network traffic happens.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("request descriptor is empty")]
    Empty,

    #[error("no URL found in request descriptor")]
    MissingUrl,

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Failure fetching or decoding a single catalog page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} still answered 304 Not Modified after a cache-busting retry")]
    NotModified { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid header \"{name}\": {reason}")]
    InvalidHeader { name: String, reason: String },
}
