pub mod client;
pub mod error;
pub mod headers;
pub mod normalize;
pub mod request_spec;
pub mod types;

pub use client::{page_url, search_url, store_origin, CatalogClient, CatalogPage};
pub use error::{FetchError, ParseError};
pub use normalize::normalize_product;
pub use request_spec::RequestSpec;
