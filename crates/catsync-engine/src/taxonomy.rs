//! Mapping of free-text tags and vendor names to category and brand ids.

use crate::error::StoreError;

/// Tags with this prefix are internal dealer codes, not categories.
const INTERNAL_TAG_PREFIX: &str = "Q|";

/// Resolves names to stable term ids, creating a term the first time its
/// slug is seen.
pub trait TaxonomyResolver: Send + Sync {
    /// Id of the category whose slug matches `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptySlug`] when `name` has no slug characters, or
    /// a persistence failure from the backing store.
    fn resolve_category(&self, name: &str) -> Result<u64, StoreError>;

    /// Id of the brand whose slug matches `name`.
    ///
    /// # Errors
    ///
    /// Same as [`TaxonomyResolver::resolve_category`].
    fn resolve_brand(&self, name: &str) -> Result<u64, StoreError>;
}

/// Lowercases `name`, replaces every run of characters outside `[a-z0-9]`
/// with one `-`, and trims leading and trailing dashes.
///
/// `"Bows & Arrows"` becomes `"bows-arrows"`.
#[must_use]
pub fn normalize_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            slug.push(ch);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// `true` for tags that should become categories.
#[must_use]
pub fn is_category_tag(tag: &str) -> bool {
    let tag = tag.trim();
    !tag.is_empty() && !tag.starts_with(INTERNAL_TAG_PREFIX)
}
