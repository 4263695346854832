use serde::{Deserialize, Serialize};

use crate::source::Source;

/// Bookkeeping for a multi-chunk download that has not been finalized yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadProgress {
    pub source: Source,
    /// Next page to request; starts at 1.
    pub current_page: u32,
    pub total_pages_downloaded: u32,
    pub total_products: usize,
}

impl DownloadProgress {
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self {
            source,
            current_page: 1,
            total_pages_downloaded: 0,
            total_products: 0,
        }
    }
}
