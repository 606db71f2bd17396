// file: src/feed/collector.rs
// description: follows the feed's nextLink cursor chain and flattens page items in arrival order

use crate::error::Result;
use crate::feed::fetcher::{Fetcher, Header, QueryParam};
use crate::models::Page;
use serde_json::Value;
use tracing::{debug, warn};

pub struct PaginationCollector<'a> {
    fetcher: &'a Fetcher,
    max_pages: usize,
}

impl<'a> PaginationCollector<'a> {
    pub fn new(fetcher: &'a Fetcher, max_pages: usize) -> Self {
        Self {
            fetcher,
            max_pages: max_pages.max(1),
        }
    }

    /// Fetches `base_url` with `initial_params`, then every `nextLink` verbatim
    /// and without extra query parameters, until the cursor disappears.
    pub async fn collect_all(
        &self,
        base_url: &str,
        headers: &[Header],
        initial_params: &[QueryParam],
    ) -> Result<Vec<Value>> {
        let mut items: Vec<Value> = Vec::new();
        let mut next_url = base_url.to_string();
        let mut params = Some(initial_params);
        let mut page_number = 1;

        loop {
            let payload = self.fetcher.fetch(&next_url, headers, params).await?;
            let page = Page::from_value(payload);
            let cursor = page.next_link().map(str::to_string);

            match &page {
                Page::Single { .. } => debug!(
                    "Fetched page {}: appended full page object (no 'value' array)",
                    page_number
                ),
                _ => debug!(
                    "Fetched page {}: {} items; total {}",
                    page_number,
                    page.item_count(),
                    items.len() + page.item_count()
                ),
            }
            items.extend(page.into_items());

            let Some(cursor) = cursor else {
                break;
            };

            if page_number >= self.max_pages {
                warn!(
                    "[WARN] Stopping pagination after {} pages; nextLink still present: {}",
                    page_number, cursor
                );
                break;
            }

            next_url = cursor;
            params = None;
            page_number += 1;
        }

        Ok(items)
    }
}
