// file: src/models/ladder.rs
// description: ordered (response format, page size) candidates tried within one cycle

use crate::config::FeedConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseFormat {
    TaxiiEnvelope,
    StixBundle,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::TaxiiEnvelope => "taxiiEnvelope",
            ResponseFormat::StixBundle => "stixBundle",
        }
    }
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderEntry {
    pub format: ResponseFormat,
    pub top_report: u32,
}

impl LadderEntry {
    pub fn label(&self) -> String {
        format!("topReport={}, format={}", self.top_report, self.format)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackLadder {
    entries: Vec<LadderEntry>,
}

impl FallbackLadder {
    /// Cross product of formats and sizes, format-major, first occurrence wins.
    pub fn new(
        formats: impl IntoIterator<Item = ResponseFormat>,
        sizes: impl IntoIterator<Item = u32>,
    ) -> Self {
        let mut unique_formats: Vec<ResponseFormat> = Vec::new();
        for format in formats {
            if !unique_formats.contains(&format) {
                unique_formats.push(format);
            }
        }

        let mut unique_sizes: Vec<u32> = Vec::new();
        for size in sizes {
            if !unique_sizes.contains(&size) {
                unique_sizes.push(size);
            }
        }

        let entries = unique_formats
            .iter()
            .flat_map(|&format| {
                unique_sizes
                    .iter()
                    .map(move |&top_report| LadderEntry { format, top_report })
            })
            .collect();

        Self { entries }
    }

    pub fn from_config(feed: &FeedConfig) -> Self {
        let formats =
            std::iter::once(feed.response_format).chain(feed.fallback_formats.iter().copied());
        let sizes = std::iter::once(feed.top_report).chain(feed.fallback_page_sizes.iter().copied());
        Self::new(formats, sizes)
    }

    pub fn entries(&self) -> &[LadderEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_sizes_are_deduplicated_in_order() {
        let ladder = FallbackLadder::new(
            [ResponseFormat::TaxiiEnvelope],
            [100, 200, 100, 50, 25, 10],
        );
        let sizes: Vec<u32> = ladder.entries().iter().map(|e| e.top_report).collect();
        assert_eq!(sizes, vec![100, 200, 50, 25, 10]);
    }

    #[test]
    fn test_format_major_order() {
        let ladder = FallbackLadder::new(
            [ResponseFormat::TaxiiEnvelope, ResponseFormat::StixBundle],
            [100, 50],
        );
        assert_eq!(
            ladder.entries(),
            &[
                LadderEntry { format: ResponseFormat::TaxiiEnvelope, top_report: 100 },
                LadderEntry { format: ResponseFormat::TaxiiEnvelope, top_report: 50 },
                LadderEntry { format: ResponseFormat::StixBundle, top_report: 100 },
                LadderEntry { format: ResponseFormat::StixBundle, top_report: 50 },
            ]
        );
    }

    #[test]
    fn test_default_config_ladder() {
        let ladder = FallbackLadder::from_config(&Config::default_config().feed);
        assert_eq!(ladder.len(), 10);
        assert_eq!(ladder.entries()[0].label(), "topReport=100, format=taxiiEnvelope");
        assert_eq!(ladder.entries()[5].label(), "topReport=100, format=stixBundle");
    }

    #[test]
    fn test_format_serde_names() {
        let format: ResponseFormat = serde_json::from_str("\"stixBundle\"").unwrap();
        assert_eq!(format, ResponseFormat::StixBundle);
        assert_eq!(
            serde_json::to_string(&ResponseFormat::TaxiiEnvelope).unwrap(),
            "\"taxiiEnvelope\""
        );
    }
}
