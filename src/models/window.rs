// file: src/models/window.rs
// description: polling time window with the feed's fixed millisecond formatting

use chrono::{DateTime, Duration, Utc};

/// Timestamp layout the feed expects; sub-second precision is always `.000`.
const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn ending_at(end: DateTime<Utc>, interval: Duration) -> Self {
        Self {
            start: end - interval,
            end,
        }
    }

    pub fn start_param(&self) -> String {
        format_feed_timestamp(&self.start)
    }

    pub fn end_param(&self) -> String {
        format_feed_timestamp(&self.end)
    }
}

pub fn format_feed_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(FEED_TIMESTAMP_FORMAT).to_string()
}
