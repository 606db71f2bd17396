// file: src/feed/mod.rs
// description: feed API access module exports
// reference: internal module structure

pub mod collector;
pub mod fetcher;
pub mod filter;

pub use collector::PaginationCollector;
pub use fetcher::{
    FeedSession, Fetcher, Header, QueryParam, RawResponse, ReqwestTransport, RetryPolicy,
    Transport,
};
pub use filter::{FILTER_HEADER, FilterResolver, filter_header};
