//! Per-coordinate resource series: fetching, on-disk caching, and parsing.

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod key;
pub mod parser;
