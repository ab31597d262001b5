//! # T2K Common Library
//!
//! Shared code for the Top 2000 chart services including:
//! - Song records and the chart catalog
//! - Process-wide catalog loading with a single-flight cache
//! - Constrained random sampling over the catalog
//! - Configuration loading
//! - Error types and error response bodies for request handlers

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod sampling;
pub mod song;

pub use catalog::{Catalog, CatalogCache, CacheState};
pub use error::{Error, Result};
pub use sampling::SampleQuery;
pub use song::Song;
