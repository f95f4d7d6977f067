//! Fetches a page, pulls out its SEO meta tags and scores them against a
//! fixed set of rules.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod scrape;
pub mod service;
pub mod store;
pub mod types;

pub use analyzer::evaluate;
pub use types::{AnalysisResult, MetaTags};
