//! GitHub REST API access for the built-in probes and org listings.

pub mod client;
pub mod types;

pub use client::{decode_content, GitHubClient, DEFAULT_API_URL};
