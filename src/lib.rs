//! # iwhois
//!
//! Recursive WHOIS resolution: start at the registry responsible for a value
//! (or at IANA), follow `refer:`/`whois:`/`ReferralServer:` lines from server
//! to server, and return the authoritative record. Per-registry query quirks
//! and reply charsets are handled along the way.
//!
//! Basic usage:
//! ```no_run
//! use iwhois::query;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let result = query("example.com").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```
//!
//! For custom routing tables, quirks or transports build a
//! [`Resolver`] from a [`ResolverConfig`].

pub mod config;
pub mod core;
pub mod web;
pub mod whois;

use std::sync::Arc;

pub use config::ResolverConfig;
pub use crate::core::{QueryKind, Registry};
pub use whois::{Resolver, WhoisError};

fn default_resolver() -> Resolver {
    Resolver::with_tcp(Arc::new(ResolverConfig::default()))
}

/// Recursive lookup with the built-in configuration
///
/// # Examples
///
/// ```no_run
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     println!("{}", iwhois::query("AS13335").await?);
///     println!("{}", iwhois::query("1.1.1.1").await?);
///     Ok(())
/// }
/// ```
pub async fn query(value: &str) -> Result<String, WhoisError> {
    default_resolver().resolve_recursive(value).await
}

/// Recursive lookup returning every server's reply with the referral
/// decisions in between
pub async fn query_verbose(value: &str) -> Result<String, WhoisError> {
    default_resolver().resolve_recursive_verbose(value).await
}

/// Single query against one registry
pub async fn query_registry(registry: Registry, value: &str) -> Result<String, WhoisError> {
    default_resolver().resolve_fixed(registry, value).await
}
