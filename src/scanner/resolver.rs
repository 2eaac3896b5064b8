//! Reverse name resolution for discovered hosts.
//!
//! Lookups are best effort. Every failure, and any answer that merely echoes
//! the queried address, collapses to `None`.

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Default bound on a single reverse lookup.
pub const DEFAULT_DNS_TIMEOUT: Duration = Duration::from_millis(2000);

/// Resolves an address to a host name.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn reverse(&self, address: Ipv4Addr) -> Option<String>;
}

/// Resolver that never returns a name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

#[async_trait]
impl NameResolver for NoResolver {
    async fn reverse(&self, _address: Ipv4Addr) -> Option<String> {
        None
    }
}

/// PTR lookups through the system resolver configuration.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new() -> Self {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            debug!(error = %e, "system resolver config unavailable, using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });

        Self { resolver }
    }
}

impl Default for DnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameResolver for DnsResolver {
    async fn reverse(&self, address: Ipv4Addr) -> Option<String> {
        let response = self.resolver.reverse_lookup(IpAddr::V4(address)).await.ok()?;
        let name = response.iter().next()?.to_string();
        normalize_name(&name, address)
    }
}

/// Caps how long the wrapped resolver may take per lookup.
///
/// A lookup that runs past the limit yields `None`. With no limit the
/// inner resolver is awaited as long as it takes.
#[derive(Debug, Clone)]
pub struct Bounded<R> {
    inner: R,
    limit: Option<Duration>,
}

impl<R: NameResolver> Bounded<R> {
    pub fn new(inner: R, limit: Option<Duration>) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<R: NameResolver> NameResolver for Bounded<R> {
    async fn reverse(&self, address: Ipv4Addr) -> Option<String> {
        let Some(limit) = self.limit else {
            return self.inner.reverse(address).await;
        };

        match timeout(limit, self.inner.reverse(address)).await {
            Ok(name) => name,
            Err(_) => {
                debug!(%address, limit_ms = limit.as_millis() as u64, "reverse lookup timed out");
                None
            }
        }
    }
}

/// Strip the root dot and reject empty or address-echo answers.
fn normalize_name(name: &str, address: Ipv4Addr) -> Option<String> {
    let name = name.trim().trim_end_matches('.');
    if name.is_empty() || name == address.to_string() {
        None
    } else {
        Some(name.to_string())
    }
}
