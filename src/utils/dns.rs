use std::sync::LazyLock;

use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};

/// Shared async resolver for origin hostnames. Lookups have no deadline; a
/// stalled resolution blocks the requesting worker and its admission permit.
pub static DNS_RESOLVER: LazyLock<TokioAsyncResolver> =
    LazyLock::new(|| TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default()));
