//! Reverse DNS lookup of client hostnames
//!
//! Lookups run in spawned tasks before a connection is handed to the event
//! loop, so the resolver and its cache are shared and thread-safe. Failures
//! are never fatal: the textual IP address is used instead.

use crate::config::LookupConfig;
use crate::{Error, Result};
use dashmap::DashMap;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Longest hostname accepted from a PTR record
const MAX_HOSTNAME_LENGTH: usize = 63;

/// Cached lookup result
#[derive(Debug, Clone)]
struct CacheEntry {
    hostname: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// IP to hostname cache with a fixed TTL
#[derive(Debug)]
pub struct DnsCache {
    entries: DashMap<IpAddr, CacheEntry>,
    ttl: Duration,
}

impl DnsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get hostname for IP, dropping the entry if it has expired
    pub fn get(&self, ip: IpAddr, now: Instant) -> Option<String> {
        let entry = self.entries.get(&ip)?;
        if !entry.is_expired(now) {
            return Some(entry.hostname.clone());
        }
        drop(entry);
        self.entries.remove(&ip);
        None
    }

    /// Cache hostname for IP, evicting every expired entry first
    pub fn insert(&self, ip: IpAddr, hostname: String, now: Instant) {
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.entries.insert(
            ip,
            CacheEntry {
                hostname,
                expires_at: now + self.ttl,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// DNS resolver for hostname lookups
pub struct DnsResolver {
    /// None when reverse lookups are disabled
    resolver: Option<TokioAsyncResolver>,
    cache: DnsCache,
    timeout: Duration,
}

impl DnsResolver {
    /// Create a resolver from the system configuration
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let resolver = if config.enable_reverse_dns {
            let resolver = TokioAsyncResolver::tokio_from_system_conf()
                .map_err(|e| Error::Dns(format!("Failed to create DNS resolver: {}", e)))?;
            Some(resolver)
        } else {
            None
        };

        Ok(Self {
            resolver,
            cache: DnsCache::new(Duration::from_secs(config.cache_ttl)),
            timeout: Duration::from_secs(config.timeout),
        })
    }

    /// A resolver that never queries DNS
    pub fn disabled() -> Self {
        Self {
            resolver: None,
            cache: DnsCache::new(Duration::ZERO),
            timeout: Duration::ZERO,
        }
    }

    /// Best-effort hostname for `ip`; falls back to the textual address
    pub async fn resolve_hostname(&self, ip: IpAddr) -> String {
        let now = Instant::now();
        if let Some(hostname) = self.cache.get(ip, now) {
            return hostname;
        }

        let Some(ref resolver) = self.resolver else {
            return ip_hostname(ip);
        };

        let hostname = match timeout(self.timeout, resolver.reverse_lookup(ip)).await {
            Ok(Ok(names)) => names
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string())
                .filter(|name| is_valid_hostname(name)),
            Ok(Err(e)) => {
                tracing::debug!("Reverse lookup of {} failed: {}", ip, e);
                None
            }
            Err(_) => {
                tracing::debug!("Reverse lookup of {} timed out", ip);
                None
            }
        };

        match hostname {
            Some(hostname) => {
                self.cache.insert(ip, hostname.clone(), now);
                hostname
            }
            None => ip_hostname(ip),
        }
    }
}

/// Textual IP usable as a hostname; a leading `:` would break message prefixes
fn ip_hostname(ip: IpAddr) -> String {
    let text = ip.to_string();
    if text.starts_with(':') {
        format!("0{}", text)
    } else {
        text
    }
}

fn is_valid_hostname(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_HOSTNAME_LENGTH
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}
