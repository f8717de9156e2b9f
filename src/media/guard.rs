//! Destination checks for outbound media fetches.
//!
//! A URL passes only if its host is neither a loopback, private, link-local or
//! cloud-metadata destination. The textual check runs on the parsed host;
//! [`GuardedResolver`] checks every address a hostname resolves to at connect
//! time.

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use url::{Host, Url};

use crate::error::MediaError;

const BLOCKED_HOSTNAMES: &[&str] = &[
    "localhost",
    "metadata.google.internal",
    "metadata",
    "metadata.goog",
    "instance-data",
];

/// Rejects URLs whose scheme is not `http` or `https`.
pub fn check_scheme(url: &Url) -> Result<(), MediaError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MediaError::UnsupportedScheme {
            scheme: other.to_string(),
        }),
    }
}

/// Textual destination check on the parsed host.
pub fn check_host(url: &Url) -> Result<(), MediaError> {
    let disallowed = |host: &str| MediaError::DisallowedDestination {
        host: host.to_string(),
    };

    match url.host() {
        None => Err(MediaError::InvalidUrl {
            url: url.to_string(),
            message: "missing host".to_string(),
        }),
        Some(Host::Domain(domain)) => {
            let name = domain.trim_end_matches('.').to_ascii_lowercase();
            if BLOCKED_HOSTNAMES.contains(&name.as_str()) || name.ends_with(".localhost") {
                return Err(disallowed(domain));
            }
            // Literal addresses that slipped past the URL parser's IP detection.
            if let Ok(ip) = name.parse::<IpAddr>() {
                if is_disallowed_ip(ip) {
                    return Err(disallowed(domain));
                }
            }
            Ok(())
        }
        Some(Host::Ipv4(ip)) if is_disallowed_v4(ip) => Err(disallowed(&ip.to_string())),
        Some(Host::Ipv6(ip)) if is_disallowed_v6(ip) => Err(disallowed(&ip.to_string())),
        Some(_) => Ok(()),
    }
}

/// Resolves `host` and fails if any returned address is disallowed.
pub async fn resolve_allowed(host: &str) -> Result<Vec<SocketAddr>, MediaError> {
    // The connector fills in the port after resolution.
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0))
        .await
        .map_err(|e| MediaError::FetchFailed {
            message: format!("could not resolve {host}: {e}"),
        })?
        .collect();

    if let Some(addr) = addrs.iter().find(|addr| is_disallowed_ip(addr.ip())) {
        tracing::warn!(host, resolved = %addr.ip(), "Media host resolves to a disallowed address");
        return Err(MediaError::DisallowedDestination {
            host: host.to_string(),
        });
    }
    Ok(addrs)
}

/// DNS resolver for the media client.
///
/// Runs on every connection the client opens, redirect hops included, so the
/// checked addresses are the ones actually dialled. IP literals never reach a
/// resolver and are covered by [`check_host`].
#[derive(Debug, Default, Clone, Copy)]
pub struct GuardedResolver;

impl Resolve for GuardedResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            match resolve_allowed(&host).await {
                Ok(addrs) => Ok(Box::new(addrs.into_iter()) as Addrs),
                Err(err) => Err(Box::new(err) as Box<dyn std::error::Error + Send + Sync>),
            }
        })
    }
}

/// True for addresses the fetcher must never connect to.
pub fn is_disallowed_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_disallowed_v4(v4),
        IpAddr::V6(v6) => is_disallowed_v6(v6),
    }
}

fn is_disallowed_v4(ip: Ipv4Addr) -> bool {
    let [a, b, _, _] = ip.octets();
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || a == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xc0) == 64)
}

fn is_disallowed_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_disallowed_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}
