//! Cookie domain derivation from the public frontend URL.

use std::net::IpAddr;

use http::Uri;

/// Domain attribute for cookies shared across the frontend's subdomains.
///
/// The host is collapsed to its registrable domain per the public suffix list:
/// `https://app.example.com` yields `.example.com` and
/// `https://app.example.co.uk` yields `.example.co.uk`. IP addresses and hosts
/// without a registrable domain (such as `localhost`) are returned unchanged.
/// Returns `None` when the URL has no host.
pub fn cookie_domain(frontend_url: &str) -> Option<String> {
    let uri: Uri = frontend_url.trim().parse().ok()?;
    let host = uri.host()?.trim_start_matches('[').trim_end_matches(']');
    if host.parse::<IpAddr>().is_ok() {
        return Some(host.to_string());
    }

    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }

    match psl::domain_str(&host) {
        Some(registrable) => Some(format!(".{registrable}")),
        None => Some(host),
    }
}
