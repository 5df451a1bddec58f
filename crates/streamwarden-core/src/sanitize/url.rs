//! Outbound URL validation.
//!
//! Two allow-list guards applied at configuration time: local inference
//! endpoints must stay inside loopback/private address space, and alert
//! webhook targets must be public https URLs. Neither guard issues a
//! network request.

use std::net::IpAddr;

/// Maximum accepted webhook URL length.
pub const MAX_WEBHOOK_URL_LEN: usize = 2048;

/// Container-host alias resolvable from inside a container.
const CONTAINER_HOST_ALIAS: &str = "host.docker.internal";

struct ParsedUrl<'a> {
    scheme: &'a str,
    host: String,
    port: Option<u16>,
    path: &'a str,
}

/// Split a URL into scheme, host, optional port, and path without
/// resolving anything. Handles IPv6 bracket notation (`[::1]:8080`).
fn split_url(url: &str) -> Result<ParsedUrl<'_>, String> {
    let url = url.trim();
    let (scheme, rest) = if let Some(rest) = url.strip_prefix("https://") {
        ("https", rest)
    } else if let Some(rest) = url.strip_prefix("http://") {
        ("http", rest)
    } else {
        return Err("URL must start with http:// or https://".to_string());
    };

    let (host_port, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let (host, port_str) = if let Some(stripped) = host_port.strip_prefix('[') {
        // IPv6 bracket notation.
        let Some(end) = stripped.find(']') else {
            return Err("unterminated IPv6 bracket in host".to_string());
        };
        let host = &stripped[..end];
        let after = &stripped[end + 1..];
        let port = after.strip_prefix(':');
        (host.to_string(), port)
    } else {
        match host_port.split_once(':') {
            Some((h, p)) => (h.to_string(), Some(p)),
            None => (host_port.to_string(), None),
        }
    };

    if host.is_empty() {
        return Err("URL has no host".to_string());
    }

    let port = match port_str {
        Some(p) => Some(
            p.parse::<u16>()
                .map_err(|_| format!("invalid port '{p}'"))?,
        ),
        None => None,
    };

    Ok(ParsedUrl {
        scheme,
        host: host.to_lowercase(),
        port,
        path,
    })
}

fn is_loopback_host(host: &str) -> bool {
    if host == "localhost" {
        return true;
    }
    match host.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback(),
        Err(_) => false,
    }
}

fn is_private_host(host: &str) -> bool {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_private(),
        _ => false,
    }
}

/// Validate a self-hosted inference endpoint URL.
///
/// Accepts only loopback, RFC 1918 private ranges, and the container-host
/// alias; everything else is rejected with a reason. Returns the normalized
/// URL (lowercased host, trailing slash stripped) on success.
pub fn validate_local_endpoint(url: &str) -> Result<String, String> {
    let parsed = split_url(url)?;

    let allowed = is_loopback_host(&parsed.host)
        || is_private_host(&parsed.host)
        || parsed.host == CONTAINER_HOST_ALIAS;
    if !allowed {
        return Err(format!(
            "host '{}' is not a loopback, private-range, or container-host address",
            parsed.host
        ));
    }

    let host = if parsed.host.contains(':') {
        // Re-bracket IPv6 hosts.
        format!("[{}]", parsed.host)
    } else {
        parsed.host
    };
    let mut normalized = format!("{}://{}", parsed.scheme, host);
    if let Some(port) = parsed.port {
        normalized.push_str(&format!(":{port}"));
    }
    let path = parsed.path.trim_end_matches('/');
    normalized.push_str(path);
    Ok(normalized)
}

/// Validate an outward alert-delivery webhook URL.
///
/// Requires https, rejects loopback and container-alias hosts, and caps the
/// overall length.
pub fn validate_webhook_url(url: &str) -> Result<(), String> {
    if url.len() > MAX_WEBHOOK_URL_LEN {
        return Err(format!(
            "URL is {} characters, exceeding the {MAX_WEBHOOK_URL_LEN}-character cap",
            url.len()
        ));
    }
    let parsed = split_url(url)?;
    if parsed.scheme != "https" {
        return Err("webhook URLs must use https".to_string());
    }
    if is_loopback_host(&parsed.host) || parsed.host == CONTAINER_HOST_ALIAS {
        return Err(format!(
            "webhook host '{}' must not be a loopback address",
            parsed.host
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_endpoint_accepts_loopback() {
        assert!(validate_local_endpoint("http://127.0.0.1:11434").is_ok());
        assert!(validate_local_endpoint("http://localhost:8080/v1").is_ok());
        assert!(validate_local_endpoint("http://[::1]:11434").is_ok());
    }

    #[test]
    fn local_endpoint_accepts_private_ranges() {
        assert!(validate_local_endpoint("http://10.0.0.5:11434").is_ok());
        assert!(validate_local_endpoint("http://172.16.0.10").is_ok());
        assert!(validate_local_endpoint("http://192.168.1.20:1234").is_ok());
    }

    #[test]
    fn local_endpoint_accepts_container_host_alias() {
        assert!(validate_local_endpoint("http://host.docker.internal:11434").is_ok());
    }

    #[test]
    fn local_endpoint_rejects_public_hosts() {
        assert!(validate_local_endpoint("http://8.8.8.8").is_err());
        assert!(validate_local_endpoint("https://api.example.com/v1").is_err());
        assert!(validate_local_endpoint("http://172.32.0.1").is_err());
    }

    #[test]
    fn local_endpoint_rejects_other_schemes() {
        assert!(validate_local_endpoint("ftp://127.0.0.1").is_err());
        assert!(validate_local_endpoint("127.0.0.1:11434").is_err());
    }

    #[test]
    fn local_endpoint_normalizes() {
        assert_eq!(
            validate_local_endpoint("http://LOCALHOST:11434/api/").unwrap(),
            "http://localhost:11434/api"
        );
        assert_eq!(
            validate_local_endpoint("http://[::1]:9000").unwrap(),
            "http://[::1]:9000"
        );
    }

    #[test]
    fn webhook_requires_https() {
        assert!(validate_webhook_url("https://hooks.example.com/alert").is_ok());
        assert!(validate_webhook_url("http://hooks.example.com/alert").is_err());
    }

    #[test]
    fn webhook_rejects_loopback() {
        assert!(validate_webhook_url("https://127.0.0.1/alert").is_err());
        assert!(validate_webhook_url("https://localhost/alert").is_err());
        assert!(validate_webhook_url("https://[::1]:8443/alert").is_err());
        assert!(validate_webhook_url("https://host.docker.internal/x").is_err());
    }

    #[test]
    fn webhook_rejects_oversized_urls() {
        let url = format!("https://hooks.example.com/{}", "a".repeat(MAX_WEBHOOK_URL_LEN));
        assert!(validate_webhook_url(&url).is_err());
    }

    #[test]
    fn webhook_rejects_malformed() {
        assert!(validate_webhook_url("https://").is_err());
        assert!(validate_webhook_url("https://host:notaport/x").is_err());
        assert!(validate_webhook_url("not a url").is_err());
    }
}
