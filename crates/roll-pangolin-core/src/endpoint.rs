// ── Endpoint classification ──
//
// Splits a declared URL into the parts the control plane needs: scheme,
// host (IP literal or DNS name), port, and for DNS names the registrable
// base domain (last two labels) plus whatever subdomain precedes it.

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;
use thiserror::Error;
use url::{Host, Url};

/// Why a declared URL could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("invalid URL '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("URL '{input}' has no host")]
    MissingHost { input: String },
}

/// Port of a classified endpoint.
///
/// `Default` is resolved by the caller, since only the final target
/// synthesis knows which default applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    Explicit(u16),
    Default,
}

impl Port {
    /// Resolve against the endpoint scheme: `https` → 443, anything else → 80.
    pub fn or_scheme_default(self, protocol: &str) -> u16 {
        match self {
            Self::Explicit(port) => port,
            Self::Default if protocol == "https" => 443,
            Self::Default => 80,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(port) => write!(f, "{port}"),
            Self::Default => f.write_str("default"),
        }
    }
}

/// A declared URL, classified.
///
/// For IP hosts `subdomain` is `None` and `base_domain` is the IP literal.
/// For DNS hosts `base_domain` is the last two labels and `subdomain` the
/// remaining prefix (`None` when the host has two labels or fewer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedEndpoint {
    pub protocol: String,
    pub host: String,
    pub is_ip: bool,
    pub port: Port,
    pub subdomain: Option<String>,
    pub base_domain: String,
}

impl ParsedEndpoint {
    /// Classify a URL string.
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(input.trim()).map_err(|e| EndpointError::Invalid {
            input: input.to_owned(),
            reason: e.to_string(),
        })?;

        let missing_host = || EndpointError::MissingHost {
            input: input.to_owned(),
        };

        let ip = match url.host().ok_or_else(missing_host)? {
            Host::Ipv4(addr) => Some(IpAddr::V4(addr)),
            Host::Ipv6(addr) => Some(IpAddr::V6(addr)),
            // Non-special schemes (tcp://, udp://) keep IPv4 hosts opaque.
            Host::Domain(name) => name.parse::<IpAddr>().ok(),
        };

        let port = url.port().map_or(Port::Default, Port::Explicit);
        let protocol = url.scheme().to_owned();

        if let Some(ip) = ip {
            let literal = ip.to_string();
            return Ok(Self {
                protocol,
                host: literal.clone(),
                is_ip: true,
                port,
                subdomain: None,
                base_domain: literal,
            });
        }

        let host = url
            .host_str()
            .map(|h| h.trim_end_matches('.'))
            .filter(|h| !h.is_empty())
            .ok_or_else(missing_host)?
            .to_owned();

        let labels: Vec<&str> = host.split('.').collect();
        let split = labels.len().saturating_sub(2);
        let base_domain = labels[split..].join(".");
        let subdomain = (split > 0).then(|| labels[..split].join("."));

        Ok(Self {
            protocol,
            host,
            is_ip: false,
            port,
            subdomain,
            base_domain,
        })
    }

    /// Port to connect to, with the scheme default applied.
    pub fn effective_port(&self) -> u16 {
        self.port.or_scheme_default(&self.protocol)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_host_has_no_subdomain() {
        let ep = ParsedEndpoint::parse("tcp://10.0.0.5:8080").unwrap();
        assert!(ep.is_ip);
        assert_eq!(ep.protocol, "tcp");
        assert_eq!(ep.host, "10.0.0.5");
        assert_eq!(ep.base_domain, "10.0.0.5");
        assert_eq!(ep.subdomain, None);
        assert_eq!(ep.port, Port::Explicit(8080));
    }

    #[test]
    fn ipv4_host_with_special_scheme() {
        let ep = ParsedEndpoint::parse("http://192.168.1.20").unwrap();
        assert!(ep.is_ip);
        assert_eq!(ep.base_domain, "192.168.1.20");
        assert_eq!(ep.port, Port::Default);
        assert_eq!(ep.effective_port(), 80);
    }

    #[test]
    fn ipv6_host_is_unbracketed() {
        for input in ["http://[::1]:3000", "tcp://[fd00::5]:22", "https://[2001:db8::1]"] {
            let ep = ParsedEndpoint::parse(input).unwrap();
            assert!(ep.is_ip, "{input}");
            assert_eq!(ep.subdomain, None, "{input}");
            assert_eq!(ep.base_domain, ep.host, "{input}");
            assert!(!ep.host.starts_with('['), "{input}");
        }
    }

    #[test]
    fn domain_labels_split_into_base_and_subdomain() {
        let ep = ParsedEndpoint::parse("https://app.sub.example.com").unwrap();
        assert!(!ep.is_ip);
        assert_eq!(ep.base_domain, "example.com");
        assert_eq!(ep.subdomain.as_deref(), Some("app.sub"));
        assert_eq!(ep.host, "app.sub.example.com");
    }

    #[test]
    fn two_label_domain_has_no_subdomain() {
        let ep = ParsedEndpoint::parse("https://example.com/path").unwrap();
        assert_eq!(ep.base_domain, "example.com");
        assert_eq!(ep.subdomain, None);
    }

    #[test]
    fn single_label_host() {
        let ep = ParsedEndpoint::parse("http://localhost:8000").unwrap();
        assert_eq!(ep.base_domain, "localhost");
        assert_eq!(ep.subdomain, None);
        assert_eq!(ep.port, Port::Explicit(8000));
    }

    #[test]
    fn trailing_dot_is_ignored() {
        let ep = ParsedEndpoint::parse("https://www.example.org.").unwrap();
        assert_eq!(ep.host, "www.example.org");
        assert_eq!(ep.base_domain, "example.org");
        assert_eq!(ep.subdomain.as_deref(), Some("www"));
    }

    #[test]
    fn default_ports_follow_scheme() {
        assert_eq!(ParsedEndpoint::parse("https://a.example.com").unwrap().effective_port(), 443);
        assert_eq!(ParsedEndpoint::parse("http://a.example.com").unwrap().effective_port(), 80);
        assert_eq!(ParsedEndpoint::parse("tcp://a.example.com").unwrap().effective_port(), 80);
        // An explicit scheme-default port is elided by the parser.
        assert_eq!(
            ParsedEndpoint::parse("https://a.example.com:443").unwrap().port,
            Port::Default
        );
    }

    #[test]
    fn malformed_input_is_rejected() {
        for input in ["", "not a url", "example.com", "http://", "://missing", "http://exa mple.com"] {
            assert!(ParsedEndpoint::parse(input).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn url_without_host_is_rejected() {
        let err = ParsedEndpoint::parse("mailto:ops@example.com").unwrap_err();
        assert!(matches!(err, EndpointError::MissingHost { .. }));
    }
}
