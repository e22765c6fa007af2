//! Endpoint URL validation.

use url::Url;

/// Reasons an endpoint string is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint URL is empty")]
    Empty,

    #[error("endpoint URL contains {kind} character {ch:?} at byte {index}")]
    IllegalCharacter {
        kind: &'static str,
        ch: char,
        index: usize,
    },

    #[error("endpoint URL could not be parsed: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported endpoint scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("endpoint URL has no host")]
    MissingHost,
}

/// Validate an RPC endpoint string and parse it into a [`Url`].
///
/// `Url::parse` silently strips leading and trailing whitespace and control
/// characters, so the raw string is checked first and refused if it holds any.
pub fn validate_endpoint(raw: &str) -> Result<Url, EndpointError> {
    if raw.is_empty() {
        return Err(EndpointError::Empty);
    }

    if let Some((index, ch)) = raw
        .char_indices()
        .find(|(_, c)| c.is_whitespace() || c.is_control())
    {
        let kind = if ch.is_control() { "control" } else { "whitespace" };
        return Err(EndpointError::IllegalCharacter { kind, ch, index });
    }

    let url = Url::parse(raw)?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(EndpointError::MissingHost);
    }

    Ok(url)
}

/// Whether the endpoint points at the local machine.
pub fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(domain)) => domain == "localhost",
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_endpoints() {
        let url = validate_endpoint("http://localhost:8545").unwrap();
        assert_eq!(url.port(), Some(8545));
        assert!(validate_endpoint("https://ethereum-sepolia-rpc.publicnode.com").is_ok());
        assert!(validate_endpoint("http://127.0.0.1:8545/rpc?key=abc").is_ok());
    }

    #[test]
    fn test_rejects_leading_tab() {
        let err = validate_endpoint("\thttps://polygon-rpc.com").unwrap_err();
        assert_eq!(
            err,
            EndpointError::IllegalCharacter {
                kind: "control",
                ch: '\t',
                index: 0
            }
        );
    }

    #[test]
    fn test_rejects_surrounding_and_embedded_whitespace() {
        assert!(matches!(
            validate_endpoint(" http://localhost:8545"),
            Err(EndpointError::IllegalCharacter { index: 0, .. })
        ));
        assert!(matches!(
            validate_endpoint("http://localhost:8545\n"),
            Err(EndpointError::IllegalCharacter { kind: "control", .. })
        ));
        assert!(matches!(
            validate_endpoint("http://local host:8545"),
            Err(EndpointError::IllegalCharacter {
                kind: "whitespace",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_bad_scheme_and_garbage() {
        assert_eq!(
            validate_endpoint("ftp://localhost:8545"),
            Err(EndpointError::UnsupportedScheme("ftp".to_string()))
        );
        assert!(matches!(
            validate_endpoint("not a url"),
            Err(EndpointError::IllegalCharacter { .. })
        ));
        assert!(matches!(
            validate_endpoint("localhost8545"),
            Err(EndpointError::Parse(_))
        ));
        assert_eq!(validate_endpoint(""), Err(EndpointError::Empty));
    }

    #[test]
    fn test_loopback_detection() {
        assert!(is_loopback(&validate_endpoint("http://localhost:8545").unwrap()));
        assert!(is_loopback(&validate_endpoint("http://127.0.0.1:8545").unwrap()));
        assert!(is_loopback(&validate_endpoint("http://[::1]:8545").unwrap()));
        assert!(!is_loopback(
            &validate_endpoint("https://ethereum-mainnet-rpc.publicnode.com").unwrap()
        ));
    }
}
