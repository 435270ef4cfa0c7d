use thiserror::Error;

/// Label used for records at the registrable domain itself.
pub const APEX_LABEL: &str = "@";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unable to parse hostname: {hostname:?}")]
pub struct HostnameError {
    pub hostname: String,
}

/// Splits a hostname into its registrable parent domain and the label below it.
pub trait DomainSplitter: Send + Sync {
    fn split_registrable_domain(&self, hostname: &str) -> Result<(String, String), HostnameError>;
}

/// Splits against the public suffix list compiled into the `psl` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PublicSuffixSplitter;

impl DomainSplitter for PublicSuffixSplitter {
    fn split_registrable_domain(&self, hostname: &str) -> Result<(String, String), HostnameError> {
        let invalid = || HostnameError {
            hostname: hostname.to_string(),
        };

        let host = hostname.trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() || host.split('.').any(|label| label.is_empty()) {
            return Err(invalid());
        }

        let parent = psl::domain_str(&host).ok_or_else(invalid)?;
        if parent == host {
            return Ok((parent.to_string(), APEX_LABEL.to_string()));
        }

        let label = host
            .strip_suffix(parent)
            .and_then(|rest| rest.strip_suffix('.'))
            .ok_or_else(invalid)?;
        Ok((parent.to_string(), label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(hostname: &str) -> Result<(String, String), HostnameError> {
        PublicSuffixSplitter.split_registrable_domain(hostname)
    }

    #[test]
    fn test_split_simple_subdomain() {
        assert_eq!(
            split("foo.example.com").unwrap(),
            ("example.com".to_string(), "foo".to_string())
        );
    }

    #[test]
    fn test_split_multi_label_suffix() {
        assert_eq!(
            split("foo.example.co.uk").unwrap(),
            ("example.co.uk".to_string(), "foo".to_string())
        );
    }

    #[test]
    fn test_split_deep_label() {
        assert_eq!(
            split("a.b.example.com").unwrap(),
            ("example.com".to_string(), "a.b".to_string())
        );
    }

    #[test]
    fn test_split_apex() {
        assert_eq!(
            split("example.com").unwrap(),
            ("example.com".to_string(), APEX_LABEL.to_string())
        );
    }

    #[test]
    fn test_split_normalizes_case_and_trailing_dot() {
        assert_eq!(
            split("Home.Example.COM.").unwrap(),
            ("example.com".to_string(), "home".to_string())
        );
    }

    #[test]
    fn test_split_reassembles_hostname() {
        for host in ["foo.example.com", "x.y.example.org", "router.example.com.au"] {
            let (parent, label) = split(host).unwrap();
            assert_eq!(format!("{}.{}", label, parent), host);
        }
    }

    #[test]
    fn test_split_rejects_bare_suffix() {
        assert!(split("com").is_err());
        assert!(split("co.uk").is_err());
    }

    #[test]
    fn test_split_rejects_malformed() {
        assert!(split("").is_err());
        assert!(split("foo..example.com").is_err());
        assert!(split(".").is_err());
    }

    #[test]
    fn test_hostname_error_message() {
        let err = split("com").unwrap_err();
        assert_eq!(err.to_string(), "unable to parse hostname: \"com\"");
    }
}
