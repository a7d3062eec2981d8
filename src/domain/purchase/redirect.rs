//! Checkout redirect allow-list.
//!
//! Success and cancel URLs are only accepted when they are absolute http(s)
//! URLs whose host is a trusted host or a subdomain of one.

use reqwest::Url;

use crate::domain::foundation::ValidationError;

/// Trusted redirect destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectAllowList {
    hosts: Vec<String>,
}

impl RedirectAllowList {
    /// Builds the list, normalising hosts to lowercase and dropping blanks.
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self { hosts }
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// True for an exact match or a subdomain of a trusted host.
    pub fn allows_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.hosts.iter().any(|trusted| {
            host == *trusted
                || host
                    .strip_suffix(trusted.as_str())
                    .map_or(false, |prefix| prefix.ends_with('.'))
        })
    }

    /// Parses `raw` and checks it against the list.
    ///
    /// `field` names the request field in the returned error.
    pub fn validate(&self, field: &str, raw: &str) -> Result<Url, ValidationError> {
        let url = Url::parse(raw.trim())
            .map_err(|e| ValidationError::invalid_format(field, format!("not an absolute URL: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::invalid_format(
                field,
                "URL scheme must be http or https",
            ));
        }

        let host = url
            .host_str()
            .ok_or_else(|| ValidationError::invalid_format(field, "URL has no host"))?;

        if !self.allows_host(host) {
            return Err(ValidationError::invalid_format(
                field,
                format!("redirect host '{}' is not allowed", host),
            ));
        }

        Ok(url)
    }
}
