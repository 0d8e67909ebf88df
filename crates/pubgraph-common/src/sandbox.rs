use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::PubgraphError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// An HTTP client that only allows requests to approved domains.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client whose allowlist holds only the NCBI E-utilities host.
    pub fn new() -> Result<Self, PubgraphError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, PubgraphError> {
        let mut allowlist = HashSet::new();
        allowlist.insert("eutils.ncbi.nlm.nih.gov".to_string());

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("pubgraph/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PubgraphError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_string());
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                // Exact match or a subdomain of an allowed domain
                for allowed in &self.allowlist {
                    if host == allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, PubgraphError> {
        if !self.is_allowed(url) {
            return Err(PubgraphError::SecurityError(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }

        Ok(self.client.get(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eutils_host_is_allowed() {
        let client = SandboxClient::new().unwrap();
        assert!(client.is_allowed("https://eutils.ncbi.nlm.nih.gov/entrez/eutils/elink.fcgi"));
        assert!(!client.is_allowed("https://example.org/elink.fcgi"));
        assert!(!client.is_allowed("not a url"));
    }

    #[test]
    fn test_allow_domain_extends_policy() {
        let mut client = SandboxClient::new().unwrap();
        client.allow_domain("localhost");
        assert!(client.is_allowed("http://localhost:8080/entrez/eutils/efetch.fcgi"));
    }

    #[test]
    fn test_disallowed_get_is_security_error() {
        let client = SandboxClient::new().unwrap();
        let err = client.get("https://example.org/").unwrap_err();
        assert!(matches!(err, PubgraphError::SecurityError(_)));
    }
}
