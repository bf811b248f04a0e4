use anyhow::{anyhow, Result};
use serde::Serialize;

/// Normalized domain name under analysis. Lower-case, scheme and path
/// stripped, immutable for the lifetime of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisTarget {
    domain: String,
}

impl AnalysisTarget {
    /// Parse and normalize a domain string. Accepts bare domains as well
    /// as full URLs; rejects anything that is not a plausible hostname.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(anyhow!("empty domain"));
        }

        let host = if trimmed.contains("://") {
            let url = url::Url::parse(trimmed).map_err(|e| anyhow!("invalid URL: {e}"))?;
            url.host_str()
                .ok_or_else(|| anyhow!("URL has no host component"))?
                .to_string()
        } else {
            // Strip any path or query the caller left on a bare domain
            trimmed
                .split(['/', '?', '#'])
                .next()
                .unwrap_or(trimmed)
                .to_string()
        };

        let domain = host
            .trim_end_matches('.')
            .split(':')
            .next()
            .unwrap_or(&host)
            .to_lowercase();

        if domain.is_empty() || domain.len() > 253 || !domain.contains('.') {
            return Err(anyhow!("invalid domain format: {domain}"));
        }
        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(anyhow!("domain contains invalid characters: {domain}"));
        }
        if domain.split('.').any(|label| label.is_empty()) {
            return Err(anyhow!("domain has empty label: {domain}"));
        }

        Ok(Self { domain })
    }

    pub fn as_str(&self) -> &str {
        &self.domain
    }

    /// Last label of the domain, e.g. "com" for "shop.example.com".
    pub fn tld(&self) -> &str {
        self.domain.rsplit('.').next().unwrap_or(&self.domain)
    }

    /// Root registrable domain for WHOIS queries (removes subdomains),
    /// e.g. "mail.example.co.uk" -> "example.co.uk".
    pub fn registrable_domain(&self) -> String {
        let parts: Vec<&str> = self.domain.split('.').collect();

        if parts.len() >= 2 {
            let root = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);

            if parts.len() >= 3 {
                let common_two_part_tlds = [
                    "co.uk", "com.au", "co.jp", "co.kr", "com.br", "co.za", "com.mx", "co.in",
                    "com.sg", "co.nz", "com.ar", "co.il", "org.uk", "net.au", "gov.uk", "ac.uk",
                    "edu.au",
                ];
                if common_two_part_tlds.contains(&root.as_str()) {
                    return format!(
                        "{}.{}.{}",
                        parts[parts.len() - 3],
                        parts[parts.len() - 2],
                        parts[parts.len() - 1]
                    );
                }
            }

            root
        } else {
            self.domain.clone()
        }
    }
}

impl std::fmt::Display for AnalysisTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.domain)
    }
}
