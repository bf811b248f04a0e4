use crate::config::{HostingConfig, ProbeTimeouts};
use crate::probes::{Probe, ProbeFailure};
use crate::signals::HostingInfo;
use crate::target::AnalysisTarget;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;
use tokio::time::timeout;

/// Maps the domain's address to a hosting-provider identity and a
/// reputation score from the static provider table. Unknown providers get
/// a neutral-to-cautious score, never the most favorable one.
pub struct HostingProbe<'a> {
    resolver: &'a TokioAsyncResolver,
    config: &'a HostingConfig,
    budget: Duration,
}

impl<'a> HostingProbe<'a> {
    pub fn new(
        resolver: &'a TokioAsyncResolver,
        config: &'a HostingConfig,
        timeouts: &ProbeTimeouts,
    ) -> Self {
        Self {
            resolver,
            config,
            budget: Duration::from_secs(timeouts.hosting_secs),
        }
    }

    /// Classify a reverse-DNS hostname against the provider table.
    pub fn classify(config: &HostingConfig, hostname: Option<&str>, ip: IpAddr) -> HostingInfo {
        let mut risk_factors = Vec::new();

        let (provider, mut score) = match hostname {
            Some(host) => {
                let host_lower = host.to_lowercase();
                match config
                    .providers
                    .iter()
                    .find(|p| host_lower.contains(&p.match_key))
                {
                    Some(known) => (known.name.clone(), known.score as i32),
                    None => {
                        // Fall back to the host's own registrable name
                        let parts: Vec<&str> = host_lower.split('.').collect();
                        let name = if parts.len() >= 2 {
                            format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1])
                        } else {
                            host_lower.clone()
                        };
                        (name, config.unknown_score as i32)
                    }
                }
            }
            None => ("unknown".to_string(), config.unknown_score as i32),
        };

        let bulletproof = hostname
            .map(|host| {
                let host_lower = host.to_lowercase();
                config
                    .bulletproof_indicators
                    .iter()
                    .any(|ind| host_lower.contains(ind.as_str()))
            })
            .unwrap_or(false);
        if bulletproof {
            risk_factors.push("possible bulletproof hosting".to_string());
            score -= 25;
        }

        if is_suspicious_address(ip) {
            risk_factors.push("address in private or reserved range".to_string());
            score -= 15;
        }

        HostingInfo {
            provider,
            reputation_score: score.clamp(0, 100) as u8,
            bulletproof,
            risk_factors,
        }
    }
}

fn is_suspicious_address(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}

impl Probe for HostingProbe<'_> {
    type Output = HostingInfo;

    fn name(&self) -> &'static str {
        "hosting"
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn observe(&self, target: &AnalysisTarget) -> Result<HostingInfo, ProbeFailure> {
        let lookup = self
            .resolver
            .lookup_ip(target.as_str())
            .await
            .map_err(|_| ProbeFailure::Unavailable)?;
        let ip = lookup.iter().next().ok_or(ProbeFailure::Unavailable)?;

        let hostname = match timeout(Duration::from_secs(2), self.resolver.reverse_lookup(ip)).await
        {
            Ok(Ok(ptr)) => ptr
                .iter()
                .next()
                .map(|name| name.0.to_string().trim_end_matches('.').to_string()),
            _ => None,
        };

        let info = Self::classify(self.config, hostname.as_deref(), ip);
        log::debug!(
            "Hosting for {}: {} (score {})",
            target.as_str(),
            info.provider,
            info.reputation_score
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn public_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))
    }

    #[test]
    fn test_known_provider() {
        let config = HostingConfig::default();
        let info = HostingProbe::classify(
            &config,
            Some("ec2-3-94-12-8.compute-1.amazonaws.com"),
            public_ip(),
        );
        assert_eq!(info.provider, "Amazon Web Services");
        assert_eq!(info.reputation_score, 70);
        assert!(!info.bulletproof);
    }

    #[test]
    fn test_unknown_provider_is_cautious_not_favorable() {
        let config = HostingConfig::default();
        let info = HostingProbe::classify(&config, Some("srv1.random-isp.example"), public_ip());
        assert_eq!(info.reputation_score, config.unknown_score);
        assert!(info.reputation_score < 50);
    }

    #[test]
    fn test_missing_reverse_dns() {
        let config = HostingConfig::default();
        let info = HostingProbe::classify(&config, None, public_ip());
        assert_eq!(info.provider, "unknown");
        assert_eq!(info.reputation_score, config.unknown_score);
    }

    #[test]
    fn test_bulletproof_indicator_flags_and_penalizes() {
        let config = HostingConfig::default();
        let info =
            HostingProbe::classify(&config, Some("node4.bulletproof-hosting.net"), public_ip());
        assert!(info.bulletproof);
        assert_eq!(info.reputation_score as i32, config.unknown_score as i32 - 25);
    }

    #[test]
    fn test_private_address_penalty() {
        let config = HostingConfig::default();
        let info = HostingProbe::classify(
            &config,
            None,
            IpAddr::V4(Ipv4Addr::new(192, 168, 1, 10)),
        );
        assert!(info
            .risk_factors
            .iter()
            .any(|f| f.contains("private or reserved")));
        assert_eq!(info.reputation_score as i32, config.unknown_score as i32 - 15);
    }
}
