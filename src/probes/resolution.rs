use crate::config::ProbeTimeouts;
use crate::probes::{Probe, ProbeFailure};
use crate::signals::ResolutionInfo;
use crate::target::AnalysisTarget;
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;
use tokio::time::timeout;

/// Resolves the domain to its address set and reverse-resolves the first
/// address. A domain that does not resolve at all is a strongly weighted
/// signal in its own right, emitted as `resolved = false`.
pub struct ResolutionProbe<'a> {
    resolver: &'a TokioAsyncResolver,
    budget: Duration,
}

impl<'a> ResolutionProbe<'a> {
    pub fn new(resolver: &'a TokioAsyncResolver, timeouts: &ProbeTimeouts) -> Self {
        Self {
            resolver,
            budget: Duration::from_secs(timeouts.resolution_secs),
        }
    }
}

impl Probe for ResolutionProbe<'_> {
    type Output = ResolutionInfo;

    fn name(&self) -> &'static str {
        "resolution"
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn observe(&self, target: &AnalysisTarget) -> Result<ResolutionInfo, ProbeFailure> {
        let lookup = match self.resolver.lookup_ip(target.as_str()).await {
            Ok(lookup) => lookup,
            Err(e) => {
                log::debug!("{} does not resolve: {e}", target.as_str());
                return Ok(ResolutionInfo::unresolved());
            }
        };

        let addresses: Vec<_> = lookup.iter().collect();
        if addresses.is_empty() {
            return Ok(ResolutionInfo::unresolved());
        }

        // Reverse lookup is best effort and bounded; PTR servers for cheap
        // hosting are frequently slow or absent.
        let reverse_hostname = match timeout(
            Duration::from_secs(2),
            self.resolver.reverse_lookup(addresses[0]),
        )
        .await
        {
            Ok(Ok(ptr)) => ptr.iter().next().map(|name| {
                name.0
                    .to_string()
                    .trim_end_matches('.')
                    .to_string()
            }),
            _ => None,
        };

        log::debug!(
            "{} resolved to {} address(es), reverse {:?}",
            target.as_str(),
            addresses.len(),
            reverse_hostname
        );

        Ok(ResolutionInfo {
            resolved: true,
            addresses,
            reverse_hostname,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::signals::ResolutionInfo;

    #[test]
    fn test_unresolved_is_complete_payload() {
        let info = ResolutionInfo::unresolved();
        assert!(!info.resolved);
        assert!(info.addresses.is_empty());
        assert_eq!(info.reverse_hostname, None);
    }
}
