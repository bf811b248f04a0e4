use crate::config::AnalyzerConfig;
use crate::probes::{
    CertificateProbe, ContentProbe, HostingProbe, Probe, ProbeFailure, RegistrationProbe,
    ResolutionProbe, ThreatListProbe,
};
use crate::signals::{ProbeResult, SignalSet};
use crate::target::AnalysisTarget;
use hickory_resolver::TokioAsyncResolver;
use tokio::time::timeout;

/// Runs the six signal probes concurrently and recovers every failure into
/// a `ProbeResult` variant. Total wall time is bounded by the slowest probe
/// budget, and the returned set is always structurally complete.
pub struct SignalCollector<'a> {
    config: &'a AnalyzerConfig,
    resolver: &'a TokioAsyncResolver,
    client: &'a reqwest::Client,
}

impl<'a> SignalCollector<'a> {
    pub fn new(
        config: &'a AnalyzerConfig,
        resolver: &'a TokioAsyncResolver,
        client: &'a reqwest::Client,
    ) -> Self {
        Self {
            config,
            resolver,
            client,
        }
    }

    pub async fn collect(&self, target: &AnalysisTarget) -> SignalSet {
        let registration = RegistrationProbe::new(&self.config.probes);
        let certificate = CertificateProbe::new(&self.config.probes);
        let resolution = ResolutionProbe::new(self.resolver, &self.config.probes);
        let threat_list = ThreatListProbe::new(
            self.resolver,
            &self.config.threat_lists,
            &self.config.lexicon,
            &self.config.probes,
        );
        let hosting = HostingProbe::new(self.resolver, &self.config.hosting, &self.config.probes);
        let content = ContentProbe::new(
            self.client.clone(),
            &self.config.lexicon,
            &self.config.content,
            &self.config.probes,
        );

        let (registration, certificate, resolution, threat_list, hosting, content) = tokio::join!(
            settle(&registration, target),
            settle(&certificate, target),
            settle(&resolution, target),
            settle(&threat_list, target),
            settle(&hosting, target),
            settle(&content, target),
        );

        SignalSet {
            registration,
            certificate,
            resolution,
            threat_list,
            hosting,
            content,
        }
    }
}

/// Enforce the probe's budget and flatten every failure path into data.
async fn settle<P: Probe>(probe: &P, target: &AnalysisTarget) -> ProbeResult<P::Output> {
    match timeout(probe.budget(), probe.observe(target)).await {
        Ok(Ok(payload)) => ProbeResult::Ok(payload),
        Ok(Err(ProbeFailure::Timeout)) => {
            log::warn!("{} probe for {} timed out internally", probe.name(), target);
            ProbeResult::Timeout
        }
        Ok(Err(ProbeFailure::Unavailable)) => {
            log::warn!(
                "{} probe for {} had no signal source available",
                probe.name(),
                target
            );
            ProbeResult::Unavailable
        }
        Ok(Err(e)) => {
            log::warn!("{} probe for {} failed: {e}", probe.name(), target);
            ProbeResult::Error(e.to_string())
        }
        Err(_) => {
            log::warn!(
                "{} probe for {} exceeded its {:?} budget",
                probe.name(),
                target,
                probe.budget()
            );
            ProbeResult::Timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct StubProbe {
        budget: Duration,
        delay: Duration,
        outcome: Result<u32, ProbeFailure>,
    }

    impl Probe for StubProbe {
        type Output = u32;

        fn name(&self) -> &'static str {
            "stub"
        }

        fn budget(&self) -> Duration {
            self.budget
        }

        async fn observe(&self, _target: &AnalysisTarget) -> Result<u32, ProbeFailure> {
            tokio::time::sleep(self.delay).await;
            self.outcome.clone()
        }
    }

    fn target() -> AnalysisTarget {
        AnalysisTarget::parse("example.com").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_ok() {
        let probe = StubProbe {
            budget: Duration::from_secs(5),
            delay: Duration::from_secs(1),
            outcome: Ok(7),
        };
        assert!(matches!(settle(&probe, &target()).await, ProbeResult::Ok(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_enforces_budget() {
        let probe = StubProbe {
            budget: Duration::from_secs(2),
            delay: Duration::from_secs(10),
            outcome: Ok(7),
        };
        assert!(matches!(
            settle(&probe, &target()).await,
            ProbeResult::Timeout
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_maps_failures_to_data() {
        let cases: Vec<(ProbeFailure, fn(&ProbeResult<u32>) -> bool)> = vec![
            (ProbeFailure::Timeout, |r| {
                matches!(r, ProbeResult::Timeout)
            }),
            (ProbeFailure::Unavailable, |r| {
                matches!(r, ProbeResult::Unavailable)
            }),
            (ProbeFailure::Connection("refused".to_string()), |r| {
                matches!(r, ProbeResult::Error(e) if e.contains("refused"))
            }),
            (ProbeFailure::Parse("garbage".to_string()), |r| {
                matches!(r, ProbeResult::Error(e) if e.contains("garbage"))
            }),
        ];
        for (failure, check) in cases {
            let probe = StubProbe {
                budget: Duration::from_secs(5),
                delay: Duration::from_millis(1),
                outcome: Err(failure),
            };
            let settled = settle(&probe, &target()).await;
            assert!(check(&settled), "got {settled:?}");
        }
    }
}
