//! Domain risk analysis engine. Six network probes observe a domain
//! concurrently; a weighted model and a threshold rule engine score the
//! collected signals independently and are blended into a single verdict
//! with a human-readable explanation.

pub mod collector;
pub mod config;
pub mod features;
pub mod probes;
pub mod scoring;
pub mod signals;
pub mod target;

pub use config::AnalyzerConfig;
pub use signals::{AnalysisResult, Reason, Severity, SignalSet, Verdict};
pub use target::AnalysisTarget;

use anyhow::{Context, Result};
use collector::SignalCollector;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use signals::ScoreComponents;

/// Top-level analyzer owning the shared DNS resolver and HTTP client.
/// One instance serves any number of sequential or concurrent analyses.
pub struct DomainAnalyzer {
    config: AnalyzerConfig,
    resolver: TokioAsyncResolver,
    client: reqwest::Client,
}

impl DomainAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            log::warn!("system resolver config unavailable ({e}), using defaults");
            TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
        });

        let client = reqwest::Client::builder()
            .user_agent(config.content.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.probes.content_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            // The certificate probe judges TLS separately; content fetching
            // must still work against invalid certificates.
            .danger_accept_invalid_certs(true)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            config,
            resolver,
            client,
        })
    }

    /// Full pipeline: collect signals over the network, then score them.
    pub async fn analyze(&self, target: &AnalysisTarget) -> AnalysisResult {
        let collector = SignalCollector::new(&self.config, &self.resolver, &self.client);
        let signals = collector.collect(target).await;
        score_signals(&self.config, target, signals)
    }
}

/// Network-free tail of the pipeline. Deterministic: the same signal set
/// always yields the same result.
pub fn score_signals(
    config: &AnalyzerConfig,
    target: &AnalysisTarget,
    signals: SignalSet,
) -> AnalysisResult {
    let features = features::extract(target, &signals);
    let weighted = scoring::score_features(&config.weights, &features);
    let rules = scoring::evaluate_rules(&config.rules, &signals);

    if log::log_enabled!(log::Level::Debug) {
        for (name, contribution) in &weighted.contributions {
            log::debug!("{target}: feature {name} contributed {contribution:+.4}");
        }
    }

    let final_score = scoring::combine_scores(weighted.score, rules.score);
    let verdict = scoring::verdict_for(final_score);
    let reasons = scoring::assemble_reasons(
        final_score,
        verdict,
        weighted.confidence,
        &signals,
        rules.reasons,
    );

    log::info!(
        "{target}: score {final_score:.1} ({verdict}), model {:.1}, rules {:.1}, confidence {:.2}",
        weighted.score,
        rules.score,
        weighted.confidence
    );

    AnalysisResult {
        domain: target.as_str().to_string(),
        final_score,
        verdict,
        confidence: weighted.confidence,
        reasons,
        components: ScoreComponents {
            ml_score: weighted.score,
            rule_score: rules.score,
            confidence: weighted.confidence,
        },
        signals,
    }
}
