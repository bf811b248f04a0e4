use crate::config::ScorerWeights;
use crate::features::FeatureVector;

/// Output of the weighted model: a 0-100 risk score plus the per-feature
/// contributions that produced it, for explanation output.
#[derive(Debug, Clone)]
pub struct WeightedScore {
    pub score: f64,
    /// Fraction of the feature vector derived from observed data.
    pub confidence: f64,
    pub contributions: Vec<(&'static str, f64)>,
}

/// Linear model over the normalized feature vector, squashed through a
/// sigmoid. Pure and deterministic: same vector, same score.
pub fn score_features(weights: &ScorerWeights, features: &FeatureVector) -> WeightedScore {
    let contributions = vec![
        ("domain_age", features.domain_age * weights.domain_age),
        ("has_https", features.has_https * weights.has_https),
        ("ssl_valid", features.ssl_valid * weights.ssl_valid),
        (
            "blacklist_hits",
            features.blacklist_hits * weights.blacklist_hits,
        ),
        (
            "hosting_reputation",
            features.hosting_reputation * weights.hosting_reputation,
        ),
        (
            "content_scam_score",
            features.content_scam_score * weights.content_scam_score,
        ),
        ("dns_resolved", features.dns_resolved * weights.dns_resolved),
        (
            "domain_length",
            features.domain_length * weights.domain_length,
        ),
        (
            "whois_privacy",
            features.whois_privacy * weights.whois_privacy,
        ),
        (
            "risk_keywords",
            features.risk_keywords * weights.risk_keywords,
        ),
    ];

    let raw: f64 = contributions.iter().map(|(_, c)| c).sum();
    // Gain of 5 spreads the small weighted sums across the curve
    let score = 100.0 * sigmoid(raw * 5.0);

    WeightedScore {
        score,
        confidence: features.observed_fraction(),
        contributions,
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
