use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Immutable process-wide configuration. Loaded once at startup and passed
/// by reference into the collector, extractor, scorer, and rule engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub probes: ProbeTimeouts,
    pub threat_lists: ThreatListConfig,
    pub hosting: HostingConfig,
    pub lexicon: KeywordLexicon,
    pub content: ContentConfig,
    pub weights: ScorerWeights,
    pub rules: RuleThresholds,
}

impl AnalyzerConfig {
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config file {path}"))?;
        let config: AnalyzerConfig =
            serde_yaml::from_str(&content).with_context(|| format!("parsing config {path}"))?;
        Ok(config)
    }
}

/// Per-probe wall-clock budgets in seconds. The collector waits for the
/// slowest probe, never the sum.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeTimeouts {
    pub registration_secs: u64,
    pub certificate_secs: u64,
    pub resolution_secs: u64,
    pub threat_list_secs: u64,
    pub hosting_secs: u64,
    pub content_secs: u64,
    /// Budget for each individual list lookup inside the threat-list probe.
    pub threat_list_query_secs: u64,
    /// Budget for the raw WHOIS exchange inside the registration probe;
    /// shorter than the probe budget so the fallback heuristic can run.
    pub whois_query_secs: u64,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            registration_secs: 10,
            certificate_secs: 8,
            resolution_secs: 5,
            threat_list_secs: 8,
            hosting_secs: 6,
            content_secs: 10,
            threat_list_query_secs: 2,
            whois_query_secs: 6,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThreatListConfig {
    /// DNS zones queried as `<domain>.<zone>` (domain blocklists).
    pub domain_zones: Vec<String>,
    /// DNS zones queried as `<reversed-ip>.<zone>` (IP blocklists).
    pub ip_zones: Vec<String>,
}

impl Default for ThreatListConfig {
    fn default() -> Self {
        Self {
            domain_zones: vec![
                "dbl.spamhaus.org".to_string(),
                "multi.uribl.com".to_string(),
                "rhsbl.sorbs.net".to_string(),
                "nomail.rhsbl.sorbs.net".to_string(),
            ],
            ip_zones: vec![
                "zen.spamhaus.org".to_string(),
                "bl.spamcop.net".to_string(),
                "dnsbl.sorbs.net".to_string(),
                "cbl.abuseat.org".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderReputation {
    /// Substring matched against the reverse-DNS hostname.
    pub match_key: String,
    pub name: String,
    pub score: u8,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostingConfig {
    pub providers: Vec<ProviderReputation>,
    pub bulletproof_indicators: Vec<String>,
    /// Score for providers not in the table. Kept below the neutral
    /// midpoint so unknown infrastructure never looks favorable.
    pub unknown_score: u8,
}

impl Default for HostingConfig {
    fn default() -> Self {
        let provider = |match_key: &str, name: &str, score: u8| ProviderReputation {
            match_key: match_key.to_string(),
            name: name.to_string(),
            score,
        };
        Self {
            providers: vec![
                provider("amazon", "Amazon Web Services", 70),
                provider("aws", "Amazon Web Services", 70),
                provider("google", "Google Cloud", 75),
                provider("microsoft", "Microsoft Azure", 75),
                provider("azure", "Microsoft Azure", 75),
                provider("cloudflare", "Cloudflare", 80),
                provider("digitalocean", "DigitalOcean", 65),
                provider("ovh", "OVH", 60),
                provider("hetzner", "Hetzner", 65),
                provider("linode", "Linode", 70),
                provider("vultr", "Vultr", 65),
                provider("namecheap", "Namecheap", 55),
                provider("godaddy", "GoDaddy", 55),
            ],
            bulletproof_indicators: vec![
                "offshore".to_string(),
                "privacy".to_string(),
                "anonymous".to_string(),
                "bulletproof".to_string(),
            ],
            unknown_score: 45,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeywordLexicon {
    pub high_risk: Vec<String>,
    pub medium_risk: Vec<String>,
    pub low_risk: Vec<String>,
    /// Lexical patterns matched against the domain name itself.
    pub domain_scam_keywords: Vec<String>,
    pub suspicious_tlds: Vec<String>,
    /// Urgency language used for the phishing-form heuristic.
    pub urgency_terms: Vec<String>,
}

impl Default for KeywordLexicon {
    fn default() -> Self {
        let strs = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            high_risk: strs(&[
                "congratulations you won",
                "claim your prize",
                "act now",
                "limited time offer",
                "verify your account",
                "suspended account",
                "urgent action required",
                "confirm your identity",
                "update payment info",
                "free money",
                "click here immediately",
                "account will be closed",
                "unusual activity",
                "verify identity",
                "tax refund",
                "nigerian prince",
                "bitcoin giveaway",
                "double your crypto",
                "guaranteed returns",
                "risk-free investment",
            ]),
            medium_risk: strs(&[
                "free gift",
                "no credit card required",
                "limited spots",
                "exclusive offer",
                "special promotion",
                "act fast",
                "instant approval",
                "lowest price",
                "satisfaction guaranteed",
                "work from home",
                "make money fast",
                "lose weight quickly",
            ]),
            low_risk: strs(&[
                "% off",
                "click here now",
                "bonus",
                "winner",
                "one time only",
                "final notice",
            ]),
            domain_scam_keywords: strs(&[
                "verify-account",
                "confirm-identity",
                "suspended-account",
                "urgent-action",
                "claim-prize",
                "free-money",
                "crypto-giveaway",
                "bitcoin-generator",
            ]),
            suspicious_tlds: strs(&["tk", "ml", "ga", "cf", "gq", "xyz", "top", "club"]),
            urgency_terms: strs(&[
                "urgent",
                "immediately",
                "act now",
                "suspended",
                "verify",
                "expire",
                "limited time",
            ]),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentConfig {
    pub max_bytes: usize,
    pub user_agent: String,
    /// Matches per keyword tier reported back in the payload.
    pub max_keywords_per_tier: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_bytes: 500_000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            max_keywords_per_tier: 5,
        }
    }
}

/// Static per-feature weight table for the weighted scorer. Positive
/// weights increase risk, negative decrease it. Treated as tunable
/// configuration, not a fixed contract.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScorerWeights {
    pub domain_age: f64,
    pub has_https: f64,
    pub ssl_valid: f64,
    pub blacklist_hits: f64,
    pub hosting_reputation: f64,
    pub content_scam_score: f64,
    pub dns_resolved: f64,
    pub domain_length: f64,
    pub whois_privacy: f64,
    pub risk_keywords: f64,
}

impl Default for ScorerWeights {
    fn default() -> Self {
        Self {
            domain_age: -0.05,
            has_https: -0.15,
            ssl_valid: -0.10,
            blacklist_hits: 0.30,
            hosting_reputation: -0.02,
            content_scam_score: 0.40,
            dns_resolved: -0.10,
            domain_length: 0.01,
            whois_privacy: 0.05,
            risk_keywords: 0.05,
        }
    }
}

/// Point values for the threshold rule engine. Tunable configuration;
/// only the score cap and the severity directions are structural.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleThresholds {
    pub age_critical_days: u32,
    pub age_critical_points: f64,
    pub age_high_days: u32,
    pub age_high_points: f64,
    pub age_medium_days: u32,
    pub age_medium_points: f64,
    pub age_low_days: u32,
    pub age_low_points: f64,
    pub age_established_days: u32,

    pub no_ssl_points: f64,
    pub invalid_ssl_points: f64,
    pub expiring_ssl_days: i64,
    pub expiring_ssl_points: f64,

    pub no_resolution_points: f64,

    pub blacklist_per_hit_points: f64,
    pub blacklist_cap: f64,
    pub scam_keyword_points: f64,
    pub homograph_points: f64,
    pub suspicious_tld_points: f64,
    pub many_digits_points: f64,
    pub many_hyphens_points: f64,
    pub long_name_points: f64,

    pub bulletproof_score_below: u8,
    pub bulletproof_points: f64,
    pub low_reputation_score_below: u8,
    pub low_reputation_points: f64,
    pub reputable_score_above: u8,
    pub hosting_unknown_points: f64,

    pub high_keyword_points: f64,
    pub high_keyword_cap: f64,
    pub medium_keyword_threshold: usize,
    pub medium_keyword_points: f64,
    pub low_keyword_threshold: usize,
    pub low_keyword_points: f64,
    pub phishing_form_points: f64,
    pub unreachable_points: f64,

    pub max_score: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            age_critical_days: 7,
            age_critical_points: 25.0,
            age_high_days: 30,
            age_high_points: 20.0,
            age_medium_days: 90,
            age_medium_points: 10.0,
            age_low_days: 180,
            age_low_points: 5.0,
            age_established_days: 365,

            no_ssl_points: 15.0,
            invalid_ssl_points: 10.0,
            expiring_ssl_days: 30,
            expiring_ssl_points: 5.0,

            no_resolution_points: 20.0,

            blacklist_per_hit_points: 30.0,
            blacklist_cap: 90.0,
            scam_keyword_points: 15.0,
            homograph_points: 15.0,
            suspicious_tld_points: 10.0,
            many_digits_points: 5.0,
            many_hyphens_points: 5.0,
            long_name_points: 5.0,

            bulletproof_score_below: 30,
            bulletproof_points: 20.0,
            low_reputation_score_below: 50,
            low_reputation_points: 10.0,
            reputable_score_above: 70,
            hosting_unknown_points: 10.0,

            high_keyword_points: 15.0,
            high_keyword_cap: 45.0,
            medium_keyword_threshold: 2,
            medium_keyword_points: 5.0,
            low_keyword_threshold: 3,
            low_keyword_points: 5.0,
            phishing_form_points: 10.0,
            unreachable_points: 5.0,

            max_score: 100.0,
        }
    }
}
