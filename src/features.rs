use crate::signals::{ProbeResult, SignalSet};
use crate::target::AnalysisTarget;
use serde::Serialize;

/// Cautious defaults applied when a feature's source probe failed. Every
/// value is at-or-worse than neutral so missing data never lowers the
/// perceived risk. The rule engine applies the same bias on raw payloads.
pub mod defaults {
    /// Youngest possible domain.
    pub const DOMAIN_AGE: f64 = 0.0;
    pub const HAS_HTTPS: f64 = 0.0;
    pub const SSL_VALID: f64 = 0.0;
    /// Equivalent to one blocklist hit.
    pub const BLACKLIST_HITS: f64 = 0.2;
    /// Below the neutral midpoint of the provider table.
    pub const HOSTING_REPUTATION: f64 = 0.35;
    /// Above the neutral content score.
    pub const CONTENT_SCAM_SCORE: f64 = 0.6;
    pub const DNS_RESOLVED: f64 = 0.0;
    /// Registrant identity assumed hidden.
    pub const WHOIS_PRIVACY: f64 = 1.0;
    pub const RISK_KEYWORDS: f64 = 0.3;
}

/// Fixed-size numeric representation of one analysis. Always fully
/// populated; `defaulted` lists the fields that fell back to the cautious
/// default because their source probe did not settle.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureVector {
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
    pub defaulted: Vec<&'static str>,
}

pub const FEATURE_COUNT: usize = 10;

impl FeatureVector {
    /// Fraction of features derived from fully-observed probe data.
    pub fn observed_fraction(&self) -> f64 {
        (FEATURE_COUNT - self.defaulted.len()) as f64 / FEATURE_COUNT as f64
    }
}

/// Deterministic, pure mapping from the six probe results to the feature
/// vector. Invoked only after all probes have settled.
pub fn extract(target: &AnalysisTarget, signals: &SignalSet) -> FeatureVector {
    let mut defaulted = Vec::new();

    let (domain_age, whois_privacy, domain_length) = match &signals.registration {
        ProbeResult::Ok(reg) => {
            let age = match reg.age_days {
                Some(days) => normalize_age(days),
                None => {
                    // Payload present but age unresolvable; same bias applies
                    defaulted.push("domain_age");
                    defaults::DOMAIN_AGE
                }
            };
            let privacy = if reg.privacy_protected { 1.0 } else { 0.0 };
            (age, privacy, normalize_length(reg.domain.len()))
        }
        _ => {
            defaulted.push("domain_age");
            defaulted.push("whois_privacy");
            defaulted.push("domain_length");
            (
                defaults::DOMAIN_AGE,
                defaults::WHOIS_PRIVACY,
                normalize_length(target.as_str().len()),
            )
        }
    };

    let (has_https, ssl_valid) = match &signals.certificate {
        ProbeResult::Ok(cert) => (
            if cert.has_ssl { 1.0 } else { 0.0 },
            if cert.valid { 1.0 } else { 0.0 },
        ),
        _ => {
            defaulted.push("has_https");
            defaulted.push("ssl_valid");
            (defaults::HAS_HTTPS, defaults::SSL_VALID)
        }
    };

    let blacklist_hits = match &signals.threat_list {
        ProbeResult::Ok(threat) => (threat.hits as f64 / 5.0).min(1.0),
        _ => {
            defaulted.push("blacklist_hits");
            defaults::BLACKLIST_HITS
        }
    };

    let hosting_reputation = match &signals.hosting {
        ProbeResult::Ok(hosting) => hosting.reputation_score as f64 / 100.0,
        _ => {
            defaulted.push("hosting_reputation");
            defaults::HOSTING_REPUTATION
        }
    };

    let (content_scam_score, risk_keywords) = match &signals.content {
        ProbeResult::Ok(content) => {
            let keyword_count =
                content.high_risk_keywords.len() + content.medium_risk_keywords.len();
            (
                content.scam_score.clamp(0.0, 1.0),
                (keyword_count as f64 / 10.0).min(1.0),
            )
        }
        _ => {
            defaulted.push("content_scam_score");
            defaulted.push("risk_keywords");
            (defaults::CONTENT_SCAM_SCORE, defaults::RISK_KEYWORDS)
        }
    };

    let dns_resolved = match &signals.resolution {
        ProbeResult::Ok(res) => {
            if res.resolved {
                1.0
            } else {
                0.0
            }
        }
        _ => {
            defaulted.push("dns_resolved");
            defaults::DNS_RESOLVED
        }
    };

    FeatureVector {
        domain_age,
        has_https,
        ssl_valid,
        blacklist_hits,
        hosting_reputation,
        content_scam_score,
        dns_resolved,
        domain_length,
        whois_privacy,
        risk_keywords,
        defaulted,
    }
}

/// Age saturates at three years; anything older is equally reassuring.
fn normalize_age(days: u32) -> f64 {
    (days as f64 / 1095.0).min(1.0)
}

fn normalize_length(len: usize) -> f64 {
    (len as f64 / 50.0).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::*;

    fn target() -> AnalysisTarget {
        AnalysisTarget::parse("example.com").unwrap()
    }

    fn all_failed() -> SignalSet {
        SignalSet {
            registration: ProbeResult::Timeout,
            certificate: ProbeResult::Timeout,
            resolution: ProbeResult::Error("resolver down".to_string()),
            threat_list: ProbeResult::Timeout,
            hosting: ProbeResult::Unavailable,
            content: ProbeResult::Timeout,
        }
    }

    fn all_safe() -> SignalSet {
        SignalSet {
            registration: ProbeResult::Ok(RegistrationInfo {
                domain: "example.com".to_string(),
                age_days: Some(3650),
                registrar: Some("Example Registrar".to_string()),
                privacy_protected: false,
                estimated: false,
            }),
            certificate: ProbeResult::Ok(CertificateInfo {
                has_ssl: true,
                valid: true,
                issuer: Some("DigiCert Inc".to_string()),
                days_until_expiry: Some(90),
            }),
            resolution: ProbeResult::Ok(ResolutionInfo {
                resolved: true,
                addresses: vec!["93.184.216.34".parse().unwrap()],
                reverse_hostname: None,
            }),
            threat_list: ProbeResult::Ok(ThreatListInfo {
                hits: 0,
                listed_on: vec![],
                lists_checked: 8,
                indicators: vec![],
            }),
            hosting: ProbeResult::Ok(HostingInfo {
                provider: "Cloudflare".to_string(),
                reputation_score: 80,
                bulletproof: false,
                risk_factors: vec![],
            }),
            content: ProbeResult::Ok(ContentInfo {
                reachable: true,
                scam_score: 0.0,
                high_risk_keywords: vec![],
                medium_risk_keywords: vec![],
                low_risk_keywords: vec![],
                has_forms: false,
                has_password_form: false,
                phishing_form: false,
                text_length: 5000,
                external_links: 3,
            }),
        }
    }

    #[test]
    fn test_vector_is_complete_when_all_probes_fail() {
        let fv = extract(&target(), &all_failed());
        assert_eq!(fv.defaulted.len(), FEATURE_COUNT);
        assert_eq!(fv.observed_fraction(), 0.0);
        // Exact cautious-default table
        assert_eq!(fv.domain_age, defaults::DOMAIN_AGE);
        assert_eq!(fv.has_https, defaults::HAS_HTTPS);
        assert_eq!(fv.ssl_valid, defaults::SSL_VALID);
        assert_eq!(fv.blacklist_hits, defaults::BLACKLIST_HITS);
        assert_eq!(fv.hosting_reputation, defaults::HOSTING_REPUTATION);
        assert_eq!(fv.content_scam_score, defaults::CONTENT_SCAM_SCORE);
        assert_eq!(fv.dns_resolved, defaults::DNS_RESOLVED);
        assert_eq!(fv.whois_privacy, defaults::WHOIS_PRIVACY);
        assert_eq!(fv.risk_keywords, defaults::RISK_KEYWORDS);
    }

    #[test]
    fn test_defaults_never_more_favorable_than_observed_safe_values() {
        let observed = extract(&target(), &all_safe());
        let defaulted = extract(&target(), &all_failed());

        // Risk-decreasing features default at or below the safe observation
        assert!(defaulted.domain_age <= observed.domain_age);
        assert!(defaulted.has_https <= observed.has_https);
        assert!(defaulted.ssl_valid <= observed.ssl_valid);
        assert!(defaulted.dns_resolved <= observed.dns_resolved);
        assert!(defaulted.hosting_reputation <= observed.hosting_reputation);
        // Risk-increasing features default at or above the safe observation
        assert!(defaulted.blacklist_hits >= observed.blacklist_hits);
        assert!(defaulted.content_scam_score >= observed.content_scam_score);
        assert!(defaulted.whois_privacy >= observed.whois_privacy);
        assert!(defaulted.risk_keywords >= observed.risk_keywords);
    }

    #[test]
    fn test_fully_observed_vector_has_no_defaults() {
        let fv = extract(&target(), &all_safe());
        assert!(fv.defaulted.is_empty());
        assert_eq!(fv.observed_fraction(), 1.0);
        assert_eq!(fv.domain_age, 1.0);
        assert_eq!(fv.has_https, 1.0);
        assert_eq!(fv.blacklist_hits, 0.0);
        assert_eq!(fv.hosting_reputation, 0.8);
    }

    #[test]
    fn test_single_probe_failure_reduces_coverage_only() {
        let mut signals = all_safe();
        signals.registration = ProbeResult::Timeout;
        let fv = extract(&target(), &signals);
        assert_eq!(fv.domain_age, defaults::DOMAIN_AGE);
        assert_eq!(fv.whois_privacy, defaults::WHOIS_PRIVACY);
        assert_eq!(fv.defaulted.len(), 3);
        assert!((fv.observed_fraction() - 0.7).abs() < 1e-9);
        // Other features unaffected
        assert_eq!(fv.has_https, 1.0);
    }

    #[test]
    fn test_age_normalization_saturates() {
        assert_eq!(normalize_age(0), 0.0);
        assert!((normalize_age(365) - 0.333).abs() < 0.001);
        assert_eq!(normalize_age(4000), 1.0);
    }

    #[test]
    fn test_unknown_age_with_payload_defaults_cautiously() {
        let mut signals = all_safe();
        if let ProbeResult::Ok(reg) = &mut signals.registration {
            reg.age_days = None;
        }
        let fv = extract(&target(), &signals);
        assert_eq!(fv.domain_age, defaults::DOMAIN_AGE);
        assert_eq!(fv.defaulted, vec!["domain_age"]);
    }
}
