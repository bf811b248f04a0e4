use crate::signals::{Reason, SignalSet, Verdict};

/// Weighted model carries more of the final score than the rule pass.
const MODEL_SHARE: f64 = 0.6;
const RULE_SHARE: f64 = 0.4;

pub const SUSPICIOUS_THRESHOLD: f64 = 40.0;
pub const LIKELY_SCAM_THRESHOLD: f64 = 70.0;

/// Blend of the two scorers, rounded to one decimal place so equal inputs
/// always serialize identically.
pub fn combine_scores(ml_score: f64, rule_score: f64) -> f64 {
    let combined = ml_score * MODEL_SHARE + rule_score * RULE_SHARE;
    (combined * 10.0).round() / 10.0
}

/// The verdict is a pure function of the final score; no signal can
/// override it independently of the score it already contributed to.
pub fn verdict_for(final_score: f64) -> Verdict {
    if final_score < SUSPICIOUS_THRESHOLD {
        Verdict::Safe
    } else if final_score < LIKELY_SCAM_THRESHOLD {
        Verdict::Suspicious
    } else {
        Verdict::LikelyScam
    }
}

/// Assembles the explanation list: verdict summary first, then a data
/// completeness warning when probes were degraded, then the rule reasons
/// deduplicated and ordered by severity (stable within a severity).
pub fn assemble_reasons(
    final_score: f64,
    verdict: Verdict,
    confidence: f64,
    signals: &SignalSet,
    rule_reasons: Vec<Reason>,
) -> Vec<Reason> {
    let summary_text = format!(
        "overall risk {final_score:.1}/100 ({verdict}), confidence {:.0}%",
        confidence * 100.0
    );
    let summary = match verdict {
        Verdict::Safe => Reason::positive(summary_text),
        Verdict::Suspicious => Reason::warning(summary_text),
        Verdict::LikelyScam => Reason::critical(summary_text),
    };

    let mut reasons = vec![summary];

    let degraded = signals.degraded_probes();
    if !degraded.is_empty() {
        reasons.push(Reason::warning(format!(
            "analysis incomplete: {} probe(s) returned no data ({})",
            degraded.len(),
            degraded.join(", ")
        )));
    }

    let mut body: Vec<Reason> = Vec::with_capacity(rule_reasons.len());
    for reason in rule_reasons {
        if !body.iter().any(|r| r.text == reason.text) {
            body.push(reason);
        }
    }
    body.sort_by_key(|r| r.severity.rank());

    if body.is_empty() {
        reasons.push(Reason::positive("no risk indicators found"));
    }
    reasons.extend(body);
    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{ProbeResult, ResolutionInfo, Severity};

    fn complete_signals() -> SignalSet {
        SignalSet {
            registration: ProbeResult::Ok(crate::signals::RegistrationInfo {
                domain: "example.com".to_string(),
                age_days: Some(3650),
                registrar: None,
                privacy_protected: false,
                estimated: false,
            }),
            certificate: ProbeResult::Ok(crate::signals::CertificateInfo::absent()),
            resolution: ProbeResult::Ok(ResolutionInfo::unresolved()),
            threat_list: ProbeResult::Ok(crate::signals::ThreatListInfo {
                hits: 0,
                listed_on: vec![],
                lists_checked: 8,
                indicators: vec![],
            }),
            hosting: ProbeResult::Ok(crate::signals::HostingInfo {
                provider: "x".to_string(),
                reputation_score: 60,
                bulletproof: false,
                risk_factors: vec![],
            }),
            content: ProbeResult::Ok(crate::signals::ContentInfo::unreachable()),
        }
    }

    #[test]
    fn test_combine_is_rounded_blend() {
        assert_eq!(combine_scores(50.0, 100.0), 70.0);
        assert_eq!(combine_scores(0.0, 0.0), 0.0);
        assert_eq!(combine_scores(100.0, 100.0), 100.0);
        // 33.333*0.6 + 10*0.4 = 24.0 after rounding
        assert_eq!(combine_scores(33.333, 10.0), 24.0);
    }

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(verdict_for(0.0), Verdict::Safe);
        assert_eq!(verdict_for(39.9), Verdict::Safe);
        assert_eq!(verdict_for(40.0), Verdict::Suspicious);
        assert_eq!(verdict_for(69.9), Verdict::Suspicious);
        assert_eq!(verdict_for(70.0), Verdict::LikelyScam);
        assert_eq!(verdict_for(100.0), Verdict::LikelyScam);
    }

    #[test]
    fn test_summary_reason_comes_first() {
        let reasons = assemble_reasons(
            82.5,
            Verdict::LikelyScam,
            0.9,
            &complete_signals(),
            vec![Reason::warning("x")],
        );
        assert!(reasons[0].text.starts_with("overall risk 82.5/100"));
        assert_eq!(reasons[0].severity, Severity::Critical);
    }

    #[test]
    fn test_degraded_probes_surface_as_warning() {
        let mut signals = complete_signals();
        signals.certificate = ProbeResult::Timeout;
        signals.content = ProbeResult::Error("boom".to_string());
        let reasons = assemble_reasons(50.0, Verdict::Suspicious, 0.6, &signals, vec![]);
        assert!(reasons[1].text.contains("2 probe(s)"));
        assert!(reasons[1].text.contains("certificate"));
        assert!(reasons[1].text.contains("content"));
    }

    #[test]
    fn test_reasons_deduplicated_and_severity_ordered() {
        let rule_reasons = vec![
            Reason::positive("valid SSL certificate"),
            Reason::warning("repeated"),
            Reason::critical("listed on 2 blocklist(s): a, b"),
            Reason::warning("repeated"),
        ];
        let reasons = assemble_reasons(
            45.0,
            Verdict::Suspicious,
            1.0,
            &complete_signals(),
            rule_reasons,
        );
        // summary, then critical, warning, positive
        assert_eq!(reasons.len(), 4);
        assert_eq!(reasons[1].severity, Severity::Critical);
        assert_eq!(reasons[2].severity, Severity::Warning);
        assert_eq!(reasons[3].severity, Severity::Positive);
    }

    #[test]
    fn test_fallback_when_nothing_fired() {
        let reasons = assemble_reasons(10.0, Verdict::Safe, 1.0, &complete_signals(), vec![]);
        assert_eq!(reasons.len(), 2);
        assert_eq!(reasons[1].text, "no risk indicators found");
        assert_eq!(reasons[1].severity, Severity::Positive);
    }
}
