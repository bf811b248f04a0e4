use crate::config::RuleThresholds;
use crate::signals::{ProbeResult, Reason, SignalSet};

/// Result of the threshold rule pass: accumulated points capped at the
/// configured maximum, plus one human-readable reason per fired rule.
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub score: f64,
    pub reasons: Vec<Reason>,
}

/// Evaluates the fixed rule set over the raw probe payloads. Failed probes
/// are scored on their cautious interpretation (unknown age, no SSL,
/// unresolved) rather than skipped, so missing data never reads as safe.
pub fn evaluate_rules(rules: &RuleThresholds, signals: &SignalSet) -> RuleOutcome {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    score += score_registration(rules, signals, &mut reasons);
    score += score_certificate(rules, signals, &mut reasons);
    score += score_resolution(rules, signals, &mut reasons);
    score += score_threat_list(rules, signals, &mut reasons);
    score += score_hosting(rules, signals, &mut reasons);
    score += score_content(rules, signals, &mut reasons);

    RuleOutcome {
        score: score.min(rules.max_score),
        reasons,
    }
}

fn score_registration(
    rules: &RuleThresholds,
    signals: &SignalSet,
    reasons: &mut Vec<Reason>,
) -> f64 {
    let age_days = match &signals.registration {
        ProbeResult::Ok(reg) => reg.age_days,
        _ => None,
    };
    match age_days {
        Some(days) if days < rules.age_critical_days => {
            reasons.push(Reason::critical(format!(
                "domain registered only {days} day(s) ago"
            )));
            rules.age_critical_points
        }
        Some(days) if days <= rules.age_high_days => {
            reasons.push(Reason::warning(format!(
                "domain registered {days} day(s) ago"
            )));
            rules.age_high_points
        }
        Some(days) if days <= rules.age_medium_days => {
            reasons.push(Reason::warning(format!(
                "domain is less than three months old ({days} days)"
            )));
            rules.age_medium_points
        }
        Some(days) if days <= rules.age_low_days => {
            reasons.push(Reason::warning(format!(
                "domain is less than six months old ({days} days)"
            )));
            rules.age_low_points
        }
        Some(days) => {
            if days > rules.age_established_days {
                reasons.push(Reason::positive(format!(
                    "domain established for {} year(s)",
                    days / 365
                )));
            }
            0.0
        }
        None => {
            reasons.push(Reason::critical(
                "domain registration age could not be determined",
            ));
            rules.age_critical_points
        }
    }
}

fn score_certificate(
    rules: &RuleThresholds,
    signals: &SignalSet,
    reasons: &mut Vec<Reason>,
) -> f64 {
    let cert = match &signals.certificate {
        ProbeResult::Ok(cert) => cert,
        _ => {
            reasons.push(Reason::critical("no SSL certificate detected"));
            return rules.no_ssl_points;
        }
    };
    if !cert.has_ssl {
        reasons.push(Reason::critical("no SSL certificate detected"));
        return rules.no_ssl_points;
    }
    if !cert.valid {
        reasons.push(Reason::warning("SSL certificate is invalid or expired"));
        return rules.invalid_ssl_points;
    }
    if let Some(days) = cert.days_until_expiry {
        if days < rules.expiring_ssl_days {
            reasons.push(Reason::warning(format!(
                "SSL certificate expires in {days} day(s)"
            )));
            return rules.expiring_ssl_points;
        }
    }
    reasons.push(Reason::positive("valid SSL certificate"));
    0.0
}

fn score_resolution(
    rules: &RuleThresholds,
    signals: &SignalSet,
    reasons: &mut Vec<Reason>,
) -> f64 {
    let resolved = match &signals.resolution {
        ProbeResult::Ok(res) => res.resolved,
        _ => false,
    };
    if resolved {
        0.0
    } else {
        reasons.push(Reason::critical("domain does not resolve to any address"));
        rules.no_resolution_points
    }
}

fn score_threat_list(
    rules: &RuleThresholds,
    signals: &SignalSet,
    reasons: &mut Vec<Reason>,
) -> f64 {
    let threat = match &signals.threat_list {
        ProbeResult::Ok(threat) => threat,
        // No penalty: list state is genuinely unknown and the cautious
        // feature default already accounts for it.
        _ => return 0.0,
    };

    let mut score = 0.0;

    if threat.hits > 0 {
        score += (threat.hits as f64 * rules.blacklist_per_hit_points).min(rules.blacklist_cap);
        reasons.push(Reason::critical(format!(
            "listed on {} blocklist(s): {}",
            threat.hits,
            threat.listed_on.join(", ")
        )));
    } else if threat.lists_checked > 0 {
        reasons.push(Reason::positive(format!(
            "not listed on any of {} blocklist(s)",
            threat.lists_checked
        )));
    }

    for indicator in &threat.indicators {
        use crate::signals::LexicalIndicator::*;
        let (points, reason) = match indicator {
            ScamKeyword => (
                rules.scam_keyword_points,
                Reason::critical(indicator.describe()),
            ),
            Homograph => (
                rules.homograph_points,
                Reason::critical(indicator.describe()),
            ),
            SuspiciousTld => (
                rules.suspicious_tld_points,
                Reason::warning(indicator.describe()),
            ),
            ManyDigits => (
                rules.many_digits_points,
                Reason::warning(indicator.describe()),
            ),
            ManyHyphens => (
                rules.many_hyphens_points,
                Reason::warning(indicator.describe()),
            ),
            LongName => (
                rules.long_name_points,
                Reason::warning(indicator.describe()),
            ),
        };
        score += points;
        reasons.push(reason);
    }

    score
}

fn score_hosting(rules: &RuleThresholds, signals: &SignalSet, reasons: &mut Vec<Reason>) -> f64 {
    let hosting = match &signals.hosting {
        ProbeResult::Ok(hosting) => hosting,
        _ => {
            reasons.push(Reason::warning("hosting provider could not be determined"));
            return rules.hosting_unknown_points;
        }
    };

    if hosting.bulletproof || hosting.reputation_score < rules.bulletproof_score_below {
        reasons.push(Reason::critical(format!(
            "hosted on low-reputation infrastructure ({})",
            hosting.provider
        )));
        rules.bulletproof_points
    } else if hosting.reputation_score < rules.low_reputation_score_below {
        reasons.push(Reason::warning(format!(
            "hosting provider has below-average reputation ({})",
            hosting.provider
        )));
        rules.low_reputation_points
    } else if hosting.reputation_score > rules.reputable_score_above {
        reasons.push(Reason::positive(format!(
            "hosted by a reputable provider ({})",
            hosting.provider
        )));
        0.0
    } else {
        0.0
    }
}

fn score_content(rules: &RuleThresholds, signals: &SignalSet, reasons: &mut Vec<Reason>) -> f64 {
    let content = match &signals.content {
        ProbeResult::Ok(content) => content,
        _ => {
            reasons.push(Reason::warning("site content could not be inspected"));
            return rules.unreachable_points;
        }
    };

    if !content.reachable {
        reasons.push(Reason::warning("site is unreachable over HTTP and HTTPS"));
        return rules.unreachable_points;
    }

    let mut score = 0.0;

    if !content.high_risk_keywords.is_empty() {
        score += (content.high_risk_keywords.len() as f64 * rules.high_keyword_points)
            .min(rules.high_keyword_cap);
        reasons.push(Reason::critical(format!(
            "page contains high-risk scam language: {}",
            content.high_risk_keywords.join(", ")
        )));
    }
    if content.medium_risk_keywords.len() > rules.medium_keyword_threshold {
        score += rules.medium_keyword_points;
        reasons.push(Reason::warning(
            "page contains multiple pressure-sales phrases",
        ));
    }
    if content.low_risk_keywords.len() >= rules.low_keyword_threshold {
        score += rules.low_keyword_points;
        reasons.push(Reason::warning("page contains promotional bait phrases"));
    }
    if content.phishing_form {
        score += rules.phishing_form_points;
        reasons.push(Reason::critical(
            "password form paired with urgency language",
        ));
    }

    score
}
