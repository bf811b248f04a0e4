use crate::config::{KeywordLexicon, ProbeTimeouts, ThreatListConfig};
use crate::probes::{Probe, ProbeFailure};
use crate::signals::{LexicalIndicator, ThreatListInfo};
use crate::target::AnalysisTarget;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;

/// Queries the configured DNS blocklists in parallel and counts
/// affirmative listings. Each list lookup has its own short timeout; an
/// unreachable list reduces the denominator, never the whole probe. The
/// lexical pattern heuristic over the domain string always runs, so a
/// signal is produced even when every list is unreachable.
pub struct ThreatListProbe<'a> {
    resolver: TokioAsyncResolver,
    lists: &'a ThreatListConfig,
    lexicon: &'a KeywordLexicon,
    budget: Duration,
    per_query: Duration,
}

enum ListOutcome {
    Listed(String),
    Clear,
    Inconclusive,
}

impl<'a> ThreatListProbe<'a> {
    pub fn new(
        resolver: &TokioAsyncResolver,
        lists: &'a ThreatListConfig,
        lexicon: &'a KeywordLexicon,
        timeouts: &ProbeTimeouts,
    ) -> Self {
        Self {
            resolver: resolver.clone(),
            lists,
            lexicon,
            budget: Duration::from_secs(timeouts.threat_list_secs),
            per_query: Duration::from_secs(timeouts.threat_list_query_secs),
        }
    }

    /// Static pattern heuristic over the domain string itself.
    pub fn lexical_indicators(
        target: &AnalysisTarget,
        lexicon: &KeywordLexicon,
    ) -> Vec<LexicalIndicator> {
        let name = target.as_str();
        let mut indicators = Vec::new();

        if lexicon
            .domain_scam_keywords
            .iter()
            .any(|kw| name.contains(kw.as_str()))
        {
            indicators.push(LexicalIndicator::ScamKeyword);
        }
        if lexicon.suspicious_tlds.iter().any(|t| target.tld() == t) {
            indicators.push(LexicalIndicator::SuspiciousTld);
        }
        if !name.is_ascii() || name.split('.').any(|label| label.starts_with("xn--")) {
            indicators.push(LexicalIndicator::Homograph);
        }
        if name.chars().filter(|c| c.is_ascii_digit()).count() > 5 {
            indicators.push(LexicalIndicator::ManyDigits);
        }
        if name.matches('-').count() > 3 {
            indicators.push(LexicalIndicator::ManyHyphens);
        }
        if name.len() > 30 {
            indicators.push(LexicalIndicator::LongName);
        }

        indicators
    }

    async fn query_list(
        resolver: TokioAsyncResolver,
        query: String,
        zone: String,
        per_query: Duration,
    ) -> ListOutcome {
        match timeout(per_query, resolver.lookup_ip(query.as_str())).await {
            // Any answer (conventionally 127.0.0.x) means listed
            Ok(Ok(_)) => ListOutcome::Listed(zone),
            Ok(Err(e)) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => ListOutcome::Clear,
                _ => {
                    log::debug!("Blocklist {zone} lookup failed: {e}");
                    ListOutcome::Inconclusive
                }
            },
            Err(_) => {
                log::debug!("Blocklist {zone} lookup timed out");
                ListOutcome::Inconclusive
            }
        }
    }
}

impl Probe for ThreatListProbe<'_> {
    type Output = ThreatListInfo;

    fn name(&self) -> &'static str {
        "threat-list"
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn observe(&self, target: &AnalysisTarget) -> Result<ThreatListInfo, ProbeFailure> {
        let indicators = Self::lexical_indicators(target, self.lexicon);
        let domain = target.as_str().to_string();

        // IP blocklists need an A record; when the domain does not resolve
        // those lists are skipped and the denominator shrinks.
        let ipv4 = match timeout(self.per_query, self.resolver.lookup_ip(domain.as_str())).await {
            Ok(Ok(lookup)) => lookup.iter().find_map(|ip| match ip {
                IpAddr::V4(v4) => Some(v4),
                IpAddr::V6(_) => None,
            }),
            _ => None,
        };

        let mut lookups = JoinSet::new();
        for zone in &self.lists.domain_zones {
            let query = format!("{domain}.{zone}");
            lookups.spawn(ThreatListProbe::query_list(
                self.resolver.clone(),
                query,
                zone.clone(),
                self.per_query,
            ));
        }
        if let Some(v4) = ipv4 {
            let octets = v4.octets();
            let reversed = format!("{}.{}.{}.{}", octets[3], octets[2], octets[1], octets[0]);
            for zone in &self.lists.ip_zones {
                let query = format!("{reversed}.{zone}");
                lookups.spawn(ThreatListProbe::query_list(
                    self.resolver.clone(),
                    query,
                    zone.clone(),
                    self.per_query,
                ));
            }
        }

        let mut listed_on = Vec::new();
        let mut lists_checked = 0u32;
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok(ListOutcome::Listed(zone)) => {
                    lists_checked += 1;
                    listed_on.push(zone);
                }
                Ok(ListOutcome::Clear) => lists_checked += 1,
                Ok(ListOutcome::Inconclusive) | Err(_) => {}
            }
        }
        listed_on.sort();

        log::debug!(
            "Threat lists for {domain}: {}/{} hit(s), {} indicator(s)",
            listed_on.len(),
            lists_checked,
            indicators.len()
        );

        Ok(ThreatListInfo {
            hits: listed_on.len() as u32,
            listed_on,
            lists_checked,
            indicators,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordLexicon;

    fn indicators_for(domain: &str) -> Vec<LexicalIndicator> {
        let target = AnalysisTarget::parse(domain).unwrap();
        ThreatListProbe::lexical_indicators(&target, &KeywordLexicon::default())
    }

    #[test]
    fn test_clean_domain_has_no_indicators() {
        assert!(indicators_for("example.com").is_empty());
    }

    #[test]
    fn test_scam_keyword_in_name() {
        let found = indicators_for("paypal.verify-account.com");
        assert!(found.contains(&LexicalIndicator::ScamKeyword));
    }

    #[test]
    fn test_suspicious_tld() {
        let found = indicators_for("freestuff.tk");
        assert!(found.contains(&LexicalIndicator::SuspiciousTld));
    }

    #[test]
    fn test_digit_and_hyphen_stuffing() {
        let found = indicators_for("win-big-cash-now-123456.com");
        assert!(found.contains(&LexicalIndicator::ManyDigits));
        assert!(found.contains(&LexicalIndicator::ManyHyphens));
        assert!(found.contains(&LexicalIndicator::LongName));
    }
}
