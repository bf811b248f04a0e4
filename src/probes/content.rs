use crate::config::{ContentConfig, KeywordLexicon, ProbeTimeouts};
use crate::probes::{Probe, ProbeFailure};
use crate::signals::ContentInfo;
use crate::target::AnalysisTarget;
use regex::Regex;
use std::time::Duration;

/// Fetches the landing page with bounded size and time and scans the
/// visible text against the three keyword tiers. Any fetch failure is the
/// informative `reachable = false` signal, never a probe error.
pub struct ContentProbe<'a> {
    client: reqwest::Client,
    lexicon: &'a KeywordLexicon,
    config: &'a ContentConfig,
    budget: Duration,
}

impl<'a> ContentProbe<'a> {
    pub fn new(
        client: reqwest::Client,
        lexicon: &'a KeywordLexicon,
        config: &'a ContentConfig,
        timeouts: &ProbeTimeouts,
    ) -> Self {
        Self {
            client,
            lexicon,
            config,
            budget: Duration::from_secs(timeouts.content_secs),
        }
    }

    async fn fetch(&self, domain: &str) -> Option<String> {
        for scheme in ["https", "http"] {
            let url = format!("{scheme}://{domain}");
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    let mut body = Vec::new();
                    let mut response = response;
                    while let Ok(Some(chunk)) = response.chunk().await {
                        body.extend_from_slice(&chunk);
                        if body.len() >= self.config.max_bytes {
                            body.truncate(self.config.max_bytes);
                            break;
                        }
                    }
                    return Some(String::from_utf8_lossy(&body).into_owned());
                }
                Ok(response) => {
                    log::debug!("Fetch of {url} returned status {}", response.status());
                }
                Err(e) => {
                    log::debug!("Fetch of {url} failed: {e}");
                }
            }
        }
        None
    }

    /// Pure analysis of fetched HTML; separated from I/O so it can be
    /// exercised directly in tests.
    pub fn analyze_html(
        lexicon: &KeywordLexicon,
        config: &ContentConfig,
        domain: &str,
        html: &str,
    ) -> ContentInfo {
        let text = strip_html(html);

        let cap = config.max_keywords_per_tier;
        let matched = |tier: &[String]| -> Vec<String> {
            tier.iter()
                .filter(|kw| text.contains(kw.as_str()))
                .take(cap)
                .cloned()
                .collect()
        };
        let high_risk_keywords = matched(&lexicon.high_risk);
        let medium_risk_keywords = matched(&lexicon.medium_risk);
        let low_risk_keywords = matched(&lexicon.low_risk);

        let html_lower = html.to_lowercase();
        let has_forms = html_lower.contains("<form");
        let has_password_form = Regex::new(r#"type\s*=\s*["']?password"#)
            .map(|re| re.is_match(&html_lower))
            .unwrap_or(false);
        let urgency = lexicon
            .urgency_terms
            .iter()
            .any(|term| text.contains(term.as_str()));
        let phishing_form = has_password_form && urgency;

        let external_links = count_external_links(&html_lower, domain);

        let mut info = ContentInfo {
            reachable: true,
            scam_score: 0.0,
            high_risk_keywords,
            medium_risk_keywords,
            low_risk_keywords,
            has_forms,
            has_password_form,
            phishing_form,
            text_length: text.len(),
            external_links,
        };
        info.scam_score = content_score(&info);
        info
    }
}

impl Probe for ContentProbe<'_> {
    type Output = ContentInfo;

    fn name(&self) -> &'static str {
        "content"
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn observe(&self, target: &AnalysisTarget) -> Result<ContentInfo, ProbeFailure> {
        match self.fetch(target.as_str()).await {
            Some(html) => {
                let info = Self::analyze_html(self.lexicon, self.config, target.as_str(), &html);
                log::debug!(
                    "Content of {}: score {:.2}, {} high-risk keyword(s)",
                    target.as_str(),
                    info.scam_score,
                    info.high_risk_keywords.len()
                );
                Ok(info)
            }
            None => Ok(ContentInfo::unreachable()),
        }
    }
}

/// Visible lower-cased page text with scripts, styles, and tags removed.
fn strip_html(html: &str) -> String {
    let script = Regex::new(r"(?is)<script.*?</script>").unwrap();
    let style = Regex::new(r"(?is)<style.*?</style>").unwrap();
    let tags = Regex::new(r"(?s)<[^>]*>").unwrap();
    let spaces = Regex::new(r"\s+").unwrap();

    let text = script.replace_all(html, " ");
    let text = style.replace_all(&text, " ");
    let text = tags.replace_all(&text, " ");
    spaces.replace_all(&text, " ").trim().to_lowercase()
}

fn count_external_links(html_lower: &str, domain: &str) -> u32 {
    let href = Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).unwrap();
    href.captures_iter(html_lower)
        .filter_map(|c| c.get(1))
        .filter(|m| {
            let target = m.as_str();
            match url::Url::parse(target) {
                Ok(url) => url
                    .host_str()
                    .map(|host| !host.contains(domain))
                    .unwrap_or(false),
                Err(_) => false,
            }
        })
        .count() as u32
}

/// 0-1 content scam score. Tier contributions are individually capped so
/// no single tier saturates the score on its own.
fn content_score(info: &ContentInfo) -> f64 {
    let mut score = 0.0;

    score += (info.high_risk_keywords.len() as f64 * 0.15).min(0.6);
    score += (info.medium_risk_keywords.len() as f64 * 0.05).min(0.2);
    score += (info.low_risk_keywords.len() as f64 * 0.10).min(0.3);

    let keyword_hits = info.high_risk_keywords.len() + info.medium_risk_keywords.len();
    if info.has_forms && keyword_hits > 0 {
        score += 0.2;
    }
    // Near-empty pages are typically parking or bait pages
    if info.text_length > 0 && info.text_length < 200 {
        score += 0.1;
    }
    if info.external_links > 50 {
        score += 0.1;
    }

    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContentConfig, KeywordLexicon};

    fn analyze(html: &str) -> ContentInfo {
        ContentProbe::analyze_html(
            &KeywordLexicon::default(),
            &ContentConfig::default(),
            "example.com",
            html,
        )
    }

    #[test]
    fn test_strip_html_removes_script_and_tags() {
        let html = "<html><script>alert('x')</script><body><h1>Hello World</h1></body></html>";
        assert_eq!(strip_html(html), "hello world");
    }

    #[test]
    fn test_clean_page_scores_low() {
        let html = format!(
            "<html><body><p>Welcome to our company site. {}</p></body></html>",
            "We publish open source software and documentation. ".repeat(10)
        );
        let info = analyze(&html);
        assert!(info.reachable);
        assert!(info.high_risk_keywords.is_empty());
        assert!(info.scam_score < 0.1);
    }

    #[test]
    fn test_scam_page_scores_high() {
        let html = "<html><body>\
            Congratulations you won! Claim your prize now. \
            Verify your account immediately or your account will be closed. \
            This is a limited time offer with guaranteed returns. \
            <form><input type=\"password\" name=\"pw\"></form>\
            </body></html>";
        let info = analyze(html);
        assert!(info.high_risk_keywords.len() >= 3);
        assert!(info.has_forms);
        assert!(info.has_password_form);
        assert!(info.phishing_form);
        assert!(info.scam_score > 0.7);
    }

    #[test]
    fn test_password_form_without_urgency_is_not_phishing() {
        let html = format!(
            "<html><body><p>Members area. {}</p>\
            <form><input type='password'></form></body></html>",
            "Read our quarterly engineering updates and long form articles. ".repeat(5)
        );
        let info = analyze(&html);
        assert!(info.has_password_form);
        assert!(!info.phishing_form);
    }

    #[test]
    fn test_keyword_tiers_are_bounded() {
        let lexicon = KeywordLexicon::default();
        let all_keywords = lexicon.high_risk.join(". ");
        let html = format!("<html><body>{all_keywords}</body></html>");
        let info = analyze(&html);
        assert!(info.high_risk_keywords.len() <= ContentConfig::default().max_keywords_per_tier);
        assert!(info.scam_score <= 1.0);
    }

    #[test]
    fn test_parking_page_penalty() {
        let html = "<html><body>domain for sale</body></html>";
        let info = analyze(html);
        assert!(info.text_length < 200);
        assert!(info.scam_score >= 0.1);
    }

    #[test]
    fn test_external_link_counting() {
        let html = r#"<a href="https://other.net/x">x</a>
                      <a href="https://example.com/about">about</a>
                      <a href="/local">local</a>"#;
        assert_eq!(count_external_links(&html.to_lowercase(), "example.com"), 1);
    }

    #[test]
    fn test_unreachable_is_neutral() {
        let info = ContentInfo::unreachable();
        assert!(!info.reachable);
        assert_eq!(info.scam_score, 0.5);
    }
}
