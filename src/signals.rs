use serde::Serialize;
use std::net::IpAddr;

/// Tagged outcome for one signal category. Failure variants are data,
/// not errors: the pipeline downstream of the collector never sees a
/// missing signal, only a degraded one.
#[derive(Debug, Clone, Serialize)]
pub enum ProbeResult<T> {
    Ok(T),
    Timeout,
    Error(String),
    Unavailable,
}

impl<T> ProbeResult<T> {
    pub fn as_ok(&self) -> Option<&T> {
        match self {
            ProbeResult::Ok(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ProbeResult::Ok(_))
    }
}

/// Registration/age signal from WHOIS. `estimated` marks the fallback
/// heuristic path taken when the protocol query failed or was unparseable.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationInfo {
    pub domain: String,
    pub age_days: Option<u32>,
    pub registrar: Option<String>,
    pub privacy_protected: bool,
    pub estimated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateInfo {
    pub has_ssl: bool,
    pub valid: bool,
    pub issuer: Option<String>,
    pub days_until_expiry: Option<i64>,
}

impl CertificateInfo {
    pub fn absent() -> Self {
        Self {
            has_ssl: false,
            valid: false,
            issuer: None,
            days_until_expiry: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionInfo {
    pub resolved: bool,
    pub addresses: Vec<IpAddr>,
    pub reverse_hostname: Option<String>,
}

impl ResolutionInfo {
    pub fn unresolved() -> Self {
        Self {
            resolved: false,
            addresses: Vec::new(),
            reverse_hostname: None,
        }
    }
}

/// Lexical scam patterns detected on the domain string itself. Closed set;
/// each maps to one rule-engine reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LexicalIndicator {
    ScamKeyword,
    SuspiciousTld,
    Homograph,
    ManyDigits,
    ManyHyphens,
    LongName,
}

impl LexicalIndicator {
    pub fn describe(&self) -> &'static str {
        match self {
            LexicalIndicator::ScamKeyword => "domain name contains scam-related keywords",
            LexicalIndicator::SuspiciousTld => "domain uses a commonly abused TLD",
            LexicalIndicator::Homograph => {
                "domain contains non-ASCII characters (possible homograph attack)"
            }
            LexicalIndicator::ManyDigits => "domain name contains an unusual number of digits",
            LexicalIndicator::ManyHyphens => "domain name contains an unusual number of hyphens",
            LexicalIndicator::LongName => "domain name is unusually long",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreatListInfo {
    pub hits: u32,
    pub listed_on: Vec<String>,
    pub lists_checked: u32,
    pub indicators: Vec<LexicalIndicator>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostingInfo {
    pub provider: String,
    pub reputation_score: u8,
    pub bulletproof: bool,
    pub risk_factors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContentInfo {
    pub reachable: bool,
    pub scam_score: f64,
    pub high_risk_keywords: Vec<String>,
    pub medium_risk_keywords: Vec<String>,
    pub low_risk_keywords: Vec<String>,
    pub has_forms: bool,
    pub has_password_form: bool,
    pub phishing_form: bool,
    pub text_length: usize,
    pub external_links: u32,
}

impl ContentInfo {
    /// Fetch failure is itself an informative signal, scored neutral.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            scam_score: 0.5,
            high_risk_keywords: Vec::new(),
            medium_risk_keywords: Vec::new(),
            low_risk_keywords: Vec::new(),
            has_forms: false,
            has_password_form: false,
            phishing_form: false,
            text_length: 0,
            external_links: 0,
        }
    }
}

/// All six probe outcomes for one analysis. Always structurally complete;
/// individual members may carry failure variants.
#[derive(Debug, Clone, Serialize)]
pub struct SignalSet {
    pub registration: ProbeResult<RegistrationInfo>,
    pub certificate: ProbeResult<CertificateInfo>,
    pub resolution: ProbeResult<ResolutionInfo>,
    pub threat_list: ProbeResult<ThreatListInfo>,
    pub hosting: ProbeResult<HostingInfo>,
    pub content: ProbeResult<ContentInfo>,
}

impl SignalSet {
    /// Names of probes that did not settle with a payload.
    pub fn degraded_probes(&self) -> Vec<&'static str> {
        let mut degraded = Vec::new();
        if !self.registration.is_ok() {
            degraded.push("registration");
        }
        if !self.certificate.is_ok() {
            degraded.push("certificate");
        }
        if !self.resolution.is_ok() {
            degraded.push("resolution");
        }
        if !self.threat_list.is_ok() {
            degraded.push("threat-list");
        }
        if !self.hosting.is_ok() {
            degraded.push("hosting");
        }
        if !self.content.is_ok() {
            degraded.push("content");
        }
        degraded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Critical,
    Warning,
    Positive,
}

impl Severity {
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Positive => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reason {
    pub severity: Severity,
    pub text: String,
}

impl Reason {
    pub fn critical(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Critical,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    pub fn positive(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Positive,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Safe,
    Suspicious,
    LikelyScam,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Verdict::Safe => "SAFE",
            Verdict::Suspicious => "SUSPICIOUS",
            Verdict::LikelyScam => "LIKELY_SCAM",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponents {
    pub ml_score: f64,
    pub rule_score: f64,
    pub confidence: f64,
}

/// Aggregate result of one analysis. Created once per request, immutable,
/// serialized at the boundary and then discarded.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub domain: String,
    pub final_score: f64,
    pub verdict: Verdict,
    pub confidence: f64,
    pub reasons: Vec<Reason>,
    pub components: ScoreComponents,
    pub signals: SignalSet,
}
