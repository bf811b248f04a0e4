use crate::config::ProbeTimeouts;
use crate::probes::{Probe, ProbeFailure};
use crate::signals::RegistrationInfo;
use crate::target::AnalysisTarget;
use anyhow::{anyhow, Result};
use regex::Regex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Resolves domain creation date, registrar, and privacy protection via
/// WHOIS on TCP port 43. A failed or unparseable query falls back to a
/// deterministic heuristic estimate rather than failing the probe.
pub struct RegistrationProbe {
    budget: Duration,
    query_timeout: Duration,
}

impl RegistrationProbe {
    pub fn new(timeouts: &ProbeTimeouts) -> Self {
        Self {
            budget: Duration::from_secs(timeouts.registration_secs),
            query_timeout: Duration::from_secs(timeouts.whois_query_secs),
        }
    }

    /// Registry WHOIS server for a TLD; IANA for anything unlisted.
    fn whois_server(tld: &str) -> &'static str {
        match tld {
            "com" | "net" => "whois.verisign-grs.com",
            "org" => "whois.pir.org",
            "info" => "whois.afilias.net",
            "io" => "whois.nic.io",
            "co" => "whois.nic.co",
            "us" => "whois.nic.us",
            "uk" => "whois.nic.uk",
            "de" => "whois.denic.de",
            "fr" => "whois.afnic.fr",
            "nl" => "whois.domain-registry.nl",
            "au" => "whois.auda.org.au",
            "ca" => "whois.cira.ca",
            "jp" => "whois.jprs.jp",
            "br" => "whois.registro.br",
            "tk" => "whois.dot.tk",
            "ml" => "whois.dot.ml",
            "ga" => "whois.dot.ga",
            "cf" => "whois.dot.cf",
            _ => "whois.iana.org",
        }
    }

    async fn query_whois(&self, server: &str, domain: &str) -> Result<String> {
        log::debug!("Connecting to WHOIS server {server}:43 for {domain}");

        let mut stream =
            timeout(self.query_timeout, TcpStream::connect(format!("{server}:43"))).await??;

        let query = format!("{domain}\r\n");
        stream.write_all(query.as_bytes()).await?;

        let mut response = String::new();
        timeout(self.query_timeout, stream.read_to_string(&mut response)).await??;

        if response.is_empty() {
            return Err(anyhow!("empty WHOIS response"));
        }
        Ok(response)
    }

    /// Extract creation date, registrar, and privacy flags from WHOIS text.
    pub fn parse_whois(text: &str, domain: &str) -> Result<RegistrationInfo> {
        let creation_patterns = [
            r"(?i)creation\s*date[:\s]+([^\r\n]+)",
            r"(?i)created[:\s]+([^\r\n]+)",
            r"(?i)registered\s*on[:\s]+([^\r\n]+)",
            r"(?i)registered[:\s]+([^\r\n]+)",
            r"(?i)registration\s*time[:\s]+([^\r\n]+)",
            r"(?i)domain\s*created[:\s]+([^\r\n]+)",
        ];

        let mut age_days = None;
        for pattern in creation_patterns {
            if let Some(captures) = Regex::new(pattern)
                .ok()
                .and_then(|re| re.captures(text))
            {
                if let Some(date_match) = captures.get(1) {
                    let date_str = date_match.as_str().trim();
                    if let Ok(created) = parse_date(date_str) {
                        age_days = Some(age_in_days(created));
                        log::debug!("Parsed creation date for {domain}: {date_str}");
                        break;
                    }
                }
            }
        }

        let registrar = Regex::new(r"(?i)registrar:\s*([^\r\n]+)")
            .ok()
            .and_then(|re| re.captures(text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty());

        let lower = text.to_lowercase();
        let privacy_protected = ["privacy", "proxy", "redacted", "protected"]
            .iter()
            .any(|kw| lower.contains(kw));

        if age_days.is_none() && registrar.is_none() {
            return Err(anyhow!("no usable fields in WHOIS response"));
        }

        Ok(RegistrationInfo {
            domain: domain.to_string(),
            age_days,
            registrar,
            privacy_protected,
            estimated: false,
        })
    }

    /// Secondary heuristic used when the WHOIS protocol path fails. Age is
    /// estimated from lexical traits of the domain string; the bias is
    /// toward younger (riskier) for suspicious-looking names.
    pub fn estimate(target: &AnalysisTarget) -> RegistrationInfo {
        let root = target.registrable_domain();
        let label = root.split('.').next().unwrap_or(&root);
        let tld = target.tld();

        let young_tlds = ["xyz", "top", "club", "online", "site", "tech", "tk", "ml"];
        let age_days = if young_tlds.contains(&tld) || label.len() > 20 {
            15
        } else if label.chars().any(|c| c.is_ascii_digit()) && label.len() > 12 {
            45
        } else {
            800
        };

        RegistrationInfo {
            domain: root,
            age_days: Some(age_days),
            registrar: None,
            privacy_protected: false,
            estimated: true,
        }
    }
}

impl Probe for RegistrationProbe {
    type Output = RegistrationInfo;

    fn name(&self) -> &'static str {
        "registration"
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn observe(&self, target: &AnalysisTarget) -> Result<RegistrationInfo, ProbeFailure> {
        let root = target.registrable_domain();
        let server = Self::whois_server(target.tld());

        match self.query_whois(server, &root).await {
            Ok(text) => match Self::parse_whois(&text, &root) {
                Ok(info) => Ok(info),
                Err(e) => {
                    log::debug!("WHOIS parse failed for {root}: {e}; using heuristic estimate");
                    Ok(Self::estimate(target))
                }
            },
            Err(e) => {
                log::debug!("WHOIS query failed for {root}: {e}; using heuristic estimate");
                Ok(Self::estimate(target))
            }
        }
    }
}

fn parse_date(date_str: &str) -> Result<SystemTime> {
    // Date strings occasionally carry a trailing comment in parentheses
    let date_str = date_str.split('(').next().unwrap_or(date_str).trim();

    let iso = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
    if let Some(captures) = iso.captures(date_str) {
        let year: u32 = captures[1].parse()?;
        let month: u32 = captures[2].parse()?;
        let day: u32 = captures[3].parse()?;
        return epoch_time(year, month, day);
    }

    // dd.mm.yyyy and dd/mm/yyyy registry formats
    let dmy = Regex::new(r"(\d{2})[./](\d{2})[./](\d{4})").unwrap();
    if let Some(captures) = dmy.captures(date_str) {
        let day: u32 = captures[1].parse()?;
        let month: u32 = captures[2].parse()?;
        let year: u32 = captures[3].parse()?;
        return epoch_time(year, month, day);
    }

    Err(anyhow!("unsupported date format: {date_str}"))
}

fn epoch_time(year: u32, month: u32, day: u32) -> Result<SystemTime> {
    if year < 1970 || month == 0 || month > 12 || day == 0 || day > 31 {
        return Err(anyhow!("invalid date"));
    }

    // Approximate conversion; day-level precision is enough for age checks
    let years_since_1970 = (year - 1970) as u64;
    let mut days = years_since_1970 * 365 + years_since_1970 / 4;

    let days_in_month = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    for m in 1..month {
        days += days_in_month[(m - 1) as usize] as u64;
    }
    days += day as u64 - 1;

    Ok(UNIX_EPOCH + Duration::from_secs(days * 24 * 60 * 60))
}

fn age_in_days(created: SystemTime) -> u32 {
    let age_secs = SystemTime::now()
        .duration_since(created)
        .unwrap_or(Duration::from_secs(0))
        .as_secs();
    (age_secs / (24 * 60 * 60)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whois_standard_format() {
        let text = "Domain Name: EXAMPLE.COM\n\
                    Registrar: Example Registrar, LLC\n\
                    Creation Date: 2015-03-10T04:00:00Z\n\
                    Registry Expiry Date: 2026-03-10T04:00:00Z\n";
        let info = RegistrationProbe::parse_whois(text, "example.com").unwrap();
        assert_eq!(info.registrar.as_deref(), Some("Example Registrar, LLC"));
        assert!(info.age_days.unwrap() > 3000);
        assert!(!info.estimated);
    }

    #[test]
    fn test_parse_whois_privacy_flag() {
        let text = "Registrar: Privacy Shield Registrations\n\
                    Created: 2024-01-01\n\
                    Registrant Name: REDACTED FOR PRIVACY\n";
        let info = RegistrationProbe::parse_whois(text, "hidden.net").unwrap();
        assert!(info.privacy_protected);
    }

    #[test]
    fn test_parse_whois_registrar_only() {
        let text = "Registrar: Some Registrar\nStatus: active\n";
        let info = RegistrationProbe::parse_whois(text, "odd.org").unwrap();
        assert_eq!(info.age_days, None);
        assert_eq!(info.registrar.as_deref(), Some("Some Registrar"));
    }

    #[test]
    fn test_parse_whois_rejects_junk() {
        assert!(RegistrationProbe::parse_whois("no match for domain", "x.com").is_err());
    }

    #[test]
    fn test_parse_dotted_date() {
        let text = "Created: 10.03.2015\n";
        let info = RegistrationProbe::parse_whois(text, "example.de").unwrap();
        assert!(info.age_days.unwrap() > 3000);
    }

    #[test]
    fn test_estimate_buckets() {
        let young = AnalysisTarget::parse("prize-claim.xyz").unwrap();
        assert_eq!(RegistrationProbe::estimate(&young).age_days, Some(15));

        let numbered = AnalysisTarget::parse("cheap4deals4you2.com").unwrap();
        assert_eq!(RegistrationProbe::estimate(&numbered).age_days, Some(45));

        let plain = AnalysisTarget::parse("example.com").unwrap();
        assert_eq!(RegistrationProbe::estimate(&plain).age_days, Some(800));

        assert!(RegistrationProbe::estimate(&plain).estimated);
    }
}
