use crate::config::ProbeTimeouts;
use crate::probes::{Probe, ProbeFailure};
use crate::signals::CertificateInfo;
use crate::target::AnalysisTarget;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use x509_parser::prelude::*;

/// Opens a TLS connection on port 443 and inspects the presented
/// certificate. Absence of a certificate is a valid signal, not a probe
/// failure: every connection-level error settles as `has_ssl = false`.
pub struct CertificateProbe {
    budget: Duration,
    connector: TlsConnector,
}

impl CertificateProbe {
    pub fn new(timeouts: &ProbeTimeouts) -> Self {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();

        Self {
            budget: Duration::from_secs(timeouts.certificate_secs),
            connector: TlsConnector::from(Arc::new(config)),
        }
    }

    async fn handshake(&self, domain: &str) -> Result<CertificateInfo, ProbeFailure> {
        let server_name = match ServerName::try_from(domain.to_string()) {
            Ok(name) => name,
            Err(e) => return Err(ProbeFailure::Parse(format!("bad server name: {e}"))),
        };

        let tcp = match TcpStream::connect((domain, 443)).await {
            Ok(stream) => stream,
            Err(e) => {
                log::debug!("TCP connect to {domain}:443 failed: {e}");
                return Ok(CertificateInfo::absent());
            }
        };

        match self.connector.connect(server_name, tcp).await {
            Ok(tls) => {
                let (_, session) = tls.get_ref();
                let info = session
                    .peer_certificates()
                    .and_then(|certs| certs.first())
                    .map(|leaf| describe_leaf(leaf.as_ref()))
                    .unwrap_or(CertificateInfo {
                        has_ssl: true,
                        valid: true,
                        issuer: None,
                        days_until_expiry: None,
                    });
                Ok(info)
            }
            Err(e) => {
                // TCP succeeded but the handshake did not: a certificate is
                // being served, it just fails validation.
                log::debug!("TLS handshake with {domain} failed: {e}");
                Ok(CertificateInfo {
                    has_ssl: true,
                    valid: false,
                    issuer: None,
                    days_until_expiry: None,
                })
            }
        }
    }
}

impl Probe for CertificateProbe {
    type Output = CertificateInfo;

    fn name(&self) -> &'static str {
        "certificate"
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn observe(&self, target: &AnalysisTarget) -> Result<CertificateInfo, ProbeFailure> {
        // Handshake timeout maps to "no certificate observed", the same
        // informative signal as a refused connection.
        match timeout(self.budget, self.handshake(target.as_str())).await {
            Ok(result) => result,
            Err(_) => Ok(CertificateInfo::absent()),
        }
    }
}

/// Issuer and remaining validity window of the leaf certificate. The chain
/// was already validated by the handshake.
fn describe_leaf(der: &[u8]) -> CertificateInfo {
    match X509Certificate::from_der(der) {
        Ok((_, cert)) => {
            let issuer = cert
                .issuer()
                .iter_organization()
                .next()
                .or_else(|| cert.issuer().iter_common_name().next())
                .and_then(|attr| attr.as_str().ok())
                .map(|s| s.to_string());

            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::from_secs(0))
                .as_secs() as i64;
            let not_after = cert.validity().not_after.timestamp();
            let days_until_expiry = (not_after - now) / 86_400;

            CertificateInfo {
                has_ssl: true,
                valid: days_until_expiry >= 0,
                issuer,
                days_until_expiry: Some(days_until_expiry),
            }
        }
        Err(e) => {
            log::debug!("Leaf certificate parse failed: {e}");
            CertificateInfo {
                has_ssl: true,
                valid: true,
                issuer: None,
                days_until_expiry: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_certificate_is_informative() {
        let info = CertificateInfo::absent();
        assert!(!info.has_ssl);
        assert!(!info.valid);
        assert_eq!(info.days_until_expiry, None);
    }

    #[tokio::test]
    async fn test_unreachable_host_settles_ok() {
        // Reserved TLD, never resolves; connect fails fast and the probe
        // must report "no certificate" rather than an error.
        let probe = CertificateProbe::new(&crate::config::ProbeTimeouts {
            certificate_secs: 2,
            ..Default::default()
        });
        let target = AnalysisTarget::parse("no-such-host.invalid").unwrap();
        let info = probe.observe(&target).await.unwrap();
        assert!(!info.has_ssl);
    }
}
