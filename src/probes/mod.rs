pub mod certificate;
pub mod content;
pub mod hosting;
pub mod registration;
pub mod resolution;
pub mod threat_list;

pub use certificate::CertificateProbe;
pub use content::ContentProbe;
pub use hosting::HostingProbe;
pub use registration::RegistrationProbe;
pub use resolution::ResolutionProbe;
pub use threat_list::ThreatListProbe;

use crate::target::AnalysisTarget;
use std::fmt;
use std::time::Duration;

/// Failure taxonomy for a single probe. Always recovered by the collector
/// into a `ProbeResult` variant, never surfaced to the caller.
#[derive(Debug, Clone)]
pub enum ProbeFailure {
    Timeout,
    Connection(String),
    Parse(String),
    Unavailable,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeFailure::Timeout => write!(f, "timed out"),
            ProbeFailure::Connection(e) => write!(f, "connection failed: {e}"),
            ProbeFailure::Parse(e) => write!(f, "unparseable response: {e}"),
            ProbeFailure::Unavailable => write!(f, "signal source unavailable"),
        }
    }
}

impl std::error::Error for ProbeFailure {}

/// One capability contract shared by the six signal probes. The set is
/// closed; no open-ended registration is needed.
pub trait Probe {
    type Output;

    fn name(&self) -> &'static str;

    /// Wall-clock budget enforced by the collector around `observe`.
    fn budget(&self) -> Duration;

    fn observe(
        &self,
        target: &AnalysisTarget,
    ) -> impl std::future::Future<Output = Result<Self::Output, ProbeFailure>> + Send;
}
