pub mod algorithm;
pub mod canonical;
pub mod crypto;
pub mod ede;
pub mod errors;
pub mod key_entry;
pub mod key_tag;
pub mod records;
pub mod requirements;
pub mod srrset;
pub mod verifier;

pub use algorithm::DnsSecAlgorithm;
pub use canonical::digest_rrset;
pub use crypto::{CryptoVerifier, RingVerifier};
pub use errors::CryptoError;
pub use key_entry::KeyEntry;
pub use key_tag::calculate_key_tag;
pub use records::{Dnskey, Rrsig};
pub use requirements::AlgorithmRequirements;
pub use srrset::SRRset;
pub use verifier::SignatureVerifier;

use std::fmt;

/// DNSSEC security status of a piece of DNS data (RFC 4033 §5)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SecurityStatus {
    /// Validation has not been attempted
    #[default]
    Unchecked,
    /// Data failed validation
    Bogus,
    /// No validation path could be determined
    Indeterminate,
    /// Data lies under a proven insecure delegation
    Insecure,
    /// Data validated successfully
    Secure,
}

impl fmt::Display for SecurityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityStatus::Unchecked => write!(f, "UNCHECKED"),
            SecurityStatus::Bogus => write!(f, "BOGUS"),
            SecurityStatus::Indeterminate => write!(f, "INDETERMINATE"),
            SecurityStatus::Insecure => write!(f, "INSECURE"),
            SecurityStatus::Secure => write!(f, "SECURE"),
        }
    }
}

/// A security status together with the reason it was determined: the
/// extended DNS error code (−1 when none applies) and a human-readable
/// explanation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JustifiedStatus {
    pub status: SecurityStatus,
    pub ede: i32,
    pub reason: Option<String>,
}

impl JustifiedStatus {
    pub fn new(status: SecurityStatus, ede: i32, reason: impl Into<String>) -> Self {
        Self {
            status,
            ede,
            reason: Some(reason.into()),
        }
    }

    /// A plain SECURE result with no diagnostic attached
    pub fn secure() -> Self {
        Self {
            status: SecurityStatus::Secure,
            ede: ede::NONE,
            reason: None,
        }
    }

    pub fn is_secure(&self) -> bool {
        self.status == SecurityStatus::Secure
    }
}

impl fmt::Display for JustifiedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status)?;
        if self.ede >= 0 {
            write!(f, " (EDE {})", self.ede)?;
        }
        if let Some(reason) = &self.reason {
            write!(f, ": {reason}")?;
        }
        Ok(())
    }
}
