use thiserror::Error;

use super::ede;

/// Failures a `CryptoVerifier` can report for one (digest, signature, key)
/// triple. Validation outcomes built from these stay values; nothing here
/// crosses the validator boundary as a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The key cannot have produced the signature (wrong algorithm or tag)
    #[error("the DNSKEY does not match the signature")]
    KeyMismatch,

    #[error("the signature has expired")]
    SignatureExpired,

    #[error("the signature is not yet valid")]
    SignatureNotYetValid,

    /// The key material itself is unusable; carries the extended error code
    /// describing why
    #[error("invalid DNSKEY")]
    InvalidKey(i32),

    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(u8),

    /// The signature bytes could not be brought into the algorithm's format
    #[error("malformed signature")]
    MalformedSignature,

    /// The cryptographic primitive rejected the signature
    #[error("signature verification failed")]
    BadSignature,
}

impl CryptoError {
    /// The extended DNS error code this failure maps to
    pub fn ede(&self) -> i32 {
        match self {
            CryptoError::KeyMismatch => ede::DNSSEC_BOGUS,
            CryptoError::SignatureExpired => ede::SIGNATURE_EXPIRED,
            CryptoError::SignatureNotYetValid => ede::SIGNATURE_NOT_YET_VALID,
            CryptoError::InvalidKey(code) => *code,
            CryptoError::UnsupportedAlgorithm(_) => ede::DNSSEC_BOGUS,
            CryptoError::MalformedSignature => ede::DNSSEC_BOGUS,
            CryptoError::BadSignature => ede::DNSSEC_BOGUS,
        }
    }
}

pub type Result<T> = std::result::Result<T, CryptoError>;
