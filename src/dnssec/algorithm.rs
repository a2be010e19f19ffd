use std::fmt;

/// DNSSEC algorithm numbers (RFC 4034, 5155, 5702, 5933, 6605, 8080, 8624)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DnsSecAlgorithm {
    /// Delete DS (RFC 8078)
    DeleteDS = 0,
    /// RSA/MD5 (deprecated)
    RsaMd5 = 1,
    /// Diffie-Hellman (deprecated)
    DH = 2,
    /// DSA/SHA1 (RFC 2536)
    Dsa = 3,
    /// RSA/SHA-1 (RFC 3110)
    RsaSha1 = 5,
    /// DSA-NSEC3-SHA1 (RFC 5155)
    DsaNsec3Sha1 = 6,
    /// RSASHA1-NSEC3-SHA1 (RFC 5155)
    RsaSha1Nsec3Sha1 = 7,
    /// RSA/SHA-256 (RFC 5702)
    RsaSha256 = 8,
    /// RSA/SHA-512 (RFC 5702)
    RsaSha512 = 10,
    /// GOST R 34.10-2001 (RFC 5933)
    EccGost = 12,
    /// ECDSA Curve P-256 with SHA-256 (RFC 6605)
    EcdsaP256Sha256 = 13,
    /// ECDSA Curve P-384 with SHA-384 (RFC 6605)
    EcdsaP384Sha384 = 14,
    /// Ed25519 (RFC 8080)
    Ed25519 = 15,
    /// Ed448 (RFC 8080)
    Ed448 = 16,
    /// Private algorithm (RFC 4034)
    PrivateDns = 253,
    /// Private algorithm OID (RFC 4034)
    PrivateOid = 254,
}

impl DnsSecAlgorithm {
    /// Create from an algorithm number
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::DeleteDS),
            1 => Some(Self::RsaMd5),
            2 => Some(Self::DH),
            3 => Some(Self::Dsa),
            5 => Some(Self::RsaSha1),
            6 => Some(Self::DsaNsec3Sha1),
            7 => Some(Self::RsaSha1Nsec3Sha1),
            8 => Some(Self::RsaSha256),
            10 => Some(Self::RsaSha512),
            12 => Some(Self::EccGost),
            13 => Some(Self::EcdsaP256Sha256),
            14 => Some(Self::EcdsaP384Sha384),
            15 => Some(Self::Ed25519),
            16 => Some(Self::Ed448),
            253 => Some(Self::PrivateDns),
            254 => Some(Self::PrivateOid),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether this crate can validate signatures of this algorithm. The set
    /// follows what the bundled ring-backed verifier implements.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Self::RsaSha1
                | Self::RsaSha1Nsec3Sha1
                | Self::RsaSha256
                | Self::RsaSha512
                | Self::EcdsaP256Sha256
                | Self::EcdsaP384Sha384
                | Self::Ed25519
        )
    }

    /// Whether the raw algorithm number is locally supported
    pub fn supported_code(code: u8) -> bool {
        Self::from_u8(code).map(|a| a.is_supported()).unwrap_or(false)
    }

    /// Fixed per-component signature length in bytes for the split
    /// (r, s)-style algorithms; `None` for everything else.
    pub fn component_len(&self) -> Option<usize> {
        match self {
            Self::Dsa | Self::DsaNsec3Sha1 => Some(20),
            Self::EcdsaP256Sha256 => Some(32),
            Self::EcdsaP384Sha384 => Some(48),
            _ => None,
        }
    }

    /// RSA PKCS#1 parameters for the RSA family
    pub fn rsa_params(&self) -> Option<&'static ring::signature::RsaParameters> {
        match self {
            Self::RsaSha1 | Self::RsaSha1Nsec3Sha1 => {
                Some(&ring::signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY)
            }
            Self::RsaSha256 => Some(&ring::signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY),
            Self::RsaSha512 => Some(&ring::signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY),
            _ => None,
        }
    }

    /// ring verification algorithm for the fixed-signature-form algorithms
    pub fn ring_verification(&self) -> Option<&'static dyn ring::signature::VerificationAlgorithm> {
        match self {
            Self::EcdsaP256Sha256 => Some(&ring::signature::ECDSA_P256_SHA256_FIXED),
            Self::EcdsaP384Sha384 => Some(&ring::signature::ECDSA_P384_SHA384_FIXED),
            Self::Ed25519 => Some(&ring::signature::ED25519),
            _ => None,
        }
    }
}

impl fmt::Display for DnsSecAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteDS => write!(f, "DELETE"),
            Self::RsaMd5 => write!(f, "RSAMD5"),
            Self::DH => write!(f, "DH"),
            Self::Dsa => write!(f, "DSA"),
            Self::RsaSha1 => write!(f, "RSASHA1"),
            Self::DsaNsec3Sha1 => write!(f, "DSA-NSEC3-SHA1"),
            Self::RsaSha1Nsec3Sha1 => write!(f, "RSASHA1-NSEC3-SHA1"),
            Self::RsaSha256 => write!(f, "RSASHA256"),
            Self::RsaSha512 => write!(f, "RSASHA512"),
            Self::EccGost => write!(f, "ECC-GOST"),
            Self::EcdsaP256Sha256 => write!(f, "ECDSAP256SHA256"),
            Self::EcdsaP384Sha384 => write!(f, "ECDSAP384SHA384"),
            Self::Ed25519 => write!(f, "ED25519"),
            Self::Ed448 => write!(f, "ED448"),
            Self::PrivateDns => write!(f, "PRIVATEDNS"),
            Self::PrivateOid => write!(f, "PRIVATEOID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_round_trip() {
        for code in [0u8, 1, 3, 5, 7, 8, 10, 13, 14, 15, 16] {
            assert_eq!(DnsSecAlgorithm::from_u8(code).unwrap().to_u8(), code);
        }
        assert!(DnsSecAlgorithm::from_u8(99).is_none());
    }

    #[test]
    fn test_support_policy() {
        assert!(DnsSecAlgorithm::supported_code(8));
        assert!(DnsSecAlgorithm::supported_code(13));
        assert!(DnsSecAlgorithm::supported_code(15));
        // no DSA or GOST primitives available
        assert!(!DnsSecAlgorithm::supported_code(3));
        assert!(!DnsSecAlgorithm::supported_code(12));
        assert!(!DnsSecAlgorithm::supported_code(16));
        assert!(!DnsSecAlgorithm::supported_code(99));
    }

    #[test]
    fn test_component_lengths() {
        assert_eq!(DnsSecAlgorithm::Dsa.component_len(), Some(20));
        assert_eq!(DnsSecAlgorithm::EcdsaP256Sha256.component_len(), Some(32));
        assert_eq!(DnsSecAlgorithm::EcdsaP384Sha384.component_len(), Some(48));
        assert_eq!(DnsSecAlgorithm::RsaSha256.component_len(), None);
    }
}
