use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::config;
use crate::dns::RRset;

use super::canonical::digest_rrset;
use super::crypto::{CryptoVerifier, RingVerifier};
use super::errors::CryptoError;
use super::key_entry::KeyEntry;
use super::records::{Dnskey, Rrsig};
use super::requirements::AlgorithmRequirements;
use super::srrset::SRRset;
use super::{ede, JustifiedStatus, SecurityStatus};

/// Verifies RRsets against DNSKEY material.
///
/// The verifier is stateless across calls and safe to share between
/// threads; verification is CPU-bound and returns synchronously. The number
/// of signatures examined per RRset is bounded by `max_validate_rrsigs` so a
/// hostile response stuffed with unverifiable signatures cannot burn
/// arbitrary CPU.
pub struct SignatureVerifier<V = RingVerifier> {
    crypto: V,
    max_validate_rrsigs: usize,
}

/// Default bound on signatures examined per RRset
pub const DEFAULT_MAX_VALIDATE_RRSIGS: usize = 8;

impl Default for SignatureVerifier<RingVerifier> {
    fn default() -> Self {
        Self::new(RingVerifier)
    }
}

impl<V: CryptoVerifier> SignatureVerifier<V> {
    /// Create a verifier around a crypto capability
    pub fn new(crypto: V) -> Self {
        Self {
            crypto,
            max_validate_rrsigs: DEFAULT_MAX_VALIDATE_RRSIGS,
        }
    }

    /// Read configuration. The recognized key is
    /// `dnsjava.dnssec.max_validate_rrsigs`.
    pub fn init(&mut self, properties: &HashMap<String, String>) {
        self.max_validate_rrsigs = config::int_property(
            properties,
            config::MAX_VALIDATE_RRSIGS_PROPERTY,
            DEFAULT_MAX_VALIDATE_RRSIGS,
        );
    }

    pub fn max_validate_rrsigs(&self) -> usize {
        self.max_validate_rrsigs
    }

    /// The crypto capability this verifier dispatches to
    pub fn crypto(&self) -> &V {
        &self.crypto
    }

    /// Verify an RRset against a key entry.
    ///
    /// Returns SECURE when a signature verifies under every algorithm the
    /// key entry signals (one suffices when nothing is signalled), BOGUS
    /// when signatures exist but none verifies, INSECURE when none of the
    /// signalled algorithms is locally supported, and UNCHECKED when no
    /// candidate key was available for any signature.
    pub fn verify(&self, rrset: &SRRset, keys: &KeyEntry, now: u32) -> JustifiedStatus {
        let sigs = parse_sigs(rrset.rrset());
        if sigs.is_empty() {
            debug!(
                "RRset <{}> failed to verify due to a lack of signatures",
                display_key(rrset)
            );
            return JustifiedStatus::new(
                SecurityStatus::Bogus,
                ede::RRSIGS_MISSING,
                format!("missing signature for {}", display_key(rrset)),
            );
        }

        let mut needs = None;
        if let Some(signalled) = keys.signalled_algorithms() {
            let requirements = AlgorithmRequirements::from_list(signalled);
            if requirements.num() == 0 {
                debug!("{} has no known algorithms", display_key(rrset));
                return JustifiedStatus::new(
                    SecurityStatus::Insecure,
                    ede::UNSUPPORTED_DNSKEY_ALGORITHM,
                    format!("no supported algorithms for {}", display_key(rrset)),
                );
            }
            needs = Some(requirements);
        }

        let mut last_result = None;
        let mut examined = 0usize;
        for sig in &sigs {
            let mut result = self.verify_signature(rrset, sig, keys, now);
            if result.status == SecurityStatus::Secure {
                let satisfied = match needs.as_mut() {
                    Some(needs) => needs.set_secure(sig.algorithm),
                    None => true,
                };
                if satisfied {
                    return result;
                }
                // valid, but other signalled algorithms are still unproven
                result = JustifiedStatus::new(
                    SecurityStatus::Bogus,
                    ede::DNSSEC_BOGUS,
                    format!("not all signalled algorithms verified {}", display_key(rrset)),
                );
            } else if result.status == SecurityStatus::Bogus {
                if let Some(needs) = needs.as_mut() {
                    needs.set_bogus(sig.algorithm);
                }
            }
            last_result = Some(result);

            examined += 1;
            if examined > self.max_validate_rrsigs {
                warn!(
                    "RRset <{}> failed to verify: too many signatures",
                    display_key(rrset)
                );
                return JustifiedStatus::new(
                    SecurityStatus::Bogus,
                    ede::DNSSEC_BOGUS,
                    format!("too many signatures for {}", display_key(rrset)),
                );
            }
        }

        warn!(
            "RRset <{}> failed to verify: all signatures are BOGUS",
            display_key(rrset)
        );
        last_result.unwrap_or_else(|| {
            JustifiedStatus::new(
                SecurityStatus::Bogus,
                ede::DNSSEC_BOGUS,
                format!("no verifiable signature for {}", display_key(rrset)),
            )
        })
    }

    /// Verify a single signature against every candidate key in the entry
    fn verify_signature(
        &self,
        rrset: &SRRset,
        sig: &Rrsig,
        keys: &KeyEntry,
        now: u32,
    ) -> JustifiedStatus {
        let off_tree = rrset
            .name()
            .map(|name| !name.is_subdomain_of(&sig.signer))
            .unwrap_or(true);
        if off_tree {
            debug!(
                "signer name {} is off-tree for {}",
                sig.signer,
                display_key(rrset)
            );
            return JustifiedStatus::new(
                SecurityStatus::Bogus,
                ede::DNSSEC_BOGUS,
                format!("signer {} is off-tree", sig.signer),
            );
        }

        let candidates = find_keys(keys, sig);
        if candidates.is_empty() {
            trace!("could not find appropriate key for tag {}", sig.key_tag);
            return JustifiedStatus::new(
                SecurityStatus::Unchecked,
                ede::DNSKEY_MISSING,
                format!("no key for signature from {}", sig.signer),
            );
        }

        let message = digest_rrset(sig, rrset.rrset());
        let mut last_error = None;
        for key in candidates {
            match self.crypto.verify(sig, &key, &message, now) {
                Ok(()) => return JustifiedStatus::secure(),
                Err(e) => {
                    trace!("key tag {} candidate rejected: {e}", sig.key_tag);
                    last_error = Some(e);
                }
            }
        }

        // candidate list was non-empty, so an error is always recorded
        let error = last_error.unwrap_or(CryptoError::BadSignature);
        JustifiedStatus::new(SecurityStatus::Bogus, error.ede(), error.to_string())
    }

    /// Verify an RRset against one specific DNSKEY. Use this when the data
    /// must verify under a particular key rather than any key of an rrset.
    ///
    /// Signatures whose key tag does not match are skipped without counting
    /// against the signature budget.
    pub fn verify_with_key(&self, rrset: &RRset, dnskey: &Dnskey, now: u32) -> JustifiedStatus {
        let sigs = parse_sigs(rrset);
        if sigs.is_empty() {
            warn!(
                "RRset <{}> failed to verify due to lack of signatures",
                rrset.name().map(|n| n.to_string()).unwrap_or_default()
            );
            return JustifiedStatus::new(
                SecurityStatus::Bogus,
                ede::RRSIGS_MISSING,
                "missing signature".to_string(),
            );
        }

        let mut last_error: Option<CryptoError> = None;
        let mut examined = 0usize;
        for sig in &sigs {
            if sig.key_tag != dnskey.key_tag {
                continue;
            }

            examined += 1;
            let message = digest_rrset(sig, rrset);
            match self.crypto.verify(sig, dnskey, &message, now) {
                Ok(()) => return JustifiedStatus::secure(),
                Err(e) => {
                    warn!(
                        "failed to validate RRset with signature tag {}: {e}",
                        sig.key_tag
                    );
                    last_error = Some(e);
                }
            }

            if examined > self.max_validate_rrsigs {
                return JustifiedStatus::new(
                    SecurityStatus::Bogus,
                    ede::DNSSEC_BOGUS,
                    "too many signatures".to_string(),
                );
            }
        }

        let (ede_code, reason) = match (&last_error, examined) {
            (_, 0) => (ede::DNSKEY_MISSING, "no signature matched the key"),
            (Some(CryptoError::SignatureExpired), _) => {
                (ede::SIGNATURE_EXPIRED, "signature expired")
            }
            (Some(CryptoError::SignatureNotYetValid), _) => {
                (ede::SIGNATURE_NOT_YET_VALID, "signature not yet valid")
            }
            _ => (ede::DNSSEC_BOGUS, "no signature verified"),
        };
        JustifiedStatus::new(SecurityStatus::Bogus, ede_code, reason)
    }
}

/// Parse the attached RRSIGs, skipping any that cannot be decoded
fn parse_sigs(rrset: &RRset) -> Vec<Rrsig> {
    rrset
        .rrsigs()
        .iter()
        .filter_map(|record| match Rrsig::parse(record) {
            Ok(sig) => Some(sig),
            Err(e) => {
                warn!("skipping undecodable RRSIG on <{}>: {e}", record.name);
                None
            }
        })
        .collect()
}

/// Find the candidate DNSKEYs for a signature. Tags are not unique, so more
/// than one key can come back; all of them must be tried.
fn find_keys(keys: &KeyEntry, sig: &Rrsig) -> Vec<Dnskey> {
    let Some(rrset) = keys.dnskey_rrset() else {
        return Vec::new();
    };
    if rrset.name() != Some(&sig.signer) {
        trace!(
            "incorrect keyset supplied: wanted {}, got {}",
            sig.signer,
            rrset.name().map(|n| n.to_string()).unwrap_or_default()
        );
        return Vec::new();
    }

    rrset
        .records()
        .iter()
        .filter_map(|record| Dnskey::parse(record).ok())
        .filter(|key| key.algorithm == sig.algorithm && key.key_tag == sig.key_tag)
        .collect()
}

fn display_key(rrset: &SRRset) -> String {
    format!(
        "{}/{}/{}",
        rrset.name().map(|n| n.to_string()).unwrap_or_default(),
        rrset.rclass().unwrap_or_default(),
        rrset.rtype().map(|t| t.to_string()).unwrap_or_default(),
    )
}
