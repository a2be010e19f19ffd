use std::fmt;

use tracing::debug;

use crate::dns::{Name, RecordClass, RecordType};

use super::srrset::SRRset;
use super::{ede, JustifiedStatus, SecurityStatus};

/// The three shapes a cached key entry can take
#[derive(Clone, Debug)]
enum KeyData {
    /// A validated DNSKEY rrset, possibly with the algorithm list the
    /// delegation signalled for it
    Good {
        rrset: SRRset,
        algorithms: Option<Vec<u8>>,
    },
    /// Proven absence of keys: the name lies under an insecure delegation
    Null,
    /// Keys that failed validation
    Bad,
}

/// DNSKEY cache entry for an owner name, with or without actual keys.
///
/// A `Good` entry holds a SECURE DNSKEY rrset. A `Null` entry records a
/// proven insecure point in the tree (no keys exist, and that is fine). A
/// `Bad` entry records a validation failure at the name. All three can carry
/// an extended error code and a textual reason explaining why no usable keys
/// are present.
#[derive(Clone, Debug)]
pub struct KeyEntry {
    name: Name,
    rclass: RecordClass,
    ttl: u32,
    data: KeyData,
    ede: i32,
    bad_reason: Option<String>,
}

impl KeyEntry {
    /// Create a positive entry from a validated DNSKEY rrset
    pub fn good(rrset: SRRset) -> Self {
        Self::good_with_algorithms(rrset, None)
    }

    /// Create a positive entry carrying the signalled algorithm list
    pub fn good_with_algorithms(mut rrset: SRRset, algorithms: Option<Vec<u8>>) -> Self {
        debug_assert!(!rrset.rrset().is_empty(), "good key entry without keys");
        rrset.set_security_status(SecurityStatus::Secure);
        Self {
            name: rrset.name().cloned().unwrap_or_else(Name::root),
            rclass: rrset.rclass().unwrap_or_default(),
            ttl: rrset.ttl(),
            data: KeyData::Good { rrset, algorithms },
            ede: ede::NONE,
            bad_reason: None,
        }
    }

    /// Create an entry proving that no keys exist at `name`
    pub fn null_entry(name: Name, rclass: RecordClass, ttl: u32) -> Self {
        Self {
            name,
            rclass,
            ttl,
            data: KeyData::Null,
            ede: ede::NONE,
            bad_reason: None,
        }
    }

    /// Create an entry recording failed validation at `name`
    pub fn bad_entry(name: Name, rclass: RecordClass, ttl: u32) -> Self {
        Self {
            name,
            rclass,
            ttl,
            data: KeyData::Bad,
            ede: ede::NONE,
            bad_reason: None,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn rclass(&self) -> RecordClass {
        self.rclass
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn is_good(&self) -> bool {
        matches!(self.data, KeyData::Good { .. })
    }

    pub fn is_null(&self) -> bool {
        matches!(self.data, KeyData::Null)
    }

    pub fn is_bad(&self) -> bool {
        matches!(self.data, KeyData::Bad)
    }

    /// The DNSKEY rrset of a good entry
    pub fn dnskey_rrset(&self) -> Option<&SRRset> {
        match &self.data {
            KeyData::Good { rrset, .. } => Some(rrset),
            _ => None,
        }
    }

    /// The signalled algorithm list, when the delegation carried one
    pub fn signalled_algorithms(&self) -> Option<&[u8]> {
        match &self.data {
            KeyData::Good { algorithms, .. } => algorithms.as_deref(),
            _ => None,
        }
    }

    /// Record why this entry has no usable keys
    pub fn set_bad_reason(&mut self, ede: i32, reason: impl Into<String>) {
        self.ede = ede;
        self.bad_reason = Some(reason.into());
    }

    pub fn bad_reason(&self) -> Option<&str> {
        self.bad_reason.as_deref()
    }

    pub fn ede_reason(&self) -> i32 {
        self.ede
    }

    /// Decide whether this entry already determines the status of `set`,
    /// without looking at any signatures.
    ///
    /// Returns `None` when the caller must proceed to signature
    /// verification against the entry's keys.
    pub fn validate_key_for(&self, set: &SRRset) -> Option<JustifiedStatus> {
        // a missing signer name marks the response as unsigned
        if set.signer_name().is_none() {
            // a synthesized CNAME has no signature of its own, but one
            // minted from a validated DNAME is still secure
            if set.rtype() == Some(RecordType::CNAME)
                && set.security_status() == SecurityStatus::Secure
            {
                return Some(JustifiedStatus {
                    status: SecurityStatus::Secure,
                    ede: ede::NONE,
                    reason: None,
                });
            }

            debug!(
                "no signer name for <{}/{}/{}>",
                set.name().map(|n| n.to_string()).unwrap_or_default(),
                set.rclass().unwrap_or_default(),
                set.rtype().map(|t| t.to_string()).unwrap_or_default(),
            );

            // unsigned data is only acceptable under a proven null entry
            if self.is_null() {
                let reason = self
                    .bad_reason
                    .clone()
                    .unwrap_or_else(|| "unsigned response in insecure zone".to_string());
                return Some(JustifiedStatus::new(
                    SecurityStatus::Insecure,
                    self.ede,
                    reason,
                ));
            }

            if self.is_good() {
                return Some(JustifiedStatus::new(
                    SecurityStatus::Bogus,
                    ede::RRSIGS_MISSING,
                    "missing signature for signed zone",
                ));
            }

            return Some(JustifiedStatus::new(
                SecurityStatus::Bogus,
                self.ede,
                format!(
                    "response has failed validation: {}",
                    self.bad_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        if self.is_bad() {
            return Some(JustifiedStatus::new(
                SecurityStatus::Bogus,
                self.ede,
                format!(
                    "bad key at {}: {}",
                    self.name,
                    self.bad_reason.as_deref().unwrap_or("unknown")
                ),
            ));
        }

        if self.is_null() {
            let reason = self
                .bad_reason
                .clone()
                .unwrap_or_else(|| "insecure zone".to_string());
            return Some(JustifiedStatus::new(
                SecurityStatus::Insecure,
                self.ede,
                reason,
            ));
        }

        None
    }
}

impl PartialEq for KeyEntry {
    /// Cache equality: same name/class, same shape, same failure diagnosis
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.rclass == other.rclass
            && self.is_good() == other.is_good()
            && self.is_null() == other.is_null()
            && self.ede == other.ede
            && self.bad_reason == other.bad_reason
    }
}

impl Eq for KeyEntry {}

impl fmt::Display for KeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.data {
            KeyData::Good { .. } => "good",
            KeyData::Null => "null",
            KeyData::Bad => "bad",
        };
        write!(f, "KeyEntry[{}/{} {}]", self.name, self.rclass, shape)
    }
}
