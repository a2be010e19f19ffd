use std::collections::BTreeMap;

use tracing::trace;

use super::algorithm::DnsSecAlgorithm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AlgState {
    Pending,
    Secure,
    Bogus,
}

/// Tracks which of the algorithms signalled by a DNSKEY rrset still need a
/// valid signature.
///
/// During an algorithm rollover a zone signs with several algorithms at
/// once; RFC 6840 §5.11 practice requires one SECURE signature per signalled
/// algorithm the validator supports before the whole set may be called
/// SECURE. Signalled algorithms the validator cannot check are dropped at
/// init; if nothing remains, the caller must treat the data as insecure
/// rather than bogus.
#[derive(Clone, Debug, Default)]
pub struct AlgorithmRequirements {
    needed: BTreeMap<u8, AlgState>,
}

impl AlgorithmRequirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tracker from a signalled algorithm list. Unsupported ids are
    /// silently dropped.
    pub fn init(&mut self, algorithms: &[u8]) {
        for &alg in algorithms {
            if DnsSecAlgorithm::supported_code(alg) {
                self.needed.entry(alg).or_insert(AlgState::Pending);
            } else {
                trace!("dropping unsupported signalled algorithm {alg}");
            }
        }
    }

    /// Convenience constructor: `new` + `init`
    pub fn from_list(algorithms: &[u8]) -> Self {
        let mut needs = Self::new();
        needs.init(algorithms);
        needs
    }

    /// Mark an algorithm as satisfied. Returns `true` when every tracked
    /// algorithm is now SECURE.
    pub fn set_secure(&mut self, algorithm: u8) -> bool {
        if let Some(state) = self.needed.get_mut(&algorithm) {
            *state = AlgState::Secure;
        }
        self.needed.values().all(|s| *s == AlgState::Secure)
    }

    /// Mark an algorithm as failed, unless a signature already proved it
    pub fn set_bogus(&mut self, algorithm: u8) {
        if let Some(state) = self.needed.get_mut(&algorithm) {
            if *state == AlgState::Pending {
                *state = AlgState::Bogus;
            }
        }
    }

    /// Number of tracked algorithms
    pub fn num(&self) -> usize {
        self.needed.len()
    }
}
