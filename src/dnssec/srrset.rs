use crate::dns::{Name, RRset, Record, RecordClass, RecordType};

use super::{JustifiedStatus, SecurityStatus};

/// An RRset carrying its cached security status and, when the set arrived
/// signed, the signer name taken from its RRSIGs.
#[derive(Clone, Debug, Default)]
pub struct SRRset {
    rrset: RRset,
    status: SecurityStatus,
    signer: Option<Name>,
}

impl SRRset {
    /// Wrap an rrset with status UNCHECKED and no signer
    pub fn new(rrset: RRset) -> Self {
        Self {
            rrset,
            status: SecurityStatus::Unchecked,
            signer: None,
        }
    }

    pub fn with_status(mut self, status: SecurityStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_signer(mut self, signer: Name) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn rrset(&self) -> &RRset {
        &self.rrset
    }

    pub fn name(&self) -> Option<&Name> {
        self.rrset.name()
    }

    pub fn rtype(&self) -> Option<RecordType> {
        self.rrset.rtype()
    }

    pub fn rclass(&self) -> Option<RecordClass> {
        self.rrset.rclass()
    }

    pub fn ttl(&self) -> u32 {
        self.rrset.ttl()
    }

    pub fn records(&self) -> &[Record] {
        self.rrset.records()
    }

    pub fn rrsigs(&self) -> &[Record] {
        self.rrset.rrsigs()
    }

    pub fn security_status(&self) -> SecurityStatus {
        self.status
    }

    pub fn set_security_status(&mut self, status: SecurityStatus) {
        self.status = status;
    }

    /// The name of the zone whose keys signed this set; `None` marks an
    /// unsigned response.
    pub fn signer_name(&self) -> Option<&Name> {
        self.signer.as_ref()
    }

    pub fn set_signer_name(&mut self, signer: Option<Name>) {
        self.signer = signer;
    }

    /// Stamp a validation outcome onto this set
    pub fn set_status_from(&mut self, verdict: &JustifiedStatus) {
        self.status = verdict.status;
    }
}

impl From<RRset> for SRRset {
    fn from(rrset: RRset) -> Self {
        Self::new(rrset)
    }
}
