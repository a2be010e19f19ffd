use tracing::trace;

use super::enums::{RecordClass, RecordType};
use super::name::Name;
use super::record::Record;
use super::ParseError;

/// A set of records sharing (owner, class, type), together with the RRSIG
/// records covering it.
///
/// Members are deduplicated by canonical wire form; TTLs are normalized to
/// the minimum of all members (RFC 2181 §5.2). Signatures are deduplicated
/// by (key tag, algorithm, signature bytes) so that equal signatures
/// attached twice cannot inflate the verification workload.
#[derive(Clone, Debug, Default)]
pub struct RRset {
    records: Vec<Record>,
    rrsigs: Vec<Record>,
}

impl RRset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an rrset from an iterator of records; RRSIGs are routed to the
    /// signature list automatically.
    pub fn from_records<I: IntoIterator<Item = Record>>(records: I) -> Result<Self, ParseError> {
        let mut set = Self::new();
        for record in records {
            set.add(record)?;
        }
        Ok(set)
    }

    /// Add a record, routing RRSIGs to the signature list
    pub fn add(&mut self, record: Record) -> Result<(), ParseError> {
        if record.rtype == RecordType::RRSIG {
            self.add_rrsig(record)
        } else {
            self.add_record(record)
        }
    }

    /// Add a data record. The first record fixes (owner, class, type);
    /// later additions must match.
    pub fn add_record(&mut self, record: Record) -> Result<(), ParseError> {
        if let Some(first) = self.records.first() {
            if first.name != record.name
                || first.rtype != record.rtype
                || first.rclass != record.rclass
            {
                return Err(ParseError::InvalidRecord(format!(
                    "record <{}/{}/{}> does not belong to rrset <{}/{}/{}>",
                    record.name, record.rclass, record.rtype, first.name, first.rclass, first.rtype
                )));
            }
        }

        // RFC 2181: members of an rrset share one TTL, keep the minimum
        let ttl = self
            .records
            .first()
            .map(|r| r.ttl.min(record.ttl))
            .unwrap_or(record.ttl);

        let candidate = record.canonical_wire(&record.name, 0);
        let duplicate = self
            .records
            .iter()
            .any(|r| r.canonical_wire(&r.name, 0) == candidate);
        if duplicate {
            trace!("dropping duplicate record in rrset <{}>", record.name);
            return Ok(());
        }

        self.records.push(record);
        for r in &mut self.records {
            r.ttl = ttl;
        }
        Ok(())
    }

    /// Attach a covering RRSIG. The signature must cover this set's type
    /// (when the set already has members) and equal signatures are dropped.
    pub fn add_rrsig(&mut self, record: Record) -> Result<(), ParseError> {
        let covered = record.rrsig_covered_type()?;
        if let Some(first) = self.records.first() {
            if covered != first.rtype {
                return Err(ParseError::InvalidRecord(format!(
                    "RRSIG covers {covered}, rrset holds {}",
                    first.rtype
                )));
            }
            if first.name != record.name || first.rclass != record.rclass {
                return Err(ParseError::InvalidRecord(
                    "RRSIG owner/class does not match rrset".to_string(),
                ));
            }
        }

        if let Some(new_id) = rrsig_identity(&record.rdata) {
            let duplicate = self
                .rrsigs
                .iter()
                .any(|sig| rrsig_identity(&sig.rdata) == Some(new_id.clone()));
            if duplicate {
                trace!("dropping duplicate RRSIG on <{}>", record.name);
                return Ok(());
            }
        }

        self.rrsigs.push(record);
        Ok(())
    }

    pub fn name(&self) -> Option<&Name> {
        self.records
            .first()
            .map(|r| &r.name)
            .or_else(|| self.rrsigs.first().map(|r| &r.name))
    }

    pub fn rtype(&self) -> Option<RecordType> {
        self.records.first().map(|r| r.rtype)
    }

    pub fn rclass(&self) -> Option<RecordClass> {
        self.records.first().map(|r| r.rclass)
    }

    pub fn ttl(&self) -> u32 {
        self.records.first().map(|r| r.ttl).unwrap_or(0)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn rrsigs(&self) -> &[Record] {
        &self.rrsigs
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// (key tag, algorithm, signature bytes) of a raw RRSIG rdata; `None` when
/// the rdata is too short to contain them.
fn rrsig_identity(rdata: &[u8]) -> Option<(u16, u8, Vec<u8>)> {
    if rdata.len() < 18 {
        return None;
    }
    let algorithm = rdata[2];
    let key_tag = u16::from_be_bytes([rdata[16], rdata[17]]);
    let signer_end = walk_signer(rdata, 18)?;
    Some((key_tag, algorithm, rdata[signer_end..].to_vec()))
}

fn walk_signer(data: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = *data.get(pos)? as usize;
        if len > super::name::MAX_LABEL_LEN {
            return None;
        }
        pos += 1 + len;
        if len == 0 {
            return Some(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_record(owner: &str, ttl: u32, addr: [u8; 4]) -> Record {
        Record::new(
            Name::parse(owner).unwrap(),
            RecordType::A,
            RecordClass::IN,
            ttl,
            addr.to_vec(),
        )
    }

    #[test]
    fn test_membership_invariant() {
        let mut set = RRset::new();
        set.add_record(a_record("host.example.com", 300, [192, 0, 2, 1]))
            .unwrap();
        assert!(set
            .add_record(a_record("other.example.com", 300, [192, 0, 2, 2]))
            .is_err());
    }

    #[test]
    fn test_ttl_normalized_to_minimum() {
        let mut set = RRset::new();
        set.add_record(a_record("host.example.com", 300, [192, 0, 2, 1]))
            .unwrap();
        set.add_record(a_record("host.example.com", 60, [192, 0, 2, 2]))
            .unwrap();
        assert_eq!(set.ttl(), 60);
        assert!(set.records().iter().all(|r| r.ttl == 60));
    }

    #[test]
    fn test_duplicate_records_dropped() {
        let mut set = RRset::new();
        set.add_record(a_record("host.example.com", 300, [192, 0, 2, 1]))
            .unwrap();
        set.add_record(a_record("HOST.example.com", 300, [192, 0, 2, 1]))
            .unwrap();
        assert_eq!(set.len(), 1);
    }
}
