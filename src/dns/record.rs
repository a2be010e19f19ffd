use super::enums::{RecordClass, RecordType};
use super::name::Name;
use super::ParseError;

/// A generic resource record. Rdata is kept in uncompressed wire form; typed
/// views for DNSKEY and RRSIG live in the dnssec module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub name: Name,
    pub rtype: RecordType,
    pub rclass: RecordClass,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl Record {
    pub fn new(
        name: Name,
        rtype: RecordType,
        rclass: RecordClass,
        ttl: u32,
        rdata: Vec<u8>,
    ) -> Self {
        Self {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
        }
    }

    /// Render this record in canonical form (RFC 4034 §6): the supplied
    /// owner name (already wildcard-normalized) lowercased, the given TTL in
    /// place of the record's own, and rdata with embedded names lowercased.
    pub fn canonical_wire(&self, owner: &Name, ttl: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(owner.wire_len() + 10 + self.rdata.len());
        owner.write_wire(&mut out, true);
        out.extend_from_slice(&u16::from(self.rtype).to_be_bytes());
        out.extend_from_slice(&u16::from(self.rclass).to_be_bytes());
        out.extend_from_slice(&ttl.to_be_bytes());

        let rdata = self.canonical_rdata();
        out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        out.extend_from_slice(&rdata);
        out
    }

    /// Rdata with embedded domain names lowercased for the RFC 4034 §6.2
    /// types. RRSIG signer names are left untouched per RFC 6840 §5.1.
    pub fn canonical_rdata(&self) -> Vec<u8> {
        let mut rdata = self.rdata.clone();
        match self.rtype {
            // rdata is a single domain name
            RecordType::NS | RecordType::CNAME | RecordType::PTR | RecordType::DNAME => {
                lowercase_all(&mut rdata);
            }
            // 16-bit preference, then a domain name
            RecordType::MX => {
                if rdata.len() > 2 {
                    lowercase_all(&mut rdata[2..]);
                }
            }
            // priority/weight/port, then a domain name
            RecordType::SRV => {
                if rdata.len() > 6 {
                    lowercase_all(&mut rdata[6..]);
                }
            }
            // mname and rname, then five fixed 32-bit fields
            RecordType::SOA => {
                let mut pos = 0;
                for _ in 0..2 {
                    match walk_name(&rdata, pos) {
                        Some(end) => {
                            lowercase_all(&mut rdata[pos..end]);
                            pos = end;
                        }
                        None => return rdata,
                    }
                }
            }
            _ => {}
        }
        rdata
    }

    /// The covered type of an RRSIG record, read straight from the rdata
    pub fn rrsig_covered_type(&self) -> Result<RecordType, ParseError> {
        if self.rtype != RecordType::RRSIG || self.rdata.len() < 2 {
            return Err(ParseError::InvalidRecord(
                "not a well-formed RRSIG".to_string(),
            ));
        }
        Ok(RecordType::from(u16::from_be_bytes([
            self.rdata[0],
            self.rdata[1],
        ])))
    }
}

/// ASCII-lowercase a wire-name region in place. Label length bytes are at
/// most 63 and therefore unaffected by the transformation.
fn lowercase_all(bytes: &mut [u8]) {
    for b in bytes {
        *b = b.to_ascii_lowercase();
    }
}

/// Find the end offset of an uncompressed wire name starting at `pos`
fn walk_name(data: &[u8], mut pos: usize) -> Option<usize> {
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

    fn cname_record(owner: &str, target: &str) -> Record {
        let mut rdata = Vec::new();
        Name::parse(target).unwrap().write_wire(&mut rdata, false);
        Record::new(
            Name::parse(owner).unwrap(),
            RecordType::CNAME,
            RecordClass::IN,
            300,
            rdata,
        )
    }

    #[test]
    fn test_canonical_rdata_lowercases_target() {
        let record = cname_record("alias.example.com", "Target.Example.COM");
        let mut expected = Vec::new();
        Name::parse("target.example.com")
            .unwrap()
            .write_wire(&mut expected, false);
        assert_eq!(record.canonical_rdata(), expected);
    }

    #[test]
    fn test_canonical_wire_replaces_ttl() {
        let record = cname_record("Alias.Example.Com", "t.example.com");
        let wire = record.canonical_wire(&record.name.clone(), 3600);
        // owner is lowercased
        assert_eq!(&wire[..6], &[5u8, b'a', b'l', b'i', b'a', b's']);
        // ttl sits after owner + type + class
        let ttl_at = record.name.wire_len() + 4;
        assert_eq!(&wire[ttl_at..ttl_at + 4], &3600u32.to_be_bytes());
    }

    #[test]
    fn test_soa_canonical_rdata() {
        let mut rdata = Vec::new();
        Name::parse("NS1.Example.com").unwrap().write_wire(&mut rdata, false);
        Name::parse("Admin.Example.com").unwrap().write_wire(&mut rdata, false);
        rdata.extend_from_slice(&[0u8; 20]);

        let record = Record::new(
            Name::parse("example.com").unwrap(),
            RecordType::SOA,
            RecordClass::IN,
            300,
            rdata,
        );

        let canonical = record.canonical_rdata();
        let mut expected = Vec::new();
        Name::parse("ns1.example.com").unwrap().write_wire(&mut expected, false);
        Name::parse("admin.example.com").unwrap().write_wire(&mut expected, false);
        expected.extend_from_slice(&[0u8; 20]);
        assert_eq!(canonical, expected);
    }

    #[test]
    fn test_txt_rdata_untouched() {
        let record = Record::new(
            Name::root(),
            RecordType::TXT,
            RecordClass::IN,
            60,
            b"\x04TeSt".to_vec(),
        );
        assert_eq!(record.canonical_rdata(), b"\x04TeSt".to_vec());
    }
}
