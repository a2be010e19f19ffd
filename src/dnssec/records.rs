use base64::Engine;

use crate::dns::{Name, ParseError, Record, RecordClass, RecordType};

use super::key_tag::calculate_key_tag;

/// An RRSIG record parsed into its fields (RFC 4034 §3)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rrsig {
    pub type_covered: RecordType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub expiration: u32,
    pub inception: u32,
    pub key_tag: u16,
    pub signer: Name,
    pub signature: Vec<u8>,
}

impl Rrsig {
    /// Parse an RRSIG record's rdata
    pub fn parse(record: &Record) -> Result<Self, ParseError> {
        if record.rtype != RecordType::RRSIG {
            return Err(ParseError::InvalidRecord(format!(
                "expected RRSIG, got {}",
                record.rtype
            )));
        }
        let rdata = &record.rdata;
        if rdata.len() < 18 {
            return Err(ParseError::InvalidRecord(
                "RRSIG rdata too short".to_string(),
            ));
        }

        let type_covered = RecordType::from(u16::from_be_bytes([rdata[0], rdata[1]]));
        let algorithm = rdata[2];
        let labels = rdata[3];
        let original_ttl = u32::from_be_bytes([rdata[4], rdata[5], rdata[6], rdata[7]]);
        let expiration = u32::from_be_bytes([rdata[8], rdata[9], rdata[10], rdata[11]]);
        let inception = u32::from_be_bytes([rdata[12], rdata[13], rdata[14], rdata[15]]);
        let key_tag = u16::from_be_bytes([rdata[16], rdata[17]]);

        let (signer, used) = Name::from_wire(&rdata[18..])?;
        let signature = rdata[18 + used..].to_vec();
        if signature.is_empty() {
            return Err(ParseError::InvalidRecord(
                "RRSIG carries no signature bytes".to_string(),
            ));
        }

        Ok(Self {
            type_covered,
            algorithm,
            labels,
            original_ttl,
            expiration,
            inception,
            key_tag,
            signer,
            signature,
        })
    }

    /// The signed portion of the rdata: every field except the signature
    /// itself, with the signer name lowercased and uncompressed
    /// (RFC 4035 §5.3.2)
    pub fn presig_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(18 + self.signer.wire_len());
        out.extend_from_slice(&u16::from(self.type_covered).to_be_bytes());
        out.push(self.algorithm);
        out.push(self.labels);
        out.extend_from_slice(&self.original_ttl.to_be_bytes());
        out.extend_from_slice(&self.expiration.to_be_bytes());
        out.extend_from_slice(&self.inception.to_be_bytes());
        out.extend_from_slice(&self.key_tag.to_be_bytes());
        self.signer.write_wire(&mut out, true);
        out
    }

    /// Reassemble the full rdata
    pub fn to_rdata(&self) -> Vec<u8> {
        let mut out = self.presig_wire();
        out.extend_from_slice(&self.signature);
        out
    }

    /// Wrap this signature in a `Record` at the given owner
    pub fn to_record(&self, name: Name, rclass: RecordClass, ttl: u32) -> Record {
        Record::new(name, RecordType::RRSIG, rclass, ttl, self.to_rdata())
    }
}

/// A DNSKEY record parsed into its fields (RFC 4034 §2), with the derived
/// key tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dnskey {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
    pub key_tag: u16,
}

impl Dnskey {
    pub fn new(flags: u16, protocol: u8, algorithm: u8, public_key: Vec<u8>) -> Self {
        let key_tag = calculate_key_tag(flags, protocol, algorithm, &public_key);
        Self {
            flags,
            protocol,
            algorithm,
            public_key,
            key_tag,
        }
    }

    /// Parse a DNSKEY record's rdata
    pub fn parse(record: &Record) -> Result<Self, ParseError> {
        if record.rtype != RecordType::DNSKEY {
            return Err(ParseError::InvalidRecord(format!(
                "expected DNSKEY, got {}",
                record.rtype
            )));
        }
        let rdata = &record.rdata;
        if rdata.len() < 5 {
            return Err(ParseError::InvalidRecord(
                "DNSKEY rdata too short".to_string(),
            ));
        }

        let flags = u16::from_be_bytes([rdata[0], rdata[1]]);
        Ok(Self::new(flags, rdata[2], rdata[3], rdata[4..].to_vec()))
    }

    /// Build a key from zone-file style base64 key material
    pub fn from_base64(
        flags: u16,
        protocol: u8,
        algorithm: u8,
        key_material: &str,
    ) -> Result<Self, ParseError> {
        let cleaned: String = key_material.split_whitespace().collect();
        let public_key = base64::engine::general_purpose::STANDARD
            .decode(cleaned)
            .map_err(|e| ParseError::InvalidRecord(format!("bad DNSKEY base64: {e}")))?;
        Ok(Self::new(flags, protocol, algorithm, public_key))
    }

    /// Zone Key flag (bit 7): the key may sign zone data
    pub fn is_zone_key(&self) -> bool {
        self.flags & 0x0100 != 0
    }

    /// Secure Entry Point flag (bit 15), conventionally marking a KSK
    pub fn is_sep(&self) -> bool {
        self.flags & 0x0001 != 0
    }

    pub fn to_rdata(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.public_key.len());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.push(self.protocol);
        out.push(self.algorithm);
        out.extend_from_slice(&self.public_key);
        out
    }

    /// Wrap this key in a `Record` at the given owner
    pub fn to_record(&self, name: Name, rclass: RecordClass, ttl: u32) -> Record {
        Record::new(name, RecordType::DNSKEY, rclass, ttl, self.to_rdata())
    }
}
