use vordr::dns::{Name, RRset, Record, RecordClass, RecordType};
use vordr::dnssec::{ede, Dnskey, KeyEntry, SRRset, SecurityStatus};

fn zone() -> Name {
    Name::parse("example.com").unwrap()
}

fn good_entry() -> KeyEntry {
    let key = Dnskey::new(256, 3, 8, vec![0x42; 64]);
    let mut rrset = RRset::new();
    rrset
        .add_record(key.to_record(zone(), RecordClass::IN, 3600))
        .unwrap();
    KeyEntry::good(SRRset::new(rrset))
}

fn a_rrset(signer: Option<Name>) -> SRRset {
    let mut rrset = RRset::new();
    rrset
        .add_record(Record::new(
            Name::parse("www.example.com").unwrap(),
            RecordType::A,
            RecordClass::IN,
            300,
            vec![192, 0, 2, 1],
        ))
        .unwrap();
    let mut set = SRRset::new(rrset);
    set.set_signer_name(signer);
    set
}

fn cname_rrset() -> SRRset {
    let mut target = Vec::new();
    Name::parse("target.example.net")
        .unwrap()
        .write_wire(&mut target, false);
    let mut rrset = RRset::new();
    rrset
        .add_record(Record::new(
            Name::parse("www.example.com").unwrap(),
            RecordType::CNAME,
            RecordClass::IN,
            300,
            target,
        ))
        .unwrap();
    SRRset::new(rrset)
}

#[test]
fn test_unsigned_under_null_entry_is_insecure() {
    let entry = KeyEntry::null_entry(zone(), RecordClass::IN, 300);
    let verdict = entry.validate_key_for(&a_rrset(None)).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Insecure);
    assert_eq!(verdict.ede, ede::NONE);
    assert!(verdict.reason.is_some());
}

#[test]
fn test_unsigned_under_null_entry_carries_recorded_reason() {
    let mut entry = KeyEntry::null_entry(zone(), RecordClass::IN, 300);
    entry.set_bad_reason(ede::UNSUPPORTED_DNSKEY_ALGORITHM, "no supported algorithms");

    let verdict = entry.validate_key_for(&a_rrset(None)).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Insecure);
    assert_eq!(verdict.ede, ede::UNSUPPORTED_DNSKEY_ALGORITHM);
    assert_eq!(verdict.reason.as_deref(), Some("no supported algorithms"));
}

#[test]
fn test_unsigned_under_good_entry_is_bogus() {
    let entry = good_entry();
    let verdict = entry.validate_key_for(&a_rrset(None)).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Bogus);
    assert_eq!(verdict.ede, ede::RRSIGS_MISSING);
}

#[test]
fn test_unsigned_under_bad_entry_is_bogus_with_entry_reason() {
    let mut entry = KeyEntry::bad_entry(zone(), RecordClass::IN, 300);
    entry.set_bad_reason(ede::DNSKEY_MISSING, "could not establish a chain of trust");

    let verdict = entry.validate_key_for(&a_rrset(None)).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Bogus);
    assert_eq!(verdict.ede, ede::DNSKEY_MISSING);
    assert!(verdict
        .reason
        .as_deref()
        .unwrap()
        .contains("could not establish a chain of trust"));
}

#[test]
fn test_secure_synthesized_cname_stays_secure() {
    // a CNAME minted from a validated DNAME has no signature of its own
    let entry = good_entry();
    let mut set = cname_rrset();
    set.set_security_status(SecurityStatus::Secure);

    let verdict = entry.validate_key_for(&set).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Secure);
    assert_eq!(verdict.ede, ede::NONE);
    assert!(verdict.reason.is_none());
}

#[test]
fn test_unsigned_unvalidated_cname_is_not_exempt() {
    let entry = good_entry();
    let set = cname_rrset(); // status stays UNCHECKED

    let verdict = entry.validate_key_for(&set).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Bogus);
    assert_eq!(verdict.ede, ede::RRSIGS_MISSING);
}

#[test]
fn test_signed_under_bad_entry_is_bogus() {
    let mut entry = KeyEntry::bad_entry(zone(), RecordClass::IN, 300);
    entry.set_bad_reason(ede::DNSSEC_BOGUS, "all signatures failed");

    let verdict = entry.validate_key_for(&a_rrset(Some(zone()))).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Bogus);
    assert_eq!(verdict.ede, ede::DNSSEC_BOGUS);
    let reason = verdict.reason.unwrap();
    assert!(reason.contains("bad key at example.com."), "{reason}");
}

#[test]
fn test_signed_under_null_entry_is_insecure() {
    let entry = KeyEntry::null_entry(zone(), RecordClass::IN, 300);
    let verdict = entry.validate_key_for(&a_rrset(Some(zone()))).unwrap();
    assert_eq!(verdict.status, SecurityStatus::Insecure);
}

#[test]
fn test_signed_under_good_entry_defers_to_signature_verification() {
    let entry = good_entry();
    assert!(entry.validate_key_for(&a_rrset(Some(zone()))).is_none());
}

#[test]
fn test_cache_equality_ignores_key_material() {
    let null_a = KeyEntry::null_entry(zone(), RecordClass::IN, 300);
    let null_b = KeyEntry::null_entry(zone(), RecordClass::IN, 900);
    assert_eq!(null_a, null_b);

    let mut tagged = KeyEntry::null_entry(zone(), RecordClass::IN, 300);
    tagged.set_bad_reason(ede::DNSSEC_BOGUS, "poisoned");
    assert_ne!(null_a, tagged);

    assert_ne!(null_a, KeyEntry::bad_entry(zone(), RecordClass::IN, 300));
    assert_ne!(null_a, good_entry());
}
