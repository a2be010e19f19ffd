//! Extended DNS Error codes (RFC 8914) produced by the validator.

/// Marker for "no extended error applies"
pub const NONE: i32 = -1;

/// Unsupported DNSKEY algorithm
pub const UNSUPPORTED_DNSKEY_ALGORITHM: i32 = 1;

/// Unsupported DS digest type
pub const UNSUPPORTED_DS_DIGEST_TYPE: i32 = 2;

/// DNSSEC validation failed for a reason with no more specific code
pub const DNSSEC_BOGUS: i32 = 6;

/// All signatures for the data have expired
pub const SIGNATURE_EXPIRED: i32 = 7;

/// No signature for the data is valid yet
pub const SIGNATURE_NOT_YET_VALID: i32 = 8;

/// No DNSKEY matching the DS or RRSIG records could be found
pub const DNSKEY_MISSING: i32 = 9;

/// The RRset lacked covering RRSIG records
pub const RRSIGS_MISSING: i32 = 10;
