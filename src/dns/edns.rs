use super::ParseError;

/// EDNS0 OPT pseudo-record state (RFC 6891)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdnsOpt {
    /// UDP payload size the sender can handle
    pub udp_payload_size: u16,
    /// Extended RCODE (high 8 bits)
    pub extended_rcode: u8,
    /// EDNS version, currently 0
    pub version: u8,
    /// EDNS flags
    pub flags: u16,
    /// Attached options
    pub options: Vec<EdnsOption>,
}

/// A single EDNS option: code plus opaque data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

/// Option codes used by this crate
pub mod option_code {
    /// DNSSEC algorithm understood (RFC 6975)
    pub const DAU: u16 = 5;
    /// DS hash algorithm understood (RFC 6975)
    pub const DHU: u16 = 6;
    /// NSEC3 hash algorithm understood (RFC 6975)
    pub const N3U: u16 = 7;
    /// Extended DNS errors (RFC 8914)
    pub const EDE: u16 = 15;
}

impl EdnsOpt {
    pub fn new() -> Self {
        Self {
            udp_payload_size: 4096,
            extended_rcode: 0,
            version: 0,
            flags: 0,
            options: Vec::new(),
        }
    }

    /// Check if the DNSSEC OK (DO) flag is set
    pub fn do_flag(&self) -> bool {
        (self.flags & 0x8000) != 0
    }

    /// Set the DNSSEC OK (DO) flag
    pub fn set_do_flag(&mut self, value: bool) {
        if value {
            self.flags |= 0x8000;
        } else {
            self.flags &= !0x8000;
        }
    }

    pub fn add_option(&mut self, code: u16, data: Vec<u8>) {
        self.options.push(EdnsOption { code, data });
    }

    pub fn find_option(&self, code: u16) -> Option<&EdnsOption> {
        self.options.iter().find(|opt| opt.code == code)
    }
}

/// The cryptographic-algorithm understanding signal of RFC 6975: one of the
/// DAU, DHU or N3U options carrying the algorithm identifiers the sender can
/// validate. The option data is the raw sequence of 1-byte identifiers; the
/// count is inferred from the option length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlgorithmSignal {
    code: u16,
    algorithms: Vec<u8>,
}

impl AlgorithmSignal {
    /// Create a signal option. `code` must be one of DAU, DHU or N3U.
    pub fn new(code: u16, algorithms: Vec<u8>) -> Result<Self, ParseError> {
        match code {
            option_code::DAU | option_code::DHU | option_code::N3U => {
                Ok(Self { code, algorithms })
            }
            other => Err(ParseError::InvalidOption(format!(
                "option {other} is not DAU, DHU or N3U"
            ))),
        }
    }

    /// Decode from a stored EDNS option
    pub fn from_option(option: &EdnsOption) -> Result<Self, ParseError> {
        Self::new(option.code, option.data.clone())
    }

    /// Encode into an EDNS option
    pub fn to_option(&self) -> EdnsOption {
        EdnsOption {
            code: self.code,
            data: self.algorithms.clone(),
        }
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn algorithms(&self) -> &[u8] {
        &self.algorithms
    }
}
