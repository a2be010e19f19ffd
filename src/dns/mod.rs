pub mod edns;
pub mod enums;
pub mod message;
pub mod name;
pub mod record;
pub mod rrset;

pub use edns::{AlgorithmSignal, EdnsOpt, EdnsOption};
pub use enums::{RecordClass, RecordType};
pub use message::{Message, Question};
pub use name::Name;
pub use record::Record;
pub use rrset::RRset;

use thiserror::Error;

/// Errors from building or interpreting DNS data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid domain name: {0}")]
    InvalidName(String),

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("invalid EDNS option: {0}")]
    InvalidOption(String),
}
