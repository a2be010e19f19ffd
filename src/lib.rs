pub mod config;
pub mod dns;
pub mod dnssec;
pub mod resolver;

pub use dnssec::SignatureVerifier;
pub use resolver::{ExtendedResolver, Resolver};
