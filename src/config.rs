use std::collections::HashMap;

use tracing::warn;

/// Bound on the number of RRSIGs examined per RRset
/// (`SignatureVerifier::init`)
pub const MAX_VALIDATE_RRSIGS_PROPERTY: &str = "dnsjava.dnssec.max_validate_rrsigs";

/// Configuration is a plain string-to-string map read once at
/// initialization; there is no dynamic reconfiguration.
pub type Properties = HashMap<String, String>;

/// Read an integer property, falling back to `default` when the key is
/// absent or unparseable
pub fn int_property(properties: &Properties, key: &str, default: usize) -> usize {
    match properties.get(key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring unparseable value {raw:?} for {key}");
                default
            }
        },
    }
}
