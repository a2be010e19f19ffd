use tracing::trace;

use crate::dns::RRset;

use super::records::Rrsig;

/// Produce the byte stream an RRSIG signature is computed over
/// (RFC 4035 §5.3.2).
///
/// The stream is the signature's own rdata up to (not including) the
/// signature bytes, followed by every record of the set in canonical form:
/// owner wildcard-normalized against the signature's label count and
/// lowercased, TTL replaced by the original TTL from the signature, rdata
/// with embedded names lowercased. Records are sorted by their canonical
/// wire form, so the output does not depend on insertion order, and
/// attached RRSIGs never participate.
pub fn digest_rrset(sig: &Rrsig, rrset: &RRset) -> Vec<u8> {
    let mut out = sig.presig_wire();

    let Some(name) = rrset.name() else {
        return out;
    };

    // RFC 4035 §5.3.2: a label count below the owner's own means the data
    // was synthesized from a wildcard
    let owner = if name.label_count() > sig.labels as usize {
        trace!(
            "canonicalizing wildcard expansion of <{}> to {} labels",
            name,
            sig.labels
        );
        name.wildcard_form(sig.labels)
    } else {
        name.clone()
    };

    let mut rendered: Vec<Vec<u8>> = rrset
        .records()
        .iter()
        .map(|record| record.canonical_wire(&owner, sig.original_ttl))
        .collect();

    rendered.sort();
    rendered.dedup();

    for record in rendered {
        out.extend_from_slice(&record);
    }
    out
}
