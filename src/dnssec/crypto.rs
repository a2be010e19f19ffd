use ring::signature::{RsaPublicKeyComponents, UnparsedPublicKey};
use tracing::trace;

use super::algorithm::DnsSecAlgorithm;
use super::errors::{CryptoError, Result};
use super::records::{Dnskey, Rrsig};
use super::ede;

/// Verifies one (signed-bytes, signature, key) triple.
///
/// Implementations are pure functions of their inputs; the temporal validity
/// window of the signature is checked here against `now` (seconds since the
/// epoch, compared in RFC 1982 serial arithmetic).
pub trait CryptoVerifier: Send + Sync {
    fn verify(&self, sig: &Rrsig, key: &Dnskey, message: &[u8], now: u32) -> Result<()>;
}

/// The ring-backed verifier: RSA PKCS#1 (algorithms 5, 7, 8, 10), ECDSA
/// P-256/P-384 (13, 14) and Ed25519 (15). DSA and GOST have no primitive in
/// ring and report `UnsupportedAlgorithm`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RingVerifier;

impl CryptoVerifier for RingVerifier {
    fn verify(&self, sig: &Rrsig, key: &Dnskey, message: &[u8], now: u32) -> Result<()> {
        if key.protocol != 3 {
            return Err(CryptoError::InvalidKey(ede::DNSSEC_BOGUS));
        }
        if key.algorithm != sig.algorithm || key.key_tag != sig.key_tag {
            return Err(CryptoError::KeyMismatch);
        }

        check_validity_window(sig, now)?;

        let algorithm = DnsSecAlgorithm::from_u8(sig.algorithm)
            .ok_or(CryptoError::UnsupportedAlgorithm(sig.algorithm))?;

        match algorithm {
            DnsSecAlgorithm::RsaSha1
            | DnsSecAlgorithm::RsaSha1Nsec3Sha1
            | DnsSecAlgorithm::RsaSha256
            | DnsSecAlgorithm::RsaSha512 => {
                let params = algorithm
                    .rsa_params()
                    .ok_or(CryptoError::UnsupportedAlgorithm(sig.algorithm))?;
                let (e, n) = split_rsa_key(&key.public_key)?;
                RsaPublicKeyComponents { n, e }
                    .verify(params, message, &sig.signature)
                    .map_err(|_| CryptoError::BadSignature)
            }
            DnsSecAlgorithm::EcdsaP256Sha256 | DnsSecAlgorithm::EcdsaP384Sha384 => {
                let component_len = algorithm
                    .component_len()
                    .ok_or(CryptoError::UnsupportedAlgorithm(sig.algorithm))?;
                let signature = normalize_split_signature(&sig.signature, component_len)?;

                // DNSKEY stores the uncompressed point without the 0x04 tag
                let mut point = Vec::with_capacity(1 + key.public_key.len());
                point.push(0x04);
                point.extend_from_slice(&key.public_key);

                let verification = algorithm
                    .ring_verification()
                    .ok_or(CryptoError::UnsupportedAlgorithm(sig.algorithm))?;
                UnparsedPublicKey::new(verification, &point)
                    .verify(message, &signature)
                    .map_err(|_| CryptoError::BadSignature)
            }
            DnsSecAlgorithm::Ed25519 => {
                let verification = algorithm
                    .ring_verification()
                    .ok_or(CryptoError::UnsupportedAlgorithm(sig.algorithm))?;
                UnparsedPublicKey::new(verification, &key.public_key)
                    .verify(message, &sig.signature)
                    .map_err(|_| CryptoError::BadSignature)
            }
            _ => Err(CryptoError::UnsupportedAlgorithm(sig.algorithm)),
        }
    }
}

/// Check `inception <= now <= expiration` in RFC 1982 serial arithmetic
pub fn check_validity_window(sig: &Rrsig, now: u32) -> Result<()> {
    if serial_lt(now, sig.inception) {
        return Err(CryptoError::SignatureNotYetValid);
    }
    if serial_lt(sig.expiration, now) {
        return Err(CryptoError::SignatureExpired);
    }
    Ok(())
}

/// RFC 1982 serial comparison for 32-bit timestamps
fn serial_lt(a: u32, b: u32) -> bool {
    (a < b && b - a < 0x8000_0000) || (a > b && a - b > 0x8000_0000)
}

/// Split an RFC 3110 RSA key into (exponent, modulus)
fn split_rsa_key(key: &[u8]) -> Result<(&[u8], &[u8])> {
    let bad = CryptoError::InvalidKey(ede::DNSSEC_BOGUS);
    let (exp_len, exp_start) = match key.first() {
        Some(0) => {
            if key.len() < 3 {
                return Err(bad);
            }
            (u16::from_be_bytes([key[1], key[2]]) as usize, 3)
        }
        Some(&len) => (len as usize, 1),
        None => return Err(bad),
    };

    let mod_start = exp_start + exp_len;
    if exp_len == 0 || mod_start >= key.len() {
        return Err(CryptoError::InvalidKey(ede::DNSSEC_BOGUS));
    }
    Ok((&key[exp_start..mod_start], &key[mod_start..]))
}

/// Bring a two-component (r, s)-style signature into the fixed
/// `2 * component_len` wire form the primitives expect.
///
/// Signers occasionally emit components with leading zero bytes trimmed
/// (undersized) or with an extra zero byte protecting the sign bit
/// (oversized), either as a bare concatenation or wrapped in a DER
/// SEQUENCE. Each component is re-padded to exactly `component_len` bytes.
pub fn normalize_split_signature(raw: &[u8], component_len: usize) -> Result<Vec<u8>> {
    if raw.len() == 2 * component_len {
        return Ok(raw.to_vec());
    }

    if raw.first() == Some(&0x30) {
        if let Ok((r, s)) = parse_der_pair(raw) {
            trace!("re-padding DER signature components to {component_len} bytes");
            let mut out = pad_component(r, component_len)?;
            out.extend_from_slice(&pad_component(s, component_len)?);
            return Ok(out);
        }
    }

    if raw.len() % 2 == 0 && !raw.is_empty() {
        trace!(
            "re-padding {}-byte split signature to 2x{component_len} bytes",
            raw.len()
        );
        let half = raw.len() / 2;
        let mut out = pad_component(&raw[..half], component_len)?;
        out.extend_from_slice(&pad_component(&raw[half..], component_len)?);
        return Ok(out);
    }

    Err(CryptoError::MalformedSignature)
}

/// Normalize an RFC 2536 DSA signature: the T parameter octet followed by
/// the R and S components re-padded to 20 bytes each.
pub fn normalize_dsa_signature(raw: &[u8]) -> Result<Vec<u8>> {
    const DSA_COMPONENT_LEN: usize = 20;
    if raw.is_empty() {
        return Err(CryptoError::MalformedSignature);
    }
    if raw.len() == 1 + 2 * DSA_COMPONENT_LEN {
        return Ok(raw.to_vec());
    }
    let mut out = vec![raw[0]];
    out.extend_from_slice(&normalize_split_signature(&raw[1..], DSA_COMPONENT_LEN)?);
    Ok(out)
}

/// Strip leading zeros and left-pad a big-endian integer to `len` bytes
fn pad_component(component: &[u8], len: usize) -> Result<Vec<u8>> {
    let significant: &[u8] = {
        let first_nonzero = component.iter().position(|&b| b != 0);
        match first_nonzero {
            Some(at) => &component[at..],
            None => &[],
        }
    };
    if significant.len() > len {
        return Err(CryptoError::MalformedSignature);
    }
    let mut out = vec![0u8; len - significant.len()];
    out.extend_from_slice(significant);
    Ok(out)
}

/// Extract (r, s) from a DER `SEQUENCE { INTEGER, INTEGER }`
fn parse_der_pair(raw: &[u8]) -> Result<(&[u8], &[u8])> {
    let malformed = CryptoError::MalformedSignature;
    // SEQUENCE header with a single-byte length
    if raw.len() < 2 || raw[0] != 0x30 {
        return Err(malformed);
    }
    let body_len = raw[1] as usize;
    if raw[1] & 0x80 != 0 || body_len != raw.len() - 2 {
        return Err(CryptoError::MalformedSignature);
    }

    let body = &raw[2..];
    let (r, rest) = parse_der_int(body)?;
    let (s, rest) = parse_der_int(rest)?;
    if !rest.is_empty() {
        return Err(CryptoError::MalformedSignature);
    }
    Ok((r, s))
}

fn parse_der_int(data: &[u8]) -> Result<(&[u8], &[u8])> {
    if data.len() < 2 || data[0] != 0x02 {
        return Err(CryptoError::MalformedSignature);
    }
    let len = data[1] as usize;
    if data[1] & 0x80 != 0 || data.len() < 2 + len {
        return Err(CryptoError::MalformedSignature);
    }
    Ok((&data[2..2 + len], &data[2 + len..]))
}
