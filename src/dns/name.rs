use std::fmt;
use std::hash::{Hash, Hasher};

use super::ParseError;

/// Maximum length of a single label in bytes
pub const MAX_LABEL_LEN: usize = 63;

/// Maximum length of a name in wire form
pub const MAX_NAME_LEN: usize = 255;

/// A fully-qualified domain name.
///
/// Labels keep the case they were created with; comparisons and hashing are
/// ASCII case-insensitive per RFC 1035. The root name has zero labels.
#[derive(Clone, Debug)]
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    /// The root name (".")
    pub fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Parse a name from presentation format ("www.example.com." or "." for
    /// the root)
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        if s.is_empty() {
            return Err(ParseError::InvalidName("empty name".to_string()));
        }
        if s == "." {
            return Ok(Self::root());
        }

        let trimmed = s.strip_suffix('.').unwrap_or(s);
        let mut labels = Vec::new();
        let mut wire_len = 1; // trailing root byte
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(ParseError::InvalidName(format!("empty label in {s:?}")));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(ParseError::InvalidName(format!("label too long in {s:?}")));
            }
            if !label.is_ascii() {
                return Err(ParseError::InvalidName(format!("non-ASCII label in {s:?}")));
            }
            wire_len += 1 + label.len();
            labels.push(label.to_string());
        }

        if wire_len > MAX_NAME_LEN {
            return Err(ParseError::InvalidName(format!("name too long: {s:?}")));
        }

        Ok(Self { labels })
    }

    /// Build a name from pre-validated labels, leftmost first
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Parse an uncompressed wire-format name starting at the beginning of
    /// `data`. Returns the name and the number of bytes consumed.
    pub fn from_wire(data: &[u8]) -> Result<(Self, usize), ParseError> {
        let mut labels = Vec::new();
        let mut pos = 0;

        loop {
            let len = *data
                .get(pos)
                .ok_or_else(|| ParseError::InvalidName("truncated wire name".to_string()))?
                as usize;
            pos += 1;
            if len == 0 {
                break;
            }
            // compression pointers never appear in rdata or canonical names
            if len > MAX_LABEL_LEN {
                return Err(ParseError::InvalidName(format!(
                    "invalid label length {len}"
                )));
            }
            let end = pos + len;
            if end > data.len() {
                return Err(ParseError::InvalidName("truncated label".to_string()));
            }
            labels.push(String::from_utf8_lossy(&data[pos..end]).to_string());
            pos = end;
        }

        Ok((Self { labels }, pos))
    }

    /// Number of labels, excluding the implicit root
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Whether this name starts with the `*` wildcard label
    pub fn is_wildcard(&self) -> bool {
        self.labels.first().map(|l| l == "*").unwrap_or(false)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// True if `self` equals `other` or lies beneath it in the tree
    pub fn is_subdomain_of(&self, other: &Name) -> bool {
        let n = other.labels.len();
        if n > self.labels.len() {
            return false;
        }
        self.labels[self.labels.len() - n..]
            .iter()
            .zip(other.labels.iter())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// The canonical owner for signature verification: keep the rightmost
    /// `label_count` labels and prepend `*` (RFC 4035 §5.3.2 wildcard rule)
    pub fn wildcard_form(&self, label_count: u8) -> Name {
        let keep = label_count as usize;
        debug_assert!(keep < self.labels.len());
        let mut labels = Vec::with_capacity(keep + 1);
        labels.push("*".to_string());
        labels.extend(self.labels[self.labels.len() - keep..].iter().cloned());
        Self { labels }
    }

    /// Append the wire form to `out`; `lowercase` selects canonical casing
    pub fn write_wire(&self, out: &mut Vec<u8>, lowercase: bool) {
        for label in &self.labels {
            out.push(label.len() as u8);
            if lowercase {
                out.extend(label.bytes().map(|b| b.to_ascii_lowercase()));
            } else {
                out.extend_from_slice(label.as_bytes());
            }
        }
        out.push(0);
    }

    /// Canonical (lowercased) wire form
    pub fn to_canonical_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        self.write_wire(&mut out, true);
        out
    }

    /// Length of the wire form in bytes
    pub fn wire_len(&self) -> usize {
        1 + self.labels.iter().map(|l| 1 + l.len()).sum::<usize>()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(other.labels.iter())
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in &self.labels {
            for b in label.bytes() {
                state.write_u8(b.to_ascii_lowercase());
            }
            state.write_u8(0);
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }
        for label in &self.labels {
            write!(f, "{label}.")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Name {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
