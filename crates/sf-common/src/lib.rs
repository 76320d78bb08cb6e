use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// Addresses
// ============================================================================

const DELIM: char = ':';
const ESCAPE: char = '\\';

fn is_printable_ascii(ch: char) -> bool {
    (' '..='~').contains(&ch)
}

/// A hierarchical endpoint address: an ordered sequence of segments with the
/// most significant segment first.
///
/// Addresses are immutable and always contain at least one segment. Segments
/// are restricted to printable US-ASCII so the text form stays unambiguous.
///
/// The text form joins segments with colons and escapes literal colons and
/// backslashes with a backslash:
///
/// - `"one:two"` parses to `["one", "two"]`
/// - `"one\:two"` parses to `["one:two"]`
/// - `"one\\two"` parses to `["one\two"]`
/// - `"::"` parses to `["", "", ""]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    segments: Vec<String>,
}

impl Address {
    /// Build an address from segments.
    pub fn new<I, S>(segments: I) -> Result<Self, AddressError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(AddressError::Empty);
        }
        for segment in &segments {
            if let Some(ch) = segment.chars().find(|ch| !is_printable_ascii(*ch)) {
                return Err(AddressError::NotPrintable(ch));
            }
        }
        Ok(Self { segments })
    }

    /// Parse the escaped text form produced by [`Address::to_string`].
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut escape = false;

        for ch in text.chars() {
            if !is_printable_ascii(ch) {
                return Err(AddressError::NotPrintable(ch));
            }
            if escape {
                match ch {
                    DELIM | ESCAPE => current.push(ch),
                    other => return Err(AddressError::BadEscape(other)),
                }
                escape = false;
            } else {
                match ch {
                    ESCAPE => escape = true,
                    DELIM => segments.push(std::mem::take(&mut current)),
                    other => current.push(other),
                }
            }
        }

        if escape {
            return Err(AddressError::DanglingEscape);
        }
        segments.push(current);

        Ok(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The most significant segment. An address always has one.
    pub fn first(&self) -> &str {
        &self.segments[0]
    }

    pub fn segment(&self, idx: usize) -> Option<&str> {
        self.segments.get(idx).map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Copy of this address with `suffix`'s segments appended.
    pub fn append(&self, suffix: &Address) -> Address {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.iter().cloned());
        Address { segments }
    }

    /// `true` if this address is a (possibly equal) leading prefix of `other`.
    pub fn is_prefix_of(&self, other: &Address) -> bool {
        other.segments.len() >= self.segments.len()
            && other.segments[..self.segments.len()] == self.segments[..]
    }

    /// Copy of this address with `prefix` removed from the front. `None` if
    /// `prefix` does not apply or removing it would leave no segments.
    pub fn strip_prefix(&self, prefix: &Address) -> Option<Address> {
        if !prefix.is_prefix_of(self) || prefix.segments.len() == self.segments.len() {
            return None;
        }
        Some(Address {
            segments: self.segments[prefix.segments.len()..].to_vec(),
        })
    }
}

fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for ch in segment.chars() {
        if ch == DELIM || ch == ESCAPE {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                f.write_str(":")?;
            }
            f.write_str(&escape_segment(segment))?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Tagged message body. Routers dispatch only the `Request` kind; the other
/// kinds flow back out through the endpoint registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    Request(serde_json::Value),
    Response(serde_json::Value),
    Fault(String),
}

impl Payload {
    pub fn is_request(&self) -> bool {
        matches!(self, Payload::Request(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Request(_) => "request",
            Payload::Response(_) => "response",
            Payload::Fault(_) => "fault",
        }
    }
}

/// Immutable message envelope. Owned by the sender until handed to an
/// endpoint, then shared read-only with whatever processes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub source: Address,
    pub destination: Address,
    pub payload: Payload,
}

impl Message {
    pub fn new(source: Address, destination: Address, payload: Payload) -> Self {
        Self {
            source,
            destination,
            payload,
        }
    }

    /// Envelope for a reply: destination and source swapped, new payload.
    pub fn reply(&self, payload: Payload) -> Message {
        Message {
            source: self.destination.clone(),
            destination: self.source.clone(),
            payload,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address requires at least one segment")]
    Empty,

    #[error("address contains non-printable character {0:?}")]
    NotPrintable(char),

    #[error("unrecognized escape sequence \\{0}")]
    BadEscape(char),

    #[error("dangling escape at end of address")]
    DanglingEscape,
}
