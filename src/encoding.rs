//! Transport encoding for parameter values and labels.
//!
//! XML 1.0 cannot carry C0 control characters other than tab, line feed and
//! carriage return, not even as character references. Values containing one
//! are shipped base64-encoded (standard alphabet, padded, over the UTF-8
//! bytes) and flagged so the client can decode them. Everything else,
//! including non-Latin scripts and punctuation, passes through verbatim and
//! stays human-readable.
//!
//! # Example
//!
//! ```rust
//! use paramdoc::encoding::{decode, encode};
//!
//! let plain = encode("果物");
//! assert!(!plain.encoded);
//! assert_eq!(plain.text, "果物");
//!
//! let control = encode("\u{1a}");
//! assert!(control.encoded);
//! assert_eq!(control.text, "Gg==");
//! assert_eq!(decode(&control.text).unwrap(), "\u{1a}");
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// Output of [`encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// The raw text, or its base64 form when `encoded` is set.
    pub text: String,
    pub encoded: bool,
}

/// Errors from [`decode`]. Encoding itself cannot fail.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded bytes are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// True for characters that may not appear in an XML attribute at all.
pub fn is_illegal_control(c: char) -> bool {
    c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')
}

/// Whether `raw` must be transport-encoded.
pub fn needs_encoding(raw: &str) -> bool {
    raw.chars().any(is_illegal_control)
}

/// Encode `raw` if it contains illegal control characters.
pub fn encode(raw: &str) -> Encoded {
    if needs_encoding(raw) {
        Encoded {
            text: force_encode(raw),
            encoded: true,
        }
    } else {
        Encoded {
            text: raw.to_string(),
            encoded: false,
        }
    }
}

/// Base64-encode `raw` unconditionally.
pub fn force_encode(raw: &str) -> String {
    BASE64.encode(raw.as_bytes())
}

/// Encode raw bytes. Binary values are always shipped encoded.
pub fn encode_bytes(raw: &[u8]) -> Encoded {
    Encoded {
        text: BASE64.encode(raw),
        encoded: true,
    }
}

/// Reverse [`encode`] for a value flagged as encoded.
pub fn decode(text: &str) -> Result<String, DecodeError> {
    Ok(String::from_utf8(decode_bytes(text)?)?)
}

/// Reverse [`encode_bytes`], or [`encode`] without requiring UTF-8.
pub fn decode_bytes(text: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(BASE64.decode(text)?)
}
