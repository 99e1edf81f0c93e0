//! Text decoding for character field slices

use encoding::all::ISO_8859_1;
use encoding::{DecoderTrap, EncoderTrap, Encoding};
use serde::{Deserialize, Serialize};

/// Character set used for character field bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Strict UTF-8 (plain ASCII files decode the same way)
    #[default]
    Utf8,
    /// ISO-8859-1, every byte maps to one character
    Latin1,
}

impl TextEncoding {
    pub fn decode(self, bytes: &[u8]) -> Result<String, String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| format!("invalid UTF-8: {e}")),
            TextEncoding::Latin1 => ISO_8859_1
                .decode(bytes, DecoderTrap::Strict)
                .map_err(|e| format!("invalid ISO-8859-1: {e}")),
        }
    }

    pub fn encode(self, text: &str) -> Result<Vec<u8>, String> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => ISO_8859_1
                .encode(text, EncoderTrap::Strict)
                .map_err(|e| format!("cannot encode as ISO-8859-1: {e}")),
        }
    }
}

impl std::str::FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "latin1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            other => Err(format!("unknown text encoding: {other}")),
        }
    }
}

/// Strip whitespace and NUL padding from both ends
pub fn trim_padding(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}
