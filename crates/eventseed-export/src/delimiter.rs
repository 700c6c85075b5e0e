//! The field delimiter shared by every table of one export.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// A single-byte field delimiter.
///
/// Any ASCII character works except the quote character and line breaks,
/// which the record layer reserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Delimiter(u8);

impl Delimiter {
    /// Comma, the default.
    pub const COMMA: Self = Self(b',');

    /// Semicolon.
    pub const SEMICOLON: Self = Self(b';');

    /// The delimiter as a byte.
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// The delimiter as a character.
    pub const fn as_char(self) -> char {
        self.0 as char
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::COMMA
    }
}

impl TryFrom<char> for Delimiter {
    type Error = ExportError;

    fn try_from(delimiter: char) -> Result<Self, Self::Error> {
        if matches!(delimiter, '"' | '\n' | '\r') {
            return Err(ExportError::InvalidDelimiter { delimiter });
        }
        u8::try_from(delimiter)
            .ok()
            .filter(u8::is_ascii)
            .map(Self)
            .ok_or(ExportError::InvalidDelimiter { delimiter })
    }
}

impl From<Delimiter> for char {
    fn from(delimiter: Delimiter) -> Self {
        delimiter.as_char()
    }
}

impl core::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
