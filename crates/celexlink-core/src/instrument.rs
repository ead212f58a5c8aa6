//! EU legal instrument types and their CELEX sector-3 type letters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of legal act a citation refers to.
///
/// Serialised as the single CELEX letter used in sector-3 identifiers
/// (`3` + year + letter + number), e.g. `32016R0679`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstrumentType {
    #[serde(rename = "L")]
    Directive,
    #[serde(rename = "R")]
    Regulation,
    #[serde(rename = "D")]
    Decision,
}

impl InstrumentType {
    /// CELEX type letter.
    pub fn letter(&self) -> char {
        match self {
            Self::Directive => 'L',
            Self::Regulation => 'R',
            Self::Decision => 'D',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'L' => Some(Self::Directive),
            'R' => Some(Self::Regulation),
            'D' => Some(Self::Decision),
            _ => None,
        }
    }

    /// Map an instrument keyword to its type.
    ///
    /// Case-sensitive; singular and plural forms map to the same type.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "Directive" | "Directives" => Some(Self::Directive),
            "Regulation" | "Regulations" => Some(Self::Regulation),
            "Decision" | "Decisions" => Some(Self::Decision),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directive => "Directive",
            Self::Regulation => "Regulation",
            Self::Decision => "Decision",
        }
    }
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known instrument type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown instrument type: {0:?} (expected L, R, D or Directive, Regulation, Decision)")]
pub struct UnknownInstrumentType(pub String);

impl FromStr for InstrumentType {
    type Err = UnknownInstrumentType;

    /// Accepts either the CELEX letter or the keyword, e.g. `"R"` or `"Regulation"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && let Some(ty) = Self::from_letter(c.to_ascii_uppercase())
        {
            return Ok(ty);
        }
        Self::from_keyword(s).ok_or_else(|| UnknownInstrumentType(s.to_string()))
    }
}
