use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single symbol of a structural alphabet.
///
/// Letters are single ASCII alphanumeric characters. Only identity matters for
/// encoding and dependency estimation; the derived ordering is used to give
/// reference libraries a stable enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(char);

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LetterError {
    #[error("Letter must be a single character, got '{0}'")]
    NotSingleCharacter(String),
    #[error("Letter must be an ASCII alphanumeric character, got '{0}'")]
    InvalidCharacter(char),
}

/// The 25 letters of the M32K25 structural alphabet.
pub const M32K25: [Letter; 25] = [
    Letter('A'),
    Letter('B'),
    Letter('C'),
    Letter('D'),
    Letter('E'),
    Letter('F'),
    Letter('G'),
    Letter('H'),
    Letter('I'),
    Letter('J'),
    Letter('K'),
    Letter('L'),
    Letter('M'),
    Letter('N'),
    Letter('O'),
    Letter('P'),
    Letter('Q'),
    Letter('R'),
    Letter('S'),
    Letter('T'),
    Letter('U'),
    Letter('V'),
    Letter('W'),
    Letter('X'),
    Letter('Y'),
];

impl Letter {
    pub fn new(c: char) -> Result<Self, LetterError> {
        if c.is_ascii_alphanumeric() {
            Ok(Self(c))
        } else {
            Err(LetterError::InvalidCharacter(c))
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Letter {
    type Err = LetterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => Err(LetterError::NotSingleCharacter(s.to_string())),
        }
    }
}

impl TryFrom<char> for Letter {
    type Error = LetterError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::new(c)
    }
}

impl Serialize for Letter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.0)
    }
}

impl<'de> Deserialize<'de> for Letter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Letter::from_str(&s).map_err(serde::de::Error::custom)
    }
}
