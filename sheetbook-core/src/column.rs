//! Spreadsheet column letters.
//!
//! Column letters use bijective base-26: `A` = 1, `Z` = 26, `AA` = 27.
//! Range addresses use the letters; formatting requests use a zero-based
//! index. [`ColumnLetter::zero_based`] is the only place the two meet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AdapterError, AdapterResult};

/// Decode column letters into a 1-based column index.
///
/// Lowercase input is accepted. Empty strings, non-letters and values that
/// overflow `u32` are rejected.
pub fn column_letter_to_index(letters: &str) -> AdapterResult<u32> {
    let invalid = || AdapterError::InvalidColumnLetters {
        letters: letters.to_string(),
    };

    if letters.is_empty() {
        return Err(invalid());
    }

    let mut index: u32 = 0;
    for byte in letters.bytes() {
        if !byte.is_ascii_alphabetic() {
            return Err(invalid());
        }
        let digit = u32::from(byte.to_ascii_uppercase() - b'A') + 1;
        index = index
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(invalid)?;
    }
    Ok(index)
}

/// Encode a 1-based column index as column letters.
///
/// Index 0 has no letter form; it is clamped to `A`.
pub fn column_index_to_letter(index: u32) -> String {
    let mut n = index.max(1);
    let mut buf = Vec::new();
    while n > 0 {
        n -= 1;
        buf.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    buf.reverse();
    buf.into_iter().map(char::from).collect()
}

/// A validated, uppercase column letter such as `C` or `AB`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnLetter(String);

impl ColumnLetter {
    pub fn parse(letters: &str) -> AdapterResult<Self> {
        column_letter_to_index(letters)?;
        Ok(Self(letters.to_ascii_uppercase()))
    }

    /// Column letter for a 1-based index.
    pub fn from_index(index: u32) -> Self {
        Self(column_index_to_letter(index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 1-based index, as used in A1 notation.
    pub fn index(&self) -> u32 {
        // Validated on construction.
        column_letter_to_index(&self.0).unwrap_or(1)
    }

    /// 0-based index, as used by grid formatting requests.
    pub fn zero_based(&self) -> u32 {
        self.index() - 1
    }
}

impl fmt::Display for ColumnLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ColumnLetter {
    type Error = AdapterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColumnLetter> for String {
    fn from(value: ColumnLetter) -> Self {
        value.0
    }
}
