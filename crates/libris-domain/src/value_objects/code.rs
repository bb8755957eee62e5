//! Sequential human-readable codes (`ID001`, `BK042`, ...)

use crate::constants::CODE_MIN_WIDTH;
use crate::error::{Error, Result};
use std::fmt;

/// A prefixed, zero-padded sequence number
///
/// The digit run is at least three wide and grows past 999 (`ID1000`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCode {
    prefix: &'static str,
    number: u64,
}

impl SequenceCode {
    /// First code for a prefix
    pub fn first(prefix: &'static str) -> Self {
        Self { prefix, number: 1 }
    }

    /// Parse an existing code carrying `prefix`
    pub fn parse(prefix: &'static str, code: &str) -> Result<Self> {
        let digits = code.strip_prefix(prefix).ok_or_else(|| {
            Error::invalid_argument(format!("Code '{code}' does not start with '{prefix}'"))
        })?;
        let number = digits
            .parse::<u64>()
            .map_err(|_| Error::invalid_argument(format!("Code '{code}' has no numeric part")))?;
        Ok(Self { prefix, number })
    }

    /// Code following the current maximum, or the first code when none exists
    pub fn next_after(prefix: &'static str, last: Option<&str>) -> Result<Self> {
        match last {
            Some(code) => Ok(Self::parse(prefix, code)?.next()),
            None => Ok(Self::first(prefix)),
        }
    }

    /// The successor of this code
    pub fn next(&self) -> Self {
        Self {
            prefix: self.prefix,
            number: self.number + 1,
        }
    }

    /// Numeric part
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl fmt::Display for SequenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:0width$}",
            self.prefix,
            self.number,
            width = CODE_MIN_WIDTH
        )
    }
}
