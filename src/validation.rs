//! Field validators for raw test result input.
//!
//! Both the HTTP insert path and the CSV import mapper funnel raw text
//! through these functions, in the canonical field order given by
//! [`Field::ALL`].

use std::fmt;

use crate::error::ValidationError;
use crate::models::TestTimestamp;

/// A test result field, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    DevType,
    Operator,
    Dt,
    Success,
}

impl Field {
    /// Canonical field order of a test result record.
    pub const ALL: [Field; 4] = [Field::DevType, Field::Operator, Field::Dt, Field::Success];

    /// Column / form field name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DevType => "dev_type",
            Self::Operator => "operator",
            Self::Dt => "dt",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Require a value that is not blank. The value is returned untrimmed.
pub fn non_empty(field: Field, raw: &str) -> Result<String, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::new(field, "string must be not empty"));
    }
    Ok(raw.to_string())
}

/// Parse an ISO-8601 date-time, keeping any offset as given.
pub fn iso_timestamp(field: Field, raw: &str) -> Result<TestTimestamp, ValidationError> {
    TestTimestamp::parse_iso(raw).map_err(|message| ValidationError::new(field, message))
}

/// Interpret integer text as a flag: zero is `false`, anything else `true`.
pub fn int_flag(field: Field, raw: &str) -> Result<bool, ValidationError> {
    let invalid = || ValidationError::new(field, format!("expected an integer, got '{}'", raw));

    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    Ok(digits.bytes().any(|b| b != b'0'))
}
