//! Test timestamp as submitted by clients and import files.
//!
//! Timestamps are kept exactly as given: naive when no offset was supplied,
//! otherwise together with that offset. No conversion to UTC happens.

use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Date and time of a test run, with the offset it was reported in (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestTimestamp {
    local: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl TestTimestamp {
    /// Timestamp without offset.
    pub fn naive(local: NaiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    /// Timestamp carrying the offset it was reported in.
    pub fn with_offset(local: NaiveDateTime, offset: FixedOffset) -> Self {
        Self {
            local,
            offset: Some(offset),
        }
    }

    pub fn local(&self) -> NaiveDateTime {
        self.local
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Parse an ISO-8601 date or date-time.
    ///
    /// Accepts extended (`2020-02-20T10:00:00`) and basic (`20200220T100000`)
    /// forms, a `T` or space separator, hour, minute or second precision, a
    /// `.` or `,` fraction and an optional `Z` or numeric offset. A bare date
    /// means midnight.
    pub fn parse_iso(raw: &str) -> Result<Self, String> {
        let invalid = || format!("invalid ISO-8601 date-time: '{}'", raw);

        // chrono only reads `.` fractions and numeric offsets
        let normalized = match raw.strip_suffix(['Z', 'z']) {
            Some(rest) => format!("{}+00:00", rest),
            None => raw.to_string(),
        }
        .replacen(',', ".", 1);

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(&normalized, format) {
                return Ok(Self::naive(date.and_time(NaiveTime::MIN)));
            }
        }

        LAYOUTS
            .iter()
            .find_map(|layout| layout.parse(&normalized))
            .ok_or_else(invalid)
    }

    /// Canonical storage form: `YYYY-MM-DD HH:MM:SS[.f][±HH:MM]`.
    pub fn to_canonical_string(&self) -> String {
        let local = self.local.format("%Y-%m-%d %H:%M:%S%.f");
        match self.offset {
            Some(offset) => format!("{}{}", local, offset),
            None => local.to_string(),
        }
    }
}

impl fmt::Display for TestTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for TestTimestamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_iso(s)
    }
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Time formats, and whether they carry minutes.
const TIME_FORMATS: [(&str, bool); 5] = [
    ("%H:%M:%S%.f", true),
    ("%H:%M", true),
    ("%H%M%S%.f", true),
    ("%H%M", true),
    ("%H", false),
];

const OFFSET_FORMATS: [&str; 3] = ["", "%:z", "%z"];

/// Every accepted date-time layout.
static LAYOUTS: LazyLock<Vec<Layout>> = LazyLock::new(|| {
    let mut layouts = Vec::new();
    for date in DATE_FORMATS {
        for separator in ['T', ' '] {
            for (time, has_minutes) in TIME_FORMATS {
                for offset in OFFSET_FORMATS {
                    layouts.push(Layout {
                        format: format!("{}{}{}{}", date, separator, time, offset),
                        has_minutes,
                        has_offset: !offset.is_empty(),
                    });
                }
            }
        }
    }
    layouts
});

struct Layout {
    format: String,
    has_minutes: bool,
    has_offset: bool,
}

impl Layout {
    fn parse(&self, s: &str) -> Option<TestTimestamp> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, s, StrftimeItems::new(&self.format)).ok()?;
        if !self.has_minutes {
            parsed.set_minute(0).ok()?;
        }

        let local = parsed
            .to_naive_date()
            .ok()?
            .and_time(parsed.to_naive_time().ok()?);

        if self.has_offset {
            Some(TestTimestamp::with_offset(local, parsed.to_fixed_offset().ok()?))
        } else {
            Some(TestTimestamp::naive(local))
        }
    }
}
