//! Test result models: validated input records and aggregated statistics.

use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::validation::{self, Field};

use super::TestTimestamp;

/// A validated test result, ready to be persisted.
///
/// Only constructible through the field validators, so every instance
/// satisfies the non-empty and timestamp invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestResult {
    pub dev_type: String,
    pub operator: String,
    pub dt: TestTimestamp,
    pub success: bool,
}

impl NewTestResult {
    /// Validate raw values given in canonical field order
    /// (`dev_type`, `operator`, `dt`, `success`).
    pub fn from_raw(raw: [&str; 4]) -> Result<Self, ValidationError> {
        let [dev_type, operator, dt, success] = raw;
        Ok(Self {
            dev_type: validation::non_empty(Field::DevType, dev_type)?,
            operator: validation::non_empty(Field::Operator, operator)?,
            dt: validation::iso_timestamp(Field::Dt, dt)?,
            success: validation::int_flag(Field::Success, success)?,
        })
    }
}

/// Pass/fail counts for one device type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, FromQueryResult)]
pub struct AggregationRow {
    /// Device type the counts belong to
    pub dev_type: String,
    /// Total number of recorded runs (`successful + failed`)
    pub count: i64,
    /// Runs that passed
    pub successful: i64,
    /// Runs that failed
    pub failed: i64,
}
