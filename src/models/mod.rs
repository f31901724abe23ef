//! Domain models for the statx server.

pub mod test_result;
pub mod timestamp;

// Re-export commonly used types
pub use test_result::{AggregationRow, NewTestResult};
pub use timestamp::TestTimestamp;
