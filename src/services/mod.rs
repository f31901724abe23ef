//! Business logic services.

pub mod import;

pub use import::{
    ColumnMapping, CsvSource, ImportMapper, ImportSummary, InvalidRowPolicy, import_records,
};
