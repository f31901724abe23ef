//! Bulk import of test results from tabular files.
//!
//! Import files may carry extra columns or the record fields in any order.
//! A [`ColumnMapping`] says which raw column feeds each canonical field; the
//! [`ImportMapper`] applies it and runs the field validators on every row.

use std::fs::File;
use std::path::Path;

use tracing::{info, warn};

use crate::db::DbPool;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::NewTestResult;
use crate::validation::Field;

/// Raw column index for each canonical field, in [`Field::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    columns: [usize; 4],
}

impl ColumnMapping {
    /// Columns already in canonical order.
    pub const IDENTITY: ColumnMapping = ColumnMapping {
        columns: [0, 1, 2, 3],
    };

    pub fn new(columns: [usize; 4]) -> Self {
        Self { columns }
    }

    /// Parse a column order such as `"1032"` or `"1, 0, 3, 2"`.
    pub fn parse(order: &str) -> AppResult<Self> {
        let order = order.trim();
        let incorrect = || {
            AppError::Configuration(format!(
                "Incorrect order specified: '{}'. Expected {} column indexes, e.g. '0123' or '0,1,2,3'",
                order,
                Field::ALL.len()
            ))
        };

        let indexes: Vec<usize> = if order.contains(',') {
            order
                .split(',')
                .map(|part| part.trim().parse::<usize>())
                .collect::<Result<_, _>>()
                .map_err(|_| incorrect())?
        } else {
            order
                .chars()
                .map(|c| c.to_digit(10).map(|d| d as usize))
                .collect::<Option<_>>()
                .ok_or_else(incorrect)?
        };

        let columns: [usize; 4] = indexes.try_into().map_err(|_| incorrect())?;
        Ok(Self { columns })
    }

    /// Raw column index feeding `field`.
    pub fn column_for(&self, field: Field) -> usize {
        self.columns[field as usize]
    }

    pub fn columns(&self) -> [usize; 4] {
        self.columns
    }
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Maps raw rows of a fixed width to validated test results.
#[derive(Debug, Clone)]
pub struct ImportMapper {
    mapping: ColumnMapping,
    width: usize,
}

impl ImportMapper {
    /// Create a mapper for rows shaped like `first_row` (the header, or the
    /// first data row when the file has none).
    ///
    /// Fails before any row is processed if the mapping points past the
    /// last column.
    pub fn new<S: AsRef<str>>(first_row: &[S], mapping: ColumnMapping) -> AppResult<Self> {
        let width = first_row.len();

        for field in Field::ALL {
            let column = mapping.column_for(field);
            if column >= width {
                return Err(AppError::Configuration(format!(
                    "Order index {} for field '{}' is out of range: file has {} column(s)",
                    column, field, width
                )));
            }
        }

        Ok(Self { mapping, width })
    }

    /// Number of columns the mapper was configured for.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mapping(&self) -> ColumnMapping {
        self.mapping
    }

    /// Map and validate one raw row found at `position` in the source.
    pub fn map_row<S: AsRef<str>>(
        &self,
        position: usize,
        row: &[S],
    ) -> Result<NewTestResult, ValidationError> {
        let mut raw: [&str; 4] = [""; 4];
        for (slot, field) in raw.iter_mut().zip(Field::ALL) {
            let column = self.mapping.column_for(field);
            *slot = row.get(column).map(|value| value.as_ref()).ok_or_else(|| {
                ValidationError::new(
                    field,
                    format!(
                        "column {} is missing, row has {} column(s)",
                        column,
                        row.len()
                    ),
                )
                .at_row(position)
            })?;
        }

        NewTestResult::from_raw(raw).map_err(|e| e.at_row(position))
    }

    /// Lazily map every row of a source, optionally skipping the first one.
    ///
    /// Row positions in errors count from the start of the source, so a
    /// skipped header is position 0.
    pub fn map_rows<I, S>(
        &self,
        rows: I,
        skip_first: bool,
    ) -> impl Iterator<Item = Result<NewTestResult, ValidationError>>
    where
        I: IntoIterator<Item = Vec<S>>,
        S: AsRef<str>,
    {
        let mapper = self.clone();
        rows.into_iter()
            .enumerate()
            .skip(usize::from(skip_first))
            .map(move |(position, row)| mapper.map_row(position, &row))
    }

    /// Like [`ImportMapper::map_rows`] for sources whose reads can fail, such
    /// as [`CsvSource`]. A read failure is passed through unchanged.
    pub fn try_map_rows<I, S, E>(
        &self,
        rows: I,
        skip_first: bool,
    ) -> impl Iterator<Item = AppResult<NewTestResult>>
    where
        I: IntoIterator<Item = Result<Vec<S>, E>>,
        S: AsRef<str>,
        E: Into<AppError>,
    {
        let mapper = self.clone();
        rows.into_iter()
            .enumerate()
            .skip(usize::from(skip_first))
            .map(move |(position, row)| -> AppResult<NewTestResult> {
                let row = match row {
                    Ok(row) => row,
                    Err(e) => return Err(e.into()),
                };
                Ok(mapper.map_row(position, &row)?)
            })
    }
}

/// Rows of a CSV file, read one record at a time.
///
/// Opening reads only the first record so a mapper can be built from it
/// before the rest of the file is touched. Iteration yields every row,
/// the first one included. Rows may differ in width.
pub struct CsvSource {
    path: String,
    first: Option<Vec<String>>,
    records: csv::StringRecordsIntoIter<File>,
}

impl CsvSource {
    pub fn open(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();

        let mut records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)
            .map_err(|e| read_error(&display, e))?
            .into_records();

        let first = records
            .next()
            .transpose()
            .map_err(|e| read_error(&display, e))?
            .map(|record| record_to_row(&record));

        Ok(Self {
            path: display,
            first,
            records,
        })
    }

    /// First row of the file, or `None` if it is empty.
    pub fn first_row(&self) -> Option<&[String]> {
        self.first.as_deref()
    }
}

impl Iterator for CsvSource {
    type Item = AppResult<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.first.take() {
            return Some(Ok(first));
        }
        let record = self.records.next()?;
        Some(
            record
                .map(|record| record_to_row(&record))
                .map_err(|e| read_error(&self.path, e)),
        )
    }
}

fn record_to_row(record: &csv::StringRecord) -> Vec<String> {
    record.iter().map(String::from).collect()
}

fn read_error(path: &str, e: csv::Error) -> AppError {
    AppError::Configuration(format!("Failed to read {}: {}", path, e))
}

/// How invalid rows are treated during an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidRowPolicy {
    /// Abort on the first invalid row; nothing is persisted.
    #[default]
    StopOnFirstError,
    /// Skip invalid rows and persist the rest.
    SkipInvalid,
}

/// Outcome of an import run.
#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Records persisted.
    pub inserted: u64,
    /// Rows rejected under [`InvalidRowPolicy::SkipInvalid`].
    pub skipped: Vec<ValidationError>,
}

/// Persist mapped records according to `policy`.
///
/// All accepted records are written in a single transaction. Only
/// validation failures can be skipped; any other error aborts the run.
pub async fn import_records<I, E>(
    pool: &DbPool,
    records: I,
    policy: InvalidRowPolicy,
) -> AppResult<ImportSummary>
where
    I: IntoIterator<Item = Result<NewTestResult, E>>,
    E: Into<AppError>,
{
    let mut accepted = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        let record: AppResult<NewTestResult> = record.map_err(Into::into);
        match record {
            Ok(record) => accepted.push(record),
            Err(AppError::Validation(e)) if policy == InvalidRowPolicy::SkipInvalid => {
                warn!(error = %e, "Skipping invalid row");
                skipped.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    let inserted = pool.insert_test_results(accepted).await?;
    info!(inserted, skipped = skipped.len(), "Import finished");

    Ok(ImportSummary { inserted, skipped })
}
