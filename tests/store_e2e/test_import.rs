//! CSV import through the mapper into the record store.

use std::io::Write;

use statx_lib::db::stats::StatFilter;
use statx_lib::error::AppError;
use statx_lib::services::{
    ColumnMapping, CsvSource, ImportMapper, InvalidRowPolicy, import_records,
};
use statx_lib::validation::Field;

use super::test_helpers::create_test_pool;

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    write_bytes(contents.as_bytes())
}

fn write_bytes(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents).expect("Failed to write temp file");
    file
}

fn open_with_mapper(file: &tempfile::NamedTempFile, order: &str) -> (CsvSource, ImportMapper) {
    let source = CsvSource::open(file.path()).unwrap();
    let first_row = source.first_row().unwrap().to_vec();
    let mapper = ImportMapper::new(&first_row, ColumnMapping::parse(order).unwrap()).unwrap();
    (source, mapper)
}

#[actix_rt::test]
async fn test_import_reordered_columns_with_header() {
    let file = write_csv(
        "when,who,notes,device,ok\n\
         2020-02-20T10:00:00,Bob,first,Phone,1\n\
         2020-02-21 11:30,Eve,\"with, comma\",Phone,0\n\
         2020-02-22,Bob,,Tablet,1\n",
    );
    let (source, mapper) = open_with_mapper(&file, "3,1,0,4");

    let pool = create_test_pool().await;
    let summary = import_records(
        &pool,
        mapper.try_map_rows(source, true),
        InvalidRowPolicy::StopOnFirstError,
    )
    .await
    .unwrap();
    assert_eq!(summary.inserted, 3);
    assert!(summary.skipped.is_empty());

    let stats = pool.aggregate_test_results(&StatFilter::all()).await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].dev_type, "Phone");
    assert_eq!((stats[0].successful, stats[0].failed), (1, 1));
    assert_eq!(stats[1].dev_type, "Tablet");
    assert_eq!(stats[1].count, 1);
}

#[actix_rt::test]
async fn test_stop_on_first_error_persists_nothing() {
    let file = write_csv(
        "Phone,Bob,2020-02-20,1\n\
         Phone,Bob,not a date,1\n\
         Phone,Bob,2020-02-22,0\n",
    );
    let (source, mapper) = open_with_mapper(&file, "0123");

    let pool = create_test_pool().await;
    let err = import_records(
        &pool,
        mapper.try_map_rows(source, false),
        InvalidRowPolicy::StopOnFirstError,
    )
    .await
    .unwrap_err();

    match err {
        AppError::Validation(e) => {
            assert_eq!(e.field, Field::Dt);
            assert_eq!(e.row, Some(1));
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    let stats = pool.aggregate_test_results(&StatFilter::all()).await.unwrap();
    assert!(stats.is_empty());
}

#[actix_rt::test]
async fn test_skip_invalid_keeps_valid_rows() {
    let file = write_csv(
        "dev_type,operator,dt,success\n\
         Phone,Bob,2020-02-20,1\n\
         Phone,,2020-02-21,1\n\
         Phone,Bob\n\
         Phone,Eve,2020-02-22,0\n",
    );
    let (source, mapper) = open_with_mapper(&file, "0123");

    let pool = create_test_pool().await;
    let summary = import_records(
        &pool,
        mapper.try_map_rows(source, true),
        InvalidRowPolicy::SkipInvalid,
    )
    .await
    .unwrap();

    assert_eq!(summary.inserted, 2);
    let skipped: Vec<_> = summary.skipped.iter().map(|e| (e.row, e.field)).collect();
    assert_eq!(skipped, vec![(Some(2), Field::Operator), (Some(3), Field::Dt)]);
}

#[actix_rt::test]
async fn test_out_of_range_order_rejected_before_import() {
    let file = write_csv("Phone,Bob,2020-02-20,1\n");
    let source = CsvSource::open(file.path()).unwrap();

    let err = ImportMapper::new(source.first_row().unwrap(), ColumnMapping::parse("0124").unwrap())
        .unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
}

#[test]
fn test_order_checked_before_later_rows_are_read() {
    let file = write_bytes(b"Phone,Bob,2020-02-20,1\n\xff\xfe,broken\n");
    let mut source = CsvSource::open(file.path()).unwrap();
    assert_eq!(
        source.first_row().unwrap(),
        ["Phone", "Bob", "2020-02-20", "1"]
    );

    let err = ImportMapper::new(source.first_row().unwrap(), ColumnMapping::parse("0124").unwrap())
        .unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));

    assert!(source.next().unwrap().is_ok());
    let err = source.next().unwrap().unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
}

#[actix_rt::test]
async fn test_unreadable_row_aborts_even_when_skipping_invalid() {
    let file = write_bytes(b"Phone,Bob,2020-02-20,1\nPhone,,2020-02-21,1\n\xff\xfe,broken\n");
    let (source, mapper) = open_with_mapper(&file, "0123");

    let pool = create_test_pool().await;
    let err = import_records(
        &pool,
        mapper.try_map_rows(source, false),
        InvalidRowPolicy::SkipInvalid,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));

    let stats = pool.aggregate_test_results(&StatFilter::all()).await.unwrap();
    assert!(stats.is_empty());
}

#[test]
fn test_empty_file_has_no_first_row() {
    let file = write_csv("");
    let mut source = CsvSource::open(file.path()).unwrap();
    assert!(source.first_row().is_none());
    assert!(source.next().is_none());
}

#[test]
fn test_missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = CsvSource::open(&dir.path().join("missing.csv")).err().unwrap();
    assert!(matches!(err, AppError::Configuration(_)));
}
