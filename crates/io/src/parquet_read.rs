//! Low-level Parquet reading and column extraction.

use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, RecordBatch};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use recap_history::{CaptureData, CovariateValue};

use crate::error::IoError;
use crate::validate::{CaptureSchema, ColumnKind, ValidationCollector};

/// Reads all record batches from a Parquet file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Parquet`] if the file cannot be opened or read.
pub(crate) fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let batches: Vec<RecordBatch> = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(batches)
}

fn covariate_value(col: &ArrayRef, kind: ColumnKind, row: usize) -> CovariateValue {
    if col.is_null(row) {
        return CovariateValue::Missing;
    }
    match kind {
        ColumnKind::Text => CovariateValue::Text(col.as_string::<i32>().value(row).to_string()),
        ColumnKind::Int => CovariateValue::Int(col.as_primitive::<Int64Type>().value(row)),
        ColumnKind::Float => CovariateValue::Float(col.as_primitive::<Float64Type>().value(row)),
    }
}

/// Converts record batches into a [`CaptureData`] following `plan`.
///
/// Rows are numbered across batches. A missing `freq` column gives every
/// record a frequency of 1.
///
/// # Errors
///
/// Returns [`IoError::Validation`] listing every row with a null or blank
/// `ch` or a `freq` that is null or not a positive 32-bit integer,
/// [`IoError::Arrow`] if a column cannot be cast, or [`IoError::History`] if
/// a record is rejected by the dataset.
pub(crate) fn batches_to_capture_data(
    batches: &[RecordBatch],
    plan: &CaptureSchema,
) -> Result<CaptureData, IoError> {
    let names = plan
        .covariates
        .iter()
        .map(|(_, name, _)| name.clone())
        .collect();
    let mut data = CaptureData::new(names)?;
    let mut c = ValidationCollector::new();
    let mut row_offset = 0;

    for batch in batches {
        let ch_col = cast(batch.column(plan.ch), &DataType::Utf8)?;
        let ch_col = ch_col.as_string::<i32>();
        let freq_col = plan
            .freq
            .map(|f| cast(batch.column(f), &DataType::Int64))
            .transpose()?;
        let freq_col = freq_col.as_ref().map(|a| a.as_primitive::<Int64Type>());
        let cov_cols = plan
            .covariates
            .iter()
            .map(|&(i, _, kind)| cast(batch.column(i), &kind.arrow_type()).map(|a| (a, kind)))
            .collect::<Result<Vec<_>, _>>()?;

        for row in 0..batch.num_rows() {
            let global = row_offset + row;
            if ch_col.is_null(row) {
                c.push(format!("row {global}: ch is null"));
                continue;
            }
            let ch = ch_col.value(row);
            if ch.trim().is_empty() {
                c.push(format!("row {global}: ch is empty"));
                continue;
            }
            let freq = match freq_col {
                None => 1,
                Some(col) if col.is_null(row) => {
                    c.push(format!("row {global}: freq is null"));
                    continue;
                }
                Some(col) => {
                    let v = col.value(row);
                    match u32::try_from(v) {
                        Ok(f) if f > 0 => f,
                        _ => {
                            c.push(format!("row {global}: freq must be a positive integer, got {v}"));
                            continue;
                        }
                    }
                }
            };
            if !c.is_empty() {
                continue;
            }
            let covariates = cov_cols
                .iter()
                .map(|(col, kind)| covariate_value(col, *kind, row))
                .collect();
            data.push(ch, freq, covariates)?;
        }
        row_offset += batch.num_rows();
    }

    c.finish()?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};

    use super::*;
    use crate::validate::classify_schema;

    fn batch(ch: Vec<Option<&str>>, freq: Vec<Option<i32>>, mass: Vec<Option<f64>>) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("ch", DataType::Utf8, true),
            Field::new("freq", DataType::Int32, true),
            Field::new("mass", DataType::Float64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(ch)),
                Arc::new(Int32Array::from(freq)),
                Arc::new(Float64Array::from(mass)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn converts_rows_across_batches() {
        let b1 = batch(vec![Some("100")], vec![Some(3)], vec![Some(1.5)]);
        let b2 = batch(vec![Some("010")], vec![Some(2)], vec![None]);
        let plan = classify_schema(&b1.schema()).unwrap().unwrap();
        let data = batches_to_capture_data(&[b1, b2], &plan).unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.covariate_names(), &["mass"]);
        assert_eq!(data.records()[0].freq(), 3);
        assert_eq!(data.records()[0].covariates(), &[CovariateValue::Float(1.5)]);
        assert_eq!(data.records()[1].id(), 1);
        assert_eq!(data.records()[1].covariates(), &[CovariateValue::Missing]);
    }

    #[test]
    fn bad_rows_are_collected() {
        let b = batch(
            vec![Some("100"), None, Some("011"), Some("001")],
            vec![Some(1), Some(1), Some(0), None],
            vec![None, None, None, None],
        );
        let plan = classify_schema(&b.schema()).unwrap().unwrap();
        match batches_to_capture_data(&[b], &plan).unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 3);
                assert!(details.contains("row 1: ch is null"));
                assert!(details.contains("row 2: freq must be a positive integer, got 0"));
                assert!(details.contains("row 3: freq is null"));
            }
            other => panic!("expected IoError::Validation, got {other:?}"),
        }
    }

    #[test]
    fn blank_histories_are_collected_with_other_row_errors() {
        let b = batch(
            vec![Some(""), Some("100"), Some("  "), Some("010")],
            vec![Some(1), Some(-2), Some(1), Some(1)],
            vec![None, None, None, None],
        );
        let plan = classify_schema(&b.schema()).unwrap().unwrap();
        match batches_to_capture_data(&[b], &plan).unwrap_err() {
            IoError::Validation { count, details } => {
                assert_eq!(count, 3);
                assert!(details.contains("row 0: ch is empty"));
                assert!(details.contains("row 1: freq must be a positive integer, got -2"));
                assert!(details.contains("row 2: ch is empty"));
            }
            other => panic!("expected IoError::Validation, got {other:?}"),
        }
    }

    #[test]
    fn missing_freq_defaults_to_one() {
        let schema = Schema::new(vec![
            Field::new("ch", DataType::Utf8, false),
            Field::new("cohort", DataType::Int64, false),
        ]);
        let b = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec!["10", "01"])),
                Arc::new(Int64Array::from(vec![2001, 2002])),
            ],
        )
        .unwrap();
        let plan = classify_schema(&b.schema()).unwrap().unwrap();
        let data = batches_to_capture_data(&[b], &plan).unwrap();
        assert_eq!(data.total_freq(), 2);
        assert_eq!(data.records()[1].covariates(), &[CovariateValue::Int(2002)]);
    }

    #[test]
    fn read_batches_missing_file() {
        let err = read_batches(Path::new("/tmp/recap_no_such_file.parquet")).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
