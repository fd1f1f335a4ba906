//! Low-level Parquet column building.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use recap_history::{CovariateValue, SimulatedData};

use crate::error::IoError;
use crate::validate::ColumnKind;

/// Picks the narrowest column type holding every value of a covariate.
///
/// Any text value makes the column text; integers mixed with floats widen to
/// float. An all-missing column is written as text.
pub(crate) fn infer_kind(values: &[CovariateValue]) -> ColumnKind {
    let mut kind = None;
    for v in values {
        kind = match (kind, v) {
            (_, CovariateValue::Text(_)) => return ColumnKind::Text,
            (_, CovariateValue::Missing) => kind,
            (Some(ColumnKind::Float), _) | (_, CovariateValue::Float(_)) => Some(ColumnKind::Float),
            (_, CovariateValue::Int(_)) => Some(ColumnKind::Int),
        };
    }
    kind.unwrap_or(ColumnKind::Text)
}

/// Builds the Arrow schema for a simulated dataset: `ch` followed by the
/// covariates in input order.
pub(crate) fn build_schema(data: &SimulatedData) -> Schema {
    let mut fields = vec![Field::new("ch", DataType::Utf8, false)];
    for (col, name) in data.covariate_names().iter().enumerate() {
        let kind = infer_kind(data.covariate_column(col));
        fields.push(Field::new(name, kind.arrow_type(), true));
    }
    Schema::new(fields)
}

fn covariate_array(values: &[CovariateValue], dt: &DataType) -> ArrayRef {
    match dt {
        DataType::Int64 => Arc::new(Int64Array::from_iter(values.iter().map(|v| match v {
            CovariateValue::Int(i) => Some(*i),
            _ => None,
        }))),
        DataType::Float64 => Arc::new(Float64Array::from_iter(values.iter().map(|v| match v {
            CovariateValue::Int(i) => Some(*i as f64),
            CovariateValue::Float(f) => Some(*f),
            _ => None,
        }))),
        _ => Arc::new(StringArray::from_iter(values.iter().map(|v| match v {
            CovariateValue::Missing => None,
            other => Some(other.to_string()),
        }))),
    }
}

/// Converts a simulated dataset into a single Arrow [`RecordBatch`].
///
/// The schema must be the one returned by [`build_schema`] for the same
/// data; otherwise the call will fail.
pub(crate) fn simulated_to_record_batch(
    data: &SimulatedData,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    columns.push(Arc::new(StringArray::from_iter_values(data.ch())));
    for (col, field) in schema.fields().iter().skip(1).enumerate() {
        columns.push(covariate_array(
            data.covariate_column(col),
            field.data_type(),
        ));
    }
    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Writes a [`RecordBatch`] to a Parquet file at `path`, in slices of at
/// most `chunk_rows` rows.
///
/// # Errors
///
/// Returns [`IoError::Parquet`] if file creation, batch writing, or file
/// finalisation fails.
pub(crate) fn write_batch(
    path: &Path,
    batch: &RecordBatch,
    chunk_rows: usize,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;

    let n = batch.num_rows();
    let mut offset = 0;
    while offset < n {
        let len = chunk_rows.min(n - offset);
        writer.write(&batch.slice(offset, len))?;
        offset += len;
    }

    writer.close()?;
    Ok(())
}
