//! Reading capture datasets from Parquet.

use std::path::Path;

use recap_history::CaptureData;
use tracing::{debug, info};

use crate::error::IoError;
use crate::parquet_read;
use crate::validate::classify_schema;

/// Reads a capture dataset from a Parquet file.
///
/// The file must have a string column `ch`. An integer `freq` column gives
/// the replicate count of each row (1 when absent). An `id` column is
/// ignored; record ids are row positions. Every other string, integer or
/// float column becomes a covariate, in file order.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist,
/// [`IoError::MissingColumn`] if there is no `ch` column,
/// [`IoError::Validation`] for unsupported column types or invalid rows, or
/// [`IoError::Parquet`] / [`IoError::Arrow`] on format errors.
pub fn read_parquet(path: &Path) -> Result<CaptureData, IoError> {
    let batches = parquet_read::read_batches(path)?;
    let Some(first) = batches.first() else {
        return Err(IoError::MissingColumn {
            name: "ch".to_string(),
            path: path.to_path_buf(),
        });
    };
    let plan = classify_schema(&first.schema())?.ok_or_else(|| IoError::MissingColumn {
        name: "ch".to_string(),
        path: path.to_path_buf(),
    })?;
    debug!(
        n_batches = batches.len(),
        has_freq = plan.freq.is_some(),
        n_covariates = plan.covariates.len(),
        "validated capture schema"
    );

    let data = parquet_read::batches_to_capture_data(&batches, &plan)?;
    info!(
        path = %path.display(),
        n_records = data.len(),
        total_freq = data.total_freq(),
        "read capture data"
    );
    Ok(data)
}
