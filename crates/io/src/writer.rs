//! Writing simulated capture histories to Parquet.

use std::path::Path;

use parquet::file::properties::WriterProperties;
use recap_history::SimulatedData;
use tracing::info;

use crate::error::IoError;
use crate::parquet_write;

/// Column compression codec of the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    None,
    #[default]
    Snappy,
    /// Zstd at level 3.
    Zstd,
}

impl Compression {
    fn to_parquet(self) -> Result<parquet::basic::Compression, IoError> {
        Ok(match self {
            Self::None => parquet::basic::Compression::UNCOMPRESSED,
            Self::Snappy => parquet::basic::Compression::SNAPPY,
            Self::Zstd => {
                let level = parquet::basic::ZstdLevel::try_new(3)?;
                parquet::basic::Compression::ZSTD(level)
            }
        })
    }
}

/// Configuration for writing simulated histories to Parquet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    compression: Compression,
    row_group_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            row_group_size: 1_000_000,
        }
    }
}

impl WriterConfig {
    /// Creates a configuration with defaults (Snappy, 1 000 000 rows per
    /// row group).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output codec.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Caps the number of histories stored per row group.
    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows;
        self
    }

    /// Returns the output codec.
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns the row group cap.
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    /// Checks that the row group cap is positive.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] for a zero row group cap.
    pub fn validate(&self) -> Result<(), IoError> {
        if self.row_group_size == 0 {
            return Err(IoError::Validation {
                count: 1,
                details: "row_group_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Writes simulated histories to a Parquet file.
///
/// The file has a non-null string column `ch` followed by one nullable
/// column per covariate, in input order. Covariate columns are integer,
/// float or string depending on the values they hold; missing values are
/// written as nulls.
///
/// # Errors
///
/// Returns [`IoError::Validation`] if the configuration is invalid, or
/// [`IoError::Parquet`] / [`IoError::Arrow`] if schema construction, batch
/// conversion, or file I/O fails.
pub fn write_parquet(
    path: &Path,
    data: &SimulatedData,
    config: &WriterConfig,
) -> Result<(), IoError> {
    config.validate()?;

    let props = WriterProperties::builder()
        .set_compression(config.compression.to_parquet()?)
        .set_max_row_group_size(config.row_group_size)
        .build();
    let schema = parquet_write::build_schema(data);
    let batch = parquet_write::simulated_to_record_batch(data, &schema)?;
    parquet_write::write_batch(path, &batch, config.row_group_size, props)?;

    info!(
        path = %path.display(),
        n_rows = data.n_rows(),
        compression = ?config.compression,
        "wrote simulated histories"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let default = WriterConfig::new();
        assert_eq!(default, WriterConfig::default());
        assert_eq!(default.compression(), Compression::Snappy);
        assert_eq!(default.row_group_size(), 1_000_000);
        assert!(default.validate().is_ok());

        let small = default
            .with_compression(Compression::None)
            .with_row_group_size(64);
        assert_eq!(small.compression(), Compression::None);
        assert_eq!(small.row_group_size(), 64);
    }

    #[test]
    fn zero_row_groups_rejected() {
        let err = WriterConfig::new()
            .with_row_group_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            IoError::Validation { count: 1, ref details } if details.contains("row_group_size")
        ));
    }

    #[test]
    fn codecs_map_to_parquet() {
        use parquet::basic::Compression as Pq;
        assert_eq!(Compression::None.to_parquet().unwrap(), Pq::UNCOMPRESSED);
        assert_eq!(Compression::Snappy.to_parquet().unwrap(), Pq::SNAPPY);
        assert!(matches!(Compression::Zstd.to_parquet().unwrap(), Pq::ZSTD(_)));
    }
}
