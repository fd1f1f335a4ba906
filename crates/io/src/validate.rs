//! Accumulated validation and capture-schema classification.
//!
//! Provides [`ValidationCollector`] for gathering multiple validation errors
//! into a single [`IoError::Validation`], and [`classify_schema`] which maps
//! the columns of an input file onto the capture dataset.

use arrow::datatypes::{DataType, Schema};

use crate::error::IoError;

// ---------------------------------------------------------------------------
// ValidationCollector
// ---------------------------------------------------------------------------

/// Accumulates validation errors and converts them into a single
/// [`IoError::Validation`].
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Returns `true` when no errors have been recorded.
    pub(crate) fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded errors.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consume the collector and return `Ok(())` if no errors were recorded,
    /// or `Err(IoError::Validation { count, details })` otherwise.
    ///
    /// The `details` string joins all messages with `"; "`.
    pub(crate) fn finish(self) -> Result<(), IoError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(IoError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Schema classification
// ---------------------------------------------------------------------------

/// Storage type of a covariate column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    /// UTF-8 strings.
    Text,
    /// Signed 64-bit integers.
    Int,
    /// 64-bit floats.
    Float,
}

impl ColumnKind {
    /// Classifies an Arrow type, or `None` if it cannot hold a covariate.
    pub(crate) fn from_arrow(dt: &DataType) -> Option<Self> {
        match dt {
            DataType::Utf8 | DataType::LargeUtf8 => Some(Self::Text),
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32 => Some(Self::Int),
            DataType::Float32 | DataType::Float64 => Some(Self::Float),
            _ => None,
        }
    }

    /// Returns the canonical Arrow type values are cast to.
    pub(crate) fn arrow_type(self) -> DataType {
        match self {
            Self::Text => DataType::Utf8,
            Self::Int => DataType::Int64,
            Self::Float => DataType::Float64,
        }
    }
}

/// Column positions of a validated capture-data schema.
#[derive(Debug)]
pub(crate) struct CaptureSchema {
    /// Position of the `ch` column.
    pub ch: usize,
    /// Position of the `freq` column, if present.
    pub freq: Option<usize>,
    /// Position, name and kind of every covariate column, in file order.
    pub covariates: Vec<(usize, String, ColumnKind)>,
}

/// Maps the columns of `schema` onto the capture dataset.
///
/// `ch` must be a string column and `freq` (if present) an integer column.
/// `id` is dropped. Every other column becomes a covariate and must be a
/// string, integer or float column.
///
/// Returns `Ok(None)` when `ch` is absent so the caller can report the path.
///
/// # Errors
///
/// Returns [`IoError::Validation`] listing every column with an unsupported
/// type.
pub(crate) fn classify_schema(schema: &Schema) -> Result<Option<CaptureSchema>, IoError> {
    let mut c = ValidationCollector::new();
    let mut ch = None;
    let mut freq = None;
    let mut covariates = Vec::new();

    for (i, field) in schema.fields().iter().enumerate() {
        let dt = field.data_type();
        match field.name().as_str() {
            "ch" => {
                if ColumnKind::from_arrow(dt) == Some(ColumnKind::Text) {
                    ch = Some(i);
                } else {
                    c.push(format!("column 'ch' must be a string column, got {dt}"));
                }
            }
            "freq" => {
                if ColumnKind::from_arrow(dt) == Some(ColumnKind::Int) {
                    freq = Some(i);
                } else {
                    c.push(format!("column 'freq' must be an integer column, got {dt}"));
                }
            }
            "id" => {}
            name => match ColumnKind::from_arrow(dt) {
                Some(kind) => covariates.push((i, name.to_string(), kind)),
                None => c.push(format!("column '{name}' has unsupported type {dt}")),
            },
        }
    }
    c.finish()?;

    Ok(ch.map(|ch| CaptureSchema {
        ch,
        freq,
        covariates,
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
