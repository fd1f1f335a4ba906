//! # recap-io
//!
//! Read capture-recapture datasets from Parquet and write simulated
//! histories back to Parquet. Bridges columnar files into the
//! [`recap_history`] data model.

mod error;
mod parquet_read;
mod parquet_write;
mod reader;
mod validate;
mod writer;

pub use error::IoError;
pub use reader::read_parquet;
pub use writer::{Compression, WriterConfig, write_parquet};
