//! REAS table parsing.
//!
//! - [`filename`] decodes the (pollutant, year, region) coordinate from a
//!   fixed-width file name.
//! - [`body`] walks a file body and emits [`Record`]s for the combustion
//!   matrix, the non-combustion vector and the grand total.

pub mod body;
pub mod filename;

pub use body::{LineClass, Record, RecordSink, classify_line, parse_body};
pub use filename::{decompose_file_name, file_key};
