//! Table body decomposition.
//!
//! After a fixed header block, a body holds two sections:
//!
//! ```text
//!             POWER   IND     DOM          <- combustion header (sector names)
//! COAL        1.0     2.0     3.0          <- fuel, one value per sector
//! OIL         4.0     5.0     6.0
//!                                          <- blank line ends the matrix
//! Industry [t/year]                        <- non-data, skipped
//! CEMENT      7.0                          <- non-combustion sector, value
//! SUB_TOTAL   7.0                          <- dropped
//! TOTAL       28.0                         <- grand total
//! ```
//!
//! Lines are classified explicitly with [`classify_line`]; anything that is
//! not a data row of the expected width is skipped and counted. Parsed
//! observations are pushed to a [`RecordSink`] as they are read.

use crate::config::BodyLayout;
use crate::error::{ReasError, Result};
use crate::models::BodyStats;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Shape of one body line
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass<'a> {
    /// A label followed by one or more numeric values
    DataRow { label: &'a str, values: Vec<f64> },
    /// Empty or whitespace-only
    Blank,
    /// Anything else: captions, unit annotations, a lone label
    NonData,
}

/// Classify a line by its whitespace-separated tokens
pub fn classify_line(line: &str) -> LineClass<'_> {
    let mut tokens = line.split_whitespace();
    let Some(label) = tokens.next() else {
        return LineClass::Blank;
    };

    let mut values = Vec::new();
    for token in tokens {
        match token.parse::<f64>() {
            Ok(value) => values.push(value),
            Err(_) => return LineClass::NonData,
        }
    }

    if values.is_empty() {
        LineClass::NonData
    } else {
        LineClass::DataRow { label, values }
    }
}

/// One parsed observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record<'a> {
    Combustion {
        sector: &'a str,
        fuel: &'a str,
        value: f64,
    },
    NonCombustion {
        sector: &'a str,
        value: f64,
    },
    /// File-level grand total
    Total { value: f64 },
}

/// Consumer of parsed records
pub trait RecordSink {
    /// Called once with the combustion header's sector names, in column order
    fn begin_combustion(&mut self, _sectors: &[&str]) -> Result<()> {
        Ok(())
    }

    fn record(&mut self, record: Record<'_>) -> Result<()>;
}

/// Parse a file body, pushing every record into `sink`.
///
/// Running out of lines before the end of the combustion matrix is fatal
/// ([`ReasError::TruncatedFile`]); malformed data lines are skipped.
pub fn parse_body<S: RecordSink + ?Sized>(
    path: &Path,
    text: &str,
    layout: &BodyLayout,
    sink: &mut S,
) -> Result<BodyStats> {
    let truncated = |reason: String| ReasError::TruncatedFile {
        path: path.to_path_buf(),
        reason,
    };

    let mut stats = BodyStats::default();
    let mut lines = text.lines().enumerate();

    // Header block, contents not checked
    for _ in 0..layout.header_lines {
        lines.next().ok_or_else(|| {
            truncated(format!(
                "ended inside the {}-line header",
                layout.header_lines
            ))
        })?;
    }

    // Combustion matrix
    let (_, header) = lines
        .next()
        .ok_or_else(|| truncated("missing combustion header row".to_string()))?;
    let sectors: Vec<&str> = header
        .split_whitespace()
        .skip(layout.combustion_header_skip)
        .collect();
    sink.begin_combustion(&sectors)?;

    loop {
        let (line_no, line) = lines
            .next()
            .ok_or_else(|| truncated("ended inside the combustion table".to_string()))?;

        match classify_line(line) {
            LineClass::Blank => break,
            LineClass::DataRow { label, values } if values.len() == sectors.len() => {
                for (sector, value) in sectors.iter().zip(values) {
                    sink.record(Record::Combustion {
                        sector: *sector,
                        fuel: label,
                        value,
                    })?;
                    stats.combustion_records += 1;
                }
            }
            LineClass::DataRow { label, values } => {
                warn!(
                    "{}:{}: skipping fuel row '{}' with {} values, expected {}",
                    path.display(),
                    line_no + 1,
                    label,
                    values.len(),
                    sectors.len()
                );
                stats.skipped_lines += 1;
            }
            LineClass::NonData => {
                debug!(
                    "{}:{}: skipping non-data line in combustion table",
                    path.display(),
                    line_no + 1
                );
                stats.skipped_lines += 1;
            }
        }
    }

    // Non-combustion vector
    for (line_no, line) in lines {
        match classify_line(line) {
            LineClass::DataRow { label, values } if values.len() == 1 => {
                let value = values[0];
                if label == layout.sub_total_label {
                    stats.subtotals_dropped += 1;
                } else if label == layout.total_label {
                    sink.record(Record::Total { value })?;
                    stats.totals += 1;
                } else {
                    sink.record(Record::NonCombustion {
                        sector: label,
                        value,
                    })?;
                    stats.non_combustion_records += 1;
                }
            }
            LineClass::Blank => {}
            _ => {
                trace!("{}:{}: skipping '{}'", path.display(), line_no + 1, line.trim());
                stats.skipped_lines += 1;
            }
        }
    }

    Ok(stats)
}
