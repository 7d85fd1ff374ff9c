//! Integration tests for the ingestion pipeline
//!
//! Build small REAS input directories in temporary storage and run the
//! pipeline over them.

pub mod error_handling;
pub mod round_trip;

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Six header lines as they appear at the top of every table
pub const HEADER: &str = "REAS version 2.1\n\
Emission table\n\
Unit: t/year\n\
\n\
Source: combustion and non-combustion\n\
---\n";

/// Build a table body from a combustion matrix and non-combustion rows
pub fn table(sectors: &[&str], fuels: &[(&str, &[f64])], non_combustion: &[(&str, f64)]) -> String {
    let mut text = String::from(HEADER);
    text.push_str(&sectors.join(" "));
    text.push('\n');
    for (fuel, values) in fuels {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        text.push_str(&format!("{} {}\n", fuel, values.join(" ")));
    }
    text.push('\n');
    for (sector, value) in non_combustion {
        text.push_str(&format!("{} {}\n", sector, value));
    }
    text
}

/// Create an input directory holding `files` (name, body)
pub fn create_input_dir(temp_dir: &TempDir, files: &[(&str, String)]) -> PathBuf {
    let input = temp_dir.path().join("reas-tables");
    fs::create_dir_all(&input).unwrap();
    for (name, body) in files {
        fs::write(input.join(name), body).unwrap();
    }
    input
}

pub fn output_dir(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("store")
}
