//! File name decomposition.
//!
//! REAS table names are six consecutive fixed-width segments:
//!
//! ```text
//! REASv2.1_NH3_2008_IND_TAMI.txt
//! |prefix  |p |s|year|s|region  |
//!     9     3  1  4   1    8
//! ```
//!
//! Particulate-matter codes (`PM2.5`, `PM10`) are two characters wider, so
//! the pollutant width depends on the name and later segments shift.

use crate::config::FileNameLayout;
use crate::error::{ReasError, Result};
use crate::models::FileKey;
use std::path::Path;

/// Split `name` into its (pollutant, year, region) segments.
///
/// Only positional slicing is performed; segment contents are not checked.
pub fn decompose_file_name(name: &str, layout: &FileNameLayout) -> Result<FileKey> {
    let pollutant_width = if name.contains(layout.wide_pollutant_marker.as_str()) {
        layout.wide_pollutant_width
    } else {
        layout.pollutant_width
    };

    let widths = [
        layout.prefix_width,
        pollutant_width,
        layout.separator_width,
        layout.year_width,
        layout.separator_width,
        layout.region_width,
    ];

    let mut segments = Vec::with_capacity(widths.len());
    let mut offset = 0;
    for width in widths {
        let end = offset + width;
        let segment = name.get(offset..end).ok_or_else(|| ReasError::InvalidFileName {
            name: name.to_string(),
            reason: if end > name.len() {
                format!("expected at least {} bytes, found {}", end, name.len())
            } else {
                format!("segment {}..{} is not on a character boundary", offset, end)
            },
        })?;
        segments.push(segment);
        offset = end;
    }

    Ok(FileKey::new(segments[1], segments[3], segments[5]))
}

/// Decompose the file name component of `path`
pub fn file_key(path: &Path, layout: &FileNameLayout) -> Result<FileKey> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ReasError::InvalidFileName {
            name: path.display().to_string(),
            reason: "path has no UTF-8 file name".to_string(),
        })?;
    decompose_file_name(name, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_standard_pollutant() {
        let key =
            decompose_file_name("REASv2.1_NH3_2008_IND_TAMI.txt", &FileNameLayout::default())
                .unwrap();
        assert_eq!(key, FileKey::new("NH3", "2008", "IND_TAMI"));
    }

    #[test]
    fn test_particulate_matter_widens_pollutant() {
        let layout = FileNameLayout::default();

        let key = decompose_file_name("REASv2.1_PM2.5_2008_IND_TAMI.txt", &layout).unwrap();
        assert_eq!(key, FileKey::new("PM2.5", "2008", "IND_TAMI"));

        let key = decompose_file_name("REASv2.1_PM2.5_1995_CHN_BEIJ.txt", &layout).unwrap();
        assert_eq!(key, FileKey::new("PM2.5", "1995", "CHN_BEIJ"));
    }

    #[test]
    fn test_no_content_validation() {
        let key =
            decompose_file_name("XXXXXXXXXabc-wxyz-REGIONAL", &FileNameLayout::default()).unwrap();
        assert_eq!(key, FileKey::new("abc", "wxyz", "REGIONAL"));
    }

    #[test]
    fn test_short_name_rejected() {
        match decompose_file_name("REASv2.1_NH3_2008.txt", &FileNameLayout::default()) {
            Err(ReasError::InvalidFileName { name, reason }) => {
                assert_eq!(name, "REASv2.1_NH3_2008.txt");
                assert!(reason.contains("at least 26 bytes"));
            }
            other => panic!("Expected InvalidFileName, got {:?}", other),
        }
    }

    #[test]
    fn test_file_key_uses_file_name_only() {
        let path = PathBuf::from("/data/reas/REASv2.1_SO2_2000_JPN_HOKK.txt");
        let key = file_key(&path, &FileNameLayout::default()).unwrap();
        assert_eq!(key, FileKey::new("SO2", "2000", "JPN_HOKK"));
    }
}
