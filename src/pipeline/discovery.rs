//! Input discovery and the label-scanning pass.
//!
//! Lists the table files in the input directory and decodes every file
//! name, accumulating the distinct pollutant, year and region labels that
//! size the fixed dimensions.

use crate::config::FileNameLayout;
use crate::error::{ReasError, Result};
use crate::models::FileKey;
use crate::parser::file_key;

use glob::Pattern;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// File discovery component for a flat directory of REAS tables
#[derive(Debug)]
pub struct FileDiscovery {
    input_dir: PathBuf,
    pattern: Pattern,
}

impl FileDiscovery {
    /// Create a new file discovery instance matching file names against `pattern`
    pub fn new(input_dir: PathBuf, pattern: &str) -> Result<Self> {
        let pattern = Pattern::new(pattern).map_err(|e| ReasError::Configuration {
            message: format!("invalid file pattern '{}': {}", pattern, e),
        })?;
        Ok(Self { input_dir, pattern })
    }

    /// List matching files directly inside the input directory, sorted by name
    pub async fn discover_files(&self) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(ReasError::InputNotFound {
                path: self.input_dir.clone(),
            });
        }

        debug!(
            "Searching for '{}' in: {}",
            self.pattern.as_str(),
            self.input_dir.display()
        );

        let mut files = Vec::new();
        let mut dir = fs::read_dir(&self.input_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if self.matches(&path) {
                files.push(path);
            }
        }

        files.sort();
        debug!("Found {} input files", files.len());
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.pattern.matches(name))
    }
}

/// Label sets gathered by the scanning pass
#[derive(Debug, Default)]
pub struct LabelScan {
    pollutants: BTreeSet<String>,
    years: BTreeSet<String>,
    regions: BTreeSet<String>,
    files: Vec<(PathBuf, FileKey)>,
    skipped: Vec<PathBuf>,
}

impl LabelScan {
    /// Decode every file name; names that cannot be decoded are skipped
    pub fn scan(files: &[PathBuf], layout: &FileNameLayout) -> Self {
        let mut scan = Self::default();
        let mut seen = HashSet::new();

        for path in files {
            match file_key(path, layout) {
                Ok(key) => {
                    if !seen.insert(key.clone()) {
                        warn!(
                            "{} repeats coordinate {}; its combustion table wins",
                            path.display(),
                            key
                        );
                    }
                    scan.add(path.clone(), key);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    scan.skipped.push(path.clone());
                }
            }
        }

        scan
    }

    /// Record one decoded file
    pub fn add(&mut self, path: PathBuf, key: FileKey) {
        self.pollutants.insert(key.pollutant.clone());
        self.years.insert(key.year.clone());
        self.regions.insert(key.region.clone());
        self.files.push((path, key));
    }

    /// Distinct pollutant codes, sorted
    pub fn pollutants(&self) -> impl Iterator<Item = &str> {
        self.pollutants.iter().map(String::as_str)
    }

    /// Distinct years, sorted
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.iter().map(String::as_str)
    }

    /// Distinct region codes, sorted
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(String::as_str)
    }

    /// Decoded files in load order
    pub fn files(&self) -> &[(PathBuf, FileKey)] {
        &self.files
    }

    /// Files whose names could not be decoded
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_input_dir(temp_dir: &TempDir) -> PathBuf {
        let input = temp_dir.path().join("tables");
        fs::create_dir_all(&input).unwrap();
        for name in [
            "REASv2.1_NH3_2008_IND_TAMI.txt",
            "REASv2.1_SO2_2000_IND_TAMI.txt",
            "REASv2.1_PM2.5_2008_CHN_BEIJ.txt",
        ] {
            fs::write(input.join(name), "table").unwrap();
        }
        fs::write(input.join("README.md"), "ignored").unwrap();
        fs::create_dir_all(input.join("nested.txt")).unwrap();
        input
    }

    #[tokio::test]
    async fn test_discover_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        let input = create_input_dir(&temp_dir);

        let discovery = FileDiscovery::new(input, "*.txt").unwrap();
        let files = discovery.discover_files().await.unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "REASv2.1_NH3_2008_IND_TAMI.txt",
                "REASv2.1_PM2.5_2008_CHN_BEIJ.txt",
                "REASv2.1_SO2_2000_IND_TAMI.txt",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_input_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let discovery = FileDiscovery::new(missing.clone(), "*.txt").unwrap();
        match discovery.discover_files().await.unwrap_err() {
            ReasError::InputNotFound { path } => assert_eq!(path, missing),
            other => panic!("Expected InputNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_collects_sorted_label_sets() {
        let files: Vec<PathBuf> = [
            "REASv2.1_SO2_2008_JPN_HOKK.txt",
            "REASv2.1_NH3_2000_IND_TAMI.txt",
            "REASv2.1_NH3_2008_IND_TAMI.txt",
            "notes.txt",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();

        let scan = LabelScan::scan(&files, &FileNameLayout::default());

        assert_eq!(scan.pollutants().collect::<Vec<_>>(), vec!["NH3", "SO2"]);
        assert_eq!(scan.years().collect::<Vec<_>>(), vec!["2000", "2008"]);
        assert_eq!(scan.regions().collect::<Vec<_>>(), vec!["IND_TAMI", "JPN_HOKK"]);
        assert_eq!(scan.files().len(), 3);
        assert_eq!(scan.skipped(), &[PathBuf::from("notes.txt")]);
    }
}
