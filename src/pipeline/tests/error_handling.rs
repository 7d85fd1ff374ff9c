//! Error handling tests for the ingestion pipeline

use super::{HEADER, create_input_dir, output_dir, table};
use crate::config::ReasConfig;
use crate::constants::{self, MANIFEST_FILE};
use crate::error::ReasError;
use crate::pipeline::IngestionPipeline;
use crate::pipeline::progress::LogProgress;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_input_directory() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nowhere");

    match IngestionPipeline::new(missing.clone(), None).unwrap_err() {
        ReasError::InputNotFound { path } => assert_eq!(path, missing),
        other => panic!("Expected InputNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_capacity_exceeded_aborts_run() {
    let temp_dir = TempDir::new().unwrap();
    let body = table(&["A"], &[("COAL", &[1.0]), ("OIL", &[2.0])], &[]);
    let input = create_input_dir(&temp_dir, &[("REASv2.1_NH3_2008_IND_TAMI.txt", body)]);
    let output = output_dir(&temp_dir);

    let config = ReasConfig::default()
        .with_fuel_capacity(1)
        .without_progress();
    let pipeline = IngestionPipeline::new(input, Some(output.clone()))
        .unwrap()
        .with_config(config);

    match pipeline.run().await.unwrap_err() {
        ReasError::CapacityExceeded {
            dimension,
            capacity,
            label,
        } => {
            assert_eq!(dimension, constants::FUEL);
            assert_eq!(capacity, 1);
            assert_eq!(label, "OIL");
        }
        other => panic!("Expected CapacityExceeded, got {:?}", other),
    }
    assert!(!output.join(MANIFEST_FILE).exists());
}

#[tokio::test]
async fn test_truncated_file_aborts_run() {
    let temp_dir = TempDir::new().unwrap();
    let body = format!("{}A B\nCOAL 1 2\n", HEADER);
    let input = create_input_dir(&temp_dir, &[("REASv2.1_NH3_2008_IND_TAMI.txt", body)]);

    let pipeline = IngestionPipeline::new(input, Some(output_dir(&temp_dir)))
        .unwrap()
        .with_config(ReasConfig::default().without_progress());

    assert!(matches!(
        pipeline.run().await,
        Err(ReasError::TruncatedFile { .. })
    ));
}

#[tokio::test]
async fn test_file_removed_between_passes() {
    let temp_dir = TempDir::new().unwrap();
    let name = "REASv2.1_NH3_2008_IND_TAMI.txt";
    let input = create_input_dir(&temp_dir, &[(name, table(&["A"], &[("COAL", &[1.0])], &[]))]);

    let mut pipeline = IngestionPipeline::new(input.clone(), None).unwrap();
    let scan = pipeline.scan().await.unwrap();
    fs::remove_file(input.join(name)).unwrap();

    let mut observer = LogProgress::new(10);
    assert!(matches!(
        pipeline.load(&scan, &mut observer).await,
        Err(ReasError::Io(_))
    ));
}

#[tokio::test]
async fn test_pipeline_does_not_load_twice() {
    let temp_dir = TempDir::new().unwrap();
    let input = create_input_dir(
        &temp_dir,
        &[("REASv2.1_NH3_2008_IND_TAMI.txt", table(&["A"], &[("COAL", &[1.0])], &[]))],
    );

    let mut pipeline = IngestionPipeline::new(input, None).unwrap();
    let scan = pipeline.scan().await.unwrap();
    let mut observer = LogProgress::new(10);
    pipeline.load(&scan, &mut observer).await.unwrap();

    assert!(matches!(
        pipeline.load(&scan, &mut observer).await,
        Err(ReasError::Configuration { .. })
    ));
    assert!(matches!(
        pipeline.scan().await,
        Err(ReasError::Configuration { .. })
    ));
}

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let body = format!(
        "{}A B\nCOAL 1 2\nOIL 3\nnot a number row\n\nCEMENT 4\nCEMENT five\n",
        HEADER
    );
    let input = create_input_dir(&temp_dir, &[("REASv2.1_NH3_2008_IND_TAMI.txt", body)]);

    let pipeline = IngestionPipeline::new(input, Some(output_dir(&temp_dir)))
        .unwrap()
        .with_config(ReasConfig::default().without_progress());
    let stats = pipeline.run().await.unwrap();

    assert_eq!(stats.records.combustion_records, 2);
    assert_eq!(stats.records.non_combustion_records, 1);
    assert!(stats.records.skipped_lines >= 2);
}
