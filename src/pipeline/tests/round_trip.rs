//! Persist and reopen tests
//!
//! Generates tables from a fixed-seed generator, runs the pipeline and
//! checks every cell of the reopened store against what was written.

use super::{create_input_dir, output_dir, table};
use crate::config::ReasConfig;
use crate::constants;
use crate::key;
use crate::pipeline::IngestionPipeline;
use crate::store::Store;
use std::collections::HashMap;
use tempfile::TempDir;

const POLLUTANTS: [&str; 3] = ["CO2", "NH3", "SO2"];
const YEARS: [&str; 2] = ["2000", "2008"];
const REGIONS: [&str; 2] = ["CHN_BEIJ", "IND_TAMI"];
const SECTORS: [&str; 4] = ["POWER", "INDUSTRY", "ROAD", "DOMESTIC"];
const FUELS: [&str; 5] = ["COAL", "OIL", "GAS", "BIOFUEL", "OTHER"];
const OTHER_SECTORS: [&str; 3] = ["CEMENT", "STEEL", "FERTILIZER"];

/// Small linear congruential generator, deterministic across runs
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next() % 100 < percent
    }

    fn value(&mut self) -> f64 {
        (self.next() % 100_000) as f64 / 8.0
    }
}

type Cell = (String, String, String, String, String);

struct Expected {
    combustion: HashMap<Cell, f64>,
    non_combustion: HashMap<(String, String, String, String), f64>,
    total: HashMap<(String, String, String), f64>,
}

fn generate(seed: u64) -> (Vec<(String, String)>, Expected) {
    let mut rng = Lcg(seed);
    let mut files = Vec::new();
    let mut expected = Expected {
        combustion: HashMap::new(),
        non_combustion: HashMap::new(),
        total: HashMap::new(),
    };

    for p in POLLUTANTS {
        for y in YEARS {
            for r in REGIONS {
                if !rng.chance(70) {
                    continue;
                }
                let sectors: Vec<&str> =
                    SECTORS.iter().copied().filter(|_| rng.chance(60)).collect();
                let fuels: Vec<&str> = FUELS.iter().copied().filter(|_| rng.chance(60)).collect();
                if sectors.is_empty() || fuels.is_empty() {
                    continue;
                }

                let mut rows = Vec::new();
                for fuel in &fuels {
                    let values: Vec<f64> = sectors.iter().map(|_| rng.value()).collect();
                    for (sector, value) in sectors.iter().zip(&values) {
                        expected.combustion.insert(
                            (p.into(), y.into(), r.into(), sector.to_string(), fuel.to_string()),
                            *value,
                        );
                    }
                    rows.push((*fuel, values));
                }

                let mut others = Vec::new();
                for sector in OTHER_SECTORS {
                    if rng.chance(50) {
                        let value = rng.value();
                        expected
                            .non_combustion
                            .insert((p.into(), y.into(), r.into(), sector.into()), value);
                        others.push((sector, value));
                    }
                }
                let total = rng.value();
                expected.total.insert((p.into(), y.into(), r.into()), total);
                others.push(("SUB_TOTAL", rng.value()));
                others.push(("TOTAL", total));

                let rows: Vec<(&str, &[f64])> =
                    rows.iter().map(|(f, v)| (*f, v.as_slice())).collect();
                files.push((
                    format!("REASv2.1_{}_{}_{}.txt", p, y, r),
                    table(&sectors, &rows, &others),
                ));
            }
        }
    }

    (files, expected)
}

fn check_store(store: &Store, expected: &Expected) {
    let labels = |dim: &str| store.labels(dim).unwrap().to_vec();
    let pollutants = labels(constants::POLLUTANT);
    let years = labels(constants::YEAR);
    let regions = labels(constants::REGION);

    for p in &pollutants {
        for y in &years {
            for r in &regions {
                for s in labels(constants::COMBUSTION_SECTOR) {
                    for f in labels(constants::FUEL) {
                        let key = key![p.as_str(), y.as_str(), r.as_str(), s.as_str(), f.as_str()];
                        let got = store.get_value(constants::COMBUSTION, &key).unwrap();
                        let cell = (p.clone(), y.clone(), r.clone(), s.clone(), f.clone());
                        match expected.combustion.get(&cell) {
                            Some(value) => assert_eq!(got, *value, "combustion {:?}", cell),
                            None => assert!(got.is_nan(), "combustion {:?} = {}", cell, got),
                        }
                    }
                }
                for s in labels(constants::NON_COMBUSTION_SECTOR) {
                    let key = key![p.as_str(), y.as_str(), r.as_str(), s.as_str()];
                    let got = store.get_value(constants::NON_COMBUSTION, &key).unwrap();
                    let cell = (p.clone(), y.clone(), r.clone(), s.clone());
                    match expected.non_combustion.get(&cell) {
                        Some(value) => assert_eq!(got, *value, "non-combustion {:?}", cell),
                        None => assert!(got.is_nan(), "non-combustion {:?} = {}", cell, got),
                    }
                }
                let got = store
                    .get_value(constants::TOTAL, &key![p.as_str(), y.as_str(), r.as_str()])
                    .unwrap();
                match expected.total.get(&(p.clone(), y.clone(), r.clone())) {
                    Some(value) => assert_eq!(got, *value),
                    None => assert!(got.is_nan()),
                }
            }
        }
    }
}

#[tokio::test]
async fn test_generated_tables_round_trip() {
    for seed in [7, 42, 2024] {
        let temp_dir = TempDir::new().unwrap();
        let (files, expected) = generate(seed);
        let files: Vec<(&str, String)> =
            files.iter().map(|(n, b)| (n.as_str(), b.clone())).collect();
        let input = create_input_dir(&temp_dir, &files);
        let output = output_dir(&temp_dir);

        let pipeline = IngestionPipeline::new(input, Some(output.clone()))
            .unwrap()
            .with_config(ReasConfig::default().without_progress());
        let stats = pipeline.run().await.unwrap();
        assert_eq!(stats.files_loaded, files.len());
        assert_eq!(stats.records.combustion_records, expected.combustion.len());

        let store = Store::open(&output).unwrap();
        let sectors = store.labels(constants::COMBUSTION_SECTOR).unwrap();
        assert!(!sectors.contains(&"SUB_TOTAL".to_string()));
        let others = store.labels(constants::NON_COMBUSTION_SECTOR).unwrap();
        assert!(!others.contains(&"TOTAL".to_string()));
        check_store(&store, &expected);
    }
}

#[tokio::test]
async fn test_reopened_store_supports_point_lists() {
    let temp_dir = TempDir::new().unwrap();
    let files = vec![
        (
            "REASv2.1_NH3_2000_IND_TAMI.txt",
            table(&["POWER", "ROAD"], &[("COAL", &[1.0, 2.0])], &[("TOTAL", 3.0)]),
        ),
        (
            "REASv2.1_NH3_2008_IND_TAMI.txt",
            table(&["POWER", "ROAD"], &[("COAL", &[10.0, 20.0])], &[("TOTAL", 30.0)]),
        ),
    ];
    let input = create_input_dir(&temp_dir, &files);
    let output = output_dir(&temp_dir);

    IngestionPipeline::new(input, Some(output.clone()))
        .unwrap()
        .with_config(ReasConfig::default().without_progress())
        .run()
        .await
        .unwrap();

    let store = Store::open(&output).unwrap();
    assert_eq!(
        store.axis_names(constants::COMBUSTION).unwrap(),
        vec![
            constants::POLLUTANT,
            constants::YEAR,
            constants::REGION,
            constants::COMBUSTION_SECTOR,
            constants::FUEL
        ]
    );

    let years = crate::array::Key::labels(["2008", "2000"]);
    let picked = store
        .get(constants::COMBUSTION, &key!["NH3", years, "IND_TAMI", "ROAD", "COAL"])
        .unwrap();
    assert_eq!(picked.shape(), &[2]);
    assert_eq!(picked.iter().copied().collect::<Vec<_>>(), vec![20.0, 2.0]);

    let totals = store.get(constants::TOTAL, &key!["NH3", .., 0]).unwrap();
    assert_eq!(totals.iter().copied().collect::<Vec<_>>(), vec![3.0, 30.0]);
}
