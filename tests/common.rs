//! Shared helpers for integration tests (datasets and CSV fixtures).

#![allow(dead_code)]

use chartify_grammar::{DataLoader, Dataset};
use polars::prelude::df;
use std::io::Write;
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile};

pub const HAPPINESS_CSV: &str = "\
Country,Region,Happiness Rank,Happiness Score,Family,Health (Life Expectancy),Freedom,Generosity
Denmark,Western Europe,1,7.526,1.16374,0.79504,0.57941,0.36171
Switzerland,Western Europe,2,7.509,1.14524,0.86303,0.58557,0.28083
Canada,North America,6,7.404,1.0961,0.8276,0.5737,0.44834
Togo,Sub-Saharan Africa,155,3.303,0.0,0.24811,0.34678,0.17517
Burundi,Sub-Saharan Africa,157,2.905,0.23442,0.15747,0.0432,0.2029
";

/// Write `contents` to a temporary CSV file kept alive by the returned handle.
pub fn csv_file(contents: &str) -> NamedTempFile {
    let mut f = Builder::new().suffix(".csv").tempfile().unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

/// Five-country excerpt loaded through the CSV loader.
pub fn happiness() -> Arc<Dataset> {
    let f = csv_file(HAPPINESS_CSV);
    Arc::new(DataLoader::new().load_csv(f.path()).unwrap())
}

/// The two-region table behind the bar chart example.
pub fn region_scores() -> Arc<Dataset> {
    let frame = df![
        "Region" => &["Western Europe", "Sub-Saharan Africa"],
        "Happiness Score" => &[7.5, 4.1],
    ]
    .unwrap();
    Arc::new(Dataset::from_frame(frame).unwrap())
}
