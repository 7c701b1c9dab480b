use std::path::PathBuf;

use crate::constants::FINAL_DATASET_FILE;
use crate::services;
use crate::utils::{get_final_data_dir, get_processed_data_dir};

/// Build the merged feature dataset from the cleaned CSVs.
pub fn run(primary: String, processed_dir: Option<PathBuf>, out: Option<PathBuf>) {
    let processed_dir = processed_dir.unwrap_or_else(get_processed_data_dir);
    let out = out.unwrap_or_else(|| get_final_data_dir().join(FINAL_DATASET_FILE));

    println!("🧮 Building features from {} (primary: {})", processed_dir.display(), primary);

    match services::build_features(&processed_dir, &primary, &out) {
        Ok(stats) => {
            println!(
                "✅ Wrote {} rows × {} columns from {} datasets to {}",
                stats.rows,
                stats.columns,
                stats.sources,
                out.display()
            );
        }
        Err(e) => {
            eprintln!("❌ Feature build failed: {}", e);
            std::process::exit(1);
        }
    }
}
