use std::path::PathBuf;

use crate::models::PipelineConfig;
use crate::services::CleaningPipeline;
use crate::utils::get_processed_data_dir;

/// Run the cleaning pipeline end to end.
pub fn run(config_path: Option<PathBuf>, out_dir: Option<PathBuf>) {
    let config = match config_path {
        Some(path) => match PipelineConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        },
        None => PipelineConfig::default(),
    };

    let out_dir = out_dir.unwrap_or_else(get_processed_data_dir);

    println!("🧹 Cleaning {} datasets → {}", config.datasets.len(), out_dir.display());

    let pipeline = match CleaningPipeline::new(config, out_dir) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if pipeline.clean_all() {
        println!("✨ Data cleaning completed successfully");
    } else {
        eprintln!("🔥 Data cleaning failed");
        std::process::exit(1);
    }
}
