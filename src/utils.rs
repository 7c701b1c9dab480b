use std::path::PathBuf;

/// Get raw data directory from environment variable or use default
pub fn get_raw_data_dir() -> PathBuf {
    std::env::var("RAW_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/raw"))
}

/// Get processed data directory from environment variable or use default
pub fn get_processed_data_dir() -> PathBuf {
    std::env::var("PROCESSED_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/processed"))
}

/// Get final (feature dataset) directory from environment variable or use default
pub fn get_final_data_dir() -> PathBuf {
    std::env::var("FINAL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data/final"))
}
