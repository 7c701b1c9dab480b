use std::path::{Path, PathBuf};

use crate::constants::{cleaned_filename, FX_SOURCE};
use crate::services::{discover_sources, store};
use crate::utils::get_processed_data_dir;

/// Summarize the persisted cleaned datasets.
pub fn run(processed_dir: Option<PathBuf>) {
    let processed_dir = processed_dir.unwrap_or_else(get_processed_data_dir);

    println!("📊 Cleaned Dataset Status\n");

    match show_status(&processed_dir) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status(processed_dir: &Path) -> Result<(), crate::error::Error> {
    let sources = discover_sources(processed_dir)?;

    for source in &sources {
        let path = processed_dir.join(cleaned_filename(source));

        let (rows, first, last) = if source == FX_SOURCE {
            let rates = store::read_cleaned_rates(source, &path)?;
            (
                rates.len(),
                rates.points.first().map(|p| p.date),
                rates.points.last().map(|p| p.date),
            )
        } else {
            let series = store::read_cleaned_market(source, &path)?;
            (
                series.len(),
                series.bars.first().map(|b| b.date),
                series.bars.last().map(|b| b.date),
            )
        };

        match (first, last) {
            (Some(first), Some(last)) => {
                println!("  {:12} {:6} rows | {} → {}", source, rows, first, last);
            }
            _ => {
                println!("  {:12} empty", source);
            }
        }
    }

    println!("\n📆 {} datasets in {}", sources.len(), processed_dir.display());
    Ok(())
}
