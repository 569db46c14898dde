//! CSV loading and saving for the command line.

use crate::config::CsvOptions;
use anyhow::{Context as _, Result};
use polars::prelude::*;
use std::path::Path;

fn separator(options: &CsvOptions) -> Result<u8> {
    u8::try_from(options.separator)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("CSV separator must be ASCII, got {:?}", options.separator))
}

pub fn load_csv(path: &Path, options: &CsvOptions) -> Result<DataFrame> {
    LazyCsvReader::new(path)
        .with_infer_schema_length(options.infer_schema_length)
        .with_has_header(options.has_header)
        .with_separator(separator(options)?)
        .finish()?
        .collect()
        .with_context(|| format!("Failed to read CSV: {}", path.display()))
}

pub fn save_csv(df: &mut DataFrame, path: &Path, options: &CsvOptions) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path).context("Failed to create CSV file")?;
    CsvWriter::new(file)
        .include_header(options.has_header)
        .with_separator(separator(options)?)
        .finish(df)
        .context("Failed to write CSV file")?;
    Ok(())
}
