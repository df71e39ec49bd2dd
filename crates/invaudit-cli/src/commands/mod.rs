//! Subcommands.

pub mod audit;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use invaudit_core::{AuditConfig, Table};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invaudit")
        .join("config.json")
}

/// The file named by `-c`, or the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load the configuration, falling back to defaults when no file exists at
/// the default location. An explicit `-c` path must exist.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<AuditConfig> {
    match config_path {
        Some(path) => Ok(AuditConfig::from_file(Path::new(path))?),
        None => {
            let path = default_config_path();
            if path.exists() {
                Ok(AuditConfig::from_file(&path)?)
            } else {
                Ok(AuditConfig::default())
            }
        }
    }
}

/// Render a table as CSV with a header row.
pub fn table_to_csv(table: &Table) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
