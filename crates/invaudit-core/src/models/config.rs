//! Configuration structures for the audit pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Main configuration for the invaudit pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Reconciliation configuration.
    pub reconcile: ReconcileConfig,

    /// Export configuration.
    pub output: OutputConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Largest accepted input file in bytes.
    pub max_file_size: u64,

    /// Sample glyphs from page content streams for font fingerprinting.
    pub collect_glyphs: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            collect_glyphs: true,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of `Item_n` columns exposed in the flat invoice table.
    pub item_columns: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self { item_columns: 3 }
    }
}

/// Which reconciliation detectors run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Flag the same customer and item billed at different rates.
    pub rate_drift: bool,

    /// Flag vendors whose invoices use different font sets.
    pub font_drift: bool,

    /// Flag vendors whose invoices list different contact numbers.
    pub phone_drift: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            rate_drift: true,
            font_drift: true,
            phone_drift: true,
        }
    }
}

/// Export artifact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File stem of the invoice details artifact.
    pub invoices_name: String,

    /// File stem of the identified issues artifact.
    pub issues_name: String,

    /// Skip unreadable documents instead of aborting the batch.
    pub continue_on_error: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            invoices_name: "IA_inv".to_string(),
            issues_name: "IA_inv_issues".to_string(),
            continue_on_error: false,
        }
    }
}

impl AuditConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AuditError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AuditError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: AuditConfig =
            serde_json::from_str(r#"{"reconcile": {"font_drift": false}}"#).unwrap();
        assert!(!config.reconcile.font_drift);
        assert!(config.reconcile.rate_drift);
        assert_eq!(config.extraction.item_columns, 3);
        assert_eq!(config.output.invoices_name, "IA_inv");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AuditConfig::default();
        config.output.continue_on_error = true;
        config.save(&path).unwrap();

        let loaded = AuditConfig::from_file(&path).unwrap();
        assert!(loaded.output.continue_on_error);
        assert_eq!(loaded.pdf.max_file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"pdf": {"max_file_size": "large"}}"#).unwrap();

        match AuditConfig::from_file(&path) {
            Err(AuditError::Config(msg)) => assert!(msg.contains("config.json")),
            other => panic!("unexpected result: {:?}", other),
        }

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            AuditConfig::from_file(&missing),
            Err(AuditError::Io(_))
        ));
    }
}
