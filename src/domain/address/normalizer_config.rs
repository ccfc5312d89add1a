// ============================================================
// NORMALIZER CONFIGURATION
// ============================================================
// Values controlling a batch run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How rows are routed to neighborhood families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Every family processes every table; outputs are concatenated
    #[default]
    PerFamily,
    /// Each row is routed once through the ordered dispatcher
    Dispatch,
}

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Directory scanned for input tables (default: `entradas`)
    pub input_dir: PathBuf,

    /// Consolidated CSV written at the end of the run
    pub output_path: PathBuf,

    /// Family ids to run; empty runs every registered family
    pub families: Vec<String>,

    pub mode: BatchMode,

    /// Accepted input extensions, lowercase, without the dot
    pub extensions: Vec<String>,

    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("entradas"),
            output_path: PathBuf::from("CICLOS_PROCESADOS_UNIFICADO.csv"),
            families: Vec::new(),
            mode: BatchMode::PerFamily,
            extensions: vec!["xlsx".to_string(), "xls".to_string(), "csv".to_string()],
            log_level: "info".to_string(),
        }
    }
}

impl NormalizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_families(mut self, families: Vec<String>) -> Self {
        self.families = families;
        self
    }

    pub fn with_mode(mut self, mode: BatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// True when `extension` (any case) is an accepted input type.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.extensions.iter().any(|e| *e == extension)
    }

    /// Validate configuration values against the registered family ids
    pub fn validate(&self, known_families: &[&str]) -> Result<(), String> {
        if self.extensions.is_empty() {
            return Err("extensions must not be empty".to_string());
        }
        if self.output_path.as_os_str().is_empty() {
            return Err("output_path must not be empty".to_string());
        }
        if let Some(unknown) = self
            .families
            .iter()
            .find(|id| !known_families.contains(&id.as_str()))
        {
            return Err(format!("unknown family id: {}", unknown));
        }
        Ok(())
    }
}
