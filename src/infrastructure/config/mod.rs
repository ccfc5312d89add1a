// ============================================================
// CONFIGURATION LOADING
// ============================================================
// defaults < TOML file < NORMALIZER_* environment; CLI flags are applied
// by the caller on the extracted value

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::debug;

use crate::domain::address::NormalizerConfig;
use crate::domain::error::{AppError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "normalizer.toml";
pub const ENV_PREFIX: &str = "NORMALIZER_";

pub struct ConfigLoader {
    path: PathBuf,
    /// Read `NORMALIZER_*` variables (and `.env`)
    use_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            use_env: true,
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.use_env = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Provider stack; a missing TOML file contributes nothing.
    pub fn figment(&self) -> Figment {
        let figment = Figment::from(Serialized::defaults(NormalizerConfig::default()))
            .merge(Toml::file(&self.path));
        if self.use_env {
            figment.merge(Env::prefixed(ENV_PREFIX))
        } else {
            figment
        }
    }

    /// Extract the configuration without validating family ids.
    pub fn load(&self) -> Result<NormalizerConfig> {
        if self.use_env {
            // A missing .env is the normal case.
            dotenvy::dotenv().ok();
        }
        let config: NormalizerConfig = self.figment().extract()?;
        debug!(path = %self.path.display(), "Configuration loaded");
        Ok(config)
    }
}

/// Check `config` against the registered family ids.
pub fn validate_config(config: &NormalizerConfig, known_families: &[&str]) -> Result<()> {
    config
        .validate(known_families)
        .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address::BatchMode;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let config = ConfigLoader::new()
            .with_path("does-not-exist.toml")
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config, NormalizerConfig::default());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "input_dir = \"ciclos\"\nmode = \"dispatch\"\nfamilies = [\"mayo\", \"recreo\"]"
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_path(file.path())
            .without_env()
            .load()
            .unwrap();
        assert_eq!(config.input_dir, PathBuf::from("ciclos"));
        assert_eq!(config.mode, BatchMode::Dispatch);
        assert_eq!(config.families, vec!["mayo", "recreo"]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "mode = \"sideways\"").unwrap();
        let err = ConfigLoader::new()
            .with_path(file.path())
            .without_env()
            .load()
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }

    #[test]
    fn test_validate_config_wraps_message() {
        let config = NormalizerConfig::default().with_families(vec!["nowhere".into()]);
        match validate_config(&config, &["mayo"]) {
            Err(AppError::ConfigError(msg)) => assert!(msg.contains("nowhere")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
