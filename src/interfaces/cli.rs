// ============================================================
// COMMAND LINE INTERFACE
// ============================================================
// Argument definitions and the three commands they map to

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::application::use_cases::batch_orchestrator::BatchOrchestrator;
use crate::application::use_cases::normalization::{family_ids, normalize_address, FAMILIES};
use crate::domain::address::{BatchMode, NormalizerConfig, Validation};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::{validate_config, ConfigLoader};

#[derive(Parser, Debug)]
#[command(
    name = "address_normalizer",
    version,
    about = "Normalize neighborhood addresses from Armenia billing exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Normalize every table in the input directory into one CSV
    Run(RunArgs),

    /// Normalize a single address through the dispatcher
    Address {
        /// Raw address text
        text: String,
    },

    /// List registered families in dispatch order
    Families,
}

#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Consolidated output CSV
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Restrict the run to these family ids (repeatable)
    #[arg(long = "family")]
    pub families: Vec<String>,

    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Print the batch summary as JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    #[value(name = "per_family")]
    PerFamily,
    #[value(name = "dispatch")]
    Dispatch,
}

impl From<ModeArg> for BatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::PerFamily => BatchMode::PerFamily,
            ModeArg::Dispatch => BatchMode::Dispatch,
        }
    }
}

impl RunArgs {
    /// Configuration loader for `--config`, or the default file.
    pub fn loader(&self) -> ConfigLoader {
        match &self.config {
            Some(path) => ConfigLoader::new().with_path(path),
            None => ConfigLoader::new(),
        }
    }

    /// Flags given on the command line win over every other layer.
    pub fn apply(&self, mut config: NormalizerConfig) -> NormalizerConfig {
        if let Some(dir) = &self.input_dir {
            config = config.with_input_dir(dir);
        }
        if let Some(output) = &self.output {
            config = config.with_output_path(output);
        }
        if !self.families.is_empty() {
            config = config.with_families(self.families.clone());
        }
        if let Some(mode) = self.mode {
            config = config.with_mode(mode.into());
        }
        config
    }
}

/// Load, override and validate the configuration for a batch run.
pub fn resolve_config(args: &RunArgs) -> Result<NormalizerConfig> {
    let config = args.apply(args.loader().load()?);
    validate_config(&config, &family_ids())?;
    Ok(config)
}

/// Batch run; returns the printed report.
pub fn run_batch(config: NormalizerConfig, json: bool) -> Result<String> {
    let summary = BatchOrchestrator::new(config).run()?;
    if json {
        return serde_json::to_string_pretty(&summary)
            .map_err(|e| AppError::Internal(format!("Failed to serialize summary: {}", e)));
    }
    Ok(summary.report())
}

/// Family, normalized text and flag for one address.
pub fn describe_address(text: &str) -> String {
    let outcome = normalize_address(text);
    format!(
        "family: {}\nnormalized: {}\nvalidated: {}",
        outcome.family.unwrap_or("-"),
        outcome.result.text,
        Validation::from_bool(outcome.result.validated)
    )
}

pub fn list_families() -> String {
    let mut out = String::new();
    for (position, family) in FAMILIES.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {:<16} {}",
            position + 1,
            family.id(),
            family.display_name()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "address_normalizer",
            "run",
            "--input-dir",
            "ciclos",
            "--family",
            "mayo",
            "--family",
            "recreo",
            "--mode",
            "dispatch",
            "--json",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.json);
        let config = args.apply(NormalizerConfig::default());
        assert_eq!(config.input_dir, PathBuf::from("ciclos"));
        assert_eq!(config.families, vec!["mayo", "recreo"]);
        assert_eq!(config.mode, BatchMode::Dispatch);
        assert_eq!(config.output_path, NormalizerConfig::default().output_path);
    }

    #[test]
    fn test_parse_mode_name() {
        assert!(Cli::try_parse_from(["address_normalizer", "run", "--mode", "per_family"]).is_ok());
        assert!(Cli::try_parse_from(["address_normalizer", "run", "--mode", "fast"]).is_err());
    }

    #[test]
    fn test_describe_address() {
        let out = describe_address("URB 25 DE MAYO MZN A CASA 12B");
        assert!(out.contains("family: mayo"));
        assert!(out.contains("normalized: URB 25 DE MAYO MZ A CS 12B"));
        assert!(out.ends_with("validated: 1"));

        let out = describe_address("sin direccion");
        assert!(out.contains("family: -"));
        assert!(out.ends_with("validated: 0"));
    }

    #[test]
    fn test_list_families_in_order() {
        let out = list_families();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), FAMILIES.len());
        assert!(lines[0].contains("mercar_armenia"));
        assert!(lines[12].contains("rojas_pinilla"));
    }

    #[test]
    fn test_resolve_config_rejects_unknown_family() {
        let args = RunArgs {
            config: Some(PathBuf::from("does-not-exist.toml")),
            families: vec!["nowhere".into()],
            ..RunArgs::default()
        };
        assert!(resolve_config(&args).is_err());
    }

    #[test]
    fn test_run_batch_json_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("entradas");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("c1.csv"), "NIU;DIRECCION\n1;BRR EL RECREO MZ D 12\n").unwrap();

        let config = NormalizerConfig::default()
            .with_input_dir(&input)
            .with_output_path(dir.path().join("out.csv"));
        let out = run_batch(config, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["files_read"], 1);
        assert_eq!(value["overall"]["validated"], 1);
    }
}
