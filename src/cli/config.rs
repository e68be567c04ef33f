use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::{
    form::matricula::{DEFAULT_ID_FIELD, DEFAULT_SURNAME_FIELD},
    presentation::background::default_backgrounds,
    trace::logger::DEFAULT_TRACE_PATH,
    wizard::wizard::WizardOptions,
};

pub const DEFAULT_CONFIG_PATH: &str = "registration-wizard.yaml";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "registration-wizard",
    version,
    about = "Multi-step registration form with validated steps and single submission"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Submission endpoint (overrides the config file)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Trace file for operator diagnostics (JSON lines)
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to config file (default: registration-wizard.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill the form interactively, step by step, and submit it
    Run {
        /// Form definition YAML (default: builtin registration form)
        #[arg(long)]
        form: Option<String>,

        /// Accept the submission locally instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Report step validity and the registration code for a values file
    Check {
        /// YAML map of field name to value
        #[arg(long)]
        values: String,

        #[arg(long)]
        form: Option<String>,
    },

    /// Walk every step with a values file and submit once
    Submit {
        #[arg(long)]
        values: String,

        #[arg(long)]
        form: Option<String>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Print the form definition as YAML
    ShowForm {
        #[arg(long)]
        form: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `registration-wizard.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub submit: SubmitConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub matricula: MatriculaConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubmitConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    #[serde(default = "default_backgrounds")]
    pub backgrounds: Vec<String>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            backgrounds: default_backgrounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatriculaConfig {
    #[serde(default = "default_surname_field")]
    pub surname_field: String,

    #[serde(default = "default_id_field")]
    pub id_field: String,
}

impl Default for MatriculaConfig {
    fn default() -> Self {
        Self {
            surname_field: default_surname_field(),
            id_field: default_id_field(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    #[serde(default = "default_trace_path")]
    pub path: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            path: default_trace_path(),
        }
    }
}

// Serde default helpers
fn default_surname_field() -> String { DEFAULT_SURNAME_FIELD.to_string() }
fn default_id_field() -> String { DEFAULT_ID_FIELD.to_string() }
fn default_trace_path() -> String { DEFAULT_TRACE_PATH.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            eprintln!("Warning: ignoring malformed config '{}': {}", config_path, e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// CLI flag wins over the config file.
pub fn resolve_endpoint(cli_endpoint: Option<&str>, config: &AppConfig) -> Option<String> {
    cli_endpoint
        .map(str::to_string)
        .or_else(|| config.submit.endpoint.clone())
}

pub fn resolve_trace_path(cli_trace: Option<&str>, config: &AppConfig) -> String {
    cli_trace
        .map(str::to_string)
        .unwrap_or_else(|| config.trace.path.clone())
}

pub fn build_wizard_options(config: &AppConfig, endpoint: &str) -> WizardOptions {
    WizardOptions {
        endpoint: endpoint.to_string(),
        backgrounds: config.presentation.backgrounds.clone(),
        surname_field: config.matricula.surname_field.clone(),
        id_field: config.matricula.id_field.clone(),
    }
}
