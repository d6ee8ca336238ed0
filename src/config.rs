use crate::error::ConfigError;
use crate::models::{default_extensions, AppConfig};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Default, Parser)]
#[command(
    name = "semana-pasada",
    about = "Extract last week's registrations and renewals from a folder of spreadsheets"
)]
pub struct Cli {
    /// Folder with the source spreadsheets
    #[arg(long, env = "CARPETA_ARCHIVOS")]
    pub input_dir: Option<PathBuf>,

    /// Folder that receives the `<name>_semana_pasada.xlsx` files
    #[arg(long, env = "CARPETA_SALIDA")]
    pub output_dir: Option<PathBuf>,

    /// File extensions to process, comma separated (default: xlsx).
    /// Output files are always written as `.xlsx`, whatever the input extension
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Also look inside subfolders of the input folder
    #[arg(long)]
    pub recursive: bool,

    /// Compute "last week" as if the tool ran on this day
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub reference_date: Option<NaiveDate>,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Store the resolved folders and options in the config file
    #[arg(long)]
    pub save_config: bool,

    /// Config file location (default: <config dir>/semana-pasada/config.json)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Settings a batch run needs, after merging every source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl ResolvedConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            input_dir: Some(self.input_dir.clone()),
            output_dir: Some(self.output_dir.clone()),
            extensions: self.extensions.clone(),
            recursive: self.recursive,
        }
    }
}

/// Default config file path
pub fn get_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("semana-pasada")
        .join(CONFIG_FILE)
}

/// Reads the config file; a missing or unreadable file yields the defaults
pub fn load_config(config_path: &Path) -> AppConfig {
    if !config_path.exists() {
        debug!(path = %config_path.display(), "no config file");
        return AppConfig::default();
    }

    let parsed = fs::read_to_string(config_path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<AppConfig>(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %config_path.display(), error = %e, "ignoring unreadable config file");
            AppConfig::default()
        }
    }
}

pub fn save_config(config_path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create config folder {:?}", parent))?;
    }

    let content = serde_json::to_string_pretty(config).context("cannot serialize config")?;
    fs::write(config_path, content)
        .with_context(|| format!("cannot write config file {:?}", config_path))?;

    Ok(())
}

/// Merges CLI/env values over the config file, checks the input folder
/// exists and creates the output folder.
pub fn resolve(cli: &Cli, file_config: AppConfig) -> Result<ResolvedConfig, ConfigError> {
    let input_dir = cli
        .input_dir
        .clone()
        .or(file_config.input_dir)
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConfigError::MissingSetting {
            name: "input folder",
            flag: "--input-dir",
            env: "CARPETA_ARCHIVOS",
        })?;

    let output_dir = cli
        .output_dir
        .clone()
        .or(file_config.output_dir)
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConfigError::MissingSetting {
            name: "output folder",
            flag: "--output-dir",
            env: "CARPETA_SALIDA",
        })?;

    if !input_dir.is_dir() {
        return Err(ConfigError::InputDirMissing(input_dir));
    }

    fs::create_dir_all(&output_dir).map_err(|source| ConfigError::CreateOutputDir {
        path: output_dir.clone(),
        source,
    })?;

    let extensions = normalize_extensions(
        cli.extensions
            .clone()
            .unwrap_or(file_config.extensions),
    );

    Ok(ResolvedConfig {
        input_dir,
        output_dir,
        extensions,
        recursive: cli.recursive || file_config.recursive,
    })
}

/// Lowercase, no leading dot, no blanks; falls back to `xlsx`
fn normalize_extensions(raw: Vec<String>) -> Vec<String> {
    let mut extensions: Vec<String> = raw
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect();
    extensions.dedup();

    if extensions.is_empty() {
        default_extensions()
    } else {
        extensions
    }
}
