use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use voxcsg_core::constants::DEFAULT_GRID_SIZE;

/// Config file read from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "voxcsg.ron";

/// `store_path` value selecting the in-memory store.
pub const MEMORY_STORE: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config RON: {0}")]
    ParseError(String),
    #[error("Missing value for {0}")]
    MissingValue(String),
    #[error("Invalid value '{value}' for {flag}")]
    InvalidValue { flag: String, value: String },
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Side of the cubic voxel grid.
    pub grid_size: i32,
    pub listen_addr: String,
    /// Extra `*.ron` / legacy `*.json` shape definitions.
    pub shapes_dir: Option<PathBuf>,
    /// JSON object store, or `:memory:`.
    pub store_path: String,
    pub export_path: PathBuf,
    /// `mm`, `cm`, anything else is metres.
    pub export_unit: String,
    pub track_colors: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            listen_addr: "127.0.0.1:8765".to_string(),
            shapes_dir: None,
            store_path: "objects.json".to_string(),
            export_path: PathBuf::from("output.stl"),
            export_unit: "mm".to_string(),
            track_colors: true,
        }
    }
}

/// Outcome of command-line parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    Run(SessionConfig),
    Help,
}

pub const USAGE: &str = "\
Usage: voxcsg [OPTIONS]
  --config <path>        RON config file (default: ./voxcsg.ron if present)
  --listen <addr>        Websocket listen address (default: 127.0.0.1:8765)
  --store <path>         Object store JSON file, or :memory:
  --shapes <dir>         Directory of extra shape definitions
  --grid-size <n>        Voxel grid side (default: 300)
  --export-path <path>   Mesh export file (default: output.stl)";

impl SessionConfig {
    pub fn from_ron_str(ron_str: &str) -> Result<Self, ConfigError> {
        let options = ron::Options::default();
        options
            .from_str(ron_str)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    /// Build the config from process arguments (`args[0]` is the program).
    /// An explicit `--config` must exist; the default file is optional.
    /// Flags override file values.
    pub fn from_args(args: &[String], workdir: &Path) -> Result<CliAction, ConfigError> {
        let mut config_path: Option<PathBuf> = None;
        let mut overrides: Vec<(&str, &str)> = Vec::new();

        let mut i = 1;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--help" | "-h" => return Ok(CliAction::Help),
                "--config" | "--listen" | "--store" | "--shapes" | "--grid-size"
                | "--export-path" => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| ConfigError::MissingValue(flag.to_string()))?;
                    if flag == "--config" {
                        config_path = Some(PathBuf::from(value));
                    } else {
                        overrides.push((flag, value.as_str()));
                    }
                }
                other => return Err(ConfigError::UnknownArgument(other.to_string())),
            }
            i += 1;
        }

        let mut config = match config_path {
            Some(path) => Self::load(&path)?,
            None => {
                let default = workdir.join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load(&default)?
                } else {
                    Self::default()
                }
            }
        };

        for (flag, value) in overrides {
            match flag {
                "--listen" => config.listen_addr = value.to_string(),
                "--store" => config.store_path = value.to_string(),
                "--shapes" => config.shapes_dir = Some(PathBuf::from(value)),
                "--export-path" => config.export_path = PathBuf::from(value),
                "--grid-size" => {
                    config.grid_size = value.parse().map_err(|_| ConfigError::InvalidValue {
                        flag: flag.to_string(),
                        value: value.to_string(),
                    })?
                }
                _ => {}
            }
        }
        Ok(CliAction::Run(config))
    }

    pub fn uses_memory_store(&self) -> bool {
        self.store_path == MEMORY_STORE
    }
}
