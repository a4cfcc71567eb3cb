//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/elm-emaki/elm-emaki.toml`
//! 3. Environment variables: `EMAKI_*` prefix
//! 4. Command line flags (`--dir`, `--port`), applied by the CLI layer

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, CommandSpec, DomainError};

/// Port the file server binds to unless configured otherwise.
pub const DEFAULT_PORT: u16 = 8000;

/// Project directory, relative to the invocation directory.
pub const DEFAULT_DIR: &str = "emaki";

/// Prefix of environment overrides (`EMAKI_PORT`, `EMAKI_DIR`, ...).
pub const ENV_PREFIX: &str = "EMAKI";

/// Commented template written by `elm-emaki config init`.
pub const CONFIG_TEMPLATE: &str = r#"# elm-emaki configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/elm-emaki/elm-emaki.toml
#   Env:    EMAKI_* environment variables (EMAKI_PORT, EMAKI_DIR, ...)
#   Flags:  --dir, --port

# Emaki project directory, relative to where elm-emaki runs
# dir = "emaki"

# Port for `elm-emaki serve`
# port = 8000

# Elm compiler, as program plus leading arguments (no shell)
# compiler = ["npx", "elm"]

# Static file server, as program plus leading arguments (no shell)
# server = ["npx", "serve"]
"#;

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub compiler: Option<Vec<String>>,
    pub server: Option<Vec<String>>,
}

/// Unified configuration for elm-emaki.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Emaki project directory (default: emaki)
    pub dir: PathBuf,
    /// File server port (default: 8000)
    pub port: u16,
    /// Elm compiler command (default: ["elm"])
    pub compiler: Vec<String>,
    /// Static file server command (default: ["serve"])
    pub server: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_DIR),
            port: DEFAULT_PORT,
            compiler: vec!["elm".into()],
            server: vec!["serve".into()],
        }
    }
}

/// Get the XDG config directory for elm-emaki.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "elm-emaki").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// File name of the global config inside [`global_config_dir`].
pub const CONFIG_FILE_NAME: &str = "elm-emaki.toml";

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Compiler command as an argument vector.
    pub fn compiler_command(&self) -> Result<CommandSpec, DomainError> {
        CommandSpec::from_argv("compiler", &self.compiler)
    }

    /// File server command as an argument vector.
    pub fn server_command(&self) -> Result<CommandSpec, DomainError> {
        CommandSpec::from_argv("server", &self.server)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.dir.to_string_lossy().as_ref());
        self.dir = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            dir: overlay.dir.clone().unwrap_or_else(|| self.dir.clone()),
            port: overlay.port.unwrap_or(self.port),
            compiler: overlay
                .compiler
                .clone()
                .unwrap_or_else(|| self.compiler.clone()),
            server: overlay.server.clone().unwrap_or_else(|| self.server.clone()),
        }
    }

    /// Load settings with layered precedence from the standard locations.
    pub fn load() -> Result<Self, ApplicationError> {
        let global = global_config_path();
        Self::load_from(global.as_deref(), None)
    }

    /// Load settings from an explicit global config path and environment.
    ///
    /// # Arguments
    /// * `global_path` - Global config file; ignored if it does not exist
    /// * `env` - Environment to read `EMAKI_*` from; `None` reads the process environment
    pub fn load_from(
        global_path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config file
        if let Some(path) = global_path {
            if path.exists() {
                debug!("load: global config {}", path.display());
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Environment overrides
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();
        debug!("load: {:?}", current);
        Ok(current)
    }

    /// Apply EMAKI_* environment variables as explicit overrides.
    ///
    /// A port that is not a number is ignored and the previous value kept.
    /// Command overrides are split on whitespace (`EMAKI_COMPILER="npx elm"`).
    fn apply_env_overrides(
        mut settings: Self,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .source(env),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("dir") {
            settings.dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("port") {
            match val.trim().parse::<u16>() {
                Ok(port) => settings.port = port,
                Err(_) => warn!(
                    "ignoring {}_PORT={:?}: not a port number, using {}",
                    ENV_PREFIX, val, settings.port
                ),
            }
        }
        if let Ok(val) = config.get_string("compiler") {
            settings.compiler = split_command(&val);
        }
        if let Ok(val) = config.get_string("server") {
            settings.server = split_command(&val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }
}

fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_string).collect()
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_from(None, env(&[])).expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.dir, PathBuf::from("emaki"));
    }

    #[test]
    fn given_port_env_when_loading_then_overrides_default() {
        let settings = Settings::load_from(None, env(&[("EMAKI_PORT", "3000")])).unwrap();
        assert_eq!(settings.port, 3000);
    }

    #[test]
    fn given_non_numeric_port_env_when_loading_then_falls_back() {
        let settings = Settings::load_from(None, env(&[("EMAKI_PORT", "http")])).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn given_out_of_range_port_env_when_loading_then_falls_back() {
        let settings = Settings::load_from(None, env(&[("EMAKI_PORT", "70000")])).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
    }

    #[test]
    fn given_compiler_env_when_loading_then_splits_on_whitespace() {
        let settings =
            Settings::load_from(None, env(&[("EMAKI_COMPILER", "npx  elm")])).unwrap();
        assert_eq!(settings.compiler, vec!["npx".to_string(), "elm".to_string()]);
        assert_eq!(settings.compiler_command().unwrap().program, "npx");
    }

    #[test]
    fn given_empty_server_command_then_rejected() {
        let settings = Settings {
            server: vec![],
            ..Settings::default()
        };
        assert_eq!(
            settings.server_command(),
            Err(DomainError::EmptyCommand("server".into()))
        );
    }

    #[test]
    fn given_tilde_in_dir_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            dir: PathBuf::from("~/slides"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.dir.starts_with(&home));
        assert!(!settings.dir.to_string_lossy().contains('~'));
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips_keys() {
        let toml = Settings::default().to_toml().unwrap();
        assert!(toml.contains("port = 8000"));
        assert!(toml.contains(r#"dir = "emaki""#));
    }

    #[test]
    fn given_template_when_parsed_then_all_keys_commented_out() {
        let raw: RawSettings = toml::from_str(CONFIG_TEMPLATE).expect("template parses");
        assert!(raw.dir.is_none());
        assert!(raw.port.is_none());
    }
}
