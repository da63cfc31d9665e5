//! Configuration and rule-table loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system
//! directory), and loading the rule table the import resolves against.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use pipewright::config::RuleTable;
use pipewright::schedule::{Wave, WavePolicy};
use pipewright::{ImportError, UnknownKeywordPolicy};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("No rule table: pass --rules or set `import.rules` in the configuration")]
    MissingRuleTable,
}

impl From<ConfigError> for ImportError {
    fn from(err: ConfigError) -> Self {
        ImportError::Io(std::io::Error::other(err.to_string()))
    }
}

/// Unknown-keyword policy as spelled in the configuration file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum KeywordPolicy {
    #[default]
    Warn,
    Deny,
}

impl From<KeywordPolicy> for UnknownKeywordPolicy {
    fn from(policy: KeywordPolicy) -> Self {
        match policy {
            KeywordPolicy::Warn => UnknownKeywordPolicy::Warn,
            KeywordPolicy::Deny => UnknownKeywordPolicy::Deny,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Import pipeline section.
    #[serde(default)]
    import: ImportConfig,
}

/// The `[import]` section: keyword policy, default rule-table path, and an
/// optional wave-policy override via `[[import.wave]]` tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    unknown_keywords: KeywordPolicy,

    #[serde(default)]
    rules: Option<PathBuf>,

    #[serde(default, rename = "wave")]
    waves: Vec<Wave>,
}

impl AppConfig {
    /// How the keyword dictionary treats unknown keywords.
    pub fn unknown_keywords(&self) -> UnknownKeywordPolicy {
        self.import.unknown_keywords.into()
    }

    /// Default rule-table path, when the `--rules` flag is omitted.
    pub fn default_rules(&self) -> Option<&Path> {
        self.import.rules.as_deref()
    }

    /// Wave policy: the configured override, or the standard four waves.
    pub fn wave_policy(&self) -> WavePolicy {
        if self.import.waves.is_empty() {
            WavePolicy::standard()
        } else {
            WavePolicy::new(self.import.waves.clone())
        }
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (pipewright/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ImportError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("pipewright/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "pipewright", "pipewright") {
        let config_dir = proj_dirs.config_dir();
        let system_config = config_dir.join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(&system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: &Path) -> Result<AppConfig, ImportError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }
    let contents = fs::read_to_string(path)?;
    let config =
        toml::from_str(&contents).map_err(|err| ConfigError::Parse(err.to_string()))?;
    Ok(config)
}

/// Load the rule table from the `--rules` flag or the configured default.
///
/// # Errors
///
/// Returns an error when neither a flag nor a configured path names a
/// table, or the file is missing or malformed.
pub fn load_rule_table(
    explicit_path: Option<&str>,
    config: &AppConfig,
) -> Result<RuleTable, ImportError> {
    let path: PathBuf = match explicit_path {
        Some(path) => PathBuf::from(path),
        None => config
            .default_rules()
            .map(Path::to_path_buf)
            .ok_or(ConfigError::MissingRuleTable)?,
    };

    if !path.exists() {
        return Err(ConfigError::MissingFile(path).into());
    }

    info!(path = path.display().to_string(); "Loading rule table");
    let contents = fs::read_to_string(&path)?;
    let table: RuleTable =
        toml::from_str(&contents).map_err(|err| ConfigError::Parse(err.to_string()))?;

    if table.is_empty() {
        debug!(path = path.display().to_string(); "Rule table has no rows");
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_standard_waves() {
        let config = AppConfig::default();
        assert!(config.wave_policy().validate().is_ok());
        assert_eq!(
            config.unknown_keywords(),
            UnknownKeywordPolicy::Warn
        );
    }

    #[test]
    fn config_parses_wave_override() {
        let config: AppConfig = toml::from_str(
            r#"
            [import]
            unknown_keywords = "deny"
            rules = "tables/rules.toml"

            [[import.wave]]
            name = "pipes"
            kinds = ["PIPE"]

            [[import.wave]]
            name = "rest"
            remainder = true
            "#,
        )
        .unwrap();

        assert_eq!(config.unknown_keywords(), UnknownKeywordPolicy::Deny);
        assert_eq!(config.wave_policy().waves().len(), 2);
        assert!(config.default_rules().is_some());
    }
}
