//! Configuration management for attex.
//!
//! Parses `attex.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Credential fields support environment variable expansion
//! (`${VAR}` and `${VAR:-default}`):
//!
//! - `rally.base_url`
//! - `rally.username`
//! - `rally.password`
//! - `rally.api_key`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "attex.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded
/// config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the export output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the workspace OID to export.
    pub workspace: Option<String>,
    /// Override the WSAPI version string.
    pub api_version: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rally connection configuration.
    pub rally: Option<RallyConfig>,
    /// Export output configuration.
    pub export: ExportConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Rally connection configuration.
#[derive(Debug, Deserialize)]
pub struct RallyConfig {
    /// Server base URL. The `/slm` service path is appended by the
    /// client when missing.
    pub base_url: String,
    /// Username for HTTP Basic authentication.
    #[serde(default)]
    pub username: String,
    /// Password for HTTP Basic authentication.
    #[serde(default)]
    pub password: String,
    /// API key used instead of username/password when set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// WSAPI version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Object ID of the workspace to export.
    pub workspace: String,
}

fn default_api_version() -> String {
    "v2.0".to_owned()
}

impl RallyConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any field is empty or has
    /// an invalid format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.base_url, "rally.base_url")?;
        require_http_url(&self.base_url, "rally.base_url")?;
        require_non_empty(&self.workspace, "rally.workspace")?;
        require_non_empty(&self.api_version, "rally.api_version")?;
        if let Some(key) = &self.api_key {
            require_non_empty(key, "rally.api_key")?;
        } else {
            require_non_empty(&self.username, "rally.username")?;
            require_non_empty(&self.password, "rally.password")?;
        }
        Ok(())
    }
}

/// Export output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Root directory the export tree is created under. Must not exist
    /// when the run starts.
    pub output_dir: PathBuf,
    /// Query page size for attachment enumeration.
    pub page_size: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./Saved_Attachments"),
            page_size: 200,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`rally.password`").
        field: String,
        /// Error message (e.g., "${`RALLY_PASSWORD`} is not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `attex.toml` in the current directory and parents,
    /// falling back to built-in defaults when none is found.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist or
    /// parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Get validated Rally configuration.
    ///
    /// Returns the Rally config if the `[rally]` section is present and
    /// all fields are valid. Use this instead of accessing the `rally`
    /// field directly when the command requires a connection.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the section is missing or
    /// invalid.
    pub fn require_rally(&self) -> Result<&RallyConfig, ConfigError> {
        let rally = self.rally.as_ref().ok_or_else(|| {
            ConfigError::Validation("[rally] section required in config".into())
        })?;
        rally.validate()?;
        Ok(rally)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(output_dir) = &settings.output_dir {
            self.export.output_dir.clone_from(output_dir);
        }
        if let Some(rally) = &mut self.rally {
            if let Some(workspace) = &settings.workspace {
                rally.workspace.clone_from(workspace);
            }
            if let Some(api_version) = &settings.api_version {
                rally.api_version.clone_from(api_version);
            }
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.validate()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file. The `[rally]`
    /// section is validated lazily via [`Config::require_rally`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.export.page_size == 0 {
            return Err(ConfigError::Validation(
                "export.page_size cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in credential strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(rally) = &mut self.rally {
            rally.base_url = expand::expand_env(&rally.base_url, "rally.base_url")?;
            rally.username = expand::expand_env(&rally.username, "rally.username")?;
            rally.password = expand::expand_env(&rally.password, "rally.password")?;
            if let Some(key) = &rally.api_key {
                rally.api_key = Some(expand::expand_env(key, "rally.api_key")?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_rally_config() -> RallyConfig {
        RallyConfig {
            base_url: "https://rally.example.com".to_owned(),
            username: "user@example.com".to_owned(),
            password: "topsecret".to_owned(),
            api_key: None,
            api_version: "v2.0".to_owned(),
            workspace: "12345678910".to_owned(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.rally.is_none());
        assert_eq!(
            config.export.output_dir,
            PathBuf::from("./Saved_Attachments")
        );
        assert_eq!(config.export.page_size, 200);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.rally.is_none());
        assert_eq!(config.export.page_size, 200);
    }

    #[test]
    fn test_parse_rally_section() {
        let toml = r#"
[rally]
base_url = "https://rally.example.com"
username = "user@example.com"
password = "topsecret"
workspace = "12345678910"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let rally = config.rally.unwrap();
        assert_eq!(rally.base_url, "https://rally.example.com");
        assert_eq!(rally.api_version, "v2.0"); // default
        assert_eq!(rally.workspace, "12345678910");
        assert!(rally.api_key.is_none());
    }

    #[test]
    fn test_parse_export_section() {
        let toml = r#"
[export]
output_dir = "/archive/rally"
page_size = 50
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.export.output_dir, PathBuf::from("/archive/rally"));
        assert_eq!(config.export.page_size, 50);
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let config: Config = toml::from_str("[export]\npage_size = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config {
            rally: Some(valid_rally_config()),
            ..Config::default()
        };
        let settings = CliSettings {
            output_dir: Some(PathBuf::from("/tmp/out")),
            workspace: Some("999".to_owned()),
            api_version: Some("1.43".to_owned()),
        };

        config.apply_cli_settings(&settings);

        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/out"));
        let rally = config.rally.unwrap();
        assert_eq!(rally.workspace, "999");
        assert_eq!(rally.api_version, "1.43");
    }

    #[test]
    fn test_apply_cli_settings_empty_is_noop() {
        let mut config = Config {
            rally: Some(valid_rally_config()),
            ..Config::default()
        };
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.rally.unwrap().workspace, "12345678910");
        assert_eq!(
            config.export.output_dir,
            PathBuf::from("./Saved_Attachments")
        );
    }

    #[test]
    fn test_require_rally_missing_section() {
        let config = Config::default();
        let err = config.require_rally().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("[rally]"));
    }

    #[test]
    fn test_require_rally_returns_validated() {
        let config = Config {
            rally: Some(valid_rally_config()),
            ..Config::default()
        };
        assert!(config.require_rally().is_ok());
    }

    #[test]
    fn test_rally_validate_requires_credentials() {
        let rally = RallyConfig {
            username: String::new(),
            ..valid_rally_config()
        };
        let err = rally.validate().unwrap_err();
        assert!(err.to_string().contains("rally.username"));
    }

    #[test]
    fn test_rally_validate_api_key_stands_in_for_credentials() {
        let rally = RallyConfig {
            username: String::new(),
            password: String::new(),
            api_key: Some("_abc123".to_owned()),
            ..valid_rally_config()
        };
        assert!(rally.validate().is_ok());
    }

    #[test]
    fn test_rally_validate_rejects_non_http_url() {
        let rally = RallyConfig {
            base_url: "rally.example.com".to_owned(),
            ..valid_rally_config()
        };
        let err = rally.validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_expand_env_vars_in_rally_section() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("ATTEX_TEST_CFG_PASSWORD", "from-env");
        }

        let toml = r#"
[rally]
base_url = "https://rally.example.com"
username = "user@example.com"
password = "${ATTEX_TEST_CFG_PASSWORD}"
workspace = "1"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();
        assert_eq!(config.rally.unwrap().password, "from-env");

        unsafe {
            std::env::remove_var("ATTEX_TEST_CFG_PASSWORD");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("ATTEX_TEST_CFG_MISSING");
        }

        let toml = r#"
[rally]
base_url = "https://rally.example.com"
username = "user@example.com"
password = "${ATTEX_TEST_CFG_MISSING}"
workspace = "1"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("rally.password"));
    }
}
