use serde::Deserialize;
use std::path::Path;

use super::{collect_errors, read_config_file, ConfigError};

#[derive(Debug, Clone, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
    /// Faction rules TOML; the built-in rule book when absent.
    #[serde(default)]
    pub rules_file: Option<String>,
    /// Roster TOML; the built-in roster when absent.
    #[serde(default)]
    pub roster_file: Option<String>,
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default = "default_orders_file")]
    pub orders_file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_state_file() -> String {
    "world.json".to_string()
}
fn default_orders_file() -> String {
    "orders.json".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            log_level: default_log_level(),
            log_json: false,
            rules_file: None,
            roster_file: None,
            state_file: default_state_file(),
            orders_file: default_orders_file(),
        }
    }
}

impl ResolverConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_config_file(path)?;
        Self::from_toml_str(&content, path)
    }

    /// Missing config file means defaults; any other read error is reported.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let config: ResolverConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if self.state_file.trim().is_empty() {
            errors.push(
                "state_file must not be empty. Example: state_file = \"world.json\"".to_string(),
            );
        }

        if self.orders_file.trim().is_empty() {
            errors.push(
                "orders_file must not be empty. Example: orders_file = \"orders.json\"".to_string(),
            );
        }

        for (key, value) in [("rules_file", &self.rules_file), ("roster_file", &self.roster_file)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                errors.push(format!("{} must not be empty when set", key));
            }
        }

        collect_errors(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn test_path() -> PathBuf {
        PathBuf::from("test-config.toml")
    }

    #[test]
    fn valid_config_loads_all_fields() {
        let toml = r#"
            log_level = "debug"
            log_json = true
            rules_file = "./rules.toml"
            roster_file = "./roster.toml"
            state_file = "./data/world.json"
            orders_file = "./data/orders.json"
        "#;
        let config = ResolverConfig::from_toml_str(toml, &test_path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
        assert_eq!(config.rules_file.as_deref(), Some("./rules.toml"));
        assert_eq!(config.roster_file.as_deref(), Some("./roster.toml"));
        assert_eq!(config.state_file, "./data/world.json");
        assert_eq!(config.orders_file, "./data/orders.json");
    }

    #[test]
    fn defaults_applied_for_empty_config() {
        let config = ResolverConfig::from_toml_str("", &test_path()).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(config.rules_file.is_none());
        assert!(config.roster_file.is_none());
        assert_eq!(config.state_file, "world.json");
        assert_eq!(config.orders_file, "orders.json");
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err = ResolverConfig::from_toml_str(r#"log_level = "verbose""#, &test_path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("log_level"));
    }

    #[test]
    fn multiple_errors_reported_together() {
        let toml = "log_level = \"loud\"\nstate_file = \"\"\nrules_file = \" \"";
        let err = ResolverConfig::from_toml_str(toml, &test_path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("log_level"));
        assert!(err.contains("state_file"));
        assert!(err.contains("rules_file"));
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err = ResolverConfig::from_toml_str("log_level = [invalid", &test_path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("test-config.toml"));
    }

    #[test]
    fn from_file_loads_valid_config() {
        let mut tmp = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(tmp, "log_level = \"warn\"").unwrap();
        let config = ResolverConfig::from_file(tmp.path()).unwrap();
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn from_file_missing_file_error() {
        let err = ResolverConfig::from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("Cannot read"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config =
            ResolverConfig::from_file_or_default(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.log_level, "info");
    }
}
