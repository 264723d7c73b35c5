pub mod resolver;
pub mod roster;
pub mod rules;

use std::path::{Path, PathBuf};

pub use resolver::ResolverConfig;
pub use roster::Roster;
pub use rules::{FactionRules, NamedEdictBonus, RuleBook};

/// Errors raised while loading TOML configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// One line per problem, so every mistake is reported at once.
    #[error("{0}")]
    Invalid(String),
}

pub(crate) fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn collect_errors(errors: Vec<String>) -> Result<(), ConfigError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors.join("\n")))
    }
}
