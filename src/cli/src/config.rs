use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use twophase::SolverConfig;

/// Settings read from the TOML configuration file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Where the pruning tables are cached. Defaults to the user cache
    /// directory.
    pub cache: Option<PathBuf>,
    /// Always build the tables in memory and never touch the cache.
    pub no_cache: bool,
    pub solver: SolverConfig,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read the configuration file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Could not parse the configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// `<config dir>/twophase/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("twophase").join("config.toml"))
}

impl CliConfig {
    /// Reads `path` if given, otherwise the default configuration file if it
    /// exists, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_owned(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("No configuration file, using defaults");
                    return Ok(CliConfig::default());
                }
            },
        };
        debug!("Reading configuration from {}", path.display());
        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn cache_path(&self) -> Option<PathBuf> {
        if self.no_cache {
            return None;
        }
        self.cache.clone().or_else(twophase::tables::default_cache_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_solver_settings() {
        let config: CliConfig = toml::from_str(
            r#"
            cache = "/tmp/tables.bin"

            [solver]
            max_depth = 24
            order_by_heuristic = false
            "#,
        )
        .unwrap();
        assert_eq!(config.cache_path(), Some(PathBuf::from("/tmp/tables.bin")));
        assert_eq!(config.solver.max_depth, 24);
        assert!(!config.solver.order_by_heuristic);
        assert!(config.solver.prune_commuting_faces);
    }

    #[test]
    fn no_cache_wins() {
        let config: CliConfig = toml::from_str("cache = \"/tmp/x\"\nno_cache = true").unwrap();
        assert_eq!(config.cache_path(), None);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = CliConfig::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
