//! Where the ledger keeps its data.
//!
//! Resolution order:
//! 1. `TAQUILLA_DATA_DIR` environment variable
//! 2. the platform data directory (`~/.local/share/taquilla` on Linux)
//! 3. `./taquilla-data`

use std::path::PathBuf;

use directories::ProjectDirs;

pub const DATA_DIR_ENV: &str = "TAQUILLA_DATA_DIR";

const FALLBACK_DIR: &str = "taquilla-data";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Config {
        Config::resolve(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(override_dir: Option<PathBuf>) -> Config {
        let data_dir = override_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .or_else(|| ProjectDirs::from("", "", "taquilla").map(|dirs| dirs.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR));

        Config { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_override_wins() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/sales")));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/sales"));
    }

    #[test]
    fn test_empty_override_ignored() {
        let config = Config::resolve(Some(PathBuf::new()));
        assert!(!config.data_dir.as_os_str().is_empty());
    }
}
