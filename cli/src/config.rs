use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides the platform data directory.
pub const DATA_DIR_ENV: &str = "LIFTLOG_DATA_DIR";

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", "liftlog")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        Self::in_dir(data_dir)
    }

    pub fn in_dir(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("liftlog.db");

        Ok(Config { db_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let data_dir = tmp.path().join("nested").join("liftlog");

        let config = Config::in_dir(data_dir.clone()).unwrap();
        assert!(data_dir.is_dir());
        assert_eq!(config.db_path, data_dir.join("liftlog.db"));
    }

    #[test]
    fn test_in_dir_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(tmp.path().to_path_buf()).unwrap();
        assert_eq!(config.db_path.parent(), Some(tmp.path()));
    }
}
