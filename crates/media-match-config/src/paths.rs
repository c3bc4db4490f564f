use std::path::{Path, PathBuf};

/// Get the container base path from environment variable, defaulting to "/config"
pub fn container_base_path() -> PathBuf {
    std::env::var("ARRMATCH_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/config"))
}

#[derive(Debug, Clone)]
pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Option<Self> {
        let base_dir = dirs::config_dir()?.join("arrmatch");

        Some(Self {
            config_dir: base_dir.clone(),
            log_dir: base_dir.join("logs"),
        })
    }

    pub fn from_docker_env() -> Self {
        let base = container_base_path();
        // Config file at base level, logs in a subdir
        Self {
            config_dir: base.clone(),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("activity.log")
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // Containers mount the base path; its presence means we run in one
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        // e.g. ~/.config/arrmatch on Linux
        Self::new().unwrap_or_else(Self::from_docker_env)
    }
}
