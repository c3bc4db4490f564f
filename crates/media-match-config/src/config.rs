use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed decoding config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid rewrite pattern for pvr {pvr:?}: {source}")]
    Rewrite {
        pvr: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Language tag appended to GUIDs submitted to Plex
    #[serde(default = "default_locale")]
    pub locale: String,
    pub plex: PlexConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub pvr: PvrConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlexConfig {
    pub url: String,
    pub token: String,
    /// Path to com.plexapp.plugins.library.db
    pub database: PathBuf,
}

/// Delays around calls that make Plex refresh metadata in the background
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    #[serde(default = "default_action_delay_secs")]
    pub action_delay_secs: u64,
    #[serde(default = "default_rescan_delay_secs")]
    pub rescan_delay_secs: u64,
}

impl PacingConfig {
    pub fn action_delay(&self) -> Duration {
        Duration::from_secs(self.action_delay_secs)
    }

    pub fn rescan_delay(&self) -> Duration {
        Duration::from_secs(self.rescan_delay_secs)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            action_delay_secs: default_action_delay_secs(),
            rescan_delay_secs: default_rescan_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PvrConfig {
    #[serde(default)]
    pub sonarr: Vec<PvrInstanceConfig>,
    #[serde(default)]
    pub radarr: Vec<PvrInstanceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PvrInstanceConfig {
    pub name: String,
    pub url: String,
    pub api_key: String,
    #[serde(default)]
    pub rewrite: RewriteRule,
}

/// Regex substitution mapping a PVR path onto the Plex mount
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RewriteRule {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl RewriteRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// A rule missing either side leaves paths untouched
    pub fn is_identity(&self) -> bool {
        self.from.is_empty() || self.to.is_empty()
    }
}

pub fn default_locale() -> String {
    "en".to_string()
}

fn default_action_delay_secs() -> u64 {
    15
}

fn default_rescan_delay_secs() -> u64 {
    10
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plex.url.is_empty() {
            return Err(ConfigError::Invalid("you must set a plex url".to_string()));
        }
        if self.plex.token.is_empty() {
            return Err(ConfigError::Invalid("you must set a plex token".to_string()));
        }
        if self.plex.database.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("you must set a plex database".to_string()));
        }
        if self.locale.is_empty() {
            return Err(ConfigError::Invalid("locale cannot be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for pvr in self.pvr.sonarr.iter().chain(self.pvr.radarr.iter()) {
            if pvr.name.is_empty() {
                return Err(ConfigError::Invalid("every pvr needs a name".to_string()));
            }
            if pvr.url.is_empty() {
                return Err(ConfigError::Invalid(format!("pvr {:?} has no url", pvr.name)));
            }
            if pvr.api_key.is_empty() {
                return Err(ConfigError::Invalid(format!("pvr {:?} has no api_key", pvr.name)));
            }
            if !seen.insert(pvr.name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!("pvr name {:?} is not unique", pvr.name)));
            }
            if !pvr.rewrite.is_identity() {
                regex::Regex::new(&pvr.rewrite.from).map_err(|source| ConfigError::Rewrite {
                    pvr: pvr.name.clone(),
                    source,
                })?;
            }
        }

        Ok(())
    }

    /// Names of every configured PVR, Radarr first
    pub fn pvr_names(&self) -> Vec<&str> {
        self.pvr
            .radarr
            .iter()
            .chain(self.pvr.sonarr.iter())
            .map(|p| p.name.as_str())
            .collect()
    }
}
