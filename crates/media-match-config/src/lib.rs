pub mod config;
pub mod paths;

pub use config::{Config, ConfigError, PacingConfig, PlexConfig, PvrConfig, PvrInstanceConfig, RewriteRule, default_locale};
pub use paths::{PathManager, container_base_path};
