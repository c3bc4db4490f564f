use media_match_config::Config;
use serde::Serialize;
use std::time::Duration;

/// Run-scoped settings handed to every component
#[derive(Debug, Clone, Serialize)]
pub struct RunOptions {
    /// Simulate mutating calls instead of sending them
    pub dry_run: bool,
    /// Language tag appended to replacement GUIDs
    pub locale: String,
    /// Pause between consecutive split/match calls
    pub action_delay: Duration,
    /// Pause for Plex to rescan after splitting
    pub rescan_delay: Duration,
}

impl RunOptions {
    pub fn from_config(config: &Config, dry_run: bool) -> Self {
        Self {
            dry_run,
            locale: config.locale.clone(),
            action_delay: config.pacing.action_delay(),
            rescan_delay: config.pacing.rescan_delay(),
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            locale: media_match_config::default_locale(),
            action_delay: Duration::from_secs(15),
            rescan_delay: Duration::from_secs(10),
        }
    }
}
