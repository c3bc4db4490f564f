use super::load_config;
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use media_match_sources::{CatalogStore, MediaServer, PlexClient, PlexDatastore, PvrFactoryRegistry};
use serde_json::json;
use std::path::Path;

/// Validate the config, open the Plex database and reach the Plex server
pub async fn run_check(config_path: &Path, output: &Output) -> Result<()> {
    let config = load_config(config_path)?;

    let store = PlexDatastore::open(&config.plex.database)?;
    let libraries = store.list_libraries()?;

    let server = PlexClient::new(&config.plex.url, &config.plex.token)?;
    server.check_available().await?;

    // Instantiating each PVR checks its url and api key are usable
    let registry = PvrFactoryRegistry::new();
    let mut pvrs = Vec::new();
    for name in config.pvr_names() {
        let pvr = registry.create_by_name(name, &config, &[])?;
        pvrs.push(json!({ "name": pvr.name(), "library_type": pvr.library_type() }));
    }

    match output.format() {
        OutputFormat::Human => {
            output.success(format!("Configuration is valid: {}", config_path.display()));
            output.success(format!(
                "Plex database readable: {} ({} libraries)",
                config.plex.database.display(),
                libraries.len()
            ));
            output.success(format!("Plex is reachable at {}", config.plex.url));
            if pvrs.is_empty() {
                output.warn("No PVRs are configured");
            } else {
                output.info(format!("Configured PVRs: {}", config.pvr_names().join(", ")));
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "success": true,
                "config": config_path.display().to_string(),
                "libraries": libraries.len(),
                "plex_url": config.plex.url,
                "pvrs": pvrs,
            }));
        }
    }

    Ok(())
}
