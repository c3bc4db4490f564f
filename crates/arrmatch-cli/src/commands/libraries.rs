use super::{load_config, table};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Attribute, Cell};
use media_match_sources::{CatalogStore, PlexDatastore};
use std::path::Path;

pub fn run_libraries(config_path: &Path, output: &Output) -> Result<()> {
    let config = load_config(config_path)?;
    let store = PlexDatastore::open(&config.plex.database)?;
    let libraries = store.list_libraries()?;

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            if libraries.is_empty() {
                output.warn(format!("No libraries found in {}", config.plex.database.display()));
                return Ok(());
            }

            let mut table = table();
            table.set_header(vec![
                Cell::new("ID").add_attribute(Attribute::Bold),
                Cell::new("Name").add_attribute(Attribute::Bold),
                Cell::new("Type").add_attribute(Attribute::Bold),
                Cell::new("Root Path").add_attribute(Attribute::Bold),
            ]);
            for library in &libraries {
                table.add_row(vec![
                    Cell::new(library.id),
                    Cell::new(&library.name),
                    Cell::new(library.library_type),
                    Cell::new(&library.root_path),
                ]);
            }
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&serde_json::to_value(&libraries)?);
        }
    }

    Ok(())
}
