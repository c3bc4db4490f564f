use super::{load_config, table};
use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color};
use media_match_core::{CatalogAggregator, Reconciler, RunOptions, RunSummary, TokioPacer};
use media_match_models::LibraryType;
use media_match_sources::{PlexClient, PlexDatastore, PvrFactoryRegistry};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run_fix(
    config_path: &Path,
    pvr_names: Vec<String>,
    library_names: Vec<String>,
    dry_run: bool,
    output: &Output,
) -> Result<()> {
    tracing::debug!(pvrs = ?pvr_names, libraries = ?library_names, dry_run, "Fix command started");

    let config = load_config(config_path)?;
    let store = PlexDatastore::open(&config.plex.database)?;

    // Library types come from the local database so a PVR that can't manage
    // them is rejected before anything is requested over the network
    let aggregator = CatalogAggregator::new(&store)?;
    let library_types = resolve_library_types(&aggregator, &library_names)?;
    let pvrs = PvrFactoryRegistry::new().create_all(&pvr_names, &config, &library_types)?;

    let server = PlexClient::new(&config.plex.url, &config.plex.token)?;
    let options = RunOptions::from_config(&config, dry_run);
    let reconciler = Reconciler::new(&aggregator, &server, &pvrs, &TokioPacer, options);

    let summary = reconciler.run(&library_names).await?;

    match output.format() {
        OutputFormat::Human => print_summary(&summary, output),
        OutputFormat::Json | OutputFormat::JsonPretty => output.json(&serde_json::to_value(&summary)?),
    }

    Ok(())
}

fn resolve_library_types(aggregator: &CatalogAggregator<'_>, names: &[String]) -> Result<Vec<LibraryType>> {
    names
        .iter()
        .map(|name| -> Result<LibraryType> { Ok(aggregator.resolve_library(name)?.library_type) })
        .collect()
}

fn print_summary(summary: &RunSummary, output: &Output) {
    if output.is_quiet() {
        return;
    }

    if !summary.actions.is_empty() {
        let mut actions = table();
        actions.set_header(vec![
            Cell::new("Plex Path").add_attribute(Attribute::Bold),
            Cell::new("Plex GUID").add_attribute(Attribute::Bold),
            Cell::new("PVR").add_attribute(Attribute::Bold),
            Cell::new("New GUID").add_attribute(Attribute::Bold),
        ]);
        for action in &summary.actions {
            actions.add_row(vec![
                Cell::new(&action.media_item.path),
                Cell::new(&action.media_item.guid).fg(Color::Red),
                Cell::new(&action.pvr_item.pvr),
                Cell::new(&action.replacement_guid).fg(Color::Green),
            ]);
        }
        println!("{}", actions);
    }

    let mut counts = table();
    counts.set_header(vec![
        Cell::new(if summary.dry_run { "Dry Run" } else { "Run" })
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.libraries.join(", ")),
    ]);
    let rows = [
        ("Plex items", summary.media_items),
        ("Duplicates split", summary.duplicates_split),
        ("PVR items", summary.pvr_items),
        ("PVR items with colliding paths", summary.pvr_rejected),
        ("Matched", summary.confirmed),
        ("Mismatched", summary.mismatched),
        ("Only in Plex", summary.media_only),
        ("Only in PVR", summary.pvr_only),
    ];
    for (label, count) in rows {
        counts.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    println!("{}", counts);

    if summary.dry_run {
        output.warn(format!(
            "Dry run: {} match(es) and {} split(s) were not sent to Plex",
            summary.simulated,
            summary.duplicates_split
        ));
    } else if summary.fixed == 0 {
        output.success("All items already match".green().to_string());
    } else {
        output.success(format!(
            "Fixed {} item(s) in {:.1}s",
            summary.fixed,
            summary.duration_ms as f64 / 1000.0
        ));
    }
}
