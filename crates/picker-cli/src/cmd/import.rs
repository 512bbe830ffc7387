use super::{open_state, save_state};
use crate::output::print_json;
use anyhow::Context;
use picker_core::{catalogue::Catalogue, config::Config, paths, tags::TagMaps};
use std::path::Path;

pub fn run(
    root: &Path,
    catalogue: Option<&Path>,
    tags: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let (store, state) = open_state(root)?;
    let config = Config::load(root).context("failed to load config")?;

    let catalogue_path = match catalogue {
        Some(p) => paths::resolve(root, p),
        None => config.catalogue_file(root),
    };
    let catalogue = Catalogue::load(&catalogue_path)
        .with_context(|| format!("failed to load catalogue {}", catalogue_path.display()))?;

    let outcome = state.import_catalogue(&catalogue);

    let tags_path = match tags {
        Some(p) => paths::resolve(root, p),
        None => config.tags_file(root),
    };
    let maps = TagMaps::load_or_empty(&tags_path);
    let next = outcome.state.with_tags(&maps);
    save_state(&store, &next)?;

    let stats = outcome.stats;
    let skipped = stats.skipped + catalogue.skipped;
    if json {
        print_json(&serde_json::json!({
            "catalogue": catalogue_path.display().to_string(),
            "added": stats.added,
            "updated": stats.updated,
            "skipped": skipped,
            "tagged_entries": maps.len(),
            "total": next.commanders.len(),
        }))?;
    } else {
        println!(
            "Imported {} commanders ({} added, {} updated, {} skipped)",
            next.commanders.len(),
            stats.added,
            stats.updated,
            skipped
        );
        if maps.is_empty() {
            println!("No tag data applied.");
        } else {
            println!("Applied tag data ({} entries)", maps.len());
        }
    }
    Ok(())
}
