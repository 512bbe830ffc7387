use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use picker_core::{paths, scryfall};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum CatalogueSubcommand {
    /// Build a catalogue file from saved card-search result pages
    Build {
        /// Where to write the catalogue
        #[arg(long)]
        out: PathBuf,
        /// Saved search pages, in order
        #[arg(required = true)]
        pages: Vec<PathBuf>,
    },
}

pub fn run(root: &Path, subcmd: CatalogueSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CatalogueSubcommand::Build { out, pages } => build(root, &out, &pages, json),
    }
}

fn build(root: &Path, out: &Path, pages: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let pages: Vec<PathBuf> = pages.iter().map(|p| paths::resolve(root, p)).collect();
    let cards = scryfall::load_pages(&pages).context("failed to read search pages")?;
    let catalogue = scryfall::build_catalogue(&format!("scryfall:{}", scryfall::SEARCH_QUERY), &cards);

    let out = paths::resolve(root, out);
    catalogue
        .save(&out)
        .with_context(|| format!("failed to write {}", out.display()))?;

    if json {
        print_json(&serde_json::json!({
            "out": out.display().to_string(),
            "cards": cards.len(),
            "count": catalogue.count,
        }))?;
    } else {
        println!(
            "Wrote {} commanders from {} cards to {}",
            catalogue.count,
            cards.len(),
            out.display()
        );
    }
    Ok(())
}
