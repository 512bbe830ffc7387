use super::{open_state, save_state};
use crate::output::{preview_tags, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use picker_core::{
    commander::{self, CommanderRecord},
    config::Config,
    identity::ColourIdentity,
    names,
    partner::resolve_partner,
    search::{search as search_commanders, SearchQuery},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum CommanderSubcommand {
    /// List every commander, sorted by name
    List,
    /// Filter commanders by name, colour identity, and tags
    Search {
        /// Text the name must contain (accents and case ignored)
        #[arg(long)]
        query: Option<String>,
        /// Exact colour identity, e.g. WUB or C
        #[arg(long)]
        ci: Option<ColourIdentity>,
        /// Match commanders carrying any of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show one commander and its resolved partner
    Show { id: String },
    /// Add a commander by hand
    Add {
        #[arg(long)]
        name: String,
        /// Colour identity, e.g. WUB or C
        #[arg(long)]
        ci: ColourIdentity,
    },
    /// Delete a commander and clear the assignments that use it
    Delete { id: String },
}

pub fn run(root: &Path, subcmd: CommanderSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CommanderSubcommand::List => search(root, SearchQuery::default(), json),
        CommanderSubcommand::Search { query, ci, tags } => search(
            root,
            SearchQuery {
                text: query.unwrap_or_default(),
                colour_identity: ci,
                tags,
            },
            json,
        ),
        CommanderSubcommand::Show { id } => show(root, &id, json),
        CommanderSubcommand::Add { name, ci } => add(root, &name, ci, json),
        CommanderSubcommand::Delete { id } => delete(root, &id, json),
    }
}

fn search(root: &Path, query: SearchQuery, json: bool) -> anyhow::Result<()> {
    let (_, state) = open_state(root)?;
    let hits = search_commanders(&state.commanders, &query);

    if json {
        print_json(&hits)?;
        return Ok(());
    }
    if hits.is_empty() {
        println!("No commanders found.");
        return Ok(());
    }

    let config = Config::load(root).context("failed to load config")?;
    let rows: Vec<Vec<String>> = hits
        .iter()
        .map(|c| {
            vec![
                c.id.clone(),
                c.name.clone(),
                c.colour_identity.to_string(),
                preview_tags(&c.tags, config.preview_tag_limit),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "CI", "TAGS"], rows);
    println!("\n{} of {} commanders", hits.len(), state.commanders.len());
    Ok(())
}

fn show(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let (_, state) = open_state(root)?;
    let rec = commander::find(&state.commanders, id)?;
    let partner = resolve_partner(rec, &state.commanders);

    if json {
        print_json(&serde_json::json!({
            "commander": rec,
            "colourName": names::display_name(rec.colour_identity, true),
            "partner": partner,
        }))?;
        return Ok(());
    }

    println!("{}", rec.name);
    println!("  id:       {}", rec.id);
    println!(
        "  identity: {} ({})",
        rec.colour_identity,
        names::display_name(rec.colour_identity, true)
    );
    if let Some(rank) = rec.edhrec_rank {
        println!("  rank:     {rank}");
    }
    println!("  partner:  {}", rec.partner_kind);
    if !rec.partner_with_names.is_empty() {
        println!("  with:     {}", rec.partner_with_names.join(" and "));
    }
    if let Some(p) = partner {
        println!("  pairs:    {} [{}] {}", p.name, p.id, p.colour_identity);
    }
    if !rec.tags.is_empty() {
        println!("  tags:     {}", rec.tags.join(", "));
    }
    for (label, link) in [("image", &rec.image), ("card", &rec.scryfall), ("edhrec", &rec.edhrec_uri)] {
        if let Some(link) = link {
            println!("  {label:<9} {link}");
        }
    }
    Ok(())
}

fn add(root: &Path, name: &str, ci: ColourIdentity, json: bool) -> anyhow::Result<()> {
    let (store, state) = open_state(root)?;
    let record = CommanderRecord::user_created(name, ci)?;
    let id = record.id.clone();
    let next = state.add_commander(record)?;
    save_state(&store, &next)?;

    if json {
        print_json(&serde_json::json!({ "id": id, "name": name.trim(), "colourIdentity": ci }))?;
    } else {
        println!("Added commander [{id}]: {} ({ci})", name.trim());
    }
    Ok(())
}

fn delete(root: &Path, id: &str, json: bool) -> anyhow::Result<()> {
    let (store, state) = open_state(root)?;
    let cleared = state.challenge.len();
    let next = state.delete_commander(id)?;
    let cleared = cleared - next.challenge.len();
    save_state(&store, &next)?;

    if json {
        print_json(&serde_json::json!({ "id": id, "deleted": true, "clearedAssignments": cleared }))?;
    } else {
        println!("Deleted commander [{id}]");
        if cleared > 0 {
            println!("Cleared {cleared} challenge assignment(s)");
        }
    }
    Ok(())
}
