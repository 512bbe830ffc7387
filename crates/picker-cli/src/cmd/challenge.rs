use super::{open_state, save_state};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use picker_core::{
    challenge::ChallengeChoice,
    identity::{ColourIdentity, ALL_COMBINATIONS},
    names,
    state::PersistedState,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ChallengeSubcommand {
    /// Show all 32 cells and progress
    Show,
    /// Assign a commander, optionally with a partner, to its identity cell
    Assign {
        primary: String,
        #[arg(long)]
        partner: Option<String>,
    },
    /// Assign a commander together with its "Partner with" card
    Pair { id: String },
    /// Clear the assignment for a colour identity
    Clear { ci: ColourIdentity },
}

pub fn run(root: &Path, subcmd: ChallengeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ChallengeSubcommand::Show => show(root, json),
        ChallengeSubcommand::Assign { primary, partner } => {
            let choice = match partner {
                Some(partner) => ChallengeChoice::pair(primary, partner),
                None => ChallengeChoice::solo(primary),
            };
            assign(root, json, |state| state.assign(choice))
        }
        ChallengeSubcommand::Pair { id } => assign(root, json, |state| state.assign_with_partner(&id)),
        ChallengeSubcommand::Clear { ci } => clear(root, ci, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, state) = open_state(root)?;
    let grid = state.challenge.grid(&state.commanders);
    let filled = state.challenge.filled();

    if json {
        let cells: Vec<serde_json::Value> = grid
            .iter()
            .map(|slot| {
                serde_json::json!({
                    "colourIdentity": slot.colour_identity,
                    "name": names::display_name(slot.colour_identity, true),
                    "primary": slot.primary,
                    "partner": slot.partner,
                    "tags": slot.tags(),
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "filled": filled,
            "total": ALL_COMBINATIONS.len(),
            "cells": cells,
        }))?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = grid
        .iter()
        .map(|slot| {
            let pick = match (slot.primary, slot.partner) {
                (Some(p), Some(q)) => format!("{} + {}", p.name, q.name),
                (Some(p), None) => p.name.clone(),
                _ => "-".to_string(),
            };
            vec![
                slot.colour_identity.to_string(),
                names::display_name(slot.colour_identity, true),
                pick,
            ]
        })
        .collect();
    print_table(&["CI", "NAME", "COMMANDER"], rows);
    println!("\nProgress: {filled}/{}", ALL_COMBINATIONS.len());
    Ok(())
}

fn assign<F>(root: &Path, json: bool, op: F) -> anyhow::Result<()>
where
    F: FnOnce(&PersistedState) -> picker_core::Result<(PersistedState, ColourIdentity)>,
{
    let (store, state) = open_state(root)?;
    let (next, key) = op(&state)?;
    save_state(&store, &next)?;

    let choice = next.challenge.get(key);
    if json {
        print_json(&serde_json::json!({
            "colourIdentity": key,
            "name": names::display_name(key, false),
            "choice": choice,
            "filled": next.challenge.filled(),
        }))?;
    } else {
        let who = match choice {
            Some(ChallengeChoice {
                primary_id,
                partner_id: Some(partner_id),
            }) => format!("{primary_id} + {partner_id}"),
            Some(c) => c.primary_id.clone(),
            None => "-".to_string(),
        };
        println!("Assigned {who} to {key} ({})", names::display_name(key, false));
    }
    Ok(())
}

fn clear(root: &Path, ci: ColourIdentity, json: bool) -> anyhow::Result<()> {
    let (store, state) = open_state(root)?;
    let had = state.challenge.get(ci).is_some();
    let next = state.clear_assignment(&ci.to_string());
    save_state(&store, &next)?;

    if json {
        print_json(&serde_json::json!({ "colourIdentity": ci, "cleared": had }))?;
    } else if had {
        println!("Cleared {ci} ({})", names::display_name(ci, false));
    } else {
        println!("{ci} had no assignment");
    }
    Ok(())
}
