//! Merge a freshly loaded catalogue into the user's commander list.
//!
//! Records are matched by id first and by `name|CI` second. A match has only
//! its catalogue-owned fields refreshed; everything else is carried over.

use crate::catalogue::CommanderRow;
use crate::commander::{composite_key, generate_id, CommanderRecord, PartnerKind};
use crate::identity::ColourIdentity;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Per-field merge rules
// ---------------------------------------------------------------------------

/// Incoming value when present, else the existing one. Never blanks a field.
pub fn merge_optional<T>(incoming: Option<T>, existing: Option<T>) -> Option<T> {
    incoming.or(existing)
}

pub fn merge_partner_kind(incoming: Option<PartnerKind>, existing: PartnerKind) -> PartnerKind {
    incoming.unwrap_or(existing)
}

pub fn merge_partner_names(incoming: Option<Vec<String>>, existing: Vec<String>) -> Vec<String> {
    incoming.unwrap_or(existing)
}

/// Refresh the catalogue-owned fields of `existing` from `row`.
pub fn patch_record(existing: CommanderRecord, row: &CommanderRow) -> CommanderRecord {
    CommanderRecord {
        image: merge_optional(row.image.clone(), existing.image),
        scryfall: merge_optional(row.scryfall_uri.clone(), existing.scryfall),
        edhrec_rank: merge_optional(row.edhrec_rank, existing.edhrec_rank),
        edhrec_uri: merge_optional(row.edhrec_uri.clone(), existing.edhrec_uri),
        partner_kind: merge_partner_kind(row.partner_kind, existing.partner_kind),
        partner_with_names: merge_partner_names(
            row.partner_with_names.clone(),
            existing.partner_with_names,
        ),
        ..existing
    }
}

/// A new record built entirely from a catalogue row.
pub fn record_from_row(row: &CommanderRow, name: &str, ci: ColourIdentity) -> CommanderRecord {
    let id = row.id().map_or_else(generate_id, str::to_string);
    CommanderRecord {
        image: row.image.clone(),
        scryfall: row.scryfall_uri.clone(),
        edhrec_rank: row.edhrec_rank,
        edhrec_uri: row.edhrec_uri.clone(),
        partner_kind: row.partner_kind.unwrap_or_default(),
        partner_with_names: row.partner_with_names.clone().unwrap_or_default(),
        ..CommanderRecord::new(id, name, ci)
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub commanders: Vec<CommanderRecord>,
    pub stats: MergeStats,
}

/// Merge `rows` into `existing`, returning the reconciled list sorted by name.
pub fn merge<'a, I>(rows: I, existing: &[CommanderRecord]) -> Vec<CommanderRecord>
where
    I: IntoIterator<Item = &'a CommanderRow>,
{
    merge_with_stats(rows, existing).commanders
}

pub fn merge_with_stats<'a, I>(rows: I, existing: &[CommanderRecord]) -> MergeOutcome
where
    I: IntoIterator<Item = &'a CommanderRow>,
{
    let mut slots: Vec<CommanderRecord> = existing.to_vec();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for (i, rec) in slots.iter().enumerate() {
        by_id.insert(rec.id.clone(), i);
        by_key.insert(rec.composite_key(), i);
    }

    let mut stats = MergeStats::default();

    for row in rows {
        let Some((name, ci)) = row.validated() else {
            tracing::debug!(id = ?row.id, name = ?row.name, "skipping row without name or colour identity");
            stats.skipped += 1;
            continue;
        };
        let key = composite_key(name, ci);

        let matched = row
            .id()
            .and_then(|id| by_id.get(id))
            .or_else(|| by_key.get(&key))
            .copied();

        match matched {
            Some(i) => {
                slots[i] = patch_record(slots[i].clone(), row);
                if let Some(id) = row.id() {
                    by_id.entry(id.to_string()).or_insert(i);
                }
                by_key.insert(key, i);
                stats.updated += 1;
            }
            None => {
                let rec = record_from_row(row, name, ci);
                let i = slots.len();
                by_id.insert(rec.id.clone(), i);
                by_key.insert(key, i);
                slots.push(rec);
                stats.added += 1;
            }
        }
    }

    // A slot survives only if it is the one its id resolves to.
    let mut commanders: Vec<CommanderRecord> = slots
        .into_iter()
        .enumerate()
        .filter(|(i, rec)| by_id.get(&rec.id) == Some(i))
        .map(|(_, rec)| rec)
        .collect();
    commanders.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    tracing::debug!(
        added = stats.added,
        updated = stats.updated,
        skipped = stats.skipped,
        total = commanders.len(),
        "catalogue merged"
    );

    MergeOutcome { commanders, stats }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: Option<&str>, name: &str, ci: &str) -> CommanderRow {
        CommanderRow {
            id: id.map(str::to_string),
            name: Some(name.to_string()),
            colour_identity: Some(ColourIdentity::canonicalize(ci)),
            ..CommanderRow::default()
        }
    }

    fn rec(id: &str, name: &str, ci: &str) -> CommanderRecord {
        CommanderRecord::new(id, name, ColourIdentity::canonicalize(ci))
    }

    #[test]
    fn merge_optional_prefers_incoming_but_never_blanks() {
        assert_eq!(merge_optional(Some(1), Some(2)), Some(1));
        assert_eq!(merge_optional(None, Some(2)), Some(2));
        assert_eq!(merge_optional::<u32>(None, None), None);
    }

    #[test]
    fn update_by_id_refreshes_image_and_keeps_tags() {
        let mut existing = rec("a1", "Atraxa", "WUBG");
        existing.image = Some("old.jpg".to_string());
        existing.scryfall = Some("https://scryfall/a1".to_string());
        existing.tags = vec!["superfriends".to_string()];

        let mut incoming = row(Some("a1"), "Atraxa", "WUBG");
        incoming.image = Some("new.jpg".to_string());

        let out = merge([&incoming], &[existing]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].image.as_deref(), Some("new.jpg"));
        assert_eq!(out[0].scryfall.as_deref(), Some("https://scryfall/a1"));
        assert_eq!(out[0].tags, vec!["superfriends"]);
    }

    #[test]
    fn new_row_added_once_across_reimports() {
        let rows = vec![row(Some("k1"), "Krenko, Mob Boss", "R")];
        let first = merge_with_stats(&rows, &[]);
        assert_eq!(first.commanders.len(), 1);
        assert_eq!(first.stats.added, 1);

        let second = merge_with_stats(&rows, &first.commanders);
        assert_eq!(second.commanders.len(), 1);
        assert_eq!(second.stats.added, 0);
        assert_eq!(second.stats.updated, 1);
        assert_eq!(second.commanders[0].id, "k1");
    }

    #[test]
    fn falls_back_to_name_and_identity() {
        let mut local = rec("local-1", "Krenko, Mob Boss", "R");
        local.tags = vec!["goblins".to_string()];
        let mut incoming = row(Some("upstream-9"), "Krenko, Mob Boss", "R");
        incoming.edhrec_rank = Some(12);

        let out = merge([&incoming], &[local]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "local-1");
        assert_eq!(out[0].edhrec_rank, Some(12));
        assert_eq!(out[0].tags, vec!["goblins"]);
    }

    #[test]
    fn same_name_different_identity_is_distinct() {
        let out = merge([&row(None, "Garth", "R")], &[rec("g1", "Garth", "G")]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn rows_without_id_get_generated_ids() {
        let out = merge([&row(None, "Karn", "")], &[]);
        assert_eq!(out.len(), 1);
        assert!(!out[0].id.is_empty());
        assert!(out[0].colour_identity.is_colourless());
    }

    #[test]
    fn idless_row_keeps_generated_id_across_reimports() {
        let rows = vec![row(None, "Karn, Legacy Reforged", "")];
        let first = merge_with_stats(&rows, &[]);
        assert_eq!(first.commanders.len(), 1);
        let id = first.commanders[0].id.clone();

        let second = merge_with_stats(&rows, &first.commanders);
        assert_eq!(second.commanders.len(), 1);
        assert_eq!(second.stats.added, 0);
        assert_eq!(second.stats.updated, 1);
        assert_eq!(second.commanders[0].id, id);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let nameless = CommanderRow {
            colour_identity: Some(ColourIdentity::COLOURLESS),
            ..CommanderRow::default()
        };
        let no_identity = CommanderRow {
            name: Some("Ghost".to_string()),
            ..CommanderRow::default()
        };
        let outcome = merge_with_stats([&nameless, &no_identity, &row(None, "Ok", "U")], &[]);
        assert_eq!(outcome.commanders.len(), 1);
        assert_eq!(outcome.stats.skipped, 2);
    }

    #[test]
    fn absent_catalogue_fields_keep_existing_values() {
        let mut existing = rec("z1", "Zndrsplt, Eye of Wisdom", "U");
        existing.partner_kind = PartnerKind::PartnerWith;
        existing.partner_with_names = vec!["Okaun, Eye of Chaos".to_string()];
        existing.edhrec_rank = Some(900);

        let out = merge([&row(Some("z1"), "Zndrsplt, Eye of Wisdom", "U")], &[existing]);
        assert_eq!(out[0].partner_kind, PartnerKind::PartnerWith);
        assert_eq!(out[0].partner_with_names, vec!["Okaun, Eye of Chaos"]);
        assert_eq!(out[0].edhrec_rank, Some(900));
    }

    #[test]
    fn duplicate_ids_collapse_and_output_is_sorted() {
        let existing = vec![rec("x", "Zur", "WUB"), rec("x", "Zur", "WUB"), rec("y", "Arcades", "WUG")];
        let out = merge([&row(Some("b"), "Braids", "B")], &existing);
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Arcades", "Braids", "Zur"]);
    }

    #[test]
    fn user_name_survives_id_match() {
        let existing = rec("a1", "My Atraxa", "WUBG");
        let out = merge([&row(Some("a1"), "Atraxa, Praetors' Voice", "WUBG")], &[existing]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "My Atraxa");
    }
}
