use crate::commander::{self, CommanderRecord};
use crate::error::{PickerError, Result};
use crate::identity::{ColourIdentity, ALL_COMBINATIONS};
use crate::partner::resolve_partner;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// ChallengeChoice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeChoice {
    pub primary_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_id: Option<String>,
}

impl ChallengeChoice {
    pub fn solo(primary_id: impl Into<String>) -> Self {
        Self {
            primary_id: primary_id.into(),
            partner_id: None,
        }
    }

    pub fn pair(primary_id: impl Into<String>, partner_id: impl Into<String>) -> Self {
        Self {
            primary_id: primary_id.into(),
            partner_id: Some(partner_id.into()),
        }
    }

    pub fn references(&self, id: &str) -> bool {
        self.primary_id == id || self.partner_id.as_deref() == Some(id)
    }
}

// ---------------------------------------------------------------------------
// Challenge
// ---------------------------------------------------------------------------

/// One choice per colour identity. Keys are always the union identity of
/// the chosen commanders, computed when the choice is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Challenge {
    entries: BTreeMap<ColourIdentity, ChallengeChoice>,
}

/// A grid cell with its choice resolved to records.
#[derive(Debug, Clone, Copy)]
pub struct GridSlot<'a> {
    pub colour_identity: ColourIdentity,
    pub primary: Option<&'a CommanderRecord>,
    pub partner: Option<&'a CommanderRecord>,
}

impl GridSlot<'_> {
    /// Union of the pair's tags, primary first, duplicates removed.
    pub fn tags(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for rec in [self.primary, self.partner].into_iter().flatten() {
            for t in &rec.tags {
                if !out.contains(&t.as_str()) {
                    out.push(t);
                }
            }
        }
        out
    }
}

impl Challenge {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, ci: ColourIdentity) -> Option<&ChallengeChoice> {
        self.entries.get(&ci)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColourIdentity, &ChallengeChoice)> {
        self.entries.iter()
    }

    /// Store a choice under the union identity of its commanders, replacing
    /// whatever was there. Unknown ids are rejected before anything changes.
    pub fn assign(
        &mut self,
        commanders: &[CommanderRecord],
        choice: ChallengeChoice,
    ) -> Result<ColourIdentity> {
        let primary = commander::find(commanders, &choice.primary_id)?;
        let partner = match choice.partner_id.as_deref() {
            Some(id) if id == primary.id => {
                return Err(PickerError::InvalidAssignment(format!(
                    "'{id}' cannot partner with itself"
                )));
            }
            Some(id) => Some(commander::find(commanders, id)?),
            None => None,
        };

        let key = primary
            .colour_identity
            .union(partner.map(|p| p.colour_identity));
        tracing::debug!(key = %key, primary = %primary.name, partner = ?partner.map(|p| &p.name), "challenge assigned");
        self.entries.insert(key, choice);
        Ok(key)
    }

    /// Assign a commander together with its resolved "Partner with" card,
    /// or alone when it has none.
    pub fn assign_with_partner(
        &mut self,
        commanders: &[CommanderRecord],
        primary_id: &str,
    ) -> Result<ColourIdentity> {
        let primary = commander::find(commanders, primary_id)?;
        let choice = match resolve_partner(primary, commanders) {
            Some(partner) => ChallengeChoice::pair(&primary.id, &partner.id),
            None => ChallengeChoice::solo(&primary.id),
        };
        self.assign(commanders, choice)
    }

    /// Remove the entry for a colour identity; absent keys are a no-op.
    pub fn clear(&mut self, key: &str) -> Option<ChallengeChoice> {
        self.entries.remove(&ColourIdentity::canonicalize(key))
    }

    /// Drop every entry that references `id`.
    pub fn forget_commander(&mut self, id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, choice| !choice.references(id));
        before - self.entries.len()
    }

    /// Insert without validation; used when loading persisted state.
    pub(crate) fn insert_raw(&mut self, ci: ColourIdentity, choice: ChallengeChoice) {
        self.entries.insert(ci, choice);
    }

    /// All 32 cells in grid order.
    pub fn grid<'a>(&'a self, commanders: &'a [CommanderRecord]) -> Vec<GridSlot<'a>> {
        ALL_COMBINATIONS
            .iter()
            .map(|&ci| {
                let choice = self.entries.get(&ci);
                let lookup = |id: &str| commanders.iter().find(|c| c.id == id);
                GridSlot {
                    colour_identity: ci,
                    primary: choice.and_then(|c| lookup(&c.primary_id)),
                    partner: choice
                        .and_then(|c| c.partner_id.as_deref())
                        .and_then(lookup),
                }
            })
            .collect()
    }

    /// Number of grid cells with a choice.
    pub fn filled(&self) -> usize {
        ALL_COMBINATIONS
            .iter()
            .filter(|ci| self.entries.contains_key(ci))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
