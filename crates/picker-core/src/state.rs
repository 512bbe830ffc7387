use crate::catalogue::Catalogue;
use crate::challenge::{Challenge, ChallengeChoice};
use crate::commander::{self, generate_id, CommanderRecord, PartnerKind};
use crate::error::{PickerError, Result};
use crate::identity::ColourIdentity;
use crate::reconcile::{merge_with_stats, MergeStats};
use crate::tags::{apply_tags, TagMaps};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// BlobStore
// ---------------------------------------------------------------------------

/// Get/set access to the single serialized state blob.
pub trait BlobStore {
    fn get(&self) -> Result<Option<String>>;
    fn set(&self, blob: &str) -> Result<()>;
}

/// A blob kept in one file, written atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for FileStore {
    fn get(&self) -> Result<Option<String>> {
        crate::io::read_optional(&self.path)
    }

    fn set(&self, blob: &str) -> Result<()> {
        crate::io::atomic_write(&self.path, blob.as_bytes())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RefCell::new(Some(blob.into())),
        }
    }
}

impl BlobStore for MemoryStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.blob.borrow().clone())
    }

    fn set(&self, blob: &str) -> Result<()> {
        *self.blob.borrow_mut() = Some(blob.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PersistedState
// ---------------------------------------------------------------------------

/// The durable root: the commander list and the challenge assignments.
///
/// Operations take `&self` and return the next state; callers decide when
/// to write it back through a [`BlobStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub commanders: Vec<CommanderRecord>,
    pub challenge: Challenge,
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub state: PersistedState,
    pub stats: MergeStats,
}

impl PersistedState {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Best-effort decode. An unparseable blob yields the empty state;
    /// malformed entries are dropped and legacy string assignments upgraded.
    pub fn from_json_lenient(blob: &str) -> Self {
        let value: Value = match serde_json::from_str(blob) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stored state is corrupt, starting empty");
                return Self::default();
            }
        };
        let Value::Object(obj) = value else {
            tracing::warn!("stored state is not an object, starting empty");
            return Self::default();
        };

        let commanders: Vec<CommanderRecord> = obj
            .get("commanders")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(record_from_stored).collect())
            .unwrap_or_default();

        let mut challenge = Challenge::default();
        if let Some(entries) = obj.get("challenge").and_then(Value::as_object) {
            for (key, raw) in entries {
                let Ok(ci) = key.parse::<ColourIdentity>() else {
                    tracing::debug!(key = %key, "dropping challenge entry with invalid key");
                    continue;
                };
                match choice_from_stored(raw) {
                    Some(choice) => challenge.insert_raw(ci, choice),
                    None => tracing::debug!(key = %key, "dropping malformed challenge entry"),
                }
            }
        }

        Self {
            commanders,
            challenge,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_from(store: &dyn BlobStore) -> Result<Self> {
        Ok(store
            .get()?
            .map(|blob| Self::from_json_lenient(&blob))
            .unwrap_or_default())
    }

    pub fn save_to(&self, store: &dyn BlobStore) -> Result<()> {
        store.set(&self.to_json()?)
    }

    // ---------------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------------

    pub fn import_catalogue(&self, catalogue: &Catalogue) -> ImportOutcome {
        let outcome = merge_with_stats(&catalogue.commanders, &self.commanders);
        tracing::info!(
            added = outcome.stats.added,
            updated = outcome.stats.updated,
            skipped = outcome.stats.skipped + catalogue.skipped,
            total = outcome.commanders.len(),
            "catalogue imported"
        );
        ImportOutcome {
            state: Self {
                commanders: outcome.commanders,
                challenge: self.challenge.clone(),
            },
            stats: outcome.stats,
        }
    }

    pub fn with_tags(&self, maps: &TagMaps) -> Self {
        Self {
            commanders: apply_tags(self.commanders.clone(), maps),
            challenge: self.challenge.clone(),
        }
    }

    pub fn add_commander(&self, record: CommanderRecord) -> Result<Self> {
        let mut next = self.clone();
        commander::add_commander(&mut next.commanders, record)?;
        Ok(next)
    }

    /// Remove a commander and any assignment that references it.
    pub fn delete_commander(&self, id: &str) -> Result<Self> {
        let mut next = self.clone();
        if commander::delete_commander(&mut next.commanders, id).is_none() {
            return Err(PickerError::CommanderNotFound(id.to_string()));
        }
        let dropped = next.challenge.forget_commander(id);
        if dropped > 0 {
            tracing::info!(id, dropped, "cleared assignments for deleted commander");
        }
        Ok(next)
    }

    pub fn assign(&self, choice: ChallengeChoice) -> Result<(Self, ColourIdentity)> {
        let mut next = self.clone();
        let key = next.challenge.assign(&self.commanders, choice)?;
        Ok((next, key))
    }

    pub fn assign_with_partner(&self, primary_id: &str) -> Result<(Self, ColourIdentity)> {
        let mut next = self.clone();
        let key = next
            .challenge
            .assign_with_partner(&self.commanders, primary_id)?;
        Ok((next, key))
    }

    pub fn clear_assignment(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.challenge.clear(key);
        next
    }
}

// ---------------------------------------------------------------------------
// Lenient decoding
// ---------------------------------------------------------------------------

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn record_from_stored(raw: &Value) -> Option<CommanderRecord> {
    let obj = raw.as_object()?;
    let name = obj.get("name").and_then(Value::as_str).map(str::trim)?;
    if name.is_empty() {
        tracing::debug!("dropping stored commander without a name");
        return None;
    }
    let colour_identity = match obj.get("colourIdentity") {
        Some(Value::String(s)) => ColourIdentity::canonicalize(s),
        Some(Value::Array(items)) => {
            ColourIdentity::from_symbols(items.iter().filter_map(Value::as_str))
        }
        _ => ColourIdentity::COLOURLESS,
    };

    let tag_counts: BTreeMap<String, u32> = obj
        .get("tagCounts")
        .and_then(Value::as_object)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_u64().map(|n| (k.clone(), n.min(u32::MAX as u64) as u32)))
                .collect()
        })
        .unwrap_or_default();

    Some(CommanderRecord {
        id: string_field(obj, "id").unwrap_or_else(generate_id),
        name: name.to_string(),
        colour_identity,
        image: string_field(obj, "image"),
        scryfall: string_field(obj, "scryfall"),
        edhrec_rank: obj
            .get("edhrecRank")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok()),
        edhrec_uri: string_field(obj, "edhrecUri"),
        partner_kind: obj
            .get("partnerKind")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or(PartnerKind::None),
        partner_with_names: string_list(obj, "partnerWithNames"),
        tags: string_list(obj, "tags"),
        tag_counts,
    })
}

fn choice_from_stored(raw: &Value) -> Option<ChallengeChoice> {
    match raw {
        // Older saves stored just the commander id.
        Value::String(id) if !id.is_empty() => Some(ChallengeChoice::solo(id.clone())),
        Value::Object(obj) => {
            let primary_id = string_field(obj, "primaryId")?;
            Some(ChallengeChoice {
                primary_id,
                partner_id: string_field(obj, "partnerId"),
            })
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
