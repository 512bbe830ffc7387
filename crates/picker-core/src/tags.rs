use crate::commander::CommanderRecord;
use crate::error::{PickerError, Result};
use crate::text::{fold, normalize_tag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

// ---------------------------------------------------------------------------
// TagInfo
// ---------------------------------------------------------------------------

/// Community tags for one commander.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_counts: Option<BTreeMap<String, u32>>,
    /// Decks sampled to produce the counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// ---------------------------------------------------------------------------
// TagsFile
// ---------------------------------------------------------------------------

/// How the keys of a flat tag map are to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    /// Upstream card identifiers.
    Id,
    /// `name|CI` composite keys.
    Composite,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitTags {
    pub by_id: BTreeMap<String, TagInfo>,
    pub by_key: BTreeMap<String, TagInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatTags {
    pub key_kind: KeyKind,
    pub entries: BTreeMap<String, TagInfo>,
}

/// The tag-aggregate file. Either `{ byId, byKey }` or a flat map whose key
/// kind is declared up front; an undeclared flat map is rejected.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TagsFile {
    Flat(FlatTags),
    Split(SplitTags),
}

impl TagsFile {
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| PickerError::TagsShape(format!("not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Decode a tag file. The variant is chosen by its top-level keys and a
    /// wrong top-level shape is an error; entries that fail to decode are
    /// dropped.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut obj) = value else {
            return Err(PickerError::TagsShape(
                "top level is not an object".to_string(),
            ));
        };

        if obj.contains_key("keyKind") || obj.contains_key("entries") {
            reject_unknown_keys(&obj, &["keyKind", "entries"])?;
            let key_kind = obj
                .remove("keyKind")
                .ok_or_else(|| PickerError::TagsShape("flat map has no 'keyKind'".to_string()))
                .and_then(|raw| {
                    serde_json::from_value::<KeyKind>(raw)
                        .map_err(|e| PickerError::TagsShape(format!("bad 'keyKind': {e}")))
                })?;
            let entries = obj
                .remove("entries")
                .ok_or_else(|| PickerError::TagsShape("flat map has no 'entries'".to_string()))?;
            return Ok(TagsFile::Flat(FlatTags {
                key_kind,
                entries: decode_entries("entries", entries)?,
            }));
        }

        reject_unknown_keys(&obj, &["byId", "byKey"])?;
        let mut section = |name: &str| match obj.remove(name) {
            Some(raw) => decode_entries(name, raw),
            None => Ok(BTreeMap::new()),
        };
        Ok(TagsFile::Split(SplitTags {
            by_id: section("byId")?,
            by_key: section("byKey")?,
        }))
    }

    pub fn into_maps(self) -> TagMaps {
        match self {
            TagsFile::Split(split) => TagMaps {
                by_id: split.by_id,
                by_key: split.by_key,
            },
            TagsFile::Flat(FlatTags {
                key_kind: KeyKind::Id,
                entries,
            }) => TagMaps {
                by_id: entries,
                by_key: BTreeMap::new(),
            },
            TagsFile::Flat(FlatTags {
                key_kind: KeyKind::Composite,
                entries,
            }) => TagMaps {
                by_id: BTreeMap::new(),
                by_key: entries,
            },
        }
    }
}

fn reject_unknown_keys(obj: &Map<String, Value>, allowed: &[&str]) -> Result<()> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(PickerError::TagsShape(format!(
            "unexpected key '{key}', expected one of: {}",
            allowed.join(", ")
        ))),
        None => Ok(()),
    }
}

fn decode_entries(section: &str, raw: Value) -> Result<BTreeMap<String, TagInfo>> {
    let Value::Object(entries) = raw else {
        return Err(PickerError::TagsShape(format!(
            "'{section}' is not an object"
        )));
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, raw)| match serde_json::from_value::<TagInfo>(raw) {
            Ok(info) => Some((key, info)),
            Err(e) => {
                tracing::debug!(section, key = %key, error = %e, "skipping malformed tag entry");
                None
            }
        })
        .collect())
}

// ---------------------------------------------------------------------------
// TagMaps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagMaps {
    pub by_id: BTreeMap<String, TagInfo>,
    pub by_key: BTreeMap<String, TagInfo>,
}

impl TagMaps {
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_key.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_key.len()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(TagsFile::parse(&data)?.into_maps())
    }

    /// Load a tag file, degrading to no tags when it is missing or malformed.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(maps) => maps,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "tags unavailable, continuing without");
                TagMaps::default()
            }
        }
    }

    /// Entry for a record: by id first, then by `name|CI`.
    pub fn lookup(&self, record: &CommanderRecord) -> Option<&TagInfo> {
        self.by_id
            .get(&record.id)
            .or_else(|| self.by_key.get(&record.composite_key()))
    }

    pub fn into_file(self) -> TagsFile {
        TagsFile::Split(SplitTags {
            by_id: self.by_id,
            by_key: self.by_key,
        })
    }
}

/// Attach aggregate tags to records. Present fields of the matching entry
/// replace the record's tags and counts; records without an entry are untouched.
pub fn apply_tags(commanders: Vec<CommanderRecord>, maps: &TagMaps) -> Vec<CommanderRecord> {
    if maps.is_empty() {
        return commanders;
    }
    commanders
        .into_iter()
        .map(|mut rec| {
            if let Some(info) = maps.lookup(&rec) {
                if let Some(tags) = &info.tags {
                    rec.tags = tags.clone();
                }
                if let Some(counts) = &info.tag_counts {
                    rec.tag_counts = counts.clone();
                }
            }
            rec
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tag index
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    /// Folded lookup key.
    pub key: String,
    /// First label seen for the key.
    pub label: String,
    pub count: u64,
}

/// Aggregate tags across all records, most used first.
///
/// Each record contributes every distinct raw label from `tags` and
/// `tag_counts`, weighted by its count when one exists and by 1 otherwise.
pub fn tag_index(commanders: &[CommanderRecord]) -> Vec<TagSummary> {
    let mut slots: Vec<TagSummary> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();

    for rec in commanders {
        let mut labels: Vec<&String> = Vec::new();
        for raw in rec.tags.iter().chain(rec.tag_counts.keys()) {
            if !labels.contains(&raw) {
                labels.push(raw);
            }
        }

        for raw in labels {
            let key = fold(raw);
            if key.is_empty() {
                continue;
            }
            let weight = u64::from(rec.tag_counts.get(raw).copied().unwrap_or(1));
            match by_key.get(&key) {
                Some(&i) => slots[i].count = slots[i].count.saturating_add(weight),
                None => {
                    by_key.insert(key.clone(), slots.len());
                    slots.push(TagSummary {
                        key,
                        label: raw.clone(),
                        count: weight,
                    });
                }
            }
        }
    }

    slots.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    slots
}

/// Tags whose folded label contains the folded query, capped at `limit`.
pub fn filter_tags<'a>(
    index: &'a [TagSummary],
    query: &str,
    limit: Option<usize>,
) -> Vec<&'a TagSummary> {
    let q = fold(query);
    index
        .iter()
        .filter(|t| q.is_empty() || fold(&t.label).contains(&q))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

// ---------------------------------------------------------------------------
// Harvesting
// ---------------------------------------------------------------------------

/// Count normalized labels; labels that normalize to nothing are dropped.
pub fn count_labels<I, S>(labels: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = BTreeMap::new();
    for label in labels {
        if let Some(key) = normalize_tag(label.as_ref()) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

/// Keep the `top_n` most frequent tags seen at least `min_count` times.
pub fn top_tags(counts: &BTreeMap<String, u32>, min_count: u32, top_n: usize) -> TagInfo {
    let mut sorted: Vec<(&String, &u32)> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let kept: Vec<(String, u32)> = sorted
        .into_iter()
        .filter(|(_, n)| **n >= min_count)
        .take(top_n)
        .map(|(t, n)| (t.clone(), *n))
        .collect();

    TagInfo {
        tags: Some(kept.iter().map(|(t, _)| t.clone()).collect()),
        tag_counts: Some(kept.into_iter().collect()),
        ..TagInfo::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
