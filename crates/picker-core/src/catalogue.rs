use crate::commander::PartnerKind;
use crate::error::{PickerError, Result};
use crate::identity::ColourIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

// ---------------------------------------------------------------------------
// CommanderRow
// ---------------------------------------------------------------------------

/// One row of the catalogue blob, as produced by the catalogue build step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommanderRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub colour_identity: Option<ColourIdentity>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, alias = "detailUri", skip_serializing_if = "Option::is_none")]
    pub scryfall_uri: Option<String>,
    #[serde(default)]
    pub edhrec_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edhrec_uri: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_partner_kind",
        skip_serializing_if = "Option::is_none"
    )]
    pub partner_kind: Option<PartnerKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_with_names: Option<Vec<String>>,
}

fn lenient_partner_kind<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<PartnerKind>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(kind) => Some(kind),
        Err(_) => {
            tracing::debug!(partner_kind = %s, "unknown partner kind ignored");
            None
        }
    }))
}

impl CommanderRow {
    /// Trimmed, non-empty upstream id.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Trimmed, non-empty display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Name and identity, or `None` for a malformed row.
    pub fn validated(&self) -> Option<(&str, ColourIdentity)> {
        Some((self.name()?, self.colour_identity?))
    }
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// The catalogue blob: `{ source, generatedAt, count, commanders }`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalogue {
    pub source: String,
    pub generated_at: Option<DateTime<Utc>>,
    pub count: usize,
    pub commanders: Vec<CommanderRow>,
    /// Rows that failed to deserialize while parsing.
    #[serde(skip)]
    pub skipped: usize,
}

impl Catalogue {
    pub fn new(source: impl Into<String>, commanders: Vec<CommanderRow>) -> Self {
        Self {
            source: source.into(),
            generated_at: Some(Utc::now()),
            count: commanders.len(),
            commanders,
            skipped: 0,
        }
    }

    /// Parse a catalogue blob.
    ///
    /// A blob that is not an object with a `commanders` array is an error;
    /// individual rows that do not deserialize are dropped.
    pub fn parse(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| PickerError::CatalogueShape(format!("not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut obj) = value else {
            return Err(PickerError::CatalogueShape(
                "top level is not an object".to_string(),
            ));
        };
        let Some(Value::Array(raw_rows)) = obj.remove("commanders") else {
            return Err(PickerError::CatalogueShape(
                "missing 'commanders' list".to_string(),
            ));
        };

        let total = raw_rows.len();
        let commanders: Vec<CommanderRow> = raw_rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, raw)| match serde_json::from_value(raw) {
                Ok(row) => Some(row),
                Err(e) => {
                    tracing::debug!(row = i, error = %e, "skipping malformed catalogue row");
                    None
                }
            })
            .collect();

        let source = obj
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let generated_at = obj
            .get("generatedAt")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let count = obj
            .get("count")
            .and_then(Value::as_u64)
            .map_or(commanders.len(), |n| n as usize);

        Ok(Self {
            source,
            generated_at,
            count,
            skipped: total - commanders.len(),
            commanders,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_rows_and_metadata() {
        let cat = Catalogue::parse(
            r#"{
                "source": "https://api.scryfall.com/cards/search?q=is%3Acommander",
                "generatedAt": "2025-01-02T03:04:05.000Z",
                "count": 2,
                "commanders": [
                    { "id": "a", "name": "Atraxa, Praetors' Voice", "colourIdentity": "WUBG",
                      "image": "https://img/a.jpg", "scryfallUri": "https://scryfall/a", "edhrecRank": 1 },
                    { "id": "b", "name": "Kenrith", "colourIdentity": ["G","W","U","B","R"],
                      "edhrecRank": null, "partnerKind": "none" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cat.count, 2);
        assert_eq!(cat.commanders.len(), 2);
        assert!(cat.generated_at.is_some());
        assert_eq!(cat.commanders[1].colour_identity.unwrap().to_string(), "WUBRG");
        assert_eq!(cat.commanders[1].edhrec_rank, None);
        assert_eq!(cat.commanders[1].partner_kind, Some(PartnerKind::None));
    }

    #[test]
    fn malformed_rows_are_dropped() {
        let cat = Catalogue::parse(
            r#"{ "commanders": [ 42, { "name": "Ok", "colourIdentity": "R" }, { "edhrecRank": "high" } ] }"#,
        )
        .unwrap();
        assert_eq!(cat.commanders.len(), 1);
        assert_eq!(cat.skipped, 2);
    }

    #[test]
    fn missing_commanders_list_is_fatal() {
        assert!(matches!(
            Catalogue::parse(r#"{ "source": "x", "count": 0 }"#),
            Err(PickerError::CatalogueShape(_))
        ));
        assert!(matches!(
            Catalogue::parse(r#"[1, 2, 3]"#),
            Err(PickerError::CatalogueShape(_))
        ));
        assert!(matches!(
            Catalogue::parse("not json"),
            Err(PickerError::CatalogueShape(_))
        ));
    }

    #[test]
    fn unknown_partner_kind_is_ignored() {
        let cat = Catalogue::parse(
            r#"{ "commanders": [ { "name": "X", "colourIdentity": "U", "partnerKind": "sidekick" } ] }"#,
        )
        .unwrap();
        assert_eq!(cat.commanders[0].partner_kind, None);
    }

    #[test]
    fn detail_uri_alias() {
        let cat = Catalogue::parse(
            r#"{ "commanders": [ { "name": "X", "colourIdentity": "U", "detailUri": "https://d" } ] }"#,
        )
        .unwrap();
        assert_eq!(cat.commanders[0].scryfall_uri.as_deref(), Some("https://d"));
    }

    #[test]
    fn validated_requires_name_and_identity() {
        let row = CommanderRow {
            name: Some("  ".to_string()),
            colour_identity: Some(ColourIdentity::COLOURLESS),
            ..Default::default()
        };
        assert!(row.validated().is_none());
        let row = CommanderRow {
            name: Some("Karn".to_string()),
            ..Default::default()
        };
        assert!(row.validated().is_none());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("public/commanders.json");
        let row = CommanderRow {
            id: Some("k".to_string()),
            name: Some("Karn".to_string()),
            colour_identity: Some(ColourIdentity::COLOURLESS),
            ..Default::default()
        };
        Catalogue::new("test", vec![row.clone()]).save(&path).unwrap();
        let loaded = Catalogue::load(&path).unwrap();
        assert_eq!(loaded.source, "test");
        assert_eq!(loaded.commanders, vec![row]);
    }
}
