use crate::error::{PickerError, Result};
use crate::identity::ColourIdentity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// PartnerKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PartnerKind {
    #[default]
    None,
    /// Generic "Partner".
    Partner,
    /// "Partner with <name>"; the required partner is named on the record.
    PartnerWith,
    FriendsForever,
    ChooseBackground,
    /// The Background enchantment itself.
    Background,
}

impl PartnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PartnerKind::None => "none",
            PartnerKind::Partner => "partner",
            PartnerKind::PartnerWith => "partnerWith",
            PartnerKind::FriendsForever => "friendsForever",
            PartnerKind::ChooseBackground => "chooseBackground",
            PartnerKind::Background => "background",
        }
    }
}

impl fmt::Display for PartnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PartnerKind {
    type Err = PickerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" => Ok(PartnerKind::None),
            "partner" => Ok(PartnerKind::Partner),
            "partnerWith" | "partner-with" => Ok(PartnerKind::PartnerWith),
            "friendsForever" | "friends-forever" => Ok(PartnerKind::FriendsForever),
            "chooseBackground" | "choose-background" => Ok(PartnerKind::ChooseBackground),
            "background" => Ok(PartnerKind::Background),
            _ => Err(PickerError::InvalidPartnerKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// CommanderRecord
// ---------------------------------------------------------------------------

/// One card usable as a commander.
///
/// `image`, `scryfall`, `edhrec_rank`, `edhrec_uri` and the partner fields are
/// catalogue-owned and refreshed on import. `tags` and `tag_counts` are only
/// changed by a tag merge, and records created by hand keep their id and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommanderRecord {
    pub id: String,
    pub name: String,
    pub colour_identity: ColourIdentity,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scryfall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edhrec_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edhrec_uri: Option<String>,
    #[serde(default)]
    pub partner_kind: PartnerKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partner_with_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tag_counts: BTreeMap<String, u32>,
}

impl CommanderRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        colour_identity: ColourIdentity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            colour_identity,
            image: None,
            scryfall: None,
            edhrec_rank: None,
            edhrec_uri: None,
            partner_kind: PartnerKind::None,
            partner_with_names: Vec::new(),
            tags: Vec::new(),
            tag_counts: BTreeMap::new(),
        }
    }

    /// A hand-made record with a freshly generated id.
    pub fn user_created(name: &str, colour_identity: ColourIdentity) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PickerError::InvalidCommander(
                "name must not be empty".to_string(),
            ));
        }
        Ok(Self::new(generate_id(), name, colour_identity))
    }

    /// The `name|CI` lookup key shared with the tag aggregate.
    pub fn composite_key(&self) -> String {
        composite_key(&self.name, self.colour_identity)
    }
}

pub fn composite_key(name: &str, ci: ColourIdentity) -> String {
    format!("{name}|{ci}")
}

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// List operations
// ---------------------------------------------------------------------------

pub fn find<'a>(commanders: &'a [CommanderRecord], id: &str) -> Result<&'a CommanderRecord> {
    commanders
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| PickerError::CommanderNotFound(id.to_string()))
}

pub fn add_commander(commanders: &mut Vec<CommanderRecord>, record: CommanderRecord) -> Result<()> {
    if record.name.trim().is_empty() {
        return Err(PickerError::InvalidCommander(
            "name must not be empty".to_string(),
        ));
    }
    if commanders.iter().any(|c| c.id == record.id) {
        return Err(PickerError::CommanderExists(record.id));
    }
    commanders.push(record);
    Ok(())
}

/// Remove a record by id. Returns the removed record, if any.
pub fn delete_commander(commanders: &mut Vec<CommanderRecord>, id: &str) -> Option<CommanderRecord> {
    let pos = commanders.iter().position(|c| c.id == id)?;
    Some(commanders.remove(pos))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_kind_roundtrip() {
        for kind in [
            PartnerKind::None,
            PartnerKind::Partner,
            PartnerKind::PartnerWith,
            PartnerKind::FriendsForever,
            PartnerKind::ChooseBackground,
            PartnerKind::Background,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            assert_eq!(kind.as_str().parse::<PartnerKind>().unwrap(), kind);
        }
        assert!("sidekick".parse::<PartnerKind>().is_err());
    }

    #[test]
    fn record_serializes_camel_case() {
        let mut rec = CommanderRecord::new("a1", "Atraxa", ColourIdentity::canonicalize("GWUB"));
        rec.edhrec_rank = Some(3);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["colourIdentity"], "WUBG");
        assert_eq!(json["edhrecRank"], 3);
        assert_eq!(json["partnerKind"], "none");
        assert!(json.get("tags").is_none());
    }

    #[test]
    fn user_created_requires_name() {
        assert!(CommanderRecord::user_created("  ", ColourIdentity::COLOURLESS).is_err());
        let rec = CommanderRecord::user_created(" Karn ", ColourIdentity::COLOURLESS).unwrap();
        assert_eq!(rec.name, "Karn");
        assert!(!rec.id.is_empty());
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut list = Vec::new();
        let rec = CommanderRecord::new("x", "Kenrith", ColourIdentity::canonicalize("WUBRG"));
        add_commander(&mut list, rec.clone()).unwrap();
        assert!(matches!(
            add_commander(&mut list, rec),
            Err(PickerError::CommanderExists(_))
        ));
    }

    #[test]
    fn delete_missing_is_none() {
        let mut list = vec![CommanderRecord::new("x", "Kenrith", ColourIdentity::COLOURLESS)];
        assert!(delete_commander(&mut list, "nope").is_none());
        assert!(delete_commander(&mut list, "x").is_some());
        assert!(list.is_empty());
    }

    #[test]
    fn composite_key_uses_canonical_identity() {
        let rec = CommanderRecord::new("x", "Niv-Mizzet", ColourIdentity::canonicalize("RU"));
        assert_eq!(rec.composite_key(), "Niv-Mizzet|UR");
    }
}
