//! Build a catalogue from card-search pages saved from the card provider.

use crate::catalogue::{Catalogue, CommanderRow};
use crate::commander::{composite_key, PartnerKind};
use crate::error::{PickerError, Result};
use crate::identity::ColourIdentity;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

pub const SEARCH_QUERY: &str = "is:commander legal:commander game:paper";

static PARTNER_WITH_RE: OnceLock<Regex> = OnceLock::new();
static AND_RE: OnceLock<Regex> = OnceLock::new();

fn partner_with_re() -> &'static Regex {
    PARTNER_WITH_RE.get_or_init(|| Regex::new(r"(?i)partner with ([^\n(]+)").unwrap())
}

fn and_re() -> &'static Regex {
    AND_RE.get_or_init(|| Regex::new(r"(?i)\s+and\s+").unwrap())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUris {
    pub normal: Option<String>,
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedUris {
    pub edhrec: Option<String>,
}

/// The subset of a provider card object the catalogue needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Vec<CardFace>,
    #[serde(default)]
    pub scryfall_uri: Option<String>,
    #[serde(default)]
    pub related_uris: Option<RelatedUris>,
    #[serde(default)]
    pub edhrec_rank: Option<u32>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
}

impl Card {
    /// Front face `normal`, then first card face `normal`, then the `large` variants.
    pub fn pick_image(&self) -> Option<String> {
        let front = self.image_uris.as_ref();
        let face = self.card_faces.first().and_then(|f| f.image_uris.as_ref());
        front
            .and_then(|u| u.normal.clone())
            .or_else(|| face.and_then(|u| u.normal.clone()))
            .or_else(|| front.and_then(|u| u.large.clone()))
            .or_else(|| face.and_then(|u| u.large.clone()))
    }

    pub fn detect_partner(&self) -> (PartnerKind, Vec<String>) {
        let text = self.oracle_text.as_deref().unwrap_or_default();
        let has_keyword = |k: &str| self.keywords.iter().any(|kw| kw == k);

        if self
            .type_line
            .as_deref()
            .is_some_and(|t| t.contains("Background"))
        {
            return (PartnerKind::Background, Vec::new());
        }
        if text.to_lowercase().contains("choose a background") {
            return (PartnerKind::ChooseBackground, Vec::new());
        }
        if has_keyword("Friends forever") {
            return (PartnerKind::FriendsForever, Vec::new());
        }

        if let Some(caps) = partner_with_re().captures(text) {
            let raw = caps[1].trim();
            let names = and_re()
                .split(raw)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            return (PartnerKind::PartnerWith, names);
        }

        if has_keyword("Partner") {
            return (PartnerKind::Partner, Vec::new());
        }
        (PartnerKind::None, Vec::new())
    }

    pub fn to_row(&self) -> CommanderRow {
        let (kind, names) = self.detect_partner();
        CommanderRow {
            id: Some(self.id.clone()),
            name: Some(self.name.trim().to_string()),
            colour_identity: Some(ColourIdentity::from_symbols(&self.color_identity)),
            image: self.pick_image(),
            scryfall_uri: self.scryfall_uri.clone(),
            edhrec_rank: self.edhrec_rank,
            edhrec_uri: self.related_uris.as_ref().and_then(|r| r.edhrec.clone()),
            partner_kind: Some(kind),
            partner_with_names: (!names.is_empty()).then_some(names),
        }
    }
}

/// Cards from one saved search page. A page without a `data` list is an error;
/// cards that fail to decode are skipped.
pub fn parse_page(json: &str) -> Result<Vec<Card>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| PickerError::CatalogueShape(format!("search page is not valid JSON: {e}")))?;
    let Some(Value::Array(data)) = value.get("data").cloned() else {
        return Err(PickerError::CatalogueShape(
            "search page has no 'data' list".to_string(),
        ));
    };
    Ok(data
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Card>(raw) {
            Ok(card) => Some(card),
            Err(e) => {
                tracing::debug!(error = %e, "skipping undecodable card");
                None
            }
        })
        .collect())
}

pub fn load_pages(paths: &[impl AsRef<Path>]) -> Result<Vec<Card>> {
    let mut cards = Vec::new();
    for path in paths {
        let data = std::fs::read_to_string(path.as_ref())?;
        let page = parse_page(&data)?;
        tracing::info!(path = %path.as_ref().display(), cards = page.len(), "loaded search page");
        cards.extend(page);
    }
    Ok(cards)
}

/// Map cards to rows, de-duplicate by `name|CI`, and order by popularity
/// (unranked last) then name.
pub fn build_catalogue(source: &str, cards: &[Card]) -> Catalogue {
    let mut seen: HashSet<String> = HashSet::new();
    let mut rows: Vec<CommanderRow> = Vec::new();
    for card in cards {
        let row = card.to_row();
        let Some((name, ci)) = row.validated() else {
            continue;
        };
        if !seen.insert(composite_key(name, ci)) {
            continue;
        }
        rows.push(row);
    }

    rows.sort_by(|a, b| {
        let ar = a.edhrec_rank.unwrap_or(u32::MAX);
        let br = b.edhrec_rank.unwrap_or(u32::MAX);
        ar.cmp(&br).then_with(|| a.name.cmp(&b.name))
    });
    Catalogue::new(source, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, ci: &[&str]) -> Card {
        Card {
            id: format!("id-{name}"),
            name: name.to_string(),
            color_identity: ci.iter().map(|s| s.to_string()).collect(),
            ..Card::default()
        }
    }

    #[test]
    fn detects_partner_kinds_in_priority_order() {
        let mut bg = card("Candlekeep Sage", &["U"]);
        bg.type_line = Some("Legendary Enchantment — Background".to_string());
        assert_eq!(bg.detect_partner().0, PartnerKind::Background);

        let mut chooser = card("Wilson", &["G"]);
        chooser.oracle_text = Some("Reach\nChoose a Background".to_string());
        assert_eq!(chooser.detect_partner().0, PartnerKind::ChooseBackground);

        let mut ff = card("Cecily", &["R"]);
        ff.keywords = vec!["Friends forever".to_string(), "Partner".to_string()];
        assert_eq!(ff.detect_partner().0, PartnerKind::FriendsForever);

        let mut generic = card("Thrasios", &["G", "U"]);
        generic.keywords = vec!["Partner".to_string()];
        assert_eq!(generic.detect_partner().0, PartnerKind::Partner);

        assert_eq!(card("Krenko", &["R"]).detect_partner().0, PartnerKind::None);
    }

    #[test]
    fn partner_with_extracts_names() {
        let mut okaun = card("Okaun, Eye of Chaos", &["R"]);
        okaun.keywords = vec!["Partner with".to_string()];
        okaun.oracle_text = Some(
            "Partner with Zndrsplt, Eye of Wisdom (When this creature enters, target player may put Zndrsplt into their hand.)"
                .to_string(),
        );
        let (kind, names) = okaun.detect_partner();
        assert_eq!(kind, PartnerKind::PartnerWith);
        assert_eq!(names, vec!["Zndrsplt, Eye of Wisdom"]);

        let mut two = card("Example", &["W"]);
        two.oracle_text = Some("Partner with Alpha and Beta\nFlying".to_string());
        assert_eq!(two.detect_partner().1, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn image_fallback_chain() {
        let mut c = card("Delver", &["U"]);
        c.card_faces = vec![CardFace {
            image_uris: Some(ImageUris {
                normal: Some("face.jpg".to_string()),
                large: None,
            }),
        }];
        assert_eq!(c.pick_image().as_deref(), Some("face.jpg"));
        c.image_uris = Some(ImageUris {
            normal: None,
            large: Some("large.jpg".to_string()),
        });
        assert_eq!(c.pick_image().as_deref(), Some("face.jpg"));
        c.card_faces.clear();
        assert_eq!(c.pick_image().as_deref(), Some("large.jpg"));
    }

    #[test]
    fn build_dedupes_and_sorts_by_rank() {
        let mut a = card("Atraxa", &["G", "W", "U", "B"]);
        a.edhrec_rank = Some(2);
        let mut k = card("Krenko", &["R"]);
        k.edhrec_rank = Some(1);
        let unranked = card("Karn", &[]);
        let dup = card("Krenko", &["R"]);

        let cat = build_catalogue("test", &[unranked, a, k, dup]);
        let names: Vec<&str> = cat
            .commanders
            .iter()
            .filter_map(|r| r.name.as_deref())
            .collect();
        assert_eq!(names, vec!["Krenko", "Atraxa", "Karn"]);
        assert_eq!(cat.count, 3);
        assert_eq!(cat.commanders[1].colour_identity.unwrap().to_string(), "WUBG");
        assert!(cat.commanders[2].colour_identity.unwrap().is_colourless());
    }

    #[test]
    fn page_requires_data_list() {
        assert!(parse_page(r#"{ "object": "error" }"#).is_err());
        let cards = parse_page(
            r#"{ "object": "list", "has_more": false, "data": [
                { "id": "1", "name": "Krenko, Mob Boss", "color_identity": ["R"],
                  "related_uris": { "edhrec": "https://edhrec.com/route/?cc=Krenko" } },
                { "id": 5 }
            ] }"#,
        )
        .unwrap();
        assert_eq!(cards.len(), 1);
        assert!(cards[0].to_row().edhrec_uri.is_some());
    }
}
