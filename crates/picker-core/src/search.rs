use crate::commander::CommanderRecord;
use crate::identity::ColourIdentity;
use crate::text::fold;

/// Filters for the commander list. Empty fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Substring of the name, compared folded.
    pub text: String,
    /// Exact identity match.
    pub colour_identity: Option<ColourIdentity>,
    /// Match records carrying any of these tags.
    pub tags: Vec<String>,
}

pub fn search<'a>(commanders: &'a [CommanderRecord], query: &SearchQuery) -> Vec<&'a CommanderRecord> {
    let text = fold(&query.text);
    let wanted: Vec<String> = query
        .tags
        .iter()
        .map(|t| fold(t))
        .filter(|t| !t.is_empty())
        .collect();

    let mut hits: Vec<&CommanderRecord> = commanders
        .iter()
        .filter(|c| text.is_empty() || fold(&c.name).contains(&text))
        .filter(|c| match query.colour_identity {
            Some(ci) => c.colour_identity == ci,
            None => true,
        })
        .filter(|c| {
            if wanted.is_empty() {
                return true;
            }
            c.tags.iter().map(|t| fold(t)).any(|t| wanted.contains(&t))
        })
        .collect();
    hits.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, name: &str, ci: &str, tags: &[&str]) -> CommanderRecord {
        let mut r = CommanderRecord::new(id, name, ColourIdentity::canonicalize(ci));
        r.tags = tags.iter().map(|t| t.to_string()).collect();
        r
    }

    fn roster() -> Vec<CommanderRecord> {
        vec![
            rec("k", "Krenko, Mob Boss", "R", &["Goblins", "Tokens"]),
            rec("j", "Jhoira of the Ghitu", "UR", &["Suspend"]),
            rec("e", "Éowyn, Fearless Knight", "WR", &[]),
            rec("a", "Atraxa", "WUBG", &["Superfriends", "tokens"]),
        ]
    }

    #[test]
    fn empty_query_returns_all_sorted() {
        let cmdrs = roster();
        let names: Vec<&str> = search(&cmdrs, &SearchQuery::default())
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names[0], "Atraxa");
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn name_match_is_folded() {
        let cmdrs = roster();
        let q = SearchQuery {
            text: "EOWYN".to_string(),
            ..SearchQuery::default()
        };
        assert_eq!(search(&cmdrs, &q)[0].id, "e");
    }

    #[test]
    fn identity_filter_is_exact() {
        let cmdrs = roster();
        let q = SearchQuery {
            colour_identity: Some(ColourIdentity::canonicalize("R")),
            ..SearchQuery::default()
        };
        let hits = search(&cmdrs, &q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "k");
    }

    #[test]
    fn tag_filter_matches_any_and_excludes_untagged() {
        let cmdrs = roster();
        let q = SearchQuery {
            tags: vec!["TOKENS".to_string(), "suspend".to_string()],
            ..SearchQuery::default()
        };
        let ids: Vec<&str> = search(&cmdrs, &q).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "j", "k"]);
    }
}
