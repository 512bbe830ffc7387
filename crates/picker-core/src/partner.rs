use crate::commander::{CommanderRecord, PartnerKind};
use crate::text::fold;

/// Find the card a "Partner with" commander must be paired with.
///
/// Tries an exact folded-name match against the fragments joined with `", "`,
/// then falls back to a candidate whose folded name contains every folded
/// fragment. Upstream name extraction is regex based, so a loose match is
/// preferred over failing to pair. Never returns the record itself.
pub fn resolve_partner<'a>(
    record: &CommanderRecord,
    catalogue: &'a [CommanderRecord],
) -> Option<&'a CommanderRecord> {
    if record.partner_kind != PartnerKind::PartnerWith {
        return None;
    }
    let fragments: Vec<String> = record
        .partner_with_names
        .iter()
        .map(|f| fold(f))
        .filter(|f| !f.is_empty())
        .collect();
    if fragments.is_empty() {
        return None;
    }

    let candidates = || catalogue.iter().filter(|c| c.id != record.id);

    let expected = fragments.join(", ");
    if let Some(hit) = candidates().find(|c| fold(&c.name) == expected) {
        return Some(hit);
    }

    let hit = candidates().find(|c| {
        let name = fold(&c.name);
        fragments.iter().all(|f| name.contains(f.as_str()))
    });
    if hit.is_none() {
        tracing::debug!(commander = %record.name, partners = ?record.partner_with_names, "no partner found");
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ColourIdentity;

    fn rec(id: &str, name: &str, ci: &str) -> CommanderRecord {
        CommanderRecord::new(id, name, ColourIdentity::canonicalize(ci))
    }

    fn partner_with(id: &str, name: &str, ci: &str, names: &[&str]) -> CommanderRecord {
        let mut r = rec(id, name, ci);
        r.partner_kind = PartnerKind::PartnerWith;
        r.partner_with_names = names.iter().map(|s| s.to_string()).collect();
        r
    }

    fn catalogue() -> Vec<CommanderRecord> {
        vec![
            partner_with("o", "Okaun, Eye of Chaos", "R", &["Zndrsplt, Eye of Wisdom"]),
            partner_with("z", "Zndrsplt, Eye of Wisdom", "U", &["Okaun, Eye of Chaos"]),
            rec("p", "Pir, Imaginative Rascal", "G"),
            rec("t", "Toothy, Imaginary Friend", "U"),
        ]
    }

    #[test]
    fn exact_single_name() {
        let cat = catalogue();
        let hit = resolve_partner(&cat[0], &cat).unwrap();
        assert_eq!(hit.id, "z");
    }

    #[test]
    fn single_fragment_falls_back_to_substring() {
        let cat = catalogue();
        let okaun = partner_with("o2", "Okaun", "R", &["Zndrsplt"]);
        let hit = resolve_partner(&okaun, &cat).unwrap();
        assert_eq!(hit.name, "Zndrsplt, Eye of Wisdom");
    }

    #[test]
    fn split_fragments_join_into_full_name() {
        let cat = catalogue();
        let okaun = partner_with("o2", "Okaun", "R", &["Zndrsplt", "Eye of Wisdom"]);
        assert_eq!(resolve_partner(&okaun, &cat).unwrap().id, "z");
    }

    #[test]
    fn matching_is_folded() {
        let cat = vec![rec("l", "Lim-Dûl the Necromancer", "B")];
        let r = partner_with("x", "X", "B", &["lim-dul THE necromancer"]);
        assert_eq!(resolve_partner(&r, &cat).unwrap().id, "l");
    }

    #[test]
    fn never_resolves_to_itself() {
        let selfish = partner_with("s", "Echo, Echo", "U", &["Echo"]);
        let cat = vec![selfish.clone()];
        assert!(resolve_partner(&selfish, &cat).is_none());
    }

    #[test]
    fn other_partner_kinds_do_not_resolve() {
        let cat = catalogue();
        let mut generic = rec("g", "Thrasios", "UG");
        generic.partner_kind = PartnerKind::Partner;
        generic.partner_with_names = vec!["Tymna".to_string()];
        assert!(resolve_partner(&generic, &cat).is_none());
        assert!(resolve_partner(&cat[2], &cat).is_none());
    }

    #[test]
    fn missing_partner_is_standalone() {
        let cat = catalogue();
        let r = partner_with("x", "Lonely", "W", &["Nobody Here"]);
        assert!(resolve_partner(&r, &cat).is_none());
    }
}
