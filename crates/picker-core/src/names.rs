use crate::identity::ColourIdentity;

/// Community names for each identity, in grid order: (key, name, alias).
static NAMES: [(&str, &str, Option<&str>); 32] = [
    ("W", "White", None),
    ("U", "Blue", None),
    ("B", "Black", None),
    ("R", "Red", None),
    ("G", "Green", None),
    ("C", "Colourless", None),
    // Guilds
    ("WU", "Azorius", None),
    ("UB", "Dimir", None),
    ("BR", "Rakdos", None),
    ("RG", "Gruul", None),
    ("WG", "Selesnya", None),
    ("WB", "Orzhov", None),
    ("UR", "Izzet", None),
    ("BG", "Golgari", None),
    ("WR", "Boros", None),
    ("UG", "Simic", None),
    // Shards
    ("WUB", "Esper", None),
    ("UBR", "Grixis", None),
    ("BRG", "Jund", None),
    ("WRG", "Naya", None),
    ("WUG", "Bant", None),
    // Wedges
    ("WBR", "Mardu", None),
    ("URG", "Temur", None),
    ("WBG", "Abzan", None),
    ("WUR", "Jeskai", None),
    ("UBG", "Sultai", None),
    // Four-colour, Nephilim as alias
    ("WUBR", "Sans Green", Some("Yore-Tiller")),
    ("UBRG", "Sans White", Some("Glint-Eye")),
    ("WBRG", "Sans Blue", Some("Dune-Brood")),
    ("WURG", "Sans Black", Some("Ink-Treader")),
    ("WUBG", "Sans Red", Some("Witch-Maw")),
    ("WUBRG", "Five-Colour", Some("Domain")),
];

pub fn name_for(ci: ColourIdentity) -> &'static str {
    NAMES.get(ci.grid_index()).map_or("Unknown", |(_, name, _)| *name)
}

pub fn alias_for(ci: ColourIdentity) -> Option<&'static str> {
    NAMES.get(ci.grid_index()).and_then(|(_, _, alias)| *alias)
}

/// "Sans Green (Yore-Tiller)" when `with_alias` is set and an alias exists.
pub fn display_name(ci: ColourIdentity, with_alias: bool) -> String {
    match (with_alias, alias_for(ci)) {
        (true, Some(alias)) => format!("{} ({alias})", name_for(ci)),
        _ => name_for(ci).to_string(),
    }
}
