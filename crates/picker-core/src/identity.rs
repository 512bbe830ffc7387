use crate::error::PickerError;
use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// Colour
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Colour {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Colour {
    /// Colours in canonical W, U, B, R, G order.
    pub fn all() -> &'static [Colour] {
        &[
            Colour::White,
            Colour::Blue,
            Colour::Black,
            Colour::Red,
            Colour::Green,
        ]
    }

    pub fn symbol(self) -> char {
        match self {
            Colour::White => 'W',
            Colour::Blue => 'U',
            Colour::Black => 'B',
            Colour::Red => 'R',
            Colour::Green => 'G',
        }
    }

    /// Case-insensitive lookup of a coloured pip. `C` is not a colour.
    pub fn from_symbol(c: char) -> Option<Colour> {
        match c.to_ascii_uppercase() {
            'W' => Some(Colour::White),
            'U' => Some(Colour::Blue),
            'B' => Some(Colour::Black),
            'R' => Some(Colour::Red),
            'G' => Some(Colour::Green),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

pub const COLOURLESS: char = 'C';

// ---------------------------------------------------------------------------
// ColourIdentity
// ---------------------------------------------------------------------------

/// A canonical colour identity.
///
/// Stored as a five-bit set over W, U, B, R, G. The empty set is colourless
/// (`"C"`), so every value is one of the 32 valid identities and colourless
/// can never coexist with a colour.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColourIdentity {
    bits: u8,
}

const fn combo(s: &str) -> ColourIdentity {
    let bytes = s.as_bytes();
    let mut bits = 0u8;
    let mut i = 0;
    while i < bytes.len() {
        bits |= match bytes[i] {
            b'W' => 1,
            b'U' => 2,
            b'B' => 4,
            b'R' => 8,
            b'G' => 16,
            _ => 0,
        };
        i += 1;
    }
    ColourIdentity { bits }
}

/// The challenge grid: mono, colourless, guilds, shards, wedges, four-colour, five-colour.
pub const ALL_COMBINATIONS: [ColourIdentity; 32] = [
    combo("W"),
    combo("U"),
    combo("B"),
    combo("R"),
    combo("G"),
    combo("C"),
    combo("WU"),
    combo("UB"),
    combo("BR"),
    combo("RG"),
    combo("WG"),
    combo("WB"),
    combo("UR"),
    combo("BG"),
    combo("WR"),
    combo("UG"),
    combo("WUB"),
    combo("UBR"),
    combo("BRG"),
    combo("WRG"),
    combo("WUG"),
    combo("WBR"),
    combo("URG"),
    combo("WBG"),
    combo("WUR"),
    combo("UBG"),
    combo("WUBR"),
    combo("UBRG"),
    combo("WBRG"),
    combo("WURG"),
    combo("WUBG"),
    combo("WUBRG"),
];

impl ColourIdentity {
    pub const COLOURLESS: ColourIdentity = ColourIdentity { bits: 0 };

    /// Canonicalize free text such as `"gwu"`, `"{W}{U}"` or `""`.
    ///
    /// Anything that is not a pip is ignored. Coloured pips win over `C`; no
    /// coloured pips at all (including the empty string) is colourless.
    pub fn canonicalize(input: &str) -> ColourIdentity {
        let bits = input
            .chars()
            .filter_map(Colour::from_symbol)
            .fold(0u8, |acc, c| acc | c.bit());
        ColourIdentity { bits }
    }

    /// Canonicalize a symbol list as the card provider sends it (`["G", "W"]`, `[]`).
    pub fn from_symbols<I, S>(symbols: I) -> ColourIdentity
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let bits = symbols
            .into_iter()
            .map(|s| ColourIdentity::canonicalize(s.as_ref()).bits)
            .fold(0u8, |acc, b| acc | b);
        ColourIdentity { bits }
    }

    pub fn from_colours(colours: &[Colour]) -> ColourIdentity {
        ColourIdentity {
            bits: colours.iter().fold(0u8, |acc, c| acc | c.bit()),
        }
    }

    /// Combined identity of a commander and an optional partner.
    pub fn union(self, other: Option<ColourIdentity>) -> ColourIdentity {
        ColourIdentity {
            bits: self.bits | other.map_or(0, |o| o.bits),
        }
    }

    pub fn is_colourless(self) -> bool {
        self.bits == 0
    }

    pub fn contains(self, colour: Colour) -> bool {
        self.bits & colour.bit() != 0
    }

    /// Number of colours; zero for colourless.
    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.is_colourless()
    }

    pub fn colours(self) -> impl Iterator<Item = Colour> {
        Colour::all().iter().copied().filter(move |c| self.contains(*c))
    }

    /// Position in [`ALL_COMBINATIONS`].
    pub fn grid_index(self) -> usize {
        ALL_COMBINATIONS
            .iter()
            .position(|c| *c == self)
            .unwrap_or(ALL_COMBINATIONS.len())
    }

    /// Canonical key, e.g. `"WUG"` or `"C"`.
    pub fn key(self) -> String {
        self.to_string()
    }
}

/// Canonical-form equality over raw inputs.
pub fn ci_equals(a: &str, b: &str) -> bool {
    ColourIdentity::canonicalize(a) == ColourIdentity::canonicalize(b)
}

impl Default for ColourIdentity {
    fn default() -> Self {
        ColourIdentity::COLOURLESS
    }
}

impl Ord for ColourIdentity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.grid_index().cmp(&other.grid_index())
    }
}

impl PartialOrd for ColourIdentity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ColourIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_colourless() {
            return write!(f, "{COLOURLESS}");
        }
        for c in self.colours() {
            write!(f, "{}", c.symbol())?;
        }
        Ok(())
    }
}

impl fmt::Debug for ColourIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ColourIdentity({self})")
    }
}

/// Strict parsing for user input: every non-space character must be a pip.
impl std::str::FromStr for ColourIdentity {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let valid = !trimmed.is_empty()
            && trimmed.chars().all(|c| {
                c.is_whitespace()
                    || c.eq_ignore_ascii_case(&COLOURLESS)
                    || Colour::from_symbol(c).is_some()
            });
        if !valid {
            return Err(PickerError::InvalidColourIdentity(s.to_string()));
        }
        Ok(ColourIdentity::canonicalize(trimmed))
    }
}

impl Serialize for ColourIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct IdentityVisitor;

impl<'de> Visitor<'de> for IdentityVisitor {
    type Value = ColourIdentity;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a colour identity string or a list of colour symbols")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ColourIdentity, E> {
        Ok(ColourIdentity::canonicalize(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ColourIdentity, A::Error> {
        let mut symbols: Vec<String> = Vec::new();
        while let Some(s) = seq.next_element::<String>()? {
            symbols.push(s);
        }
        Ok(ColourIdentity::from_symbols(symbols))
    }
}

impl<'de> Deserialize<'de> for ColourIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(IdentityVisitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
