//! Card model and oracle-text classification.

use std::sync::OnceLock;

use regex::RegexSet;
use serde::{Deserialize, Serialize};

/// A single card as it appears in a deck or in the cube catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,

    /// Mana value
    #[serde(default)]
    pub cmc: i32,

    #[serde(default)]
    pub types: Vec<String>,

    #[serde(default)]
    pub sub_types: Vec<String>,

    /// Printed colors as single letters (W, U, B, R, G)
    #[serde(default)]
    pub colors: Vec<String>,

    /// Colors including those from abilities; what matters for lands
    #[serde(default)]
    pub color_identity: Vec<String>,

    #[serde(default)]
    pub mana_cost: String,

    #[serde(default)]
    pub oracle_text: String,

    /// Kept as text since it may be "*" or "1+*"
    #[serde(default)]
    pub power: String,

    #[serde(default)]
    pub toughness: String,

    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub image: String,

    /// Times this card was seen in game replays
    #[serde(default)]
    pub appearances: u32,
}

const REMOVAL_PATTERNS: &[&str] = &[
    r"destroy target",
    r"destroy up to",
    r"destroy all creatures",
    r"exile target (creature|permanent|nonland permanent|artifact|planeswalker)",
    r"exile another target",
    r"exile up to one target",
    r"exile that card",
    r"target creature gets -",
    r"all creatures get -",
    r"-1/-1 counters? on target",
    r"put target creature into its owner",
    r"return target (creature|nonland permanent|permanent) to its owner's hand",
    r"to any target",
    r"target creature or player",
    r"target creature or planeswalker",
    r"damage divided as you choose",
    r"fights (target|another target|up to one target)",
    r"sacrifices? an? (creature|permanent|nonland permanent)",
    r"stun counters? on target",
    r"tap target creature",
];

const COUNTERSPELL_PATTERNS: &[&str] = &[
    r"counter target",
    r"return target spell",
    r"exile target spell",
];

const HAND_HATE_PATTERNS: &[&str] = &[
    r"reveals (their|his or her) hand",
    r"discards? (a|one|two|three|x|that many) cards?",
    r"look at target (player|opponent)'s hand",
];

fn pattern_set(cell: &'static OnceLock<RegexSet>, patterns: &[&str]) -> &'static RegexSet {
    cell.get_or_init(|| match RegexSet::new(patterns) {
        Ok(set) => set,
        Err(e) => {
            tracing::error!("Invalid oracle pattern table: {}", e);
            RegexSet::empty()
        }
    })
}

fn removal_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    pattern_set(&SET, REMOVAL_PATTERNS)
}

fn counterspell_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    pattern_set(&SET, COUNTERSPELL_PATTERNS)
}

fn hand_hate_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    pattern_set(&SET, HAND_HATE_PATTERNS)
}

impl Card {
    /// Create a card with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn has_type(&self, t: &str) -> bool {
        self.types.iter().any(|x| x == t)
    }

    pub fn is_basic_land(&self) -> bool {
        self.has_type("Basic")
    }

    pub fn is_land(&self) -> bool {
        self.has_type("Land")
    }

    pub fn is_creature(&self) -> bool {
        self.has_type("Creature")
    }

    /// Hybrid mana costs such as `{R/W}` can be paid by either color.
    pub fn is_hybrid(&self) -> bool {
        self.mana_cost.contains('/')
    }

    /// Whether the card shares any color with the filter string (e.g. "RG").
    /// An empty filter matches every card.
    pub fn is_color(&self, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        filter.chars().any(|f| {
            self.colors
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&f.to_string()))
        })
    }

    /// Numeric power, if the card has one.
    pub fn power_value(&self) -> Option<i32> {
        self.power.trim().parse().ok()
    }

    fn oracle_lower(&self) -> String {
        self.oracle_text.to_lowercase()
    }

    pub fn is_removal(&self) -> bool {
        removal_set().is_match(&self.oracle_lower())
    }

    pub fn is_counterspell(&self) -> bool {
        counterspell_set().is_match(&self.oracle_lower())
    }

    pub fn is_hand_hate(&self) -> bool {
        hand_hate_set().is_match(&self.oracle_lower())
    }

    /// Removal, counterspells and discard all count as interaction.
    pub fn is_interaction(&self) -> bool {
        self.is_removal() || self.is_counterspell() || self.is_hand_hate()
    }
}
