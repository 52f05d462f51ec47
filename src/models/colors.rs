//! Color canonicalization and color-identity enumeration.
//!
//! The canonical form of a color combination is its letters sorted into
//! WUBRG order, uppercased and concatenated (e.g. `["U", "W"]` becomes `"WU"`).

use std::collections::BTreeSet;

/// The five colors in canonical order.
pub const COLOR_ORDER: [&str; 5] = ["W", "U", "B", "R", "G"];

/// Largest identity enumerated for a deck.
pub const MAX_IDENTITY_SIZE: usize = 3;

/// Position of a color letter in WUBRG order. Unknown letters sort last.
pub fn color_rank(color: &str) -> usize {
    let upper = color.to_uppercase();
    COLOR_ORDER
        .iter()
        .position(|c| *c == upper)
        .unwrap_or(COLOR_ORDER.len())
}

/// Combine color letters into their canonical string.
pub fn combine_colors<I, S>(colors: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut letters: Vec<String> = colors
        .into_iter()
        .map(|c| c.as_ref().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect();
    letters.sort_by_key(|c| color_rank(c));
    letters.concat()
}

/// Split a color string such as `"ur"` into single letters.
pub fn split_colors(s: &str) -> Vec<String> {
    s.chars().map(|c| c.to_string()).collect()
}

/// Canonicalize a color string given in any order or case.
pub fn canonical(s: &str) -> String {
    combine_colors(split_colors(s))
}

/// Every non-empty subset of at most three of the given colors, canonicalized.
///
/// A four-color deck yields its singles, pairs and triples but not the
/// four-color combination itself.
pub fn color_identities<S: AsRef<str>>(colors: &[S]) -> BTreeSet<String> {
    let mut unique: Vec<String> = colors
        .iter()
        .map(|c| c.as_ref().to_uppercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    unique.sort_by_key(|c| color_rank(c));

    let mut identities = BTreeSet::new();
    let n = unique.len();
    for mask in 1u32..(1 << n) {
        if mask.count_ones() as usize > MAX_IDENTITY_SIZE {
            continue;
        }
        let subset = (0..n)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| unique[i].as_str());
        identities.insert(combine_colors(subset));
    }
    identities
}

/// Color produced by a basic land, by name.
pub fn basic_land_color(name: &str) -> Option<&'static str> {
    match name {
        "Plains" => Some("W"),
        "Island" => Some("U"),
        "Swamp" => Some("B"),
        "Mountain" => Some("R"),
        "Forest" => Some("G"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_colors_order_independent() {
        assert_eq!(combine_colors(["U", "W"]), "WU");
        assert_eq!(combine_colors(["W", "U"]), "WU");
        assert_eq!(combine_colors(["g", "r", "w"]), "WRG");
    }

    #[test]
    fn test_combine_colors_idempotent() {
        let once = combine_colors(["G", "B", "U"]);
        let twice = canonical(&once);
        assert_eq!(once, "UBG");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_combine_colors_empty() {
        assert_eq!(combine_colors(Vec::<String>::new()), "");
    }

    #[test]
    fn test_color_identities_two_colors() {
        let ids = color_identities(&["R", "W"]);
        let expected: BTreeSet<String> = ["W", "R", "WR"].iter().map(|s| s.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_color_identities_four_colors_caps_at_three() {
        let ids = color_identities(&["W", "U", "B", "R"]);
        // 4 singles + 6 pairs + 4 triples
        assert_eq!(ids.len(), 14);
        assert!(ids.contains("WUB"));
        assert!(!ids.contains("WUBR"));
    }

    #[test]
    fn test_color_identities_ignores_duplicates() {
        let ids = color_identities(&["G", "g", "G"]);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("G"));
    }

    #[test]
    fn test_basic_land_color() {
        assert_eq!(basic_land_color("Forest"), Some("G"));
        assert_eq!(basic_land_color("Island"), Some("U"));
        assert_eq!(basic_land_color("Steam Vents"), None);
    }
}
