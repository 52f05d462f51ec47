//! Query evaluation against decks and cards.

use crate::models::colors::{canonical, combine_colors};
use crate::models::Card;

use super::parse::{Field, Operator, Query, Term};

/// What a deck must expose to be searched.
pub trait Searchable {
    fn player(&self) -> &str;
    fn labels(&self) -> &[String];
    fn draft_size(&self) -> usize;
    /// Canonical deck colors
    fn deck_colors(&self) -> &[String];
    /// Mainboard, sideboard and pool
    fn cards(&self) -> Vec<&Card>;
}

/// Whether a deck satisfies the query.
///
/// Every deck-level term must hold, and every card-level term must be
/// satisfied by at least one of the deck's cards (not necessarily the same one).
pub fn deck_matches<D: Searchable + ?Sized>(deck: &D, query: &Query) -> bool {
    match query {
        Query::Empty => true,
        Query::Fuzzy(text) => {
            if deck.player().to_lowercase().contains(text.as_str())
                || deck
                    .labels()
                    .iter()
                    .any(|l| l.to_lowercase().contains(text.as_str()))
            {
                return true;
            }
            deck.cards().iter().any(|c| text_matches(c, text))
        }
        Query::Terms(terms) => {
            let (deck_terms, card_terms): (Vec<&Term>, Vec<&Term>) =
                terms.iter().partition(|t| {
                    matches!(t, Term::Field { field, .. } if field.is_deck_level())
                });

            if !deck_terms.iter().all(|t| deck_term_matches(deck, t)) {
                return false;
            }
            if card_terms.is_empty() {
                return true;
            }
            let cards = deck.cards();
            card_terms.iter().all(|term| {
                cards.iter().any(|card| match term {
                    Term::Text(text) => text_matches(card, &text.to_lowercase()),
                    Term::Field { field, op, value } => card_field_matches(card, *field, *op, value),
                })
            })
        }
    }
}

/// Whether a single card satisfies every term of the query.
pub fn card_matches(card: &Card, query: &Query) -> bool {
    match query {
        Query::Empty => true,
        Query::Fuzzy(text) => text_matches(card, text),
        Query::Terms(terms) => terms.iter().all(|term| match term {
            Term::Field { field, op, value } if !field.is_deck_level() => {
                card_field_matches(card, *field, *op, value)
            }
            _ => true,
        }),
    }
}

fn text_matches(card: &Card, lowered: &str) -> bool {
    card.name.to_lowercase().contains(lowered) || card.oracle_text.to_lowercase().contains(lowered)
}

fn deck_term_matches<D: Searchable + ?Sized>(deck: &D, term: &Term) -> bool {
    let Term::Field { field, op, value } = term else {
        return true;
    };
    match field {
        Field::Arch => {
            let found = deck.labels().iter().any(|l| l.eq_ignore_ascii_case(value));
            match op {
                Operator::Contains => found,
                Operator::NotEqual => !found,
                _ => true,
            }
        }
        Field::Player => match op {
            Operator::Contains => deck
                .player()
                .to_lowercase()
                .contains(&value.to_lowercase()),
            _ => true,
        },
        Field::DeckColor => colors_match(&combine_colors(deck.deck_colors()), *op, value),
        Field::DraftSize => compare(deck.draft_size() as i64, *op, value),
        _ => true,
    }
}

fn card_field_matches(card: &Card, field: Field, op: Operator, value: &str) -> bool {
    match field {
        Field::Color => colors_match(&combine_colors(&card.colors), op, value),
        Field::Type => match op {
            Operator::Contains => card.types.iter().any(|t| t.eq_ignore_ascii_case(value)),
            _ => true,
        },
        Field::Name => match op {
            Operator::Contains => card.name.to_lowercase().contains(&value.to_lowercase()),
            _ => true,
        },
        Field::Oracle => match op {
            Operator::Contains => card
                .oracle_text
                .to_lowercase()
                .contains(&value.to_lowercase()),
            _ => true,
        },
        Field::Cmc => compare(i64::from(card.cmc), op, value),
        Field::Power => match card.power_value() {
            Some(power) => compare(i64::from(power), op, value),
            None => false,
        },
        _ => true,
    }
}

/// `:` is contains-all, `=` exact set, `!=` anything but the exact set.
fn colors_match(target: &str, op: Operator, value: &str) -> bool {
    match op {
        Operator::Contains => {
            let target = target.to_lowercase();
            value
                .chars()
                .all(|c| target.contains(c.to_ascii_lowercase()))
        }
        Operator::Equal => canonical(value) == target,
        Operator::NotEqual => canonical(value) != target,
        _ => true,
    }
}

/// Integer comparison. A malformed value compares as zero.
fn compare(actual: i64, op: Operator, value: &str) -> bool {
    let wanted: i64 = value.trim().parse().unwrap_or(0);
    match op {
        Operator::Less => actual < wanted,
        Operator::Greater => actual > wanted,
        Operator::Equal => actual == wanted,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestDeck {
        player: String,
        labels: Vec<String>,
        draft_size: usize,
        colors: Vec<String>,
        cards: Vec<Card>,
    }

    impl Searchable for TestDeck {
        fn player(&self) -> &str {
            &self.player
        }
        fn labels(&self) -> &[String] {
            &self.labels
        }
        fn draft_size(&self) -> usize {
            self.draft_size
        }
        fn deck_colors(&self) -> &[String] {
            &self.colors
        }
        fn cards(&self) -> Vec<&Card> {
            self.cards.iter().collect()
        }
    }

    fn card(name: &str, colors: &[&str], types: &[&str], cmc: i32) -> Card {
        Card {
            name: name.to_string(),
            colors: colors.iter().map(|s| s.to_string()).collect(),
            types: types.iter().map(|s| s.to_string()).collect(),
            cmc,
            ..Default::default()
        }
    }

    fn deck(labels: &[&str], cards: Vec<Card>) -> TestDeck {
        TestDeck {
            player: "Alice".to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            draft_size: 8,
            colors: vec!["U".to_string(), "R".to_string()],
            cards,
        }
    }

    fn matches(d: &TestDeck, q: &str) -> bool {
        deck_matches(d, &Query::parse(q))
    }

    #[test]
    fn test_arch_and_color_scenario() {
        let bolt = card("Lightning Bolt", &["R"], &["Instant"], 1);
        assert!(matches(&deck(&["aggro"], vec![bolt.clone()]), "arch:aggro color:R"));
        assert!(!matches(&deck(&["control"], vec![bolt]), "arch:aggro color:R"));

        let blue = card("Lightning Bolt", &["U"], &["Instant"], 1);
        assert!(!matches(&deck(&["aggro"], vec![blue]), "arch:aggro color:R"));
    }

    #[test]
    fn test_empty_query_matches() {
        assert!(matches(&deck(&[], vec![]), ""));
    }

    #[test]
    fn test_card_terms_may_match_different_cards() {
        let d = deck(
            &[],
            vec![
                card("Lightning Bolt", &["R"], &["Instant"], 1),
                card("Snapcaster Mage", &["U"], &["Creature"], 2),
            ],
        );
        assert!(matches(&d, "color:R t:creature"));
        assert!(!matches(&d, "color:G"));
    }

    #[test]
    fn test_arch_not_equal() {
        let d = deck(&["Aggro"], vec![]);
        assert!(!matches(&d, "arch!=aggro"));
        assert!(matches(&d, "arch!=control"));
        assert!(matches(&deck(&["big red"], vec![]), r#"arch:"big red""#));
    }

    #[test]
    fn test_player_substring() {
        let d = deck(&[], vec![]);
        assert!(matches(&d, "player:ali"));
        assert!(!matches(&d, "player:bob"));
    }

    #[test]
    fn test_dcolor_operators() {
        let d = deck(&[], vec![]);
        assert!(matches(&d, "dcolor:r"));
        assert!(matches(&d, "dcolor:RU"));
        assert!(!matches(&d, "dcolor:RUG"));
        assert!(matches(&d, "dcolor=RU"));
        assert!(!matches(&d, "dcolor=R"));
        assert!(matches(&d, "dcolor!=R"));
        assert!(!matches(&d, "dcolor!=ur"));
    }

    #[test]
    fn test_draft_size() {
        let d = deck(&[], vec![]);
        assert!(matches(&d, "draftSize>6"));
        assert!(!matches(&d, "draftSize<8"));
        assert!(matches(&d, "draftSize=8"));
    }

    #[test]
    fn test_fuzzy_player_label_then_cards() {
        let d = deck(&["Reanimator"], vec![card("Lightning Bolt", &["R"], &[], 1)]);
        assert!(matches(&d, "ALICE"));
        assert!(matches(&d, "reanim"));
        assert!(matches(&d, "bolt"));
        assert!(!matches(&d, "counterspell"));
    }

    #[test]
    fn test_bare_text_in_structured_query_matches_cards() {
        let d = deck(&["aggro"], vec![card("Lightning Bolt", &["R"], &[], 1)]);
        assert!(matches(&d, "arch:aggro bolt"));
        assert!(!matches(&d, "arch:aggro counterspell"));
    }

    #[test]
    fn test_card_cmc_and_type() {
        let bolt = card("Lightning Bolt", &["R"], &["Instant"], 1);
        assert!(card_matches(&bolt, &Query::parse("cmc<2")));
        assert!(card_matches(&bolt, &Query::parse("cmc=1 t:instant")));
        assert!(!card_matches(&bolt, &Query::parse("cmc>1")));
        assert!(!card_matches(&bolt, &Query::parse("t:inst")));
    }

    #[test]
    fn test_card_power_non_numeric_never_matches() {
        let mut goyf = card("Tarmogoyf", &["G"], &["Creature"], 2);
        goyf.power = "*".to_string();
        assert!(!card_matches(&goyf, &Query::parse("pow>0")));
        assert!(!card_matches(&goyf, &Query::parse("pow<100")));

        goyf.power = "4".to_string();
        assert!(card_matches(&goyf, &Query::parse("pow>3")));
        assert!(card_matches(&goyf, &Query::parse("pow=4")));
    }

    #[test]
    fn test_card_color_exact() {
        let gold = card("Electrolyze", &["R", "U"], &["Instant"], 3);
        assert!(card_matches(&gold, &Query::parse("color=UR")));
        assert!(card_matches(&gold, &Query::parse("color:u")));
        assert!(!card_matches(&gold, &Query::parse("color=R")));
        assert!(card_matches(&gold, &Query::parse("color!=R")));
    }

    #[test]
    fn test_card_name_and_oracle() {
        let mut c = card("Fact or Fiction", &["U"], &["Instant"], 4);
        c.oracle_text = "Reveal the top five cards of your library.".to_string();
        assert!(card_matches(&c, &Query::parse("name:fiction")));
        assert!(card_matches(&c, &Query::parse(r#"o:"top five""#)));
        assert!(!card_matches(&c, &Query::parse("o:graveyard")));
    }

    #[test]
    fn test_unrecognized_terms_pass_through() {
        let bolt = card("Lightning Bolt", &["R"], &["Instant"], 1);
        assert!(card_matches(&bolt, &Query::parse("games>100 color:R")));
        assert!(card_matches(&bolt, &Query::parse("name=nothing")));
        // Deck-level fields do not constrain a single card.
        assert!(card_matches(&bolt, &Query::parse("arch:control")));
    }
}
