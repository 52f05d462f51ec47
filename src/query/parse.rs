//! Tokenizer and AST for filter query strings.

use serde::Serialize;

use super::QueryError;

/// Fields a structured term may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    // Deck level
    Arch,
    Player,
    DeckColor,
    DraftSize,
    MinCards,
    // Card level
    Color,
    Type,
    Name,
    Cmc,
    Power,
    Oracle,
    // Card-stat fields that are recognised but only meaningful to clients
    Games,
    Mainboard,
    Sideboard,
    Players,
    Drafts,
    WinPct,
}

const FIELDS: &[(&str, Field)] = &[
    ("arch", Field::Arch),
    ("player", Field::Player),
    ("players", Field::Players),
    ("dcolor", Field::DeckColor),
    ("draftSize", Field::DraftSize),
    ("drafts", Field::Drafts),
    ("minCards", Field::MinCards),
    ("color", Field::Color),
    ("t", Field::Type),
    ("name", Field::Name),
    ("cmc", Field::Cmc),
    ("pow", Field::Power),
    ("o", Field::Oracle),
    ("games", Field::Games),
    ("mb", Field::Mainboard),
    ("sb", Field::Sideboard),
    ("winpct", Field::WinPct),
];

impl Field {
    pub fn keyword(self) -> &'static str {
        FIELDS
            .iter()
            .find(|(_, f)| *f == self)
            .map(|(k, _)| *k)
            .unwrap_or("")
    }

    /// Deck-level fields are checked against the deck itself rather than its cards.
    pub fn is_deck_level(self) -> bool {
        matches!(
            self,
            Field::Arch | Field::Player | Field::DeckColor | Field::DraftSize | Field::MinCards
        )
    }

    /// Whether the evaluator gives this field/operator pair a meaning.
    pub fn supports(self, op: Operator) -> bool {
        use Operator::*;
        match self {
            Field::Arch => matches!(op, Contains | NotEqual),
            Field::Player | Field::Type | Field::Name | Field::Oracle => op == Contains,
            Field::DeckColor | Field::Color => matches!(op, Contains | Equal | NotEqual),
            Field::DraftSize | Field::Cmc | Field::Power => matches!(op, Less | Greater | Equal),
            Field::MinCards
            | Field::Games
            | Field::Mainboard
            | Field::Sideboard
            | Field::Players
            | Field::Drafts
            | Field::WinPct => false,
        }
    }
}

/// Comparison operator between a field and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    /// `:`
    Contains,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
}

impl Operator {
    /// Split a leading operator off `rest`.
    fn split(rest: &str) -> Option<(Operator, &str)> {
        if let Some(v) = rest.strip_prefix("!=") {
            return Some((Operator::NotEqual, v));
        }
        let op = match rest.chars().next()? {
            ':' => Operator::Contains,
            '=' => Operator::Equal,
            '<' => Operator::Less,
            '>' => Operator::Greater,
            _ => return None,
        };
        Some((op, &rest[1..]))
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Contains => ":",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::Greater => ">",
        }
    }
}

/// One whitespace-separated piece of a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Term {
    /// `field op value`, with surrounding quotes removed from the value
    Field {
        field: Field,
        op: Operator,
        value: String,
    },
    /// Bare text, matched against card names and oracle text
    Text(String),
}

impl Term {
    fn parse(token: &str) -> Term {
        for (keyword, field) in FIELDS {
            if let Some(rest) = token.strip_prefix(keyword) {
                if let Some((op, value)) = Operator::split(rest) {
                    return Term::Field {
                        field: *field,
                        op,
                        value: strip_quotes(value).to_string(),
                    };
                }
            }
        }
        Term::Text(strip_quotes(token).to_string())
    }

    fn is_supported(&self) -> bool {
        match self {
            Term::Field { field, op, .. } => field.supports(*op),
            Term::Text(_) => true,
        }
    }

    fn describe(&self) -> String {
        match self {
            Term::Field { field, op, value } => {
                format!("{}{}{}", field.keyword(), op.symbol(), value)
            }
            Term::Text(text) => text.clone(),
        }
    }
}

/// A parsed query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Query {
    /// Matches everything
    Empty,
    /// Free text, lowercased
    Fuzzy(String),
    /// At least one token named a field
    Terms(Vec<Term>),
}

impl Query {
    /// Parse a query string. Never fails; unsupported terms pass through.
    pub fn parse(input: &str) -> Query {
        if input.trim().is_empty() {
            return Query::Empty;
        }
        let terms: Vec<Term> = tokenize(input).iter().map(|t| Term::parse(t)).collect();
        if terms.iter().any(|t| matches!(t, Term::Field { .. })) {
            Query::Terms(terms)
        } else {
            Query::Fuzzy(input.to_lowercase())
        }
    }

    /// Parse a query string, rejecting terms the evaluator would ignore.
    pub fn parse_strict(input: &str) -> Result<Query, QueryError> {
        let query = Self::parse(input);
        if let Some(term) = query.unsupported_terms().first() {
            return Err(QueryError::UnsupportedTerm(term.describe()));
        }
        Ok(query)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Query::Empty)
    }

    /// Structured terms that evaluate as always-true.
    pub fn unsupported_terms(&self) -> Vec<&Term> {
        match self {
            Query::Terms(terms) => terms.iter().filter(|t| !t.is_supported()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Split on whitespace outside double quotes. Quotes stay in the tokens.
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            current.push(ch);
        } else if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn strip_quotes(s: &str) -> &str {
    s.trim_matches('"')
}
