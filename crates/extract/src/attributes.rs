//! Attribute parsing.
//!
//! Normalizes the text around a mention into typed fields: name, quantity,
//! price, value, currency. Table rows with headers use the header synonyms
//! as the authority for numeric fields; free text and header-less rows use
//! label hints plus left-to-right positional heuristics. Every field may
//! independently come back absent; parsing itself never fails.

use regex::Regex;

use crate::model::{Field, Mention, MentionContext, ParsedAttributes};

/// ISO 4217 codes recognized in statements. Symbols normalize to codes.
const CURRENCY_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "CHF", "CAD", "AUD", "NZD", "SEK", "NOK", "DKK", "ILS", "HKD",
    "SGD", "CNY", "INR", "MXN", "BRL", "ZAR", "PLN", "CZK", "HUF", "TRY", "KRW", "TWD", "THB",
    "AED", "SAR", "GBX",
];

/// Words that can never be part of a security name.
const NAME_STOPWORDS: &[&str] = &[
    "ISIN", "CUSIP", "SEDOL", "QTY", "QUANTITY", "PRICE", "VALUE", "CURRENCY", "CCY", "TOTAL",
    "TOTALS", "SUBTOTAL", "AMOUNT", "UNITS", "SHARES", "NOMINAL", "BALANCE", "MARKET", "MKT",
    "RATE", "QUOTE", "NAV", "POSITION", "POSITIONS", "HOLDING", "HOLDINGS", "SECURITY",
    "SECURITIES", "DESCRIPTION", "PORTFOLIO", "STATEMENT", "ACCOUNT",
];

fn symbol_code(c: char) -> Option<&'static str> {
    match c {
        '$' => Some("USD"),
        '€' => Some("EUR"),
        '£' => Some("GBP"),
        '¥' => Some("JPY"),
        '₪' => Some("ILS"),
        _ => None,
    }
}

fn lookup_code(word: &str) -> Option<&'static str> {
    CURRENCY_CODES.iter().find(|code| **code == word).copied()
}

/// Parse one mention's context into typed attributes.
pub fn parse(mention: &Mention) -> ParsedAttributes {
    match &mention.context {
        MentionContext::FreeText {
            window,
            token_start,
        } => parse_window(window, *token_start, token_start + mention.raw_token.len()),
        MentionContext::TableRow {
            headers,
            cells,
            ident_col,
        } => match headers {
            Some(headers) => parse_with_headers(headers, cells, *ident_col),
            None => {
                let joined = joined_row(cells, *ident_col);
                parse_window(&joined, 0, 0)
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Header-aware path
// ---------------------------------------------------------------------------

/// Map a header to the field its column carries, via the synonym sets.
fn header_field(header: &str) -> Option<Field> {
    let normalized = header
        .trim()
        .trim_end_matches([':', '.'])
        .to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match normalized.as_str() {
        "name" | "security" | "security name" | "security description" | "description"
        | "instrument" | "holding" => Some(Field::Name),
        "quantity" | "qty" | "shares" | "units" | "nominal" | "position" | "no. of shares" => {
            Some(Field::Quantity)
        }
        "price" | "unit price" | "market price" | "price per unit" | "rate" | "quote" | "px"
        | "nav" => Some(Field::Price),
        "value" | "market value" | "amount" | "total" | "total value" | "balance"
        | "market val" => Some(Field::Value),
        "currency" | "ccy" | "cur" | "crncy" => Some(Field::Currency),
        _ => None,
    }
}

fn parse_with_headers(headers: &[String], cells: &[String], ident_col: usize) -> ParsedAttributes {
    let mut attrs = ParsedAttributes::default();
    for (i, header) in headers.iter().enumerate() {
        if i == ident_col {
            continue;
        }
        // rows shorter than the header row: missing cells stay absent
        let Some(cell) = cells.get(i) else { continue };
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        match header_field(header) {
            Some(Field::Name) => {
                if attrs.name.is_none() {
                    attrs.name = Some(cell.to_string());
                }
            }
            Some(Field::Quantity) => {
                if attrs.quantity.is_none() {
                    attrs.quantity = first_number(cell);
                }
            }
            Some(Field::Price) => {
                if attrs.price.is_none() {
                    attrs.price = first_number(cell);
                }
            }
            Some(Field::Value) => {
                if attrs.value.is_none() {
                    attrs.value = first_number(cell);
                }
            }
            Some(Field::Currency) => {
                if attrs.currency.is_none() {
                    attrs.currency = currency_in(cell);
                }
            }
            None => {}
        }
    }
    // unmapped material can still carry a name or an embedded currency
    if attrs.name.is_none() || attrs.currency.is_none() {
        let joined = joined_row(cells, ident_col);
        if attrs.name.is_none() {
            attrs.name = extract_name(&joined, 0, 0);
        }
        if attrs.currency.is_none() {
            attrs.currency = currency_in(&joined);
        }
    }
    attrs
}

fn joined_row(cells: &[String], ident_col: usize) -> String {
    cells
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != ident_col)
        .map(|(_, cell)| cell.trim())
        .collect::<Vec<_>>()
        .join(" | ")
}

// ---------------------------------------------------------------------------
// Free-text path
// ---------------------------------------------------------------------------

fn parse_window(window: &str, token_start: usize, token_end: usize) -> ParsedAttributes {
    let mut attrs = ParsedAttributes::default();
    attrs.name = extract_name(window, token_start, token_end);
    attrs.currency = currency_in(window);

    let mut tokens = numeric_tokens(window);

    // label-hinted tokens claim their field first
    for token in &mut tokens {
        match token.label {
            Some(Field::Quantity) if attrs.quantity.is_none() => {
                attrs.quantity = Some(token.value);
                token.used = true;
            }
            Some(Field::Price) if attrs.price.is_none() => {
                attrs.price = Some(token.value);
                token.used = true;
            }
            Some(Field::Value) if attrs.value.is_none() => {
                attrs.value = Some(token.value);
                token.used = true;
            }
            _ => {}
        }
    }

    // positional fallback: quantity is an integer-like count appearing
    // before the first value-like token (label-claimed ones anchor too)
    let first_value_like = tokens
        .iter()
        .filter(|t| t.value_like())
        .map(|t| t.pos)
        .min();
    if attrs.quantity.is_none() {
        if let Some(boundary) = first_value_like {
            if let Some(token) = tokens
                .iter_mut()
                .find(|t| !t.used && t.integer_like() && t.pos < boundary)
            {
                attrs.quantity = Some(token.value);
                token.used = true;
            }
        }
    }

    // remaining value-like tokens fill price then value, left to right
    let remaining: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.used && t.value_like())
        .map(|(i, _)| i)
        .collect();
    match (attrs.price.is_none(), attrs.value.is_none()) {
        (true, true) => {
            if remaining.len() == 1 {
                // a lone figure: price when quantity is known and nothing
                // marks it as money, otherwise a market value
                let token = &tokens[remaining[0]];
                if attrs.quantity.is_some() && !token.has_currency {
                    attrs.price = Some(token.value);
                } else {
                    attrs.value = Some(token.value);
                }
            } else if remaining.len() >= 2 {
                attrs.price = Some(tokens[remaining[0]].value);
                attrs.value = Some(tokens[remaining[1]].value);
            }
        }
        (true, false) => {
            if let Some(&i) = remaining.first() {
                attrs.price = Some(tokens[i].value);
            }
        }
        (false, true) => {
            if let Some(&i) = remaining.first() {
                attrs.value = Some(tokens[i].value);
            }
        }
        (false, false) => {}
    }

    attrs
}

// ---------------------------------------------------------------------------
// Numeric lexing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct NumToken {
    value: f64,
    pos: usize,
    has_decimal: bool,
    has_currency: bool,
    label: Option<Field>,
    used: bool,
}

impl NumToken {
    fn value_like(&self) -> bool {
        self.has_decimal || self.has_currency
    }

    fn integer_like(&self) -> bool {
        !self.has_decimal && !self.has_currency
    }
}

/// Lex numeric tokens: optional sign and currency symbol, US-style
/// thousands separators, optional decimal part. Tokens embedded in words
/// or number tails, and percent-suffixed tokens, are skipped.
fn numeric_tokens(window: &str) -> Vec<NumToken> {
    let re = Regex::new(r"-?[$€£¥₪]?\d+(?:,\d{3})*(?:\.\d+)?").unwrap();
    let mut out = Vec::new();
    for m in re.find_iter(window) {
        let before = window[..m.start()].chars().next_back();
        if before.is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == ',') {
            continue;
        }
        let after = window[m.end()..].chars().next();
        if after.is_some_and(|c| c.is_ascii_alphanumeric()) {
            continue;
        }
        if after == Some('%') {
            continue;
        }

        let raw = m.as_str();
        let negative = raw.starts_with('-');
        let body = raw.trim_start_matches('-');
        let symbol = body.chars().next().and_then(symbol_code);
        let digits: String = body
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let Ok(parsed) = digits.parse::<f64>() else {
            continue;
        };
        let value = if negative { -parsed } else { parsed };

        out.push(NumToken {
            value,
            pos: m.start(),
            has_decimal: digits.contains('.'),
            has_currency: symbol.is_some() || adjacent_code(window, m.start(), m.end()).is_some(),
            label: label_before(window, m.start()),
            used: false,
        });
    }
    out
}

/// Take the first numeric token of a cell, boundary rules included.
fn first_number(cell: &str) -> Option<f64> {
    numeric_tokens(cell).first().map(|t| t.value)
}

/// An ISO code immediately next to the token, e.g. `19,050.00 USD` or
/// `USD 19,050.00`.
fn adjacent_code(window: &str, start: usize, end: usize) -> Option<&'static str> {
    let after = window[end..].trim_start_matches(' ');
    let word: String = after
        .chars()
        .take_while(|c| c.is_ascii_uppercase())
        .collect();
    if let Some(code) = lookup_code(&word) {
        return Some(code);
    }
    let before = window[..start].trim_end_matches(' ');
    let word: String = before
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_uppercase())
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    lookup_code(&word)
}

/// A field hint from the word immediately before a numeric token, e.g.
/// `Qty 100`, `Value: 19,050.00`, `100 @ 190.50`.
fn label_before(window: &str, start: usize) -> Option<Field> {
    let before = window[..start].trim_end_matches(|c: char| c.is_whitespace());
    let word_start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = before[word_start..]
        .trim_matches([':', '.', ',', '(', ')', '|'])
        .to_ascii_lowercase();
    match word.as_str() {
        "qty" | "quantity" | "shares" | "units" | "nominal" | "position" | "holding" => {
            Some(Field::Quantity)
        }
        "price" | "px" | "rate" | "quote" | "nav" | "@" => Some(Field::Price),
        "value" | "total" | "amount" | "balance" => Some(Field::Value),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// First ISO code token wins; otherwise the first known symbol, mapped to
/// its code.
fn currency_in(window: &str) -> Option<String> {
    let word_re = Regex::new(r"\S+").unwrap();
    for m in word_re.find_iter(window) {
        let cleaned = m
            .as_str()
            .trim_matches([',', ';', ':', '.', '(', ')', '|']);
        if let Some(code) = lookup_code(cleaned) {
            return Some(code.to_string());
        }
    }
    window
        .chars()
        .find_map(symbol_code)
        .map(|code| code.to_string())
}

// ---------------------------------------------------------------------------
// Name extraction
// ---------------------------------------------------------------------------

/// Longest run of capitalized words adjacent to the token; ties go to the
/// run closest to the token, then leftmost. `None` when nothing plausible
/// remains after the stopword/number/currency exclusions.
fn extract_name(window: &str, token_start: usize, token_end: usize) -> Option<String> {
    let word_re = Regex::new(r"\S+").unwrap();
    let words: Vec<(usize, usize, String)> = word_re
        .find_iter(window)
        .map(|m| {
            let cleaned = m
                .as_str()
                .trim_start_matches('(')
                .trim_end_matches([',', ';', ':', ')', '|'])
                .to_string();
            (m.start(), m.end(), cleaned)
        })
        .collect();
    let qualifies: Vec<bool> = words.iter().map(|(_, _, w)| name_word(w)).collect();

    let mut best: Option<(usize, usize, usize, String)> = None;
    let mut i = 0;
    while i < words.len() {
        if !qualifies[i] {
            i += 1;
            continue;
        }
        let mut j = i;
        while j + 1 < words.len() && qualifies[j + 1] {
            j += 1;
        }
        let run_start = words[i].0;
        let run_end = words[j].1;
        let count = j - i + 1;
        let distance = if run_end <= token_start {
            token_start - run_end
        } else if run_start >= token_end {
            run_start - token_end
        } else {
            0
        };
        let text = words[i..=j]
            .iter()
            .map(|(_, _, w)| w.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let better = match &best {
            None => true,
            Some((best_count, best_distance, best_start, _)) => {
                count > *best_count
                    || (count == *best_count
                        && (distance < *best_distance
                            || (distance == *best_distance && run_start < *best_start)))
            }
        };
        if better {
            best = Some((count, distance, run_start, text));
        }
        i = j + 1;
    }
    best.map(|(_, _, _, text)| text)
}

fn name_word(word: &str) -> bool {
    let Some(first) = word.chars().next() else {
        return false;
    };
    if !first.is_ascii_uppercase() {
        return false;
    }
    // numbers, prices and identifier tokens all carry digits
    if word.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }
    let upper = word.trim_end_matches('.').to_ascii_uppercase();
    if NAME_STOPWORDS.contains(&upper.as_str()) {
        return false;
    }
    if lookup_code(&upper).is_some() {
        return false;
    }
    true
}
