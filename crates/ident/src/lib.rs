//! `holdex-ident` — security identifier validation.
//!
//! Pure functions that recognize and checksum-validate ISIN, CUSIP and
//! SEDOL tokens. No IO, no global state, no panics; a token that matches
//! no scheme or fails its checksum simply yields `None`.

pub mod cusip;
pub mod isin;
pub mod sedol;

use serde::Serialize;

/// Identifier scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Isin,
    Cusip,
    Sedol,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Isin => write!(f, "ISIN"),
            Self::Cusip => write!(f, "CUSIP"),
            Self::Sedol => write!(f, "SEDOL"),
        }
    }
}

/// A checksum-validated identifier in canonical form: uppercase, no
/// separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub kind: IdentifierKind,
    pub value: String,
}

/// Uppercase a token and strip the separators commonly found in statement
/// text (spaces and hyphens).
pub fn canonicalize(token: &str) -> String {
    token
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Validate a candidate token against all schemes.
///
/// Schemes are tried in fixed priority order ISIN → CUSIP → SEDOL and the
/// first checksum pass wins. Tokens that match a scheme's shape but fail
/// its checksum are rejected, never corrected.
pub fn validate(token: &str) -> Option<Identifier> {
    let canon = canonicalize(token);
    if isin::is_valid(&canon) {
        return Some(Identifier {
            kind: IdentifierKind::Isin,
            value: canon,
        });
    }
    if cusip::is_valid(&canon) {
        return Some(Identifier {
            kind: IdentifierKind::Cusip,
            value: canon,
        });
    }
    if sedol::is_valid(&canon) {
        return Some(Identifier {
            kind: IdentifierKind::Sedol,
            value: canon,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_assigns_kind() {
        assert_eq!(
            validate("US0378331005").unwrap().kind,
            IdentifierKind::Isin
        );
        assert_eq!(validate("037833100").unwrap().kind, IdentifierKind::Cusip);
        assert_eq!(validate("B0YBKJ7").unwrap().kind, IdentifierKind::Sedol);
    }

    #[test]
    fn validate_canonicalizes() {
        let id = validate("us03-7833 1005").unwrap();
        assert_eq!(id.kind, IdentifierKind::Isin);
        assert_eq!(id.value, "US0378331005");
    }

    #[test]
    fn checksum_failure_rejected() {
        assert!(validate("US0378331006").is_none());
        assert!(validate("037833101").is_none());
        assert!(validate("B0YBKJ8").is_none());
    }

    #[test]
    fn shape_mismatch_rejected() {
        assert!(validate("").is_none());
        assert!(validate("US03783310").is_none()); // too short
        assert!(validate("0S0378331005").is_none()); // digit in country code
        assert!(validate("US037833100X").is_none()); // letter check digit
    }

    #[test]
    fn kind_display() {
        assert_eq!(IdentifierKind::Isin.to_string(), "ISIN");
        assert_eq!(IdentifierKind::Cusip.to_string(), "CUSIP");
        assert_eq!(IdentifierKind::Sedol.to_string(), "SEDOL");
    }
}
