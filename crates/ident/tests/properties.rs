//! Property tests: generated identifiers with computed check digits always
//! validate, and any single digit substitution is always rejected.

use holdex_ident::{cusip, isin, sedol, validate, IdentifierKind};
use proptest::prelude::*;

/// Replace the digit at `pos` with a different digit.
fn mutate_digit(token: &str, pos: usize, bump: u32) -> Option<String> {
    let b = token.as_bytes();
    let c = *b.get(pos)?;
    if !c.is_ascii_digit() {
        return None;
    }
    let d = u32::from(c - b'0');
    let m = ((d + bump) % 10) as u8 + b'0';
    let mut out = b.to_vec();
    out[pos] = m;
    Some(String::from_utf8(out).expect("ascii"))
}

proptest! {
    #[test]
    fn generated_isin_validates(payload in "[A-Z]{2}[0-9A-Z]{9}") {
        let check = isin::check_digit(&payload).expect("payload shape");
        let full = format!("{payload}{check}");
        prop_assert!(isin::is_valid(&full));
        prop_assert_eq!(validate(&full).unwrap().kind, IdentifierKind::Isin);
    }

    #[test]
    fn isin_digit_mutation_rejected(
        payload in "[A-Z]{2}[0-9A-Z]{9}",
        pos in 0usize..12,
        bump in 1u32..10,
    ) {
        let check = isin::check_digit(&payload).expect("payload shape");
        let full = format!("{payload}{check}");
        if let Some(mutated) = mutate_digit(&full, pos, bump) {
            prop_assert!(!isin::is_valid(&mutated), "{} accepted", mutated);
        }
    }

    #[test]
    fn generated_cusip_validates(payload in "[0-9A-Z]{8}") {
        let check = cusip::check_digit(&payload).expect("payload shape");
        let full = format!("{payload}{check}");
        prop_assert!(cusip::is_valid(&full));
    }

    #[test]
    fn cusip_digit_mutation_rejected(
        payload in "[0-9A-Z]{8}",
        pos in 0usize..9,
        bump in 1u32..10,
    ) {
        let check = cusip::check_digit(&payload).expect("payload shape");
        let full = format!("{payload}{check}");
        if let Some(mutated) = mutate_digit(&full, pos, bump) {
            prop_assert!(!cusip::is_valid(&mutated), "{} accepted", mutated);
        }
    }

    #[test]
    fn generated_sedol_validates(payload in "[0-9A-Z]{6}") {
        let check = sedol::check_digit(&payload).expect("payload shape");
        let full = format!("{payload}{check}");
        prop_assert!(sedol::is_valid(&full));
    }

    #[test]
    fn sedol_digit_mutation_rejected(
        payload in "[0-9A-Z]{6}",
        pos in 0usize..7,
        bump in 1u32..10,
    ) {
        let check = sedol::check_digit(&payload).expect("payload shape");
        let full = format!("{payload}{check}");
        if let Some(mutated) = mutate_digit(&full, pos, bump) {
            prop_assert!(!sedol::is_valid(&mutated), "{} accepted", mutated);
        }
    }
}
