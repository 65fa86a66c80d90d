//! ISIN validation (ISO 6166).
//!
//! 12 characters: 2-letter country code, 9 alphanumeric NSIN characters,
//! 1 numeric check digit. The check digit is verified with the Luhn
//! algorithm over the base-36 digit expansion of the whole identifier
//! (letters expand to two digits, A=10 … Z=35).

/// Shape check only: length and charset, no checksum.
pub fn matches_shape(token: &str) -> bool {
    let b = token.as_bytes();
    b.len() == 12
        && b[0].is_ascii_uppercase()
        && b[1].is_ascii_uppercase()
        && b[2..11]
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && b[11].is_ascii_digit()
}

/// Full validation: shape plus Luhn checksum over the digit expansion.
pub fn is_valid(token: &str) -> bool {
    if !matches_shape(token) {
        return false;
    }
    luhn_sum(&expand(token)) % 10 == 0
}

/// Compute the check digit for an 11-character payload (country code +
/// NSIN). Returns `None` when the payload shape is wrong.
pub fn check_digit(payload: &str) -> Option<u8> {
    let b = payload.as_bytes();
    if b.len() != 11
        || !b[0].is_ascii_uppercase()
        || !b[1].is_ascii_uppercase()
        || !b[2..]
            .iter()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return None;
    }
    // Append a zero check digit so every payload digit lands on the parity
    // it will have in the full identifier.
    let mut digits = expand(payload);
    digits.push(0);
    let sum = luhn_sum(&digits);
    Some(((10 - sum % 10) % 10) as u8)
}

/// Base-36 expansion: digits map to themselves, letters to two digits.
fn expand(token: &str) -> Vec<u8> {
    let mut digits = Vec::with_capacity(token.len() * 2);
    for c in token.bytes() {
        if c.is_ascii_digit() {
            digits.push(c - b'0');
        } else {
            let v = c - b'A' + 10;
            digits.push(v / 10);
            digits.push(v % 10);
        }
    }
    digits
}

/// Luhn sum: rightmost digit is position 1 and stays as-is, every second
/// digit moving left is doubled, digit sums above 9 fold back by 9.
fn luhn_sum(digits: &[u8]) -> u32 {
    let mut total = 0u32;
    for (i, &d) in digits.iter().rev().enumerate() {
        let mut v = u32::from(d);
        if i % 2 == 1 {
            v *= 2;
            if v > 9 {
                v -= 9;
            }
        }
        total += v;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_valid() {
        for isin in [
            "US0378331005", // Apple
            "US5949181045", // Microsoft
            "GB0002634946", // BAE Systems
            "DE0005557508", // Deutsche Telekom
            "FR0000120271", // TotalEnergies
            "US88160R1014", // Tesla
            "IE00B4BNMY34", // Accenture
            "JP3633400001", // Toyota
            "CH0012032048", // Roche
        ] {
            assert!(is_valid(isin), "{isin} should validate");
        }
    }

    #[test]
    fn check_digit_failures() {
        assert!(!is_valid("US0378331006"));
        assert!(!is_valid("GB0002634947"));
    }

    #[test]
    fn shape_failures() {
        assert!(!matches_shape("US037833100")); // 11 chars
        assert!(!matches_shape("US03783310055")); // 13 chars
        assert!(!matches_shape("U50378331005")); // digit in country code
        assert!(!matches_shape("US037833100A")); // letter check digit
        assert!(!matches_shape("us0378331005")); // lowercase
    }

    #[test]
    fn check_digit_roundtrip() {
        assert_eq!(check_digit("US037833100"), Some(5));
        assert_eq!(check_digit("GB000263494"), Some(6));
        assert_eq!(check_digit("US88160R101"), Some(4));
        assert_eq!(check_digit("short"), None);
    }

    #[test]
    fn every_digit_mutation_rejected() {
        let isin = "US0378331005";
        for (i, c) in isin.bytes().enumerate() {
            if !c.is_ascii_digit() {
                continue;
            }
            for r in b'0'..=b'9' {
                if r == c {
                    continue;
                }
                let mut mutated = isin.as_bytes().to_vec();
                mutated[i] = r;
                let mutated = String::from_utf8(mutated).unwrap();
                assert!(!is_valid(&mutated), "{mutated} must not validate");
            }
        }
    }
}
