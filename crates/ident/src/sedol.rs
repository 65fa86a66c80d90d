//! SEDOL validation.
//!
//! 7 characters: 6 alphanumeric payload characters plus 1 numeric check
//! digit. The checksum is a weighted sum with fixed per-position weights
//! {1, 3, 1, 7, 3, 9}; letters take their alphabet position offset by 9.

const WEIGHTS: [u32; 6] = [1, 3, 1, 7, 3, 9];

/// Shape check only: length and charset, no checksum.
pub fn matches_shape(token: &str) -> bool {
    let b = token.as_bytes();
    b.len() == 7
        && b[..6]
            .iter()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        && b[6].is_ascii_digit()
}

/// Full validation: shape plus weighted mod-10 checksum.
pub fn is_valid(token: &str) -> bool {
    if !matches_shape(token) {
        return false;
    }
    let b = token.as_bytes();
    match check_digit_bytes(&b[..6]) {
        Some(d) => d == b[6] - b'0',
        None => false,
    }
}

/// Compute the check digit for a 6-character payload. Returns `None` when
/// the payload shape is wrong.
pub fn check_digit(payload: &str) -> Option<u8> {
    if payload.len() != 6 {
        return None;
    }
    check_digit_bytes(payload.as_bytes())
}

fn check_digit_bytes(payload: &[u8]) -> Option<u8> {
    let mut sum = 0u32;
    for (i, &c) in payload.iter().enumerate() {
        let v = match c {
            b'0'..=b'9' => u32::from(c - b'0'),
            b'A'..=b'Z' => u32::from(c - b'A') + 10,
            _ => return None,
        };
        sum += v * WEIGHTS[i];
    }
    Some(((10 - sum % 10) % 10) as u8)
}
