//! Numeric checks and schematic parameter parsing.

use crate::LfError;

/// Floating point type of every electrical quantity in the network tables.
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, LfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LfError::NonFinite { what, value: v })
    }
}

/// Parse a schematic parameter value such as `"15.0 [kV]"` or `"1 000 [MVA]"`.
///
/// Everything from the first `[` onward is the unit annotation and is dropped,
/// as is every space in the remaining text.
pub fn parse_quantity(raw: &str) -> Result<Real, LfError> {
    let magnitude: String = raw
        .split('[')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    magnitude
        .parse::<Real>()
        .map_err(|_| LfError::InvalidQuantity {
            raw: raw.to_string(),
        })
}

/// Concatenated decimal digits of `text`, parsed as an index (`"Bus12"` -> 12).
pub fn digits_index(text: &str) -> Option<usize> {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}
