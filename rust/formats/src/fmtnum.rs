// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic numeric formatting shared by all writers.
//!
//! Generated files are regression-diffed byte for byte against reference
//! outputs, so every writer funnels numbers through these helpers instead
//! of formatting ad hoc. Negative zero is normalized: `-0.00` would differ
//! between otherwise identical surveys depending on the sign of rounding
//! noise.

/// Formats with a fixed number of decimals, normalizing negative zero.
pub fn fixed(value: f64, decimals: usize) -> String {
    let text = format!("{value:.decimals$}");
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Two-decimal form used for lengths and angles in most formats.
pub fn fixed2(value: f64) -> String {
    fixed(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_decimals() {
        assert_eq!(fixed(1.2345, 2), "1.23");
        assert_eq!(fixed(10.0, 2), "10.00");
        assert_eq!(fixed(-3.456, 1), "-3.5");
    }

    #[test]
    fn negative_zero_is_normalized() {
        assert_eq!(fixed(-0.0001, 2), "0.00");
        assert_eq!(fixed(-0.0, 2), "0.00");
        assert_eq!(fixed2(-0.004), "0.00");
    }
}
