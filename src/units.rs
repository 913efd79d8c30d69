//! IEC binary unit normalization.
//!
//! Picks the smallest unit (bytes, KiB, ... YiB) in which the magnitude has an
//! integer part below 1024. Exact powers of 1024 roll over to the next unit.

use std::fmt;

use serde::Serialize;

const UNITS: [&str; 9] = ["bytes", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// A byte count paired with its display magnitude and unit.
///
/// `magnitude` is always non-negative; the sign lives in `bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitSize {
    pub bytes: i128,
    pub magnitude: f64,
    pub unit: &'static str,
}

impl UnitSize {
    pub fn is_negative(&self) -> bool {
        self.bytes < 0
    }
}

pub fn normalize(bytes: impl Into<i128>) -> UnitSize {
    let bytes = bytes.into();
    let abs = bytes.unsigned_abs() as f64;

    // exponent steps of 10 bits: 2^0, 2^10, ... 2^80
    let scaled = |step: usize| abs / 2f64.powi(10 * step as i32);
    let step = (0..UNITS.len())
        .find(|&step| scaled(step).floor() < 1024.0)
        .unwrap_or(UNITS.len() - 1);

    UnitSize {
        bytes,
        magnitude: scaled(step),
        unit: UNITS[step],
    }
}

impl fmt::Display for UnitSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{:.2} {}", self.magnitude, self.unit)
        } else {
            write!(f, "{:.2} {}", self.magnitude, self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_stay_in_bytes() {
        let size = normalize(0u64);
        assert_eq!(size.unit, "bytes");
        assert_eq!(size.magnitude, 0.0);

        let size = normalize(1023u64);
        assert_eq!(size.unit, "bytes");
        assert_eq!(size.magnitude, 1023.0);
    }

    #[test]
    fn exact_power_rolls_to_next_unit() {
        let size = normalize(1024u64);
        assert_eq!(size.unit, "KiB");
        assert_eq!(size.magnitude, 1.0);

        let size = normalize(1u64 << 30);
        assert_eq!(size.unit, "GiB");
        assert_eq!(size.magnitude, 1.0);
    }

    #[test]
    fn fractional_magnitude() {
        let size = normalize(1536u64);
        assert_eq!(size.unit, "KiB");
        assert_eq!(size.magnitude, 1.5);
    }

    #[test]
    fn yobibyte_is_top_unit() {
        let size = normalize(1i128 << 80);
        assert_eq!(size.unit, "YiB");
        assert_eq!(size.magnitude, 1.0);

        // no tier above YiB, magnitude may exceed 1024
        let size = normalize(1i128 << 95);
        assert_eq!(size.unit, "YiB");
        assert_eq!(size.magnitude, 32768.0);
    }

    #[test]
    fn magnitude_below_1024_below_top_unit() {
        let mut value: i128 = 1;
        while value < (1i128 << 80) {
            let size = normalize(value);
            assert!(size.magnitude < 1024.0, "{value} -> {size:?}");
            value = value * 3 + 7;
        }
    }

    #[test]
    fn negative_keeps_sign_in_bytes_only() {
        let size = normalize(-2048i64);
        assert_eq!(size.bytes, -2048);
        assert_eq!(size.magnitude, 2.0);
        assert_eq!(size.unit, "KiB");
        assert!(size.is_negative());
        assert_eq!(size.to_string(), "-2.00 KiB");
    }

    #[test]
    fn display_two_decimals() {
        assert_eq!(normalize(512u64).to_string(), "512.00 bytes");
        assert_eq!(normalize(1_572_864u64).to_string(), "1.50 MiB");
    }
}
