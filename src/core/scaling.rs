//! Level-dependent magnitude scaling.
//!
//! Repeat runs of the same adventure should give diminishing relative return,
//! so enemy health, enemy weapon damage and reward bounds are inflated by the
//! player's level whenever an adventure template is resolved for a specific
//! player. Scaled values are never persisted; they are recomputed each time.

/// Fraction of the base amount added per player level.
pub const SCALING_PERCENT: f64 = 0.025;

/// Scales `amount` for a player of `level`.
///
/// `scale(x, 0) == x`, and the result is non-decreasing in `level` for any
/// positive `amount`.
#[must_use]
pub fn scale(amount: f64, level: u32) -> f64 {
    amount + SCALING_PERCENT * f64::from(level) * amount
}

/// Scales an integer amount, flooring the result.
///
/// Flooring keeps the mapping deterministic and errs in the player's favor
/// for enemy stats at low levels.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // catalog magnitudes are far below 2^52
pub fn scale_int(amount: i64, level: u32) -> i64 {
    #[allow(clippy::cast_precision_loss)]
    let scaled = scale(amount as f64, level);
    scaled.floor() as i64
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn level_zero_is_identity() {
        assert_eq!(scale(25.0, 0), 25.0);
        assert_eq!(scale_int(25, 0), 25);
        assert_eq!(scale_int(0, 0), 0);
    }

    #[test]
    fn monotone_in_level() {
        let amount = 40.0;
        let mut previous = scale(amount, 0);
        for level in 1..=200 {
            let current = scale(amount, level);
            assert!(
                current >= previous,
                "scale({amount}, {level}) = {current} < {previous}"
            );
            previous = current;
        }
    }

    #[test]
    fn known_values() {
        // 25 + 0.025 * 4 * 25 = 27.5, floored to 27
        assert_eq!(scale(25.0, 4), 27.5);
        assert_eq!(scale_int(25, 4), 27);
        // 10 + 0.025 * 10 * 10 = 12.5
        assert_eq!(scale_int(10, 10), 12);
    }

    #[test]
    fn integer_scaling_floors() {
        // 7 * 1.025 = 7.175
        assert_eq!(scale_int(7, 1), 7);
    }
}
