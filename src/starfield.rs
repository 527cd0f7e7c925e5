//! Background star layout
//!
//! Stars come from a seeded trigonometric formula rather than an RNG, so the
//! same count and seed always produce the same sky. The values are not
//! uniformly distributed; don't reuse this where statistics matter.

use crate::consts::MAX_STAR_DELAY;

/// A decorative star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Horizontal position, percent of field width in [0, 100)
    pub x_pct: f64,
    /// Vertical position, percent of field height in [0, 100)
    pub y_pct: f64,
    /// Twinkle animation delay in seconds, [0, MAX_STAR_DELAY)
    pub delay: f64,
}

/// Pseudo-random value in [0, 1) from a seed
#[inline]
pub fn seeded_random(seed: u64) -> f64 {
    let x = (seed as f64).sin() * 10000.0;
    let frac = x - x.floor();
    // Tiny negative x rounds up to exactly 1.0
    if frac >= 1.0 { 0.0 } else { frac }
}

/// Scale a unit value into [0, range), wrapping the rounding edge back to 0
#[inline]
fn scale(unit: f64, range: f64) -> f64 {
    let v = unit * range;
    if v >= range { 0.0 } else { v }
}

/// Generate `count` stars starting from `seed_base`
pub fn generate(count: usize, seed_base: u32) -> Vec<Star> {
    (0..count as u64)
        .map(|i| {
            let seed = seed_base as u64 + i * 3;
            Star {
                x_pct: scale(seeded_random(seed), 100.0),
                y_pct: scale(seeded_random(seed + 1), 100.0),
                delay: scale(seeded_random(seed + 2), MAX_STAR_DELAY),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_field() {
        assert!(generate(0, 0).is_empty());
    }

    #[test]
    fn test_first_star_from_seed_zero() {
        // sin(0) = 0, so the first coordinate sits on the left edge
        let stars = generate(1, 0);
        assert_eq!(stars[0].x_pct, 0.0);
        assert!(stars[0].y_pct > 0.0);
    }

    #[test]
    fn test_seed_base_shifts_the_sky() {
        let a = generate(10, 0);
        let b = generate(10, 7);
        assert_ne!(a, b);
    }

    #[test]
    fn test_prefix_stable() {
        // Growing the count keeps earlier stars where they were
        let small = generate(5, 42);
        let large = generate(50, 42);
        assert_eq!(&large[..5], &small[..]);
    }

    proptest! {
        #[test]
        fn prop_count_and_bounds(count in 0usize..400, seed in any::<u32>()) {
            let stars = generate(count, seed);
            prop_assert_eq!(stars.len(), count);
            for star in &stars {
                prop_assert!((0.0..100.0).contains(&star.x_pct));
                prop_assert!((0.0..100.0).contains(&star.y_pct));
                prop_assert!((0.0..MAX_STAR_DELAY).contains(&star.delay));
            }
        }

        #[test]
        fn prop_deterministic(count in 0usize..200, seed in any::<u32>()) {
            prop_assert_eq!(generate(count, seed), generate(count, seed));
        }
    }
}
