//! Market trend synthesizer — a deterministic 5-period display series per
//! role, ending at the role's current annual-openings baseline.
//!
//! This is a display artifact, not a forecast: the curves are fixed shapes
//! keyed off static labor-statistics constants, synthesized so the UI has
//! a plausible history to chart. Treat the numbers accordingly.

use crate::catalog::{GrowthParameters, TrendLabel};

/// Growth rate assumed for roles with no catalog growth entry.
const FALLBACK_GROWTH_RATE: f64 = 0.12;

/// Multipliers applied to the baseline for the four prior periods plus the
/// current one. Falling roles were higher in the past (decelerating
/// decline); stable roles wobble within a few percent.
const FALLING_MULTIPLIERS: [f64; 5] = [1.30, 1.18, 1.08, 1.02, 1.00];
const STABLE_MULTIPLIERS: [f64; 5] = [0.96, 0.99, 1.01, 1.00, 1.00];

/// Synthesizes the 5-period series for a role. Pure and deterministic:
/// the same role name and label always produce the same series, including
/// for roles the catalog has never heard of.
pub fn trend_series(role: &str, label: TrendLabel, growth: Option<GrowthParameters>) -> [i64; 5] {
    let (base, rate) = match growth {
        Some(g) => (g.annual_openings as f64, g.growth_rate),
        None => (fallback_openings(role) as f64, FALLBACK_GROWTH_RATE),
    };

    let mut series = [0i64; 5];
    match label {
        TrendLabel::Rising => {
            // Back-compute prior periods; k = 0 lands exactly on base.
            for (i, slot) in series.iter_mut().enumerate() {
                let k = (4 - i) as i32;
                *slot = (base / (1.0 + rate).powi(k)) as i64;
            }
        }
        TrendLabel::Falling => {
            for (i, slot) in series.iter_mut().enumerate() {
                *slot = (base * FALLING_MULTIPLIERS[i]) as i64;
            }
        }
        TrendLabel::Stable => {
            for (i, slot) in series.iter_mut().enumerate() {
                *slot = (base * STABLE_MULTIPLIERS[i]) as i64;
            }
        }
    }
    series
}

/// Deterministic baseline for unmapped roles: 8000 + (hash mod 15000),
/// using FNV-1a so the value is stable across processes and releases
/// (the std hasher makes no such promise).
pub fn fallback_openings(role: &str) -> i64 {
    8000 + (fnv1a(role.as_bytes()) % 15_000) as i64
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn growth(openings: i64, rate: f64) -> Option<GrowthParameters> {
        Some(GrowthParameters {
            annual_openings: openings,
            total_jobs: openings * 50,
            growth_rate: rate,
        })
    }

    #[test]
    fn test_series_length_and_rising_endpoint() {
        let s = trend_series("Data Scientist", TrendLabel::Rising, growth(22_000, 0.34));
        assert_eq!(s.len(), 5);
        assert_eq!(s[4], 22_000, "rising k=0 term must equal the baseline");
        for w in s.windows(2) {
            assert!(w[0] < w[1], "rising series must be increasing: {s:?}");
        }
    }

    #[test]
    fn test_falling_matches_multiplier_table_exactly() {
        let s = trend_series("Blockchain Developer", TrendLabel::Falling, growth(10_000, 0.1));
        assert_eq!(s, [13_000, 11_800, 10_800, 10_200, 10_000]);
        for w in s.windows(2) {
            assert!(w[0] >= w[1], "falling series must be non-increasing");
        }
    }

    #[test]
    fn test_stable_matches_multiplier_table_exactly() {
        let s = trend_series("Data Analyst", TrendLabel::Stable, growth(10_000, 0.23));
        assert_eq!(s, [9_600, 9_900, 10_100, 10_000, 10_000]);
    }

    #[test]
    fn test_unmapped_role_is_deterministic() {
        let a = trend_series("Quantum Plumber", TrendLabel::Stable, None);
        let b = trend_series("Quantum Plumber", TrendLabel::Stable, None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fallback_openings_in_documented_range() {
        for role in ["Quantum Plumber", "Llama Wrangler", "X"] {
            let base = fallback_openings(role);
            assert!((8_000..23_000).contains(&base), "{role}: {base}");
        }
    }

    #[test]
    fn test_distinct_roles_get_distinct_baselines() {
        assert_ne!(
            fallback_openings("Quantum Plumber"),
            fallback_openings("Llama Wrangler")
        );
    }

    #[test]
    fn test_values_are_truncated_not_rounded() {
        // 9999 * 0.96 = 9599.04 → 9599.
        let s = trend_series("r", TrendLabel::Stable, growth(9_999, 0.1));
        assert_eq!(s[0], 9_599);
    }
}
