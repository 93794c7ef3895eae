//vesta-common/src/fixed.rs
//! Deterministic scaled-integer arithmetic
//!
//! Every consensus-relevant score in Vesta is a `ScoreRaw`: an integer scaled
//! by [`SCORE_SCALE`]. All intermediate math widens to `u128`, so two nodes
//! computing the same expression always land on the same bits. Floating point
//! never touches the importance pipeline.

/// Raw fixed-point score value; `SCORE_SCALE` represents 1.0
pub type ScoreRaw = u64;

/// Scale factor: one full unit of score
pub const SCORE_SCALE: ScoreRaw = 1_000_000_000_000;

/// Computes `a * b / c` with a widened intermediate, truncating toward zero.
///
/// # Panics
///
/// Panics if `c` is zero or the result overflows `u64`. Callers in the
/// importance pipeline always divide by a non-zero total they just computed.
pub fn mul_div(a: u64, b: u64, c: u64) -> u64 {
    debug_assert!(c != 0, "mul_div by zero");
    (a as u128 * b as u128 / c as u128) as u64
}

/// Converts a ratio to a scaled score: `numerator / denominator * SCORE_SCALE`
pub fn from_ratio(numerator: u64, denominator: u64) -> ScoreRaw {
    mul_div(numerator, SCORE_SCALE, denominator)
}

/// Applies a scaled multiplier: `value * factor / SCORE_SCALE`
pub fn scale(value: ScoreRaw, factor: ScoreRaw) -> ScoreRaw {
    mul_div(value, factor, SCORE_SCALE)
}

/// L1 distance between two score vectors of equal length
pub fn l1_distance(a: &[ScoreRaw], b: &[ScoreRaw]) -> ScoreRaw {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x.abs_diff(y) as u128)
        .sum::<u128>() as ScoreRaw
}

/// Rescales a vector in place so its sum equals `SCORE_SCALE`.
///
/// Truncation can leave the post-normalization sum short by up to one raw
/// unit per element; callers treat that as the fixed tolerance. A zero
/// vector is left untouched.
pub fn normalize(values: &mut [ScoreRaw]) {
    let sum: u128 = values.iter().map(|&v| v as u128).sum();
    if sum == 0 {
        return;
    }
    for v in values.iter_mut() {
        *v = (*v as u128 * SCORE_SCALE as u128 / sum) as ScoreRaw;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_widens_intermediate() {
        // would overflow u64 without the u128 intermediate
        assert_eq!(mul_div(u64::MAX / 2, 4, 2), u64::MAX - 1);
    }

    #[test]
    fn test_from_ratio() {
        assert_eq!(from_ratio(1, 4), SCORE_SCALE / 4);
        assert_eq!(from_ratio(800, 1000), SCORE_SCALE * 8 / 10);
    }

    #[test]
    fn test_normalize_sums_to_scale_within_tolerance() {
        let mut v = vec![3, 7, 11, 23];
        normalize(&mut v);
        let sum: u64 = v.iter().sum();
        assert!(SCORE_SCALE - sum <= v.len() as u64);
    }

    #[test]
    fn test_normalize_zero_vector_is_noop() {
        let mut v = vec![0u64; 5];
        normalize(&mut v);
        assert!(v.iter().all(|&x| x == 0));
    }

    #[test]
    fn test_normalize_tolerance_holds_for_random_vectors() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let len = rng.gen_range(1..64usize);
            let mut v: Vec<ScoreRaw> = (0..len).map(|_| rng.gen_range(1..SCORE_SCALE)).collect();
            normalize(&mut v);
            let sum: u64 = v.iter().sum();
            assert!(SCORE_SCALE - sum <= len as u64);
        }
    }

    #[test]
    fn test_l1_distance_symmetry() {
        let a = vec![10, 20, 30];
        let b = vec![5, 25, 30];
        assert_eq!(l1_distance(&a, &b), 10);
        assert_eq!(l1_distance(&b, &a), 10);
    }
}
