use super::SquareRootEngine;

/// Floor square root by non-restoring binary digit recurrence.
///
/// Consumes the input two bits at a time, most significant pair first, for 32
/// iterations. The remainder `r` is signed and is never restored after an
/// over-subtraction; its sign selects subtract or add on the next step and
/// decides each result bit. `r` stays within ±2^35, so `i64` cannot overflow.
#[must_use]
pub fn integer_sqrt(value: u64) -> u32 {
    let mut digits = value;
    let mut r: i64 = 0;
    let mut z: u32 = 0;

    for _ in 0..32 {
        r = r * 4 + i64::from((digits >> 62) as u8);
        r = if r >= 0 {
            r - (4 * i64::from(z) + 1)
        } else {
            r + (4 * i64::from(z) + 3)
        };
        z = if r >= 0 { (z << 1) | 1 } else { z << 1 };
        digits <<= 2;
    }

    z
}

/// Software engine: [`integer_sqrt`] on the CPU.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareSqrt;

impl SquareRootEngine for SoftwareSqrt {
    fn name(&self) -> &'static str {
        "software"
    }

    fn compute(&mut self, value: u32) -> u32 {
        integer_sqrt(u64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn is_floor_root(value: u64, root: u32) -> bool {
        let r = u128::from(root);
        let v = u128::from(value);
        r * r <= v && v < (r + 1) * (r + 1)
    }

    #[test]
    fn test_perfect_squares_of_test_vector() {
        for j in 0..200u64 {
            assert_eq!(integer_sqrt(j * j), j as u32, "j={j}");
        }
    }

    #[test]
    fn test_small_values() {
        let expected = [0, 1, 1, 1, 2, 2, 2, 2, 2, 3, 3];
        for (v, want) in expected.iter().enumerate() {
            assert_eq!(integer_sqrt(v as u64), *want, "v={v}");
        }
    }

    #[test]
    fn test_boundaries_around_squares() {
        for j in [1u64, 2, 255, 256, 4095, 65_535, 65_536, 1 << 20, u64::from(u32::MAX)] {
            let sq = j * j;
            assert_eq!(integer_sqrt(sq), j as u32);
            assert_eq!(integer_sqrt(sq - 1), (j - 1) as u32);
            if let Some(next) = sq.checked_add(2 * j) {
                assert_eq!(integer_sqrt(next), j as u32);
            }
        }
    }

    #[test]
    fn test_u32_and_u64_extremes() {
        assert_eq!(integer_sqrt(u64::from(u32::MAX)), 65_535);
        assert_eq!(integer_sqrt(1 << 32), 65_536);
        assert_eq!(integer_sqrt(u64::MAX), u32::MAX);
    }

    #[test]
    fn test_dense_low_range() {
        for v in 0..=1u64 << 16 {
            assert!(is_floor_root(v, integer_sqrt(v)), "v={v}");
        }
    }

    proptest! {
        #[test]
        fn floor_root_over_u32(v in any::<u32>()) {
            let root = integer_sqrt(u64::from(v));
            prop_assert!(is_floor_root(u64::from(v), root));
        }

        #[test]
        fn floor_root_over_u64(v in any::<u64>()) {
            let root = integer_sqrt(v);
            prop_assert!(is_floor_root(v, root));
        }

        #[test]
        fn engine_matches_function(v in any::<u32>()) {
            prop_assert_eq!(SoftwareSqrt.compute(v), integer_sqrt(u64::from(v)));
        }
    }
}
