//! Integer list operations used by the modules

use std::fmt;

use rand::Rng;

/// Smallest generated value
pub const MIN_VALUE: i32 = 1;

/// Largest generated value
pub const MAX_VALUE: i32 = 1000;

/// The data item moved between queues
pub type IntList = Vec<i32>;

/// `n` integers drawn uniformly from `[MIN_VALUE, MAX_VALUE]`
pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> IntList {
    (0..n).map(|_| rng.gen_range(MIN_VALUE..=MAX_VALUE)).collect()
}

/// A copy of `list` in reverse order
pub fn reverse(list: &[i32]) -> IntList {
    list.iter().rev().copied().collect()
}

/// Whether reversing `reversed` yields `original`
pub fn is_reversal_of(reversed: &[i32], original: &[i32]) -> bool {
    reversed.len() == original.len() && reversed.iter().rev().eq(original.iter())
}

/// Formats a list as `{a, b, c}`
#[derive(Debug, Clone, Copy)]
pub struct ListDisplay<'a>(pub &'a [i32]);

impl fmt::Display for ListDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, value) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_length_and_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for n in [0usize, 1, 4, 17, 250] {
            let list = generate(n, &mut rng);
            assert_eq!(list.len(), n);
            assert!(list.iter().all(|v| (MIN_VALUE..=MAX_VALUE).contains(v)));
        }
    }

    #[test]
    fn test_generate_is_seeded() {
        let a = generate(8, &mut StdRng::seed_from_u64(42));
        let b = generate(8, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_double_reverse_is_identity() {
        let mut rng = StdRng::seed_from_u64(1234);
        for _ in 0..200 {
            let n = rng.gen_range(0..64);
            let list: IntList = (0..n).map(|_| rng.gen_range(-5000..5000)).collect();
            assert_eq!(reverse(&reverse(&list)), list);
        }
    }

    #[test]
    fn test_is_reversal_of() {
        assert!(is_reversal_of(&[3, 2, 1], &[1, 2, 3]));
        assert!(is_reversal_of(&[], &[]));
        assert!(is_reversal_of(&[5, 5], &[5, 5]));
        assert!(!is_reversal_of(&[1, 2, 3], &[1, 2, 3]));
        assert!(!is_reversal_of(&[2, 1], &[1, 2, 3]));
    }

    #[test]
    fn test_is_reversal_matches_definition() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let original = generate(rng.gen_range(0..6), &mut rng);
            let candidate = generate(original.len(), &mut rng);
            let expected = reverse(&candidate) == original;
            assert_eq!(is_reversal_of(&candidate, &original), expected);
            assert!(is_reversal_of(&reverse(&original), &original));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ListDisplay(&[]).to_string(), "{}");
        assert_eq!(ListDisplay(&[7]).to_string(), "{7}");
        assert_eq!(ListDisplay(&[1, 20, 300]).to_string(), "{1, 20, 300}");
    }
}
