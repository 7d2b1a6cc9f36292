use num::{Float, FromPrimitive};

use crate::vectorizer::term::TermVector;

/// Vector-space comparison of two term vectors
pub trait Compare {
    /// dot積
    /// d(a, b) = Σ(a_i * b_i) over tokens present in both
    fn dot_product(&self, other: &Self) -> i64;
    /// ユークリッドノルムの2乗
    /// ||a||^2 = Σ(a_i^2)
    fn squared_norm(&self) -> u64;
    /// コサイン類似度
    /// cos(θ) = Σ(a_i * b_i) / sqrt(||a||^2 * ||b||^2)
    /// NaN when either vector has a zero norm
    fn cosine_similarity<F>(&self, other: &Self) -> F
    where
        F: Float + FromPrimitive;
}

impl Compare for TermVector {
    /// The vector with fewer tokens drives the walk. Each of its entries scans
    /// the whole matching chain of the other vector from the head, so tokens
    /// colliding in one bucket are all matched.
    fn dot_product(&self, other: &Self) -> i64 {
        let (small, large) = if self.len() > other.len() {
            (other, self)
        } else {
            (self, other)
        };
        // identical layout means identical bucket indexes
        let same_layout = small.hashlen() == large.hashlen() && small.seed() == large.seed();

        let mut product = 0_i64;
        for (index, bucket) in small.buckets.iter().enumerate() {
            if bucket.is_none() {
                continue;
            }
            for entry in small.chain(index) {
                let target = if same_layout {
                    index
                } else {
                    large.bucket_index(&entry.token)
                };
                for candidate in large.chain(target) {
                    if candidate.token == entry.token {
                        product = product.wrapping_add(entry.count.wrapping_mul(candidate.count));
                    }
                }
            }
        }
        product
    }

    fn squared_norm(&self) -> u64 {
        self.iter()
            .map(|(_, count)| {
                let magnitude = count.unsigned_abs();
                magnitude.wrapping_mul(magnitude)
            })
            .fold(0_u64, |acc, sq| acc.wrapping_add(sq))
    }

    fn cosine_similarity<F>(&self, other: &Self) -> F
    where
        F: Float + FromPrimitive,
    {
        let dot = F::from_i64(self.dot_product(other)).unwrap_or_else(F::nan);
        let norm_a = F::from_u64(self.squared_norm()).unwrap_or_else(F::nan);
        let norm_b = F::from_u64(other.squared_norm()).unwrap_or_else(F::nan);
        dot / (norm_a * norm_b).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VectorConfig;
    use crate::utils::ustring::UString;
    use proptest::prelude::*;

    fn vector_of(pairs: &[(&str, i64)], config: &VectorConfig) -> TermVector {
        let mut vector = TermVector::with_config(config).unwrap();
        for (token, count) in pairs {
            vector.insert(&UString::new(token), *count).unwrap();
        }
        vector
    }

    #[test]
    fn dot_norm_and_cosine_of_small_documents() {
        let config = VectorConfig::default();
        let v1 = vector_of(&[("a", 2), ("b", 1)], &config);
        let v2 = vector_of(&[("a", 1), ("b", 2)], &config);
        assert_eq!(v1.dot_product(&v2), 4);
        assert_eq!(v1.squared_norm(), 5);
        assert_eq!(v2.squared_norm(), 5);
        let cos: f64 = v1.cosine_similarity(&v2);
        assert!((cos - 0.8).abs() < 1e-12);
    }

    #[test]
    fn self_dot_is_squared_norm() {
        let v = vector_of(&[("x", 3), ("y", -4), ("z", 0)], &VectorConfig::default());
        assert_eq!(v.dot_product(&v) as u64, v.squared_norm());
        assert_eq!(v.squared_norm(), 25);
        let cos: f64 = v.cosine_similarity(&v);
        assert!((cos - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_vectors_are_orthogonal() {
        let config = VectorConfig::default();
        let v1 = vector_of(&[("left", 3)], &config);
        let v2 = vector_of(&[("right", 3)], &config);
        assert_eq!(v1.dot_product(&v2), 0);
        let cos: f32 = v1.cosine_similarity(&v2);
        assert_eq!(cos, 0.0);
    }

    #[test]
    fn empty_vector_gives_nan_cosine() {
        let config = VectorConfig::default();
        let empty = TermVector::with_config(&config).unwrap();
        let v = vector_of(&[("a", 1)], &config);
        let cos: f64 = empty.cosine_similarity(&v);
        assert!(cos.is_nan());
        assert_eq!(empty.dot_product(&v), 0);
    }

    #[test]
    fn colliding_tokens_all_contribute() {
        let config = VectorConfig::default().with_initial_capacity(64);
        let mut v1 = vector_of(&[("a", 1), ("b", 2), ("c", 3)], &config);
        let mut v2 = vector_of(&[("a", 4), ("b", 5), ("c", 6), ("d", 1)], &config);
        // one bucket each: every token collides with every other
        v1.rehash(1).unwrap();
        v2.rehash(1).unwrap();
        assert_eq!(v1.dot_product(&v2), 4 + 10 + 18);
        assert_eq!(v2.dot_product(&v1), 4 + 10 + 18);
    }

    #[test]
    fn different_capacities_are_looked_up_by_hash() {
        let small = vector_of(&[("a", 1), ("b", 2), ("c", 3)], &VectorConfig::default().with_initial_capacity(8));
        let large = vector_of(&[("a", 4), ("b", 5), ("c", 6), ("d", 1)], &VectorConfig::default().with_initial_capacity(1024));
        assert_ne!(small.hashlen(), large.hashlen());
        assert_eq!(small.dot_product(&large), 32);

        let mut collided = small.clone();
        collided.rehash(1).unwrap();
        assert_eq!(collided.dot_product(&large), 32);
    }

    #[test]
    fn different_seeds_are_looked_up_by_hash() {
        let v1 = vector_of(&[("a", 1), ("b", 2)], &VectorConfig::default().with_hash_seed(1));
        let v2 = vector_of(&[("a", 3), ("b", 4)], &VectorConfig::default().with_hash_seed(2));
        assert_eq!(v1.hashlen(), v2.hashlen());
        assert_eq!(v1.dot_product(&v2), 11);
    }

    proptest! {
        #[test]
        fn cosine_is_symmetric(
            left in prop::collection::vec(("[a-h]{1,2}", -20i64..20), 1..40),
            right in prop::collection::vec(("[a-h]{1,2}", -20i64..20), 1..40),
            capacity in 1u64..64,
        ) {
            let mut v1 = TermVector::with_config(&VectorConfig::default().with_initial_capacity(capacity)).unwrap();
            let mut v2 = TermVector::new().unwrap();
            for (token, count) in &left {
                v1.insert(&UString::new(token), *count).unwrap();
            }
            for (token, count) in &right {
                v2.insert(&UString::new(token), *count).unwrap();
            }
            prop_assert_eq!(v1.dot_product(&v2), v2.dot_product(&v1));
            let a: f64 = v1.cosine_similarity(&v2);
            let b: f64 = v2.cosine_similarity(&v1);
            prop_assert!((a.is_nan() && b.is_nan()) || a == b);
        }
    }
}
