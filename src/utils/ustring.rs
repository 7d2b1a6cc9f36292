use std::{fmt, hash::BuildHasher};

use ahash::RandomState;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// fixed companions of the caller seed, so a given (seed, token) always hashes the same
const HASH_K1: u64 = 0x243f_6a88_85a3_08d3;
const HASH_K2: u64 = 0x1319_8a2e_0370_7344;
const HASH_K3: u64 = 0xa409_3822_299f_31d0;

/// UString
/// Immutable unicode token
/// Indexed by code point; stored as UTF-8, so one storage unit is one byte.
///
/// # Examples
/// ```
/// use term_vector::UString;
/// let s = UString::new("héllo wörld");
/// assert_eq!(s.len(), 11);
/// assert_eq!(s.slice(6, 11).unwrap().as_str(), "wörld");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct UString {
    string: Box<str>,
    /// byte offset of every code point, plus the end of the string
    index: Box<[usize]>,
}

impl UString {
    pub fn new(s: &str) -> Self {
        let index = s
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(s.len()))
            .collect();
        UString {
            string: s.into(),
            index,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.string
    }

    /// Raw storage of the token
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.string.as_bytes()
    }

    /// Number of code points
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len() - 1
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of storage units (UTF-8 bytes)
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.string.len()
    }

    #[inline]
    pub fn chars(&self) -> std::str::Chars<'_> {
        self.string.chars()
    }

    /// Copy out the code points `start..end`
    ///
    /// # Returns
    /// * `Option<UString>` - None if the range is inverted or out of bounds
    pub fn slice(&self, start: usize, end: usize) -> Option<UString> {
        if start > end || end > self.len() {
            return None;
        }
        let from = self.index[start];
        let to = self.index[end];
        Some(UString::new(&self.string[from..to]))
    }

    /// Seeded hash of the token reduced to `0..modulus`
    ///
    /// The same token, seed and modulus always give the same bucket, which is
    /// what lets two vectors look each other's tokens up.
    ///
    /// # Panics
    /// When `modulus` is zero.
    #[inline]
    pub fn hash(&self, seed: u64, modulus: u64) -> u64 {
        let state = RandomState::with_seeds(seed, HASH_K1, HASH_K2, HASH_K3);
        BuildHasher::hash_one(&state, self.as_str()) % modulus
    }
}

impl From<&str> for UString {
    fn from(s: &str) -> Self {
        UString::new(s)
    }
}

impl From<String> for UString {
    fn from(s: String) -> Self {
        UString::new(&s)
    }
}

impl AsRef<str> for UString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

impl fmt::Debug for UString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.string, f)
    }
}

impl Serialize for UString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.string)
    }
}

impl<'de> Deserialize<'de> for UString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(UString::new(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_code_points_not_bytes() {
        let s = UString::new("日本語");
        assert_eq!(s.len(), 3);
        assert_eq!(s.byte_len(), 9);
        assert!(!s.is_empty());
        assert!(UString::new("").is_empty());
    }

    #[test]
    fn slice_uses_code_point_indexes() {
        let s = UString::new("aé日b");
        assert_eq!(s.slice(1, 3).unwrap().as_str(), "é日");
        assert_eq!(s.slice(0, 4).unwrap(), s);
        assert_eq!(s.slice(2, 2).unwrap().as_str(), "");
        assert!(s.slice(3, 2).is_none());
        assert!(s.slice(0, 5).is_none());
    }

    #[test]
    fn hash_is_deterministic_and_bounded() {
        let a = UString::new("token");
        let b = a.clone();
        for modulus in [1u64, 2, 17, 65536, 131073] {
            let h = a.hash(0, modulus);
            assert!(h < modulus);
            assert_eq!(h, b.hash(0, modulus));
        }
        assert_eq!(a.hash(0, 1), 0);
    }

    #[test]
    fn seed_changes_distribution() {
        let tokens: Vec<UString> = (0..64).map(|i| UString::new(&format!("t{i}"))).collect();
        let differs = tokens.iter().any(|t| t.hash(0, 1 << 20) != t.hash(1, 1 << 20));
        assert!(differs);
    }
}
