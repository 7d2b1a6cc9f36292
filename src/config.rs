//! Construction settings for a term vector.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TermVectorError};

/// Default number of buckets of a fresh vector.
pub const DEFAULT_INITIAL_CAPACITY: u64 = 65536;

/// Default seed fed to the token hash.
pub const DEFAULT_HASH_SEED: u64 = 0;

/// Settings used when a `TermVector` is built or loaded.
///
/// Two vectors compared with each other should share `hash_seed`; when they
/// don't, lookups fall back to hashing every token under the other vector's
/// settings.
///
/// # Example
///
/// ```
/// use term_vector::VectorConfig;
/// let config = VectorConfig::default().with_initial_capacity(1024);
/// assert_eq!(config.initial_capacity, 1024);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Bucket count of a freshly created vector, must be non-zero
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: u64,
    /// Seed of the token hash
    #[serde(default = "default_hash_seed")]
    pub hash_seed: u64,
}

fn default_initial_capacity() -> u64 {
    DEFAULT_INITIAL_CAPACITY
}

fn default_hash_seed() -> u64 {
    DEFAULT_HASH_SEED
}

impl Default for VectorConfig {
    fn default() -> Self {
        VectorConfig {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            hash_seed: DEFAULT_HASH_SEED,
        }
    }
}

impl VectorConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: u64) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_hash_seed(mut self, hash_seed: u64) -> Self {
        self.hash_seed = hash_seed;
        self
    }

    /// Check the settings before any storage is allocated
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(TermVectorError::InvalidArgument(
                "initial_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
