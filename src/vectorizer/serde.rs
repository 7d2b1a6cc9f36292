use serde::{ser::SerializeSeq, ser::SerializeStruct, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, TermVectorError};
use crate::utils::ustring::UString;
use crate::vectorizer::term::{link_entry, TermEntry, TermVector};

/// Portable form of a `TermVector`
/// Holds no bucket array, only what is needed to rebuild one.
/// Use `into_term_vector` to get a `TermVector` back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermVectorData {
    /// bucket count to rebuild with
    pub hashlen: u64,
    /// hash seed to rebuild with
    #[serde(default)]
    pub seed: u64,
    /// `(token, count)` pairs
    pub entries: Vec<(UString, i64)>,
}

impl TermVectorData {
    /// Rebuild the table at `hashlen`
    /// Repeated tokens are merged; counters are recomputed from the entries.
    ///
    /// Unlike `TermVector::load`, which keeps the persisted `count` and
    /// `total_count` as written, this form carries no counters, so a vector
    /// with drifted counters comes back already recounted.
    pub fn into_term_vector(self) -> Result<TermVector> {
        if self.hashlen == 0 {
            return Err(TermVectorError::Corrupt("hashlen is zero".to_string()));
        }
        let mut vector = TermVector::with_hashlen(self.hashlen, self.seed)?;
        for (token, count) in self.entries {
            let index = vector.bucket_index(&token);
            link_entry(&mut vector.buckets[index], TermEntry::new(token, count));
        }
        vector.recount();
        Ok(vector)
    }
}

impl From<&TermVector> for TermVectorData {
    fn from(vector: &TermVector) -> Self {
        TermVectorData {
            hashlen: vector.hashlen(),
            seed: vector.seed(),
            entries: vector.iter().map(|(token, count)| (token.clone(), count)).collect(),
        }
    }
}

struct EntriesSeq<'a>(&'a TermVector);

impl Serialize for EntriesSeq<'_> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.iter().count()))?;
        for entry in self.0.iter() {
            seq.serialize_element(&entry)?;
        }
        seq.end()
    }
}

impl Serialize for TermVector {
    /// Same shape as `TermVectorData`
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("TermVector", 3)?;
        state.serialize_field("hashlen", &self.hashlen())?;
        state.serialize_field("seed", &self.seed())?;
        state.serialize_field("entries", &EntriesSeq(self))?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for TermVector {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as DeError;

        TermVectorData::deserialize(deserializer)?
            .into_term_vector()
            .map_err(DeError::custom)
    }
}

/// CBOR helpers
impl TermVector {
    pub fn to_cbor_vec(&self) -> Result<Vec<u8>> {
        serde_cbor::to_vec(self).map_err(|e| TermVectorError::Serialization(e.to_string()))
    }

    pub fn from_cbor_slice(bytes: &[u8]) -> Result<Self> {
        serde_cbor::from_slice(bytes).map_err(|e| TermVectorError::Serialization(e.to_string()))
    }
}
