use std::fmt;

use tracing::{debug, trace};

use crate::config::VectorConfig;
use crate::error::{Result, TermVectorError};
use crate::utils::ustring::UString;
use crate::vectorizer::token::SpanList;

/// Owning link to the next entry of a bucket chain
pub(crate) type Link = Option<Box<TermEntry>>;

/// One distinct token of a vector and its signed weight
pub(crate) struct TermEntry {
    pub(crate) token: UString,
    pub(crate) count: i64,
    pub(crate) next: Link,
}

impl TermEntry {
    pub(crate) fn new(token: UString, count: i64) -> Box<Self> {
        Box::new(TermEntry {
            token,
            count,
            next: None,
        })
    }
}

/// TermVector
/// Counting hash map from tokens to signed weights, seen as a sparse vector.
///
/// Each bucket owns a singly linked chain of entries. The table grows to
/// `hashlen * 2 + 1` buckets whenever `count * 2 > hashlen`.
///
/// # Examples
/// ```
/// use term_vector::{TermVector, UString};
/// let mut vector = TermVector::new().unwrap();
/// vector.insert(&UString::new("rust"), 2).unwrap();
/// vector.insert(&UString::new("rust"), 1).unwrap();
///
/// assert_eq!(vector.get(&UString::new("rust")), Some(3));
/// assert_eq!(vector.len(), 1);
/// assert_eq!(vector.total_count(), 3);
/// ```
pub struct TermVector {
    pub(crate) buckets: Vec<Link>,
    /// number of buckets
    pub(crate) hashlen: u64,
    /// number of entries reachable from the buckets
    pub(crate) count: u64,
    /// sum of |count| over all entries
    pub(crate) total_count: u64,
    pub(crate) seed: u64,
}

/// Bucket of `token` in a table of `hashlen` buckets hashed with `seed`
#[inline]
pub fn bucket_index_for(token: &UString, seed: u64, hashlen: u64) -> usize {
    token.hash(seed, hashlen) as usize
}

/// Reserve an empty bucket array
pub(crate) fn allocate_buckets(hashlen: u64) -> Result<Vec<Link>> {
    let len = usize::try_from(hashlen).map_err(|_| TermVectorError::OutOfMemory { requested: hashlen })?;
    let mut buckets: Vec<Link> = Vec::new();
    buckets
        .try_reserve_exact(len)
        .map_err(|e| TermVectorError::out_of_memory(hashlen, e))?;
    buckets.resize_with(len, || None);
    Ok(buckets)
}

/// Put `entry` into the chain starting at `bucket`
/// An entry holding the same token absorbs the weight instead.
///
/// # Returns
/// * `bool` - true if the entry was linked as a new node
pub(crate) fn link_entry(bucket: &mut Link, mut entry: Box<TermEntry>) -> bool {
    let mut cursor = bucket;
    while let Some(node) = cursor {
        if node.token == entry.token {
            node.count = node.count.wrapping_add(entry.count);
            return false;
        }
        cursor = &mut node.next;
    }
    entry.next = None;
    *cursor = Some(entry);
    true
}

/// Construction
impl TermVector {
    /// Create an empty vector with the default settings
    pub fn new() -> Result<Self> {
        Self::with_config(&VectorConfig::default())
    }

    /// Create an empty vector
    ///
    /// # Arguments
    /// * `config` - initial capacity and hash seed
    pub fn with_config(config: &VectorConfig) -> Result<Self> {
        config.validate()?;
        Self::with_hashlen(config.initial_capacity, config.hash_seed)
    }

    pub(crate) fn with_hashlen(hashlen: u64, seed: u64) -> Result<Self> {
        Ok(TermVector {
            buckets: allocate_buckets(hashlen)?,
            hashlen,
            count: 0,
            total_count: 0,
            seed,
        })
    }
}

/// Insertion, merging and pruning
impl TermVector {
    /// Add `delta` to the weight of `token`
    /// A new entry is created when the token is absent, even for a zero delta.
    ///
    /// # Arguments
    /// * `token` - token, cloned into the vector when it is new
    /// * `delta` - signed weight to add
    ///
    /// # Errors
    /// `OutOfMemory` when the growth triggered by this insertion cannot be
    /// allocated; the token itself is already stored at that point.
    pub fn insert(&mut self, token: &UString, delta: i64) -> Result<()> {
        let index = self.bucket_index(token);
        match find_in_chain_mut(&mut self.buckets[index], token) {
            Some(entry) => entry.count = entry.count.wrapping_add(delta),
            None => {
                link_entry(&mut self.buckets[index], TermEntry::new(token.clone(), delta));
                self.count += 1;
            }
        }
        self.total_count = self.total_count.wrapping_add(delta.unsigned_abs());
        self.grow_if_overloaded()
    }

    /// Move every entry into a table of `hashlen` buckets
    /// Entries are relinked, not copied; `count` and `total_count` stay as they are.
    pub fn rehash(&mut self, hashlen: u64) -> Result<()> {
        if hashlen == 0 {
            return Err(TermVectorError::InvalidArgument("hashlen must be greater than zero".to_string()));
        }
        let mut buckets = allocate_buckets(hashlen)?;
        debug!(from = self.hashlen, to = hashlen, entries = self.count, "rehashing term vector");

        for bucket in self.buckets.iter_mut() {
            let mut chain = bucket.take();
            while let Some(mut entry) = chain {
                chain = entry.next.take();
                let index = bucket_index_for(&entry.token, self.seed, hashlen);
                link_entry(&mut buckets[index], entry);
            }
        }
        self.buckets = buckets;
        self.hashlen = hashlen;
        Ok(())
    }

    /// Insert every span of `source` with weight 1
    ///
    /// # Arguments
    /// * `source` - string the spans point into
    /// * `spans` - code point ranges produced by a parser
    ///
    /// # Errors
    /// `InvalidArgument` if a span is empty or falls outside `source`; nothing
    /// is inserted then.
    pub fn append_from_spans(&mut self, source: &UString, spans: &SpanList) -> Result<()> {
        let mut tokens = Vec::new();
        tokens
            .try_reserve_exact(spans.len())
            .map_err(|e| TermVectorError::out_of_memory(spans.len() as u64, e))?;
        for &(start, end) in spans.iter() {
            if start >= end {
                return Err(TermVectorError::InvalidArgument(format!("span {start}..{end} is empty or inverted")));
            }
            let token = source.slice(start, end).ok_or_else(|| {
                TermVectorError::InvalidArgument(format!(
                    "span {start}..{end} is outside a source of {} code points",
                    source.len()
                ))
            })?;
            tokens.push(token);
        }
        for token in &tokens {
            self.insert(token, 1)?;
        }
        self.grow_if_overloaded()
    }

    /// Add every weight of `other` to this vector, then recount
    pub fn add(&mut self, other: &TermVector) -> Result<()> {
        for (token, count) in other.iter() {
            self.insert(token, count)?;
        }
        self.recount();
        Ok(())
    }

    /// Subtract every weight of `other` from this vector, then recount
    /// Tokens missing here are created with the negated weight.
    pub fn sub(&mut self, other: &TermVector) -> Result<()> {
        for (token, count) in other.iter() {
            self.insert(token, count.wrapping_neg())?;
        }
        self.recount();
        Ok(())
    }

    /// Remove every entry whose signed weight is below `min_count`
    ///
    /// # Returns
    /// * `u64` - number of entries removed
    pub fn low_cut(&mut self, min_count: i64) -> u64 {
        let mut removed = 0;
        for bucket in self.buckets.iter_mut() {
            let mut chain = bucket.take();
            let mut tail = bucket;
            while let Some(mut entry) = chain {
                chain = entry.next.take();
                if entry.count < min_count {
                    removed += 1;
                } else {
                    tail = &mut tail.insert(entry).next;
                }
            }
        }
        trace!(removed, min_count, "low cut");
        self.recount();
        removed
    }

    /// Recompute `count` and `total_count` from the stored entries
    pub fn recount(&mut self) {
        let mut count = 0u64;
        let mut total_count = 0u64;
        for (_, weight) in self.iter() {
            count += 1;
            total_count = total_count.wrapping_add(weight.unsigned_abs());
        }
        self.count = count;
        self.total_count = total_count;
    }

    /// Drop every entry
    /// The bucket array keeps its current size.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            let mut chain = bucket.take();
            while let Some(mut entry) = chain {
                chain = entry.next.take();
            }
        }
        self.count = 0;
        self.total_count = 0;
    }

    #[inline]
    fn grow_if_overloaded(&mut self) -> Result<()> {
        if self.count.saturating_mul(2) > self.hashlen {
            self.rehash(grown_hashlen(self.hashlen)?)?;
        }
        Ok(())
    }
}

/// Bucket count the table grows to from `hashlen`
#[inline]
fn grown_hashlen(hashlen: u64) -> Result<u64> {
    hashlen
        .checked_mul(2)
        .and_then(|h| h.checked_add(1))
        .ok_or(TermVectorError::OutOfMemory { requested: u64::MAX })
}

/// Lookups
impl TermVector {
    #[inline]
    pub(crate) fn bucket_index(&self, token: &UString) -> usize {
        bucket_index_for(token, self.seed, self.hashlen)
    }

    /// Entries of one bucket in chain order
    #[inline]
    pub(crate) fn chain(&self, index: usize) -> Chain<'_> {
        Chain {
            next: self.buckets[index].as_deref(),
        }
    }

    /// Weight of `token`, None if it was never inserted
    #[inline]
    pub fn get(&self, token: &UString) -> Option<i64> {
        self.chain(self.bucket_index(token))
            .find(|entry| entry.token == *token)
            .map(|entry| entry.count)
    }

    #[inline]
    pub fn contains(&self, token: &UString) -> bool {
        self.get(token).is_some()
    }

    /// Number of distinct tokens
    #[inline]
    pub fn len(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of the absolute weights
    #[inline]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Number of buckets
    #[inline]
    pub fn hashlen(&self) -> u64 {
        self.hashlen
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Iterate `(token, weight)` in bucket-then-chain order
    pub fn iter(&self) -> Entries<'_> {
        Entries {
            buckets: self.buckets.iter(),
            chain: None,
        }
    }

    /// Tokens sorted by weight (descending), ties in dictionary order
    pub fn sorted_frequency_vector(&self) -> Vec<(String, i64)> {
        let mut list: Vec<(String, i64)> = self
            .iter()
            .map(|(token, count)| (token.as_str().to_string(), count))
            .collect();
        list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        list
    }

    /// Tokens sorted in dictionary order (ascending)
    pub fn sorted_dict_order_vector(&self) -> Vec<(String, i64)> {
        let mut list: Vec<(String, i64)> = self
            .iter()
            .map(|(token, count)| (token.as_str().to_string(), count))
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }
}

fn find_in_chain_mut<'a>(bucket: &'a mut Link, token: &UString) -> Option<&'a mut TermEntry> {
    let mut cursor = bucket.as_deref_mut();
    while let Some(entry) = cursor {
        if entry.token == *token {
            return Some(entry);
        }
        cursor = entry.next.as_deref_mut();
    }
    None
}

/// Iterator over one bucket chain
pub(crate) struct Chain<'a> {
    next: Option<&'a TermEntry>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a TermEntry;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.next?;
        self.next = entry.next.as_deref();
        Some(entry)
    }
}

/// Iterator over every entry of a `TermVector`
pub struct Entries<'a> {
    buckets: std::slice::Iter<'a, Link>,
    chain: Option<&'a TermEntry>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = (&'a UString, i64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.chain {
                self.chain = entry.next.as_deref();
                return Some((&entry.token, entry.count));
            }
            self.chain = self.buckets.next()?.as_deref();
        }
    }
}

impl<'a> IntoIterator for &'a TermVector {
    type Item = (&'a UString, i64);
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// chains are walked in loops; the derived impls would recurse once per entry

impl Clone for TermVector {
    fn clone(&self) -> Self {
        let buckets = (0..self.buckets.len())
            .map(|index| {
                let mut head: Link = None;
                let mut tail = &mut head;
                for entry in self.chain(index) {
                    tail = &mut tail.insert(TermEntry::new(entry.token.clone(), entry.count)).next;
                }
                head
            })
            .collect();
        TermVector {
            buckets,
            hashlen: self.hashlen,
            count: self.count,
            total_count: self.total_count,
            seed: self.seed,
        }
    }
}

impl Drop for TermVector {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for TermVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TermVector")
            .field("count", &self.count)
            .field("total_count", &self.total_count)
            .field("hashlen", &self.hashlen)
            .field("seed", &self.seed)
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a>(&'a TermVector);

impl fmt::Debug for DebugEntries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}
