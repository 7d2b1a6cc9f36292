//! Binary persistence and text dump of a term vector.
//!
//! ## Format
//!
//! All integers are fixed width in host byte order.
//!
//! ```text
//! [total_count: u64]
//! [hashlen: u64]
//! [count: u64]          as kept by the writer
//! [entry_count: u64]    entries actually written
//! For each entry (bucket-then-chain order):
//!   [count: i64]
//!   [token_len: u64]    UTF-8 bytes
//!   [token: token_len bytes]
//! ```
//!
//! Loading rebuilds the table at the persisted `hashlen` and links every entry
//! through the merge path, so repeated tokens in a stream are summed.

use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use tracing::{debug, warn};

use crate::config::VectorConfig;
use crate::error::{Result, TermVectorError};
use crate::utils::ustring::UString;
use crate::vectorizer::term::{link_entry, TermEntry, TermVector};

fn read_error(e: io::Error, what: &str) -> TermVectorError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        TermVectorError::Corrupt(format!("stream ended while reading {what}"))
    } else {
        TermVectorError::Io(e)
    }
}

fn read_u64<R: Read>(input: &mut R, what: &str) -> Result<u64> {
    input.read_u64::<NativeEndian>().map_err(|e| read_error(e, what))
}

fn read_token<R: Read>(input: &mut R, len: u64) -> Result<UString> {
    let mut bytes = Vec::new();
    input
        .by_ref()
        .take(len)
        .read_to_end(&mut bytes)
        .map_err(|e| read_error(e, "token"))?;
    if (bytes.len() as u64) != len {
        return Err(TermVectorError::Corrupt(format!(
            "token declared {len} bytes but only {} remain",
            bytes.len()
        )));
    }
    let token = String::from_utf8(bytes)
        .map_err(|e| TermVectorError::Corrupt(format!("token is not valid UTF-8: {e}")))?;
    Ok(UString::from(token))
}

/// Binary save / load
impl TermVector {
    /// Write the vector in the binary format
    /// The vector itself is not touched.
    pub fn save<W: Write>(&self, output: &mut W) -> Result<()> {
        output.write_u64::<NativeEndian>(self.total_count)?;
        output.write_u64::<NativeEndian>(self.hashlen)?;
        output.write_u64::<NativeEndian>(self.count)?;

        let entry_count = self.iter().count() as u64;
        output.write_u64::<NativeEndian>(entry_count)?;

        for (token, count) in self.iter() {
            output.write_i64::<NativeEndian>(count)?;
            output.write_u64::<NativeEndian>(token.byte_len() as u64)?;
            output.write_all(token.as_bytes())?;
        }
        Ok(())
    }

    /// Read a vector written by `save`, hashing with the default seed
    pub fn load<R: Read>(input: &mut R) -> Result<Self> {
        Self::load_with_config(input, &VectorConfig::default())
    }

    /// Read a vector written by `save`
    ///
    /// The persisted `hashlen`, `count` and `total_count` are restored as they
    /// are; only `config.hash_seed` is taken from `config`.
    ///
    /// # Errors
    /// * `Corrupt` - the stream is truncated, declares zero buckets or holds a
    ///   token that is not UTF-8
    /// * `OutOfMemory` - the persisted bucket array cannot be allocated
    pub fn load_with_config<R: Read>(input: &mut R, config: &VectorConfig) -> Result<Self> {
        let total_count = read_u64(input, "total_count")?;
        let hashlen = read_u64(input, "hashlen")?;
        let count = read_u64(input, "count")?;
        let entry_count = read_u64(input, "entry_count")?;
        if hashlen == 0 {
            return Err(TermVectorError::Corrupt("persisted hashlen is zero".to_string()));
        }

        let mut vector = TermVector::with_hashlen(hashlen, config.hash_seed)?;
        let mut linked = 0u64;
        let mut seen_total = 0u64;
        for _ in 0..entry_count {
            let weight = input
                .read_i64::<NativeEndian>()
                .map_err(|e| read_error(e, "entry count"))?;
            let len = read_u64(input, "token length")?;
            let token = read_token(input, len)?;

            let index = vector.bucket_index(&token);
            if link_entry(&mut vector.buckets[index], TermEntry::new(token, weight)) {
                linked += 1;
            }
            seen_total = seen_total.wrapping_add(weight.unsigned_abs());
        }

        if linked != count || seen_total != total_count {
            warn!(
                header_count = count,
                linked,
                header_total_count = total_count,
                seen_total,
                "loaded term vector header disagrees with its entries"
            );
        }
        vector.count = count;
        vector.total_count = total_count;
        debug!(hashlen, entries = entry_count, "loaded term vector");
        Ok(vector)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.save(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = bytes;
        Self::load(&mut reader)
    }
}

/// Text dump
impl TermVector {
    /// Write the human-readable dump
    /// Not meant to be read back.
    pub fn write_dump<W: Write>(&self, out: &mut W) -> Result<()> {
        write!(out, "{self}")?;
        Ok(())
    }
}

impl fmt::Display for TermVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count\t{}", self.count)?;
        writeln!(f, "total_count\t{}", self.total_count)?;
        writeln!(f, "hashlen\t{}", self.hashlen)?;
        for (token, count) in self.iter() {
            writeln!(f, "{token}\t{count}")?;
        }
        Ok(())
    }
}
