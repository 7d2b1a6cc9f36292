/// This crate is the counting core of a bag-of-words analysis tool.
/// Documents become sparse term vectors that can be merged, pruned,
/// compared and persisted.
pub mod config;
pub mod error;
pub mod utils;
pub mod vectorizer;

/// Term Vector
/// The top-level struct of this crate: a counting hash map from tokens to
/// signed weights, viewed as a sparse vector.
///
/// Internally, it holds:
/// - A bucket array, each bucket owning a chain of entries
/// - The number of distinct tokens
/// - The sum of absolute weights
///
/// The table grows on its own as tokens arrive; merging (`add` / `sub`) and
/// pruning (`low_cut`) resynchronize the counters afterwards.
///
/// # Serialization
/// A fixed binary format (`save` / `load`) and a serde form
/// (`TermVectorData`, CBOR helpers) are both supported.
pub use vectorizer::term::TermVector;

/// Portable serde form of a `TermVector`
/// It carries the entries and the table size but no bucket array.
pub use vectorizer::serde::TermVectorData;

/// Dot product, squared norm and cosine similarity between term vectors
pub use vectorizer::compute::Compare;

/// Tokenizers
/// - `CommonParser`: splits on code points the checker accepts (whitespace by default)
/// - `CharParser`: one token per code point the checker does not drop
pub use vectorizer::token::{is_blank, CharParser, Checker, CommonParser, Parser, Span, SpanList};

/// Unicode token value with code point slicing and a seeded hash
pub use utils::ustring::UString;

pub use config::VectorConfig;
pub use error::{Result, TermVectorError};
