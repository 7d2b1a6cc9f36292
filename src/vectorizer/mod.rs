pub mod codec;
pub mod compute;
pub mod serde;
pub mod term;
pub mod token;

pub use term::{bucket_index_for, Entries, TermVector};
