//! In-memory record source implementation.

pub mod records;

pub use records::MemoryRecordSource;
