//! Persistence layer for the draw history
//!
//! - `ByteStore` abstracts where the serialized history lives
//! - `FileStore` keeps it in a JSON file, `MemoryStore` in process

pub mod store;

pub use store::{ByteStore, FileStore, MemoryStore};
