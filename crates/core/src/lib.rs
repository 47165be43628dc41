//! Core primitives shared by the transaction ingestion gateway crates.

pub mod kafka;
pub mod logger;
pub mod types;

pub use types::{Transaction, TransactionRequest};
