//! Core types and traits for tessera
//!
//! This crate defines the foundational types used throughout the system:
//! - Name: Identity of contracts, accounts and record owners
//! - Timestamp: Microsecond timestamps handed to contract code
//! - Key / KeySpace: Composite storage keys (namespace + table + space)
//! - TableLayout: Declared table name and secondary indices
//! - Codec: Record encoding, order-preserving key encoding, call arguments
//! - Error: Error type hierarchy
//! - Traits: Storage abstraction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod layout;
pub mod timestamp;
pub mod traits;
pub mod types;

pub use codec::{decode_record, encode_record, CallArgs, KeyEncode, Record};
pub use error::{Error, Result};
pub use layout::{IndexLayout, TableLayout};
pub use timestamp::Timestamp;
pub use traits::Storage;
pub use types::{Key, KeySpace, Name};
