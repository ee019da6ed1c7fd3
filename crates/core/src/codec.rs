//! Record, key and argument encodings
//!
//! Three encodings live here:
//!
//! - **Records** are encoded as the ordered concatenation of their fields in
//!   declaration order: fixed-width little-endian integers, length-prefixed
//!   strings. Decoding rejects trailing bytes so a truncated or padded value
//!   surfaces as a `SerializationError` instead of a silently wrong record.
//! - **Keys** use an order-preserving, self-delimiting encoding
//!   ([`KeyEncode`]) so that byte order of encoded keys equals value order and
//!   an encoded value is never a proper prefix of another encoded value.
//! - **Call arguments** ([`CallArgs`]) use the record encoding for a tuple of
//!   positional arguments.

use crate::error::Result;
use crate::timestamp::Timestamp;
use crate::types::Name;
use bincode::Options;
use byteorder::{BigEndian, ByteOrder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A typed, field-structured unit of stored data
///
/// Any serde type with a default value qualifies. The default value is the
/// zeroed record handed to `insert` initializers and singleton constructors.
pub trait Record: Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + 'static {}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Encode a record (or any serde value) in the canonical field order
pub fn encode_record<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(options().serialize(value)?)
}

/// Decode bytes produced by [`encode_record`]
pub fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(options().deserialize(bytes)?)
}

/// Order-preserving key encoding
///
/// For any two values `a < b` of the same type, `a.to_key_bytes() <
/// b.to_key_bytes()` bytewise. Variable-length encodings are terminated so
/// equality lookups by prefix never match a longer value.
pub trait KeyEncode {
    /// Append this value's key encoding to `out`
    fn encode_key(&self, out: &mut Vec<u8>);

    /// Encode into a fresh buffer
    fn to_key_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_key(&mut out);
        out
    }
}

macro_rules! unsigned_key {
    ($($t:ty => $write:ident, $n:expr);* $(;)?) => {
        $(
            impl KeyEncode for $t {
                fn encode_key(&self, out: &mut Vec<u8>) {
                    let mut buf = [0u8; $n];
                    BigEndian::$write(&mut buf, *self);
                    out.extend_from_slice(&buf);
                }
            }
        )*
    };
}

unsigned_key! {
    u16 => write_u16, 2;
    u32 => write_u32, 4;
    u64 => write_u64, 8;
    u128 => write_u128, 16;
}

macro_rules! signed_key {
    ($($t:ty => $u:ty);* $(;)?) => {
        $(
            impl KeyEncode for $t {
                fn encode_key(&self, out: &mut Vec<u8>) {
                    // flipping the sign bit orders negatives before positives
                    let flipped = (*self as $u) ^ (1 << (<$u>::BITS - 1));
                    flipped.encode_key(out);
                }
            }
        )*
    };
}

signed_key! {
    i16 => u16;
    i32 => u32;
    i64 => u64;
    i128 => u128;
}

impl KeyEncode for u8 {
    fn encode_key(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl KeyEncode for i8 {
    fn encode_key(&self, out: &mut Vec<u8>) {
        out.push((*self as u8) ^ 0x80);
    }
}

impl KeyEncode for bool {
    fn encode_key(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }
}

impl KeyEncode for [u8] {
    fn encode_key(&self, out: &mut Vec<u8>) {
        for &b in self {
            out.push(b);
            if b == 0x00 {
                out.push(0xFF);
            }
        }
        out.extend_from_slice(&[0x00, 0x00]);
    }
}

impl KeyEncode for Vec<u8> {
    fn encode_key(&self, out: &mut Vec<u8>) {
        self.as_slice().encode_key(out);
    }
}

impl KeyEncode for str {
    fn encode_key(&self, out: &mut Vec<u8>) {
        self.as_bytes().encode_key(out);
    }
}

impl KeyEncode for String {
    fn encode_key(&self, out: &mut Vec<u8>) {
        self.as_str().encode_key(out);
    }
}

impl KeyEncode for Name {
    fn encode_key(&self, out: &mut Vec<u8>) {
        self.as_str().encode_key(out);
    }
}

impl KeyEncode for Timestamp {
    fn encode_key(&self, out: &mut Vec<u8>) {
        self.as_micros().encode_key(out);
    }
}

impl KeyEncode for () {
    fn encode_key(&self, _out: &mut Vec<u8>) {}
}

impl<T: KeyEncode + ?Sized> KeyEncode for &T {
    fn encode_key(&self, out: &mut Vec<u8>) {
        (**self).encode_key(out);
    }
}

impl<A: KeyEncode, B: KeyEncode> KeyEncode for (A, B) {
    fn encode_key(&self, out: &mut Vec<u8>) {
        self.0.encode_key(out);
        self.1.encode_key(out);
    }
}

impl<A: KeyEncode, B: KeyEncode, C: KeyEncode> KeyEncode for (A, B, C) {
    fn encode_key(&self, out: &mut Vec<u8>) {
        self.0.encode_key(out);
        self.1.encode_key(out);
        self.2.encode_key(out);
    }
}

/// Positional method arguments in wire form
///
/// ```
/// use tessera_core::CallArgs;
///
/// let args = CallArgs::encode(&(123456i32, 789i32)).unwrap();
/// let (a, b): (i32, i32) = args.decode().unwrap();
/// assert_eq!(a + b, 124245);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallArgs(Vec<u8>);

impl CallArgs {
    /// No arguments
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Encode a tuple (or single value) of positional arguments
    pub fn encode<T: Serialize + ?Sized>(args: &T) -> Result<Self> {
        Ok(Self(encode_record(args)?))
    }

    /// Wrap bytes received from the transaction envelope
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Decode into the method's expected argument tuple
    ///
    /// Fails with `SerializationError` on arity or type mismatch.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode_record(&self.0)
    }

    /// Raw encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no arguments were supplied
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
