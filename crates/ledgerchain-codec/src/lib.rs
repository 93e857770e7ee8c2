//! Canonical, deterministic serialization of primitive trees, plus the
//! SHA-256 hashing wrapper used to content-address every record in the
//! ledger.
//!
//! The encoding is self-delimiting (tag byte + 4-byte little-endian length +
//! payload) and unambiguous: no two distinct `Value`s share an encoding. Map
//! keys are sorted lexicographically before encoding so the byte form is a
//! pure function of logical content, independent of insertion order.

mod value;

pub use value::Value;

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unexpected end of input while decoding")]
    Truncated,
    #[error("unknown type tag {0:#04x}")]
    UnknownTag(u8),
    #[error("map keys must be valid utf-8 strings")]
    InvalidMapKey,
    #[error("trailing bytes after decoding a value")]
    TrailingBytes,
}

/// Empty-map sentinel mandated for round-tripping absent mixed-type columns.
pub const EMPTY_MAP: [u8; 5] = *b"d\x00\x00\x00\x00";
/// Empty-list sentinel.
pub const EMPTY_LIST: [u8; 5] = *b"l\x00\x00\x00\x00";
/// Null sentinel.
pub const NULL: [u8; 5] = *b"n\x00\x00\x00\x00";

/// Encodes a `Value` into its canonical byte form.
pub fn pack(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    value.encode_into(&mut out);
    out
}

/// Decodes a canonical byte form back into a `Value`. Fails if the bytes
/// don't form exactly one complete, well-formed value.
pub fn unpack(bytes: &[u8]) -> Result<Value, CodecError> {
    let (value, rest) = Value::decode_from(bytes)?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes);
    }
    Ok(value)
}

/// SHA-256 of arbitrary bytes, rendered as 64-char lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(digest)
}

/// SHA-256 of arbitrary bytes, as the raw 32-byte digest.
pub fn hash_bytes_raw(bytes: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn empty_sentinels_round_trip() {
        assert_eq!(pack(&Value::Map(BTreeMap::new())), EMPTY_MAP);
        assert_eq!(pack(&Value::List(Vec::new())), EMPTY_LIST);
        assert_eq!(pack(&Value::Null), NULL);
    }

    #[test]
    fn round_trip_scalars() {
        for v in [
            Value::Null,
            Value::Bool(true),
            Value::Bool(false),
            Value::Int(0),
            Value::Int(-1),
            Value::Int(i64::MIN),
            Value::Int(i64::MAX),
            Value::Bytes(vec![1, 2, 3]),
            Value::Str("hello".to_string()),
        ] {
            let packed = pack(&v);
            assert_eq!(unpack(&packed).unwrap(), v);
        }
    }

    #[test]
    fn round_trip_nested() {
        let mut map = BTreeMap::new();
        map.insert("z".to_string(), Value::Int(1));
        map.insert("a".to_string(), Value::List(vec![Value::Bool(true), Value::Null]));
        let v = Value::Map(map);
        let packed = pack(&v);
        assert_eq!(unpack(&packed).unwrap(), v);
    }

    #[test]
    fn map_encoding_is_order_independent() {
        let mut m1 = BTreeMap::new();
        m1.insert("b".to_string(), Value::Int(2));
        m1.insert("a".to_string(), Value::Int(1));

        let mut m2 = BTreeMap::new();
        m2.insert("a".to_string(), Value::Int(1));
        m2.insert("b".to_string(), Value::Int(2));

        assert_eq!(pack(&Value::Map(m1)), pack(&Value::Map(m2)));
    }

    #[test]
    fn hash_is_stable_and_hex_lowercase() {
        let h = hash_bytes(b"hello world");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(h, hash_bytes(b"hello world"));
    }

    #[test]
    fn truncated_input_errors() {
        assert!(matches!(unpack(&[b'i', 0, 0, 0]), Err(CodecError::Truncated)));
    }
}
