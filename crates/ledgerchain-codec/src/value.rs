use crate::CodecError;
use std::collections::BTreeMap;

const TAG_NULL: u8 = b'n';
const TAG_BOOL: u8 = b'b';
const TAG_INT: u8 = b'i';
const TAG_BYTES: u8 = b'x';
const TAG_STR: u8 = b's';
const TAG_LIST: u8 = b'l';
const TAG_MAP: u8 = b'd';

/// The canonical value tree: every field of every record in the ledger is
/// expressed in terms of these seven kinds before hashing or storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Bytes(Vec<u8>),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Value::Null => write_header(out, TAG_NULL, 0),
            Value::Bool(b) => {
                write_header(out, TAG_BOOL, 1);
                out.push(if *b { 1 } else { 0 });
            }
            Value::Int(i) => {
                write_header(out, TAG_INT, 8);
                out.extend_from_slice(&i.to_le_bytes());
            }
            Value::Bytes(b) => {
                write_header(out, TAG_BYTES, b.len() as u32);
                out.extend_from_slice(b);
            }
            Value::Str(s) => {
                write_header(out, TAG_STR, s.len() as u32);
                out.extend_from_slice(s.as_bytes());
            }
            Value::List(items) => {
                let mut payload = Vec::new();
                for item in items {
                    item.encode_into(&mut payload);
                }
                write_header(out, TAG_LIST, payload.len() as u32);
                out.extend_from_slice(&payload);
            }
            Value::Map(map) => {
                // BTreeMap already iterates in sorted key order.
                let mut payload = Vec::new();
                for (k, v) in map.iter() {
                    Value::Str(k.clone()).encode_into(&mut payload);
                    v.encode_into(&mut payload);
                }
                write_header(out, TAG_MAP, payload.len() as u32);
                out.extend_from_slice(&payload);
            }
        }
    }

    pub(crate) fn decode_from(bytes: &[u8]) -> Result<(Value, &[u8]), CodecError> {
        let (tag, len, rest) = read_header(bytes)?;
        if rest.len() < len {
            return Err(CodecError::Truncated);
        }
        let (payload, rest) = rest.split_at(len);
        let value = match tag {
            TAG_NULL => Value::Null,
            TAG_BOOL => {
                if payload.len() != 1 {
                    return Err(CodecError::Truncated);
                }
                Value::Bool(payload[0] != 0)
            }
            TAG_INT => {
                if payload.len() != 8 {
                    return Err(CodecError::Truncated);
                }
                let mut buf = [0u8; 8];
                buf.copy_from_slice(payload);
                Value::Int(i64::from_le_bytes(buf))
            }
            TAG_BYTES => Value::Bytes(payload.to_vec()),
            TAG_STR => Value::Str(
                std::str::from_utf8(payload)
                    .map_err(|_| CodecError::InvalidMapKey)?
                    .to_string(),
            ),
            TAG_LIST => {
                let mut items = Vec::new();
                let mut remaining = payload;
                while !remaining.is_empty() {
                    let (item, next) = Value::decode_from(remaining)?;
                    items.push(item);
                    remaining = next;
                }
                Value::List(items)
            }
            TAG_MAP => {
                let mut map = BTreeMap::new();
                let mut remaining = payload;
                while !remaining.is_empty() {
                    let (key, next) = Value::decode_from(remaining)?;
                    let key = match key {
                        Value::Str(s) => s,
                        _ => return Err(CodecError::InvalidMapKey),
                    };
                    let (val, next) = Value::decode_from(next)?;
                    map.insert(key, val);
                    remaining = next;
                }
                Value::Map(map)
            }
            other => return Err(CodecError::UnknownTag(other)),
        };
        Ok((value, rest))
    }
}

fn write_header(out: &mut Vec<u8>, tag: u8, len: u32) {
    out.push(tag);
    out.extend_from_slice(&len.to_le_bytes());
}

fn read_header(bytes: &[u8]) -> Result<(u8, usize, &[u8]), CodecError> {
    if bytes.len() < 5 {
        return Err(CodecError::Truncated);
    }
    let tag = bytes[0];
    let mut len_buf = [0u8; 4];
    len_buf.copy_from_slice(&bytes[1..5]);
    let len = u32::from_le_bytes(len_buf) as usize;
    Ok((tag, len, &bytes[5..]))
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
