//! Length-prefixed collection layout.
//!
//! ```text
//! list/set: u16 count, then count x (u16 len, len bytes)
//! map:      u16 count, then count x (u16 len, key bytes, u16 len, value bytes)
//! ```
//!
//! All lengths are big-endian. Elements are decoded with the collection's
//! element tags; trailing bytes after the last element are rejected.

use super::{EncodeError, decode_value};
use crate::types::{TypeTag, Value};

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn length(&mut self) -> Result<usize, String> {
        let end = self.pos + 2;
        let prefix = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| format!("truncated length prefix at offset {}", self.pos))?;
        self.pos = end;
        Ok(usize::from(u16::from_be_bytes([prefix[0], prefix[1]])))
    }

    fn chunk(&mut self) -> Result<&'a [u8], String> {
        let len = self.length()?;
        let end = self.pos + len;
        let chunk = self.bytes.get(self.pos..end).ok_or_else(|| {
            format!(
                "element length {} exceeds the {} remaining bytes",
                len,
                self.bytes.len() - self.pos
            )
        })?;
        self.pos = end;
        Ok(chunk)
    }

    fn finish(&self) -> Result<(), String> {
        if self.pos == self.bytes.len() {
            Ok(())
        } else {
            Err(format!(
                "{} trailing bytes after the last element",
                self.bytes.len() - self.pos
            ))
        }
    }
}

fn element(tag: &TypeTag, bytes: &[u8], index: usize) -> Result<Value, String> {
    decode_value(tag, bytes).map_err(|e| format!("element {}: {}", index, e.reason))
}

pub(super) fn decode_list(elem: &TypeTag, bytes: &[u8]) -> Result<Vec<Value>, String> {
    let mut reader = Reader::new(bytes);
    let count = reader.length()?;
    let mut items = Vec::with_capacity(count);
    for index in 0..count {
        let chunk = reader.chunk()?;
        items.push(element(elem, chunk, index)?);
    }
    reader.finish()?;
    Ok(items)
}

pub(super) fn decode_set(elem: &TypeTag, bytes: &[u8]) -> Result<Vec<Value>, String> {
    let mut unique: Vec<Value> = Vec::new();
    for item in decode_list(elem, bytes)? {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    Ok(unique)
}

pub(super) fn decode_map(
    key_tag: &TypeTag,
    value_tag: &TypeTag,
    bytes: &[u8],
) -> Result<Vec<(Value, Value)>, String> {
    let mut reader = Reader::new(bytes);
    let count = reader.length()?;
    let mut entries: Vec<(Value, Value)> = Vec::with_capacity(count);
    for index in 0..count {
        let key = element(key_tag, reader.chunk()?, index)?;
        let value = element(value_tag, reader.chunk()?, index)?;
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => entries.push((key, value)),
        }
    }
    reader.finish()?;
    Ok(entries)
}

fn put_length(out: &mut Vec<u8>, len: usize, what: &'static str) -> Result<(), EncodeError> {
    let len = u16::try_from(len).map_err(|_| EncodeError::TooLong { what, len })?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

/// Encodes already-serialized elements as a list or set.
pub fn list_to_bytes<T: AsRef<[u8]>>(elements: &[T]) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    put_length(&mut out, elements.len(), "element count")?;
    for element in elements {
        let element = element.as_ref();
        put_length(&mut out, element.len(), "element")?;
        out.extend_from_slice(element);
    }
    Ok(out)
}

/// Encodes already-serialized key/value pairs as a map.
pub fn map_to_bytes<K: AsRef<[u8]>, V: AsRef<[u8]>>(
    entries: &[(K, V)],
) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    put_length(&mut out, entries.len(), "entry count")?;
    for (key, value) in entries {
        put_length(&mut out, key.as_ref().len(), "key")?;
        out.extend_from_slice(key.as_ref());
        put_length(&mut out, value.as_ref().len(), "value")?;
        out.extend_from_slice(value.as_ref());
    }
    Ok(out)
}
