//! Little-endian wire helpers.
//!
//! Readers are cursor-style: they take the full buffer plus a mutable
//! offset and advance it on success. Every read is bounds-checked and a
//! short buffer yields [`CheckpointError::Decode`] rather than a panic.

use ckpt_common::{CheckpointError, Result};

/// Upper bound for decoded string lengths. Tensor names and property
/// values are short; anything past this is a corrupt length field.
pub const MAX_STRING_LEN: usize = 1024 * 1024;

fn truncated(what: &str, offset: usize) -> CheckpointError {
    CheckpointError::Decode(format!("unexpected end of data reading {what} at offset {offset}"))
}

pub fn read_u8(data: &[u8], offset: &mut usize) -> Result<u8> {
    let value = *data.get(*offset).ok_or_else(|| truncated("u8", *offset))?;
    *offset += 1;
    Ok(value)
}

pub fn read_u32(data: &[u8], offset: &mut usize) -> Result<u32> {
    let end = offset.checked_add(4).filter(|&e| e <= data.len());
    let end = end.ok_or_else(|| truncated("u32", *offset))?;
    let value = u32::from_le_bytes(data[*offset..end].try_into().expect("4-byte slice"));
    *offset = end;
    Ok(value)
}

pub fn read_u64(data: &[u8], offset: &mut usize) -> Result<u64> {
    let end = offset.checked_add(8).filter(|&e| e <= data.len());
    let end = end.ok_or_else(|| truncated("u64", *offset))?;
    let value = u64::from_le_bytes(data[*offset..end].try_into().expect("8-byte slice"));
    *offset = end;
    Ok(value)
}

/// u64 length followed by that many raw bytes.
pub fn read_bytes(data: &[u8], offset: &mut usize) -> Result<Vec<u8>> {
    let len = read_u64(data, offset)?;
    let len = usize::try_from(len)
        .map_err(|_| CheckpointError::Decode(format!("byte length {len} does not fit in memory")))?;
    let end = offset.checked_add(len).filter(|&e| e <= data.len());
    let end = end.ok_or_else(|| truncated("bytes", *offset))?;
    let bytes = data[*offset..end].to_vec();
    *offset = end;
    Ok(bytes)
}

/// u64 length followed by UTF-8 bytes.
pub fn read_string(data: &[u8], offset: &mut usize) -> Result<String> {
    let start = *offset;
    let len = read_u64(data, offset)?;
    if len > MAX_STRING_LEN as u64 {
        return Err(CheckpointError::Decode(format!(
            "string length {len} at offset {start} exceeds maximum {MAX_STRING_LEN}"
        )));
    }
    let len = len as usize;
    let end = offset.checked_add(len).filter(|&e| e <= data.len());
    let end = end.ok_or_else(|| truncated("string", *offset))?;
    let s = std::str::from_utf8(&data[*offset..end])
        .map_err(|e| CheckpointError::Decode(format!("invalid UTF-8 string at offset {start}: {e}")))?;
    *offset = end;
    Ok(s.to_string())
}

pub fn put_u8(out: &mut Vec<u8>, v: u8) {
    out.push(v);
}

pub fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_u64(out: &mut Vec<u8>, v: u64) {
    out.extend_from_slice(&v.to_le_bytes());
}

pub fn put_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    put_u64(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

pub fn put_string(out: &mut Vec<u8>, s: &str) {
    put_bytes(out, s.as_bytes());
}
