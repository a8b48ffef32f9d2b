//! Byte-level helpers shared by the templater and the session.

use std::io::{Read, Write};

use flate2::Compression as Level;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

/// Share of non-text bytes above which a blob counts as binary.
const BINARY_THRESHOLD: f64 = 0.30;

/// Returns true if `bytes` look like binary data rather than text.
///
/// Binary means: contains a NUL byte, or more than 30% of the bytes fall
/// outside printable ASCII plus tab, carriage return and newline.
pub fn is_binary_data(bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return false;
    }
    if bytes.contains(&0) {
        return true;
    }
    let non_text = bytes
        .iter()
        .filter(|&&b| !matches!(b, b'\t' | b'\r' | b'\n' | 0x20..=0x7e))
        .count();
    non_text as f64 / bytes.len() as f64 > BINARY_THRESHOLD
}

/// Deflates a query with zlib at level 2.
pub fn compress(query: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Level::new(2));
    encoder.write_all(query)?;
    encoder.finish()
}

/// Inflates bytes produced by [`compress`].
pub fn decompress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}
