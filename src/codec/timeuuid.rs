//! Version 1 (time-based) UUIDs.
//!
//! A v1 UUID embeds a 60-bit count of 100-nanosecond ticks since the
//! Gregorian calendar reform, 1582-10-15T00:00:00Z.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Ticks between 1582-10-15 and the Unix epoch.
const GREGORIAN_OFFSET_TICKS: i64 = 0x01B2_1DD2_1381_4000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Extracts the embedded instant from a version 1 UUID.
///
/// Returns `None` for any other version.
pub fn timestamp_of(uuid: &Uuid) -> Option<DateTime<Utc>> {
    if uuid.get_version_num() != 1 {
        return None;
    }
    let b = uuid.as_bytes();
    let time_low = u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]));
    let time_mid = u64::from(u16::from_be_bytes([b[4], b[5]]));
    let time_high = u64::from(u16::from_be_bytes([b[6], b[7]]) & 0x0fff);
    let ticks = (time_high << 48) | (time_mid << 32) | time_low;

    let unix_ticks = ticks as i64 - GREGORIAN_OFFSET_TICKS;
    let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
    let nanos = (unix_ticks.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

/// Largest tick count the 60-bit timestamp field can hold.
const MAX_TICKS: i128 = (1 << 60) - 1;

/// Builds a version 1 UUID embedding `ts` at 100ns resolution.
///
/// The clock sequence and node are random, so two calls with the same
/// instant yield different identifiers that decode to the same time.
/// Returns `None` for instants before 1582-10-15 or past the end of the
/// 60-bit tick range.
pub fn from_timestamp(ts: &DateTime<Utc>) -> Option<Uuid> {
    let unix_ticks = i128::from(ts.timestamp()) * i128::from(TICKS_PER_SECOND)
        + i128::from(ts.timestamp_subsec_nanos() / 100);
    let ticks = unix_ticks + i128::from(GREGORIAN_OFFSET_TICKS);
    if !(0..=MAX_TICKS).contains(&ticks) {
        return None;
    }
    let ticks = ticks as u64;

    let mut bytes = *Uuid::new_v4().as_bytes();
    bytes[0..4].copy_from_slice(&((ticks & 0xffff_ffff) as u32).to_be_bytes());
    bytes[4..6].copy_from_slice(&(((ticks >> 32) & 0xffff) as u16).to_be_bytes());
    bytes[6..8].copy_from_slice(&((((ticks >> 48) & 0x0fff) as u16) | 0x1000).to_be_bytes());
    // RFC 4122 variant
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Some(Uuid::from_bytes(bytes))
}
