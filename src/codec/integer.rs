//! Big-endian integer, decimal and timestamp layouts.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_bigint::{BigInt, Sign};

use super::EncodeError;

/// Decodes N bytes of big-endian two's complement into an unbounded integer.
///
/// Bytes are accumulated most-significant first; when the sign bit of the
/// first byte is set, 2^(8N) is subtracted.
pub fn varint_from_bytes(bytes: &[u8]) -> Result<BigInt, String> {
    let Some(first) = bytes.first() else {
        return Err("no bytes to convert to an integer".to_string());
    };
    let magnitude = BigInt::from_bytes_be(Sign::Plus, bytes);
    if first & 0x80 != 0 {
        Ok(magnitude - (BigInt::from(1) << (8 * bytes.len())))
    } else {
        Ok(magnitude)
    }
}

/// Encodes an integer in the shortest two's complement form.
pub fn varint_to_bytes(value: &BigInt) -> Vec<u8> {
    value.to_signed_bytes_be()
}

/// Decodes exactly eight big-endian bytes into a signed 64-bit integer.
pub fn long_from_bytes(bytes: &[u8]) -> Result<i64, String> {
    let words: [u8; 8] = bytes
        .try_into()
        .map_err(|_| format!("expected 8 bytes for a long, got {}", bytes.len()))?;
    let high = u64::from(u32::from_be_bytes([words[0], words[1], words[2], words[3]]));
    let low = u64::from(u32::from_be_bytes([words[4], words[5], words[6], words[7]]));
    // Reinterpreting the combined word applies the 2^63 sign correction
    Ok(((high << 32) + low) as i64)
}

pub fn long_to_bytes(value: i64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decodes a 4-byte scale followed by a two's complement mantissa.
///
/// The value is `mantissa * 10^(-scale)`; the mantissa may be wider than
/// 64 bits.
pub fn decimal_from_bytes(bytes: &[u8]) -> Result<BigDecimal, String> {
    if bytes.len() < 5 {
        return Err(format!(
            "expected a 4-byte scale and a mantissa, got {} bytes",
            bytes.len()
        ));
    }
    let (scale, mantissa) = bytes.split_at(4);
    let scale = i32::from_be_bytes([scale[0], scale[1], scale[2], scale[3]]);
    let mantissa = varint_from_bytes(mantissa)?;
    Ok(BigDecimal::new(mantissa, i64::from(scale)))
}

pub fn decimal_to_bytes(value: &BigDecimal) -> Result<Vec<u8>, EncodeError> {
    let (mantissa, scale) = value.as_bigint_and_exponent();
    let scale = i32::try_from(scale).map_err(|_| EncodeError::ScaleOutOfRange { scale })?;
    let mut bytes = scale.to_be_bytes().to_vec();
    bytes.extend(varint_to_bytes(&mantissa));
    Ok(bytes)
}

/// Decodes epoch milliseconds into a UTC instant.
pub fn timestamp_from_bytes(bytes: &[u8]) -> Result<DateTime<Utc>, String> {
    let millis = long_from_bytes(bytes)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("{} milliseconds is outside the representable range", millis))
}

pub fn timestamp_to_bytes(value: &DateTime<Utc>) -> Vec<u8> {
    long_to_bytes(value.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    #[rstest]
    #[case(&[0x01], 1)]
    #[case(&[0x01, 0x50], 256 + 80)]
    #[case(&[0x01, 0x02, 0x6e], 65536 + 622)]
    #[case(&[0xff], -1)]
    #[case(&[0x80], -128)]
    #[case(&[0x00, 0x80], 128)]
    #[case(&[0xfe, 0xf6, 0x31], -68047)]
    fn test_varint_from_bytes(#[case] bytes: &[u8], #[case] expected: i64) {
        assert_eq!(varint_from_bytes(bytes).unwrap(), BigInt::from(expected));
    }

    #[test]
    fn test_varint_empty_is_an_error() {
        assert!(varint_from_bytes(&[]).is_err());
    }

    #[test]
    fn test_varint_wider_than_a_long() {
        let value = BigInt::from(1) << 256;
        let bytes = varint_to_bytes(&value);
        assert_eq!(bytes.len(), 33);
        assert_eq!(varint_from_bytes(&bytes).unwrap(), value);
        assert_eq!(varint_from_bytes(&varint_to_bytes(&-value.clone())).unwrap(), -value);
    }

    #[test]
    fn test_varint_reencodes_to_same_width() {
        for width in 1..=32usize {
            let mut bytes = vec![0x5a; width];
            bytes[0] = 0xa5;
            let decoded = varint_from_bytes(&bytes).unwrap();
            assert_eq!(varint_to_bytes(&decoded), bytes, "width {}", width);
        }
    }

    #[rstest]
    #[case(1i64 << 33)]
    #[case(-(1i64 << 33))]
    #[case(i64::MIN)]
    #[case(i64::MAX)]
    #[case(0)]
    fn test_long_round_trip(#[case] value: i64) {
        assert_eq!(long_from_bytes(&long_to_bytes(value)).unwrap(), value);
    }

    #[test]
    fn test_long_combines_words() {
        let bytes = [0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x05];
        assert_eq!(long_from_bytes(&bytes).unwrap(), (2i64 << 32) + 5);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[0x01, 0x02, 0x03])]
    #[case(&[0; 9])]
    fn test_long_requires_eight_bytes(#[case] bytes: &[u8]) {
        assert!(long_from_bytes(bytes).is_err());
    }

    #[rstest]
    #[case("15.333")]
    #[case("-15.333")]
    #[case("129182739481237481341234123411.1029348102934810293481039")]
    #[case("-129182739481237481341234123411.1029348102934810293481039")]
    fn test_decimal_round_trip(#[case] text: &str) {
        let value = BigDecimal::from_str(text).unwrap();
        let bytes = decimal_to_bytes(&value).unwrap();
        assert_eq!(decimal_from_bytes(&bytes).unwrap(), value);
    }

    #[test]
    fn test_decimal_layout() {
        // scale 3, mantissa 15333
        let bytes = [0, 0, 0, 3, 0x3b, 0xe5];
        assert_eq!(
            decimal_from_bytes(&bytes).unwrap(),
            BigDecimal::from_str("15.333").unwrap()
        );
    }

    #[test]
    fn test_decimal_without_mantissa_is_an_error() {
        assert!(decimal_from_bytes(&[0, 0, 0, 1]).is_err());
    }

    #[test]
    fn test_timestamp_keeps_milliseconds() {
        let ts = DateTime::from_timestamp_millis(1_325_376_000_123).unwrap();
        assert_eq!(timestamp_from_bytes(&timestamp_to_bytes(&ts)).unwrap(), ts);
    }
}
