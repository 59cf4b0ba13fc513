//! Repair of truncated +CMT short-message notifications
//!
//! Some CP firmware delivers the MT SMS push with the PDU region as
//! raw bytes instead of hex text, and with a unit-count field
//! computed against that wrong byte length. Upstream AT parsing
//! expects a standards-conformant hex PDU, so the notification is
//! re-framed here: the header line is kept, the PDU region is
//! hex-expanded nibble by nibble, and the count field is patched in
//! place with the true TPDU length.

use crate::error::{VmodemError, VmodemResult};

/// Fixed capacity of the re-encoding scratch buffer
///
/// Inputs longer than this are truncated deterministically before
/// processing; the transform never writes past it.
pub const SCRATCH_CAPACITY: usize = 512;

/// Literal prefix selecting the re-encoding path
pub const CMT_PREFIX: &[u8] = b"+CMT:";

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Check whether a received buffer is an MT SMS push notification
pub fn is_sms_push(buf: &[u8]) -> bool {
    buf.starts_with(CMT_PREFIX)
}

/// Read a big-endian 4-bit field at an arbitrary bit offset
///
/// Bit 0 is the most significant bit of byte 0; the high nibble of
/// byte `i` therefore lives at bit offset `8 * i`. Reads running past
/// the end of the data are zero-filled.
pub fn nibble_at(data: &[u8], bit_offset: usize) -> u8 {
    let byte_idx = bit_offset / 8;
    let bit_in_byte = bit_offset % 8;

    if bit_in_byte <= 4 {
        (data.get(byte_idx).copied().unwrap_or(0) >> (4 - bit_in_byte)) & 0x0F
    } else {
        let hi = data.get(byte_idx).copied().unwrap_or(0) as u16;
        let lo = data.get(byte_idx + 1).copied().unwrap_or(0) as u16;
        (((hi << 8 | lo) >> (12 - bit_in_byte)) & 0x0F) as u8
    }
}

/// Re-encode a truncated +CMT notification into a conformant buffer.
///
/// The header line (through its CR/LF) is copied verbatim, every byte
/// after it is expanded to two uppercase hex characters (most
/// significant nibble first), a CR/LF pair is appended, and the
/// unit-count field after the header colon is overwritten with the
/// decimal digits of the true TPDU length:
///
/// ```text
/// tpdu_len = (input_len - header_len) - (sca_len + 1)
/// ```
///
/// where `sca_len` is the raw service-center-address length byte
/// immediately following the header. Inputs that would overflow the
/// scratch capacity lose trailing PDU bytes rather than fail; a
/// header that leaves no room for even one hex pair is refused.
pub fn reencode(input: &[u8]) -> VmodemResult<Vec<u8>> {
    let input = if input.len() > SCRATCH_CAPACITY {
        log::warn!(
            "+CMT notification of [{}] bytes truncated to scratch capacity [{}]",
            input.len(),
            SCRATCH_CAPACITY
        );
        &input[..SCRATCH_CAPACITY]
    } else {
        input
    };

    let mut work = [0u8; SCRATCH_CAPACITY];
    let mut cursor = 0;
    let mut count_offset = None;
    let mut header_len = None;

    // Copy the header verbatim, remembering where the unit-count
    // field after the colon starts.
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        work[cursor] = b;
        cursor += 1;

        if b == b':' && count_offset.is_none() {
            count_offset = Some(i + 1);
        }
        if b == b'\r' && input.get(i + 1) == Some(&b'\n') {
            work[cursor] = b'\n';
            cursor += 1;
            header_len = Some(i + 2);
            break;
        }
        i += 1;
    }

    let header_len = header_len.ok_or_else(|| {
        VmodemError::InvalidData("notification header has no CR/LF terminator".to_string())
    })?;
    let count_offset = count_offset.ok_or_else(|| {
        VmodemError::InvalidData("notification header has no length field".to_string())
    })?;

    let raw = &input[header_len..];
    if raw.is_empty() {
        return Err(VmodemError::InvalidData(
            "no PDU bytes follow the notification header".to_string(),
        ));
    }

    let sca_len = raw[0] as usize;
    let pdu_len = raw.len();
    let tpdu_len = pdu_len.checked_sub(sca_len + 1).ok_or_else(|| {
        VmodemError::InvalidData(format!(
            "SCA length [{}] exceeds PDU region of [{}] bytes",
            sca_len, pdu_len
        ))
    })?;

    // Hex-expand the raw PDU region, two characters per byte. Keep
    // room for the trailing CR/LF inside the scratch bound.
    let mut expanded = 0;
    for idx in 0..raw.len() {
        if cursor + 4 > SCRATCH_CAPACITY {
            log::warn!("PDU region truncated at scratch capacity during hex expansion");
            break;
        }
        let bit = idx * 8;
        work[cursor] = HEX_DIGITS[nibble_at(raw, bit) as usize];
        work[cursor + 1] = HEX_DIGITS[nibble_at(raw, bit + 4) as usize];
        cursor += 2;
        expanded += 1;
    }

    if expanded == 0 {
        return Err(VmodemError::InvalidData(
            "notification header leaves no scratch room for the PDU".to_string(),
        ));
    }

    // The expansion loop left at least two spare bytes past the last
    // hex pair, so the terminator always fits.
    work[cursor] = b'\r';
    work[cursor + 1] = b'\n';
    cursor += 2;

    // Patch the transmitted unit count in place with the true TPDU
    // length. The stale count was computed against the raw byte
    // length, so it never has fewer digits than the corrected value.
    let digits = tpdu_len.to_string().into_bytes();
    if count_offset + digits.len() > header_len {
        return Err(VmodemError::InvalidData(
            "unit-count field does not fit inside the notification header".to_string(),
        ));
    }
    work[count_offset..count_offset + digits.len()].copy_from_slice(&digits);

    Ok(work[..cursor].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_to_bytes(hex: &[u8]) -> Vec<u8> {
        hex.chunks(2)
            .map(|pair| {
                let s = std::str::from_utf8(pair).unwrap();
                u8::from_str_radix(s, 16).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_nibble_at_aligned() {
        let data = [0xA7, 0x3C];
        assert_eq!(nibble_at(&data, 0), 0xA);
        assert_eq!(nibble_at(&data, 4), 0x7);
        assert_eq!(nibble_at(&data, 8), 0x3);
        assert_eq!(nibble_at(&data, 12), 0xC);
    }

    #[test]
    fn test_nibble_at_unaligned() {
        // 0xA7 0x3C = 1010 0111 0011 1100
        let data = [0xA7, 0x3C];
        assert_eq!(nibble_at(&data, 2), 0b1001);
        assert_eq!(nibble_at(&data, 6), 0b1100);
    }

    #[test]
    fn test_nibble_at_past_end_is_zero_filled() {
        assert_eq!(nibble_at(&[0xFF], 12), 0xF);
        assert_eq!(nibble_at(&[], 0), 0);
    }

    #[test]
    fn test_is_sms_push() {
        assert!(is_sms_push(b"+CMT:20\r\nxyz"));
        assert!(!is_sms_push(b"+CRING: VOICE\r\n"));
        assert!(!is_sms_push(b""));
    }

    #[test]
    fn test_reencode_end_to_end() {
        // SCA length 7, then 7 SCA bytes and 12 TPDU bytes: a 20-byte
        // raw PDU region whose transmitted count (20) is stale.
        let mut input = b"+CMT:20\r\n".to_vec();
        let pdu: Vec<u8> = (0u8..20).map(|i| i.wrapping_mul(17).wrapping_add(3)).collect();
        let mut pdu = pdu;
        pdu[0] = 7;
        input.extend_from_slice(&pdu);

        let out = reencode(&input).unwrap();

        // Patched header, 40 hex characters, trailing CR/LF.
        assert!(out.starts_with(b"+CMT:12\r\n"));
        assert!(out.ends_with(b"\r\n"));
        let hex_region = &out[9..out.len() - 2];
        assert_eq!(hex_region.len(), 40);
        assert_eq!(hex_to_bytes(hex_region), pdu);
    }

    #[test]
    fn test_reencode_zero_length_sca() {
        let mut input = b"+CMT:5\r\n".to_vec();
        input.extend_from_slice(&[0x00, 0xDE, 0xAD, 0xBE, 0xEF]);

        let out = reencode(&input).unwrap();

        // 5 raw bytes, SCA length 0: tpdu = 5 - 1 = 4.
        assert!(out.starts_with(b"+CMT:4\r\n"));
        let hex_region = &out[8..out.len() - 2];
        assert_eq!(hex_region, b"00DEADBEEF");
    }

    #[test]
    fn test_reencode_uppercase_hex() {
        let mut input = b"+CMT:3\r\n".to_vec();
        input.extend_from_slice(&[0x00, 0xab, 0xcd]);

        let out = reencode(&input).unwrap();
        let hex_region = &out[8..out.len() - 2];
        assert_eq!(hex_region, b"00ABCD");
    }

    #[test]
    fn test_reencode_rejects_missing_crlf() {
        assert!(reencode(b"+CMT:20 no terminator").is_err());
    }

    #[test]
    fn test_reencode_rejects_missing_colon() {
        assert!(reencode(b"CMT 20\r\n\x00\x01\x02").is_err());
    }

    #[test]
    fn test_reencode_rejects_sca_longer_than_pdu() {
        let mut input = b"+CMT:2\r\n".to_vec();
        input.extend_from_slice(&[0x10, 0x01]);
        assert!(reencode(&input).is_err());
    }

    #[test]
    fn test_reencode_rejects_empty_pdu_region() {
        assert!(reencode(b"+CMT:0\r\n").is_err());
    }

    #[test]
    fn test_oversized_input_is_truncated_not_crashed() {
        let mut input = b"+CMT:900\r\n".to_vec();
        input.push(0x00);
        input.extend(std::iter::repeat(0x55u8).take(1000));

        let out = reencode(&input).unwrap();

        assert!(out.len() <= SCRATCH_CAPACITY);
        assert!(out.ends_with(b"\r\n"));
    }

    #[test]
    fn test_header_filling_scratch_is_rejected() {
        // 510-byte header: no hex pair fits, so the notification is
        // refused instead of emitting a header with no PDU region.
        let mut input = b"+CMT:1".to_vec();
        input.extend(std::iter::repeat(b'x').take(502));
        input.extend_from_slice(b"\r\n");
        input.extend_from_slice(&[0x00, 0xAA]);

        assert!(reencode(&input).is_err());
    }

    #[test]
    fn test_single_pair_fits_at_scratch_boundary() {
        // 508-byte header leaves room for exactly one hex pair plus
        // the CR/LF terminator.
        let mut input = b"+CMT:1".to_vec();
        input.extend(std::iter::repeat(b'x').take(500));
        input.extend_from_slice(b"\r\n");
        input.extend_from_slice(&[0x00, 0xAA]);

        let out = reencode(&input).unwrap();

        assert_eq!(out.len(), SCRATCH_CAPACITY);
        assert!(out.ends_with(b"00\r\n"));
    }

    #[test]
    fn test_round_trip_preserves_pdu_bytes() {
        for len in [2usize, 17, 60, 128] {
            let mut pdu: Vec<u8> = (0..len).map(|i| (i * 31 + 7) as u8).collect();
            pdu[0] = (len as u8 / 2).min(len as u8 - 1);
            let mut input = b"+CMT:999\r\n".to_vec();
            input.extend_from_slice(&pdu);

            let out = reencode(&input).unwrap();
            let header_end = out.iter().position(|&b| b == b'\n').unwrap() + 1;
            let hex_region = &out[header_end..out.len() - 2];
            assert_eq!(hex_to_bytes(hex_region), pdu, "pdu length {}", len);
        }
    }
}
