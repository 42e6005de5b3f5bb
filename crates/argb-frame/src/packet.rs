//! パケットの封入と開封
//!
//! ## Wire Format
//! ```text
//! [cobs( payload || crc32_le(payload) )][0x00]
//! ```
//!
//! `seal` / `seal_frame` が送信側、`open` が受信側（区切り文字を除いたフレーム）。

use alloc::vec::Vec;

use crate::crc::crc32;
use crate::error::FrameError;
use crate::{cobs, CHECKSUM_LEN, DELIMITER, MIN_FRAME_LEN};

/// ペイロードに CRC を付加して COBS 符号化する（区切り文字なし）
///
/// 区切り文字は呼び出し側が別に書き込む。
pub fn seal(payload: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&crc32(payload).to_le_bytes());
    cobs::encode(&data)
}

/// `seal` の結果に区切り文字を付けた、そのまま送信できるバイト列を返す
pub fn seal_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = seal(payload);
    frame.push(DELIMITER);
    frame
}

/// 区切り文字間のフレームを復元し、CRC を検証してペイロードを返す
///
/// # 引数
/// - `frame`: 区切り文字を含まない COBS 符号化済みバイト列
///
/// # エラー
/// - `FrameError::TooShort`: フレームまたは復元後のデータが CRC を含めない長さ
/// - `FrameError::TruncatedBlock` / `FrameError::UnexpectedDelimiter`: COBS 不正
/// - `FrameError::ChecksumMismatch`: CRC 不一致
pub fn open(frame: &[u8]) -> Result<Vec<u8>, FrameError> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(FrameError::TooShort { len: frame.len() });
    }

    let mut data = cobs::decode(frame)?;
    if data.len() < CHECKSUM_LEN {
        return Err(FrameError::TooShort { len: data.len() });
    }

    let split = data.len() - CHECKSUM_LEN;
    let mut crc_bytes = [0u8; CHECKSUM_LEN];
    crc_bytes.copy_from_slice(&data[split..]);
    let received = u32::from_le_bytes(crc_bytes);

    data.truncate(split);
    let expected = crc32(&data);
    if received != expected {
        return Err(FrameError::ChecksumMismatch { expected, received });
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_seal_open_roundtrip() {
        let payload = vec![0x0a, 0x02, 0x08, 0x09];
        let sealed = seal(&payload);
        assert!(!sealed.contains(&DELIMITER));
        assert_eq!(open(&sealed).unwrap(), payload);
    }

    #[test]
    fn test_seal_frame_ends_with_delimiter() {
        let frame = seal_frame(b"abc");
        assert_eq!(frame.last(), Some(&DELIMITER));
        assert_eq!(frame.iter().filter(|&&b| b == DELIMITER).count(), 1);
    }

    #[test]
    fn test_checksum_is_little_endian() {
        let payload = b"123456789";
        let sealed = seal(payload);
        let decoded = cobs::decode(&sealed).unwrap();
        // 0xCBF43926 → 26 39 f4 cb
        assert_eq!(&decoded[payload.len()..], &[0x26, 0x39, 0xF4, 0xCB]);
    }

    #[test]
    fn test_empty_payload() {
        // CRC(空) = 0 → [00 00 00 00] → COBS で 5 バイト
        let sealed = seal(&[]);
        assert_eq!(sealed, vec![0x01, 0x01, 0x01, 0x01, 0x01]);
        assert_eq!(open(&sealed).unwrap(), vec![]);
    }

    #[test]
    fn test_open_too_short() {
        assert_eq!(open(&[0x01, 0x02, 0x03, 0x04]), Err(FrameError::TooShort { len: 4 }));
    }

    #[test]
    fn test_open_checksum_mismatch() {
        let mut data = b"hello".to_vec();
        data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        let frame = cobs::encode(&data);

        match open(&frame) {
            Err(FrameError::ChecksumMismatch { expected, received }) => {
                assert_eq!(received, 0xDEAD_BEEF);
                assert_eq!(expected, crc32(b"hello"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_open_single_bit_flip_rejected() {
        let sealed = seal(b"set_light");
        let decoded = cobs::decode(&sealed).unwrap();

        for bit in 0..decoded.len() * 8 {
            let mut corrupted = decoded.clone();
            corrupted[bit / 8] ^= 1 << (bit % 8);
            let frame = cobs::encode(&corrupted);
            assert!(
                matches!(open(&frame), Err(FrameError::ChecksumMismatch { .. })),
                "bit {} の反転が検出されない",
                bit
            );
        }
    }

    #[test]
    fn test_open_malformed_stuffing() {
        assert!(matches!(
            open(&[0x09, 0x01, 0x02, 0x03, 0x04]),
            Err(FrameError::TruncatedBlock { .. })
        ));
    }
}
