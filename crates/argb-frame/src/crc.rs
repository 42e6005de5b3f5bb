//! CRC-32 チェックサム
//!
//! ## パラメータ
//! ```text
//! width  = 32
//! poly   = 0x04C11DB7 (反転形 0xEDB88320)
//! refin  = true
//! refout = true
//! init   = 0xFFFFFFFF
//! xorout = 0xFFFFFFFF
//! ```
//!
//! ファームウェア側 (AceCRC crc32) と同じ値になる。
//! 計算は `crc32fast`（CRC-32/ISO-HDLC）に任せる。

/// インクリメンタルな CRC-32 計算器
///
/// 任意の位置で分割して `update` しても、一括計算と同じ値になる。
#[derive(Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
}

impl Crc32 {
    pub fn new() -> Self {
        Crc32 {
            hasher: crc32fast::Hasher::new(),
        }
    }

    /// バイト列を計算に加える
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    /// 最終値を返す（xorout 適用済み）
    ///
    /// 計算器は消費しないので、続けて `update` できる。
    pub fn finalize(&self) -> u32 {
        self.hasher.clone().finalize()
    }
}

/// バイト列全体の CRC-32 を計算する
///
/// 空入力は `init ^ xorout = 0x00000000` を返す。
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        // このパラメータセットの標準チェック値
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(crc32(&[]), 0x0000_0000);
        assert_eq!(Crc32::new().finalize(), 0x0000_0000);
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(crc32(&[0x00]), 0xD202_EF8D);
        assert_eq!(crc32(b"a"), 0xE8B7_BE43);
        assert_eq!(
            crc32(b"The quick brown fox jumps over the lazy dog"),
            0x414F_A339
        );
    }

    #[test]
    fn test_incremental_matches_oneshot() {
        let data: alloc::vec::Vec<u8> = (0u8..=255).collect();
        let expected = crc32(&data);

        for split in [0usize, 1, 7, 128, 255, 256] {
            let mut crc = Crc32::new();
            crc.update(&data[..split]);
            crc.update(&data[split..]);
            assert_eq!(crc.finalize(), expected, "split = {}", split);
        }
    }

    #[test]
    fn test_finalize_does_not_consume() {
        let mut crc = Crc32::new();
        crc.update(b"1234");
        let partial = crc.finalize();
        crc.update(b"56789");
        assert_eq!(partial, crc32(b"1234"));
        assert_eq!(crc.finalize(), 0xCBF4_3926);
    }
}
