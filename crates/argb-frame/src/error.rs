//! argb-frame エラー型

/// フレーミング層のエラー
///
/// どのエラーもそのフレームだけを破棄すれば回復できる。
/// 次の区切り文字で同期が自動的に戻るため、セッションは継続する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// フレームが短すぎて CRC を含められない（区切り文字間 1〜4 バイト）
    TooShort { len: usize },
    /// COBS ブロックがフレーム末尾を越えている
    TruncatedBlock { offset: usize, code: u8 },
    /// COBS 符号化されたデータに 0x00 が含まれている
    UnexpectedDelimiter { offset: usize },
    /// 受信 CRC と計算した CRC が一致しない
    ChecksumMismatch { expected: u32, received: u32 },
    /// 最大フレーム長を超えた（len はフレーム全体の長さ）
    Overflow { len: usize },
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrameError::TooShort { len } => {
                write!(f, "Frame too short for checksum ({} bytes)", len)
            }
            FrameError::TruncatedBlock { offset, code } => write!(
                f,
                "COBS block at offset {} (code 0x{:02x}) runs past end of frame",
                offset, code
            ),
            FrameError::UnexpectedDelimiter { offset } => {
                write!(f, "Unexpected zero byte at offset {} in stuffed frame", offset)
            }
            FrameError::ChecksumMismatch { expected, received } => write!(
                f,
                "Checksum mismatch: received 0x{:08x}, expected 0x{:08x}",
                received, expected
            ),
            FrameError::Overflow { len } => {
                write!(f, "Frame exceeds maximum length ({} bytes)", len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}
