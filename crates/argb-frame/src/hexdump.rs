//! ログ出力用の 16 進ダンプ

/// バイト列を `0a-ff-00` 形式で表示するラッパー
///
/// 割り当てなしで `tracing` のフィールドや `format!` に渡せる。
#[derive(Clone, Copy)]
pub struct HexDump<'a>(pub &'a [u8]);

impl core::fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl core::fmt::Debug for HexDump<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self, f)
    }
}
