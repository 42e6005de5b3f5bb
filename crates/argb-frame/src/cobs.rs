//! COBS (Consistent Overhead Byte Stuffing)
//!
//! 区切り文字 `0x00` を出力から取り除く可逆変換。
//!
//! ## 符号化
//! ```text
//! 入力:  [11 22 00 33]
//! 出力:  [03 11 22 02 33]
//!         ↑ コードバイト = 次の 0x00 までの距離（最大 0xFF = 254 バイト非ゼロ）
//! ```
//!
//! コード `0xFF` のブロックの後ろには暗黙の 0x00 を挿入しない。
//! オーバーヘッドは 254 バイトごとに最大 1 バイト（+ 先頭コード 1 バイト）。

use alloc::vec::Vec;

use crate::error::FrameError;

/// 1 ブロックの最大コード値（254 バイトの非ゼロデータ）
const MAX_CODE: u8 = 0xFF;

/// 符号化後の最大バイト数
pub fn max_encoded_len(len: usize) -> usize {
    len + len / 254 + 1
}

/// バイト列を COBS 符号化する（区切り文字は付けない）
///
/// 出力には `0x00` が一切含まれない。空入力は `[0x01]` になる。
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(max_encoded_len(data.len()));
    let mut code_index = 0;
    let mut code: u8 = 1;
    out.push(0); // コードバイトの予約

    for (i, &byte) in data.iter().enumerate() {
        if byte == 0 {
            out[code_index] = code;
            code_index = out.len();
            out.push(0);
            code = 1;
        } else {
            out.push(byte);
            code += 1;
            // 入力末尾で満杯になった場合は空ブロックを作らない
            if code == MAX_CODE && i + 1 < data.len() {
                out[code_index] = code;
                code_index = out.len();
                out.push(0);
                code = 1;
            }
        }
    }

    out[code_index] = code;
    out
}

/// COBS 符号化されたフレーム（区切り文字を除いたもの）を復元する
///
/// # エラー
/// - `FrameError::UnexpectedDelimiter`: 符号化データ中に 0x00 がある
/// - `FrameError::TruncatedBlock`: コードが示すブロックがフレーム末尾を越える
pub fn decode(data: &[u8]) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;

    while i < data.len() {
        let code = data[i];
        if code == 0 {
            return Err(FrameError::UnexpectedDelimiter { offset: i });
        }

        let end = i + code as usize;
        if end > data.len() {
            return Err(FrameError::TruncatedBlock { offset: i, code });
        }

        let block = &data[i + 1..end];
        if let Some(pos) = block.iter().position(|&b| b == 0) {
            return Err(FrameError::UnexpectedDelimiter { offset: i + 1 + pos });
        }
        out.extend_from_slice(block);
        i = end;

        // 最終ブロックと 0xFF ブロックの後ろには 0x00 を補わない
        if code < MAX_CODE && i < data.len() {
            out.push(0);
        }
    }

    Ok(out)
}
