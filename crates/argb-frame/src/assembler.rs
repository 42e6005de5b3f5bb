//! 区切り文字によるパケット検出
//!
//! 任意の境界で届くバイト列のチャンクを受け取り、区切り文字 (`0x00`) で
//! 囲まれたフレームを取り出す。末尾の不完全なフレームは次の呼び出しまで保持する。
//!
//! ## 検出ポリシー
//! ```text
//! 長さ 0      → 何も報告しない（連続した区切り文字）
//! 長さ 1..=4  → TooShort を 1 件報告（デコードしない）
//! 長さ 5 以上 → Frame として返す（COBS/CRC の検証は packet::open が行う）
//! 最大長超過  → 次の区切り文字まで読み捨て、閉じた時点で Overflow を 1 件報告
//! ```
//!
//! どの報告も区切り文字を見た時点で行うため、チャンクの分け方によらず
//! 同じイベント列になる。
//!
//! ブロックしない純粋な変換なので、ポーリングループからも
//! データ到着コールバックからも同じように呼び出せる。

use alloc::vec::Vec;

use crate::{DEFAULT_MAX_FRAME_LEN, DELIMITER, MIN_FRAME_LEN};

/// `PacketAssembler::push` が返すイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblerEvent {
    /// 区切り文字で囲まれた候補フレーム（区切り文字は含まない）
    Frame(Vec<u8>),
    /// CRC を含められない長さのフレーム（ログ用にバイト列を保持）
    TooShort(Vec<u8>),
    /// 最大長を超えたため破棄したフレームの長さ
    Overflow { len: usize },
}

/// パケット検出器
///
/// 持ち越しバッファだけが呼び出し間で保持される状態。
pub struct PacketAssembler {
    /// 前回の呼び出しから持ち越した不完全なフレーム
    buffer: Vec<u8>,
    /// false の間は最初の区切り文字までを読み捨てる
    synced: bool,
    /// 1 フレームの最大バイト数
    max_frame_len: usize,
    /// 最大長を超えて読み捨て中のフレームの、ここまでの長さ
    overflow: Option<usize>,
    /// 同期待ち・最大長超過で読み捨てた総バイト数（統計用）
    discarded: u64,
}

impl PacketAssembler {
    /// 同期済みの検出器を生成する（先頭のバイトからフレームとして扱う）
    pub fn new() -> Self {
        Self::with_max_frame_len(DEFAULT_MAX_FRAME_LEN)
    }

    /// 最大フレーム長を指定して生成する
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        PacketAssembler {
            buffer: Vec::new(),
            synced: true,
            max_frame_len: max_frame_len.max(MIN_FRAME_LEN),
            overflow: None,
            discarded: 0,
        }
    }

    /// 未同期の検出器を生成する
    ///
    /// 送信中のデバイスに途中から接続した場合に使う。最初の区切り文字までの
    /// バイト（区切り文字を含む）は前のフレームの残りとして読み捨てる。
    pub fn unsynced(max_frame_len: usize) -> Self {
        let mut assembler = Self::with_max_frame_len(max_frame_len);
        assembler.synced = false;
        assembler
    }

    /// 受信したチャンクを追加し、完成したフレームのイベント列を返す
    ///
    /// # 引数
    /// - `chunk`: 新しく届いたバイト列（長さ・境界は任意）
    ///
    /// # 戻り値
    /// 受信順のイベント列。フレームがまだ揃っていなければ空。
    pub fn push(&mut self, chunk: &[u8]) -> Vec<AssemblerEvent> {
        let mut events = Vec::new();
        let mut rest = chunk;

        if !self.synced {
            match rest.iter().position(|&b| b == DELIMITER) {
                Some(pos) => {
                    self.discarded += pos as u64;
                    self.synced = true;
                    rest = &rest[pos + 1..];
                }
                None => {
                    self.discarded += rest.len() as u64;
                    return events;
                }
            }
        }

        let mut parts = rest.split(|&b| b == DELIMITER);
        // split は最低 1 要素を返す。最後の要素は区切り文字で閉じていない
        let tail = parts.next_back().unwrap_or(&[]);

        for part in parts {
            if let Some(len) = self.overflow.take() {
                self.discarded += part.len() as u64;
                events.push(AssemblerEvent::Overflow {
                    len: len + part.len(),
                });
                continue;
            }
            self.buffer.extend_from_slice(part);
            let frame = core::mem::take(&mut self.buffer);
            self.classify(frame, &mut events);
        }

        match self.overflow.as_mut() {
            Some(len) => {
                *len += tail.len();
                self.discarded += tail.len() as u64;
            }
            None => {
                self.buffer.extend_from_slice(tail);
                if self.buffer.len() > self.max_frame_len {
                    // 閉じていないまま最大長を超えた: 区切り文字まで数えるだけにする
                    let len = self.buffer.len();
                    self.discarded += len as u64;
                    self.buffer = Vec::new();
                    self.overflow = Some(len);
                }
            }
        }

        events
    }

    /// 区切り文字で閉じたフレームを分類する
    fn classify(&mut self, frame: Vec<u8>, events: &mut Vec<AssemblerEvent>) {
        match frame.len() {
            0 => {}
            len if len < MIN_FRAME_LEN => events.push(AssemblerEvent::TooShort(frame)),
            len if len > self.max_frame_len => {
                self.discarded += len as u64;
                events.push(AssemblerEvent::Overflow { len });
            }
            _ => events.push(AssemblerEvent::Frame(frame)),
        }
    }

    /// 最初の区切り文字を既に見たか
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// 持ち越しバッファのバイト数
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// 読み捨てた総バイト数
    pub fn discarded_bytes(&self) -> u64 {
        self.discarded
    }

    /// 最大長を超えたフレームを読み捨て中か
    pub fn is_overflowing(&self) -> bool {
        self.overflow.is_some()
    }
}

impl Default for PacketAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn frames(events: &[AssemblerEvent]) -> Vec<Vec<u8>> {
        events
            .iter()
            .filter_map(|e| match e {
                AssemblerEvent::Frame(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_frame() {
        let mut assembler = PacketAssembler::new();
        let events = assembler.push(&[1, 2, 3, 4, 5, 0]);
        assert_eq!(events, vec![AssemblerEvent::Frame(vec![1, 2, 3, 4, 5])]);
        assert_eq!(assembler.buffered_len(), 0);
    }

    #[test]
    fn test_partial_frame_carried_over() {
        let mut assembler = PacketAssembler::new();
        assert!(assembler.push(&[1, 2, 3]).is_empty());
        assert_eq!(assembler.buffered_len(), 3);

        let events = assembler.push(&[4, 5, 0, 6]);
        assert_eq!(frames(&events), vec![vec![1, 2, 3, 4, 5]]);
        assert_eq!(assembler.buffered_len(), 1);
    }

    #[test]
    fn test_multiple_frames_in_one_chunk() {
        let mut assembler = PacketAssembler::new();
        let events = assembler.push(&[1, 1, 1, 1, 1, 0, 2, 2, 2, 2, 2, 0]);
        assert_eq!(frames(&events), vec![vec![1; 5], vec![2; 5]]);
    }

    #[test]
    fn test_empty_frames_are_silent() {
        let mut assembler = PacketAssembler::new();
        let events = assembler.push(&[0, 0, 0]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_too_short_frames_reported_once() {
        for len in 1..=4usize {
            let mut assembler = PacketAssembler::new();
            let mut chunk = vec![7u8; len];
            chunk.push(0);
            let events = assembler.push(&chunk);
            assert_eq!(events, vec![AssemblerEvent::TooShort(vec![7u8; len])]);
        }
    }

    #[test]
    fn test_unsynced_discards_leading_partial_frame() {
        let mut assembler = PacketAssembler::unsynced(DEFAULT_MAX_FRAME_LEN);
        assert!(!assembler.is_synced());

        // 途中から接続: [9 9 9] は前のフレームの残り
        let events = assembler.push(&[9, 9, 9, 0, 1, 2, 3, 4, 5, 0]);
        assert!(assembler.is_synced());
        assert_eq!(frames(&events), vec![vec![1, 2, 3, 4, 5]]);
        assert_eq!(assembler.discarded_bytes(), 3);
    }

    #[test]
    fn test_unsynced_without_delimiter_keeps_discarding() {
        let mut assembler = PacketAssembler::unsynced(DEFAULT_MAX_FRAME_LEN);
        assert!(assembler.push(&[1, 2, 3, 4, 5, 6]).is_empty());
        assert!(!assembler.is_synced());
        assert_eq!(assembler.buffered_len(), 0);

        let events = assembler.push(&[7, 0, 1, 1, 1, 1, 1, 0]);
        assert_eq!(frames(&events), vec![vec![1; 5]]);
    }

    #[test]
    fn test_overflow_reported_when_frame_closes() {
        let mut assembler = PacketAssembler::with_max_frame_len(8);
        assert!(assembler.push(&[1u8; 12]).is_empty());
        assert!(assembler.is_overflowing());
        assert_eq!(assembler.buffered_len(), 0);

        // 区切り文字で閉じた時点でフレーム全体の長さを報告し、後続は正常に検出
        let events = assembler.push(&[1, 1, 0, 3, 3, 3, 3, 3, 0]);
        assert_eq!(
            events,
            vec![
                AssemblerEvent::Overflow { len: 14 },
                AssemblerEvent::Frame(vec![3; 5]),
            ]
        );
        assert!(!assembler.is_overflowing());
        assert_eq!(assembler.discarded_bytes(), 14);
    }

    #[test]
    fn test_overflow_length_independent_of_chunking() {
        let mut stream = vec![1u8; 12];
        stream.push(0);
        stream.extend_from_slice(&[5, 5, 5, 5, 5, 0]);

        let mut whole = PacketAssembler::with_max_frame_len(8);
        let expected = whole.push(&stream);
        assert_eq!(
            expected,
            vec![
                AssemblerEvent::Overflow { len: 12 },
                AssemblerEvent::Frame(vec![5; 5]),
            ]
        );

        let mut bytewise = PacketAssembler::with_max_frame_len(8);
        let mut actual = Vec::new();
        for byte in &stream {
            actual.extend(bytewise.push(core::slice::from_ref(byte)));
        }
        assert_eq!(actual, expected);
        assert_eq!(bytewise.discarded_bytes(), whole.discarded_bytes());
    }

    #[test]
    fn test_oversized_closed_frame_reported_as_overflow() {
        let mut assembler = PacketAssembler::with_max_frame_len(8);
        let mut chunk = vec![4u8; 10];
        chunk.push(0);
        chunk.extend_from_slice(&[5, 5, 5, 5, 5, 0]);

        let events = assembler.push(&chunk);
        assert_eq!(
            events,
            vec![
                AssemblerEvent::Overflow { len: 10 },
                AssemblerEvent::Frame(vec![5; 5]),
            ]
        );
        assert!(assembler.is_synced());
    }

    #[test]
    fn test_byte_by_byte_matches_whole() {
        let stream = [0u8, 1, 2, 3, 4, 5, 0, 0, 9, 0, 6, 6, 6, 6, 6, 6, 0, 7];

        let mut whole = PacketAssembler::new();
        let expected = whole.push(&stream);

        let mut incremental = PacketAssembler::new();
        let mut actual = Vec::new();
        for byte in stream {
            actual.extend(incremental.push(&[byte]));
        }

        assert_eq!(actual, expected);
        assert_eq!(incremental.buffered_len(), whole.buffered_len());
    }
}
