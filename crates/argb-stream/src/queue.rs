//! 送信キュー実装

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// 送信キューの統計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueStats {
    /// write された総バイト数
    pub written: u64,
    /// take_ready で渡した総バイト数
    pub taken: u64,
    /// pause 中に take_ready が空を返した回数
    pub held: u64,
}

/// 送信キュー
///
/// ## 責任
/// - セッションが書き込んだフレームを書き込み順に保持する
/// - `flush` されるまでは取り出させない
/// - 一時停止中は取り出させず、データも捨てない
///
/// ポートへの実際の書き込みは呼び出し側（reactor ドライバや wasm クライアント）が行う。
pub struct WriteQueue {
    /// 送信待ちバイト列
    pending: VecDeque<u8>,
    /// pending の先頭から flush 済みのバイト数
    committed: usize,
    paused: bool,
    stats: QueueStats,
}

impl WriteQueue {
    pub fn new() -> Self {
        WriteQueue {
            pending: VecDeque::new(),
            committed: 0,
            paused: false,
            stats: QueueStats::default(),
        }
    }

    /// 送信データを積む（`flush` までは取り出し対象にならない）
    pub fn write(&mut self, data: &[u8]) {
        self.pending.extend(data.iter().copied());
        self.stats.written += data.len() as u64;
    }

    /// ここまでに積んだデータを取り出し可能にする
    pub fn flush(&mut self) {
        self.committed = self.pending.len();
    }

    /// 送信を一時停止する（相手側のバッファが詰まったとき）
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// 送信を再開する
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 送信可能なバイト列を取り出す
    ///
    /// 一時停止中、または flush 済みデータがない場合は空の Vec を返し、
    /// キューの内容は変更しない。
    pub fn take_ready(&mut self) -> Vec<u8> {
        if self.paused {
            if self.committed > 0 {
                self.stats.held += 1;
            }
            return Vec::new();
        }
        let ready: Vec<u8> = self.pending.drain(..self.committed).collect();
        self.committed = 0;
        self.stats.taken += ready.len() as u64;
        ready
    }

    /// 取り出せるデータがあるか（一時停止中は false）
    pub fn has_ready(&self) -> bool {
        !self.paused && self.committed > 0
    }

    /// キューに残っているバイト数（未 flush 分を含む）
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }
}

impl Default for WriteQueue {
    fn default() -> Self {
        Self::new()
    }
}
