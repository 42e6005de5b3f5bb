//! ファームウェアのログコードとメモリ計測値の解釈

use crate::messages::StackMeasurement;

/// ファームウェアが `Log.id` に載せるコード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum LogCode {
    /// 受信バッファあふれ
    Overflow = 1,
    /// CRC を含められない短いフレーム
    TooShort = 2,
    InvalidCrc = 3,
    ProtobufDecode = 4,
    ProtobufEncode = 5,
    NoCallbackAssigned = 6,
    UnknownMessage = 7,
    SetLight = 8,
    /// 起動完了
    Ready = 9,
}

impl LogCode {
    pub fn from_id(id: u32) -> Option<Self> {
        Some(match id {
            1 => LogCode::Overflow,
            2 => LogCode::TooShort,
            3 => LogCode::InvalidCrc,
            4 => LogCode::ProtobufDecode,
            5 => LogCode::ProtobufEncode,
            6 => LogCode::NoCallbackAssigned,
            7 => LogCode::UnknownMessage,
            8 => LogCode::SetLight,
            9 => LogCode::Ready,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            LogCode::Overflow => "overflow",
            LogCode::TooShort => "too_short",
            LogCode::InvalidCrc => "invalid_crc",
            LogCode::ProtobufDecode => "protobuf_decode",
            LogCode::ProtobufEncode => "protobuf_encode",
            LogCode::NoCallbackAssigned => "no_callback_assigned",
            LogCode::UnknownMessage => "unknown_message",
            LogCode::SetLight => "set_light",
            LogCode::Ready => "ready",
        }
    }
}

/// `(start << 16) | end` に詰めた 16 bit 値の組
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StackPair {
    pub start: u16,
    pub end: u16,
}

impl StackPair {
    pub const fn unpack(value: u32) -> Self {
        StackPair {
            start: (value >> 16) as u16,
            end: value as u16,
        }
    }
}

/// `StackMeasurement` を展開したもの
///
/// | フィールド | start               | end                 |
/// |-----------|---------------------|---------------------|
/// | data      | `__data_start`      | `__data_end`        |
/// | bss       | `__bss_start`       | `__bss_end`         |
/// | heap      | `__malloc_heap_start` | `__malloc_heap_end` |
/// | gap       | `__brkval`          | `__malloc_margin`   |
/// | stack     | SP                  | RAMEND              |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackReport {
    /// 計測地点
    pub id: u32,
    pub data: StackPair,
    pub bss: StackPair,
    pub heap: StackPair,
    pub gap: StackPair,
    pub stack: StackPair,
}

impl From<&StackMeasurement> for StackReport {
    fn from(m: &StackMeasurement) -> Self {
        StackReport {
            id: m.id,
            data: StackPair::unpack(m.data),
            bss: StackPair::unpack(m.bss),
            heap: StackPair::unpack(m.heap),
            gap: StackPair::unpack(m.heap_gap),
            stack: StackPair::unpack(m.stack),
        }
    }
}

impl StackReport {
    /// 名前付きの 16 bit 値を列挙する（集計用）
    pub fn fields(&self) -> [(&'static str, u16); 10] {
        [
            ("data.start", self.data.start),
            ("data.end", self.data.end),
            ("bss.start", self.bss.start),
            ("bss.end", self.bss.end),
            ("heap.start", self.heap.start),
            ("heap.end", self.heap.end),
            ("gap.start", self.gap.start),
            ("gap.end", self.gap.end),
            ("stack.start", self.stack.start),
            ("stack.end", self.stack.end),
        ]
    }
}
