//! 受信ペイロードの振り分け
//!
//! ペイロードには型情報がないため、候補の型を決まった順序でデコードし、
//! 最初に成功したものを採用する。すべて失敗した場合も `Message::DecodeFailure`
//! として値で返し、エラーを呼び出し側に伝播させない。
//!
//! ```text
//! payload ─► Response ─ok─► Message::Operational
//!              │err
//!              ▼
//!            DebugMessage ─ok─► Message::Diagnostic
//!              │err
//!              ▼
//!            Message::DecodeFailure { payload, error }
//! ```
//!
//! 注意: proto3 では既定値のフィールドが省略されるため、
//! `DebugMessage { id: 0, .. }` のように Response としても読めてしまう
//! ペイロードがある。順序は固定なので結果は決定的。

use alloc::vec::Vec;

use prost::Message as _;

use crate::error::ProtoError;
use crate::messages::{DebugMessage, Response};

/// 振り分け候補の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// 通常の応答 (`Response`)
    Operational,
    /// デバッグ出力 (`DebugMessage`)
    Diagnostic,
}

/// デコードを試す順序
pub const DISPATCH_ORDER: [MessageKind; 2] = [MessageKind::Operational, MessageKind::Diagnostic];

impl MessageKind {
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Operational => "Response",
            MessageKind::Diagnostic => "DebugMessage",
        }
    }

    /// この種類としてデコードを試みる
    pub fn try_decode(self, payload: &[u8]) -> Result<Message, ProtoError> {
        let fail = |source| ProtoError::DecodeFailed { kind: self, source };
        match self {
            MessageKind::Operational => Response::decode(payload)
                .map(Message::Operational)
                .map_err(fail),
            MessageKind::Diagnostic => DebugMessage::decode(payload)
                .map(Message::Diagnostic)
                .map_err(fail),
        }
    }
}

/// 検証済みペイロードの解釈結果
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Operational(Response),
    Diagnostic(DebugMessage),
    /// どの候補としても読めなかったペイロードと最後のエラー
    DecodeFailure { payload: Vec<u8>, error: ProtoError },
}

impl Message {
    /// `DISPATCH_ORDER` の順にデコードを試す
    pub fn decode(payload: &[u8]) -> Message {
        Self::decode_with(payload, &DISPATCH_ORDER)
    }

    /// 任意の候補順でデコードを試す
    pub fn decode_with(payload: &[u8], order: &[MessageKind]) -> Message {
        let mut error = ProtoError::NoCandidate;
        for kind in order {
            match kind.try_decode(payload) {
                Ok(message) => return message,
                Err(e) => error = e,
            }
        }
        Message::DecodeFailure {
            payload: payload.to_vec(),
            error,
        }
    }

    pub fn kind(&self) -> Option<MessageKind> {
        match self {
            Message::Operational(_) => Some(MessageKind::Operational),
            Message::Diagnostic(_) => Some(MessageKind::Diagnostic),
            Message::DecodeFailure { .. } => None,
        }
    }

    /// 準備完了シグナル（指定 id の Log を持つ Response）か
    pub fn is_readiness(&self, ready_log_id: u32) -> bool {
        match self {
            Message::Operational(response) => response.is_readiness(ready_log_id),
            _ => false,
        }
    }
}
