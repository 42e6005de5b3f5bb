//! argb-proto エラー型

use crate::dispatch::MessageKind;

/// ペイロードのデコードエラー
#[derive(Debug, Clone, PartialEq)]
pub enum ProtoError {
    /// 指定した型として Protobuf デコードに失敗した
    DecodeFailed {
        kind: MessageKind,
        source: prost::DecodeError,
    },
    /// 振り分け候補が 1 つもなかった
    NoCandidate,
}

impl core::fmt::Display for ProtoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtoError::DecodeFailed { kind, source } => {
                write!(f, "Proto decode as {} failed: {}", kind.name(), source)
            }
            ProtoError::NoCandidate => write!(f, "No message kind to decode payload as"),
        }
    }
}
