//! argb-session エラー型

use serde::Serialize;
use thiserror::Error;

use crate::session::SessionState;

/// セッション操作のエラー
#[derive(Debug, Error)]
pub enum SessionError {
    /// ポートへの読み書きに失敗した
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 設定 JSON の読み込みに失敗した
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// 準備完了前に送信しようとした
    #[error("Session not ready (state: {state:?})")]
    NotReady { state: SessionState },

    /// 終了済みのセッションを操作した
    #[error("Session terminated")]
    Terminated,
}

/// `Result` の別名
pub type Result<T> = std::result::Result<T, SessionError>;

/// セッションが終了した理由
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TerminationReason {
    /// デリゲートが `process` で true を返した
    DelegateStopped,
    /// 接続が閉じられた（読み込みが 0 バイトを返した）
    ConnectionClosed,
    /// 外部からの割り込み（Ctrl-C やシャットダウン要求）
    Interrupted,
    /// 回復できないローカルエラー
    LocalError(String),
}

impl core::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TerminationReason::DelegateStopped => write!(f, "stopped by delegate"),
            TerminationReason::ConnectionClosed => write!(f, "connection closed"),
            TerminationReason::Interrupted => write!(f, "interrupted"),
            TerminationReason::LocalError(e) => write!(f, "local error: {}", e),
        }
    }
}
