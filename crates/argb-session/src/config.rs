//! セッション設定

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// セッション設定
///
/// すべてのフィールドにデフォルト値があるため、JSON では必要なものだけ指定すればよい。
///
/// ```json
/// { "name": "strip-1", "enable_diagnostics": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// ログの span 名に使う識別子
    pub name: String,
    /// フレームごとの 16 進ダンプを debug ログに出す
    pub enable_diagnostics: bool,
    /// 準備完了シグナルとみなす Log の id
    pub ready_log_id: u32,
    /// 準備完了前に届いた DebugMessage もデリゲートに渡す
    pub debug_before_ready: bool,
    /// 受信フレームの最大長（区切り文字間のバイト数）
    pub max_frame_len: usize,
    /// ブロッキングドライバが受信データなしのときに待つ時間（ミリ秒）
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            name: "argb".to_string(),
            enable_diagnostics: false,
            ready_log_id: argb_proto::READY_LOG_ID,
            debug_before_ready: true,
            max_frame_len: argb_frame::DEFAULT_MAX_FRAME_LEN,
            poll_interval_ms: 5,
        }
    }
}

impl SessionConfig {
    /// JSON 文字列から読み込む
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
