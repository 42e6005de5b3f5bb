//! アプリケーション側のコールバック

use argb_frame::HexDump;
use argb_proto::{DebugMessage, ProtoError, Response};

use crate::session::{Outbox, SessionReport};

/// デリゲートが返すエラー（セッション境界でログに記録され、状態は変わらない）
pub type DelegateError = Box<dyn std::error::Error + Send + Sync>;

pub type DelegateResult<T = ()> = Result<T, DelegateError>;

/// セッションのイベントを受け取るアプリケーション
///
/// `outbox` 経由でコマンドを送信できる。コールバックがエラーを返しても
/// セッションは継続し、後続のメッセージも配送される。
pub trait Delegate {
    /// 準備完了シグナルを受け取った直後に 1 回だけ呼ばれる
    fn ready(&mut self, _outbox: &mut Outbox<'_>) -> DelegateResult {
        Ok(())
    }

    /// 準備完了後の Response ごとに呼ばれる
    ///
    /// `Ok(true)` を返すとセッションを終了する。
    fn process(&mut self, outbox: &mut Outbox<'_>, response: &Response) -> DelegateResult<bool>;

    /// DebugMessage ごとに呼ばれる
    fn debug(&mut self, _outbox: &mut Outbox<'_>, message: &DebugMessage) -> DelegateResult {
        tracing::info!(id = message.id, description = %message.description, "debug message");
        Ok(())
    }

    /// どの型としてもデコードできなかったペイロード
    fn anomaly(&mut self, _outbox: &mut Outbox<'_>, payload: &[u8], error: &ProtoError) -> DelegateResult {
        tracing::warn!(
            error = %error,
            len = payload.len(),
            payload = %HexDump(payload),
            "undecodable payload"
        );
        Ok(())
    }

    /// セッション終了時に 1 回だけ呼ばれる
    fn completed(&mut self, _report: &SessionReport) {}
}
