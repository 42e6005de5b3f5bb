//! セッションの実行ループ
//!
//! どちらのドライバも同じ `Session` 状態機械を駆動し、終了時には
//! デリゲートの `completed` がちょうど 1 回呼ばれた後の `SessionReport` を返す。

pub mod blocking;
#[cfg(feature = "tokio")]
pub mod reactor;

pub use blocking::run_blocking;
#[cfg(feature = "tokio")]
pub use reactor::run_reactor;
