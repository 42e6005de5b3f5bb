//! # argb-session
//!
//! ARGB コントローラとのプロトコルセッション。
//!
//! フレーミング (`argb-frame`) とメッセージ振り分け (`argb-proto`) を束ね、
//! 準備完了の待ち合わせ・デリゲートへの配送・終了処理を行う。
//!
//! ## セッションの状態遷移
//!
//! ```text
//! Connecting ──最初の 0x00──► AwaitingReady ──Log{id: 9}──► Ready
//!     │                            │                          │
//!     └────────────────────────────┴──────────────────────────┴──► Terminated
//!        (デリゲートの停止要求 / 接続断 / 割り込み / I/O エラー)
//! ```
//!
//! ## ドライバ
//!
//! `Session` 自体は I/O を持たない状態機械で、バイト列を渡されて進む。
//! 実際の読み書きループは次のどちらかが担当する。
//!
//! - `driver::blocking::run_blocking`: ポーリング（データがなければ短く sleep）
//! - `driver::reactor::run_reactor`: tokio でチャンク到着を待つ（feature `tokio`）
//!
//! ブラウザでは `argb-wasm` の `ArgbClient` が JS のイベントループから同じ状態機械を駆動する。

pub mod config;
pub mod delegate;
pub mod driver;
pub mod error;
pub mod link;
pub mod monitor;
pub mod session;

pub use config::SessionConfig;
pub use delegate::{Delegate, DelegateError, DelegateResult};
pub use error::{SessionError, TerminationReason};
pub use link::{ByteSink, ByteSource, Incoming, IoLink};
pub use monitor::{FieldRange, StackMonitor, StackSummary};
pub use session::{Flow, Outbox, Session, SessionReport, SessionState, SessionStats};

pub use argb_proto::{Ahds, Command, DebugMessage, Message, ProtoError, Response, Rgb, SetLightCommand};
