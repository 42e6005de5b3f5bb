//! # argb-stream
//!
//! 送信バイト列のキューとフロー制御。
//!
//! イベント駆動の環境（tokio / ブラウザの Web Serial）では、セッションが書き込んだ
//! バイト列をすぐにはポートへ渡せない。`WriteQueue` がそれを保持し、
//! 書き込み側の準備ができたときに取り出させる。
//!
//! ## フロー制御
//!
//! ```text
//! session ─write/flush─► WriteQueue ─take_ready─► port
//!                           │
//!                  pause ───┤ 一時停止中は保持のみ（破棄しない）
//!                  resume ──┘ 再開後に書き込み順で 1 回だけ渡す
//! ```
//!
//! `flush` 済みのバイトだけが取り出し対象になるため、
//! 書きかけのフレームがポートに流れることはない。

#![no_std]
extern crate alloc;

pub mod queue;

pub use queue::{QueueStats, WriteQueue};
