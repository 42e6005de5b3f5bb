//! # argb-proto
//!
//! ARGB コントローラのメッセージスキーマ (Protobuf) と、
//! 送信コマンドの構築・受信ペイロードの振り分けを行う。
//!
//! ## メッセージの種類
//!
//! ```text
//! host → device : Request       (SetLight / CommitTransaction / current_time_request)
//! device → host : Response      (Log / StackMeasurement / CurrentTime)
//!                 DebugMessage  (id + 説明文字列)
//! ```
//!
//! 受信側のペイロードには型タグが付かないため、`dispatch` が
//! Response → DebugMessage の順にデコードを試し、最初に成功したものを採用する。
//!
//! ## 準備完了シグナル
//!
//! デバイスは起動時に `Response { log: Log { id: 9 } }` (`LogCode::Ready`) を送る。
//! 専用のワイヤ型はなく、内容で判定する。

#![no_std]
extern crate alloc;

pub mod command;
pub mod dispatch;
pub mod error;
pub mod messages;
pub mod telemetry;

pub use command::{Ahds, Command, Rgb, SetLightCommand};
pub use dispatch::{Message, MessageKind, DISPATCH_ORDER};
pub use error::ProtoError;
pub use messages::{request, response};
pub use messages::{
    CommitTransaction, CurrentTime, DebugMessage, Log, Request, Response, SetLight,
    StackMeasurement,
};
pub use telemetry::{LogCode, StackPair, StackReport};

/// デバイスが準備完了時に送る Log の id
pub const READY_LOG_ID: u32 = LogCode::Ready as u32;
