//! Protobuf メッセージ定義
//!
//! ファームウェア側の `.proto` と同じフィールド番号を prost の derive で直接定義する。
//! ビルド時に protoc を必要としない。
//!
//! ```text
//! Request  { oneof payload { SetLight = 1; CommitTransaction = 2; bool current_time_request = 3; } }
//! Response { oneof payload { Log = 1; StackMeasurement = 2; CurrentTime = 3; } }
//! DebugMessage { uint32 id = 1; string description = 2; }
//! ```

use alloc::string::String;

/// 1 本のライト（LED 範囲）のアニメーション設定
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SetLight {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    /// `(start << 16) | end`
    #[prost(uint32, tag = "2")]
    pub range: u32,
    /// `(r << 16) | (g << 8) | b`
    #[prost(uint32, tag = "3")]
    pub start_color: u32,
    #[prost(uint32, tag = "4")]
    pub end_color: u32,
    #[prost(uint32, tag = "5")]
    pub start_color_alt: u32,
    #[prost(uint32, tag = "6")]
    pub end_color_alt: u32,
    /// `(attack << 24) | (hold << 16) | (decay << 8) | sustain`
    #[prost(uint32, tag = "7")]
    pub ahds: u32,
}

/// 送信済みの SetLight を確定させる
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommitTransaction {
    /// 適用までの相対時間
    #[prost(uint32, tag = "1")]
    pub timestamp: u32,
}

/// host → device のリクエスト
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Request {
    #[prost(oneof = "request::Payload", tags = "1, 2, 3")]
    pub payload: Option<request::Payload>,
}

pub mod request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        SetLight(super::SetLight),
        #[prost(message, tag = "2")]
        CommitTransaction(super::CommitTransaction),
        #[prost(bool, tag = "3")]
        CurrentTimeRequest(bool),
    }
}

/// ファームウェアのログ（エラーコードや状態通知）
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Log {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(bool, tag = "2")]
    pub is_error: bool,
}

/// メモリ使用状況の計測値
///
/// 各フィールドは `(start << 16) | end` に詰めた 16 bit アドレスの組。
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StackMeasurement {
    /// 計測地点
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(uint32, tag = "2")]
    pub data: u32,
    #[prost(uint32, tag = "3")]
    pub bss: u32,
    #[prost(uint32, tag = "4")]
    pub heap: u32,
    #[prost(uint32, tag = "5")]
    pub heap_gap: u32,
    #[prost(uint32, tag = "6")]
    pub stack: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CurrentTime {
    #[prost(uint32, tag = "1")]
    pub timestamp: u32,
}

/// device → host の応答
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Response {
    #[prost(oneof = "response::Payload", tags = "1, 2, 3")]
    pub payload: Option<response::Payload>,
}

pub mod response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Payload {
        #[prost(message, tag = "1")]
        Log(super::Log),
        #[prost(message, tag = "2")]
        StackMeasurement(super::StackMeasurement),
        #[prost(message, tag = "3")]
        CurrentTime(super::CurrentTime),
    }
}

/// ファームウェアのデバッグ出力
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DebugMessage {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(string, tag = "2")]
    pub description: String,
}

impl Response {
    /// Log を持つ応答を作る
    pub fn log(id: u32, is_error: bool) -> Self {
        Response {
            payload: Some(response::Payload::Log(Log { id, is_error })),
        }
    }

    /// Log の id（Log 以外なら None）
    pub fn log_id(&self) -> Option<u32> {
        match &self.payload {
            Some(response::Payload::Log(log)) => Some(log.id),
            _ => None,
        }
    }

    /// 準備完了シグナルか
    pub fn is_readiness(&self, ready_log_id: u32) -> bool {
        self.log_id() == Some(ready_log_id)
    }

    pub fn stack_measurement(&self) -> Option<&StackMeasurement> {
        match &self.payload {
            Some(response::Payload::StackMeasurement(m)) => Some(m),
            _ => None,
        }
    }
}
