//! ArgbClient wasm-bindgen エクスポート
//!
//! ブラウザの Web Serial から呼び出す ARGB クライアントの主エントリポイント。
//! JS のイベントループがチャンク到着ごとに `receive` を呼び、
//! 書き込み可能になったら `takeOutgoing` の結果をポートへ書く。

use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;

use argb_proto::{Ahds, Rgb, SetLightCommand};
use argb_session::{Session, SessionConfig, SessionState, TerminationReason};
use argb_stream::WriteQueue;

use crate::events::EventCollector;

/// ARGB クライアントセッション
///
/// ## 内部アーキテクチャ
///
/// ```text
/// ArgbClient
///   ├── Session<WriteQueue> (argb-session) - 準備完了待ち・振り分け
///   │     ├── PacketAssembler (argb-frame) - 区切り検出・COBS・CRC
///   │     └── WriteQueue      (argb-stream) - 送信キュー・pause/resume
///   └── EventCollector        - イベントを JSON 文字列で溜める
/// ```
///
/// ## スレッド安全性
///
/// WASM はシングルスレッドのため、JS からは単一スレッドで呼び出される前提。
#[wasm_bindgen]
pub struct ArgbClient {
    session: Session<WriteQueue>,
    events: EventCollector,
}

#[wasm_bindgen]
impl ArgbClient {
    /// クライアントを初期化する
    ///
    /// # 引数
    /// - `config_json`: `SessionConfig` の JSON。省略時はすべてデフォルト値。
    ///
    /// # エラー
    /// - JSON の解析失敗
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ArgbClient, JsError> {
        let config = match config_json {
            Some(json) => SessionConfig::from_json(&json)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?,
            None => SessionConfig::default(),
        };
        Ok(ArgbClient {
            session: Session::new(WriteQueue::new(), config),
            events: EventCollector::new(),
        })
    }

    /// 受信したチャンクを処理し、発生したイベント（JSON 文字列）の配列を返す
    ///
    /// # 引数
    /// - `chunk`: `reader.read()` で得た Uint8Array
    pub fn receive(&mut self, chunk: &[u8]) -> Array {
        self.session.receive(chunk, &mut self.events);
        self.drain_events()
    }

    /// ライトを設定する（`commit` までは反映されない）
    ///
    /// 色は `0xRRGGBB`、`ahds` は `0xAAHHDDSS`。代替色の省略時は主色と同じ。
    #[wasm_bindgen(js_name = "setLight")]
    #[allow(clippy::too_many_arguments)]
    pub fn set_light(
        &mut self,
        id: u32,
        start: u16,
        end: u16,
        start_color: u32,
        end_color: u32,
        ahds: u32,
        start_color_alt: Option<u32>,
        end_color_alt: Option<u32>,
    ) -> Result<(), JsError> {
        let start_color = Rgb::from_packed(start_color);
        let end_color = Rgb::from_packed(end_color);
        let light = SetLightCommand::new(id, start, end, start_color, end_color, Ahds::from_packed(ahds))
            .with_alt_colors(
                start_color_alt.map_or(start_color, Rgb::from_packed),
                end_color_alt.map_or(end_color, Rgb::from_packed),
            );
        self.session.outbox().set_light(light).map_err(to_js_error)
    }

    /// 送信済みの SetLight を `timestamp_delta` 後に適用させる
    pub fn commit(&mut self, timestamp_delta: u32) -> Result<(), JsError> {
        self.session.outbox().commit(timestamp_delta).map_err(to_js_error)
    }

    /// デバイスの現在時刻を要求する（応答は `current_time` イベント）
    #[wasm_bindgen(js_name = "currentTimeRequest")]
    pub fn current_time_request(&mut self) -> Result<(), JsError> {
        self.session.outbox().current_time_request().map_err(to_js_error)
    }

    /// ポートへ書き込むバイト列を取り出す（一時停止中は空）
    #[wasm_bindgen(js_name = "takeOutgoing")]
    pub fn take_outgoing(&mut self) -> Uint8Array {
        let data = self.session.link_mut().take_ready();
        let arr = Uint8Array::new_with_length(data.len() as u32);
        arr.copy_from(&data);
        arr
    }

    /// 送信を一時停止する（書き込み側が詰まったとき）
    pub fn pause(&mut self) {
        self.session.link_mut().pause();
    }

    pub fn resume(&mut self) {
        self.session.link_mut().resume();
    }

    #[wasm_bindgen(js_name = "isPaused")]
    pub fn is_paused(&self) -> bool {
        self.session.link().is_paused()
    }

    /// セッションを終了する（`completed` イベントを含む配列を返す）
    pub fn close(&mut self) -> Array {
        self.session.close(&mut self.events, TerminationReason::Interrupted);
        self.drain_events()
    }

    /// 現在の状態（`connecting` / `awaiting_ready` / `ready` / `terminated`）
    pub fn state(&self) -> String {
        state_name(self.session.state()).to_string()
    }

    /// セッション統計を JSON 文字列で返す
    ///
    /// ```json
    /// {
    ///   "state": "ready",
    ///   "session": { "frames_sent": 4, "frames_received": 12, ... },
    ///   "queue": { "written": 96, "taken": 96, "held": 0 },
    ///   "pending_bytes": 0,
    ///   "paused": false
    /// }
    /// ```
    #[wasm_bindgen(js_name = "getStats")]
    pub fn get_stats(&self) -> String {
        let queue = self.session.link();
        let q = queue.stats();
        serde_json::json!({
            "state": state_name(self.session.state()),
            "session": self.session.stats(),
            "queue": { "written": q.written, "taken": q.taken, "held": q.held },
            "pending_bytes": queue.pending_len(),
            "paused": queue.is_paused(),
        })
        .to_string()
    }
}

impl ArgbClient {
    fn drain_events(&mut self) -> Array {
        let result = Array::new();
        for event in self.events.take() {
            result.push(&JsValue::from_str(&event));
        }
        result
    }
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Connecting => "connecting",
        SessionState::AwaitingReady => "awaiting_ready",
        SessionState::Ready => "ready",
        SessionState::Terminated => "terminated",
    }
}

fn to_js_error(e: argb_session::SessionError) -> JsError {
    JsError::new(&e.to_string())
}
