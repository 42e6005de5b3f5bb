//! セッションイベントの JSON 化
//!
//! JS 側には 1 イベント 1 JSON 文字列で渡す。`type` フィールドで種類を区別する。
//!
//! ```json
//! {"type":"ready"}
//! {"type":"log","id":2,"is_error":true,"code":"too_short"}
//! {"type":"stack_measurement","id":1,"data":[256,288],"bss":[...],...}
//! {"type":"current_time","timestamp":1234}
//! {"type":"debug","id":7,"description":"heap low"}
//! {"type":"anomaly","len":3,"error":"..."}
//! {"type":"completed","report":{"reason":{...},"stats":{...}}}
//! ```

use argb_proto::response::Payload;
use argb_proto::{DebugMessage, LogCode, ProtoError, Response, StackPair, StackReport};
use argb_session::{Delegate, DelegateResult, Outbox, SessionReport};
use serde_json::{json, Value};

/// セッションのイベントを JSON 文字列として溜めるデリゲート
///
/// `process` は常に継続を返す。停止は JS 側が `close` で決める。
#[derive(Default)]
pub struct EventCollector {
    events: Vec<String>,
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 溜まったイベントを取り出す
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    fn push(&mut self, event: Value) {
        self.events.push(event.to_string());
    }
}

fn pair(p: StackPair) -> Value {
    json!([p.start, p.end])
}

/// Response を JSON イベントに変換する
pub fn response_event(response: &Response) -> Value {
    match &response.payload {
        Some(Payload::Log(log)) => json!({
            "type": "log",
            "id": log.id,
            "is_error": log.is_error,
            "code": LogCode::from_id(log.id).map(LogCode::name),
        }),
        Some(Payload::StackMeasurement(m)) => {
            let r = StackReport::from(m);
            json!({
                "type": "stack_measurement",
                "id": r.id,
                "data": pair(r.data),
                "bss": pair(r.bss),
                "heap": pair(r.heap),
                "gap": pair(r.gap),
                "stack": pair(r.stack),
            })
        }
        Some(Payload::CurrentTime(t)) => json!({
            "type": "current_time",
            "timestamp": t.timestamp,
        }),
        None => json!({ "type": "empty" }),
    }
}

impl Delegate for EventCollector {
    fn ready(&mut self, _outbox: &mut Outbox<'_>) -> DelegateResult {
        self.push(json!({ "type": "ready" }));
        Ok(())
    }

    fn process(&mut self, _outbox: &mut Outbox<'_>, response: &Response) -> DelegateResult<bool> {
        self.push(response_event(response));
        Ok(false)
    }

    fn debug(&mut self, _outbox: &mut Outbox<'_>, message: &DebugMessage) -> DelegateResult {
        self.push(json!({
            "type": "debug",
            "id": message.id,
            "description": message.description,
        }));
        Ok(())
    }

    fn anomaly(&mut self, _outbox: &mut Outbox<'_>, payload: &[u8], error: &ProtoError) -> DelegateResult {
        self.push(json!({
            "type": "anomaly",
            "len": payload.len(),
            "error": error.to_string(),
        }));
        Ok(())
    }

    fn completed(&mut self, report: &SessionReport) {
        self.push(json!({ "type": "completed", "report": report }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argb_proto::{CurrentTime, StackMeasurement};

    #[test]
    fn test_log_event_names_code() {
        let event = response_event(&Response::log(2, true));
        assert_eq!(event["type"], "log");
        assert_eq!(event["code"], "too_short");
        assert_eq!(event["is_error"], true);

        let unknown = response_event(&Response::log(42, false));
        assert!(unknown["code"].is_null());
    }

    #[test]
    fn test_stack_measurement_event_unpacks_pairs() {
        let response = Response {
            payload: Some(Payload::StackMeasurement(StackMeasurement {
                id: 1,
                stack: 0x08F0_08FF,
                ..Default::default()
            })),
        };
        let event = response_event(&response);
        assert_eq!(event["stack"], json!([0x08F0, 0x08FF]));
        assert_eq!(event["data"], json!([0, 0]));
    }

    #[test]
    fn test_current_time_and_empty() {
        let time = Response {
            payload: Some(Payload::CurrentTime(CurrentTime { timestamp: 77 })),
        };
        assert_eq!(response_event(&time)["timestamp"], 77);
        assert_eq!(response_event(&Response::default())["type"], "empty");
    }
}
