//! ポーリング方式のドライバ
//!
//! 1 スレッドでリンクを読み続ける。読めるデータがなければ
//! `poll_interval_ms` だけ sleep してから再試行する。

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::SessionConfig;
use crate::delegate::Delegate;
use crate::error::TerminationReason;
use crate::link::{ByteSink, ByteSource, Incoming};
use crate::session::{Flow, Session, SessionReport};

/// セッションが終了するまでリンクを読み続ける
///
/// # 引数
/// - `link`: 読み書きできる接続（終了時に解放される）
/// - `delegate`: アプリケーション
/// - `interrupt`: true になったら次の反復で `Interrupted` として終了する
pub fn run_blocking<L, D>(
    link: L,
    delegate: &mut D,
    config: SessionConfig,
    interrupt: &AtomicBool,
) -> SessionReport
where
    L: ByteSink + ByteSource,
    D: Delegate + ?Sized,
{
    let backoff = Duration::from_millis(config.poll_interval_ms);
    let mut session = Session::new(link, config);

    loop {
        if interrupt.load(Ordering::Relaxed) {
            return session.close(delegate, TerminationReason::Interrupted);
        }

        match session.link_mut().read_chunk() {
            Ok(Incoming::Data(chunk)) => {
                if session.receive(&chunk, delegate) == Flow::Stop {
                    // receive が Stop を返した時点で終了済み。報告を取り出すだけ
                    return session.close(delegate, TerminationReason::DelegateStopped);
                }
            }
            Ok(Incoming::Idle) => std::thread::sleep(backoff),
            Ok(Incoming::Closed) => {
                return session.close(delegate, TerminationReason::ConnectionClosed);
            }
            Err(e) => {
                tracing::error!(error = %e, "read failed");
                return session.close(delegate, TerminationReason::LocalError(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delegate::DelegateResult;
    use crate::session::Outbox;
    use argb_proto::{response, Response, StackMeasurement};
    use prost::Message as _;
    use std::collections::VecDeque;
    use std::io;

    /// 用意したチャンクを順に返し、読み込み回数を数えるリンク
    struct ScriptedLink {
        chunks: VecDeque<io::Result<Incoming>>,
        reads: usize,
        written: Vec<u8>,
    }

    impl ScriptedLink {
        fn new(chunks: Vec<io::Result<Incoming>>) -> Self {
            ScriptedLink {
                chunks: chunks.into(),
                reads: 0,
                written: Vec::new(),
            }
        }
    }

    impl ByteSink for &mut ScriptedLink {
        fn write(&mut self, data: &[u8]) -> io::Result<()> {
            self.written.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl ByteSource for &mut ScriptedLink {
        fn read_chunk(&mut self) -> io::Result<Incoming> {
            self.reads += 1;
            self.chunks.pop_front().unwrap_or(Ok(Incoming::Closed))
        }
    }

    /// 指定数の計測値を受け取ったら停止するデリゲート
    struct CountingDelegate {
        target: usize,
        seen: usize,
        completed: usize,
    }

    impl Delegate for CountingDelegate {
        fn ready(&mut self, outbox: &mut Outbox<'_>) -> DelegateResult {
            outbox.current_time_request()?;
            Ok(())
        }

        fn process(&mut self, _outbox: &mut Outbox<'_>, _response: &Response) -> DelegateResult<bool> {
            self.seen += 1;
            Ok(self.seen >= self.target)
        }

        fn completed(&mut self, _report: &SessionReport) {
            self.completed += 1;
        }
    }

    fn ready_frame() -> Vec<u8> {
        argb_frame::seal_frame(&Response::log(9, false).encode_to_vec())
    }

    fn measurement_frame(id: u32) -> Vec<u8> {
        let response = Response {
            payload: Some(response::Payload::StackMeasurement(StackMeasurement {
                id,
                ..Default::default()
            })),
        };
        argb_frame::seal_frame(&response.encode_to_vec())
    }

    fn fast_config() -> SessionConfig {
        SessionConfig {
            poll_interval_ms: 0,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_stops_after_target_without_further_reads() {
        let mut chunks = vec![Ok(Incoming::Data(vec![0x00])), Ok(Incoming::Data(ready_frame()))];
        for id in 0..150 {
            chunks.push(Ok(Incoming::Data(measurement_frame(id % 4))));
        }
        let mut link = ScriptedLink::new(chunks);
        let mut delegate = CountingDelegate {
            target: 100,
            seen: 0,
            completed: 0,
        };

        let report = run_blocking(&mut link, &mut delegate, fast_config(), &AtomicBool::new(false));

        assert_eq!(report.reason, TerminationReason::DelegateStopped);
        assert_eq!(delegate.seen, 100);
        assert_eq!(delegate.completed, 1);
        // 同期 1 + 準備完了 1 + 計測値 100
        assert_eq!(link.reads, 102);
        assert_eq!(report.stats.frames_sent, 1);
        assert!(!link.written.is_empty());
    }

    #[test]
    fn test_idle_then_closed() {
        let chunks = vec![
            Ok(Incoming::Idle),
            Ok(Incoming::Data(vec![0x00])),
            Ok(Incoming::Idle),
            Ok(Incoming::Closed),
        ];
        let mut link = ScriptedLink::new(chunks);
        let mut delegate = CountingDelegate {
            target: 1,
            seen: 0,
            completed: 0,
        };

        let report = run_blocking(&mut link, &mut delegate, fast_config(), &AtomicBool::new(false));
        assert_eq!(report.reason, TerminationReason::ConnectionClosed);
        assert_eq!(delegate.completed, 1);
        assert_eq!(link.reads, 4);
    }

    #[test]
    fn test_interrupt_checked_before_read() {
        let mut link = ScriptedLink::new(vec![Ok(Incoming::Data(ready_frame()))]);
        let mut delegate = CountingDelegate {
            target: 1,
            seen: 0,
            completed: 0,
        };

        let report = run_blocking(&mut link, &mut delegate, fast_config(), &AtomicBool::new(true));
        assert_eq!(report.reason, TerminationReason::Interrupted);
        assert_eq!(link.reads, 0);
        assert_eq!(delegate.completed, 1);
    }

    #[test]
    fn test_read_error_is_local_error() {
        let chunks = vec![Err(io::Error::new(io::ErrorKind::PermissionDenied, "port gone"))];
        let mut link = ScriptedLink::new(chunks);
        let mut delegate = CountingDelegate {
            target: 1,
            seen: 0,
            completed: 0,
        };

        let report = run_blocking(&mut link, &mut delegate, fast_config(), &AtomicBool::new(false));
        assert_eq!(
            report.reason,
            TerminationReason::LocalError("port gone".to_string())
        );
    }
}
