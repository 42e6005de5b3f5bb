//! プロトコルセッション状態機械
//!
//! 受信チャンクを `PacketAssembler` → `packet::open` → `Message::decode` の順に通し、
//! 状態に応じてデリゲートへ配送する。送信は `Outbox` が担当する。
//!
//! 不正なフレーム（COBS 不正・CRC 不一致・短すぎ・長すぎ）はログに残して捨てるだけで、
//! セッションは継続する。

use argb_frame::{AssemblerEvent, FrameError, HexDump, PacketAssembler, DELIMITER};
use argb_proto::{Command, Message, Request, SetLightCommand};
use prost::Message as _;
use serde::Serialize;
use tracing::Span;

use crate::config::SessionConfig;
use crate::delegate::{Delegate, DelegateResult};
use crate::error::{Result, SessionError, TerminationReason};
use crate::link::ByteSink;

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// 最初の区切り文字を待っている（途中のフレームを読み捨て中）
    Connecting,
    /// 準備完了シグナルを待っている
    AwaitingReady,
    Ready,
    Terminated,
}

/// セッションの統計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStats {
    /// 送信したフレーム数
    pub frames_sent: u64,
    /// CRC 検証を通過したフレーム数
    pub frames_received: u64,
    /// 破棄したフレーム数（COBS 不正・CRC 不一致・短すぎ・長すぎ）
    pub frames_rejected: u64,
    /// どの型としてもデコードできなかったペイロード数
    pub undecodable: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// 終了時にデリゲートへ渡す報告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionReport {
    pub reason: TerminationReason,
    pub stats: SessionStats,
}

/// `Session::receive` の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// セッションは終了した。これ以上読み込まないこと
    Stop,
}

/// プロトコルセッション
///
/// 1 本の接続を排他的に所有する。I/O は持たず、受信バイト列は `receive` で渡す。
pub struct Session<L> {
    link: L,
    config: SessionConfig,
    state: SessionState,
    assembler: PacketAssembler,
    stats: SessionStats,
    /// Outbox での書き込み失敗（次の処理機会に LocalError で終了する）
    fault: Option<String>,
    /// 終了済みなら Some（completed を 2 度呼ばないため）
    report: Option<SessionReport>,
    span: Span,
}

impl<L: ByteSink> Session<L> {
    pub fn new(link: L, config: SessionConfig) -> Self {
        let span = tracing::info_span!("argb_session", name = %config.name);
        Session {
            link,
            assembler: PacketAssembler::unsynced(config.max_frame_len),
            config,
            state: SessionState::Connecting,
            stats: SessionStats::default(),
            fault: None,
            report: None,
            span,
        }
    }

    /// 受信したチャンクを処理する
    ///
    /// チャンクの境界は任意。終了済みなら何もせず `Flow::Stop` を返す。
    pub fn receive<D: Delegate + ?Sized>(&mut self, chunk: &[u8], delegate: &mut D) -> Flow {
        if self.state == SessionState::Terminated {
            return Flow::Stop;
        }
        let span = self.span.clone();
        let _enter = span.enter();

        if self.check_fault(delegate) == Flow::Stop {
            return Flow::Stop;
        }

        self.stats.bytes_received += chunk.len() as u64;
        let events = self.assembler.push(chunk);

        if self.state == SessionState::Connecting && self.assembler.is_synced() {
            tracing::debug!(
                discarded = self.assembler.discarded_bytes(),
                "first delimiter seen, awaiting readiness"
            );
            self.state = SessionState::AwaitingReady;
        }

        for event in events {
            match event {
                AssemblerEvent::Frame(frame) => self.handle_frame(&frame, delegate),
                AssemblerEvent::TooShort(frame) => {
                    self.reject(&FrameError::TooShort { len: frame.len() }, &frame)
                }
                AssemblerEvent::Overflow { len } => self.reject(&FrameError::Overflow { len }, &[]),
            }
            if self.check_fault(delegate) == Flow::Stop || self.state == SessionState::Terminated {
                return Flow::Stop;
            }
        }

        Flow::Continue
    }

    /// セッションを終了し、デリゲートの `completed` を呼ぶ
    ///
    /// 2 回目以降の呼び出しは最初の報告を返すだけで、`completed` は呼ばない。
    pub fn close<D: Delegate + ?Sized>(
        &mut self,
        delegate: &mut D,
        reason: TerminationReason,
    ) -> SessionReport {
        if let Some(report) = &self.report {
            return report.clone();
        }
        let _enter = self.span.enter();

        self.state = SessionState::Terminated;
        let report = SessionReport {
            reason,
            stats: self.stats,
        };
        tracing::info!(
            reason = %report.reason,
            frames_sent = report.stats.frames_sent,
            frames_received = report.stats.frames_received,
            frames_rejected = report.stats.frames_rejected,
            "session terminated"
        );
        delegate.completed(&report);
        self.report = Some(report.clone());
        report
    }

    /// デリゲートのコールバック外からコマンドを送るための Outbox
    pub fn outbox(&mut self) -> Outbox<'_> {
        Outbox {
            link: &mut self.link,
            state: self.state,
            stats: &mut self.stats,
            fault: &mut self.fault,
            diagnostics: self.config.enable_diagnostics,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 終了済みなら終了報告
    pub fn report(&self) -> Option<&SessionReport> {
        self.report.as_ref()
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// 接続を手放す
    pub fn into_link(self) -> L {
        self.link
    }

    // ===== Private メソッド =====

    /// 区切り文字で閉じたフレームを検証して配送する
    fn handle_frame<D: Delegate + ?Sized>(&mut self, frame: &[u8], delegate: &mut D) {
        let payload = match argb_frame::open(frame) {
            Ok(payload) => payload,
            Err(e) => {
                self.reject(&e, frame);
                return;
            }
        };
        self.stats.frames_received += 1;

        if self.config.enable_diagnostics {
            tracing::debug!(
                len = frame.len(),
                buffer = %HexDump(frame),
                data = %HexDump(&payload),
                crc = format_args!("{:08x}", argb_frame::crc32(&payload)),
                "frame received"
            );
        }

        let message = Message::decode(&payload);
        if let Message::DecodeFailure { .. } = message {
            self.stats.undecodable += 1;
        }

        match self.state {
            SessionState::AwaitingReady => self.handle_before_ready(message, delegate),
            SessionState::Ready => self.dispatch(message, delegate),
            SessionState::Connecting | SessionState::Terminated => {}
        }
    }

    fn handle_before_ready<D: Delegate + ?Sized>(&mut self, message: Message, delegate: &mut D) {
        if message.is_readiness(self.config.ready_log_id) {
            tracing::info!("device ready");
            self.state = SessionState::Ready;
            let result = delegate.ready(&mut self.outbox());
            log_callback_error("ready", result);
            return;
        }

        match message {
            Message::Diagnostic(debug) if self.config.debug_before_ready => {
                let result = delegate.debug(&mut self.outbox(), &debug);
                log_callback_error("debug", result);
            }
            other => {
                tracing::debug!(kind = ?other.kind(), "discarding message before readiness");
            }
        }
    }

    fn dispatch<D: Delegate + ?Sized>(&mut self, message: Message, delegate: &mut D) {
        match message {
            Message::Operational(response) => {
                let result = delegate.process(&mut self.outbox(), &response);
                match result {
                    Ok(true) => {
                        self.close(delegate, TerminationReason::DelegateStopped);
                    }
                    Ok(false) => {}
                    Err(e) => log_callback_error("process", Err(e)),
                }
            }
            Message::Diagnostic(debug) => {
                let result = delegate.debug(&mut self.outbox(), &debug);
                log_callback_error("debug", result);
            }
            Message::DecodeFailure { payload, error } => {
                let result = delegate.anomaly(&mut self.outbox(), &payload, &error);
                log_callback_error("anomaly", result);
            }
        }
    }

    /// 不正なフレームを記録して捨てる
    fn reject(&mut self, error: &FrameError, frame: &[u8]) {
        self.stats.frames_rejected += 1;
        tracing::warn!(
            error = %error,
            len = frame.len(),
            frame = %HexDump(frame),
            incoming = self.stats.frames_received,
            outgoing = self.stats.frames_sent,
            "frame rejected"
        );
    }

    /// Outbox で書き込みに失敗していれば終了する
    fn check_fault<D: Delegate + ?Sized>(&mut self, delegate: &mut D) -> Flow {
        match self.fault.take() {
            Some(fault) => {
                self.close(delegate, TerminationReason::LocalError(fault));
                Flow::Stop
            }
            None => Flow::Continue,
        }
    }
}

fn log_callback_error(callback: &'static str, result: DelegateResult) {
    if let Err(e) = result {
        tracing::warn!(callback, error = %e, "delegate callback failed");
    }
}

/// 送信口
///
/// デリゲートのコールバック中、または `Session::outbox` で得られる。
/// 準備完了前・終了後の送信は `SessionError::NotReady` になる。
pub struct Outbox<'a> {
    link: &'a mut dyn ByteSink,
    state: SessionState,
    stats: &'a mut SessionStats,
    fault: &'a mut Option<String>,
    diagnostics: bool,
}

impl Outbox<'_> {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Request をそのまま送る
    ///
    /// `seal(payload)` → 区切り文字 → flush の順に書き込む。
    /// 書き込みに失敗した場合、セッションは次の処理機会に終了する。
    pub fn send_request(&mut self, request: &Request) -> Result<()> {
        if self.state != SessionState::Ready {
            return Err(SessionError::NotReady { state: self.state });
        }
        if self.fault.is_some() {
            return Err(SessionError::Terminated);
        }

        let payload = request.encode_to_vec();
        let sealed = argb_frame::seal(&payload);
        if let Err(e) = write_frame(&mut *self.link, &sealed) {
            tracing::error!(error = %e, "failed to write frame");
            *self.fault = Some(e.to_string());
            return Err(e.into());
        }

        self.stats.frames_sent += 1;
        self.stats.bytes_sent += sealed.len() as u64 + 1;
        if self.diagnostics {
            tracing::debug!(
                len = sealed.len(),
                data = %HexDump(&payload),
                buffer = %HexDump(&sealed),
                "frame sent"
            );
        }
        Ok(())
    }

    pub fn send(&mut self, command: &Command) -> Result<()> {
        tracing::trace!(command = command.name(), "sending command");
        self.send_request(&command.to_request())
    }

    /// 代替色を省略した場合は主色が使われる（`SetLightCommand::new`）
    pub fn set_light(&mut self, light: SetLightCommand) -> Result<()> {
        self.send(&Command::SetLight(light))
    }

    pub fn commit(&mut self, timestamp_delta: u32) -> Result<()> {
        self.send(&Command::Commit { timestamp_delta })
    }

    pub fn current_time_request(&mut self) -> Result<()> {
        self.send(&Command::CurrentTimeRequest)
    }
}

fn write_frame(link: &mut dyn ByteSink, sealed: &[u8]) -> std::io::Result<()> {
    link.write(sealed)?;
    link.write(&[DELIMITER])?;
    link.flush()
}
