//! tokio によるイベント駆動ドライバ
//!
//! 1 タスクで「次のチャンク到着」「書き込みの進行」「シャットダウン要求」の
//! いずれかを待つ。セッションの送信は `WriteQueue` に積まれ、書き込み側が
//! 詰まっている間も読み込みは止めない（相手も書き込み中だと互いに待ち続けるため）。
//!
//! ```text
//! loop {
//!     pending が空なら queue.take_ready()
//!     select! {
//!         shutdown                          => Interrupted
//!         writer.write(pending), if 未送信あり => 送信位置を進める
//!         reader.read                       => session.receive(chunk)
//!     }
//! }
//! ```

use std::future::Future;
use std::time::Duration;

use argb_stream::WriteQueue;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::SessionConfig;
use crate::delegate::Delegate;
use crate::error::TerminationReason;
use crate::session::{Flow, Session, SessionReport};

/// 1 回の読み込みで確保するバッファサイズ
const READ_BUFFER_SIZE: usize = 256;

/// 停止時に残りの送信データを書き切るまで待つ上限
const FINAL_FLUSH_TIMEOUT: Duration = Duration::from_millis(200);

/// 書き込み中のバイト列と送信済み位置
#[derive(Default)]
struct Outgoing {
    data: Vec<u8>,
    offset: usize,
}

impl Outgoing {
    fn remaining(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    fn is_done(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// 書き切っていればキューから次のバイト列を取り出す
    fn refill(&mut self, queue: &mut WriteQueue) {
        if self.is_done() {
            self.data = queue.take_ready();
            self.offset = 0;
        }
    }
}

/// セッションが終了するまで `io` を読み続ける
///
/// # 引数
/// - `io`: シリアルポートなどの非同期ストリーム（終了時に解放される）
/// - `delegate`: アプリケーション
/// - `shutdown`: 完了したら `Interrupted` として終了する
pub async fn run_reactor<T, D, F>(
    io: T,
    delegate: &mut D,
    config: SessionConfig,
    shutdown: F,
) -> SessionReport
where
    T: AsyncRead + AsyncWrite + Unpin,
    D: Delegate + ?Sized,
    F: Future<Output = ()>,
{
    let (mut reader, mut writer) = tokio::io::split(io);
    let mut session = Session::new(WriteQueue::new(), config);
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut outgoing = Outgoing::default();
    tokio::pin!(shutdown);

    loop {
        outgoing.refill(session.link_mut());
        let writing = !outgoing.is_done();

        tokio::select! {
            _ = &mut shutdown => {
                return session.close(delegate, TerminationReason::Interrupted);
            }
            written = writer.write(outgoing.remaining()), if writing => match written {
                Ok(0) => {
                    tracing::error!("writer accepted no bytes");
                    return session.close(
                        delegate,
                        TerminationReason::LocalError("write returned zero bytes".to_string()),
                    );
                }
                Ok(n) => {
                    outgoing.offset += n;
                    if outgoing.is_done() {
                        if let Err(e) = writer.flush().await {
                            tracing::error!(error = %e, "flush failed");
                            return session.close(delegate, TerminationReason::LocalError(e.to_string()));
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "write failed");
                    return session.close(delegate, TerminationReason::LocalError(e.to_string()));
                }
            },
            read = reader.read(&mut buf) => match read {
                Ok(0) => {
                    return session.close(delegate, TerminationReason::ConnectionClosed);
                }
                Ok(n) => {
                    if session.receive(&buf[..n], delegate) == Flow::Stop {
                        // 停止直前に積まれたコマンドも送ってから終わる（相手が読まなければ諦める）
                        let mut rest = outgoing.remaining().to_vec();
                        rest.extend(session.link_mut().take_ready());
                        finish(&mut writer, &rest).await;
                        return session.close(delegate, TerminationReason::DelegateStopped);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "read failed");
                    return session.close(delegate, TerminationReason::LocalError(e.to_string()));
                }
            }
        }
    }
}

/// 残りの送信データを上限時間内で書き切る
async fn finish<W: AsyncWrite + Unpin>(writer: &mut W, rest: &[u8]) {
    if rest.is_empty() {
        return;
    }
    let write = async {
        writer.write_all(rest).await?;
        writer.flush().await
    };
    match tokio::time::timeout(FINAL_FLUSH_TIMEOUT, write).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(error = %e, "failed to flush queued frames on stop"),
        Err(_) => tracing::warn!(pending = rest.len(), "peer not reading, dropping queued frames on stop"),
    }
}
