//! バイト列の入出力抽象
//!
//! シリアルポートそのものは扱わず、読み書きできるバイト列の端点として抽象化する。
//! `std::io::Read + Write` を実装するもの（シリアルポート、TCP、パイプ）は
//! `IoLink` で包めばそのまま使える。

use std::io::{self, ErrorKind, Read, Write};

use argb_stream::WriteQueue;

/// `ByteSource::read_chunk` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// 受信したバイト列（空でない）
    Data(Vec<u8>),
    /// 現在読めるデータがない（タイムアウト・ノンブロッキング）
    Idle,
    /// 相手側が接続を閉じた
    Closed,
}

/// 送信側
pub trait ByteSink {
    fn write(&mut self, data: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()>;
}

/// 受信側
pub trait ByteSource {
    fn read_chunk(&mut self) -> io::Result<Incoming>;
}

/// 1 回の読み込みで確保するバッファサイズ
const READ_CHUNK_SIZE: usize = 256;

/// `Read + Write` を `ByteSink` / `ByteSource` として使うアダプタ
///
/// 読み込みタイムアウトを設定したシリアルポートでは `TimedOut` が返るため、
/// `WouldBlock` と同様に `Incoming::Idle` として扱う。
pub struct IoLink<T> {
    inner: T,
    buf: Vec<u8>,
}

impl<T> IoLink<T> {
    pub fn new(inner: T) -> Self {
        IoLink {
            inner,
            buf: vec![0u8; READ_CHUNK_SIZE],
        }
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> ByteSink for IoLink<T> {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<T: Read> ByteSource for IoLink<T> {
    fn read_chunk(&mut self) -> io::Result<Incoming> {
        match self.inner.read(&mut self.buf) {
            Ok(0) => Ok(Incoming::Closed),
            Ok(n) => Ok(Incoming::Data(self.buf[..n].to_vec())),
            Err(e) => match e.kind() {
                ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted => {
                    Ok(Incoming::Idle)
                }
                _ => Err(e),
            },
        }
    }
}

/// イベント駆動環境では送信キューに積み、ドライバが後でポートへ流す
impl ByteSink for WriteQueue {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        WriteQueue::write(self, data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        WriteQueue::flush(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// 1 回目は TimedOut、2 回目以降は EOF を返すリーダー
    struct Timeouts {
        calls: usize,
    }

    impl Read for Timeouts {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            if self.calls == 1 {
                Err(io::Error::new(ErrorKind::TimedOut, "read timeout"))
            } else {
                Ok(0)
            }
        }
    }

    #[test]
    fn test_read_chunk_data_then_closed() {
        let mut link = IoLink::new(Cursor::new(vec![1u8, 2, 3]));
        assert_eq!(link.read_chunk().unwrap(), Incoming::Data(vec![1, 2, 3]));
        assert_eq!(link.read_chunk().unwrap(), Incoming::Closed);
    }

    #[test]
    fn test_timeout_maps_to_idle() {
        let mut link = IoLink::new(Timeouts { calls: 0 });
        assert_eq!(link.read_chunk().unwrap(), Incoming::Idle);
        assert_eq!(link.read_chunk().unwrap(), Incoming::Closed);
    }

    #[test]
    fn test_write_goes_through() {
        let mut link = IoLink::new(Vec::new());
        ByteSink::write(&mut link, b"abc").unwrap();
        ByteSink::flush(&mut link).unwrap();
        assert_eq!(link.get_ref(), b"abc");
    }

    #[test]
    fn test_write_queue_sink() {
        let mut queue = WriteQueue::new();
        ByteSink::write(&mut queue, &[1, 2]).unwrap();
        assert!(!queue.has_ready());
        ByteSink::flush(&mut queue).unwrap();
        assert_eq!(queue.take_ready(), vec![1, 2]);
    }
}
