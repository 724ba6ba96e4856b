//! TCP session establishment and line framing.

use std::time::Duration;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::debug;

use slircb_proto::LineCodec;

use crate::error::ConnectionError;

pub(crate) type Reader = FramedRead<OwnedReadHalf, LineCodec>;
pub(crate) type Writer = FramedWrite<OwnedWriteHalf, LineCodec>;

/// An established, framed connection to a server.
#[derive(Debug)]
pub(crate) struct Connection {
    reader: Reader,
    writer: Writer,
}

impl Connection {
    /// Connect to `addr` within `timeout` and frame both halves with the
    /// line codec.
    pub(crate) async fn open(
        addr: &str,
        timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let stream = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(ConnectionError::Connect {
                    addr: addr.to_string(),
                    source: e,
                });
            }
            Err(_) => {
                return Err(ConnectionError::Timeout {
                    addr: addr.to_string(),
                    timeout,
                });
            }
        };
        let _ = stream.set_nodelay(true);
        if let Ok(peer) = stream.peer_addr() {
            debug!(peer = %peer, "Connection established");
        }

        let (read_half, write_half) = stream.into_split();
        Ok(Connection {
            reader: FramedRead::new(read_half, LineCodec::new()),
            writer: FramedWrite::new(write_half, LineCodec::new()),
        })
    }

    pub(crate) fn into_parts(self) -> (Reader, Writer) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_open_and_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            sock.write_all(b"PING :token\r\n").await.unwrap();
            let mut buf = [0u8; 64];
            let n = tokio::io::AsyncReadExt::read(&mut sock, &mut buf)
                .await
                .unwrap();
            buf[..n].to_vec()
        });

        let conn = Connection::open(&addr, Duration::from_secs(5))
            .await
            .unwrap();
        let (mut reader, mut writer) = conn.into_parts();

        let line = reader.next().await.unwrap().unwrap();
        assert_eq!(line, "PING :token");

        writer.send("PONG :token".to_string()).await.unwrap();
        drop(writer);

        let received = server.await.unwrap();
        assert_eq!(received, b"PONG :token\r\n");
    }

    #[tokio::test]
    async fn test_open_refused() {
        // bind-then-drop to get a port with no listener
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let err = Connection::open(&addr, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectionError::Connect { .. }));
    }
}
