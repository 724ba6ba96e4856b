//! Mock IRC server.
//!
//! Listens on a loopback port, accepts the bot's connection, and lets a
//! test script the server side of the session line by line.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use slircb::Config;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::time::timeout;

/// How long a single receive waits before the test fails.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A listening mock server.
pub struct MockServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl MockServer {
    /// Bind on an OS-assigned loopback port.
    pub async fn bind() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        Ok(Self { listener, addr })
    }

    /// The port the server listens on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Accept the bot's connection.
    pub async fn accept(&self) -> Result<ServerConn> {
        let (stream, _) = timeout(RECV_TIMEOUT, self.listener.accept()).await??;
        let (read_half, write_half) = stream.into_split();
        Ok(ServerConn {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }
}

/// The server side of one bot session.
pub struct ServerConn {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl ServerConn {
    /// Send one line, CR-LF terminated.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line from the bot.
    pub async fn recv_line(&mut self) -> Result<String> {
        self.recv_timeout(RECV_TIMEOUT).await
    }

    /// Receive a line with a timeout. Fails on timeout or EOF.
    pub async fn recv_timeout(&mut self, dur: Duration) -> Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed by bot");
        }
        Ok(line.trim_end().to_string())
    }

    /// Skip lines until one satisfies the predicate; returns it.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> Result<String>
    where
        F: FnMut(&str) -> bool,
    {
        loop {
            let line = self.recv_line().await?;
            if predicate(&line) {
                return Ok(line);
            }
        }
    }

    /// Assert nothing arrives for `dur`. The connection staying open is
    /// part of the assertion.
    pub async fn expect_silence(&mut self, dur: Duration) -> Result<()> {
        let mut line = String::new();
        match timeout(dur, self.reader.read_line(&mut line)).await {
            Err(_) => Ok(()),
            Ok(Ok(0)) => anyhow::bail!("bot closed the connection"),
            Ok(Ok(_)) => anyhow::bail!("unexpected line: {}", line.trim_end()),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    /// Consume the registration exchange (NICK then USER).
    pub async fn expect_registration(&mut self, nick: &str) -> Result<()> {
        let line = self.recv_line().await?;
        anyhow::ensure!(
            line == format!("NICK {nick}"),
            "expected NICK {nick}, got: {line}"
        );
        let line = self.recv_line().await?;
        anyhow::ensure!(
            line.starts_with(&format!("USER {nick} ")),
            "expected USER {nick}, got: {line}"
        );
        Ok(())
    }

    /// Consume registration and reply with the welcome numeric.
    pub async fn welcome(&mut self, nick: &str) -> Result<()> {
        self.expect_registration(nick).await?;
        self.send_line(&format!(
            ":test.server 001 {nick} :Welcome to the test network"
        ))
        .await
    }

    /// Close the connection so the bot sees EOF.
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Bot configuration aimed at a mock server on `port`.
///
/// Pacing is off and the shutdown grace is short so tests stay fast;
/// individual tests override what they exercise.
pub fn test_config(port: u16) -> Config {
    let mut config = Config::for_server("127.0.0.1", port, "testbot");
    config.behavior.shutdown_grace_secs = 2;
    config.scheduler.min_send_interval_ms = 0;
    config
}
