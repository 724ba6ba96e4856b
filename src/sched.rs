//! Outbound line scheduling.
//!
//! A single task owns the write half, so wire writes are never
//! interleaved. Two lanes feed it: the system lane (registration,
//! keepalive, QUIT) always drains first and is never paced; the user
//! lane carries handler output and honors the configured minimum
//! spacing. A paced user line waits for its slot without blocking
//! system traffic.

use std::num::NonZeroU32;
use std::time::Duration;

use futures_util::SinkExt;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::codec::FramedWrite;
use tracing::trace;

use slircb_proto::LineCodec;

use crate::config::SchedulerConfig;
use crate::error::SendError;

type DirectRateLimiter = governor::DefaultDirectRateLimiter;

/// Sender half of the user lane.
#[derive(Clone)]
pub(crate) enum QueueTx {
    Bounded(mpsc::Sender<String>),
    Unbounded(mpsc::UnboundedSender<String>),
}

impl QueueTx {
    /// Queue a line. Waits for room on a bounded lane; fails only when
    /// the scheduler is gone.
    pub(crate) async fn send(&self, line: String) -> Result<(), SendError> {
        match self {
            QueueTx::Bounded(tx) => {
                tx.send(line).await.map_err(|_| SendError::Closed)
            }
            QueueTx::Unbounded(tx) => tx.send(line).map_err(|_| SendError::Closed),
        }
    }
}

/// Receiver half of the user lane.
pub(crate) enum QueueRx {
    Bounded(mpsc::Receiver<String>),
    Unbounded(mpsc::UnboundedReceiver<String>),
}

impl QueueRx {
    pub(crate) async fn recv(&mut self) -> Option<String> {
        match self {
            QueueRx::Bounded(rx) => rx.recv().await,
            QueueRx::Unbounded(rx) => rx.recv().await,
        }
    }

    #[cfg(test)]
    pub(crate) fn try_recv(&mut self) -> Result<String, mpsc::error::TryRecvError> {
        match self {
            QueueRx::Bounded(rx) => rx.try_recv(),
            QueueRx::Unbounded(rx) => rx.try_recv(),
        }
    }
}

/// Build the user lane. A bound of zero means unbounded.
pub(crate) fn user_queue(bound: usize) -> (QueueTx, QueueRx) {
    if bound == 0 {
        let (tx, rx) = mpsc::unbounded_channel();
        (QueueTx::Unbounded(tx), QueueRx::Unbounded(rx))
    } else {
        let (tx, rx) = mpsc::channel(bound);
        (QueueTx::Bounded(tx), QueueRx::Bounded(rx))
    }
}

/// The writer task: merges the two lanes onto the socket.
pub(crate) struct Scheduler<W> {
    writer: FramedWrite<W, LineCodec>,
    system_rx: mpsc::Receiver<String>,
    user_rx: QueueRx,
    pacer: Option<DirectRateLimiter>,
}

impl<W> Scheduler<W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(
        writer: FramedWrite<W, LineCodec>,
        system_rx: mpsc::Receiver<String>,
        user_rx: QueueRx,
        config: &SchedulerConfig,
    ) -> Self {
        Scheduler {
            writer,
            system_rx,
            user_rx,
            pacer: pacer(config),
        }
    }

    /// Run until both lanes close (normal shutdown) or a write fails.
    /// Buffered lines are drained before returning; `recv` yields them
    /// all before reporting closure.
    pub(crate) async fn run(self) -> Result<(), SendError> {
        let Scheduler {
            mut writer,
            mut system_rx,
            mut user_rx,
            pacer,
        } = self;

        let mut sys_open = true;
        let mut user_open = true;
        let mut pending: Option<String> = None;

        while sys_open || user_open || pending.is_some() {
            if let Some(line) = pending.take() {
                if let Some(pacer) = &pacer {
                    loop {
                        tokio::select! {
                            biased;
                            sys = system_rx.recv(), if sys_open => match sys {
                                Some(sys_line) => send_line(&mut writer, sys_line).await?,
                                None => sys_open = false,
                            },
                            _ = pacer.until_ready() => break,
                        }
                    }
                }
                send_line(&mut writer, line).await?;
                continue;
            }

            tokio::select! {
                biased;
                sys = system_rx.recv(), if sys_open => match sys {
                    Some(line) => send_line(&mut writer, line).await?,
                    None => sys_open = false,
                },
                user = user_rx.recv(), if user_open => match user {
                    Some(line) => pending = Some(line),
                    None => user_open = false,
                },
            }
        }
        Ok(())
    }
}

async fn send_line<W>(
    writer: &mut FramedWrite<W, LineCodec>,
    line: String,
) -> Result<(), SendError>
where
    W: AsyncWrite + Unpin,
{
    trace!(line = %line, "Sent line");
    writer.send(line).await.map_err(SendError::from)
}

fn pacer(config: &SchedulerConfig) -> Option<DirectRateLimiter> {
    if config.min_send_interval_ms == 0 {
        return None;
    }
    let period = Duration::from_millis(config.min_send_interval_ms);
    let burst = NonZeroU32::new(config.burst).unwrap_or(nonzero!(1u32));
    let quota = Quota::with_period(period)?.allow_burst(burst);
    Some(RateLimiter::direct(quota))
}
