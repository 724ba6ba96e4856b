//! The inbound dispatch loop.
//!
//! One task owns the read half and drives the whole session: it parses
//! lines, answers PING before anything else, detects registration
//! completion, and fans each event out to matching handlers as
//! independent tasks. Whatever ends the session (peer close, read or
//! write failure, a requested stop), teardown runs exactly once: the
//! disconnected event fires, in-flight handlers get a bounded grace
//! period, and the outbound queue is allowed to drain.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, trace, warn};

use slircb_proto::{encode, Action, LineCodec, Message, ParseError, ProtocolError};

use crate::config::BehaviorConfig;
use crate::error::{Incident, SendError};
use crate::event::Event;
use crate::handler::{Context, Outbox};
use crate::registry::FrozenRegistry;
use crate::sched::QueueTx;

/// Why the steady loop ended.
enum SessionEnd {
    /// The server closed the connection.
    PeerClosed,
    /// The read half failed.
    ReadFailed(std::io::Error),
    /// The writer task ended underneath us.
    WriterGone(String),
    /// A stop was requested through a handle.
    Stopped,
}

pub(crate) struct Dispatcher<'a, R> {
    reader: FramedRead<R, LineCodec>,
    registry: FrozenRegistry,
    system_tx: mpsc::Sender<String>,
    user_tx: QueueTx,
    incidents: broadcast::Sender<Incident>,
    stop_rx: &'a mut mpsc::Receiver<()>,
    executions: JoinSet<()>,
    ready_command: String,
    channels: Vec<String>,
    quit_reason: String,
    grace: Duration,
    welcomed: bool,
    disconnected: bool,
}

impl<'a, R> Dispatcher<'a, R>
where
    R: AsyncRead + Unpin,
{
    pub(crate) fn new(
        reader: FramedRead<R, LineCodec>,
        registry: FrozenRegistry,
        system_tx: mpsc::Sender<String>,
        user_tx: QueueTx,
        incidents: broadcast::Sender<Incident>,
        stop_rx: &'a mut mpsc::Receiver<()>,
        behavior: &BehaviorConfig,
    ) -> Self {
        Dispatcher {
            reader,
            registry,
            system_tx,
            user_tx,
            incidents,
            stop_rx,
            executions: JoinSet::new(),
            ready_command: behavior.ready_command.clone(),
            channels: behavior.channels.clone(),
            quit_reason: behavior.quit_reason.clone(),
            grace: behavior.shutdown_grace(),
            welcomed: false,
            disconnected: false,
        }
    }

    /// Drive the session to completion.
    ///
    /// `identify` lines go out first, on the system lane; `sched` is the
    /// writer task, joined (or aborted) on the way out.
    pub(crate) async fn run(
        mut self,
        identify: Vec<String>,
        mut sched: JoinHandle<Result<(), SendError>>,
    ) {
        for line in identify {
            if self.system_tx.send(line).await.is_err() {
                break;
            }
        }

        let end = self.steady(&mut sched).await;
        let writer_gone = matches!(end, SessionEnd::WriterGone(_));

        match &end {
            SessionEnd::PeerClosed => info!("Server closed the connection"),
            SessionEnd::ReadFailed(e) => warn!(error = %e, "Read failed"),
            SessionEnd::WriterGone(reason) => warn!(reason = %reason, "Write side ended"),
            SessionEnd::Stopped => info!("Stop requested"),
        }

        if matches!(end, SessionEnd::Stopped) {
            self.send_quit().await;
            self.drain_until_eof().await;
        }

        self.finish().await;

        // Closing both lanes lets the writer drain its queue and exit.
        let grace = self.grace;
        let Dispatcher {
            system_tx, user_tx, ..
        } = self;
        drop(system_tx);
        drop(user_tx);

        if !writer_gone {
            match tokio::time::timeout(grace, &mut sched).await {
                Ok(Ok(Ok(()))) => debug!("Outbound queue drained"),
                Ok(Ok(Err(e))) => debug!(error = %e, "Writer ended with error"),
                Ok(Err(e)) => error!(error = %e, "Writer task failed"),
                Err(_) => {
                    warn!("Outbound drain timed out");
                    sched.abort();
                }
            }
        }
    }

    async fn steady(
        &mut self,
        sched: &mut JoinHandle<Result<(), SendError>>,
    ) -> SessionEnd {
        let mut stop_open = true;
        loop {
            tokio::select! {
                maybe_line = self.reader.next() => match maybe_line {
                    Some(Ok(line)) => self.handle_line(line).await,
                    Some(Err(ProtocolError::Io(e))) => return SessionEnd::ReadFailed(e),
                    Some(Err(e)) => {
                        warn!(error = %e, "Inbound data dropped");
                        let _ = self.incidents.send(Incident::DroppedInput {
                            error: e.to_string(),
                        });
                    }
                    None => return SessionEnd::PeerClosed,
                },
                stop = self.stop_rx.recv(), if stop_open => match stop {
                    Some(()) => return SessionEnd::Stopped,
                    None => stop_open = false,
                },
                res = &mut *sched => return SessionEnd::WriterGone(writer_outcome(res)),
                Some(res) = self.executions.join_next(), if !self.executions.is_empty() => {
                    report_join(&self.incidents, res);
                }
            }
        }
    }

    async fn handle_line(&mut self, line: String) {
        let msg: Message = match line.parse() {
            Ok(msg) => msg,
            Err(ParseError::Empty) => {
                debug!("Blank line skipped");
                return;
            }
            Err(e) => {
                warn!(line = %line, error = %e, "Unparseable line skipped");
                let _ = self.incidents.send(Incident::SkippedLine {
                    line,
                    error: e.to_string(),
                });
                return;
            }
        };
        trace!(command = %msg.command, "Received message");

        let msg = Arc::new(msg);

        // Keepalive is answered here, ahead of any handler.
        if msg.command_is("PING") {
            self.answer_ping(&msg).await;
        }

        if !self.welcomed && msg.command_is(&self.ready_command) {
            self.welcomed = true;
            info!(command = %msg.command, "Registration complete");
            self.autojoin().await;
            self.dispatch(Event::Connected);
        }

        self.dispatch(Event::Message(msg));
    }

    async fn answer_ping(&self, msg: &Message) {
        let token = msg.params.first().cloned().unwrap_or_default();
        match encode(Action::pong(token), None) {
            Ok(lines) => {
                for line in lines {
                    if self.system_tx.send(line).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "PONG not encodable"),
        }
    }

    async fn autojoin(&self) {
        if self.channels.is_empty() {
            return;
        }
        match encode(Action::join(self.channels.clone()), None) {
            Ok(lines) => {
                for line in lines {
                    if self.system_tx.send(line).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "Configured channels not joinable"),
        }
    }

    /// Fan an event out to every matching handler, each as its own task.
    fn dispatch(&mut self, event: Event) {
        let matched: Vec<_> = self
            .registry
            .matches(&event)
            .map(|b| (Arc::clone(&b.handler), b.descriptor.clone()))
            .collect();
        for (handler, descriptor) in matched {
            let outbox = Outbox::new(self.user_tx.clone(), event.message().cloned());
            let ctx = Context::new(event.clone(), outbox);
            let incidents = self.incidents.clone();
            self.executions.spawn(async move {
                if let Err(e) = handler.handle(ctx).await {
                    error!(descriptor = %descriptor, error = %e, "Handler failed");
                    let _ = incidents.send(Incident::HandlerFailed {
                        descriptor: descriptor.to_string(),
                        error: e.to_string(),
                    });
                }
            });
        }
    }

    async fn send_quit(&self) {
        match encode(Action::quit(self.quit_reason.clone()), None) {
            Ok(lines) => {
                for line in lines {
                    if self.system_tx.send(line).await.is_err() {
                        return;
                    }
                }
            }
            Err(e) => warn!(error = %e, "QUIT not encodable"),
        }
    }

    /// After a requested stop, keep reading until the server closes so
    /// the QUIT actually reaches the wire. Post-stop traffic is not
    /// dispatched.
    async fn drain_until_eof(&mut self) {
        let _ = tokio::time::timeout(self.grace, async {
            while let Some(res) = self.reader.next().await {
                if res.is_err() {
                    break;
                }
            }
        })
        .await;
    }

    /// Fire the disconnected event (once) and give in-flight handlers a
    /// bounded grace period before aborting them.
    async fn finish(&mut self) {
        if !self.disconnected {
            self.disconnected = true;
            self.dispatch(Event::Disconnected);
        }

        let incidents = self.incidents.clone();
        let executions = &mut self.executions;
        let graceful = tokio::time::timeout(self.grace, async {
            while let Some(res) = executions.join_next().await {
                report_join(&incidents, res);
            }
        })
        .await;

        if graceful.is_err() {
            warn!(
                remaining = self.executions.len(),
                "Shutdown grace expired; aborting handlers"
            );
            self.executions.abort_all();
            while let Some(res) = self.executions.join_next().await {
                report_join(&self.incidents, res);
            }
        }
    }
}

fn writer_outcome(res: Result<Result<(), SendError>, JoinError>) -> String {
    match res {
        Ok(Ok(())) => "outbound lanes closed".to_string(),
        Ok(Err(e)) => e.to_string(),
        Err(e) => e.to_string(),
    }
}

fn report_join(incidents: &broadcast::Sender<Incident>, res: Result<(), JoinError>) {
    if let Err(e) = res {
        if e.is_panic() {
            error!(error = %e, "Handler panicked");
            let _ = incidents.send(Incident::HandlerPanicked {
                error: e.to_string(),
            });
        }
    }
}
