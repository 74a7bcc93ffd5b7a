use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use dashboard_logging::{dash_debug, dash_error, dash_info};
use tokio::runtime::Runtime;
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::session::{parse_session_url, SessionSettings, SessionTask};
use crate::{EngineEvent, SessionId};

enum EngineCommand {
    Open { session: SessionId, url: String },
    Send { session: SessionId, text: String },
    Close { session: SessionId },
}

struct SessionSlot {
    outbound: async_mpsc::UnboundedSender<String>,
    open: Arc<AtomicBool>,
    cancel: CancellationToken,
}

/// Owns the streaming sessions. Commands go in over a channel, events come
/// back over another; the sockets live on a runtime thread.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(settings: SessionSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .thread_name("dashboard-engine")
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    dash_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };

            let mut sessions: HashMap<SessionId, SessionSlot> = HashMap::new();
            while let Ok(command) = cmd_rx.recv() {
                handle_command(&runtime, &mut sessions, &settings, &event_tx, command);
            }

            for (_, slot) in sessions.drain() {
                slot.cancel.cancel();
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    /// Opens `session` against `url`. An existing session with the same id is
    /// closed first.
    pub fn open(&self, session: SessionId, url: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Open {
            session,
            url: url.into(),
        });
    }

    /// Sends one text frame. Dropped unless the session is currently open.
    pub fn send(&self, session: SessionId, text: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Send {
            session,
            text: text.into(),
        });
    }

    pub fn close(&self, session: SessionId) {
        let _ = self.cmd_tx.send(EngineCommand::Close { session });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

fn handle_command(
    runtime: &Runtime,
    sessions: &mut HashMap<SessionId, SessionSlot>,
    settings: &SessionSettings,
    event_tx: &mpsc::Sender<EngineEvent>,
    command: EngineCommand,
) {
    match command {
        EngineCommand::Open { session, url } => {
            if let Some(previous) = sessions.remove(&session) {
                dash_debug!("Replacing session {}", session);
                previous.cancel.cancel();
            }

            let url = match parse_session_url(&url) {
                Ok(url) => url,
                Err(error) => {
                    dash_error!("Session {} not opened: {}", session, error);
                    let _ = event_tx.send(EngineEvent::Failed { session, error });
                    let _ = event_tx.send(EngineEvent::Closed { session });
                    return;
                }
            };

            dash_info!("Opening session {} to {}", session, url);
            let (outbound_tx, outbound_rx) = async_mpsc::unbounded_channel();
            let open = Arc::new(AtomicBool::new(false));
            let cancel = CancellationToken::new();
            let task = SessionTask {
                session,
                url,
                settings: settings.clone(),
                outbound: outbound_rx,
                open: open.clone(),
                cancel: cancel.clone(),
                events: event_tx.clone(),
            };
            runtime.spawn(task.run());
            sessions.insert(
                session,
                SessionSlot {
                    outbound: outbound_tx,
                    open,
                    cancel,
                },
            );
        }
        EngineCommand::Send { session, text } => match sessions.get(&session) {
            Some(slot) if slot.open.load(Ordering::SeqCst) => {
                if slot.outbound.send(text).is_err() {
                    dash_debug!("Session {} finished; send dropped", session);
                }
            }
            Some(_) => dash_debug!("Session {} not open; send dropped", session),
            None => dash_debug!("Unknown session {}; send dropped", session),
        },
        EngineCommand::Close { session } => {
            if let Some(slot) = sessions.remove(&session) {
                dash_info!("Closing session {}", session);
                slot.cancel.cancel();
            }
        }
    }
}
