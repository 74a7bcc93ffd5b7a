use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use dashboard_logging::{dash_debug, dash_info, dash_trace, dash_warn};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc as async_mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::reconnect::{Backoff, ReconnectConfig};
use crate::{EngineEvent, SessionError, SessionId};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub connect_timeout: Duration,
    /// `None` keeps a dropped session closed.
    pub reconnect: Option<ReconnectConfig>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            reconnect: None,
        }
    }
}

/// Accepts `ws://` and `wss://` URLs only.
pub fn parse_session_url(raw: &str) -> Result<Url, SessionError> {
    let url = Url::parse(raw).map_err(|err| SessionError::InvalidUrl {
        url: raw.to_string(),
        message: err.to_string(),
    })?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(SessionError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme {other}"),
        }),
    }
}

enum Attempt {
    Connected(Box<Socket>),
    Failed(SessionError),
    Cancelled,
}

/// One streaming session: connect, pump frames both ways until closed,
/// optionally reconnect.
pub(crate) struct SessionTask {
    pub(crate) session: SessionId,
    pub(crate) url: Url,
    pub(crate) settings: SessionSettings,
    pub(crate) outbound: async_mpsc::UnboundedReceiver<String>,
    pub(crate) open: Arc<AtomicBool>,
    pub(crate) cancel: CancellationToken,
    pub(crate) events: mpsc::Sender<EngineEvent>,
}

impl SessionTask {
    pub(crate) async fn run(mut self) {
        let mut backoff = self.settings.reconnect.clone().map(Backoff::new);

        loop {
            match self.connect().await {
                Attempt::Cancelled => {
                    self.emit(EngineEvent::Closed {
                        session: self.session,
                    });
                    return;
                }
                Attempt::Failed(error) => {
                    dash_warn!("session {} to {}: {}", self.session, self.url, error);
                    self.emit(EngineEvent::Failed {
                        session: self.session,
                        error,
                    });
                }
                Attempt::Connected(socket) => {
                    // Anything queued while disconnected belongs to an old subscription.
                    while self.outbound.try_recv().is_ok() {}
                    self.open.store(true, Ordering::SeqCst);
                    dash_info!("session {} connected to {}", self.session, self.url);
                    self.emit(EngineEvent::Opened {
                        session: self.session,
                    });
                    self.pump(*socket).await;
                    self.open.store(false, Ordering::SeqCst);
                    if let Some(backoff) = backoff.as_mut() {
                        backoff.reset();
                    }
                }
            }

            self.emit(EngineEvent::Closed {
                session: self.session,
            });

            if self.cancel.is_cancelled() {
                return;
            }
            let Some(wait) = backoff.as_mut().map(Backoff::next_wait) else {
                return;
            };

            dash_info!(
                "session {} reconnecting in {} ms",
                self.session,
                wait.as_millis()
            );
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }

    async fn connect(&self) -> Attempt {
        tokio::select! {
            _ = self.cancel.cancelled() => Attempt::Cancelled,
            result = tokio::time::timeout(
                self.settings.connect_timeout,
                connect_async(self.url.as_str()),
            ) => match result {
                Ok(Ok((socket, _response))) => Attempt::Connected(Box::new(socket)),
                Ok(Err(err)) => Attempt::Failed(SessionError::Connect(err.to_string())),
                Err(_) => Attempt::Failed(SessionError::ConnectTimeout),
            },
        }
    }

    /// Runs until the peer closes, the transport fails or the session is
    /// cancelled. Cancellation does not drain inbound frames.
    async fn pump(&mut self, socket: Socket) {
        let (mut sink, mut source) = socket.split();
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    if let Err(err) = sink.send(Message::Close(None)).await {
                        dash_debug!("session {} close frame not sent: {}", self.session, err);
                    }
                    break;
                }
                Some(text) = self.outbound.recv() => {
                    dash_trace!("session {} send {}", self.session, text);
                    if let Err(err) = sink.send(Message::Text(text)).await {
                        self.fail(SessionError::Transport(err.to_string()));
                        break;
                    }
                }
                incoming = source.next() => match incoming {
                    Some(Ok(Message::Text(text))) => {
                        self.emit(EngineEvent::Frame {
                            session: self.session,
                            text,
                        });
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        dash_trace!(
                            "session {} ignoring {} byte binary frame",
                            self.session,
                            bytes.len()
                        );
                    }
                    Some(Ok(Message::Close(frame))) => {
                        dash_info!("session {} closed by peer: {:?}", self.session, frame);
                        break;
                    }
                    // Ping/pong are answered by tungstenite.
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        self.fail(SessionError::Transport(err.to_string()));
                        break;
                    }
                    None => break,
                },
            }
        }
    }

    fn fail(&self, error: SessionError) {
        dash_warn!("session {}: {}", self.session, error);
        self.emit(EngineEvent::Failed {
            session: self.session,
            error,
        });
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }
}
