pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Opened {
        session: SessionId,
    },
    Frame {
        session: SessionId,
        text: String,
    },
    Failed {
        session: SessionId,
        error: SessionError,
    },
    /// Emitted once per connection attempt that ended, including attempts
    /// that never opened.
    Closed {
        session: SessionId,
    },
}

impl EngineEvent {
    pub fn session(&self) -> SessionId {
        match self {
            EngineEvent::Opened { session }
            | EngineEvent::Frame { session, .. }
            | EngineEvent::Failed { session, .. }
            | EngineEvent::Closed { session } => *session,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("invalid session url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("connect timed out")]
    ConnectTimeout,
    #[error("transport error: {0}")]
    Transport(String),
}
