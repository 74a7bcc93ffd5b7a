//! Dashboard engine: streaming sessions and file upload IO.
mod engine;
mod reconnect;
mod session;
mod types;
mod upload;

pub use engine::EngineHandle;
pub use reconnect::{Backoff, ReconnectConfig};
pub use session::{parse_session_url, SessionSettings};
pub use types::{EngineEvent, SessionError, SessionId};
pub use upload::{
    ReqwestUploader, UploadError, UploadReceipt, UploadSettings, Uploader,
    DEFAULT_UPLOAD_ENDPOINT,
};
