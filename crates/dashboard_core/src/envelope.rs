//! Wire frames: the outbound page request and the inbound `{type, payload}`
//! envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dashboard_logging::dash_warn;

use crate::window::Pagination;
use crate::Record;

/// Request frame sent on session open and on every page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Page is at least 1 and limit at least 1.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "page": self.page, "limit": self.limit }).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    Init,
    FetchNew,
}

/// A decoded inbound frame for one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<R> {
    Snapshot {
        kind: SnapshotKind,
        data: Vec<R>,
        pagination: Option<Pagination>,
    },
    Update(Vec<R>),
    /// Tag not addressed to this collection's handlers.
    Ignored(String),
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("{tag} frame has no `{field}` sequence")]
    Schema { tag: String, field: &'static str },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    payload: Value,
}

/// Decode one text frame for the collection of `R`.
///
/// Array elements that do not decode as `R` are skipped; the frame as a
/// whole is only rejected when it is not an envelope or its payload lacks
/// the expected sequence.
pub fn decode_frame<R: Record>(text: &str) -> Result<Frame<R>, FrameError> {
    let RawEnvelope { tag, payload } = serde_json::from_str(text)?;

    let prefix = R::COLLECTION.tag_prefix();
    let suffix = tag
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'));

    match suffix {
        Some("INIT") => decode_snapshot(tag, SnapshotKind::Init, payload),
        Some("FETCH_NEW") => decode_snapshot(tag, SnapshotKind::FetchNew, payload),
        Some("UPDATE") => match payload {
            Value::Array(items) => Ok(Frame::Update(decode_records(&tag, items))),
            _ => Err(FrameError::Schema {
                tag,
                field: "payload",
            }),
        },
        _ => Ok(Frame::Ignored(tag)),
    }
}

fn decode_snapshot<R: Record>(
    tag: String,
    kind: SnapshotKind,
    payload: Value,
) -> Result<Frame<R>, FrameError> {
    let Value::Object(mut fields) = payload else {
        return Err(FrameError::Schema { tag, field: "data" });
    };
    let Some(Value::Array(items)) = fields.remove("data") else {
        return Err(FrameError::Schema { tag, field: "data" });
    };

    let pagination = match fields.remove("pagination") {
        None | Some(Value::Null) => None,
        Some(raw) => match serde_json::from_value::<Pagination>(raw) {
            Ok(pagination) => Some(pagination),
            Err(err) => {
                dash_warn!("{tag}: ignoring malformed pagination: {err}");
                None
            }
        },
    };

    Ok(Frame::Snapshot {
        kind,
        data: decode_records(&tag, items),
        pagination,
    })
}

fn decode_records<R: Record>(tag: &str, items: Vec<Value>) -> Vec<R> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<R>(item) {
            Ok(record) => Some(record),
            Err(err) => {
                dash_warn!("{tag}: skipping record #{index}: {err}");
                None
            }
        })
        .collect()
}
