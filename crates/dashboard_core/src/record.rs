use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::collection::Collection;
use crate::sort::SortKey;

/// A row of a live collection.
///
/// Everything except the identity key is opaque to synchronization; the key
/// may be absent on the wire, in which case the record can never be matched.
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + 'static
{
    const COLLECTION: Collection;

    fn identity(&self) -> Option<&str>;

    /// Value of `column` for display sorting. Unknown columns fall back to
    /// the preserved extra fields, looked up by dotted path.
    fn sort_key(&self, column: &str) -> SortKey<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Done,
    Failed,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Unknown => "unknown",
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    Idle,
    Busy,
    Offline,
    #[serde(other)]
    Unknown,
}

impl WorkerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerStatus::Idle => "idle",
            WorkerStatus::Busy => "busy",
            WorkerStatus::Offline => "offline",
            WorkerStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobTimestamps {
    #[serde(default, deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub assigned_at: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub completed_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub worker_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<JobStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub s3_key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub bucket_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamps: JobTimestamps,
    #[serde(default, deserialize_with = "string_or_seq")]
    pub logs: Vec<String>,
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub result_content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Job {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Time between assignment and completion of a finished job.
    pub fn duration(&self) -> Option<TimeDelta> {
        if !self.status.is_some_and(JobStatus::is_finished) {
            return None;
        }
        let start = parse_timestamp(self.timestamps.assigned_at.as_deref()?)?;
        let end = parse_timestamp(self.timestamps.completed_at.as_deref()?)?;
        let elapsed = end - start;
        (elapsed >= TimeDelta::zero()).then_some(elapsed)
    }
}

impl Record for Job {
    const COLLECTION: Collection = Collection::Jobs;

    fn identity(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    fn sort_key(&self, column: &str) -> SortKey<'_> {
        match column {
            "job_id" => self.job_id.as_deref().into(),
            "worker_id" => self.worker_id.as_deref().into(),
            "status" => self.status.map(JobStatus::as_str).into(),
            "s3_key" => self.s3_key.as_deref().into(),
            "bucket_name" => self.bucket_name.as_deref().into(),
            "created_at" | "timestamps.created_at" => {
                self.timestamps.created_at.as_deref().into()
            }
            "assigned_at" | "timestamps.assigned_at" => {
                self.timestamps.assigned_at.as_deref().into()
            }
            "completed_at" | "timestamps.completed_at" => {
                self.timestamps.completed_at.as_deref().into()
            }
            "duration" => match self.duration() {
                Some(elapsed) => SortKey::Number(elapsed.num_milliseconds() as f64 / 1000.0),
                None => SortKey::Missing,
            },
            other => match other.strip_prefix("timestamps.") {
                Some(rest) => lookup_path(&self.timestamps.extra, rest),
                None => lookup_path(&self.extra, other),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Worker {
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<WorkerStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_heartbeat: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_job_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Worker {
    pub fn new(worker_id: impl Into<String>) -> Self {
        Self {
            worker_id: Some(worker_id.into()),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: WorkerStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Record for Worker {
    const COLLECTION: Collection = Collection::Workers;

    fn identity(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }

    fn sort_key(&self, column: &str) -> SortKey<'_> {
        match column {
            "worker_id" => self.worker_id.as_deref().into(),
            "status" => self.status.map(WorkerStatus::as_str).into(),
            "last_heartbeat" => self.last_heartbeat.as_deref().into(),
            "current_job_id" => self.current_job_id.as_deref().into(),
            "updated_at" => self.updated_at.as_deref().into(),
            other => lookup_path(&self.extra, other),
        }
    }
}

/// Parse a server timestamp: RFC 3339, or naive ISO-8601 taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// `"{minutes}m {seconds}s"`, sub-second remainder dropped.
pub fn format_duration(elapsed: TimeDelta) -> String {
    let total_seconds = elapsed.num_seconds().max(0);
    format!("{}m {}s", total_seconds / 60, total_seconds % 60)
}

fn lookup_path<'a>(fields: &'a Map<String, Value>, path: &str) -> SortKey<'a> {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return SortKey::Missing;
    };
    let mut current = fields.get(first);
    for segment in segments {
        current = current.and_then(|value| value.get(segment));
    }
    current.map(SortKey::from).unwrap_or(SortKey::Missing)
}

/// Non-identity fields: a value of the wrong shape reads as the default
/// instead of failing the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

/// `logs` is a single line or a list of lines; non-string entries are dropped.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(line) if line.is_empty() => Vec::new(),
        Value::String(line) => vec![line],
        Value::Array(lines) => lines
            .into_iter()
            .filter_map(|line| match line {
                Value::String(line) => Some(line),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
