use std::io::{self, Write};

use chrono::FixedOffset;
use dashboard_core::{
    format_duration, parse_timestamp, ConnectionState, Job, Record, SortDirection, ViewModel,
    Worker,
};

const EMPTY_CELL: &str = "-";
const MAX_CELL_WIDTH: usize = 40;

pub struct Column {
    /// Sort key accepted by `sort` and `click`.
    pub key: &'static str,
    pub title: &'static str,
}

/// A record that can be laid out as one table row.
pub trait TableRow: Record {
    const COLUMNS: &'static [Column];

    /// One cell per entry of `COLUMNS`; timestamps shown at `offset`.
    fn cells(&self, offset: FixedOffset) -> Vec<String>;
}

impl TableRow for Job {
    const COLUMNS: &'static [Column] = &[
        Column { key: "job_id", title: "Job ID" },
        Column { key: "s3_key", title: "Key" },
        Column { key: "status", title: "Status" },
        Column { key: "worker_id", title: "Worker ID" },
        Column { key: "duration", title: "Duration" },
        Column { key: "timestamps.created_at", title: "Date" },
        Column { key: "timestamps.created_at", title: "Created At" },
        Column { key: "timestamps.assigned_at", title: "Assigned At" },
        Column { key: "timestamps.completed_at", title: "Completed At" },
    ];

    fn cells(&self, offset: FixedOffset) -> Vec<String> {
        let timestamps = &self.timestamps;
        vec![
            text(self.job_id.as_deref()),
            text(self.s3_key.as_deref()),
            text(self.status.map(|status| status.as_str())),
            text(self.worker_id.as_deref()),
            self.duration()
                .map(format_duration)
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            timestamp(timestamps.created_at.as_deref(), offset, "%m/%d/%Y"),
            timestamp(timestamps.created_at.as_deref(), offset, "%I:%M:%S %p"),
            timestamp(timestamps.assigned_at.as_deref(), offset, "%I:%M:%S %p"),
            timestamp(timestamps.completed_at.as_deref(), offset, "%I:%M:%S %p"),
        ]
    }
}

impl TableRow for Worker {
    const COLUMNS: &'static [Column] = &[
        Column { key: "worker_id", title: "Worker ID" },
        Column { key: "status", title: "Status" },
        Column { key: "last_heartbeat", title: "Last Heartbeat" },
        Column { key: "current_job_id", title: "Current Job" },
    ];

    fn cells(&self, offset: FixedOffset) -> Vec<String> {
        vec![
            text(self.worker_id.as_deref()),
            text(self.status.map(|status| status.as_str())),
            timestamp(self.last_heartbeat.as_deref(), offset, "%Y-%m-%d"),
            text(self.current_job_id.as_deref()),
        ]
    }
}

fn text(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

fn timestamp(raw: Option<&str>, offset: FixedOffset, format: &str) -> String {
    raw.and_then(parse_timestamp)
        .map(|parsed| parsed.with_timezone(&offset).format(format).to_string())
        .unwrap_or_else(|| EMPTY_CELL.to_string())
}

/// One-line summary: collection, page, limit, sort and connection status.
pub fn status_line<R>(view: &ViewModel<R>) -> String {
    let pages = match view.total_pages() {
        Some(total) => format!("page {}/{}", view.page, total),
        None => format!("page {}", view.page),
    };
    let sort = view
        .sort
        .as_ref()
        .map(|sort| format!("  sort {sort}"))
        .unwrap_or_default();
    let connection = match view.connection {
        ConnectionState::Unmounted => "offline",
        ConnectionState::Connecting => "connecting",
        ConnectionState::Open => "live",
        ConnectionState::Closed => "disconnected",
    };

    let mut line = format!(
        "{}  {}  limit {}{}  [{}]",
        view.collection.label(),
        pages,
        view.limit,
        sort,
        connection
    );
    if view.loading {
        line.push_str(" loading");
    }
    if view.stale {
        line.push_str(" stale");
    }
    line
}

/// Draws the status line, the table and an optional notice.
pub fn render_view<R: TableRow, W: Write>(
    out: &mut W,
    view: &ViewModel<R>,
    offset: FixedOffset,
    notice: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "{}", status_line(view))?;
    writeln!(out)?;

    // Columns can share a sort key; the marker goes on the first of them.
    let marked = view.sort.as_ref().and_then(|sort| {
        R::COLUMNS
            .iter()
            .position(|column| column.key == sort.column)
            .map(|index| (index, sort.direction))
    });
    let titles: Vec<String> = R::COLUMNS
        .iter()
        .enumerate()
        .map(|(index, column)| match marked {
            Some((marked_index, SortDirection::Ascending)) if marked_index == index => {
                format!("{} ^", column.title)
            }
            Some((marked_index, SortDirection::Descending)) if marked_index == index => {
                format!("{} v", column.title)
            }
            _ => column.title.to_string(),
        })
        .collect();
    let rows: Vec<Vec<String>> = view.rows.iter().map(|row| row.cells(offset)).collect();

    let mut widths: Vec<usize> = titles.iter().map(|title| title.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count()).min(MAX_CELL_WIDTH);
        }
    }

    write_row(out, &titles, &widths)?;
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    write_row(out, &rule, &widths)?;
    if rows.is_empty() {
        let message = if view.loading { "(loading)" } else { "(no rows)" };
        writeln!(out, "{message}")?;
    }
    for row in &rows {
        write_row(out, row, &widths)?;
    }

    if let Some(notice) = notice {
        writeln!(out)?;
        writeln!(out, "{notice}")?;
    }
    out.flush()
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", clip(cell, *width), width = *width))
        .collect();
    writeln!(out, "{}", line.join("  ").trim_end())
}

fn clip(cell: &str, width: usize) -> String {
    if cell.chars().count() <= width {
        return cell.to_string();
    }
    let mut clipped: String = cell.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}
