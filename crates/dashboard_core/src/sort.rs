use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDescriptor {
    pub column: String,
    pub direction: SortDirection,
}

impl SortDescriptor {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for SortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        };
        write!(f, "{}:{}", self.column, direction)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortParseError {
    #[error("sort column is empty")]
    EmptyColumn,
    #[error("unknown sort direction `{0}` (expected asc or desc)")]
    UnknownDirection(String),
}

/// Parses `column`, `column:asc` or `column:desc`.
impl FromStr for SortDescriptor {
    type Err = SortParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (column, direction) = match raw.trim().rsplit_once(':') {
            Some((column, direction)) => (column.trim(), Some(direction.trim())),
            None => (raw.trim(), None),
        };
        if column.is_empty() {
            return Err(SortParseError::EmptyColumn);
        }
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") | Some("ascending") => SortDirection::Ascending,
            Some("desc") | Some("descending") => SortDirection::Descending,
            Some(other) => return Err(SortParseError::UnknownDirection(other.to_string())),
        };
        Ok(Self {
            column: column.to_string(),
            direction,
        })
    }
}

/// A column value as seen by the comparator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Missing,
    Text(&'a str),
    Number(f64),
    Flag(bool),
}

impl<'a> From<Option<&'a str>> for SortKey<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map(SortKey::Text).unwrap_or(SortKey::Missing)
    }
}

impl<'a> From<&'a Value> for SortKey<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => SortKey::Missing,
            Value::String(text) => SortKey::Text(text),
            Value::Number(number) => number
                .as_f64()
                .map(SortKey::Number)
                .unwrap_or(SortKey::Missing),
            Value::Bool(flag) => SortKey::Flag(*flag),
            // Containers have no natural order.
            Value::Array(_) | Value::Object(_) => SortKey::Missing,
        }
    }
}

/// Missing values go last ascending and first descending, whatever the
/// other side holds. Values of different kinds order by kind: flags, then
/// numbers, then text.
pub fn compare_keys(a: SortKey<'_>, b: SortKey<'_>, direction: SortDirection) -> Ordering {
    let ascending = direction == SortDirection::Ascending;
    match (a, b) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => {
            if ascending {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        (_, SortKey::Missing) => {
            if ascending {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (a, b) => {
            let ordering = compare_present(a, b);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        }
    }
}

fn compare_present(a: SortKey<'_>, b: SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => a
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase)),
        (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (SortKey::Flag(a), SortKey::Flag(b)) => a.cmp(&b),
        (a, b) => kind_rank(a).cmp(&kind_rank(b)),
    }
}

// Keeps the comparator a total order when a column mixes kinds.
fn kind_rank(key: SortKey<'_>) -> u8 {
    match key {
        SortKey::Flag(_) => 0,
        SortKey::Number(_) => 1,
        SortKey::Text(_) => 2,
        SortKey::Missing => 3,
    }
}

/// Display order of `records` under `sort`. The input is never reordered.
pub fn project<'a, R: Record>(records: &'a [R], sort: Option<&SortDescriptor>) -> Vec<&'a R> {
    let mut ordered: Vec<&R> = records.iter().collect();
    if let Some(sort) = sort {
        ordered.sort_by(|a, b| {
            compare_keys(
                a.sort_key(&sort.column),
                b.sort_key(&sort.column),
                sort.direction,
            )
        });
    }
    ordered
}
