//! Line commands typed while a view is running.

use dashboard_core::{Msg, SortDescriptor, SortDirection};

pub const HELP: &str =
    "commands: page N | next | prev | limit N | sort [COL [asc|desc]] | click COL | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Page(u32),
    Next,
    Prev,
    Limit(u32),
    Sort(Option<SortDescriptor>),
    Click(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{command}` needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("`{0}` is not a positive number")]
    NotPositive(String),
    #[error("unknown sort direction `{0}`")]
    Direction(String),
}

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Unknown(String::new()));
    };

    match head.to_ascii_lowercase().as_str() {
        "page" | "p" => positive(words.next(), "page", "a page number").map(Command::Page),
        "next" | "n" => Ok(Command::Next),
        "prev" | "previous" => Ok(Command::Prev),
        "limit" | "l" => positive(words.next(), "limit", "a page size").map(Command::Limit),
        "sort" | "s" => {
            let Some(column) = words.next() else {
                return Ok(Command::Sort(None));
            };
            let direction = match words.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") | Some("ascending") => SortDirection::Ascending,
                Some("desc") | Some("descending") => SortDirection::Descending,
                Some(other) => return Err(CommandError::Direction(other.to_string())),
            };
            Ok(Command::Sort(Some(SortDescriptor {
                column: column.to_string(),
                direction,
            })))
        }
        "click" | "c" => words
            .next()
            .map(|column| Command::Click(column.to_string()))
            .ok_or(CommandError::MissingArgument {
                command: "click",
                expected: "a column",
            }),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn positive(
    word: Option<&str>,
    command: &'static str,
    expected: &'static str,
) -> Result<u32, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument { command, expected })?;
    match word.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(CommandError::NotPositive(word.to_string())),
    }
}

impl Command {
    /// The message this command maps to, given the current page. `None` for
    /// navigation past either end and for commands handled by the app itself.
    pub fn to_msg(&self, page: u32, total_pages: Option<u64>) -> Option<Msg> {
        match self {
            Command::Page(target) => Some(Msg::PageRequested(*target)),
            Command::Next => {
                let at_end = total_pages.is_some_and(|total| u64::from(page) >= total);
                (!at_end).then(|| Msg::PageRequested(page.saturating_add(1)))
            }
            Command::Prev => (page > 1).then(|| Msg::PageRequested(page - 1)),
            Command::Limit(limit) => Some(Msg::LimitChanged(*limit)),
            Command::Sort(sort) => Some(Msg::SortChanged(sort.clone())),
            Command::Click(column) => Some(Msg::SortColumnClicked(column.clone())),
            Command::Quit => Some(Msg::Unmounted),
            Command::Help => None,
        }
    }
}
