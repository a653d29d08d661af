// File: ./src/model/item.rs
use chrono::Local;
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    NotDone,
    Done,
}

impl TaskStatus {
    pub fn is_done(self) -> bool {
        self == TaskStatus::Done
    }

    pub fn flip(self) -> Self {
        match self {
            TaskStatus::Done => TaskStatus::NotDone,
            TaskStatus::NotDone => TaskStatus::Done,
        }
    }

    pub fn as_cell(self) -> &'static str {
        match self {
            TaskStatus::Done => "Done",
            TaskStatus::NotDone => "Not Done",
        }
    }

    /// Anything that isn't exactly "Done" counts as pending.
    pub fn from_cell(cell: &str) -> Self {
        if cell.trim() == "Done" {
            TaskStatus::Done
        } else {
            TaskStatus::NotDone
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    VeryImportant,
    Important,
    #[default]
    LessImportant,
}

impl Priority {
    pub const ALL: [Priority; 3] = [
        Priority::VeryImportant,
        Priority::Important,
        Priority::LessImportant,
    ];

    pub fn as_cell(self) -> &'static str {
        match self {
            Priority::VeryImportant => "Very Important",
            Priority::Important => "Important",
            Priority::LessImportant => "Less Important",
        }
    }

    /// Cycles towards higher urgency, wrapping around.
    pub fn raise(self) -> Self {
        match self {
            Priority::LessImportant => Priority::Important,
            Priority::Important => Priority::VeryImportant,
            Priority::VeryImportant => Priority::LessImportant,
        }
    }

    pub fn lower(self) -> Self {
        match self {
            Priority::VeryImportant => Priority::Important,
            Priority::Important => Priority::LessImportant,
            Priority::LessImportant => Priority::VeryImportant,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_cell())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_cell() == s.trim())
            .ok_or_else(|| format!("Unknown priority: {}", s))
    }
}

/// Zero-based index of a data row (the header is not counted).
///
/// Only valid against the snapshot it was read from: any insert or delete
/// above it shifts every following row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowPosition(pub usize);

impl RowPosition {
    /// 1-based sheet row, accounting for the header in row 1.
    pub fn sheet_row(self) -> usize {
        self.0 + 2
    }
}

impl fmt::Display for RowPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sheet columns, in their fixed on-sheet order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Task,
    Date,
    Status,
    Priority,
    CreatedTime,
    Note,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Task,
        Column::Date,
        Column::Status,
        Column::Priority,
        Column::CreatedTime,
        Column::Note,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Task => "Task",
            Column::Date => "Date",
            Column::Status => "Status",
            Column::Priority => "Priority",
            Column::CreatedTime => "Time",
            Column::Note => "Note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub task: String,
    pub date: String,
    pub status: TaskStatus,
    /// `None` when the cell holds something we don't recognise.
    pub priority: Option<Priority>,
    pub created_time: String,
    pub note: String,
}

/// Identity used to re-locate a row whose position may have shifted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskKey {
    pub task: String,
    pub created_time: String,
}

impl Task {
    pub fn key(&self) -> TaskKey {
        TaskKey {
            task: self.task.clone(),
            created_time: self.created_time.clone(),
        }
    }
}

/// What the user typed; the store turns it into a [`Task`] when inserting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub task: String,
    pub date: String,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn into_task(self, created_time: String) -> Task {
        Task {
            task: self.task,
            date: self.date,
            status: TaskStatus::NotDone,
            priority: Some(self.priority),
            created_time,
            note: String::new(),
        }
    }
}

pub fn today_string() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

pub fn now_time_string() -> String {
    Local::now().format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_cells() {
        assert_eq!(TaskStatus::from_cell("Done"), TaskStatus::Done);
        assert_eq!(TaskStatus::from_cell("Not Done"), TaskStatus::NotDone);
        assert_eq!(TaskStatus::from_cell(""), TaskStatus::NotDone);
        assert_eq!(TaskStatus::Done.flip().as_cell(), "Not Done");
    }

    #[test]
    fn priority_parsing() {
        assert_eq!("Important".parse::<Priority>(), Ok(Priority::Important));
        assert_eq!(
            " Very Important ".parse::<Priority>(),
            Ok(Priority::VeryImportant)
        );
        assert!("Urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::LessImportant);
    }

    #[test]
    fn priority_cycles_both_ways() {
        for p in Priority::ALL {
            assert_eq!(p.raise().lower(), p);
        }
    }

    #[test]
    fn columns_are_positional() {
        assert_eq!(Column::Task.letter(), 'A');
        assert_eq!(Column::Status.letter(), 'C');
        assert_eq!(Column::Note.letter(), 'F');
        assert_eq!(Column::Note.index(), 5);
        assert_eq!(RowPosition(0).sheet_row(), 2);
    }
}
