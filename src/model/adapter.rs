// File: ./src/model/adapter.rs
// Handles conversion between sheet rows (positional cells) and tasks
use crate::model::item::{Column, Task, TaskStatus};

impl Task {
    /// Cells in sheet column order, ready to be written as one row.
    pub fn to_row(&self) -> Vec<String> {
        Column::ALL.iter().map(|c| self.cell(*c)).collect()
    }

    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Task => self.task.clone(),
            Column::Date => self.date.clone(),
            Column::Status => self.status.as_cell().to_string(),
            Column::Priority => self
                .priority
                .map(|p| p.as_cell().to_string())
                .unwrap_or_default(),
            Column::CreatedTime => self.created_time.clone(),
            Column::Note => self.note.clone(),
        }
    }

    /// Builds a task from one row of cells.
    ///
    /// The Sheets API drops trailing empty cells, so short rows are padded
    /// with empty strings rather than rejected: every row must map to a task
    /// or positions would stop lining up with the sheet.
    pub fn from_row(cells: &[String]) -> Self {
        let get = |c: Column| {
            cells
                .get(c.index())
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        Task {
            task: get(Column::Task),
            date: get(Column::Date),
            status: TaskStatus::from_cell(&get(Column::Status)),
            priority: get(Column::Priority).parse().ok(),
            created_time: get(Column::CreatedTime),
            // Notes keep their whitespace
            note: cells.get(Column::Note.index()).cloned().unwrap_or_default(),
        }
    }

    /// Writes `value` into the field backing `column`.
    pub fn apply_cell(&mut self, column: Column, value: &str) {
        match column {
            Column::Task => self.task = value.to_string(),
            Column::Date => self.date = value.to_string(),
            Column::Status => self.status = TaskStatus::from_cell(value),
            Column::Priority => self.priority = value.parse().ok(),
            Column::CreatedTime => self.created_time = value.to_string(),
            Column::Note => self.note = value.to_string(),
        }
    }
}
