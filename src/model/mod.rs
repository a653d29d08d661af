// File: ./src/model/mod.rs
pub mod adapter;
pub mod item;

pub use item::{
    Column, DATE_FORMAT, Priority, RowPosition, TIME_FORMAT, Task, TaskDraft, TaskKey,
    TaskStatus, now_time_string, today_string,
};
