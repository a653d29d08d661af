// File: ./src/lib.rs
pub mod app;
pub mod client;
pub mod clock;
pub mod color_utils;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod sound;
pub mod store;
pub mod sync;
pub mod view;

#[cfg(feature = "tui")]
pub mod tui;
