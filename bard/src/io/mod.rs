//! I/O helpers for bard commands.

pub mod completion;
pub mod config;
pub mod init;
pub mod prompt;
pub mod providers;
pub mod render;
pub mod storage;
