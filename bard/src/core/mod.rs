//! Deterministic, pure logic shared by the story pipeline.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! values and return deterministic outputs suitable for tests.

pub mod draft;
pub mod provider;
pub mod slug;
pub mod template;
pub mod types;
