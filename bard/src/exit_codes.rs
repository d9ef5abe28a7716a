//! Stable exit codes for bard CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Startup, config, provider, or file error; the command stopped.
pub const FATAL: i32 = 1;
/// Invalid command line. Reported by `clap` before any command runs.
pub const USAGE: i32 = 2;
