//! Shared deterministic types for story generation.
//!
//! These types carry no I/O. They define the shape of a generation run so the
//! driver and its tests agree on ordering and limits.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Role of a generated section within the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Opening,
    Continuation,
    Closing,
}

impl SectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Opening => "opening",
            SectionKind::Continuation => "continuation",
            SectionKind::Closing => "closing",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of parts in a story. Always at least [`PartCount::MIN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PartCount(u32);

impl PartCount {
    /// An opening, at least two continuations, and a closing.
    pub const MIN: u32 = 4;

    pub fn new(requested: u32) -> Result<Self, ConfigError> {
        if requested < Self::MIN {
            return Err(ConfigError::PartCount {
                requested,
                minimum: Self::MIN,
            });
        }
        Ok(Self(requested))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of continuation sections between the opening and the closing.
    pub fn interior(self) -> u32 {
        self.0 - 2
    }

    /// Ordered section kinds for a run with this many parts.
    pub fn plan(self) -> Vec<SectionKind> {
        let mut plan = Vec::with_capacity(self.0 as usize);
        plan.push(SectionKind::Opening);
        plan.extend((0..self.interior()).map(|_| SectionKind::Continuation));
        plan.push(SectionKind::Closing);
        plan
    }
}

impl fmt::Display for PartCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sampling seed shared by every completion call of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSeed(i64);

impl RandomSeed {
    /// Draw a fresh seed in `0..i32::MAX`, a range every provider accepts.
    pub fn generate() -> Self {
        Self(rand::thread_rng().gen_range(0..i64::from(i32::MAX)))
    }

    pub fn fixed(value: i64) -> Self {
        Self(value)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}
