//! Story draft accumulator.
//!
//! The draft grows by appending sections. Ordering is enforced on every
//! append: one opening first, any number of continuations, one closing last.

use crate::core::types::SectionKind;
use crate::error::DraftError;

/// Separator placed before every section.
pub const SECTION_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftState {
    Empty,
    Open,
    Closed,
}

/// Markdown text generated so far, plus the kinds appended to it.
#[derive(Debug, Clone)]
pub struct Draft {
    text: String,
    sections: Vec<SectionKind>,
    state: DraftState,
}

impl Default for Draft {
    fn default() -> Self {
        Self::new()
    }
}

impl Draft {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            sections: Vec::new(),
            state: DraftState::Empty,
        }
    }

    /// Append a section, rejecting out-of-order kinds.
    pub fn append(&mut self, kind: SectionKind, section: &str) -> Result<(), DraftError> {
        self.state = match (self.state, kind) {
            (DraftState::Empty, SectionKind::Opening) => DraftState::Open,
            (DraftState::Empty, other) => return Err(DraftError::MissingOpening(other)),
            (DraftState::Open, SectionKind::Opening) => return Err(DraftError::DuplicateOpening),
            (DraftState::Open, SectionKind::Continuation) => DraftState::Open,
            (DraftState::Open, SectionKind::Closing) => DraftState::Closed,
            (DraftState::Closed, other) => return Err(DraftError::Closed(other)),
        };
        self.text.push_str(SECTION_SEPARATOR);
        self.text.push_str(section);
        self.sections.push(kind);
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn sections(&self) -> &[SectionKind] {
        &self.sections
    }

    pub fn is_closed(&self) -> bool {
        self.state == DraftState::Closed
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
