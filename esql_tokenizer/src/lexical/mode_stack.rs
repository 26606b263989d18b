//! Per-session stack of lexical modes
//!
//! The bottom entry is the session's initial mode and is never removed, so
//! `current()` is always defined.

use crate::config::compile_time::lexical::MAX_MODE_DEPTH;
use crate::rules::ModeId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeStackError {
    #[error("Mode stack overflow pushing {mode}: depth limit is {limit}")]
    Overflow { mode: ModeId, limit: usize },
}

#[derive(Debug, Clone)]
pub(crate) struct ModeStack {
    modes: Vec<ModeId>,
    limit: usize,
}

impl ModeStack {
    pub fn new(bottom: ModeId) -> Self {
        Self::with_limit(bottom, MAX_MODE_DEPTH)
    }

    pub fn with_limit(bottom: ModeId, limit: usize) -> Self {
        let mut modes = Vec::with_capacity(8);
        modes.push(bottom);
        Self {
            modes,
            limit: limit.max(1),
        }
    }

    pub fn current(&self) -> ModeId {
        // The bottom entry is never popped
        self.modes[self.modes.len() - 1]
    }

    /// Push `mode`; the stack is left untouched when the depth limit is reached
    pub fn push(&mut self, mode: ModeId) -> Result<(), ModeStackError> {
        if self.modes.len() >= self.limit {
            return Err(ModeStackError::Overflow {
                mode,
                limit: self.limit,
            });
        }
        self.modes.push(mode);
        Ok(())
    }

    /// Pop the top mode. Popping the bottom entry is a no-op returning `None`.
    pub fn pop(&mut self) -> Option<ModeId> {
        if self.modes.len() > 1 {
            self.modes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.modes.len()
    }

    /// Only the bottom mode remains
    pub fn is_balanced(&self) -> bool {
        self.modes.len() == 1
    }

    /// Bottom to top
    pub fn modes(&self) -> &[ModeId] {
        &self.modes
    }
}
