//! Types shared between the refresh driver and its consumers.

/// Events emitted during a refresh run.
/// Used by the CLI to drive progress bars and status messages.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionEvent {
    Started {
        total_documents: usize,
    },
    DocumentStarted {
        document_id: i32,
    },
    /// Hash matched the stored one; nothing was recomputed or written.
    DocumentUnchanged {
        document_id: i32,
    },
    DocumentCompleted {
        document_id: i32,
        suggestions: usize,
        candidates: usize,
        fragments: usize,
    },
    DocumentFailed {
        document_id: i32,
        error: String,
    },
    Complete {
        updated: usize,
        unchanged: usize,
        failed: usize,
    },
}

/// Result of refreshing one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The suggestion set was recomputed and written.
    Updated {
        suggestions: usize,
        candidates: usize,
        fragments: usize,
    },
    Unchanged,
}

/// Totals of a full refresh run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RefreshSummary {
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.failed
    }
}
