use tokio::time::{Duration, Instant};

use crate::{api::Note, state::NoteDraft};

/// Coalesces bursts of edits into a single update.
///
/// Each edit replaces the pending draft and restarts the quiet period; the
/// draft becomes due once no edit has arrived for `quiet`.
pub struct EditDebouncer {
    quiet: Duration,
    pending: Option<(NoteDraft, Instant)>,
}

impl EditDebouncer {
    pub const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn pending(&self) -> Option<&NoteDraft> {
        self.pending.as_ref().map(|(draft, _)| draft)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    /// Queues `draft`. A pending draft for a different note is handed back
    /// so it can be sent right away instead of being lost.
    pub fn push(&mut self, draft: NoteDraft, now: Instant) -> Option<NoteDraft> {
        let displaced = self
            .pending
            .take()
            .map(|(previous, _)| previous)
            .filter(|previous| previous.id != draft.id);

        self.pending = Some((draft, now + self.quiet));
        displaced
    }

    /// Builds the draft for an edit to `active`, on top of what is already
    /// buffered for that note. With no active note the draft has no id.
    pub fn draft_for(&self, active: Option<&Note>, edit: impl FnOnce(&mut NoteDraft)) -> NoteDraft {
        let mut draft = match (self.pending(), active) {
            (Some(pending), Some(active)) if pending.id == Some(active.id) => pending.clone(),
            (_, Some(active)) => NoteDraft::from(active),
            (_, None) => NoteDraft {
                id: None,
                title: String::new(),
                content: String::new(),
            },
        };
        edit(&mut draft);
        draft
    }

    pub fn take_due(&mut self, now: Instant) -> Option<NoteDraft> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.flush(),
            _ => None,
        }
    }

    pub fn flush(&mut self) -> Option<NoteDraft> {
        self.pending.take().map(|(draft, _)| draft)
    }
}
