use crate::metrics::MetricsUpdate;
use crate::score_store::SessionRecord;
use crate::session::{CharState, Cursor, Word};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, trace};

/// Render hooks emitted by the controller. Every method defaults to a no-op.
pub trait SessionObserver {
    fn on_words_regenerated(&mut self, _words: &[Word]) {}
    fn on_char_state_changed(&mut self, _pos: Cursor, _state: CharState) {}
    fn on_cursor_moved(&mut self, _cursor: Cursor) {}
    fn on_metrics_updated(&mut self, _update: MetricsUpdate) {}
    fn on_session_finished(&mut self, _record: &SessionRecord, _is_new_high: bool) {}
}

/// Logs every hook through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_words_regenerated(&mut self, words: &[Word]) {
        debug!(count = words.len(), "words regenerated");
    }

    fn on_char_state_changed(&mut self, pos: Cursor, state: CharState) {
        trace!(word = pos.word, char = pos.char, ?state, "char state changed");
    }

    fn on_cursor_moved(&mut self, cursor: Cursor) {
        trace!(word = cursor.word, char = cursor.char, "cursor moved");
    }

    fn on_metrics_updated(&mut self, update: MetricsUpdate) {
        trace!(
            wpm = update.metrics.wpm,
            accuracy = update.metrics.accuracy,
            time_left_ms = update.time_left.as_millis() as u64,
            "metrics updated"
        );
    }

    fn on_session_finished(&mut self, record: &SessionRecord, is_new_high: bool) {
        info!(
            wpm = record.wpm,
            accuracy = record.accuracy,
            is_new_high,
            "session finished"
        );
    }
}

/// Owned copy of one hook invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    WordsRegenerated(Vec<Word>),
    CharStateChanged(Cursor, CharState),
    CursorMoved(Cursor),
    MetricsUpdated(MetricsUpdate),
    SessionFinished {
        record: SessionRecord,
        is_new_high: bool,
    },
}

/// Collects hook invocations; clones share one log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<SessionEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<SessionEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    fn push(&self, event: SessionEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl SessionObserver for EventLog {
    fn on_words_regenerated(&mut self, words: &[Word]) {
        self.push(SessionEvent::WordsRegenerated(words.to_vec()));
    }

    fn on_char_state_changed(&mut self, pos: Cursor, state: CharState) {
        self.push(SessionEvent::CharStateChanged(pos, state));
    }

    fn on_cursor_moved(&mut self, cursor: Cursor) {
        self.push(SessionEvent::CursorMoved(cursor));
    }

    fn on_metrics_updated(&mut self, update: MetricsUpdate) {
        self.push(SessionEvent::MetricsUpdated(update));
    }

    fn on_session_finished(&mut self, record: &SessionRecord, is_new_high: bool) {
        self.push(SessionEvent::SessionFinished {
            record: record.clone(),
            is_new_high,
        });
    }
}
