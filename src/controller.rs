use crate::error::{Result, SessionError};
use crate::input::LogicalKey;
use crate::kv::KvStore;
use crate::metrics::{final_metrics, live_metrics, Metrics, MetricsUpdate};
use crate::observer::SessionObserver;
use crate::runtime::{Clock, SystemClock};
use crate::score_store::{ScoreStore, SessionRecord};
use crate::session::{Cursor, Regression, SessionState};
use crate::time_series::WpmTrace;
use crate::word_bank::WordBank;
use crate::word_sampler::{oversample_count, WordSampler};
use chrono::Utc;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Duration and word bank for the next session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    duration: Duration,
    bank: WordBank,
}

impl SessionConfig {
    pub fn new(duration: Duration, bank: WordBank) -> Self {
        Self { duration, bank }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn bank(&self) -> &WordBank {
        &self.bank
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration.is_zero() {
            return Err(SessionError::invalid("duration must be positive"));
        }
        if self.bank.is_empty() {
            return Err(SessionError::invalid(format!(
                "word bank '{}' is empty",
                self.bank.name()
            )));
        }
        Ok(())
    }
}

/// Identifies one run of the periodic tick. A handle from an earlier run is
/// stale and its ticks are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    handle: TickHandle,
    started_at: Instant,
    duration: Duration,
}

/// Character totals shown next to the final record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub words_typed: usize,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    pub total_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub record: SessionRecord,
    pub is_new_high: bool,
    pub best: SessionRecord,
    pub summary: SessionSummary,
}

/// Drives a typing session: owns the timer, routes keys into the session
/// state, keeps metrics current and reports results to the score store.
pub struct SessionController<S: KvStore, C: Clock = SystemClock, R: Rng = ThreadRng> {
    phase: Phase,
    config: SessionConfig,
    state: SessionState,
    sampler: WordSampler<R>,
    scores: ScoreStore<S>,
    clock: C,
    timer: Option<Timer>,
    generation: u64,
    metrics: Metrics,
    time_left: Duration,
    trace: WpmTrace,
    outcome: Option<SessionOutcome>,
    observers: Vec<Box<dyn SessionObserver>>,
}

fn notify(observers: &mut [Box<dyn SessionObserver>], mut f: impl FnMut(&mut dyn SessionObserver)) {
    for observer in observers.iter_mut() {
        f(observer.as_mut());
    }
}

impl<S: KvStore> SessionController<S> {
    /// Controller on the system clock with a thread-local rng.
    pub fn with_store(config: SessionConfig, store: S) -> Result<Self> {
        Self::new(config, store, SystemClock, WordSampler::new())
    }
}

impl<S: KvStore, C: Clock, R: Rng> SessionController<S, C, R> {
    /// Validates `config` and samples the idle preview words.
    pub fn new(config: SessionConfig, store: S, clock: C, mut sampler: WordSampler<R>) -> Result<Self> {
        config.validate()?;
        let words = sampler.sample(config.bank(), oversample_count(config.duration()))?;
        let state = SessionState::new(words)?;

        Ok(Self {
            phase: Phase::Idle,
            time_left: config.duration(),
            config,
            state,
            sampler,
            scores: ScoreStore::new(store),
            clock,
            timer: None,
            generation: 0,
            metrics: Metrics::default(),
            trace: WpmTrace::default(),
            outcome: None,
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn with_observer(mut self, observer: Box<dyn SessionObserver>) -> Self {
        self.add_observer(observer);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn time_left(&self) -> Duration {
        self.time_left
    }

    pub fn wpm_trace(&self) -> &WpmTrace {
        &self.trace
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn best(&self) -> Option<SessionRecord> {
        self.scores.current()
    }

    /// Handle of the running tick, if any.
    pub fn tick_handle(&self) -> Option<TickHandle> {
        self.timer.map(|t| t.handle)
    }

    /// Replace the configuration. Takes effect at the next `start`; when no
    /// session is running the preview word list is refreshed right away.
    pub fn configure(&mut self, config: SessionConfig) {
        debug!(
            duration_secs = config.duration().as_secs(),
            bank = config.bank().name(),
            phase = ?self.phase,
            "configuration changed"
        );
        self.config = config;

        if self.phase == Phase::Running {
            return;
        }
        self.time_left = self.config.duration();
        if let Err(e) = self.resample() {
            warn!(error = %e, "keeping previous preview words");
        }
        self.publish_metrics();
    }

    /// Begin a session. Starting while already running is a no-op that
    /// returns the live handle.
    pub fn start(&mut self) -> Result<TickHandle> {
        if let Some(timer) = self.timer.filter(|_| self.phase == Phase::Running) {
            debug!("start ignored, session already running");
            return Ok(timer.handle);
        }

        self.config.validate()?;
        let words = self
            .sampler
            .sample(self.config.bank(), oversample_count(self.config.duration()))?;
        self.state = SessionState::new(words)?;

        self.generation += 1;
        let handle = TickHandle {
            generation: self.generation,
        };
        self.timer = Some(Timer {
            handle,
            started_at: self.clock.now(),
            duration: self.config.duration(),
        });
        self.phase = Phase::Running;
        self.metrics = Metrics::default();
        self.time_left = self.config.duration();
        self.trace.clear();
        self.outcome = None;

        info!(
            generation = self.generation,
            duration_secs = self.config.duration().as_secs(),
            bank = self.config.bank().name(),
            words = self.state.words().len(),
            "session started"
        );

        notify(&mut self.observers, |o| o.on_words_regenerated(self.state.words()));
        notify(&mut self.observers, |o| o.on_cursor_moved(Cursor::default()));
        self.publish_metrics();

        Ok(handle)
    }

    /// Periodic timer callback. Returns the phase after the tick.
    pub fn tick(&mut self, handle: TickHandle) -> Phase {
        let Some(timer) = self.timer.filter(|t| t.handle == handle) else {
            trace!(generation = handle.generation, "stale tick ignored");
            return self.phase;
        };

        let elapsed = self.elapsed(&timer);
        self.time_left = timer.duration.saturating_sub(elapsed);

        if self.time_left.is_zero() {
            self.finish();
        } else {
            self.refresh_live(elapsed);
        }
        self.phase
    }

    /// Route one logical key event according to the current phase.
    pub fn handle_key(&mut self, key: LogicalKey) -> Result<()> {
        if self.phase != Phase::Running {
            if key == LogicalKey::StartRequest {
                self.start()?;
            } else {
                trace!(?key, phase = ?self.phase, "key ignored while not running");
            }
            return Ok(());
        }

        let Some(timer) = self.timer else {
            return Ok(());
        };
        let elapsed = self.elapsed(&timer);
        if elapsed >= timer.duration {
            // deadline passed before the boundary tick arrived
            self.time_left = Duration::ZERO;
            self.finish();
            return Ok(());
        }

        trace!(?key, "key routed");
        match key {
            LogicalKey::Char(c) => {
                let pos = self.state.cursor();
                if let Some(state) = self.state.match_char(c) {
                    notify(&mut self.observers, |o| o.on_char_state_changed(pos, state));
                    self.publish_cursor();
                }
            }
            LogicalKey::Delimiter => {
                if let Some(marked) = self.state.commit_word_skip() {
                    for pos in marked {
                        let state = self.state.char_state(pos).unwrap_or_default();
                        notify(&mut self.observers, |o| o.on_char_state_changed(pos, state));
                    }
                    self.publish_cursor();
                }
            }
            LogicalKey::Backspace => match self.state.regress() {
                Some(Regression::Char { pos, .. }) => {
                    let state = self.state.char_state(pos).unwrap_or_default();
                    notify(&mut self.observers, |o| o.on_char_state_changed(pos, state));
                    self.publish_cursor();
                }
                Some(Regression::Word { .. }) => self.publish_cursor(),
                None => {}
            },
            LogicalKey::StartRequest => {}
        }

        self.time_left = timer.duration.saturating_sub(elapsed);
        self.refresh_live(elapsed);
        Ok(())
    }

    /// Stop the timer, compute final metrics and offer the record to the
    /// score store. Only a running session can finish.
    pub fn finish(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(timer) = self.timer.take() else {
            return;
        };

        let elapsed = self.elapsed(&timer).min(timer.duration);
        self.phase = Phase::Finished;
        self.time_left = Duration::ZERO;
        self.metrics = final_metrics(self.state.counters(), elapsed);

        let record = SessionRecord::new(self.metrics, Utc::now());
        let submission = self.scores.submit(record.clone());
        let counters = self.state.counters();

        info!(
            generation = timer.handle.generation,
            wpm = record.wpm,
            accuracy = record.accuracy,
            new_high = submission.accepted,
            "session finished"
        );

        self.outcome = Some(SessionOutcome {
            record: record.clone(),
            is_new_high: submission.accepted,
            best: submission.best,
            summary: SessionSummary {
                words_typed: self.state.words_typed(),
                correct_chars: counters.correct(),
                incorrect_chars: counters.incorrect(),
                total_chars: counters.typed(),
            },
        });

        self.publish_metrics();
        notify(&mut self.observers, |o| {
            o.on_session_finished(&record, submission.accepted)
        });
    }

    /// Cancel any running session and return to idle with the same words,
    /// all pending again. Use `regenerate` for a fresh word list.
    pub fn reset(&mut self) {
        self.clear_progress();
        notify(&mut self.observers, |o| o.on_words_regenerated(self.state.words()));
        self.publish_cursor();
        self.publish_metrics();
    }

    /// Return to idle with a freshly drawn word list. Ignored while running.
    pub fn regenerate(&mut self) -> Result<()> {
        if self.phase == Phase::Running {
            return Ok(());
        }
        self.clear_progress();
        let resampled = self.resample();
        if resampled.is_err() {
            // the old list is still shown, now all pending
            notify(&mut self.observers, |o| o.on_words_regenerated(self.state.words()));
            self.publish_cursor();
        }
        self.publish_metrics();
        resampled
    }

    /// Forget the stored best record.
    pub fn clear_best(&mut self) {
        info!("high score cleared");
        self.scores.clear();
    }

    fn clear_progress(&mut self) {
        if self.timer.take().is_some() {
            debug!(generation = self.generation, "timer cancelled");
        }
        self.phase = Phase::Idle;
        self.state.reset();
        self.metrics = Metrics::default();
        self.time_left = self.config.duration();
        self.trace.clear();
        self.outcome = None;
    }

    fn resample(&mut self) -> Result<()> {
        self.config.validate()?;
        let words = self
            .sampler
            .sample(self.config.bank(), oversample_count(self.config.duration()))?;
        self.state = SessionState::new(words)?;
        notify(&mut self.observers, |o| o.on_words_regenerated(self.state.words()));
        self.publish_cursor();
        Ok(())
    }

    fn elapsed(&self, timer: &Timer) -> Duration {
        self.clock.now().saturating_duration_since(timer.started_at)
    }

    fn refresh_live(&mut self, elapsed: Duration) {
        let counters = self.state.counters();
        self.metrics = live_metrics(counters.correct(), counters.typed(), elapsed);
        self.trace.record(elapsed, self.metrics.wpm);
        self.publish_metrics();
    }

    fn publish_cursor(&mut self) {
        let cursor = self.state.cursor();
        notify(&mut self.observers, |o| o.on_cursor_moved(cursor));
    }

    fn publish_metrics(&mut self) {
        let update = MetricsUpdate {
            metrics: self.metrics,
            time_left: self.time_left,
        };
        notify(&mut self.observers, |o| o.on_metrics_updated(update));
    }
}
