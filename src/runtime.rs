use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};
use tracing::warn;

/// What the main loop reacts to
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Anything that can hand out terminal events with a bounded wait.
pub trait EventSource {
    /// Err(Timeout) when nothing arrived in time, Err(Disconnected) once the
    /// producer is gone and the queue is drained.
    fn wait(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

impl EventSource for Receiver<AppEvent> {
    fn wait(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.recv_timeout(timeout)
    }
}

/// Forward key presses and resizes from the terminal on a background thread.
/// Key releases never reach the receiver. The thread stops when the receiver
/// is dropped or the terminal read fails.
pub fn terminal_events() -> Receiver<AppEvent> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
            Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "terminal read failed");
                break;
            }
        };
        if tx.send(ev).is_err() {
            break;
        }
    });

    rx
}

/// Monotonic time source for session timing
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock; clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Interleaves source events with ticks on a fixed schedule.
///
/// A tick is emitted once its deadline has passed even when events keep
/// arriving, so a fast typist cannot hold the session timer back.
pub struct Runner<E: EventSource, C: Clock = SystemClock> {
    source: E,
    interval: Duration,
    clock: C,
    next_tick: Cell<Instant>,
}

impl<E: EventSource> Runner<E> {
    pub fn new(source: E, interval: Duration) -> Self {
        Self::with_clock(source, interval, SystemClock)
    }
}

impl<E: EventSource, C: Clock> Runner<E, C> {
    pub fn with_clock(source: E, interval: Duration, clock: C) -> Self {
        let next_tick = Cell::new(clock.now() + interval);
        Self {
            source,
            interval,
            clock,
            next_tick,
        }
    }

    /// Wait for the next event or tick. `None` once the source has hung up.
    pub fn step(&self) -> Option<AppEvent> {
        let now = self.clock.now();
        let due = self.next_tick.get();
        if now >= due {
            self.next_tick.set(now + self.interval);
            return Some(AppEvent::Tick);
        }

        match self.source.wait(due - now) {
            Ok(ev) => Some(ev),
            Err(RecvTimeoutError::Timeout) => {
                self.next_tick.set(self.clock.now() + self.interval);
                Some(AppEvent::Tick)
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
