use crate::error::{Result, SessionError};
use crate::session::Word;
use crate::word_bank::WordBank;
use rand::rngs::ThreadRng;
use rand::Rng;
use std::time::Duration;

/// Smallest number of words sampled for any session.
pub const MIN_SAMPLE: usize = 180;

/// Upper bound on typing speed used for oversampling (240 wpm).
pub const MAX_WORDS_PER_SEC: usize = 4;

/// Number of words to draw so that a session of `duration` cannot run dry.
pub fn oversample_count(duration: Duration) -> usize {
    let secs = duration.as_secs() as usize + usize::from(duration.subsec_nanos() > 0);
    MIN_SAMPLE.max(secs.saturating_mul(MAX_WORDS_PER_SEC))
}

/// Draws words uniformly, with replacement, from a bank.
#[derive(Debug, Clone)]
pub struct WordSampler<R: Rng = ThreadRng> {
    rng: R,
}

impl WordSampler<ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for WordSampler<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> WordSampler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    pub fn sample(&mut self, bank: &WordBank, count: usize) -> Result<Vec<Word>> {
        if bank.is_empty() {
            return Err(SessionError::invalid(format!(
                "word bank '{}' is empty",
                bank.name()
            )));
        }
        if count == 0 {
            return Err(SessionError::invalid("sample count must be positive"));
        }

        let pool = bank.words();
        let words = (0..count)
            .map(|_| Word::from(pool[self.rng.gen_range(0..pool.len())].as_str()))
            .collect();

        Ok(words)
    }
}
