use crate::error::{Result, SessionError};
use std::fmt;

/// Classification of one character position in the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharState {
    #[default]
    Pending,
    Correct,
    Incorrect,
}

impl CharState {
    pub fn is_pending(self) -> bool {
        self == CharState::Pending
    }
}

/// A target word, immutable once sampled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    chars: Vec<char>,
}

impl Word {
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

impl From<&str> for Word {
    fn from(s: &str) -> Self {
        Self {
            chars: s.chars().collect(),
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// Position of the next character to classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub word: usize,
    pub char: usize,
}

impl Cursor {
    pub fn new(word: usize, char: usize) -> Self {
        Self { word, char }
    }
}

/// Typed-character counters. `typed` is always `correct + incorrect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    correct: usize,
    incorrect: usize,
}

impl Counters {
    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn incorrect(&self) -> usize {
        self.incorrect
    }

    pub fn typed(&self) -> usize {
        self.correct + self.incorrect
    }

    fn record(&mut self, state: CharState) {
        match state {
            CharState::Correct => self.correct += 1,
            CharState::Incorrect => self.incorrect += 1,
            CharState::Pending => {}
        }
    }

    fn retract(&mut self, state: CharState) {
        match state {
            CharState::Correct => self.correct -= 1,
            CharState::Incorrect => self.incorrect -= 1,
            CharState::Pending => {}
        }
    }
}

/// What a backspace did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regression {
    /// A character inside the current word went back to pending.
    Char { pos: Cursor, previous: CharState },
    /// The cursor moved back into the previous word.
    Word { to: Cursor },
}

/// Word list, cursor and per-character classification of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    words: Vec<Word>,
    /// Flat index of the first character of each word.
    offsets: Vec<usize>,
    states: Vec<CharState>,
    cursor: Cursor,
    counters: Counters,
}

impl SessionState {
    pub fn new(words: Vec<Word>) -> Result<Self> {
        if words.is_empty() {
            return Err(SessionError::invalid("a session needs at least one word"));
        }

        let mut offsets = Vec::with_capacity(words.len());
        let mut total = 0;
        for word in &words {
            offsets.push(total);
            total += word.len();
        }

        Ok(Self {
            words,
            offsets,
            states: vec![CharState::Pending; total],
            cursor: Cursor::default(),
            counters: Counters::default(),
        })
    }

    /// Forget all progress but keep the word list.
    pub fn reset(&mut self) {
        self.states.fill(CharState::Pending);
        self.cursor = Cursor::default();
        self.counters = Counters::default();
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn current_word(&self) -> &Word {
        &self.words[self.cursor.word]
    }

    pub fn is_last_word(&self) -> bool {
        self.cursor.word + 1 == self.words.len()
    }

    /// Words started so far, counting a partially typed current word.
    pub fn words_typed(&self) -> usize {
        self.cursor.word + usize::from(self.cursor.char > 0)
    }

    pub fn char_states(&self) -> &[CharState] {
        &self.states
    }

    pub fn word_states(&self, word: usize) -> &[CharState] {
        let start = self.offsets[word];
        &self.states[start..start + self.words[word].len()]
    }

    pub fn char_state(&self, pos: Cursor) -> Option<CharState> {
        let word = self.words.get(pos.word)?;
        if pos.char >= word.len() {
            return None;
        }
        Some(self.states[self.offsets[pos.word] + pos.char])
    }

    /// Classify `input` against the character under the cursor and advance.
    /// Returns `None` when the current word is already fully typed.
    pub fn match_char(&mut self, input: char) -> Option<CharState> {
        let expected = self.current_word().char_at(self.cursor.char)?;
        let state = if input == expected {
            CharState::Correct
        } else {
            CharState::Incorrect
        };

        let idx = self.flat(self.cursor);
        self.states[idx] = state;
        self.counters.record(state);
        self.cursor.char += 1;

        Some(state)
    }

    /// Commit the current word on a delimiter. Untyped characters are scored
    /// as incorrect. Returns the positions that were marked, or `None` on the
    /// last word where the delimiter does nothing.
    pub fn commit_word_skip(&mut self) -> Option<Vec<Cursor>> {
        if self.is_last_word() {
            return None;
        }

        let word = self.cursor.word;
        let mut marked = Vec::new();
        for char in self.cursor.char..self.words[word].len() {
            let pos = Cursor::new(word, char);
            let idx = self.flat(pos);
            if self.states[idx].is_pending() {
                self.states[idx] = CharState::Incorrect;
                self.counters.record(CharState::Incorrect);
                marked.push(pos);
            }
        }

        self.cursor = Cursor::new(word + 1, 0);
        Some(marked)
    }

    /// Backspace. Inside a word the vacated character returns to pending;
    /// at a word start the cursor re-enters the previous word after its last
    /// non-pending character. `None` at the very first position.
    pub fn regress(&mut self) -> Option<Regression> {
        if self.cursor.char > 0 {
            self.cursor.char -= 1;
            let idx = self.flat(self.cursor);
            let previous = std::mem::take(&mut self.states[idx]);
            self.counters.retract(previous);
            return Some(Regression::Char {
                pos: self.cursor,
                previous,
            });
        }

        if self.cursor.word == 0 {
            return None;
        }

        let word = self.cursor.word - 1;
        let back_to = self
            .word_states(word)
            .iter()
            .rposition(|s| !s.is_pending())
            .map_or(0, |i| i + 1);

        self.cursor = Cursor::new(word, back_to);
        Some(Regression::Word { to: self.cursor })
    }

    fn flat(&self, pos: Cursor) -> usize {
        self.offsets[pos.word] + pos.char
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn session(words: &[&str]) -> SessionState {
        SessionState::new(words.iter().map(|w| Word::from(*w)).collect()).unwrap()
    }

    fn type_str(s: &mut SessionState, text: &str) {
        for c in text.chars() {
            s.match_char(c);
        }
    }

    fn assert_bounds(s: &SessionState) {
        let cursor = s.cursor();
        assert!(cursor.word < s.words().len());
        assert!(cursor.char <= s.words()[cursor.word].len());
    }

    #[test]
    fn test_new_rejects_empty_word_list() {
        assert_matches!(
            SessionState::new(vec![]),
            Err(SessionError::InvalidConfiguration { .. })
        );
    }

    #[test]
    fn test_char_grid_matches_total_length() {
        let s = session(&["cat", "horse", "ox"]);
        assert_eq!(s.char_states().len(), 10);
        assert!(s.char_states().iter().all(|c| c.is_pending()));
    }

    #[test]
    fn test_type_word_correctly() {
        let mut s = session(&["cat"]);
        type_str(&mut s, "cat");

        assert_eq!(s.counters().correct(), 3);
        assert_eq!(s.counters().typed(), 3);
        assert_eq!(s.cursor(), Cursor::new(0, 3));
        assert_eq!(s.word_states(0), &[CharState::Correct; 3]);
    }

    #[test]
    fn test_type_word_with_error() {
        let mut s = session(&["cat"]);
        assert_eq!(s.match_char('c'), Some(CharState::Correct));
        assert_eq!(s.match_char('x'), Some(CharState::Incorrect));
        assert_eq!(s.match_char('t'), Some(CharState::Correct));

        assert_eq!(s.counters().correct(), 2);
        assert_eq!(s.counters().incorrect(), 1);
    }

    #[test]
    fn test_typing_past_word_end_is_noop() {
        let mut s = session(&["hi", "there"]);
        type_str(&mut s, "hi");
        let before = s.clone();

        assert_eq!(s.match_char('x'), None);
        assert_eq!(s, before);
    }

    #[test]
    fn test_delimiter_marks_untyped_tail() {
        let mut s = session(&["cat", "dog"]);
        s.match_char('c');
        let marked = s.commit_word_skip().unwrap();

        assert_eq!(marked, vec![Cursor::new(0, 1), Cursor::new(0, 2)]);
        assert_eq!(s.counters().incorrect(), 2);
        assert_eq!(s.counters().typed(), 3);
        assert_eq!(s.cursor(), Cursor::new(1, 0));
        assert_eq!(
            s.word_states(0),
            &[CharState::Correct, CharState::Incorrect, CharState::Incorrect]
        );
    }

    #[test]
    fn test_delimiter_after_full_word_marks_nothing() {
        let mut s = session(&["cat", "dog"]);
        type_str(&mut s, "cat");
        assert_eq!(s.commit_word_skip(), Some(vec![]));
        assert_eq!(s.counters().typed(), 3);
        assert_eq!(s.cursor(), Cursor::new(1, 0));
    }

    #[test]
    fn test_delimiter_on_last_word_is_noop() {
        let mut s = session(&["cat"]);
        s.match_char('c');
        let before = s.clone();

        assert_eq!(s.commit_word_skip(), None);
        assert_eq!(s, before);
    }

    #[test]
    fn test_type_then_backspace_restores_state() {
        let mut s = session(&["cat"]);
        s.match_char('c');
        let before = s.clone();

        s.match_char('z');
        let regression = s.regress().unwrap();

        assert_eq!(
            regression,
            Regression::Char {
                pos: Cursor::new(0, 1),
                previous: CharState::Incorrect
            }
        );
        assert_eq!(s, before);
    }

    #[test]
    fn test_backspace_at_origin_is_noop() {
        let mut s = session(&["cat", "dog"]);
        assert_eq!(s.regress(), None);
        assert_eq!(s.cursor(), Cursor::default());
        assert_bounds(&s);
    }

    #[test]
    fn test_backspace_into_previous_word() {
        let mut s = session(&["cat", "dog"]);
        type_str(&mut s, "cat");
        s.commit_word_skip();

        assert_eq!(
            s.regress(),
            Some(Regression::Word {
                to: Cursor::new(0, 3)
            })
        );
        // counters are untouched by crossing the boundary
        assert_eq!(s.counters().correct(), 3);

        s.regress();
        assert_eq!(s.cursor(), Cursor::new(0, 2));
        assert_eq!(s.counters().correct(), 2);
    }

    #[test]
    fn test_backspace_into_skipped_word_lands_at_its_end() {
        let mut s = session(&["cat", "dog"]);
        s.commit_word_skip();

        s.regress();
        assert_eq!(s.cursor(), Cursor::new(0, 3));
        assert_eq!(s.word_states(0), &[CharState::Incorrect; 3]);
    }

    #[test]
    fn test_backspace_into_word_with_pending_tail() {
        // re-skipping a partly erased word scores its tail again
        let mut s = session(&["cat", "dog"]);
        type_str(&mut s, "cat");
        s.commit_word_skip();
        s.regress();
        s.regress();
        s.regress();
        assert_eq!(s.cursor(), Cursor::new(0, 1));
        s.commit_word_skip();
        s.regress();
        assert_eq!(s.cursor(), Cursor::new(0, 3));
        assert_eq!(s.counters().incorrect(), 2);
    }

    #[test]
    fn test_words_typed() {
        let mut s = session(&["cat", "dog", "ox"]);
        assert_eq!(s.words_typed(), 0);
        s.match_char('c');
        assert_eq!(s.words_typed(), 1);
        s.commit_word_skip();
        assert_eq!(s.words_typed(), 1);
        s.match_char('d');
        assert_eq!(s.words_typed(), 2);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut s = session(&["cat", "dog"]);
        type_str(&mut s, "ca");
        s.commit_word_skip();
        s.match_char('q');

        s.reset();
        let once = s.clone();
        s.reset();

        assert_eq!(s, once);
        assert_eq!(s.cursor(), Cursor::default());
        assert_eq!(s.counters().typed(), 0);
        assert_eq!(s.words(), session(&["cat", "dog"]).words());
    }

    #[test]
    fn test_char_state_lookup() {
        let mut s = session(&["cat"]);
        s.match_char('x');
        assert_eq!(s.char_state(Cursor::new(0, 0)), Some(CharState::Incorrect));
        assert_eq!(s.char_state(Cursor::new(0, 1)), Some(CharState::Pending));
        assert_eq!(s.char_state(Cursor::new(0, 3)), None);
        assert_eq!(s.char_state(Cursor::new(1, 0)), None);
    }

    #[test]
    fn test_random_input_keeps_invariants() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut s = session(&["the", "quick", "brown", "fox", "a"]);

        for _ in 0..2_000 {
            match rng.gen_range(0..10) {
                0..=5 => {
                    let c = ['a', 'e', 'o', 'q', 'x', 't'][rng.gen_range(0..6)];
                    s.match_char(c);
                }
                6 | 7 => {
                    s.commit_word_skip();
                }
                _ => {
                    s.regress();
                }
            }

            assert_bounds(&s);
            let counters = s.counters();
            let classified = s.char_states().iter().filter(|c| !c.is_pending()).count();
            assert_eq!(counters.typed(), counters.correct() + counters.incorrect());
            assert_eq!(counters.typed(), classified);

            let cursor = s.cursor();
            assert!(s.word_states(cursor.word)[cursor.char..]
                .iter()
                .all(|c| c.is_pending()));
        }
    }
}
