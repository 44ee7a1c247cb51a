use crate::error::StoreError;
use crate::kv::KvStore;
use crate::metrics::Metrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Key under which the best record is persisted.
pub const HIGH_SCORE_KEY: &str = "high_score";

/// Shown in place of a best score when none is stored.
pub const NO_RECORD: &str = "—";

/// Final result of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub wpm: u32,
    #[serde(rename = "acc")]
    pub accuracy: u8,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(metrics: Metrics, timestamp: DateTime<Utc>) -> Self {
        Self {
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            timestamp,
        }
    }

    /// Higher wpm wins; equal wpm is broken by higher accuracy.
    pub fn beats(&self, other: &SessionRecord) -> bool {
        self.wpm > other.wpm || (self.wpm == other.wpm && self.accuracy > other.accuracy)
    }
}

/// Result of offering a candidate to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub accepted: bool,
    pub best: SessionRecord,
}

/// Keeps the single best record in a key-value backend.
#[derive(Debug)]
pub struct ScoreStore<S: KvStore> {
    backend: S,
}

impl<S: KvStore> ScoreStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// The stored best. Unreadable or malformed data counts as no record.
    pub fn current(&self) -> Option<SessionRecord> {
        match self.read() {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable high score");
                None
            }
        }
    }

    pub fn submit(&mut self, candidate: SessionRecord) -> Submission {
        if let Some(best) = self.current().filter(|best| !candidate.beats(best)) {
            return Submission {
                accepted: false,
                best,
            };
        }

        if let Err(e) = self.write(&candidate) {
            warn!(error = %e, "failed to persist high score");
        } else {
            debug!(wpm = candidate.wpm, accuracy = candidate.accuracy, "new high score");
        }

        Submission {
            accepted: true,
            best: candidate,
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.backend.remove(HIGH_SCORE_KEY) {
            warn!(error = %e, "failed to clear high score");
        }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    fn read(&self) -> Result<Option<SessionRecord>, StoreError> {
        self.backend
            .get(HIGH_SCORE_KEY)?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StoreError::from)
    }

    fn write(&mut self, record: &SessionRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        self.backend.set(HIGH_SCORE_KEY, &raw)
    }
}

/// HUD label for the best score.
pub fn best_label(best: Option<&SessionRecord>) -> String {
    best.map_or_else(|| NO_RECORD.to_string(), |r| format!("{} WPM", r.wpm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use chrono::TimeZone;

    fn record(wpm: u32, accuracy: u8) -> SessionRecord {
        SessionRecord {
            wpm,
            accuracy,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    /// Backend whose every call fails.
    struct BrokenKv;

    impl KvStore for BrokenKv {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn first_submission_is_accepted() {
        let mut store = ScoreStore::new(MemoryKvStore::new());
        let result = store.submit(record(50, 90));
        assert!(result.accepted);
        assert_eq!(result.best, record(50, 90));
        assert_eq!(store.current(), Some(record(50, 90)));
    }

    #[test]
    fn equal_wpm_lower_accuracy_is_rejected() {
        let mut store = ScoreStore::new(MemoryKvStore::new());
        store.submit(record(50, 90));

        let result = store.submit(record(50, 80));
        assert!(!result.accepted);
        assert_eq!(result.best, record(50, 90));
        assert_eq!(store.current(), Some(record(50, 90)));
    }

    #[test]
    fn equal_wpm_higher_accuracy_is_accepted() {
        let mut store = ScoreStore::new(MemoryKvStore::new());
        store.submit(record(50, 90));
        assert!(store.submit(record(50, 95)).accepted);
    }

    #[test]
    fn identical_record_is_rejected() {
        let mut store = ScoreStore::new(MemoryKvStore::new());
        store.submit(record(50, 90));
        assert!(!store.submit(record(50, 90)).accepted);
    }

    #[test]
    fn higher_wpm_wins_regardless_of_accuracy() {
        let mut store = ScoreStore::new(MemoryKvStore::new());
        store.submit(record(50, 100));
        let result = store.submit(record(51, 10));
        assert!(result.accepted);
        assert_eq!(result.best.wpm, 51);
    }

    #[test]
    fn clear_returns_to_no_record() {
        let mut store = ScoreStore::new(MemoryKvStore::new());
        store.submit(record(70, 99));
        store.clear();
        assert_eq!(store.current(), None);
        assert_eq!(best_label(store.current().as_ref()), NO_RECORD);
        assert!(store.submit(record(1, 1)).accepted);
    }

    #[test]
    fn current_does_not_mutate() {
        let mut store = ScoreStore::new(MemoryKvStore::new());
        store.submit(record(40, 80));
        let before = store.backend().get(HIGH_SCORE_KEY).unwrap();
        let _ = store.current();
        let _ = store.current();
        assert_eq!(store.backend().get(HIGH_SCORE_KEY).unwrap(), before);
    }

    #[test]
    fn malformed_record_reads_as_absent() {
        let mut kv = MemoryKvStore::new();
        kv.set(HIGH_SCORE_KEY, "{not json").unwrap();
        let mut store = ScoreStore::new(kv);

        assert_eq!(store.current(), None);
        assert!(store.submit(record(10, 50)).accepted);
        assert_eq!(store.current(), Some(record(10, 50)));
    }

    #[test]
    fn broken_backend_fails_open() {
        let mut store = ScoreStore::new(BrokenKv);
        assert_eq!(store.current(), None);
        let result = store.submit(record(30, 70));
        assert!(result.accepted);
        store.clear();
    }

    #[test]
    fn record_json_shape() {
        let json = serde_json::to_value(record(42, 97)).unwrap();
        assert_eq!(json["wpm"], 42);
        assert_eq!(json["acc"], 97);
        assert!(json["date"].as_str().unwrap().starts_with("2024-05-01T12:00:00"));
    }

    #[test]
    fn best_label_formats_wpm() {
        assert_eq!(best_label(Some(&record(88, 90))), "88 WPM");
    }
}
