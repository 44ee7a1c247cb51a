use crate::error::{Result, SessionError};
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use serde_json::from_str;
use std::fs;
use std::path::Path;

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/banks");

/// Word banks compiled into the binary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinBank {
    Common,
    Code,
    Ph,
}

#[derive(Deserialize)]
struct BankFile {
    name: String,
    words: Vec<String>,
}

/// A named set of candidate words. Entries are non-empty and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordBank {
    name: String,
    words: Vec<String>,
}

impl WordBank {
    /// Build a bank from raw entries: whitespace is trimmed, empty entries are
    /// dropped and duplicates keep their first position.
    pub fn from_words<I, S>(name: impl Into<String>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .unique()
            .collect();

        Self {
            name: name.into(),
            words,
        }
    }

    pub fn builtin(bank: BuiltinBank) -> Result<Self> {
        let file_name = format!("{bank}.json");
        let contents = BANK_DIR
            .get_file(&file_name)
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| SessionError::invalid(format!("bank file {file_name} not embedded")))?;

        Self::parse(contents, &file_name)
    }

    /// Resolve one of the built-in bank names (case-insensitive).
    pub fn by_name(name: &str) -> Result<Self> {
        let bank = BuiltinBank::from_str(name, true)
            .map_err(|_| SessionError::invalid(format!("unknown word bank '{name}'")))?;
        Self::builtin(bank)
    }

    /// Load a custom bank from a JSON file shaped `{ "name": .., "words": [..] }`.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SessionError::invalid(format!("cannot read word bank {}: {e}", path.display()))
        })?;

        Self::parse(&contents, &path.display().to_string())
    }

    fn parse(contents: &str, origin: &str) -> Result<Self> {
        let file: BankFile = from_str(contents)
            .map_err(|e| SessionError::invalid(format!("malformed word bank {origin}: {e}")))?;
        Ok(Self::from_words(file.name, file.words))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
