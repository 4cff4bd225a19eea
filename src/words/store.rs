use super::WordStore;
use crate::models::{Level, WordRecord};
use anyhow::Context;
use regex::Regex;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::OnceLock;

/// The list compiled into the binary, used when no file is configured.
pub const BUILTIN_WORDS: &str = include_str!("../../data/words.csv");

pub struct MemoryWordStore {
  records: Vec<WordRecord>,
}

impl MemoryWordStore {
  pub fn new(records: Vec<WordRecord>) -> Self {
    Self { records }
  }

  pub fn builtin() -> Self {
    Self::new(parse_word_table(BUILTIN_WORDS))
  }

  pub fn record_count(&self) -> usize {
    self.records.len()
  }
}

#[async_trait::async_trait]
impl WordStore for MemoryWordStore {
  async fn fetch(&self, level: Option<Level>) -> anyhow::Result<Vec<String>> {
    Ok(filter_level(&self.records, level))
  }
}

/// Re-reads its file on every fetch, so edits show up without a restart.
pub struct FileWordStore {
  path: PathBuf,
}

impl FileWordStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

#[async_trait::async_trait]
impl WordStore for FileWordStore {
  async fn fetch(&self, level: Option<Level>) -> anyhow::Result<Vec<String>> {
    let text = tokio::fs::read_to_string(&self.path)
      .await
      .with_context(|| format!("failed to read word table {}", self.path.display()))?;
    Ok(filter_level(&parse_word_table(&text), level))
  }
}

fn filter_level(records: &[WordRecord], level: Option<Level>) -> Vec<String> {
  records
    .iter()
    .filter(|r| level.is_none_or(|l| r.level == l))
    .map(|r| r.word.clone())
    .collect()
}

// 每行 `word,level`；`#` 开头为注释
pub fn parse_word_table(text: &str) -> Vec<WordRecord> {
  static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
  let re = WORD_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z'\-]*$").unwrap());

  let mut records = Vec::new();
  for (no, line) in text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let Some((word, level)) = line.split_once(',') else {
      tracing::warn!(line = no + 1, "word table line without level, skipped");
      continue;
    };
    let word = word.trim();
    if !re.is_match(word) {
      tracing::warn!(line = no + 1, word, "malformed word, skipped");
      continue;
    }
    match Level::from_str(level.trim()) {
      Ok(level) => records.push(WordRecord {
        word: word.to_string(),
        level,
      }),
      Err(_) => tracing::warn!(line = no + 1, level = level.trim(), "unknown level, skipped"),
    }
  }
  records
}
