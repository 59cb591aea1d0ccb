//! The history ledger: a bounded, ordered record of chat turns on disk.
//!
//! The ledger file is a JSON array of turns, oldest first.  Every write keeps
//! only the most recent `max_history` turns, so the file never holds more than
//! that many immediately after any mutation.  A file that is missing or does
//! not parse reads as an empty history; corrupt history must never stop a
//! conversation from happening.

use std::fs;
use std::io::ErrorKind;

use utf8path::Path;

use crate::error::{Error, Result};
use crate::observability::{HISTORY_PARSE_FALLBACKS, HISTORY_TRUNCATED_TURNS, HISTORY_WRITES};
use crate::types::{ChatTurn, TurnRole};

/// Number of turns kept when nothing else is configured.
pub const DEFAULT_MAX_HISTORY: usize = 20;

/// A size-bounded conversation history persisted to a single file.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    path: Path<'static>,
    max_history: usize,
}

impl HistoryLedger {
    /// Open the ledger at `path`, creating it with an empty history if absent.
    pub fn open(path: impl Into<Path<'static>>, max_history: usize) -> Result<Self> {
        let ledger = Self {
            path: path.into(),
            max_history,
        };
        if !ledger.path.exists() {
            tracing::debug!(path = %ledger.path.as_str(), "creating history ledger");
            ledger.persist(&[])?;
        }
        Ok(ledger)
    }

    /// The file backing this ledger.
    pub fn path(&self) -> &Path<'static> {
        &self.path
    }

    /// The most turns the ledger will keep.
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Read the persisted history, oldest first.
    ///
    /// Absent or unparseable content yields an empty history.  Only I/O
    /// failures other than a missing file are reported.
    pub fn load(&self) -> Result<Vec<ChatTurn>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(Error::io(
                    format!("failed to read history file {}", self.path.as_str()),
                    err,
                ));
            }
        };
        match serde_json::from_slice::<Vec<ChatTurn>>(&bytes) {
            Ok(turns) => Ok(turns),
            Err(err) => {
                HISTORY_PARSE_FALLBACKS.click();
                tracing::warn!(
                    path = %self.path.as_str(),
                    error = %err,
                    "history file is unreadable; starting from an empty history"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Append one turn to the end of the history.
    pub fn append(&self, turn: ChatTurn) -> Result<()> {
        let mut turns = self.load()?;
        turns.push(turn);
        self.write(&turns)
    }

    /// Append a turn built from its parts.
    pub fn append_parts(&self, role: TurnRole, content: Option<String>) -> Result<()> {
        self.append(ChatTurn::new(role, content))
    }

    /// Replace the history with the last `max_history` elements of `turns`.
    ///
    /// This is the only place the bound is enforced.  Writing the result of a
    /// previous write again leaves the file unchanged.
    pub fn write(&self, turns: &[ChatTurn]) -> Result<()> {
        let keep_from = turns.len().saturating_sub(self.max_history);
        if keep_from > 0 {
            HISTORY_TRUNCATED_TURNS.count(keep_from as u64);
        }
        self.persist(&turns[keep_from..])
    }

    /// Clear all history.
    pub fn reset(&self) -> Result<()> {
        tracing::info!(path = %self.path.as_str(), "resetting history");
        self.write(&[])
    }

    fn persist(&self, turns: &[ChatTurn]) -> Result<()> {
        HISTORY_WRITES.click();
        let json = serde_json::to_string_pretty(turns)?;
        fs::write(&self.path, json).map_err(|err| {
            Error::io(
                format!("failed to write history file {}", self.path.as_str()),
                err,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_in(dir: &tempfile::TempDir, max_history: usize) -> HistoryLedger {
        let path = dir.path().join(".groq_chat_history.json");
        HistoryLedger::open(Path::try_from(path).unwrap(), max_history).unwrap()
    }

    fn numbered(n: usize) -> Vec<ChatTurn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("turn {i}"))
                } else {
                    ChatTurn::assistant(Some(format!("turn {i}")))
                }
            })
            .collect()
    }

    #[test]
    fn open_creates_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        assert_eq!(fs::read_to_string(ledger.path()).unwrap(), "[]");
        assert!(ledger.load().unwrap().is_empty());
    }

    #[test]
    fn append_user_then_assistant() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        ledger.append(ChatTurn::user("hi")).unwrap();
        ledger.append(ChatTurn::assistant(Some("hello".to_string()))).unwrap();

        assert_eq!(
            ledger.load().unwrap(),
            vec![
                ChatTurn::user("hi"),
                ChatTurn::assistant(Some("hello".to_string()))
            ]
        );
    }

    #[test]
    fn many_appends_keep_the_most_recent_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, 5);
        let turns = numbered(13);
        for turn in &turns {
            ledger.append(turn.clone()).unwrap();
        }
        assert_eq!(ledger.load().unwrap(), turns[8..].to_vec());
    }

    #[test]
    fn full_ledger_drops_the_oldest_turn() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        let turns = numbered(20);
        ledger.write(&turns).unwrap();
        assert_eq!(ledger.load().unwrap().len(), 20);

        ledger.append(ChatTurn::user("newest")).unwrap();
        let loaded = ledger.load().unwrap();
        assert_eq!(loaded.len(), 20);
        assert_eq!(loaded[0], turns[1]);
        assert_eq!(loaded.last(), Some(&ChatTurn::user("newest")));
    }

    #[test]
    fn reset_clears_everything() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        ledger.write(&numbered(7)).unwrap();
        ledger.reset().unwrap();
        assert!(ledger.load().unwrap().is_empty());
    }

    #[test]
    fn write_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, 4);
        ledger.write(&numbered(9)).unwrap();
        let once = fs::read_to_string(ledger.path()).unwrap();

        let truncated = ledger.load().unwrap();
        ledger.write(&truncated).unwrap();
        let twice = fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn zero_bound_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, 0);
        ledger.append(ChatTurn::user("gone")).unwrap();
        assert!(ledger.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        fs::write(ledger.path(), "[{\"role\": \"user\",").unwrap();
        assert!(ledger.load().unwrap().is_empty());

        fs::write(ledger.path(), [0xff, 0xfe, 0x00]).unwrap();
        assert!(ledger.load().unwrap().is_empty());

        ledger.append(ChatTurn::user("fresh start")).unwrap();
        assert_eq!(ledger.load().unwrap(), vec![ChatTurn::user("fresh start")]);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        fs::remove_file(ledger.path()).unwrap();
        assert!(ledger.load().unwrap().is_empty());
    }

    #[test]
    fn null_content_round_trips_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        ledger.append_parts(TurnRole::Assistant, None).unwrap();
        let content = fs::read_to_string(ledger.path()).unwrap();
        assert_eq!(
            content,
            "[\n  {\n    \"role\": \"assistant\",\n    \"content\": null\n  }\n]"
        );
        assert_eq!(ledger.load().unwrap(), vec![ChatTurn::assistant(None)]);
    }

    #[test]
    fn non_ascii_is_written_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = ledger_in(&dir, DEFAULT_MAX_HISTORY);
        ledger.append(ChatTurn::user("olá, histórico")).unwrap();
        let content = fs::read_to_string(ledger.path()).unwrap();
        assert!(content.contains("olá, histórico"));
    }
}
