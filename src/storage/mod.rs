//! # Storage Module - Session and Leaderboard Tables
//!
//! Player history is kept in two flat tables under the configured data directory:
//!
//! ```text
//! data/
//! ├── player_sessions.csv   ← Name,Sessions  (games started per player)
//! └── leaderboard.csv       ← Name,Score     (cumulative score per player)
//! ```
//!
//! Each table has a header row followed by one `name,value` row per player. Every
//! save rewrites the whole file (rows ordered by descending value), so a table is
//! always a complete snapshot rather than an append log.
//!
//! ## Semantics
//!
//! - A missing file reads as an empty table.
//! - A file that cannot be read (permissions, invalid UTF-8) or that holds a row
//!   without a comma or with a non-integer value fails a strict load, and strict
//!   writers leave it untouched. [`TallyFile::load_lenient`] logs and skips what it
//!   cannot use, for display only.
//! - Names are case-sensitive; a name repeated in the file keeps its last row.
//! - Every table has a `.<file>.lock` sidecar. Reads hold a shared `fs2` lock on it;
//!   [`TallyFile::add`] holds the exclusive lock across load, update and save, so
//!   concurrent sessions never lose each other's updates. The data file itself is
//!   replaced by writing a temp file and renaming it over the old one.

use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;
use crate::riddle::RiddleError;

/// In-memory copy of one table: player name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: HashMap<String, i64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.entries.get(name).copied()
    }

    /// Overwrite a player's value.
    pub fn set(&mut self, name: &str, value: i64) {
        self.entries.insert(name.to_string(), value);
    }

    /// Add `delta` to a player's value (inserting at `delta`) and return the new value.
    pub fn add(&mut self, name: &str, delta: i64) -> i64 {
        let entry = self.entries.entry(name.to_string()).or_insert(0);
        *entry = entry.saturating_add(delta);
        *entry
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows ordered by descending value, ties broken by name.
    pub fn ranked(&self) -> Vec<(&str, i64)> {
        let mut rows: Vec<(&str, i64)> = self
            .entries
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

/// Result of a lenient load: the good rows plus every row that was skipped.
#[derive(Debug, Default)]
pub struct LenientLoad {
    pub tally: Tally,
    pub rejected: Vec<RiddleError>,
}

/// One `Name,<value>` table on disk.
#[derive(Debug, Clone)]
pub struct TallyFile {
    path: PathBuf,
    value_header: &'static str,
}

impl TallyFile {
    pub fn new(path: impl Into<PathBuf>, value_header: &'static str) -> Self {
        TallyFile {
            path: path.into(),
            value_header,
        }
    }

    /// `Name,Sessions` table.
    pub fn sessions(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "Sessions")
    }

    /// `Name,Score` table.
    pub fn leaderboard(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "Score")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sidecar file the table's readers and writers lock.
    pub fn lock_path(&self) -> PathBuf {
        let base = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("table.csv");
        self.path.with_file_name(format!(".{}.lock", base))
    }

    /// Load the table, failing on a read error or the first malformed row.
    pub fn load(&self) -> Result<Tally, RiddleError> {
        let lock = match open_lock(&self.lock_path())? {
            Some(lock) => lock,
            None => return Ok(Tally::new()),
        };
        lock.lock_shared()?;
        let loaded = self.load_unlocked();
        let _ = lock.unlock();
        loaded
    }

    /// Load the table, skipping malformed rows (reported in `rejected`).
    pub fn load_lenient(&self) -> LenientLoad {
        let read = open_lock(&self.lock_path()).and_then(|lock| match lock {
            Some(lock) => {
                lock.lock_shared()?;
                let contents = read_existing(&self.path);
                let _ = lock.unlock();
                contents
            }
            None => Ok(None),
        });
        match read {
            Ok(Some(contents)) => parse_rows(&self.path, &contents),
            Ok(None) => LenientLoad::default(),
            Err(e) => {
                log::warn!(
                    "storage: unable to read {}: {} (treating as empty)",
                    self.path.display(),
                    e
                );
                LenientLoad::default()
            }
        }
    }

    /// Rewrite the whole table.
    pub fn save(&self, tally: &Tally) -> Result<(), RiddleError> {
        let lock = self.acquire_exclusive()?;
        let saved = self.save_unlocked(tally);
        let _ = lock.unlock();
        saved
    }

    /// Read-modify-write under one exclusive lock: add `delta` to `name` and
    /// return the new value. An unreadable or malformed table is not rewritten.
    pub fn add(&self, name: &str, delta: i64) -> Result<i64, RiddleError> {
        let lock = self.acquire_exclusive()?;
        let result = self.load_unlocked().and_then(|mut tally| {
            let value = tally.add(name, delta);
            self.save_unlocked(&tally)?;
            Ok(value)
        });
        let _ = lock.unlock();
        result
    }

    fn acquire_exclusive(&self) -> Result<File, RiddleError> {
        let dir = parent_dir(&self.path);
        fs::create_dir_all(dir)?;
        let lock = open_lock(&self.lock_path())?.ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "table directory vanished")
        })?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn load_unlocked(&self) -> Result<Tally, RiddleError> {
        let contents = match read_existing(&self.path)? {
            Some(contents) => contents,
            None => return Ok(Tally::new()),
        };
        let mut parsed = parse_rows(&self.path, &contents);
        if parsed.rejected.is_empty() {
            Ok(parsed.tally)
        } else {
            Err(parsed.rejected.remove(0))
        }
    }

    fn save_unlocked(&self, tally: &Tally) -> Result<(), RiddleError> {
        let contents = render_rows(self.value_header, tally);
        write_atomic(&self.path, &contents)?;
        log::debug!("storage: wrote {} rows to {}", tally.len(), self.path.display());
        Ok(())
    }
}

fn parse_rows(path: &Path, contents: &str) -> LenientLoad {
    let mut out = LenientLoad::default();
    // First line is the header.
    for (idx, line) in contents.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let parsed = line
            .split_once(',')
            .and_then(|(name, value)| value.trim().parse::<i64>().ok().map(|v| (name, v)));
        match parsed {
            Some((name, value)) => out.tally.set(name, value),
            None => out.rejected.push(RiddleError::MalformedRow {
                path: path.to_path_buf(),
                line: idx + 1,
                content: line.to_string(),
            }),
        }
    }
    out
}

fn render_rows(value_header: &str, tally: &Tally) -> String {
    let mut out = format!("Name,{}\n", value_header);
    for (name, value) in tally.ranked() {
        out.push_str(&format!("{},{}\n", name, value));
    }
    out
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Open (creating if needed) a lock sidecar. `Ok(None)` when its directory does not exist.
fn open_lock(lock_path: &Path) -> std::io::Result<Option<File>> {
    match OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(lock_path)
    {
        Ok(f) => Ok(Some(f)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read a whole file as UTF-8. `Ok(None)` when it does not exist.
fn read_existing(path: &Path) -> std::io::Result<Option<String>> {
    let mut f = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mut s = String::new();
    f.read_to_string(&mut s)?;
    Ok(Some(s))
}

/// Replace `path` with `content` via a temp file and rename. The caller holds the
/// table lock.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir)?;
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("table.csv");
    let mut counter = 0u32;
    let (tmp_path, mut tmp) = loop {
        let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(tmp) => break (candidate, tmp),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                counter = counter.saturating_add(1);
                continue;
            }
            Err(e) => return Err(e),
        }
    };
    let written = tmp
        .write_all(content.as_bytes())
        .and_then(|_| tmp.flush())
        .and_then(|_| {
            let _ = tmp.sync_all();
            drop(tmp);
            fs::rename(&tmp_path, path)
        });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    if let Ok(dir_file) = File::open(dir) {
        let _ = dir_file.sync_all();
    }
    Ok(())
}

/// Durable per-player history a game session reports into.
pub trait SessionStore {
    /// Count one more session for `name`; returns the new count.
    fn record_session(&mut self, name: &str) -> Result<i64, RiddleError>;

    /// Add a finished session's score to `name`'s leaderboard total; returns the new total.
    fn record_leaderboard_score(&mut self, name: &str, score: i64) -> Result<i64, RiddleError>;
}

/// [`SessionStore`] backed by the two CSV tables.
#[derive(Debug, Clone)]
pub struct CsvSessionStore {
    sessions: TallyFile,
    leaderboard: TallyFile,
}

impl CsvSessionStore {
    pub fn new(sessions_path: impl Into<PathBuf>, leaderboard_path: impl Into<PathBuf>) -> Self {
        CsvSessionStore {
            sessions: TallyFile::sessions(sessions_path),
            leaderboard: TallyFile::leaderboard(leaderboard_path),
        }
    }

    /// Tables at `<data_dir>/<sessions_file>` and `<data_dir>/<leaderboard_file>`.
    pub fn from_config(cfg: &StorageConfig) -> Self {
        let base = Path::new(&cfg.data_dir);
        Self::new(base.join(&cfg.sessions_file), base.join(&cfg.leaderboard_file))
    }

    pub fn sessions(&self) -> &TallyFile {
        &self.sessions
    }

    pub fn leaderboard(&self) -> &TallyFile {
        &self.leaderboard
    }
}

impl SessionStore for CsvSessionStore {
    fn record_session(&mut self, name: &str) -> Result<i64, RiddleError> {
        self.sessions.add(name, 1)
    }

    fn record_leaderboard_score(&mut self, name: &str, score: i64) -> Result<i64, RiddleError> {
        self.leaderboard.add(name, score)
    }
}

/// [`SessionStore`] that keeps everything in memory (practice runs, tests).
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    pub sessions: Tally,
    pub leaderboard: Tally,
    /// Number of leaderboard saves performed.
    pub leaderboard_writes: usize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn record_session(&mut self, name: &str) -> Result<i64, RiddleError> {
        Ok(self.sessions.add(name, 1))
    }

    fn record_leaderboard_score(&mut self, name: &str, score: i64) -> Result<i64, RiddleError> {
        self.leaderboard_writes += 1;
        Ok(self.leaderboard.add(name, score))
    }
}
