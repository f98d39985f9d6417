use glob::glob;
use simple_log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::trie::Trie;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("Could not open the file: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("bad dictionary pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("no dictionary file matches {0}")]
    NoMatch(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    pub lowercase_entries: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub accepted: usize,
    pub rejected: usize,
}

impl LoadReport {
    fn merge(&mut self, other: LoadReport) {
        self.accepted += other.accepted;
        self.rejected += other.rejected;
    }
}

/// Splits dictionary text into entries: one per line, spaces inside an
/// entry removed, blank lines dropped.
pub fn read_entries(content: &str) -> Vec<String> {
    let mut entries = Vec::new();
    for line in content.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let entry: String = line.chars().filter(|&ch| ch != ' ').collect();
        if !entry.is_empty() {
            entries.push(entry);
        }
    }
    entries
}

pub fn insert_entries(trie: &mut Trie, entries: Vec<String>, options: LoadOptions) -> LoadReport {
    let mut report = LoadReport::default();
    for entry in entries {
        let word = if options.lowercase_entries {
            entry.to_lowercase()
        } else {
            entry
        };
        match trie.insert(&word) {
            Ok(()) => report.accepted += 1,
            Err(e) => {
                warn!("{}", e);
                report.rejected += 1;
            }
        }
    }
    report
}

pub fn load_file(path: &Path, trie: &mut Trie, options: LoadOptions) -> Result<LoadReport, DictionaryError> {
    let content = fs::read_to_string(path).map_err(|source| DictionaryError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let report = insert_entries(trie, read_entries(&content), options);
    debug!(
        "{}: {} accepted, {} rejected",
        path.display(),
        report.accepted,
        report.rejected
    );
    Ok(report)
}

/// Expands a leading `~/` to the user's home directory.
pub fn expand_home(pattern: &str) -> String {
    if let Some(rest) = pattern.strip_prefix("~/") {
        if let Some(home) = home::home_dir() {
            return home.join(rest).display().to_string();
        }
    }
    pattern.to_string()
}

/// Resolves a path or glob pattern to the dictionary files it names, sorted.
pub fn resolve_paths(pattern: &str) -> Result<Vec<PathBuf>, DictionaryError> {
    let target = expand_home(pattern);
    let paths = glob(&target).map_err(|source| DictionaryError::Pattern {
        pattern: target.clone(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => {
                error!("{:?}", e);
            }
        }
    }
    if files.is_empty() {
        return Err(DictionaryError::NoMatch(target));
    }
    files.sort();
    Ok(files)
}

/// Loads every file matching `pattern` into `trie`. Unreadable files are
/// reported and skipped; the trie keeps whatever was loaded.
pub fn prepare_dictionary(pattern: &str, trie: &mut Trie, options: LoadOptions) -> LoadReport {
    let mut report = LoadReport::default();
    let files = match resolve_paths(pattern) {
        Ok(files) => files,
        Err(e) => {
            error!("{}", e);
            return report;
        }
    };

    for path in files.iter() {
        match load_file(path, trie, options) {
            Ok(file_report) => report.merge(file_report),
            Err(e) => error!("{}", e),
        }
    }
    info!(
        "loaded {} words ({} rejected), {} nodes",
        report.accepted,
        report.rejected,
        trie.node_count()
    );
    report
}
