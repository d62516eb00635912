// SPDX-License-Identifier: MIT
// Copyright (c) 2026 FareScope

//! On-disk persistence: the current session plus an archive of past
//! searches.
//!
//! The session file carries a version stamp. Anything missing, unreadable
//! or from an incompatible version is silently replaced by a fresh
//! session; persistence must never block a search.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::search::{SearchResults, SearchSession};

/// Bump when [`SearchSession`]'s persisted shape changes incompatibly.
pub const CURRENT_STATE_VERSION: u32 = 2;

/// How many archived searches survive a prune by default.
pub const DEFAULT_HISTORY_KEEP: usize = 10;

#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    version: u32,
    session: SearchSession,
}

pub struct SessionStore {
    root: PathBuf,
}

impl SessionStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Store rooted at the platform data directory.
    pub fn default_root() -> Self {
        Self::new(crate::get_data_root())
    }

    fn session_path(&self) -> PathBuf {
        self.root.join("session.json")
    }

    fn history_dir(&self) -> PathBuf {
        self.root.join("history")
    }

    /// Load the persisted session, or a fresh one when nothing usable is
    /// on disk.
    pub fn load_session(&self) -> SearchSession {
        let path = self.session_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("No stored session — path={}", path.display());
                return SearchSession::new();
            }
        };

        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) if stored.version == CURRENT_STATE_VERSION => {
                debug!("Session restored — path={}", path.display());
                stored.session
            }
            Ok(stored) => {
                warn!(
                    "Discarding session with incompatible version — found={} expected={}",
                    stored.version, CURRENT_STATE_VERSION
                );
                SearchSession::new()
            }
            Err(e) => {
                warn!(
                    "Discarding unreadable session — path={} error={}",
                    path.display(),
                    e
                );
                SearchSession::new()
            }
        }
    }

    pub fn save_session(&self, session: &SearchSession) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create data directory {}", self.root.display()))?;

        let stored = StoredSession {
            version: CURRENT_STATE_VERSION,
            session: session.clone(),
        };
        let json = serde_json::to_string_pretty(&stored).context("Failed to serialize session")?;
        let path = self.session_path();
        fs::write(&path, json)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;
        debug!("Session saved — path={}", path.display());
        Ok(())
    }

    /// Archive one search's results under `history/<search_id>.json`.
    pub fn archive_results(&self, results: &SearchResults) -> Result<PathBuf> {
        let dir = self.history_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create history directory {}", dir.display()))?;

        let path = dir.join(format!("{}.json", results.search_id));
        let json =
            serde_json::to_string_pretty(results).context("Failed to serialize search results")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(
            "Search archived — search_id={} path={}",
            results.search_id,
            path.display()
        );
        Ok(path)
    }

    /// Archived searches, newest first. Unreadable entries are skipped
    /// with a warning so one corrupt file never hides the rest.
    pub fn list_history(&self) -> Vec<SearchResults> {
        let dir = self.history_dir();
        if !dir.exists() {
            return Vec::new();
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&dir).max_depth(1).into_iter().flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = fs::read_to_string(path)
                .ok()
                .and_then(|raw| serde_json::from_str::<SearchResults>(&raw).ok());
            match parsed {
                Some(results) => entries.push(results),
                None => warn!("Skipping unreadable history entry — path={}", path.display()),
            }
        }

        entries.sort_by(|a, b| {
            let ta = chrono::DateTime::parse_from_rfc3339(&a.timestamp).ok();
            let tb = chrono::DateTime::parse_from_rfc3339(&b.timestamp).ok();
            tb.cmp(&ta)
        });
        entries
    }

    /// Drop archived searches beyond the newest `keep`. Returns how many
    /// files went away.
    pub fn prune_history(&self, keep: usize) -> Result<usize> {
        let entries = self.list_history();
        let mut removed = 0;
        for stale in entries.iter().skip(keep) {
            let path = self.history_dir().join(format!("{}.json", stale.search_id));
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        }
        if removed > 0 {
            info!(
                "History pruned — removed={} kept={}",
                removed,
                entries.len() - removed
            );
        }
        Ok(removed)
    }
}
