//! Per-session suggestion history.
//!
//! The original interaction loop kept the "already shown" set in ambient
//! UI state; here it is an explicit value owned by the caller and passed
//! into each selection call. The engine itself never touches it.

use crate::activity::Activity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// State carried across the interactions of one suggestion session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Names already shown this session; never re-suggested.
    pub excluded: BTreeSet<String>,
    /// The activity currently shown to the user, if any.
    pub current: Option<Activity>,
    /// Minutes the user said they have available.
    pub available_minutes: u32,
    #[serde(with = "time::serde::iso8601")]
    pub last_updated: OffsetDateTime,
}

impl SessionState {
    #[must_use]
    pub fn new(available_minutes: u32) -> Self {
        Self {
            excluded: BTreeSet::new(),
            current: None,
            available_minutes,
            last_updated: OffsetDateTime::now_utc(),
        }
    }

    /// Records a freshly shown activity: the previous and the new name both
    /// join the exclusion set, so neither can be drawn again this session.
    pub fn show(&mut self, activity: Activity) {
        if let Some(prev) = self.current.take() {
            self.excluded.insert(prev.name);
        }
        self.excluded.insert(activity.name.clone());
        self.current = Some(activity);
        self.last_updated = OffsetDateTime::now_utc();
    }

    /// Clears the current suggestion once the user accepts it.
    pub fn accept(&mut self) -> Option<Activity> {
        self.last_updated = OffsetDateTime::now_utc();
        self.current.take()
    }

    pub fn load(path: &Path) -> Result<Option<Self>, SessionError> {
        if !path.exists() {
            return Ok(None);
        }
        let file = File::open(path)?;
        let state = serde_json::from_reader(file)?;
        Ok(Some(state))
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
