//! Run report models.
//!
//! A run report lives only for the duration of one run; it is logged and
//! turned into an exit status, never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::Category;

/// Unique identifier for a single job run, used to correlate log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one category request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOutcome {
    pub category: Category,
    pub success: bool,
}

/// Outcome of the sync phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Succeeded,
    Failed,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Succeeded)
    }
}

impl From<bool> for SyncOutcome {
    fn from(ok: bool) -> Self {
        if ok {
            SyncOutcome::Succeeded
        } else {
            SyncOutcome::Failed
        }
    }
}

/// Record of one job run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: RunId,
    /// Date the run generated videos for
    pub date: NaiveDate,
    /// One entry per category, in processing order
    pub categories: Vec<CategoryOutcome>,
    pub sync: SyncOutcome,
}

impl RunReport {
    /// Number of categories that succeeded.
    pub fn succeeded_count(&self) -> usize {
        self.categories.iter().filter(|c| c.success).count()
    }

    /// Categories whose request failed, in processing order.
    pub fn failed_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .filter(|c| !c.success)
            .map(|c| c.category)
            .collect()
    }

    /// True only when every category and the sync succeeded.
    pub fn is_success(&self) -> bool {
        let all_categories = self.categories.iter().all(|c| c.success);
        all_categories & self.sync.is_success()
    }

    /// Process exit code for this run.
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
