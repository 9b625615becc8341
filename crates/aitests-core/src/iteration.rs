//! Iteration records and history
//!
//! Records are assembled through [`IterationRecordBuilder`] and only
//! escape once completed. [`IterationHistory`] is a persistent vector:
//! `append` returns a new history sharing structure with the old one.

use crate::generation::GenerationResult;
use crate::run::RunResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Iteration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IterationStatus {
    /// Generated, not yet run
    Pending,
    /// Runner reported success
    Fixed,
    /// Failures remain, attempts left
    NeedsReview,
    /// Failures remain, budget spent
    Exhausted,
}

impl IterationStatus {
    /// Wire spelling
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IterationStatus::Pending => "pending",
            IterationStatus::Fixed => "fixed",
            IterationStatus::NeedsReview => "needs-review",
            IterationStatus::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for IterationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pointer to a persisted repair suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixDescriptor {
    /// Test file the fix targets
    pub file_path: String,
    /// Suggestion artifact location
    pub suggestion_path: String,
    /// Human description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One completed attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationRecord {
    attempt_index: usize,
    started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    generated: Option<Vec<GenerationResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failed_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fixes: Option<Vec<FixDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    run: Option<RunResult>,
    status: IterationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Vec<String>>,
}

impl IterationRecord {
    /// Zero-based attempt index
    #[inline]
    #[must_use]
    pub fn attempt_index(&self) -> usize {
        self.attempt_index
    }

    /// Start time
    #[inline]
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Completion time
    #[inline]
    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Generated results
    #[inline]
    #[must_use]
    pub fn generated(&self) -> Option<&[GenerationResult]> {
        self.generated.as_deref()
    }

    /// Failing files carried into this attempt
    #[inline]
    #[must_use]
    pub fn failed_files(&self) -> Option<&[String]> {
        self.failed_files.as_deref()
    }

    /// Fix descriptors
    #[inline]
    #[must_use]
    pub fn fixes(&self) -> Option<&[FixDescriptor]> {
        self.fixes.as_deref()
    }

    /// Embedded run
    #[inline]
    #[must_use]
    pub fn run(&self) -> Option<&RunResult> {
        self.run.as_ref()
    }

    /// Status
    #[inline]
    #[must_use]
    pub fn status(&self) -> IterationStatus {
        self.status
    }

    /// Notes
    #[inline]
    #[must_use]
    pub fn notes(&self) -> Option<&[String]> {
        self.notes.as_deref()
    }
}

/// Accumulates an attempt before it is completed
#[derive(Debug)]
pub struct IterationRecordBuilder {
    record: IterationRecord,
}

impl IterationRecordBuilder {
    /// Create new builder
    #[must_use]
    pub fn new(attempt_index: usize, started_at: DateTime<Utc>) -> Self {
        Self {
            record: IterationRecord {
                attempt_index,
                started_at,
                completed_at: None,
                generated: None,
                failed_files: None,
                fixes: None,
                run: None,
                status: IterationStatus::Pending,
                notes: None,
            },
        }
    }

    /// Attach generated results
    #[must_use]
    pub fn with_generated(mut self, results: Vec<GenerationResult>) -> Self {
        self.record.generated = Some(results);
        self
    }

    /// Attach failing files; an empty list leaves the field absent
    #[must_use]
    pub fn with_failed_files(mut self, files: Vec<String>) -> Self {
        if !files.is_empty() {
            self.record.failed_files = Some(files);
        }
        self
    }

    /// Attach a run result
    #[must_use]
    pub fn with_run(mut self, run: RunResult) -> Self {
        self.record.run = Some(run);
        self
    }

    /// Attach fixes; an empty list leaves the field absent
    #[must_use]
    pub fn with_fixes(mut self, fixes: Vec<FixDescriptor>) -> Self {
        if !fixes.is_empty() {
            self.record.fixes = Some(fixes);
        }
        self
    }

    /// Finalize the record
    #[must_use]
    pub fn complete(
        mut self,
        status: IterationStatus,
        notes: Vec<String>,
        completed_at: DateTime<Utc>,
    ) -> IterationRecord {
        self.record.status = status;
        self.record.completed_at = Some(completed_at);
        if !notes.is_empty() {
            self.record.notes = Some(notes);
        }
        self.record
    }
}

/// Append-only attempt ledger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IterationHistory {
    records: im::Vector<IterationRecord>,
}

impl IterationHistory {
    /// Empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next record must carry
    #[inline]
    #[must_use]
    pub fn next_attempt_index(&self) -> usize {
        self.records.len()
    }

    /// Whether `limit` attempts have been used
    #[inline]
    #[must_use]
    pub fn exhausted(&self, limit: usize) -> bool {
        self.records.len() >= limit
    }

    /// Record with the highest attempt index
    #[must_use]
    pub fn latest(&self) -> Option<&IterationRecord> {
        self.records.iter().max_by_key(|r| r.attempt_index)
    }

    /// New history with `record` appended
    #[must_use]
    pub fn append(&self, record: IterationRecord) -> Self {
        let mut records = self.records.clone();
        records.push_back(record);
        Self { records }
    }

    /// Records in append order
    pub fn records(&self) -> impl Iterator<Item = &IterationRecord> {
        self.records.iter()
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no attempt was recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<IterationRecord> for IterationHistory {
    fn from_iter<T: IntoIterator<Item = IterationRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
