//! Run summary, row-level warnings and progress reporting.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ourlab_core::model::EntityKind;
use serde::Serialize;
use uuid::Uuid;

use crate::source::Row;

// ─── Warnings ────────────────────────────────────────────────────────────────

/// Why a row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum WarningReason {
  /// The parent university did not resolve.
  UniversityNotFound,
  /// The parent (or refined) department did not resolve.
  DepartmentNotFound,
  /// A key column was empty.
  BlankKey { column: String },
  /// The store rejected the write and the run is set to skip failures.
  WriteFailed { message: String },
}

impl std::fmt::Display for WarningReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::UniversityNotFound => f.write_str("university not found"),
      Self::DepartmentNotFound => f.write_str("department not found"),
      Self::BlankKey { column } => write!(f, "blank `{column}`"),
      Self::WriteFailed { message } => write!(f, "write failed: {message}"),
    }
  }
}

/// A skipped row, with the full source record for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
  pub kind:   EntityKind,
  #[serde(flatten)]
  pub reason: WarningReason,
  pub row:    BTreeMap<String, String>,
}

impl Warning {
  pub fn new(kind: EntityKind, reason: WarningReason, row: &Row<'_>) -> Self {
    Self { kind, reason, row: row.to_map() }
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
  /// Source rows considered by the stage.
  pub rows:     usize,
  pub inserted: usize,
  pub updated:  usize,
  pub skipped:  usize,
}

impl KindCounts {
  pub(crate) fn count_write(&mut self, created: bool) {
    if created {
      self.inserted += 1;
    } else {
      self.updated += 1;
    }
  }
}

/// Outcome of one loader run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
  pub run_id:              Uuid,
  pub started_at:          DateTime<Utc>,
  pub finished_at:         Option<DateTime<Utc>>,
  pub counts:              BTreeMap<EntityKind, KindCounts>,
  /// Departments removed by the pre-load clear (labs cascade with them).
  pub departments_cleared: u64,
  pub warnings:            Vec<Warning>,
}

impl Summary {
  pub fn new() -> Self {
    Self {
      run_id:              Uuid::new_v4(),
      started_at:          Utc::now(),
      finished_at:         None,
      counts:              BTreeMap::new(),
      departments_cleared: 0,
      warnings:            Vec::new(),
    }
  }

  pub fn counts(&self, kind: EntityKind) -> KindCounts {
    self.counts.get(&kind).copied().unwrap_or_default()
  }

  pub fn counts_mut(&mut self, kind: EntityKind) -> &mut KindCounts {
    self.counts.entry(kind).or_default()
  }

  pub fn warnings_for(&self, kind: EntityKind) -> impl Iterator<Item = &Warning> {
    self.warnings.iter().filter(move |w| w.kind == kind)
  }

  pub(crate) fn record_warning(&mut self, reporter: &impl Reporter, warning: Warning) {
    reporter.warning(&warning);
    self.counts_mut(warning.kind).skipped += 1;
    self.warnings.push(warning);
  }

  pub(crate) fn close(&mut self, reporter: &impl Reporter) {
    self.finished_at = Some(Utc::now());
    reporter.run_finished(self);
  }
}

impl Default for Summary {
  fn default() -> Self { Self::new() }
}

// ─── Reporter ────────────────────────────────────────────────────────────────

/// Receives progress, stage boundaries and warnings as the run proceeds.
///
/// Every method has a no-op default.
pub trait Reporter: Send + Sync {
  fn run_started(&self, _summary: &Summary) {}

  fn stage_started(&self, _kind: EntityKind, _rows: usize) {}

  fn progress(&self, _kind: EntityKind, _done: usize, _total: usize) {}

  fn warning(&self, _warning: &Warning) {}

  fn departments_cleared(&self, _count: u64) {}

  fn stage_finished(&self, _kind: EntityKind, _counts: &KindCounts) {}

  fn run_finished(&self, _summary: &Summary) {}
}

/// A reporter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Reporter for Silent {}

/// The default reporter: everything goes to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
  fn run_started(&self, summary: &Summary) {
    tracing::info!(run_id = %summary.run_id, "Seed load started");
  }

  fn stage_started(&self, kind: EntityKind, rows: usize) {
    tracing::info!("[{kind}] loading {rows} rows");
  }

  fn progress(&self, kind: EntityKind, done: usize, total: usize) {
    tracing::info!("[{kind}] processed {done}/{total} rows");
  }

  fn warning(&self, warning: &Warning) {
    tracing::warn!(row = ?warning.row, "[{}] skipped row: {}", warning.kind, warning.reason);
  }

  fn departments_cleared(&self, count: u64) {
    tracing::info!("[{}] cleared {count} existing departments", EntityKind::Departments);
  }

  fn stage_finished(&self, kind: EntityKind, counts: &KindCounts) {
    tracing::info!(
      "[{kind}] done: {} inserted, {} updated, {} skipped",
      counts.inserted,
      counts.updated,
      counts.skipped
    );
  }

  fn run_finished(&self, summary: &Summary) {
    tracing::info!(
      run_id = %summary.run_id,
      warnings = summary.warnings.len(),
      "Seed load completed"
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::source::Table;

  #[test]
  fn warning_serializes_flat() {
    let table = Table::from_reader(
      EntityKind::Labs,
      "university_name_ko,lab_name_ko\n가상대학교,\n".as_bytes(),
    )
    .unwrap();
    let row = table.rows().next().unwrap();
    let warning = Warning::new(
      EntityKind::Labs,
      WarningReason::BlankKey { column: "lab_name_ko".into() },
      &row,
    );

    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(json["kind"], "labs");
    assert_eq!(json["reason"], "blank_key");
    assert_eq!(json["column"], "lab_name_ko");
    assert_eq!(json["row"]["university_name_ko"], "가상대학교");
  }

  #[test]
  fn recording_a_warning_counts_a_skip() {
    let mut summary = Summary::new();
    let table =
      Table::from_reader(EntityKind::Departments, "department_name_ko\n물리학과\n".as_bytes())
        .unwrap();
    let row = table.rows().next().unwrap();

    summary.record_warning(
      &Silent,
      Warning::new(EntityKind::Departments, WarningReason::UniversityNotFound, &row),
    );

    assert_eq!(summary.counts(EntityKind::Departments).skipped, 1);
    assert_eq!(summary.counts(EntityKind::Labs), KindCounts::default());
    assert_eq!(summary.warnings_for(EntityKind::Departments).count(), 1);
  }

  #[test]
  fn summary_serializes_counts_by_kind() {
    let mut summary = Summary::new();
    summary.counts_mut(EntityKind::Universities).inserted = 3;
    summary.close(&Silent);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["counts"]["universities"]["inserted"], 3);
    assert!(json["finished_at"].is_string());
    assert_eq!(json["run_id"], summary.run_id.to_string());
  }
}
