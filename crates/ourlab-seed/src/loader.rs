//! The batch loader.
//!
//! One run walks the selected stages in [`EntityKind`] order:
//!
//! 1. **universities**: upsert by `official_code`, or by `name_ko` when the
//!    code is blank.
//! 2. **departments**: clear the department table (labs cascade), then
//!    resolve each row's university and upsert the department.
//! 3. **labs**: resolve `(university, department)` names through a
//!    [`DepartmentIndex`] snapshot and upsert the lab.
//! 4. **graduate**: refine the master/doctorate flags of existing departments
//!    from the graduate-program extract. Only runs when that extract is
//!    given.
//!
//! Rows are written one at a time with no batch-spanning transaction.

use ourlab_core::{
  model::{DegreeRefinement, EntityKind, NewDepartment, NewLab, NewUniversity, SOURCE_SEED_CSV},
  normalize::NameNormalizer,
  resolve::{DepartmentIndex, UniversityKey, resolve_university},
  store::CatalogStore,
  upsert,
};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  report::{Reporter, Summary, TracingReporter, Warning, WarningReason},
  rows::{self, DepartmentRow, GraduateRow, LabRow, UniversityRow, graduate},
  source::{Row, SourceTables, Sources, Table, selected_kinds},
};

/// What to do when the store rejects a row write.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WriteFailurePolicy {
  /// Stop the run with [`Error::Store`].
  #[default]
  Abort,
  /// Record a [`WarningReason::WriteFailed`] warning and continue.
  Skip,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
  /// Restrict the run to one stage. Upstream rows must already be stored.
  pub only:           Option<EntityKind>,
  pub on_write_error: WriteFailurePolicy,
  /// Applied to graduate-extract school names.
  pub normalizer:     NameNormalizer,
}

/// Rows between progress reports.
fn progress_every(kind: EntityKind) -> usize {
  match kind {
    EntityKind::Universities => 50,
    _ => 1000,
  }
}

fn store_error<E>(kind: EntityKind) -> impl FnOnce(E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  move |e| Error::Store { kind, source: Box::new(e) }
}

fn blank(column: &str) -> WarningReason {
  WarningReason::BlankKey { column: column.to_owned() }
}

pub struct Loader<'s, S, R = TracingReporter> {
  store:    &'s S,
  options:  LoadOptions,
  reporter: R,
}

impl<'s, S: CatalogStore> Loader<'s, S> {
  pub fn new(store: &'s S, options: LoadOptions) -> Self {
    Self { store, options, reporter: TracingReporter }
  }
}

impl<'s, S: CatalogStore, R: Reporter> Loader<'s, S, R> {
  pub fn with_reporter<R2: Reporter>(self, reporter: R2) -> Loader<'s, S, R2> {
    Loader { store: self.store, options: self.options, reporter }
  }

  /// Read, remap and validate the sources on disk, then load them.
  pub async fn run(&self, sources: &Sources) -> Result<Summary> {
    let tables = SourceTables::read(sources, self.options.only)?;
    self.load(&tables).await
  }

  /// Load already-read tables.
  ///
  /// Every selected table is checked for presence and required columns
  /// before the first write, so a validation failure leaves the store
  /// untouched.
  pub async fn load(&self, tables: &SourceTables) -> Result<Summary> {
    let stages = self.stages(tables)?;
    for table in &stages {
      table.require_columns(rows::required_columns(table.kind()))?;
    }

    let mut summary = Summary::new();
    self.reporter.run_started(&summary);

    for table in stages {
      let kind = table.kind();
      self.reporter.stage_started(kind, table.len());
      match kind {
        EntityKind::Universities => self.load_universities(table, &mut summary).await?,
        EntityKind::Departments => self.load_departments(table, &mut summary).await?,
        EntityKind::Labs => self.load_labs(table, &mut summary).await?,
        EntityKind::Graduate => self.refine_graduate(table, &mut summary).await?,
      }
      self.reporter.stage_finished(kind, &summary.counts(kind));
    }

    summary.close(&self.reporter);
    Ok(summary)
  }

  /// The tables to load, in stage order.
  fn stages<'t>(&self, tables: &'t SourceTables) -> Result<Vec<&'t Table>> {
    let mut stages = Vec::new();
    for kind in selected_kinds(self.options.only) {
      match tables.get(kind) {
        Some(table) => stages.push(table),
        None if kind == EntityKind::Graduate && self.options.only.is_none() => {
          tracing::info!("[{kind}] no source given; skipping refinement");
        }
        None => return Err(Error::MissingSource(kind)),
      }
    }
    Ok(stages)
  }

  // ─── Row bookkeeping ───────────────────────────────────────────────────────

  fn skip(&self, summary: &mut Summary, kind: EntityKind, row: &Row<'_>, reason: WarningReason) {
    summary.record_warning(&self.reporter, Warning::new(kind, reason, row));
  }

  /// Apply the write-failure policy to a rejected write.
  fn write_failed<E>(
    &self,
    summary: &mut Summary,
    kind: EntityKind,
    row: &Row<'_>,
    error: E,
  ) -> Result<()>
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match self.options.on_write_error {
      WriteFailurePolicy::Abort => Err(store_error(kind)(error)),
      WriteFailurePolicy::Skip => {
        let message = error.to_string();
        self.skip(summary, kind, row, WarningReason::WriteFailed { message });
        Ok(())
      }
    }
  }

  fn tick(&self, kind: EntityKind, done: usize, total: usize) {
    if done > 0 && done % progress_every(kind) == 0 {
      self.reporter.progress(kind, done, total);
    }
  }

  // ─── Stages ────────────────────────────────────────────────────────────────

  async fn load_universities(&self, table: &Table, summary: &mut Summary) -> Result<()> {
    let kind = EntityKind::Universities;
    let total = table.len();

    for (i, row) in table.rows().enumerate() {
      self.tick(kind, i, total);
      summary.counts_mut(kind).rows += 1;

      let parsed = UniversityRow::from_row(&row);
      let Some(name_ko) = parsed.name_ko else {
        self.skip(summary, kind, &row, blank("name_ko"));
        continue;
      };

      let input = NewUniversity {
        name_ko,
        fields: parsed.fields,
        source: Some(SOURCE_SEED_CSV.to_owned()),
      };
      match upsert::upsert_university(self.store, parsed.official_code.as_deref(), input).await {
        Ok(written) => summary.counts_mut(kind).count_write(written.created),
        Err(e) => self.write_failed(summary, kind, &row, e)?,
      }
    }
    Ok(())
  }

  async fn load_departments(&self, table: &Table, summary: &mut Summary) -> Result<()> {
    let kind = EntityKind::Departments;
    let total = table.len();

    let cleared = self
      .store
      .clear_departments()
      .await
      .map_err(store_error(kind))?;
    summary.departments_cleared = cleared;
    self.reporter.departments_cleared(cleared);

    for (i, row) in table.rows().enumerate() {
      self.tick(kind, i, total);
      summary.counts_mut(kind).rows += 1;

      let parsed = DepartmentRow::from_row(&row);
      let Some(name_ko) = parsed.name_ko else {
        self.skip(summary, kind, &row, blank("department_name_ko"));
        continue;
      };
      let Some(key) = UniversityKey::from_parts(
        parsed.university_official_code.as_deref(),
        parsed.university_name_ko.as_deref(),
      ) else {
        self.skip(summary, kind, &row, blank("university_name_ko"));
        continue;
      };

      let university = resolve_university(self.store, &key)
        .await
        .map_err(store_error(kind))?;
      let Some(university) = university else {
        self.skip(summary, kind, &row, WarningReason::UniversityNotFound);
        continue;
      };

      let input = NewDepartment {
        university_id: university.id,
        name_ko,
        name_en: parsed.name_en,
        parent_college: parsed.parent_college,
        degrees: parsed.degrees,
        source: Some(SOURCE_SEED_CSV.to_owned()),
      };
      match upsert::upsert_department(self.store, input).await {
        Ok(written) => summary.counts_mut(kind).count_write(written.created),
        Err(e) => self.write_failed(summary, kind, &row, e)?,
      }
    }
    Ok(())
  }

  async fn load_labs(&self, table: &Table, summary: &mut Summary) -> Result<()> {
    let kind = EntityKind::Labs;
    let total = table.len();

    let index = DepartmentIndex::build(self.store)
      .await
      .map_err(store_error(kind))?;
    tracing::debug!("[{kind}] department index holds {} entries", index.len());

    for (i, row) in table.rows().enumerate() {
      self.tick(kind, i, total);
      summary.counts_mut(kind).rows += 1;

      let parsed = LabRow::from_row(&row);
      let Some(university_name) = parsed.university_name_ko else {
        self.skip(summary, kind, &row, blank("university_name_ko"));
        continue;
      };
      let Some(department_name) = parsed.department_name_ko else {
        self.skip(summary, kind, &row, blank("department_name_ko"));
        continue;
      };
      let Some(name_ko) = parsed.name_ko else {
        self.skip(summary, kind, &row, blank("lab_name_ko"));
        continue;
      };
      let Some(parent) = index.resolve(&university_name, &department_name) else {
        self.skip(summary, kind, &row, WarningReason::DepartmentNotFound);
        continue;
      };

      let input = NewLab {
        university_id: parent.university_id,
        department_id: parent.department_id,
        name_ko,
        name_en: parsed.name_en,
        professor_name: parsed.professor_name,
        homepage_url: parsed.homepage_url,
        source: Some(SOURCE_SEED_CSV.to_owned()),
      };
      match upsert::upsert_lab(self.store, input).await {
        Ok(written) => summary.counts_mut(kind).count_write(written.created),
        Err(e) => self.write_failed(summary, kind, &row, e)?,
      }
    }
    Ok(())
  }

  async fn refine_graduate(&self, table: &Table, summary: &mut Summary) -> Result<()> {
    let kind = EntityKind::Graduate;
    let total = table.len();

    for (i, row) in table.rows().enumerate() {
      self.tick(kind, i, total);

      let parsed = GraduateRow::from_row(&row);
      if !parsed.is_graduate() {
        continue;
      }
      summary.counts_mut(kind).rows += 1;

      let Some(school) = parsed
        .school
        .as_deref()
        .and_then(|s| self.options.normalizer.normalize(s))
      else {
        self.skip(summary, kind, &row, blank(graduate::SCHOOL));
        continue;
      };
      let Some(department) = parsed.department.clone() else {
        self.skip(summary, kind, &row, blank(graduate::DEPARTMENT));
        continue;
      };

      let university = resolve_university(self.store, &UniversityKey::Name(school))
        .await
        .map_err(store_error(kind))?;
      let Some(university) = university else {
        self.skip(summary, kind, &row, WarningReason::UniversityNotFound);
        continue;
      };

      let (master, doctorate) = parsed.degrees();
      let refinement = DegreeRefinement {
        university_id: university.id,
        name_ko: department,
        master,
        doctorate,
      };
      match upsert::refine_department(self.store, refinement).await {
        Ok(Some(_)) => summary.counts_mut(kind).updated += 1,
        Ok(None) => self.skip(summary, kind, &row, WarningReason::DepartmentNotFound),
        Err(e) => self.write_failed(summary, kind, &row, e)?,
      }
    }
    Ok(())
  }
}
