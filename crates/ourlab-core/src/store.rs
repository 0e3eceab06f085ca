//! The `CatalogStore` trait.
//!
//! The trait is implemented by storage backends (`ourlab-store-sqlite`, and
//! [`crate::memory::MemoryStore`] for tests). The resolver, the upsert
//! engine and the seed loader depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::model::{
  DegreeRefinement, Department, DepartmentId, DepartmentIndexEntry, Lab,
  NewDepartment, NewLab, NewUniversity, University, UniversityFields,
  UniversityId, Upserted,
};

/// Abstraction over a catalogue storage backend.
///
/// Each write is committed on its own; there is no transaction spanning
/// several calls. Every write sets `updated_at` to the time of the call and
/// leaves `created_at` untouched on update.
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Universities ──────────────────────────────────────────────────────

  /// Exact match on `official_code`.
  fn find_university_by_code(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<University>, Self::Error>> + Send + '_;

  /// Exact match on the Korean display name. If several rows share the
  /// name, the one with the lowest id is returned.
  fn find_university_by_name(
    &self,
    name_ko: String,
  ) -> impl Future<Output = Result<Option<University>, Self::Error>> + Send + '_;

  /// Insert a university keyed on `code`, or overwrite `name_ko` and every
  /// [`UniversityFields`] attribute of the row that already holds it.
  /// `source` is only written on insert.
  fn upsert_university_by_code(
    &self,
    code: String,
    input: NewUniversity,
  ) -> impl Future<Output = Result<Upserted<University>, Self::Error>> + Send + '_;

  /// Insert a university with a null `official_code`.
  fn insert_university(
    &self,
    input: NewUniversity,
  ) -> impl Future<Output = Result<University, Self::Error>> + Send + '_;

  /// Overwrite the non-key attributes of an existing university.
  fn update_university(
    &self,
    id: UniversityId,
    fields: UniversityFields,
  ) -> impl Future<Output = Result<University, Self::Error>> + Send + '_;

  fn list_universities(
    &self,
  ) -> impl Future<Output = Result<Vec<University>, Self::Error>> + Send + '_;

  // ── Departments ───────────────────────────────────────────────────────

  /// Exact match on `(university_id, name_ko)`.
  fn find_department(
    &self,
    university_id: UniversityId,
    name_ko: String,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  /// Insert a department keyed on `(university_id, name_ko)`, or overwrite
  /// `name_en`, `parent_college` and all three degree flags of the existing
  /// row. `source` is only written on insert.
  fn upsert_department(
    &self,
    input: NewDepartment,
  ) -> impl Future<Output = Result<Upserted<Department>, Self::Error>> + Send + '_;

  /// Refine the master/doctorate flags of an existing department.
  ///
  /// Only `degree_master`, `degree_phd` and `updated_at` change. Returns
  /// `None` when no department matches the key.
  fn refine_department(
    &self,
    input: DegreeRefinement,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  /// Delete every department (and, by cascade, every lab). Returns the
  /// number of departments removed.
  fn clear_departments(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The university ⋈ department join, one entry per department.
  fn department_index(
    &self,
  ) -> impl Future<Output = Result<Vec<DepartmentIndexEntry>, Self::Error>> + Send + '_;

  /// List departments, optionally restricted to one university.
  fn list_departments(
    &self,
    university_id: Option<UniversityId>,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  // ── Labs ──────────────────────────────────────────────────────────────

  /// Exact match on `(department_id, name_ko)`.
  fn find_lab(
    &self,
    department_id: DepartmentId,
    name_ko: String,
  ) -> impl Future<Output = Result<Option<Lab>, Self::Error>> + Send + '_;

  /// Insert a lab keyed on `(department_id, name_ko)`, or overwrite
  /// `name_en`, `professor_name` and `homepage_url` of the existing row.
  /// Aliases start empty and are never written here.
  fn upsert_lab(
    &self,
    input: NewLab,
  ) -> impl Future<Output = Result<Upserted<Lab>, Self::Error>> + Send + '_;

  /// List labs, optionally restricted to one department.
  fn list_labs(
    &self,
    department_id: Option<DepartmentId>,
  ) -> impl Future<Output = Result<Vec<Lab>, Self::Error>> + Send + '_;
}
