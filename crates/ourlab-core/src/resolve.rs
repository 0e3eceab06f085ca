//! Entity resolution: natural key → existing row.
//!
//! A miss is reported as `Ok(None)`; deciding what to do with an unresolved
//! row is the caller's business.

use std::collections::HashMap;

use crate::{
  model::{
    Department, DepartmentId, DepartmentIndexEntry, University, UniversityId,
  },
  store::CatalogStore,
};

// ─── University ──────────────────────────────────────────────────────────────

/// The lookup path used to identify a university.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniversityKey {
  /// Exact match on `official_code`.
  Code(String),
  /// Exact match on the Korean display name.
  Name(String),
}

impl UniversityKey {
  /// Pick the lookup path for a source row. The code wins whenever it is
  /// non-blank; the name is only used when the code is missing. Returns
  /// `None` when both are blank.
  pub fn from_parts(code: Option<&str>, name_ko: Option<&str>) -> Option<Self> {
    let code = code.map(str::trim).filter(|c| !c.is_empty());
    let name = name_ko.map(str::trim).filter(|n| !n.is_empty());
    match (code, name) {
      (Some(code), _) => Some(Self::Code(code.to_owned())),
      (None, Some(name)) => Some(Self::Name(name.to_owned())),
      (None, None) => None,
    }
  }
}

/// Resolve a university by exactly one lookup path.
pub async fn resolve_university<S: CatalogStore>(
  store: &S,
  key:   &UniversityKey,
) -> Result<Option<University>, S::Error> {
  match key {
    UniversityKey::Code(code) => store.find_university_by_code(code.clone()).await,
    UniversityKey::Name(name) => store.find_university_by_name(name.clone()).await,
  }
}

// ─── Department ──────────────────────────────────────────────────────────────

/// Exact match on `(university_id, name_ko)`; no fallback.
pub async fn resolve_department<S: CatalogStore>(
  store:         &S,
  university_id: UniversityId,
  name_ko:       &str,
) -> Result<Option<Department>, S::Error> {
  store.find_department(university_id, name_ko.trim().to_owned()).await
}

// ─── Lab parents ─────────────────────────────────────────────────────────────

/// The owners a lab row resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabParent {
  pub university_id: UniversityId,
  pub department_id: DepartmentId,
}

/// `(university name, department name)` → owning ids, built once per batch.
///
/// The index is a snapshot: it must be rebuilt after departments change.
#[derive(Debug, Clone, Default)]
pub struct DepartmentIndex {
  by_names: HashMap<(String, String), LabParent>,
}

impl DepartmentIndex {
  /// Snapshot the current university ⋈ department join.
  pub async fn build<S: CatalogStore>(store: &S) -> Result<Self, S::Error> {
    Ok(Self::from_entries(store.department_index().await?))
  }

  /// Build from join rows. When two entries share a name pair (two
  /// universities with the same Korean name), the last one wins.
  pub fn from_entries(entries: impl IntoIterator<Item = DepartmentIndexEntry>) -> Self {
    let mut by_names = HashMap::new();
    for e in entries {
      by_names.insert((e.university_name_ko, e.department_name_ko), LabParent {
        university_id: e.university_id,
        department_id: e.department_id,
      });
    }
    Self { by_names }
  }

  pub fn resolve(&self, university_name_ko: &str, department_name_ko: &str) -> Option<LabParent> {
    self
      .by_names
      .get(&(
        university_name_ko.trim().to_owned(),
        department_name_ko.trim().to_owned(),
      ))
      .copied()
  }

  pub fn len(&self) -> usize { self.by_names.len() }

  pub fn is_empty(&self) -> bool { self.by_names.is_empty() }
}
