//! Catalogue entities: universities, departments and labs.
//!
//! The three kinds form a strict ownership chain: a university owns its
//! departments, a department owns its labs. Each kind has a natural key that
//! identifies it independently of the generated `id`:
//!
//! | kind       | natural key                                   |
//! |------------|-----------------------------------------------|
//! | University | `official_code`, or `name_ko` when it is null  |
//! | Department | `(university_id, name_ko)`                    |
//! | Lab        | `(department_id, name_ko)`                    |
//!
//! Key fields and ids never change once assigned.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provenance tag for rows written from the seed extracts.
pub const SOURCE_SEED_CSV: &str = "seed_csv";

// ─── Identifiers ─────────────────────────────────────────────────────────────

macro_rules! id_type {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
      Deserialize,
    )]
    #[serde(transparent)]
    pub struct $name(pub i64);

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
      }
    }
  };
}

id_type!(
  /// Store-assigned identifier of a [`University`].
  UniversityId
);
id_type!(
  /// Store-assigned identifier of a [`Department`].
  DepartmentId
);
id_type!(
  /// Store-assigned identifier of a [`Lab`].
  LabId
);

// ─── Entity kind ─────────────────────────────────────────────────────────────

/// The load stages, in the order the loader runs them.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
  Universities,
  Departments,
  Labs,
  /// The graduate-program refinement pass over departments.
  Graduate,
}

// ─── University ──────────────────────────────────────────────────────────────

/// The non-key university attributes. Every field is overwritten on update
/// ("last writer wins").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniversityFields {
  pub name_en:          Option<String>,
  /// Institution type, e.g. `대학교`, `전문대학`.
  pub institution_type: Option<String>,
  pub region:           Option<String>,
  pub homepage_url:     Option<String>,
  pub email_domain:     Option<String>,
  pub address:          Option<String>,
}

/// Input to the university write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUniversity {
  pub name_ko: String,
  pub fields:  UniversityFields,
  pub source:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct University {
  pub id:            UniversityId,
  pub official_code: Option<String>,
  pub name_ko:       String,
  #[serde(flatten)]
  pub fields:        UniversityFields,
  pub source:        Option<String>,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

// ─── Department ──────────────────────────────────────────────────────────────

/// The three independent degree-offered flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeFlags {
  pub bachelor:  bool,
  pub master:    bool,
  pub doctorate: bool,
}

/// Input to [`crate::store::CatalogStore::upsert_department`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDepartment {
  pub university_id:  UniversityId,
  pub name_ko:        String,
  pub name_en:        Option<String>,
  pub parent_college: Option<String>,
  pub degrees:        DegreeFlags,
  pub source:         Option<String>,
}

/// Input to [`crate::store::CatalogStore::refine_department`].
///
/// Only the master/doctorate flags are overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeRefinement {
  pub university_id: UniversityId,
  pub name_ko:       String,
  pub master:        bool,
  pub doctorate:     bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id:             DepartmentId,
  pub university_id:  UniversityId,
  pub name_ko:        String,
  pub name_en:        Option<String>,
  pub parent_college: Option<String>,
  pub degrees:        DegreeFlags,
  pub source:         Option<String>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// One row of the university ⋈ department join used to resolve lab parents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentIndexEntry {
  pub university_id:      UniversityId,
  pub university_name_ko: String,
  pub department_id:      DepartmentId,
  pub department_name_ko: String,
}

// ─── Lab ─────────────────────────────────────────────────────────────────────

/// Input to [`crate::store::CatalogStore::upsert_lab`]. Aliases are not part
/// of the input; new labs start with none and updates leave them alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLab {
  pub university_id:  UniversityId,
  pub department_id:  DepartmentId,
  pub name_ko:        String,
  pub name_en:        Option<String>,
  pub professor_name: Option<String>,
  pub homepage_url:   Option<String>,
  pub source:         Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
  pub id:             LabId,
  pub university_id:  UniversityId,
  pub department_id:  DepartmentId,
  pub name_ko:        String,
  pub name_en:        Option<String>,
  pub professor_name: Option<String>,
  pub homepage_url:   Option<String>,
  pub aliases:        Vec<String>,
  pub source:         Option<String>,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

// ─── Write outcome ───────────────────────────────────────────────────────────

/// A persisted record together with whether the write inserted it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted<T> {
  pub record:  T,
  pub created: bool,
}

impl<T> Upserted<T> {
  pub fn created(record: T) -> Self { Self { record, created: true } }

  pub fn updated(record: T) -> Self { Self { record, created: false } }
}
