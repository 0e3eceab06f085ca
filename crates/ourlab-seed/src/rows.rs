//! Typed views over source rows, one per [`EntityKind`].

use ourlab_core::{
  model::{DegreeFlags, EntityKind, UniversityFields},
  upsert::non_blank,
};

use crate::source::Row;

pub const UNIVERSITY_COLUMNS: &[&str] = &[
  "official_code",
  "name_ko",
  "name_en",
  "type",
  "region",
  "homepage_url",
  "email_domain",
  "address",
];

pub const DEPARTMENT_COLUMNS: &[&str] = &[
  "university_official_code",
  "university_name_ko",
  "department_name_ko",
  "department_name_en",
  "parent_college",
  "degree_bachelor",
  "degree_master",
  "degree_phd",
];

pub const LAB_COLUMNS: &[&str] = &[
  "university_name_ko",
  "department_name_ko",
  "lab_name_ko",
  "professor_name",
  "homepage_url",
];

/// Column names of the national graduate-program extract.
pub mod graduate {
  pub const DIVISION: &str = "대학구분";
  pub const SCHOOL: &str = "학교명";
  pub const DEPARTMENT: &str = "학부_과(전공)명";
  pub const DEGREE_PROCESS: &str = "학위과정";

  pub const COLUMNS: &[&str] = &[DIVISION, SCHOOL, DEPARTMENT, DEGREE_PROCESS];

  /// `대학구분` value of rows that describe graduate programs.
  pub const GRADUATE_DIVISION: &str = "대학원";
}

pub fn required_columns(kind: EntityKind) -> &'static [&'static str] {
  match kind {
    EntityKind::Universities => UNIVERSITY_COLUMNS,
    EntityKind::Departments => DEPARTMENT_COLUMNS,
    EntityKind::Labs => LAB_COLUMNS,
    EntityKind::Graduate => graduate::COLUMNS,
  }
}

/// Textual boolean: exactly `True` is true.
pub fn parse_flag(value: Option<&str>) -> bool {
  value.map(str::trim) == Some("True")
}

/// Graduate degree flags from a `학위과정` label, as `(master, doctorate)`.
///
/// `석박사통합` (integrated programme) grants both. Note that `박사` is a
/// substring of `석박사통합`, so the integrated label also matches on its own.
pub fn parse_degree_process(value: &str) -> (bool, bool) {
  let integrated = value.contains("석박사통합");
  let master = integrated || value.contains("석사");
  let doctorate = integrated || value.contains("박사");
  (master, doctorate)
}

// ─── Rows ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniversityRow {
  pub official_code: Option<String>,
  pub name_ko:       Option<String>,
  pub fields:        UniversityFields,
}

impl UniversityRow {
  pub fn from_row(row: &Row<'_>) -> Self {
    let cell = |c: &str| non_blank(row.get(c));
    Self {
      official_code: cell("official_code"),
      name_ko:       cell("name_ko"),
      fields:        UniversityFields {
        name_en:          cell("name_en"),
        institution_type: cell("type"),
        region:           cell("region"),
        homepage_url:     cell("homepage_url"),
        email_domain:     cell("email_domain"),
        address:          cell("address"),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRow {
  pub university_official_code: Option<String>,
  pub university_name_ko:       Option<String>,
  pub name_ko:                  Option<String>,
  pub name_en:                  Option<String>,
  pub parent_college:           Option<String>,
  pub degrees:                  DegreeFlags,
}

impl DepartmentRow {
  pub fn from_row(row: &Row<'_>) -> Self {
    let cell = |c: &str| non_blank(row.get(c));
    Self {
      university_official_code: cell("university_official_code"),
      university_name_ko:       cell("university_name_ko"),
      name_ko:                  cell("department_name_ko"),
      name_en:                  cell("department_name_en"),
      parent_college:           cell("parent_college"),
      degrees:                  DegreeFlags {
        bachelor:  parse_flag(row.get("degree_bachelor")),
        master:    parse_flag(row.get("degree_master")),
        doctorate: parse_flag(row.get("degree_phd")),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabRow {
  pub university_name_ko: Option<String>,
  pub department_name_ko: Option<String>,
  pub name_ko:            Option<String>,
  /// Optional column; most extracts do not carry it.
  pub name_en:            Option<String>,
  pub professor_name:     Option<String>,
  pub homepage_url:       Option<String>,
}

impl LabRow {
  pub fn from_row(row: &Row<'_>) -> Self {
    let cell = |c: &str| non_blank(row.get(c));
    Self {
      university_name_ko: cell("university_name_ko"),
      department_name_ko: cell("department_name_ko"),
      name_ko:            cell("lab_name_ko"),
      name_en:            cell("lab_name_en"),
      professor_name:     cell("professor_name"),
      homepage_url:       cell("homepage_url"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraduateRow {
  pub division:       Option<String>,
  pub school:         Option<String>,
  pub department:     Option<String>,
  pub degree_process: Option<String>,
}

impl GraduateRow {
  pub fn from_row(row: &Row<'_>) -> Self {
    let cell = |c: &str| non_blank(row.get(c));
    Self {
      division:       cell(graduate::DIVISION),
      school:         cell(graduate::SCHOOL),
      department:     cell(graduate::DEPARTMENT),
      degree_process: cell(graduate::DEGREE_PROCESS),
    }
  }

  pub fn is_graduate(&self) -> bool {
    self.division.as_deref() == Some(graduate::GRADUATE_DIVISION)
  }

  /// `(master, doctorate)`; a blank degree label grants neither.
  pub fn degrees(&self) -> (bool, bool) {
    self
      .degree_process
      .as_deref()
      .map_or((false, false), parse_degree_process)
  }
}
