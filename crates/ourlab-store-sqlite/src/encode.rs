//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, lab aliases as a compact JSON
//! array, degree flags as 0/1 integers.

use chrono::{DateTime, Utc};
use ourlab_core::model::{
  DegreeFlags, Department, DepartmentId, DepartmentIndexEntry, Lab, LabId,
  University, UniversityFields, UniversityId,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Aliases ─────────────────────────────────────────────────────────────────

pub fn decode_aliases(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Column lists ────────────────────────────────────────────────────────────

/// Columns read by [`RawUniversity::from_row`], in order.
pub const UNIVERSITY_COLUMNS: &str = "id, official_code, name_ko, name_en, type, region, \
   homepage_url, email_domain, address, source, created_at, updated_at";

/// Columns read by [`RawDepartment::from_row`], in order.
pub const DEPARTMENT_COLUMNS: &str = "id, university_id, name_ko, name_en, parent_college, \
   degree_bachelor, degree_master, degree_phd, source, created_at, updated_at";

/// Columns read by [`RawLab::from_row`], in order.
pub const LAB_COLUMNS: &str = "id, university_id, department_id, name_ko, name_en, \
   professor_name, homepage_url, aliases, source, created_at, updated_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `university` row.
pub struct RawUniversity {
  pub id:               i64,
  pub official_code:    Option<String>,
  pub name_ko:          String,
  pub name_en:          Option<String>,
  pub institution_type: Option<String>,
  pub region:           Option<String>,
  pub homepage_url:     Option<String>,
  pub email_domain:     Option<String>,
  pub address:          Option<String>,
  pub source:           Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawUniversity {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      official_code:    row.get(1)?,
      name_ko:          row.get(2)?,
      name_en:          row.get(3)?,
      institution_type: row.get(4)?,
      region:           row.get(5)?,
      homepage_url:     row.get(6)?,
      email_domain:     row.get(7)?,
      address:          row.get(8)?,
      source:           row.get(9)?,
      created_at:       row.get(10)?,
      updated_at:       row.get(11)?,
    })
  }

  pub fn into_university(self) -> Result<University> {
    Ok(University {
      id:            UniversityId(self.id),
      official_code: self.official_code,
      name_ko:       self.name_ko,
      fields:        UniversityFields {
        name_en:          self.name_en,
        institution_type: self.institution_type,
        region:           self.region,
        homepage_url:     self.homepage_url,
        email_domain:     self.email_domain,
        address:          self.address,
      },
      source:        self.source,
      created_at:    decode_dt(&self.created_at)?,
      updated_at:    decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `department` row.
pub struct RawDepartment {
  pub id:              i64,
  pub university_id:   i64,
  pub name_ko:         String,
  pub name_en:         Option<String>,
  pub parent_college:  Option<String>,
  pub degree_bachelor: bool,
  pub degree_master:   bool,
  pub degree_phd:      bool,
  pub source:          Option<String>,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawDepartment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      university_id:   row.get(1)?,
      name_ko:         row.get(2)?,
      name_en:         row.get(3)?,
      parent_college:  row.get(4)?,
      degree_bachelor: row.get(5)?,
      degree_master:   row.get(6)?,
      degree_phd:      row.get(7)?,
      source:          row.get(8)?,
      created_at:      row.get(9)?,
      updated_at:      row.get(10)?,
    })
  }

  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      id:             DepartmentId(self.id),
      university_id:  UniversityId(self.university_id),
      name_ko:        self.name_ko,
      name_en:        self.name_en,
      parent_college: self.parent_college,
      degrees:        DegreeFlags {
        bachelor:  self.degree_bachelor,
        master:    self.degree_master,
        doctorate: self.degree_phd,
      },
      source:         self.source,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `lab` row.
pub struct RawLab {
  pub id:             i64,
  pub university_id:  i64,
  pub department_id:  i64,
  pub name_ko:        String,
  pub name_en:        Option<String>,
  pub professor_name: Option<String>,
  pub homepage_url:   Option<String>,
  pub aliases:        String,
  pub source:         Option<String>,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawLab {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      university_id:  row.get(1)?,
      department_id:  row.get(2)?,
      name_ko:        row.get(3)?,
      name_en:        row.get(4)?,
      professor_name: row.get(5)?,
      homepage_url:   row.get(6)?,
      aliases:        row.get(7)?,
      source:         row.get(8)?,
      created_at:     row.get(9)?,
      updated_at:     row.get(10)?,
    })
  }

  pub fn into_lab(self) -> Result<Lab> {
    Ok(Lab {
      id:             LabId(self.id),
      university_id:  UniversityId(self.university_id),
      department_id:  DepartmentId(self.department_id),
      name_ko:        self.name_ko,
      name_en:        self.name_en,
      professor_name: self.professor_name,
      homepage_url:   self.homepage_url,
      aliases:        decode_aliases(&self.aliases)?,
      source:         self.source,
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

/// One row of the university ⋈ department join.
pub fn read_index_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<DepartmentIndexEntry> {
  Ok(DepartmentIndexEntry {
    university_id:      UniversityId(row.get(0)?),
    university_name_ko: row.get(1)?,
    department_id:      DepartmentId(row.get(2)?),
    department_name_ko: row.get(3)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dt_roundtrip_is_lossless() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn bad_dt_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }

  #[test]
  fn aliases_decode_from_json() {
    assert!(decode_aliases("[]").unwrap().is_empty());
    assert_eq!(decode_aliases(r#"["SysLab","시스템랩"]"#).unwrap(), vec![
      "SysLab".to_string(),
      "시스템랩".to_string()
    ]);
    assert!(matches!(decode_aliases("{"), Err(Error::Json(_))));
  }
}
