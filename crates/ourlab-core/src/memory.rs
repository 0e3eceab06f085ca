//! [`MemoryStore`], an in-process [`CatalogStore`] for tests.
//!
//! Mirrors the relational backend's constraints: unique natural keys,
//! foreign keys to existing owners, and the department → lab cascade.

use std::{
  collections::BTreeMap,
  sync::{Arc, Mutex, MutexGuard},
};

use chrono::Utc;

use crate::{
  Error, Result,
  model::{
    DegreeRefinement, Department, DepartmentId, DepartmentIndexEntry, Lab,
    LabId, NewDepartment, NewLab, NewUniversity, University, UniversityFields,
    UniversityId, Upserted,
  },
  store::CatalogStore,
};

#[derive(Default)]
struct Tables {
  last_id:      i64,
  universities: BTreeMap<UniversityId, University>,
  departments:  BTreeMap<DepartmentId, Department>,
  labs:         BTreeMap<LabId, Lab>,
}

impl Tables {
  fn next_id(&mut self) -> i64 {
    self.last_id += 1;
    self.last_id
  }
}

/// A catalogue held entirely in memory.
///
/// Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn tables(&self) -> MutexGuard<'_, Tables> {
    self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl CatalogStore for MemoryStore {
  type Error = Error;

  // ── Universities ──────────────────────────────────────────────────────

  async fn find_university_by_code(&self, code: String) -> Result<Option<University>> {
    Ok(
      self
        .tables()
        .universities
        .values()
        .find(|u| u.official_code.as_deref() == Some(code.as_str()))
        .cloned(),
    )
  }

  async fn find_university_by_name(&self, name_ko: String) -> Result<Option<University>> {
    Ok(
      self
        .tables()
        .universities
        .values()
        .find(|u| u.name_ko == name_ko)
        .cloned(),
    )
  }

  async fn upsert_university_by_code(
    &self,
    code:  String,
    input: NewUniversity,
  ) -> Result<Upserted<University>> {
    let mut t = self.tables();
    let now = Utc::now();

    if let Some(existing) = t
      .universities
      .values_mut()
      .find(|u| u.official_code.as_deref() == Some(code.as_str()))
    {
      existing.name_ko = input.name_ko;
      existing.fields = input.fields;
      existing.updated_at = now;
      return Ok(Upserted::updated(existing.clone()));
    }

    let id = UniversityId(t.next_id());
    let university = University {
      id,
      official_code: Some(code),
      name_ko: input.name_ko,
      fields: input.fields,
      source: input.source,
      created_at: now,
      updated_at: now,
    };
    t.universities.insert(id, university.clone());
    Ok(Upserted::created(university))
  }

  async fn insert_university(&self, input: NewUniversity) -> Result<University> {
    let mut t = self.tables();
    let now = Utc::now();
    let id = UniversityId(t.next_id());
    let university = University {
      id,
      official_code: None,
      name_ko: input.name_ko,
      fields: input.fields,
      source: input.source,
      created_at: now,
      updated_at: now,
    };
    t.universities.insert(id, university.clone());
    Ok(university)
  }

  async fn update_university(
    &self,
    id:     UniversityId,
    fields: UniversityFields,
  ) -> Result<University> {
    let mut t = self.tables();
    let university = t
      .universities
      .get_mut(&id)
      .ok_or(Error::UniversityNotFound(id))?;
    university.fields = fields;
    university.updated_at = Utc::now();
    Ok(university.clone())
  }

  async fn list_universities(&self) -> Result<Vec<University>> {
    Ok(self.tables().universities.values().cloned().collect())
  }

  // ── Departments ───────────────────────────────────────────────────────

  async fn find_department(
    &self,
    university_id: UniversityId,
    name_ko:       String,
  ) -> Result<Option<Department>> {
    Ok(
      self
        .tables()
        .departments
        .values()
        .find(|d| d.university_id == university_id && d.name_ko == name_ko)
        .cloned(),
    )
  }

  async fn upsert_department(&self, input: NewDepartment) -> Result<Upserted<Department>> {
    let mut t = self.tables();
    if !t.universities.contains_key(&input.university_id) {
      return Err(Error::UniversityNotFound(input.university_id));
    }
    let now = Utc::now();

    if let Some(existing) = t.departments.values_mut().find(|d| {
      d.university_id == input.university_id && d.name_ko == input.name_ko
    }) {
      existing.name_en = input.name_en;
      existing.parent_college = input.parent_college;
      existing.degrees = input.degrees;
      existing.updated_at = now;
      return Ok(Upserted::updated(existing.clone()));
    }

    let id = DepartmentId(t.next_id());
    let department = Department {
      id,
      university_id: input.university_id,
      name_ko: input.name_ko,
      name_en: input.name_en,
      parent_college: input.parent_college,
      degrees: input.degrees,
      source: input.source,
      created_at: now,
      updated_at: now,
    };
    t.departments.insert(id, department.clone());
    Ok(Upserted::created(department))
  }

  async fn refine_department(&self, input: DegreeRefinement) -> Result<Option<Department>> {
    let mut t = self.tables();
    let Some(existing) = t.departments.values_mut().find(|d| {
      d.university_id == input.university_id && d.name_ko == input.name_ko
    }) else {
      return Ok(None);
    };

    existing.degrees.master = input.master;
    existing.degrees.doctorate = input.doctorate;
    existing.updated_at = Utc::now();
    Ok(Some(existing.clone()))
  }

  async fn clear_departments(&self) -> Result<u64> {
    let mut t = self.tables();
    let removed = t.departments.len() as u64;
    t.departments.clear();
    t.labs.clear();
    Ok(removed)
  }

  async fn department_index(&self) -> Result<Vec<DepartmentIndexEntry>> {
    let t = self.tables();
    Ok(
      t.departments
        .values()
        .filter_map(|d| {
          let university = t.universities.get(&d.university_id)?;
          Some(DepartmentIndexEntry {
            university_id:      university.id,
            university_name_ko: university.name_ko.clone(),
            department_id:      d.id,
            department_name_ko: d.name_ko.clone(),
          })
        })
        .collect(),
    )
  }

  async fn list_departments(
    &self,
    university_id: Option<UniversityId>,
  ) -> Result<Vec<Department>> {
    Ok(
      self
        .tables()
        .departments
        .values()
        .filter(|d| university_id.is_none_or(|id| d.university_id == id))
        .cloned()
        .collect(),
    )
  }

  // ── Labs ──────────────────────────────────────────────────────────────

  async fn find_lab(&self, department_id: DepartmentId, name_ko: String) -> Result<Option<Lab>> {
    Ok(
      self
        .tables()
        .labs
        .values()
        .find(|l| l.department_id == department_id && l.name_ko == name_ko)
        .cloned(),
    )
  }

  async fn upsert_lab(&self, input: NewLab) -> Result<Upserted<Lab>> {
    let mut t = self.tables();
    let owner = t
      .departments
      .get(&input.department_id)
      .ok_or(Error::DepartmentNotFound(input.department_id))?;
    if owner.university_id != input.university_id {
      return Err(Error::OwnerMismatch {
        department: input.department_id,
        university: input.university_id,
      });
    }
    let now = Utc::now();

    if let Some(existing) = t.labs.values_mut().find(|l| {
      l.department_id == input.department_id && l.name_ko == input.name_ko
    }) {
      existing.name_en = input.name_en;
      existing.professor_name = input.professor_name;
      existing.homepage_url = input.homepage_url;
      existing.updated_at = now;
      return Ok(Upserted::updated(existing.clone()));
    }

    let id = LabId(t.next_id());
    let lab = Lab {
      id,
      university_id: input.university_id,
      department_id: input.department_id,
      name_ko: input.name_ko,
      name_en: input.name_en,
      professor_name: input.professor_name,
      homepage_url: input.homepage_url,
      aliases: Vec::new(),
      source: input.source,
      created_at: now,
      updated_at: now,
    };
    t.labs.insert(id, lab.clone());
    Ok(Upserted::created(lab))
  }

  async fn list_labs(&self, department_id: Option<DepartmentId>) -> Result<Vec<Lab>> {
    Ok(
      self
        .tables()
        .labs
        .values()
        .filter(|l| department_id.is_none_or(|id| l.department_id == id))
        .cloned()
        .collect(),
    )
  }
}
