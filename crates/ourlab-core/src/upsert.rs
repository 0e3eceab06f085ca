//! Upsert engine: insert-if-absent, update-if-present, per entity kind.
//!
//! | kind       | conflict key                | overwritten on conflict                     |
//! |------------|-----------------------------|---------------------------------------------|
//! | University | `official_code`             | `name_ko` + [`UniversityFields`]            |
//! | University | `name_ko` (code absent)     | [`UniversityFields`]                        |
//! | Department | `(university_id, name_ko)`  | `name_en`, `parent_college`, degree flags   |
//! | Graduate   | `(university_id, name_ko)`  | master/doctorate flags only                 |
//! | Lab        | `(department_id, name_ko)`  | `name_en`, `professor_name`, `homepage_url` |

use crate::{
  model::{
    DegreeRefinement, Department, Lab, NewDepartment, NewLab, NewUniversity,
    University, Upserted,
  },
  store::CatalogStore,
};

/// Trim `value`, mapping blank strings to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
  value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}

/// Upsert a university.
///
/// With a non-blank `official_code` this is a native upsert on the code.
/// Without one there is no unique constraint to lean on, so the row is
/// looked up by `name_ko` and then updated or inserted.
pub async fn upsert_university<S: CatalogStore>(
  store:         &S,
  official_code: Option<&str>,
  input:         NewUniversity,
) -> Result<Upserted<University>, S::Error> {
  match non_blank(official_code) {
    Some(code) => store.upsert_university_by_code(code, input).await,
    None => match store.find_university_by_name(input.name_ko.clone()).await? {
      Some(existing) => {
        let updated = store.update_university(existing.id, input.fields).await?;
        Ok(Upserted::updated(updated))
      }
      None => Ok(Upserted::created(store.insert_university(input).await?)),
    },
  }
}

/// Upsert a department from the primary extract.
pub async fn upsert_department<S: CatalogStore>(
  store: &S,
  input: NewDepartment,
) -> Result<Upserted<Department>, S::Error> {
  store.upsert_department(input).await
}

/// Apply a graduate-program refinement to an existing department.
///
/// Returns `None` when the department does not exist; the refinement never
/// creates rows.
pub async fn refine_department<S: CatalogStore>(
  store: &S,
  input: DegreeRefinement,
) -> Result<Option<Department>, S::Error> {
  store.refine_department(input).await
}

/// Upsert a lab.
pub async fn upsert_lab<S: CatalogStore>(
  store: &S,
  input: NewLab,
) -> Result<Upserted<Lab>, S::Error> {
  store.upsert_lab(input).await
}
