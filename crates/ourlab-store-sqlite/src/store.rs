//! [`SqliteStore`], the SQLite implementation of [`CatalogStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use ourlab_core::{
  model::{
    DegreeRefinement, Department, DepartmentId, DepartmentIndexEntry, Lab,
    NewDepartment, NewLab, NewUniversity, University, UniversityFields,
    UniversityId, Upserted,
  },
  store::CatalogStore,
};

use crate::{
  encode::{
    DEPARTMENT_COLUMNS, LAB_COLUMNS, RawDepartment, RawLab, RawUniversity,
    UNIVERSITY_COLUMNS, encode_dt, read_index_entry,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalogue backed by a single SQLite file.
///
/// Every statement runs in autocommit mode, so each write is durable as soon
/// as it returns. Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch at most one university matching `column = value`.
  async fn university_where(
    &self,
    column: &'static str,
    value:  String,
  ) -> Result<Option<University>> {
    let raw: Option<RawUniversity> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {UNIVERSITY_COLUMNS} FROM university WHERE {column} = ?1
           ORDER BY id LIMIT 1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![value], RawUniversity::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUniversity::into_university).transpose()
  }

  /// The owning university of a department, if the department exists.
  async fn department_owner(&self, id: DepartmentId) -> Result<Option<UniversityId>> {
    let owner: Option<i64> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT university_id FROM department WHERE id = ?1",
              rusqlite::params![id.0],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(owner.map(UniversityId))
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = Error;

  // ── Universities ──────────────────────────────────────────────────────────

  async fn find_university_by_code(&self, code: String) -> Result<Option<University>> {
    self.university_where("official_code", code).await
  }

  async fn find_university_by_name(&self, name_ko: String) -> Result<Option<University>> {
    self.university_where("name_ko", name_ko).await
  }

  async fn upsert_university_by_code(
    &self,
    code:  String,
    input: NewUniversity,
  ) -> Result<Upserted<University>> {
    let now = encode_dt(Utc::now());
    let NewUniversity { name_ko, fields, source } = input;

    let (raw, created): (RawUniversity, bool) = self
      .conn
      .call(move |conn| {
        let existed = conn
          .query_row(
            "SELECT 1 FROM university WHERE official_code = ?1",
            rusqlite::params![code],
            |_| Ok(()),
          )
          .optional()?
          .is_some();

        let raw = conn.query_row(
          &format!(
            "INSERT INTO university (
               official_code, name_ko, name_en, type, region, homepage_url,
               email_domain, address, source, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
             ON CONFLICT (official_code) DO UPDATE SET
               name_ko      = excluded.name_ko,
               name_en      = excluded.name_en,
               type         = excluded.type,
               region       = excluded.region,
               homepage_url = excluded.homepage_url,
               email_domain = excluded.email_domain,
               address      = excluded.address,
               updated_at   = excluded.updated_at
             RETURNING {UNIVERSITY_COLUMNS}"
          ),
          rusqlite::params![
            code,
            name_ko,
            fields.name_en,
            fields.institution_type,
            fields.region,
            fields.homepage_url,
            fields.email_domain,
            fields.address,
            source,
            now,
          ],
          RawUniversity::from_row,
        )?;

        Ok((raw, !existed))
      })
      .await?;

    Ok(Upserted { record: raw.into_university()?, created })
  }

  async fn insert_university(&self, input: NewUniversity) -> Result<University> {
    let now = encode_dt(Utc::now());
    let NewUniversity { name_ko, fields, source } = input;

    let raw: RawUniversity = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO university (
               official_code, name_ko, name_en, type, region, homepage_url,
               email_domain, address, source, created_at, updated_at
             ) VALUES (NULL, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             RETURNING {UNIVERSITY_COLUMNS}"
          ),
          rusqlite::params![
            name_ko,
            fields.name_en,
            fields.institution_type,
            fields.region,
            fields.homepage_url,
            fields.email_domain,
            fields.address,
            source,
            now,
          ],
          RawUniversity::from_row,
        )?)
      })
      .await?;

    raw.into_university()
  }

  async fn update_university(
    &self,
    id:     UniversityId,
    fields: UniversityFields,
  ) -> Result<University> {
    let now = encode_dt(Utc::now());

    let raw: Option<RawUniversity> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE university SET
                   name_en      = ?2,
                   type         = ?3,
                   region       = ?4,
                   homepage_url = ?5,
                   email_domain = ?6,
                   address      = ?7,
                   updated_at   = ?8
                 WHERE id = ?1
                 RETURNING {UNIVERSITY_COLUMNS}"
              ),
              rusqlite::params![
                id.0,
                fields.name_en,
                fields.institution_type,
                fields.region,
                fields.homepage_url,
                fields.email_domain,
                fields.address,
                now,
              ],
              RawUniversity::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .ok_or(ourlab_core::Error::UniversityNotFound(id))?
      .into_university()
  }

  async fn list_universities(&self) -> Result<Vec<University>> {
    let raws: Vec<RawUniversity> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {UNIVERSITY_COLUMNS} FROM university ORDER BY id"))?;
        let rows = stmt
          .query_map([], RawUniversity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUniversity::into_university).collect()
  }

  // ── Departments ───────────────────────────────────────────────────────────

  async fn find_department(
    &self,
    university_id: UniversityId,
    name_ko:       String,
  ) -> Result<Option<Department>> {
    let raw: Option<RawDepartment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DEPARTMENT_COLUMNS} FROM department
                 WHERE university_id = ?1 AND name_ko = ?2"
              ),
              rusqlite::params![university_id.0, name_ko],
              RawDepartment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  async fn upsert_department(&self, input: NewDepartment) -> Result<Upserted<Department>> {
    let now = encode_dt(Utc::now());

    let (raw, created): (RawDepartment, bool) = self
      .conn
      .call(move |conn| {
        let existed = conn
          .query_row(
            "SELECT 1 FROM department WHERE university_id = ?1 AND name_ko = ?2",
            rusqlite::params![input.university_id.0, input.name_ko],
            |_| Ok(()),
          )
          .optional()?
          .is_some();

        let raw = conn.query_row(
          &format!(
            "INSERT INTO department (
               university_id, name_ko, name_en, parent_college,
               degree_bachelor, degree_master, degree_phd,
               source, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT (university_id, name_ko) DO UPDATE SET
               name_en         = excluded.name_en,
               parent_college  = excluded.parent_college,
               degree_bachelor = excluded.degree_bachelor,
               degree_master   = excluded.degree_master,
               degree_phd      = excluded.degree_phd,
               updated_at      = excluded.updated_at
             RETURNING {DEPARTMENT_COLUMNS}"
          ),
          rusqlite::params![
            input.university_id.0,
            input.name_ko,
            input.name_en,
            input.parent_college,
            input.degrees.bachelor,
            input.degrees.master,
            input.degrees.doctorate,
            input.source,
            now,
          ],
          RawDepartment::from_row,
        )?;

        Ok((raw, !existed))
      })
      .await?;

    Ok(Upserted { record: raw.into_department()?, created })
  }

  async fn refine_department(&self, input: DegreeRefinement) -> Result<Option<Department>> {
    let now = encode_dt(Utc::now());

    let raw: Option<RawDepartment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE department SET
                   degree_master = ?3,
                   degree_phd    = ?4,
                   updated_at    = ?5
                 WHERE university_id = ?1 AND name_ko = ?2
                 RETURNING {DEPARTMENT_COLUMNS}"
              ),
              rusqlite::params![
                input.university_id.0,
                input.name_ko,
                input.master,
                input.doctorate,
                now,
              ],
              RawDepartment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  async fn clear_departments(&self) -> Result<u64> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM department", [])?))
      .await?;
    Ok(removed as u64)
  }

  async fn department_index(&self) -> Result<Vec<DepartmentIndexEntry>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(
            "SELECT u.id, u.name_ko, d.id, d.name_ko
             FROM university u
             JOIN department d ON d.university_id = u.id
             ORDER BY u.id, d.id",
          )?;
          let rows = stmt
            .query_map([], read_index_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn list_departments(
    &self,
    university_id: Option<UniversityId>,
  ) -> Result<Vec<Department>> {
    let filter = university_id.map(|id| id.0);

    let raws: Vec<RawDepartment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DEPARTMENT_COLUMNS} FROM department
           WHERE ?1 IS NULL OR university_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![filter], RawDepartment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDepartment::into_department).collect()
  }

  // ── Labs ──────────────────────────────────────────────────────────────────

  async fn find_lab(&self, department_id: DepartmentId, name_ko: String) -> Result<Option<Lab>> {
    let raw: Option<RawLab> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {LAB_COLUMNS} FROM lab
                 WHERE department_id = ?1 AND name_ko = ?2"
              ),
              rusqlite::params![department_id.0, name_ko],
              RawLab::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLab::into_lab).transpose()
  }

  async fn upsert_lab(&self, input: NewLab) -> Result<Upserted<Lab>> {
    match self.department_owner(input.department_id).await? {
      None => return Err(ourlab_core::Error::DepartmentNotFound(input.department_id).into()),
      Some(owner) if owner != input.university_id => {
        return Err(
          ourlab_core::Error::OwnerMismatch {
            department: input.department_id,
            university: input.university_id,
          }
          .into(),
        );
      }
      Some(_) => {}
    }

    let now = encode_dt(Utc::now());

    let (raw, created): (RawLab, bool) = self
      .conn
      .call(move |conn| {
        let existed = conn
          .query_row(
            "SELECT 1 FROM lab WHERE department_id = ?1 AND name_ko = ?2",
            rusqlite::params![input.department_id.0, input.name_ko],
            |_| Ok(()),
          )
          .optional()?
          .is_some();

        let raw = conn.query_row(
          &format!(
            "INSERT INTO lab (
               university_id, department_id, name_ko, name_en,
               professor_name, homepage_url, source, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT (department_id, name_ko) DO UPDATE SET
               name_en        = excluded.name_en,
               professor_name = excluded.professor_name,
               homepage_url   = excluded.homepage_url,
               updated_at     = excluded.updated_at
             RETURNING {LAB_COLUMNS}"
          ),
          rusqlite::params![
            input.university_id.0,
            input.department_id.0,
            input.name_ko,
            input.name_en,
            input.professor_name,
            input.homepage_url,
            input.source,
            now,
          ],
          RawLab::from_row,
        )?;

        Ok((raw, !existed))
      })
      .await?;

    Ok(Upserted { record: raw.into_lab()?, created })
  }

  async fn list_labs(&self, department_id: Option<DepartmentId>) -> Result<Vec<Lab>> {
    let filter = department_id.map(|id| id.0);

    let raws: Vec<RawLab> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {LAB_COLUMNS} FROM lab
           WHERE ?1 IS NULL OR department_id = ?1
           ORDER BY id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![filter], RawLab::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLab::into_lab).collect()
  }
}
