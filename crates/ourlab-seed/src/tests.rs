//! Loader tests against `MemoryStore` and in-memory CSV.

use std::{
  fs,
  sync::{Arc, Mutex},
};

use ourlab_core::{
  memory::MemoryStore,
  model::{
    DegreeFlags, DegreeRefinement, Department, DepartmentId, DepartmentIndexEntry,
    EntityKind, Lab, NewDepartment, NewLab, NewUniversity, University, UniversityFields,
    UniversityId, Upserted,
  },
  store::CatalogStore,
};

use crate::{
  ColumnMapping, Error, KindCounts, LoadOptions, Loader, Reporter, Silent, SourceTables,
  Sources, Summary, Table, Warning, WarningReason, WriteFailurePolicy,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

const UNIVERSITIES: &str = "\
official_code,name_ko,name_en,type,region,homepage_url,email_domain,address
0001,가상대학교,Virtual University,대학교,서울,https://vu.ac.kr,vu.ac.kr,서울특별시
,카이스트(KAIST/한국과학기술원),KAIST,대학교,대전,https://kaist.ac.kr,kaist.ac.kr,
,,Nameless University,대학교,부산,,,
";

const DEPARTMENTS: &str = "\
university_official_code,university_name_ko,department_name_ko,department_name_en,parent_college,degree_bachelor,degree_master,degree_phd
0001,가상대학교,컴퓨터공학과,Computer Science,공과대학,True,False,False
,카이스트(KAIST/한국과학기술원),전산학부,School of Computing,,True,False,False
,없는대학교,물리학과,Physics,,True,False,False
0001,가상대학교,,,,True,False,False
";

const LABS: &str = "\
university_name_ko,department_name_ko,lab_name_ko,professor_name,homepage_url
가상대학교,컴퓨터공학과,시스템연구실,김교수,https://sys.vu.ac.kr
카이스트(KAIST/한국과학기술원),전산학부,인공지능연구실,이교수,
가상대학교,물리학과,광학연구실,박교수,
";

const GRADUATE: &str = "\
대학구분,학교명,학부_과(전공)명,학위과정,단과대학명
대학원,한국과학기술원 일반대학원,전산학부,석박사통합,공과대학
대학원,가상대학교 일반대학원,컴퓨터공학과,석사,정보대학
대학원,없는대학교 일반대학원,물리학과,박사,
대학원,가상대학교 일반대학원,없는학과,박사,
대학,가상대학교,컴퓨터공학과,학사,공과대학
";

fn table(kind: EntityKind, csv: &str) -> Table {
  Table::from_reader(kind, csv.as_bytes()).unwrap()
}

fn all_tables() -> SourceTables {
  SourceTables::new()
    .with(table(EntityKind::Universities, UNIVERSITIES))
    .with(table(EntityKind::Departments, DEPARTMENTS))
    .with(table(EntityKind::Labs, LABS))
    .with(table(EntityKind::Graduate, GRADUATE))
}

fn options(only: Option<EntityKind>) -> LoadOptions {
  LoadOptions { only, ..LoadOptions::default() }
}

async fn load<S: CatalogStore>(
  store: &S,
  tables: &SourceTables,
  only: Option<EntityKind>,
) -> crate::Result<Summary> {
  Loader::new(store, options(only)).with_reporter(Silent).load(tables).await
}

async fn department(store: &MemoryStore, name: &str) -> Department {
  store
    .list_departments(None)
    .await
    .unwrap()
    .into_iter()
    .find(|d| d.name_ko == name)
    .unwrap()
}

fn reasons(summary: &Summary, kind: EntityKind) -> Vec<WarningReason> {
  summary.warnings_for(kind).map(|w| w.reason.clone()).collect()
}

// ─── Full runs ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_run_loads_every_stage() {
  let store = MemoryStore::new();
  let summary = load(&store, &all_tables(), None).await.unwrap();

  assert_eq!(summary.counts(EntityKind::Universities), KindCounts {
    rows:     3,
    inserted: 2,
    updated:  0,
    skipped:  1,
  });
  assert_eq!(summary.counts(EntityKind::Departments), KindCounts {
    rows:     4,
    inserted: 2,
    updated:  0,
    skipped:  2,
  });
  assert_eq!(summary.counts(EntityKind::Labs), KindCounts {
    rows:     3,
    inserted: 2,
    updated:  0,
    skipped:  1,
  });
  // The undergraduate row is not part of the refinement.
  assert_eq!(summary.counts(EntityKind::Graduate), KindCounts {
    rows:     4,
    inserted: 0,
    updated:  2,
    skipped:  2,
  });
  assert_eq!(summary.departments_cleared, 0);
  assert!(summary.finished_at.is_some());

  assert_eq!(reasons(&summary, EntityKind::Universities), vec![WarningReason::BlankKey {
    column: "name_ko".into(),
  }]);
  assert_eq!(reasons(&summary, EntityKind::Departments), vec![
    WarningReason::UniversityNotFound,
    WarningReason::BlankKey { column: "department_name_ko".into() },
  ]);
  assert_eq!(reasons(&summary, EntityKind::Labs), vec![WarningReason::DepartmentNotFound]);
  assert_eq!(reasons(&summary, EntityKind::Graduate), vec![
    WarningReason::UniversityNotFound,
    WarningReason::DepartmentNotFound,
  ]);

  assert_eq!(store.list_universities().await.unwrap().len(), 2);
  assert_eq!(store.list_departments(None).await.unwrap().len(), 2);
  assert_eq!(store.list_labs(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn graduate_pass_refines_only_graduate_flags() {
  let store = MemoryStore::new();
  load(&store, &all_tables(), None).await.unwrap();

  let cs = department(&store, "컴퓨터공학과").await;
  assert_eq!(cs.degrees, DegreeFlags { bachelor: true, master: true, doctorate: false });
  assert_eq!(cs.name_en.as_deref(), Some("Computer Science"));
  assert_eq!(cs.parent_college.as_deref(), Some("공과대학"));

  // The school name only resolves through the alias table. The extract's
  // college label is ignored even where the stored one is null.
  let computing = department(&store, "전산학부").await;
  assert_eq!(computing.degrees, DegreeFlags { bachelor: true, master: true, doctorate: true });
  assert_eq!(computing.parent_college, None);
}

#[tokio::test]
async fn second_run_is_idempotent() {
  let store = MemoryStore::new();
  let tables = all_tables();

  load(&store, &tables, None).await.unwrap();
  let universities = store.list_universities().await.unwrap();
  let departments = store.list_departments(None).await.unwrap();
  let labs = store.list_labs(None).await.unwrap();

  let summary = load(&store, &tables, None).await.unwrap();
  assert_eq!(summary.departments_cleared, 2);
  assert_eq!(summary.counts(EntityKind::Universities).inserted, 0);
  assert_eq!(summary.counts(EntityKind::Universities).updated, 2);

  let universities_again = store.list_universities().await.unwrap();
  assert_eq!(universities_again.len(), universities.len());
  for (before, after) in universities.iter().zip(&universities_again) {
    assert_eq!(after.id, before.id);
    assert_eq!(after.official_code, before.official_code);
    assert_eq!(after.name_ko, before.name_ko);
    assert_eq!(after.fields, before.fields);
    assert_eq!(after.created_at, before.created_at);
  }

  let shape = |d: &Department| {
    (d.university_id, d.name_ko.clone(), d.name_en.clone(), d.parent_college.clone(), d.degrees)
  };
  let departments_again = store.list_departments(None).await.unwrap();
  assert_eq!(
    departments_again.iter().map(shape).collect::<Vec<_>>(),
    departments.iter().map(shape).collect::<Vec<_>>()
  );

  let lab_shape = |l: &Lab| (l.name_ko.clone(), l.professor_name.clone(), l.homepage_url.clone());
  let labs_again = store.list_labs(None).await.unwrap();
  assert_eq!(
    labs_again.iter().map(lab_shape).collect::<Vec<_>>(),
    labs.iter().map(lab_shape).collect::<Vec<_>>()
  );
}

#[tokio::test]
async fn full_run_without_graduate_source_skips_refinement() {
  let store = MemoryStore::new();
  let tables = SourceTables::new()
    .with(table(EntityKind::Universities, UNIVERSITIES))
    .with(table(EntityKind::Departments, DEPARTMENTS))
    .with(table(EntityKind::Labs, LABS));

  let summary = load(&store, &tables, None).await.unwrap();
  assert!(!summary.counts.contains_key(&EntityKind::Graduate));
  assert!(!department(&store, "컴퓨터공학과").await.degrees.master);
}

// ─── Key semantics ───────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_code_university_updates_in_place() {
  let store = MemoryStore::new();
  let header = "official_code,name_ko,name_en,type,region,homepage_url,email_domain,address\n";

  let first = SourceTables::new().with(table(
    EntityKind::Universities,
    &format!("{header},가상대학교,,대학교,서울,,,\n"),
  ));
  let second = SourceTables::new().with(table(
    EntityKind::Universities,
    &format!("{header},가상대학교,,대학교,부산,,,\n"),
  ));

  let a = load(&store, &first, Some(EntityKind::Universities)).await.unwrap();
  let b = load(&store, &second, Some(EntityKind::Universities)).await.unwrap();

  assert_eq!(a.counts(EntityKind::Universities).inserted, 1);
  assert_eq!(b.counts(EntityKind::Universities).updated, 1);

  let all = store.list_universities().await.unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0].official_code, None);
  assert_eq!(all[0].fields.region.as_deref(), Some("부산"));
}

#[tokio::test]
async fn department_code_wins_over_name_collision() {
  let store = MemoryStore::new();
  let tables = SourceTables::new()
    .with(table(
      EntityKind::Universities,
      "official_code,name_ko,name_en,type,region,homepage_url,email_domain,address\n\
       ,다른대학교,,,,,,\n\
       0001,가상대학교,,,,,,\n",
    ))
    .with(table(
      EntityKind::Departments,
      "university_official_code,university_name_ko,department_name_ko,department_name_en,\
       parent_college,degree_bachelor,degree_master,degree_phd\n\
       0001,다른대학교,화학과,,,True,False,False\n",
    ))
    .with(table(EntityKind::Labs, "university_name_ko,department_name_ko,lab_name_ko,professor_name,homepage_url\n"));

  load(&store, &tables, None).await.unwrap();

  let chemistry = department(&store, "화학과").await;
  let owner = store.find_university_by_code("0001".into()).await.unwrap().unwrap();
  assert_eq!(owner.name_ko, "가상대학교");
  assert_eq!(chemistry.university_id, owner.id);
}

#[tokio::test]
async fn labs_before_departments_are_all_orphans() {
  let store = MemoryStore::new();
  let tables = all_tables();
  load(&store, &tables, Some(EntityKind::Universities)).await.unwrap();

  let summary = load(&store, &tables, Some(EntityKind::Labs)).await.unwrap();

  assert!(store.list_labs(None).await.unwrap().is_empty());
  assert_eq!(summary.counts(EntityKind::Labs).inserted, 0);
  assert_eq!(summary.warnings.len(), 3);
  assert!(
    summary
      .warnings
      .iter()
      .all(|w| w.kind == EntityKind::Labs && w.reason == WarningReason::DepartmentNotFound)
  );
}

#[tokio::test]
async fn reloading_departments_clears_labs() {
  let store = MemoryStore::new();
  let tables = all_tables();
  load(&store, &tables, None).await.unwrap();
  assert_eq!(store.list_labs(None).await.unwrap().len(), 2);

  let summary = load(&store, &tables, Some(EntityKind::Departments)).await.unwrap();
  assert_eq!(summary.departments_cleared, 2);
  assert_eq!(store.list_departments(None).await.unwrap().len(), 2);
  assert!(store.list_labs(None).await.unwrap().is_empty());
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_column_aborts_before_any_write() {
  let store = MemoryStore::new();
  let tables = SourceTables::new()
    .with(table(EntityKind::Universities, UNIVERSITIES))
    .with(table(
      EntityKind::Departments,
      "university_official_code,university_name_ko,department_name_ko\n0001,가상대학교,화학과\n",
    ))
    .with(table(EntityKind::Labs, LABS));

  let err = load(&store, &tables, None).await.unwrap_err();
  match err {
    Error::MissingColumns { kind, missing, observed } => {
      assert_eq!(kind, EntityKind::Departments);
      assert!(missing.contains(&"degree_phd".to_string()));
      assert_eq!(observed.len(), 3);
    }
    other => panic!("unexpected error: {other}"),
  }
  assert!(store.list_universities().await.unwrap().is_empty());
}

#[tokio::test]
async fn only_checks_the_selected_stage() {
  let store = MemoryStore::new();
  let tables = SourceTables::new()
    .with(table(EntityKind::Universities, UNIVERSITIES))
    .with(table(EntityKind::Labs, "lab_name_ko\n시스템연구실\n"));

  let summary = load(&store, &tables, Some(EntityKind::Universities)).await.unwrap();
  assert_eq!(summary.counts(EntityKind::Universities).inserted, 2);

  let err = load(&store, &tables, Some(EntityKind::Departments)).await.unwrap_err();
  assert!(matches!(err, Error::MissingSource(EntityKind::Departments)));

  let err = load(&store, &tables, Some(EntityKind::Graduate)).await.unwrap_err();
  assert!(matches!(err, Error::MissingSource(EntityKind::Graduate)));
}

#[tokio::test]
async fn run_reads_and_remaps_files() {
  let dir = tempfile::tempdir().unwrap();
  let path = |name: &str| dir.path().join(name);

  fs::write(path("universities.csv"), UNIVERSITIES).unwrap();
  fs::write(path("departments.csv"), DEPARTMENTS).unwrap();
  fs::write(
    path("labs.csv"),
    "대학명,학과명,연구실명,교수명,홈페이지\n가상대학교,컴퓨터공학과,시스템연구실,김교수,\n",
  )
  .unwrap();
  fs::write(
    path("mapping.json"),
    r#"{
      "labs": {
        "university_name_ko": "대학명",
        "department_name_ko": "학과명",
        "lab_name_ko": "연구실명",
        "professor_name": "교수명",
        "homepage_url": "홈페이지"
      }
    }"#,
  )
  .unwrap();

  let sources = Sources {
    universities: path("universities.csv"),
    departments:  path("departments.csv"),
    labs:         path("labs.csv"),
    graduate:     None,
    mapping:      Some(path("mapping.json")),
  };

  let store = MemoryStore::new();
  let summary = Loader::new(&store, options(None))
    .with_reporter(Silent)
    .run(&sources)
    .await
    .unwrap();

  assert_eq!(summary.counts(EntityKind::Labs).inserted, 1);
  let labs = store.list_labs(None).await.unwrap();
  assert_eq!(labs[0].professor_name.as_deref(), Some("김교수"));
  assert_eq!(labs[0].homepage_url, None);
}

#[test]
fn unmapped_source_fails_validation() {
  let mapping = ColumnMapping::from_json(r#"{ "universities": { "name_ko": "학교명" } }"#).unwrap();
  let mut universities = table(EntityKind::Universities, "학교명,지역\n가상대학교,서울\n");
  mapping.apply(&mut universities);

  let err = universities
    .require_columns(crate::rows::UNIVERSITY_COLUMNS)
    .unwrap_err();
  let Error::MissingColumns { missing, observed, .. } = err else {
    panic!("expected missing columns");
  };
  assert!(!missing.contains(&"name_ko".to_string()));
  assert!(missing.contains(&"official_code".to_string()));
  assert_eq!(observed, vec!["name_ko".to_string(), "지역".to_string()]);
}

// ─── Write failures ──────────────────────────────────────────────────────────

/// A `MemoryStore` that rejects writes of one lab.
struct RejectingStore {
  inner:      MemoryStore,
  reject_lab: &'static str,
}

impl CatalogStore for RejectingStore {
  type Error = ourlab_core::Error;

  async fn find_university_by_code(&self, code: String) -> ourlab_core::Result<Option<University>> {
    self.inner.find_university_by_code(code).await
  }

  async fn find_university_by_name(
    &self,
    name_ko: String,
  ) -> ourlab_core::Result<Option<University>> {
    self.inner.find_university_by_name(name_ko).await
  }

  async fn upsert_university_by_code(
    &self,
    code: String,
    input: NewUniversity,
  ) -> ourlab_core::Result<Upserted<University>> {
    self.inner.upsert_university_by_code(code, input).await
  }

  async fn insert_university(&self, input: NewUniversity) -> ourlab_core::Result<University> {
    self.inner.insert_university(input).await
  }

  async fn update_university(
    &self,
    id: UniversityId,
    fields: UniversityFields,
  ) -> ourlab_core::Result<University> {
    self.inner.update_university(id, fields).await
  }

  async fn list_universities(&self) -> ourlab_core::Result<Vec<University>> {
    self.inner.list_universities().await
  }

  async fn find_department(
    &self,
    university_id: UniversityId,
    name_ko: String,
  ) -> ourlab_core::Result<Option<Department>> {
    self.inner.find_department(university_id, name_ko).await
  }

  async fn upsert_department(
    &self,
    input: NewDepartment,
  ) -> ourlab_core::Result<Upserted<Department>> {
    self.inner.upsert_department(input).await
  }

  async fn refine_department(
    &self,
    input: DegreeRefinement,
  ) -> ourlab_core::Result<Option<Department>> {
    self.inner.refine_department(input).await
  }

  async fn clear_departments(&self) -> ourlab_core::Result<u64> {
    self.inner.clear_departments().await
  }

  async fn department_index(&self) -> ourlab_core::Result<Vec<DepartmentIndexEntry>> {
    self.inner.department_index().await
  }

  async fn list_departments(
    &self,
    university_id: Option<UniversityId>,
  ) -> ourlab_core::Result<Vec<Department>> {
    self.inner.list_departments(university_id).await
  }

  async fn find_lab(
    &self,
    department_id: DepartmentId,
    name_ko: String,
  ) -> ourlab_core::Result<Option<Lab>> {
    self.inner.find_lab(department_id, name_ko).await
  }

  async fn upsert_lab(&self, input: NewLab) -> ourlab_core::Result<Upserted<Lab>> {
    if input.name_ko == self.reject_lab {
      return Err(ourlab_core::Error::DepartmentNotFound(input.department_id));
    }
    self.inner.upsert_lab(input).await
  }

  async fn list_labs(
    &self,
    department_id: Option<DepartmentId>,
  ) -> ourlab_core::Result<Vec<Lab>> {
    self.inner.list_labs(department_id).await
  }
}

fn rejecting_store() -> RejectingStore {
  RejectingStore { inner: MemoryStore::new(), reject_lab: "시스템연구실" }
}

#[tokio::test]
async fn write_failure_aborts_by_default() {
  let store = rejecting_store();
  let err = load(&store, &all_tables(), None).await.unwrap_err();

  assert!(matches!(err, Error::Store { kind: EntityKind::Labs, .. }));
  assert!(store.inner.list_labs(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn write_failure_can_be_skipped() {
  let store = rejecting_store();
  let summary = Loader::new(&store, LoadOptions {
    on_write_error: WriteFailurePolicy::Skip,
    ..LoadOptions::default()
  })
  .with_reporter(Silent)
  .load(&all_tables())
  .await
  .unwrap();

  let labs = store.inner.list_labs(None).await.unwrap();
  assert_eq!(labs.len(), 1);
  assert_eq!(labs[0].name_ko, "인공지능연구실");

  let failed: Vec<&Warning> = summary
    .warnings_for(EntityKind::Labs)
    .filter(|w| matches!(w.reason, WarningReason::WriteFailed { .. }))
    .collect();
  assert_eq!(failed.len(), 1);
  assert_eq!(failed[0].row["lab_name_ko"], "시스템연구실");
  assert_eq!(summary.counts(EntityKind::Labs).skipped, 2);
}

// ─── Reporting ───────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<String>>>);

impl Recorder {
  fn push(&self, event: String) { self.0.lock().unwrap().push(event); }

  fn events(&self) -> Vec<String> { self.0.lock().unwrap().clone() }
}

impl Reporter for Recorder {
  fn stage_started(&self, kind: EntityKind, rows: usize) {
    self.push(format!("start {kind} {rows}"));
  }

  fn warning(&self, warning: &Warning) { self.push(format!("warn {}", warning.kind)); }

  fn departments_cleared(&self, count: u64) { self.push(format!("cleared {count}")); }

  fn stage_finished(&self, kind: EntityKind, counts: &KindCounts) {
    self.push(format!("finish {kind} +{} ~{}", counts.inserted, counts.updated));
  }
}

#[tokio::test]
async fn reporter_sees_stages_in_order() {
  let store = MemoryStore::new();
  let recorder = Recorder::default();
  let tables = SourceTables::new()
    .with(table(EntityKind::Universities, UNIVERSITIES))
    .with(table(EntityKind::Departments, DEPARTMENTS))
    .with(table(EntityKind::Labs, LABS));

  Loader::new(&store, options(None))
    .with_reporter(recorder.clone())
    .load(&tables)
    .await
    .unwrap();

  assert_eq!(recorder.events(), vec![
    "start universities 3",
    "warn universities",
    "finish universities +2 ~0",
    "start departments 4",
    "cleared 0",
    "warn departments",
    "warn departments",
    "finish departments +2 ~0",
    "start labs 3",
    "warn labs",
    "finish labs +2 ~0",
  ]);
}
