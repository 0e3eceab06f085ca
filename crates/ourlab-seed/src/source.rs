//! CSV sources: reading, column remapping and required-column validation.
//!
//! Every source is read fully into a [`Table`] before the loader touches the
//! store, so a malformed file or a missing column fails the run up front.

use std::{
  collections::{BTreeMap, HashMap},
  fs,
  io,
  path::{Path, PathBuf},
};

use csv::StringRecord;
use ourlab_core::model::EntityKind;

use crate::{Error, Result};

// ─── Table ───────────────────────────────────────────────────────────────────

/// An in-memory CSV source with its header row.
#[derive(Debug, Clone)]
pub struct Table {
  kind:    EntityKind,
  headers: Vec<String>,
  index:   HashMap<String, usize>,
  records: Vec<StringRecord>,
}

impl Table {
  /// Read a whole CSV document. The first record is the header row.
  pub fn from_reader(kind: EntityKind, reader: impl io::Read) -> Result<Self> {
    let csv_err = |source| Error::Csv { kind, source };

    let mut reader = csv::ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .from_reader(reader);

    let headers: Vec<String> = reader
      .headers()
      .map_err(csv_err)?
      .iter()
      .map(|h| h.trim().to_owned())
      .collect();

    let records = reader
      .records()
      .collect::<Result<Vec<_>, _>>()
      .map_err(csv_err)?;

    Ok(Self::new(kind, headers, records))
  }

  pub fn from_path(kind: EntityKind, path: &Path) -> Result<Self> {
    let file = fs::File::open(path).map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_reader(kind, io::BufReader::new(file))
  }

  fn new(kind: EntityKind, headers: Vec<String>, records: Vec<StringRecord>) -> Self {
    let index = index_headers(&headers);
    Self { kind, headers, index, records }
  }

  pub fn kind(&self) -> EntityKind { self.kind }

  pub fn headers(&self) -> &[String] { &self.headers }

  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }

  /// Rename source columns to canonical names.
  ///
  /// `mapping` is `canonical → source column`. Entries whose source column
  /// is not present in the header row are ignored.
  pub fn rename_columns(&mut self, mapping: &BTreeMap<String, String>) {
    for (canonical, source) in mapping {
      if let Some(header) = self.headers.iter_mut().find(|h| *h == source) {
        *header = canonical.clone();
      }
    }
    self.index = index_headers(&self.headers);
  }

  /// Fail with [`Error::MissingColumns`] unless every column in `required`
  /// is present.
  pub fn require_columns(&self, required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
      .iter()
      .filter(|c| !self.index.contains_key(**c))
      .map(|c| (*c).to_owned())
      .collect();

    if missing.is_empty() {
      Ok(())
    } else {
      Err(Error::MissingColumns {
        kind: self.kind,
        missing,
        observed: self.headers.clone(),
      })
    }
  }

  pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> {
    self.records.iter().map(|record| Row { table: self, record })
  }
}

fn index_headers(headers: &[String]) -> HashMap<String, usize> {
  let mut index = HashMap::with_capacity(headers.len());
  for (i, h) in headers.iter().enumerate() {
    // Duplicate header names resolve to the first occurrence.
    index.entry(h.clone()).or_insert(i);
  }
  index
}

/// One record of a [`Table`], addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
  table:  &'a Table,
  record: &'a StringRecord,
}

impl<'a> Row<'a> {
  /// The raw cell, or `None` when the column is absent or the record is
  /// short.
  pub fn get(&self, column: &str) -> Option<&'a str> {
    self
      .table
      .index
      .get(column)
      .and_then(|&i| self.record.get(i))
  }

  /// The whole row as `column → value`, for warning payloads.
  pub fn to_map(&self) -> BTreeMap<String, String> {
    self
      .table
      .headers
      .iter()
      .zip(self.record.iter())
      .map(|(h, v)| (h.clone(), v.to_owned()))
      .collect()
  }
}

// ─── Column mapping ──────────────────────────────────────────────────────────

/// Per-kind column renames: `{ "<kind>": { "<canonical>": "<source column>" } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping(BTreeMap<String, BTreeMap<String, String>>);

impl ColumnMapping {
  pub fn from_json(json: &str) -> Result<Self> { Ok(serde_json::from_str(json)?) }

  pub fn from_path(path: &Path) -> Result<Self> {
    let json = fs::read_to_string(path).map_err(|source| Error::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&json)
  }

  pub fn for_kind(&self, kind: EntityKind) -> Option<&BTreeMap<String, String>> {
    self.0.get(kind.as_ref())
  }

  /// Rename `table`'s columns according to the entry for its kind.
  pub fn apply(&self, table: &mut Table) {
    if let Some(mapping) = self.for_kind(table.kind()) {
      table.rename_columns(mapping);
    }
  }
}

// ─── Source sets ─────────────────────────────────────────────────────────────

/// Where each source lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
  pub universities: PathBuf,
  pub departments:  PathBuf,
  pub labs:         PathBuf,
  pub graduate:     Option<PathBuf>,
  pub mapping:      Option<PathBuf>,
}

impl Default for Sources {
  fn default() -> Self {
    Self {
      universities: PathBuf::from("db/seed/universities.csv"),
      departments:  PathBuf::from("db/seed/departments.csv"),
      labs:         PathBuf::from("db/seed/labs.csv"),
      graduate:     Some(PathBuf::from("db/seed/seed_loader.csv")),
      mapping:      None,
    }
  }
}

impl Sources {
  pub fn path(&self, kind: EntityKind) -> Option<&Path> {
    match kind {
      EntityKind::Universities => Some(&self.universities),
      EntityKind::Departments => Some(&self.departments),
      EntityKind::Labs => Some(&self.labs),
      EntityKind::Graduate => self.graduate.as_deref(),
    }
  }
}

/// The loaded tables for one run, keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct SourceTables {
  tables: BTreeMap<EntityKind, Table>,
}

impl SourceTables {
  pub fn new() -> Self { Self::default() }

  /// Read and remap every source the selector asks for.
  ///
  /// With no selector all primary sources are read, plus the graduate
  /// extract unless its path is unset.
  pub fn read(sources: &Sources, only: Option<EntityKind>) -> Result<Self> {
    let mapping = match &sources.mapping {
      Some(path) => ColumnMapping::from_path(path)?,
      None => ColumnMapping::default(),
    };

    let mut tables = Self::new();
    for kind in selected_kinds(only) {
      let path = match sources.path(kind) {
        Some(path) => path,
        None if only.is_none() => continue,
        None => return Err(Error::MissingSource(kind)),
      };
      let mut table = Table::from_path(kind, path)?;
      mapping.apply(&mut table);
      tracing::info!("[{kind}] read {} rows from {}", table.len(), path.display());
      tables.insert(table);
    }
    Ok(tables)
  }

  pub fn insert(&mut self, table: Table) -> Option<Table> {
    self.tables.insert(table.kind(), table)
  }

  pub fn with(mut self, table: Table) -> Self {
    self.insert(table);
    self
  }

  pub fn get(&self, kind: EntityKind) -> Option<&Table> { self.tables.get(&kind) }

  pub fn kinds(&self) -> impl Iterator<Item = EntityKind> + '_ {
    self.tables.keys().copied()
  }
}

/// The kinds a run touches, in stage order.
pub fn selected_kinds(only: Option<EntityKind>) -> Vec<EntityKind> {
  use strum::IntoEnumIterator as _;
  EntityKind::iter()
    .filter(|k| only.is_none_or(|o| o == *k))
    .collect()
}
