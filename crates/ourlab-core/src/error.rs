//! Error types for `ourlab-core`.

use thiserror::Error;

use crate::model::{DepartmentId, UniversityId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("university not found: {0}")]
  UniversityNotFound(UniversityId),

  #[error("department not found: {0}")]
  DepartmentNotFound(DepartmentId),

  #[error("department {department} does not belong to university {university}")]
  OwnerMismatch {
    department: DepartmentId,
    university: UniversityId,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
