//! Course read model.
//!
//! # Invariants
//! - A course belongs to exactly one institution, fixed at creation.
//! - `(institution_id, name)` is unique, names compared case-insensitively.

use crate::model::institution::InstitutionId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a course.
pub type CourseId = Uuid;

/// Course offered by one institution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Owning institution id.
    #[serde(skip)]
    pub institution_id: InstitutionId,
    /// Owning institution name, joined at read time.
    #[serde(rename = "institution")]
    pub institution_name: String,
}
