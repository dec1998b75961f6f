//! Institution read model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an institution.
pub type InstitutionId = Uuid;

/// Top-level entity owning courses.
///
/// `name` is unique across institutions, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
}

impl Institution {
    /// Creates an institution with a freshly generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
