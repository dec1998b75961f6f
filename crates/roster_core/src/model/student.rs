//! Student read model.
//!
//! # Invariants
//! - A student always references exactly one existing course.
//! - The course reference may be repointed but never left dangling.

use crate::model::course::CourseId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a student, returned to callers on creation.
pub type StudentId = Uuid;

/// Student enrolled in one course.
///
/// Course and institution names are resolved through the course reference
/// when the row is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    #[serde(skip)]
    pub course_id: CourseId,
    #[serde(rename = "course")]
    pub course_name: String,
    #[serde(rename = "institution")]
    pub institution_name: String,
}

#[cfg(test)]
mod tests {
    use super::Student;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn serialized_student_carries_names_not_course_id() {
        let student = Student {
            id: Uuid::nil(),
            name: "Ada".to_string(),
            course_id: Uuid::new_v4(),
            course_name: "Math".to_string(),
            institution_name: "North".to_string(),
        };

        let value = serde_json::to_value(&student).unwrap();
        assert_eq!(
            value,
            json!({
                "id": Uuid::nil(),
                "name": "Ada",
                "course": "Math",
                "institution": "North",
            })
        );
    }
}
