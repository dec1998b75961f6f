//! Uniform response envelope.
//!
//! # Invariants
//! - `data` is always a list; it is empty when an operation returns nothing.
//! - Every request, successful or not, yields exactly one envelope.

use roster_core::{Course, Institution, Student};
use serde::Serialize;
use uuid::Uuid;

/// Response of one routed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub message: String,
    pub data: Vec<Record>,
}

impl ResponseEnvelope {
    pub fn new(status: u16, message: impl Into<String>, data: Vec<Record>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    /// Envelope with an empty payload.
    pub fn empty(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, message, Vec::new())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Serializes the envelope as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One payload item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Institution(Institution),
    Course(Course),
    Student(Student),
    /// Identifier of a freshly created entity.
    Created { id: Uuid },
}

impl From<Institution> for Record {
    fn from(value: Institution) -> Self {
        Self::Institution(value)
    }
}

impl From<Course> for Record {
    fn from(value: Course) -> Self {
        Self::Course(value)
    }
}

impl From<Student> for Record {
    fn from(value: Student) -> Self {
        Self::Student(value)
    }
}

/// Converts a listing into envelope records.
pub fn records<T: Into<Record>>(items: Vec<T>) -> Vec<Record> {
    items.into_iter().map(Into::into).collect()
}
