//! Request model and parameter parsing for the roster boundary.

use roster_core::{PageRequest, StudentId};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// One inbound request in transport-neutral form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub params: Params,
    /// Client session identifier; without one, sorts are always ascending.
    pub session_id: Option<String>,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// Parameter validation failure, answered with 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    Missing(&'static str),
    InvalidStudentId(String),
    InvalidPage(String),
}

impl Display for ParamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "`{field}` must be provided and not blank"),
            Self::InvalidStudentId(value) => {
                write!(f, "`studentId` must be a valid id, got `{value}`")
            }
            Self::InvalidPage(value) => {
                write!(f, "`page` must be a whole number, got `{value}`")
            }
        }
    }
}

impl std::error::Error for ParamError {}

/// Query or form style parameters. Later inserts replace earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the trimmed value of `key`, rejecting absent or blank values.
    pub fn required(&self, key: &'static str) -> Result<&str, ParamError> {
        self.get(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ParamError::Missing(key))
    }

    /// Returns the value of `key`, or the empty string when absent.
    pub fn optional(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn student_id(&self) -> Result<StudentId, ParamError> {
        let raw = self.required("studentId")?;
        Uuid::parse_str(raw).map_err(|_| ParamError::InvalidStudentId(raw.to_string()))
    }

    /// Parses the optional 1-based `page`; blank counts as absent.
    pub fn page(&self) -> Result<PageRequest, ParamError> {
        let raw = match self.get("page").map(str::trim) {
            None | Some("") => return Ok(PageRequest::first()),
            Some(raw) => raw,
        };
        let number = raw
            .parse::<i64>()
            .map_err(|_| ParamError::InvalidPage(raw.to_string()))?;
        Ok(PageRequest::from_one_based(Some(number)))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}
