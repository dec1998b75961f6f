//! Route table of the roster boundary.
//!
//! # Responsibility
//! - Resolve `(method, path)` pairs into one of the known routes.
//! - Describe per-route inputs and response wording.
//!
//! # Invariants
//! - Each path maps to exactly one method.
//! - Unknown paths and wrong methods are distinguished so callers can answer
//!   404 and 405 respectively.

use std::fmt::{Display, Formatter};

/// HTTP-style request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    /// Parses a method name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route resolution failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No route serves this path.
    UnknownPath(String),
    /// The path exists but expects another method.
    MethodNotAllowed {
        path: String,
        method: String,
        allowed: Method,
    },
}

impl RouteError {
    pub fn status(&self) -> u16 {
        match self {
            Self::UnknownPath(_) => 404,
            Self::MethodNotAllowed { .. } => 405,
        }
    }
}

impl Display for RouteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPath(path) => write!(f, "no route serves `{path}`"),
            Self::MethodNotAllowed {
                path,
                method,
                allowed,
            } => write!(
                f,
                "method `{method}` is not allowed for `{path}`; use `{allowed}`"
            ),
        }
    }
}

impl std::error::Error for RouteError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    AddInstitution,
    ListInstitutions,
    SearchInstitutions,
    SortInstitutions,
    DeleteInstitution,
    RenameInstitution,
    ListCourses,
    SearchCourses,
    SortCourses,
    DeleteCourse,
    AddCourse,
    RenameCourse,
    AddStudent,
    DeleteStudent,
    RenameStudent,
    ChangeCourse,
    TransferStudent,
    ListStudents,
    SearchStudents,
    FilterStudents,
}

impl Route {
    pub const ALL: [Route; 20] = [
        Route::AddInstitution,
        Route::ListInstitutions,
        Route::SearchInstitutions,
        Route::SortInstitutions,
        Route::DeleteInstitution,
        Route::RenameInstitution,
        Route::ListCourses,
        Route::SearchCourses,
        Route::SortCourses,
        Route::DeleteCourse,
        Route::AddCourse,
        Route::RenameCourse,
        Route::AddStudent,
        Route::DeleteStudent,
        Route::RenameStudent,
        Route::ChangeCourse,
        Route::TransferStudent,
        Route::ListStudents,
        Route::SearchStudents,
        Route::FilterStudents,
    ];

    /// Resolves a request line into a route.
    ///
    /// A leading slash on `path` is optional; a trailing slash is ignored.
    pub fn resolve(method: &str, path: &str) -> Result<Self, RouteError> {
        let trimmed = path.trim().trim_end_matches('/');
        let normalized = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let route = Self::ALL
            .into_iter()
            .find(|route| route.path().trim_start_matches('/') == normalized)
            .ok_or_else(|| RouteError::UnknownPath(path.trim().to_string()))?;

        match Method::parse(method) {
            Some(parsed) if parsed == route.method() => Ok(route),
            _ => Err(RouteError::MethodNotAllowed {
                path: route.path().to_string(),
                method: method.trim().to_string(),
                allowed: route.method(),
            }),
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::AddInstitution | Self::AddCourse | Self::AddStudent => Method::Post,
            Self::DeleteInstitution | Self::DeleteCourse | Self::DeleteStudent => Method::Delete,
            Self::RenameInstitution
            | Self::RenameCourse
            | Self::RenameStudent
            | Self::ChangeCourse
            | Self::TransferStudent => Method::Patch,
            Self::ListInstitutions
            | Self::SearchInstitutions
            | Self::SortInstitutions
            | Self::ListCourses
            | Self::SearchCourses
            | Self::SortCourses
            | Self::ListStudents
            | Self::SearchStudents
            | Self::FilterStudents => Method::Get,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::AddInstitution => "/addNewInstitution",
            Self::ListInstitutions => "/listAllInstitutions",
            Self::SearchInstitutions => "/searchInstitutions",
            Self::SortInstitutions => "/sortInstitutionsByName",
            Self::DeleteInstitution => "/deleteInstitution",
            Self::RenameInstitution => "/editInstitutionName",
            Self::ListCourses => "/listAllCoursesByInstitution",
            Self::SearchCourses => "/searchCourses",
            Self::SortCourses => "/sortCoursesInInstitutionByName",
            Self::DeleteCourse => "/deleteCourse",
            Self::AddCourse => "/addCourseToInstitution",
            Self::RenameCourse => "/editCourseName",
            Self::AddStudent => "/addStudent",
            Self::DeleteStudent => "/deleteStudent",
            Self::RenameStudent => "/editStudentName",
            Self::ChangeCourse => "/changeCourseForStudent",
            Self::TransferStudent => "/transferToAnotherInstitution",
            Self::ListStudents => "/listStudentsByInstitution",
            Self::SearchStudents => "/searchStudentsInInstitution",
            Self::FilterStudents => "/filterStudentsListByCourse",
        }
    }

    /// Stable snake_case label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::AddInstitution => "add_institution",
            Self::ListInstitutions => "list_institutions",
            Self::SearchInstitutions => "search_institutions",
            Self::SortInstitutions => "sort_institutions",
            Self::DeleteInstitution => "delete_institution",
            Self::RenameInstitution => "rename_institution",
            Self::ListCourses => "list_courses",
            Self::SearchCourses => "search_courses",
            Self::SortCourses => "sort_courses",
            Self::DeleteCourse => "delete_course",
            Self::AddCourse => "add_course",
            Self::RenameCourse => "rename_course",
            Self::AddStudent => "add_student",
            Self::DeleteStudent => "delete_student",
            Self::RenameStudent => "rename_student",
            Self::ChangeCourse => "change_course",
            Self::TransferStudent => "transfer_student",
            Self::ListStudents => "list_students",
            Self::SearchStudents => "search_students",
            Self::FilterStudents => "filter_students",
        }
    }

    /// Parameters that must be present and non-blank.
    pub fn required_params(self) -> &'static [&'static str] {
        match self {
            Self::ListInstitutions | Self::SearchInstitutions | Self::SortInstitutions => &[],
            Self::AddInstitution | Self::DeleteInstitution => &["institutionName"],
            Self::RenameInstitution => &["newInstitutionName", "oldInstitutionName"],
            Self::ListCourses | Self::SearchCourses | Self::SortCourses => &["institutionName"],
            Self::DeleteCourse | Self::AddCourse => &["courseName", "institutionName"],
            Self::RenameCourse => &["institutionName", "newCourseName", "oldCourseName"],
            Self::AddStudent => &["studentName", "courseName", "institutionName"],
            Self::DeleteStudent => &["studentId"],
            Self::RenameStudent => &["studentId", "newStudentName"],
            Self::ChangeCourse => &["studentId", "newCourse"],
            Self::TransferStudent => &["studentId", "newInstitution", "newCourse"],
            Self::ListStudents | Self::SearchStudents => &["institutionName"],
            Self::FilterStudents => &["institutionName", "courseName"],
        }
    }

    /// Whether the route accepts the optional 1-based `page` parameter.
    pub fn is_paged(self) -> bool {
        matches!(
            self,
            Self::ListStudents | Self::SearchStudents | Self::FilterStudents
        )
    }

    /// Status answered on success.
    pub fn success_status(self) -> u16 {
        match self.method() {
            Method::Post => 201,
            _ => 200,
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::AddInstitution => "Institution was successfully added",
            Self::ListInstitutions => "Retrieving all institutions was successful",
            Self::SearchInstitutions => "Searching institutions was successful",
            Self::SortInstitutions => "Sorting institutions was successful",
            Self::DeleteInstitution => "Institution was successfully deleted",
            Self::RenameInstitution => "Institution name was successfully edited",
            Self::ListCourses => "Courses retrieved successfully",
            Self::SearchCourses => "Searching courses was successful",
            Self::SortCourses => "Sorting courses was successful",
            Self::DeleteCourse => "Course was successfully deleted",
            Self::AddCourse => "Course was successfully added to institution",
            Self::RenameCourse => "Course name was successfully edited",
            Self::AddStudent => "Student was successfully added",
            Self::DeleteStudent => "Student was successfully deleted",
            Self::RenameStudent => "Student name was successfully edited",
            Self::ChangeCourse => "Changing course for student was successful",
            Self::TransferStudent => "Transferring student was successful",
            Self::ListStudents => "Students retrieved successfully",
            Self::SearchStudents => "Searching students was successful",
            Self::FilterStudents => "Students successfully filtered by course",
        }
    }

    /// Prefix of every failure message of this route.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::AddInstitution => "Adding institution failed",
            Self::ListInstitutions => "Retrieving institutions failed",
            Self::SearchInstitutions => "Searching institutions failed",
            Self::SortInstitutions => "Sorting institutions failed",
            Self::DeleteInstitution => "Deleting institution failed",
            Self::RenameInstitution => "Editing institution failed",
            Self::ListCourses => "Retrieving courses failed",
            Self::SearchCourses => "Searching courses failed",
            Self::SortCourses => "Sorting courses failed",
            Self::DeleteCourse => "Deleting course failed",
            Self::AddCourse => "Adding course to institution failed",
            Self::RenameCourse => "Editing course failed",
            Self::AddStudent => "Adding student failed",
            Self::DeleteStudent => "Deleting student failed",
            Self::RenameStudent => "Editing student name failed",
            Self::ChangeCourse => "Changing course failed",
            Self::TransferStudent => "Transferring student failed",
            Self::ListStudents => "Retrieving students failed",
            Self::SearchStudents => "Searching students failed",
            Self::FilterStudents => "Filtering students by course failed",
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}
