//! Request router: the single entry point of the roster boundary.
//!
//! # Responsibility
//! - Resolve routes, validate parameters and dispatch to `RosterService`.
//! - Map every outcome onto the uniform response envelope.
//!
//! # Invariants
//! - Parameter validation finishes before any storage access.
//! - Each request opens and drops its own connection; session state lives
//!   in the database, so separate routers over one file share it.
//! - Nothing panics or returns an error past `handle`.

use crate::config::RosterConfig;
use crate::envelope::{records, Record, ResponseEnvelope};
use crate::request::{ParamError, Params, Request};
use crate::route::Route;
use log::{info, warn};
use roster_core::db::{open_db, DbError};
use roster_core::{RepoError, RosterService, ServiceError};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Instant;

/// Failure of one routed request after route resolution.
#[derive(Debug)]
enum RequestError {
    Param(ParamError),
    Service(ServiceError),
}

impl RequestError {
    fn status(&self) -> u16 {
        match self {
            Self::Param(_) => 400,
            Self::Service(err) => service_status(err),
        }
    }
}

impl Display for RequestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Param(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
        }
    }
}

impl From<ParamError> for RequestError {
    fn from(value: ParamError) -> Self {
        Self::Param(value)
    }
}

impl From<ServiceError> for RequestError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<DbError> for RequestError {
    fn from(value: DbError) -> Self {
        Self::Service(value.into())
    }
}

impl From<RepoError> for RequestError {
    fn from(value: RepoError) -> Self {
        Self::Service(value.into())
    }
}

/// Maps a service error onto its HTTP-style status code.
pub fn service_status(err: &ServiceError) -> u16 {
    match err {
        ServiceError::InvalidInput(_) => 400,
        ServiceError::NotFound(_) => 404,
        ServiceError::Conflict(_) | ServiceError::DependencyConflict(_) => 409,
        ServiceError::Repo(_) => 500,
    }
}

/// Routes requests against one database file.
#[derive(Debug)]
pub struct Router {
    db_path: PathBuf,
}

impl Router {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn from_config(config: &RosterConfig) -> Self {
        Self::new(config.db_path.clone())
    }

    /// Handles one request and always answers with an envelope.
    pub fn handle(&self, request: &Request) -> ResponseEnvelope {
        let started_at = Instant::now();
        let route = match Route::resolve(&request.method, &request.path) {
            Ok(route) => route,
            Err(err) => {
                let status = err.status();
                info!(
                    "event=request module=api status=rejected route=unresolved http_status={status} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return ResponseEnvelope::empty(status, err.to_string());
            }
        };

        let envelope = match self.execute(route, request) {
            Ok(data) => ResponseEnvelope::new(route.success_status(), route.success_message(), data),
            Err(err) => ResponseEnvelope::empty(
                err.status(),
                format!("{}. {err}", route.failure_message()),
            ),
        };

        let duration_ms = started_at.elapsed().as_millis();
        let label = route.label();
        let status = envelope.status;
        if status >= 500 {
            warn!("event=request module=api status=error route={label} http_status={status} duration_ms={duration_ms}");
        } else if envelope.is_success() {
            info!("event=request module=api status=ok route={label} http_status={status} duration_ms={duration_ms}");
        } else {
            info!("event=request module=api status=rejected route={label} http_status={status} duration_ms={duration_ms}");
        }
        envelope
    }

    fn execute(&self, route: Route, request: &Request) -> Result<Vec<Record>, RequestError> {
        validate(route, &request.params)?;
        let conn = open_db(&self.db_path)?;
        let roster = RosterService::try_new(&conn)?;
        self.dispatch(&roster, route, request)
    }

    fn dispatch(
        &self,
        roster: &RosterService<'_>,
        route: Route,
        request: &Request,
    ) -> Result<Vec<Record>, RequestError> {
        let params = &request.params;
        let session_id = request.session_id.as_deref();

        let data = match route {
            Route::AddInstitution => {
                roster.add_institution(params.required("institutionName")?)?;
                Vec::new()
            }
            Route::ListInstitutions => records(roster.list_institutions()?),
            Route::SearchInstitutions => {
                records(roster.search_institutions(params.optional("keyword"))?)
            }
            Route::SortInstitutions => {
                let (_, institutions) = roster.sort_institutions(session_id)?;
                records(institutions)
            }
            Route::DeleteInstitution => {
                roster.delete_institution(params.required("institutionName")?)?;
                Vec::new()
            }
            Route::RenameInstitution => {
                roster.rename_institution(
                    params.required("oldInstitutionName")?,
                    params.required("newInstitutionName")?,
                )?;
                Vec::new()
            }
            Route::ListCourses => records(roster.list_courses(params.required("institutionName")?)?),
            Route::SearchCourses => records(roster.search_courses(
                params.optional("keyword"),
                params.required("institutionName")?,
            )?),
            Route::SortCourses => {
                let (_, courses) =
                    roster.sort_courses(params.required("institutionName")?, session_id)?;
                records(courses)
            }
            Route::DeleteCourse => {
                roster.delete_course(
                    params.required("courseName")?,
                    params.required("institutionName")?,
                )?;
                Vec::new()
            }
            Route::AddCourse => {
                roster.add_course(
                    params.required("courseName")?,
                    params.required("institutionName")?,
                )?;
                Vec::new()
            }
            Route::RenameCourse => {
                roster.rename_course(
                    params.required("institutionName")?,
                    params.required("newCourseName")?,
                    params.required("oldCourseName")?,
                )?;
                Vec::new()
            }
            Route::AddStudent => {
                let student = roster.add_student(
                    params.required("studentName")?,
                    params.required("courseName")?,
                    params.required("institutionName")?,
                )?;
                vec![Record::Created { id: student.id }]
            }
            Route::DeleteStudent => {
                roster.delete_student(params.student_id()?)?;
                Vec::new()
            }
            Route::RenameStudent => {
                roster.rename_student(params.student_id()?, params.required("newStudentName")?)?;
                Vec::new()
            }
            Route::ChangeCourse => {
                roster.change_course(params.student_id()?, params.required("newCourse")?)?;
                Vec::new()
            }
            Route::TransferStudent => {
                roster.transfer_student(
                    params.student_id()?,
                    params.required("newInstitution")?,
                    params.required("newCourse")?,
                )?;
                Vec::new()
            }
            Route::ListStudents => records(
                roster.list_students(params.required("institutionName")?, params.page()?)?,
            ),
            Route::SearchStudents => records(roster.search_students(
                params.optional("keyword"),
                params.required("institutionName")?,
                params.page()?,
            )?),
            Route::FilterStudents => records(roster.filter_students(
                params.required("institutionName")?,
                params.required("courseName")?,
                params.page()?,
            )?),
        };
        Ok(data)
    }
}

/// Checks every parameter the route needs without touching storage.
fn validate(route: Route, params: &Params) -> Result<(), ParamError> {
    for &field in route.required_params() {
        params.required(field)?;
    }
    if route.required_params().contains(&"studentId") {
        params.student_id()?;
    }
    if route.is_paged() {
        params.page()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{service_status, Router};
    use crate::request::Request;
    use roster_core::{EntityRef, ServiceError};

    fn router() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let router = Router::new(dir.path().join("roster.sqlite3"));
        (dir, router)
    }

    #[test]
    fn status_mapping_covers_every_error_kind() {
        assert_eq!(service_status(&ServiceError::InvalidInput("courseName")), 400);
        assert_eq!(
            service_status(&ServiceError::NotFound(EntityRef::institution("Acme"))),
            404
        );
        assert_eq!(
            service_status(&ServiceError::Conflict(EntityRef::institution("Acme"))),
            409
        );
        assert_eq!(
            service_status(&ServiceError::DependencyConflict(EntityRef::institution(
                "Acme"
            ))),
            409
        );
    }

    #[test]
    fn missing_fields_are_rejected_before_opening_storage() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("never-created.sqlite3");
        let router = Router::new(&db_path);

        let response = router.handle(&Request::new("POST", "/addCourseToInstitution").param("courseName", "CS101"));
        assert_eq!(response.status, 400);
        assert!(response.message.starts_with("Adding course to institution failed."));
        assert!(response.message.contains("institutionName"));

        let response = router.handle(&Request::new("DELETE", "/deleteStudent").param("studentId", "7"));
        assert_eq!(response.status, 400);

        let response = router.handle(
            &Request::new("GET", "/listStudentsByInstitution")
                .param("institutionName", "Acme")
                .param("page", "x"),
        );
        assert_eq!(response.status, 400);
        assert!(!db_path.exists());
    }

    #[test]
    fn unresolved_routes_answer_404_and_405() {
        let (_dir, router) = router();
        assert_eq!(router.handle(&Request::new("GET", "/nope")).status, 404);
        let response = router.handle(&Request::new("GET", "/addStudent"));
        assert_eq!(response.status, 405);
        assert!(response.data.is_empty());
    }

    #[test]
    fn sort_toggles_only_within_one_session() {
        let (_dir, router) = router();
        router.handle(&Request::new("POST", "/addNewInstitution").param("institutionName", "b"));
        router.handle(&Request::new("POST", "/addNewInstitution").param("institutionName", "a"));

        let sort = |session: Option<&str>| {
            let mut request = Request::new("GET", "/sortInstitutionsByName");
            request.session_id = session.map(str::to_string);
            let response = router.handle(&request);
            assert_eq!(response.status, 200);
            serde_json::to_value(&response).unwrap()["data"][0]["name"].clone()
        };

        assert_eq!(sort(Some("s1")), "a");
        assert_eq!(sort(Some("s1")), "b");
        assert_eq!(sort(Some("s2")), "a");
        assert_eq!(sort(None), "a");
        assert_eq!(sort(None), "a");
    }

    #[test]
    fn sort_state_outlives_the_router_that_stored_it() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("roster.sqlite3");
        let setup = Router::new(&db_path);
        setup.handle(&Request::new("POST", "/addNewInstitution").param("institutionName", "b"));
        setup.handle(&Request::new("POST", "/addNewInstitution").param("institutionName", "a"));
        drop(setup);

        let first_name = |router: &Router| {
            let response =
                router.handle(&Request::new("GET", "/sortInstitutionsByName").session("s1"));
            assert_eq!(response.status, 200);
            serde_json::to_value(&response).unwrap()["data"][0]["name"].clone()
        };

        assert_eq!(first_name(&Router::new(&db_path)), "a");
        assert_eq!(first_name(&Router::new(&db_path)), "b");
        assert_eq!(first_name(&Router::new(&db_path)), "a");
    }
}
