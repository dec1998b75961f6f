//! Core domain logic for the institution → course → student roster.
//! This crate owns every validation and cross-entity consistency rule.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LogSettings, LoggingError,
};
pub use model::course::{Course, CourseId};
pub use model::institution::{Institution, InstitutionId};
pub use model::listing::{PageRequest, SortDirection, STUDENT_PAGE_SIZE};
pub use model::student::{Student, StudentId};
pub use repo::course_repo::{CourseRepository, SqliteCourseRepository};
pub use repo::institution_repo::{InstitutionRepository, SqliteInstitutionRepository};
pub use repo::session_repo::{SessionRepository, SqliteSessionRepository};
pub use repo::student_repo::{SqliteStudentRepository, StudentListQuery, StudentRepository};
pub use repo::{EntityRef, RepoError, RepoResult};
pub use service::course_service::CourseService;
pub use service::institution_service::InstitutionService;
pub use service::roster_service::RosterService;
pub use service::student_service::StudentService;
pub use service::{ServiceError, ServiceResult};
pub use session::{Session, COURSE_SORT_KEY, INSTITUTION_SORT_KEY};

