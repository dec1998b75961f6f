use roster_core::db::open_db_in_memory;
use roster_core::{
    Course, CourseService, EntityRef, InstitutionService, ServiceError, SortDirection,
    SqliteCourseRepository, SqliteInstitutionRepository,
};
use rusqlite::Connection;

fn seeded(conn: &Connection) -> CourseService<SqliteCourseRepository<'_>> {
    let institutions =
        InstitutionService::new(SqliteInstitutionRepository::try_new(conn).unwrap());
    institutions.add("Acme").unwrap();
    institutions.add("Globex").unwrap();
    CourseService::new(SqliteCourseRepository::try_new(conn).unwrap())
}

fn names(courses: &[Course]) -> Vec<&str> {
    courses.iter().map(|course| course.name.as_str()).collect()
}

#[test]
fn add_attaches_course_to_institution() {
    let conn = open_db_in_memory().unwrap();
    let courses = seeded(&conn);

    let course = courses.add(" CS101 ", "acme").unwrap();
    assert_eq!(course.name, "CS101");
    assert_eq!(course.institution_name, "Acme");

    let listed = courses.list_by_institution("Acme").unwrap();
    assert_eq!(listed, vec![course]);
    assert!(courses.list_by_institution("Globex").unwrap().is_empty());
}

#[test]
fn same_course_name_is_allowed_in_different_institutions_only() {
    let conn = open_db_in_memory().unwrap();
    let courses = seeded(&conn);

    courses.add("CS101", "Acme").unwrap();
    courses.add("CS101", "Globex").unwrap();
    assert!(matches!(
        courses.add("cs101", "ACME").unwrap_err(),
        ServiceError::Conflict(EntityRef::Course { .. })
    ));
}

#[test]
fn add_under_missing_institution_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let courses = seeded(&conn);

    assert!(matches!(
        courses.add("CS101", "Initech").unwrap_err(),
        ServiceError::NotFound(EntityRef::Institution { .. })
    ));
}

#[test]
fn search_and_sort_stay_inside_one_institution() {
    let conn = open_db_in_memory().unwrap();
    let courses = seeded(&conn);
    for name in ["Biology", "algebra", "Advanced Algebra"] {
        courses.add(name, "Acme").unwrap();
    }
    courses.add("Algebra II", "Globex").unwrap();

    let found = courses.search("ALGEBRA", "Acme").unwrap();
    assert_eq!(names(&found), vec!["algebra", "Advanced Algebra"]);

    let ascending = courses.sort_by_name("Acme", SortDirection::Ascending).unwrap();
    assert_eq!(names(&ascending), vec!["Advanced Algebra", "algebra", "Biology"]);
    let descending = courses.sort_by_name("Acme", SortDirection::Descending).unwrap();
    assert_eq!(names(&descending), vec!["Biology", "algebra", "Advanced Algebra"]);
}

#[test]
fn rename_checks_source_and_target_within_institution() {
    let conn = open_db_in_memory().unwrap();
    let courses = seeded(&conn);
    courses.add("CS101", "Acme").unwrap();
    courses.add("CS102", "Acme").unwrap();
    courses.add("MATH1", "Globex").unwrap();

    assert!(matches!(
        courses.rename("Acme", "CS103", "CS999").unwrap_err(),
        ServiceError::NotFound(EntityRef::Course { .. })
    ));
    assert!(matches!(
        courses.rename("Acme", "cs102", "CS101").unwrap_err(),
        ServiceError::Conflict(EntityRef::Course { .. })
    ));

    courses.rename("Acme", "MATH1", "CS101").unwrap();
    courses.rename("Acme", "math1", "MATH1").unwrap();
    let renamed = courses.get_if_exists("MATH1", "Acme").unwrap().unwrap();
    assert_eq!(renamed.name, "math1");
    assert!(!courses.has_course("CS101", "Acme").unwrap());
}

#[test]
fn predicates_report_course_presence() {
    let conn = open_db_in_memory().unwrap();
    let courses = seeded(&conn);
    assert!(courses.has_no_courses("Acme").unwrap());

    courses.add("CS101", "Acme").unwrap();
    assert!(!courses.has_no_courses("acme").unwrap());
    assert!(courses.has_course("cs101", "Acme").unwrap());
    assert!(!courses.has_course("CS101", "Globex").unwrap());
}

#[test]
fn delete_removes_course_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let courses = seeded(&conn);
    courses.add("CS101", "Acme").unwrap();

    courses.delete("cs101", "Acme").unwrap();
    assert!(courses.has_no_courses("Acme").unwrap());
    assert!(matches!(
        courses.delete("CS101", "Acme").unwrap_err(),
        ServiceError::NotFound(EntityRef::Course { .. })
    ));
}
