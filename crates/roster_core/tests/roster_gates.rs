use roster_core::db::open_db_in_memory;
use roster_core::{
    EntityRef, PageRequest, RosterService, ServiceError, SessionRepository, SortDirection,
    SqliteSessionRepository, COURSE_SORT_KEY, INSTITUTION_SORT_KEY,
};

#[test]
fn enrollment_lifecycle_blocks_course_delete_until_students_leave() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();

    roster.add_institution("Acme").unwrap();
    roster.add_course("CS101", "Acme").unwrap();
    let ana = roster.add_student("Ana", "CS101", "Acme").unwrap();

    assert!(matches!(
        roster.delete_course("CS101", "Acme").unwrap_err(),
        ServiceError::DependencyConflict(EntityRef::Course { .. })
    ));
    assert!(roster.courses().has_course("CS101", "Acme").unwrap());

    roster.delete_student(ana.id).unwrap();
    roster.delete_course("CS101", "Acme").unwrap();
    assert!(roster.list_courses("Acme").unwrap().is_empty());
}

#[test]
fn institution_delete_requires_zero_courses() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();
    roster.add_institution("Acme").unwrap();
    roster.add_course("CS101", "Acme").unwrap();

    assert!(matches!(
        roster.delete_institution("acme").unwrap_err(),
        ServiceError::DependencyConflict(EntityRef::Institution { .. })
    ));
    assert_eq!(roster.list_institutions().unwrap().len(), 1);

    roster.delete_course("CS101", "Acme").unwrap();
    roster.delete_institution("Acme").unwrap();
    assert!(roster.list_institutions().unwrap().is_empty());
    assert!(matches!(
        roster.delete_institution("Acme").unwrap_err(),
        ServiceError::NotFound(EntityRef::Institution { .. })
    ));
}

#[test]
fn course_operations_require_existing_institution() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();

    let errors = [
        roster.list_courses("Initech").map(|_| ()).unwrap_err(),
        roster.search_courses("cs", "Initech").map(|_| ()).unwrap_err(),
        roster.sort_courses("Initech", Some("s1")).map(|_| ()).unwrap_err(),
        roster.add_course("CS101", "Initech").map(|_| ()).unwrap_err(),
        roster.rename_course("Initech", "CS102", "CS101").unwrap_err(),
        roster
            .list_students("Initech", PageRequest::first())
            .map(|_| ())
            .unwrap_err(),
    ];
    for err in errors {
        assert!(matches!(err, ServiceError::NotFound(EntityRef::Institution { .. })));
    }
    let sessions = SqliteSessionRepository::try_new(&conn).unwrap();
    assert_eq!(sessions.load_session("s1").unwrap().get(COURSE_SORT_KEY), None);
}

#[test]
fn blank_fields_are_rejected_before_lookups() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();

    assert!(matches!(
        roster.add_course(" ", "Initech").unwrap_err(),
        ServiceError::InvalidInput("courseName")
    ));
    assert!(matches!(
        roster.delete_institution("").unwrap_err(),
        ServiceError::InvalidInput("institutionName")
    ));
    assert!(matches!(
        roster.rename_course("Initech", "", "CS101").unwrap_err(),
        ServiceError::InvalidInput("newCourseName")
    ));
    assert!(matches!(
        roster
            .filter_students("Acme", " ", PageRequest::first())
            .unwrap_err(),
        ServiceError::InvalidInput("courseName")
    ));
}

#[test]
fn sort_requests_toggle_direction_per_session() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();
    for name in ["Beta", "alpha", "Gamma"] {
        roster.add_institution(name).unwrap();
    }
    roster.add_course("Zoology", "Beta").unwrap();
    roster.add_course("anatomy", "Beta").unwrap();

    let (direction, first) = roster.sort_institutions(Some("s1")).unwrap();
    assert_eq!(direction, SortDirection::Ascending);
    assert_eq!(first[0].name, "alpha");

    let (direction, second) = roster.sort_institutions(Some("s1")).unwrap();
    assert_eq!(direction, SortDirection::Descending);
    assert_eq!(second[0].name, "Gamma");

    let sessions = SqliteSessionRepository::try_new(&conn).unwrap();
    assert_eq!(
        sessions.load_session("s1").unwrap().get(INSTITUTION_SORT_KEY),
        Some("desc")
    );

    let (direction, _) = roster.sort_institutions(Some("s2")).unwrap();
    assert_eq!(direction, SortDirection::Ascending);

    let (direction, courses) = roster.sort_courses("beta", Some("s1")).unwrap();
    assert_eq!(direction, SortDirection::Ascending);
    assert_eq!(courses[0].name, "anatomy");
    let (direction, courses) = roster.sort_courses("Beta", Some("s1")).unwrap();
    assert_eq!(direction, SortDirection::Descending);
    assert_eq!(courses[0].name, "Zoology");
}

#[test]
fn anonymous_sorts_are_always_ascending() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();
    roster.add_institution("b").unwrap();
    roster.add_institution("a").unwrap();

    for session_id in [None, Some(""), Some("  "), None] {
        let (direction, institutions) = roster.sort_institutions(session_id).unwrap();
        assert_eq!(direction, SortDirection::Ascending);
        assert_eq!(institutions[0].name, "a");
    }
    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM sessions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, 0);
}

#[test]
fn failed_sort_keeps_the_next_direction() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();
    roster.add_institution("Acme").unwrap();

    let (direction, _) = roster.sort_courses("Acme", Some("s1")).unwrap();
    assert_eq!(direction, SortDirection::Ascending);
    roster.sort_courses("Initech", Some("s1")).unwrap_err();

    let (direction, _) = roster.sort_courses("Acme", Some("s1")).unwrap();
    assert_eq!(direction, SortDirection::Descending);
}

#[test]
fn names_compare_case_insensitively_beyond_ascii() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();

    roster.add_institution("École Polytechnique").unwrap();
    assert!(matches!(
        roster.add_institution("école polytechnique").unwrap_err(),
        ServiceError::Conflict(EntityRef::Institution { .. })
    ));

    roster.add_institution("Sorbonne").unwrap();
    assert!(matches!(
        roster
            .rename_institution("Sorbonne", "ÉCOLE POLYTECHNIQUE")
            .unwrap_err(),
        ServiceError::Conflict(EntityRef::Institution { .. })
    ));
    roster
        .rename_institution("école polytechnique", "école Polytechnique")
        .unwrap();

    let found = roster.search_institutions("ÉCOLE").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "école Polytechnique");

    roster.add_course("Économie", "ÉCOLE POLYTECHNIQUE").unwrap();
    assert!(matches!(
        roster.add_course("économie", "École Polytechnique").unwrap_err(),
        ServiceError::Conflict(EntityRef::Course { .. })
    ));
    let courses = roster.search_courses("écon", "école polytechnique").unwrap();
    assert_eq!(courses.len(), 1);

    roster
        .add_student("Ñúñez", "économie", "École Polytechnique")
        .unwrap();
    let students = roster
        .search_students("ÑÚÑ", "École Polytechnique", PageRequest::first())
        .unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].course_name, "Économie");
}

#[test]
fn filter_students_requires_existing_course() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();
    roster.add_institution("Acme").unwrap();
    roster.add_course("CS101", "Acme").unwrap();
    roster.add_student("Ana", "CS101", "Acme").unwrap();

    let filtered = roster
        .filter_students("Acme", "cs101", PageRequest::first())
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert!(matches!(
        roster
            .filter_students("Acme", "PHYS1", PageRequest::first())
            .unwrap_err(),
        ServiceError::NotFound(EntityRef::Course { .. })
    ));
}

#[test]
fn change_course_and_transfer_keep_student_consistent_on_failure() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();
    roster.add_institution("Acme").unwrap();
    roster.add_institution("Globex").unwrap();
    roster.add_course("CS101", "Acme").unwrap();
    roster.add_course("MATH200", "Acme").unwrap();
    roster.add_course("BIO1", "Globex").unwrap();
    let ana = roster.add_student("Ana", "CS101", "Acme").unwrap();

    assert!(roster.change_course(ana.id, "BIO1").is_err());
    let moved = roster.change_course(ana.id, "MATH200").unwrap();
    assert_eq!(moved.course_name, "MATH200");

    assert!(roster.transfer_student(ana.id, "Initech", "BIO1").is_err());
    let transferred = roster.transfer_student(ana.id, "Globex", "BIO1").unwrap();
    assert_eq!(transferred.institution_name, "Globex");

    let remaining = roster
        .list_students("Acme", PageRequest::first())
        .unwrap();
    assert!(remaining.is_empty());
    let search = roster
        .search_students("ana", "Globex", PageRequest::first())
        .unwrap();
    assert_eq!(search, vec![transferred]);
}

#[test]
fn renames_are_visible_through_children() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::try_new(&conn).unwrap();
    roster.add_institution("Acme").unwrap();
    roster.add_course("CS101", "Acme").unwrap();
    let ana = roster.add_student("Ana", "CS101", "Acme").unwrap();

    roster.rename_institution("Acme", "Acme University").unwrap();
    roster
        .rename_course("Acme University", "Intro to CS", "CS101")
        .unwrap();
    roster.rename_student(ana.id, "Ana Lima").unwrap();

    let student = roster.students().get(ana.id).unwrap();
    assert_eq!(student.name, "Ana Lima");
    assert_eq!(student.course_name, "Intro to CS");
    assert_eq!(student.institution_name, "Acme University");
    assert!(matches!(
        roster.add_institution("acme university").unwrap_err(),
        ServiceError::Conflict(EntityRef::Institution { .. })
    ));
}
