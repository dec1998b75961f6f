use roster_core::db::open_db_in_memory;
use roster_core::{
    EntityRef, InstitutionService, ServiceError, SortDirection, SqliteInstitutionRepository,
};

fn names(institutions: &[roster_core::Institution]) -> Vec<&str> {
    institutions.iter().map(|item| item.name.as_str()).collect()
}

#[test]
fn add_trims_name_and_lists_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let service = InstitutionService::new(SqliteInstitutionRepository::try_new(&conn).unwrap());

    let added = service.add("  Zenith College ").unwrap();
    assert_eq!(added.name, "Zenith College");
    service.add("Acme").unwrap();

    let listed = service.list().unwrap();
    assert_eq!(names(&listed), vec!["Zenith College", "Acme"]);
    assert_eq!(listed[0].id, added.id);
}

#[test]
fn add_rejects_blank_and_case_insensitive_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let service = InstitutionService::new(SqliteInstitutionRepository::try_new(&conn).unwrap());

    assert!(matches!(
        service.add("   ").unwrap_err(),
        ServiceError::InvalidInput("institutionName")
    ));

    service.add("Acme").unwrap();
    let err = service.add("ACME").unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(EntityRef::Institution { .. })));
    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn search_is_case_insensitive_substring_and_empty_keyword_matches_all() {
    let conn = open_db_in_memory().unwrap();
    let service = InstitutionService::new(SqliteInstitutionRepository::try_new(&conn).unwrap());
    for name in ["North Academy", "South Institute", "Academy of Arts"] {
        service.add(name).unwrap();
    }

    let found = service.search("ACADEMY").unwrap();
    assert_eq!(names(&found), vec!["North Academy", "Academy of Arts"]);
    assert_eq!(service.search("").unwrap().len(), 3);
    assert!(service.search("nowhere").unwrap().is_empty());
}

#[test]
fn sort_by_name_honors_direction_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = InstitutionService::new(SqliteInstitutionRepository::try_new(&conn).unwrap());
    for name in ["beta", "Alpha", "gamma"] {
        service.add(name).unwrap();
    }

    let ascending = service.sort_by_name(SortDirection::Ascending).unwrap();
    assert_eq!(names(&ascending), vec!["Alpha", "beta", "gamma"]);
    let descending = service.sort_by_name(SortDirection::Descending).unwrap();
    assert_eq!(names(&descending), vec!["gamma", "beta", "Alpha"]);
}

#[test]
fn rename_reports_missing_source_and_taken_target() {
    let conn = open_db_in_memory().unwrap();
    let service = InstitutionService::new(SqliteInstitutionRepository::try_new(&conn).unwrap());
    service.add("Acme").unwrap();
    service.add("Globex").unwrap();

    assert!(matches!(
        service.rename("Initech", "Hooli").unwrap_err(),
        ServiceError::NotFound(EntityRef::Institution { .. })
    ));
    assert!(matches!(
        service.rename("Acme", "globex").unwrap_err(),
        ServiceError::Conflict(EntityRef::Institution { .. })
    ));
    assert!(matches!(
        service.rename("Acme", " ").unwrap_err(),
        ServiceError::InvalidInput("newInstitutionName")
    ));
}

#[test]
fn rename_applies_new_spelling_including_case_only_changes() {
    let conn = open_db_in_memory().unwrap();
    let service = InstitutionService::new(SqliteInstitutionRepository::try_new(&conn).unwrap());
    let original = service.add("acme").unwrap();

    service.rename("ACME", "Acme").unwrap();
    let renamed = service.get("acme").unwrap().unwrap();
    assert_eq!(renamed.id, original.id);
    assert_eq!(renamed.name, "Acme");

    service.rename("Acme", "Acme Corp").unwrap();
    assert!(!service.exists("Acme").unwrap());
    assert!(service.exists("acme corp").unwrap());
}

#[test]
fn delete_removes_existing_and_reports_missing() {
    let conn = open_db_in_memory().unwrap();
    let service = InstitutionService::new(SqliteInstitutionRepository::try_new(&conn).unwrap());
    service.add("Acme").unwrap();

    service.delete("acme").unwrap();
    assert!(service.list().unwrap().is_empty());
    assert!(matches!(
        service.delete("Acme").unwrap_err(),
        ServiceError::NotFound(EntityRef::Institution { .. })
    ));
}
