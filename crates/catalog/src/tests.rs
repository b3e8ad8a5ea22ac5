use std::collections::BTreeMap;
use std::path::PathBuf;

use super::*;

fn student_columns() -> Vec<String> {
    vec!["A".to_string(), "B".to_string(), "C".to_string(), "D".to_string()]
}

#[test]
fn register_and_lookup_base_schema() {
    let mut catalog = Catalog::new();
    let id = catalog
        .register_base("Student", student_columns(), PathBuf::from("data/Student.csv"))
        .unwrap();

    let schema = catalog.base_schema("Student").unwrap();
    assert_eq!(schema.name, "Student");
    assert_eq!(schema.column_count(), 4);
    assert_eq!(catalog.width(id), 4);
}

#[test]
fn base_lookup_is_case_insensitive() {
    let mut catalog = Catalog::new();
    catalog
        .register_base("Student", student_columns(), PathBuf::from("data/Student.csv"))
        .unwrap();

    assert!(catalog.base_schema("student").is_ok());
    assert!(catalog.base_schema("STUDENT").is_ok());
    let id = catalog.base_id("sTuDeNt").unwrap();
    assert_eq!(catalog.resolve(id, Some("STUDENT"), "a").unwrap(), 0);
    assert_eq!(catalog.resolve(id, None, "d").unwrap(), 3);
}

#[test]
fn duplicate_table_registration_fails() {
    let mut catalog = Catalog::new();
    catalog
        .register_base("Student", student_columns(), PathBuf::from("data/Student.csv"))
        .unwrap();
    let err = catalog
        .register_base("student", student_columns(), PathBuf::from("data/student.csv"))
        .unwrap_err();
    assert_eq!(err, CatalogError::TableAlreadyExists("student".to_string()));
}

#[test]
fn duplicate_column_registration_fails() {
    let mut catalog = Catalog::new();
    let err = catalog
        .register_base(
            "T",
            vec!["a".to_string(), "A".to_string()],
            PathBuf::from("data/T.csv"),
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::ColumnAlreadyExists(_)));
}

#[test]
fn unknown_table_and_column_are_errors() {
    let mut catalog = Catalog::new();
    let id = catalog
        .register_base("Student", student_columns(), PathBuf::from("data/Student.csv"))
        .unwrap();

    assert_eq!(
        catalog.base_schema("Course").unwrap_err(),
        CatalogError::TableNotFound("Course".to_string())
    );
    assert_eq!(
        catalog.resolve(id, Some("Student"), "Z").unwrap_err(),
        CatalogError::ColumnNotFound("Student.Z".to_string())
    );
    // Qualification with the wrong table never resolves
    assert!(catalog.resolve(id, Some("Course"), "A").is_err());
}

#[test]
fn derived_projection_resolves_by_qualified_key() {
    let mut catalog = Catalog::new();
    catalog
        .register_base("Student", student_columns(), PathBuf::from("data/Student.csv"))
        .unwrap();

    // Projection keeping (D, A) in that order
    let mut columns = BTreeMap::new();
    columns.insert("student.d".to_string(), 0);
    columns.insert("student.a".to_string(), 1);
    let id = catalog.register_derived(columns, Vec::new(), TransformKind::Projection, 2);

    assert_eq!(catalog.resolve(id, Some("Student"), "D").unwrap(), 0);
    assert_eq!(catalog.resolve(id, Some("Student"), "A").unwrap(), 1);
    // Unqualified fallback finds the column part of a qualified key
    assert_eq!(catalog.resolve(id, None, "a").unwrap(), 1);
    // Dropped columns must not resolve through any fallback
    assert!(catalog.resolve(id, Some("Student"), "B").is_err());
    assert_eq!(catalog.transform_kind(id), Some(TransformKind::Projection));
}

#[test]
fn join_schema_resolves_through_parents_with_offset() {
    let mut catalog = Catalog::new();
    let left = catalog
        .register_base("Student", student_columns(), PathBuf::from("data/Student.csv"))
        .unwrap();
    let right = catalog
        .register_base(
            "Course",
            vec!["X".to_string(), "Y".to_string()],
            PathBuf::from("data/Course.csv"),
        )
        .unwrap();

    let join =
        catalog.register_derived(BTreeMap::new(), vec![(left, 0), (right, 4)], TransformKind::Join, 6);

    assert_eq!(catalog.width(join), 6);
    assert_eq!(catalog.resolve(join, Some("Student"), "C").unwrap(), 2);
    assert_eq!(catalog.resolve(join, Some("Course"), "X").unwrap(), 4);
    assert_eq!(catalog.resolve(join, Some("Course"), "Y").unwrap(), 5);
    assert!(catalog.resolve(join, Some("Course"), "C").is_err());
}

#[test]
fn schema_ids_are_never_reused() {
    let mut catalog = Catalog::new();
    let a = catalog
        .register_base("A", vec!["x".to_string()], PathBuf::from("data/A.csv"))
        .unwrap();
    let b = catalog.register_derived(BTreeMap::new(), vec![(a, 0)], TransformKind::Other, 1);
    let c = catalog.register_derived(BTreeMap::new(), vec![(b, 0)], TransformKind::Other, 1);
    assert_ne!(a, b);
    assert_ne!(b, c);
    assert_ne!(a, c);
}
