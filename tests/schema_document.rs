//! The declared bindings against the bundled schema document.

use typed_api_client::api::declared_paths;
use typed_api_client::api::todos::{TodoById, TodosAdd};
use typed_api_client::schema::SchemaDocument;

fn bundled() -> SchemaDocument {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("schema")
        .join("dummyjson.json");
    SchemaDocument::from_file(path).expect("bundled schema")
}

#[test]
fn test_every_declared_path_is_in_the_bundled_schema() {
    let document = bundled();
    for (template, methods) in declared_paths() {
        document
            .verify_declared(template, methods)
            .unwrap_or_else(|e| panic!("{}: {}", template, e));
    }
    assert_eq!(document.paths().count(), declared_paths().len());
}

#[test]
fn test_verify_by_type() {
    let document = bundled();
    document.verify::<TodoById>().unwrap();
    document.verify::<TodosAdd>().unwrap();
    assert!(document.supports("/todos/{id}", "PATCH"));
    assert!(!document.supports("/todos/add", "delete"));
}

#[test]
fn test_drift_is_reported() {
    let document = SchemaDocument::from_json_str(
        r#"{"paths":{"/todos/{id}":{"parameters":[],"get":{},"put":{}}}}"#,
    )
    .unwrap();
    let err = document.verify::<TodoById>().unwrap_err();
    let message = err.to_string();
    assert!(message.contains("PATCH, DELETE"), "{}", message);
    assert!(document.verify::<TodosAdd>().is_err());
}
