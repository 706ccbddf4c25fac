//! Check every declared API path and method against the schema document.
//! Used by CI to catch drift between the typed bindings and `schema/`.

use std::path::PathBuf;
use typed_api_client::api::declared_paths;
use typed_api_client::schema::SchemaDocument;
use typed_api_client::telemetry::init_tracing;

const DEFAULT_SCHEMA: &str = "schema/dummyjson.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let schema_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("APP_SCHEMA_PATH").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_SCHEMA));

    println!("Using schema: {}", schema_path.display());
    let document = SchemaDocument::from_file(&schema_path)?;

    let mut errors = Vec::new();
    println!("\n=== Validating Declared Paths ===");
    for (template, methods) in declared_paths() {
        print!("{} [{}]... ", template, methods.join(", ").to_uppercase());
        match document.verify_declared(template, methods) {
            Ok(()) => println!("✅"),
            Err(e) => {
                println!("❌");
                errors.push(format!("  {}: {}", template, e));
            }
        }
    }

    if errors.is_empty() {
        println!("\n✅ All declared paths match the schema");
        Ok(())
    } else {
        eprintln!("\n❌ Validation failed:");
        for error in &errors {
            eprintln!("{}", error);
        }
        std::process::exit(1);
    }
}
