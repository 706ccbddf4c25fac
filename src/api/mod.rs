//! Typed bindings for the DummyJSON sample API.
//!
//! Paths are declared with [`api_schema!`](crate::api_schema) per resource;
//! each resource module also carries thin service functions over
//! [`ApiClient`](crate::ApiClient).

pub mod auth;
pub mod todos;

use crate::schema::ApiPath;

/// A declared path: its template and lowercase method names.
pub type DeclaredPath = (&'static str, &'static [&'static str]);

fn declared<P: ApiPath>() -> DeclaredPath {
    (P::TEMPLATE, P::METHODS)
}

/// Every path declared by this module, for checking against a schema document.
pub fn declared_paths() -> Vec<DeclaredPath> {
    vec![
        declared::<todos::Todos>(),
        declared::<todos::TodoById>(),
        declared::<todos::TodosRandom>(),
        declared::<todos::TodosRandomLength>(),
        declared::<todos::TodosByUser>(),
        declared::<todos::TodosAdd>(),
        declared::<auth::AuthLogin>(),
        declared::<auth::AuthRefresh>(),
        declared::<auth::AuthMe>(),
    ]
}
