//! Compile-time projection of an API schema onto request/response types.
//!
//! Each schema path is a zero-sized type implementing [`ApiPath`]. For every
//! method the schema declares on that path, the type implements
//! [`Operation<M>`] with the four derived shapes. A method the schema does not
//! declare has no implementation, so a call for it does not compile:
//!
//! ```compile_fail
//! use typed_api_client::api::todos::TodosAdd;
//! use typed_api_client::schema::{Delete, PathParamsOf};
//!
//! // `/todos/add` only supports POST.
//! fn params() -> PathParamsOf<TodosAdd, Delete> {
//!     unimplemented!()
//! }
//! ```
//!
//! Paths are declared with [`api_schema!`](crate::api_schema).

pub mod document;
mod macros;
mod path;

pub use document::SchemaDocument;
pub use path::{fill_path, placeholders};

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Marker for an HTTP method a schema can declare.
pub trait HttpMethod: Send + Sync + 'static {
    /// Lowercase name as used by the schema document (`"get"`, `"post"`, ...).
    const NAME: &'static str;

    fn method() -> Method;
}

macro_rules! http_method {
    ($(#[$meta:meta])* $name:ident, $lower:literal, $wire:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {}

        impl HttpMethod for $name {
            const NAME: &'static str = $lower;

            fn method() -> Method {
                Method::$wire
            }
        }
    };
}

http_method!(
    /// `GET`
    Get, "get", GET
);
http_method!(
    /// `POST`
    Post, "post", POST
);
http_method!(
    /// `PUT`
    Put, "put", PUT
);
http_method!(
    /// `PATCH`
    Patch, "patch", PATCH
);
http_method!(
    /// `DELETE`
    Delete, "delete", DELETE
);

/// A path of the schema.
pub trait ApiPath: Send + Sync + 'static {
    /// Path template with `{name}` placeholders, e.g. `/todos/{id}`.
    const TEMPLATE: &'static str;
    /// Lowercase names of every method declared on this path.
    const METHODS: &'static [&'static str];
}

/// One (path, method) pair of the schema and its shapes.
pub trait Operation<M: HttpMethod>: ApiPath {
    /// Values for the template placeholders; `()` when there are none.
    type PathParams: Serialize + Send + Sync;
    type Query: Serialize + Send + Sync;
    /// `()` for operations without a request body.
    type Body: Serialize + Send + Sync;
    /// Body of the 200/201 response.
    type Response: DeserializeOwned + Send;
}

pub type PathParamsOf<P, M> = <P as Operation<M>>::PathParams;
pub type QueryOf<P, M> = <P as Operation<M>>::Query;
pub type BodyOf<P, M> = <P as Operation<M>>::Body;
pub type ResponseOf<P, M> = <P as Operation<M>>::Response;
