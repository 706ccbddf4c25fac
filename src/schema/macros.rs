/// Declare schema paths and the operations each supports.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use typed_api_client::api_schema;
/// use typed_api_client::schema::{ApiPath, Get, ResponseOf};
///
/// #[derive(Serialize)]
/// pub struct NoteId {
///     pub id: u64,
/// }
///
/// #[derive(Deserialize)]
/// pub struct Note {
///     pub id: u64,
///     pub text: String,
/// }
///
/// api_schema! {
///     /// `/notes/{id}`
///     pub NoteById = "/notes/{id}" {
///         Get => { path: NoteId, response: Note },
///         Delete => { path: NoteId, response: Note },
///     }
/// }
///
/// assert_eq!(NoteById::TEMPLATE, "/notes/{id}");
/// assert_eq!(NoteById::METHODS, &["get", "delete"]);
/// fn _typed(n: ResponseOf<NoteById, Get>) -> Note { n }
/// ```
///
/// `path`, `query` and `body` are optional and default to `()`; `response`
/// is required. Method names are the markers of [`crate::schema`].
#[macro_export]
macro_rules! api_schema {
    ($(
        $(#[$meta:meta])*
        $vis:vis $name:ident = $template:literal {
            $(
                $method:ident => {
                    $(path: $path:ty,)?
                    $(query: $query:ty,)?
                    $(body: $body:ty,)?
                    response: $response:ty $(,)?
                }
            ),* $(,)?
        }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            $vis struct $name;

            impl $crate::schema::ApiPath for $name {
                const TEMPLATE: &'static str = $template;
                const METHODS: &'static [&'static str] = &[
                    $(<$crate::schema::$method as $crate::schema::HttpMethod>::NAME),*
                ];
            }

            $(
                impl $crate::schema::Operation<$crate::schema::$method> for $name {
                    type PathParams = $crate::__schema_or_unit!($($path)?);
                    type Query = $crate::__schema_or_unit!($($query)?);
                    type Body = $crate::__schema_or_unit!($($body)?);
                    type Response = $response;
                }
            )*
        )*
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __schema_or_unit {
    () => {
        ()
    };
    ($ty:ty) => {
        $ty
    };
}
