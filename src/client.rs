//! Generic typed client.
//!
//! The public surface is [`ApiClient`] (one method per HTTP verb, generic
//! over the schema path type), its builder, and per-call [`RequestOptions`].
//! Implementation details are split into submodules under `src/client/`.

mod builder;
mod core;
mod options;

pub use self::core::ApiClient;
pub use builder::ApiClientBuilder;
pub use options::RequestOptions;
