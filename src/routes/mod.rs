//! HTTP route handlers grouped by resource.
//!
//! Handlers are annotated with `#[openapi]` so `rocket_okapi` can derive an
//! OpenAPI document automatically.

pub mod campaigns;
pub mod health;
pub(crate) mod helpers;
pub mod mailboxes;

pub use helpers::LemlistState;
