//! Carelog: a caregiving activity log for a single patient.
//!
//! - `domain`: entities, validation and use-case services behind ports.
//! - `inbound::http`: Actix page views and form handlers.
//! - `outbound`: PostgreSQL, in-memory and filesystem adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(feature = "test-support")]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
