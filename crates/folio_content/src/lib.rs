//! Folio content
//!
//! Static project listings bundled with the site, looked up by slug.

mod project;

pub use project::{ContentError, MediaType, Project, ProjectCatalog, StartTime};
