//! Paper registry and everything that feeds it or reads from it.

/// Submission pipeline
pub mod ingest;
/// Link extraction
pub mod links;
/// Poll and digest projections
pub mod projection;
/// Paper record and schema versions
pub mod record;
/// The shared registry
pub mod registry;
/// Table persistence
pub mod store;
/// Page title resolution
pub mod title;

pub use ingest::{ingest, IngestError};
pub use links::LinkError;
pub use record::{PaperRecord, SchemaVersion};
pub use registry::PaperRegistry;
pub use store::{PaperStore, StoreError, TsvPaperStore};
pub use title::{HttpTitleResolver, TitleError, TitleResolver};
