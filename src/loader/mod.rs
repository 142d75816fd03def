//! Module loading
//!
//! - **file**: bounded, cancellable loading of one script or stylesheet
//! - **document**: the page resources are injected into
//! - **registry**: files already loaded, and where a file name points to
//! - **bootstrap**: sequential module bootstrapping
//! - **orchestrator**: a whole startup run

pub mod bootstrap;
pub mod document;
pub mod error;
pub mod file;
pub mod orchestrator;
pub mod registry;

pub use bootstrap::Bootstrapper;
pub use document::{Document, InjectedResource, PageDocument};
pub use error::{LoaderError, LoaderResult};
pub use file::{FileLoader, LoadOutcome, ResourceKind};
pub use orchestrator::{Orchestrator, OrchestratorOptions, RunReport, StartFailure};
pub use registry::{default_vendor_map, FileSource, LoadedFileRegistry};
