//! Raster-to-vector pipeline components.
//!
//! - **discovery**: Find supported images under a file or directory
//! - **layout**: Fixed stage directory names under an output root
//! - **stage**: The `Transform` seam and the per-stage runner
//! - **preprocess**, **pad**, **trace**, **export**: The four transforms
//! - **backend**: Supplies transforms and the icon codec to the processor
//! - **icon**: Icon container expansion and reassembly
//! - **report**: Progress events and the `Reporter` callback
//! - **processor**: Orchestrates a full run

pub mod backend;
pub mod discovery;
pub mod export;
pub mod icon;
pub mod layout;
pub mod pad;
pub mod preprocess;
pub mod processor;
pub mod report;
pub mod stage;
pub mod trace;

// Re-exports for convenient access
pub use backend::{Backend, IconCodec, MagickIcons, ToolBackend};
pub use discovery::FileDiscovery;
pub use export::Export;
pub use icon::{choose_raster_source, Expansion, Reassembly};
pub use layout::RunLayout;
pub use pad::Pad;
pub use preprocess::Preprocess;
pub use processor::Pipeline;
pub use report::{NoopReporter, ProgressEvent, Reporter};
pub use stage::{output_path, run_stage, Transform};
pub use trace::Trace;
