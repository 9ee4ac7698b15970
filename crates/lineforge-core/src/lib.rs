//! LineForge Core - raster to vector line-art pipeline.
//!
//! LineForge turns raster images into line art through four ordered stages,
//! each writing into its own numbered directory under an output root:
//!
//! ```text
//! input → 01_preprocessed → 02_padded → 03_svg → 04_export_png
//!            (magick)      (in-process)  (potrace)   (inkscape)
//! ```
//!
//! Icon containers (`.ico`) can optionally be split into frames before the
//! stages and rebuilt into `05_ico/` afterwards.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lineforge_core::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> lineforge_core::Result<()> {
//!     let config = Config::load()?;
//!     let summary = Pipeline::new(config)
//!         .run_all("./art".as_ref(), "./out".as_ref())
//!         .await?;
//!     println!("{} stage(s) ran", summary.stages.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod tools;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, RunPlan};
pub use error::{ConfigError, LineForgeError, PipelineError, PipelineResult, Result};
pub use pipeline::{
    Backend, FileDiscovery, IconCodec, NoopReporter, Pipeline, ProgressEvent, Reporter,
    RunLayout, ToolBackend, Transform,
};
pub use tools::{Tool, ToolLocator};
pub use types::{FrameSet, IconMap, ImageKind, ImageRef, RunSummary, StageKind, StageOutcome};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_pipeline_keeps_config() {
        let mut config = Config::default();
        config.pipeline.workers = 3;
        let pipeline = Pipeline::new(config);
        assert_eq!(pipeline.config().pipeline.workers, 3);
    }
}
