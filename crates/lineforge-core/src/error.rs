//! Error types for the LineForge pipeline.
//!
//! Errors carry enough context (paths, command lines, captured tool output)
//! that a failure can be reproduced by hand outside the pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::tools::Tool;
use crate::types::StageKind;

/// Top-level error type for LineForge operations.
#[derive(Error, Debug)]
pub enum LineForgeError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input path does not exist
    #[error("Input path not found: {0}")]
    NotFound(PathBuf),

    /// The active file list is empty at a checkpoint
    #[error("{message}{}", hint.map(|h| format!("\n  Hint: {h}")).unwrap_or_default())]
    NoInput {
        message: String,
        hint: Option<&'static str>,
    },

    /// A required external tool could not be located
    #[error("{tool} not found (needed for {purpose})")]
    ToolMissing { tool: Tool, purpose: String },

    /// An external process exited nonzero or could not be spawned
    #[error("Command failed:\n{command}\n{output}")]
    ExternalOperation { command: String, output: String },

    /// A configuration value outside its domain
    #[error("Invalid value {value:?} for {name}: expected {expected}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A per-file failure inside a stage
    #[error("{stage} failed on {}: {source}", path.display())]
    Stage {
        stage: StageKind,
        path: PathBuf,
        #[source]
        source: Box<PipelineError>,
    },

    /// Filesystem error with the path it happened on
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// In-process raster decode/encode failure
    #[error("Image error for {}: {message}", path.display())]
    Image { path: PathBuf, message: String },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures of a single external invocation, which icon
    /// extraction and reassembly tolerate per container.
    pub fn is_external_operation(&self) -> bool {
        match self {
            Self::ExternalOperation { .. } => true,
            Self::Stage { source, .. } => source.is_external_operation(),
            _ => false,
        }
    }
}

/// Convenience type alias for LineForge results.
pub type Result<T> = std::result::Result<T, LineForgeError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_input_renders_hint() {
        let err = PipelineError::NoInput {
            message: "No supported images found.".into(),
            hint: Some("enable recursive search"),
        };
        let text = err.to_string();
        assert!(text.starts_with("No supported images found."));
        assert!(text.contains("Hint: enable recursive search"));
    }

    #[test]
    fn no_input_without_hint_is_bare() {
        let err = PipelineError::NoInput {
            message: "nothing left".into(),
            hint: None,
        };
        assert_eq!(err.to_string(), "nothing left");
    }

    #[test]
    fn stage_error_keeps_command_line() {
        let err = PipelineError::Stage {
            stage: StageKind::Trace,
            path: PathBuf::from("in/logo.png"),
            source: Box::new(PipelineError::ExternalOperation {
                command: "potrace in.pbm -s".into(),
                output: "bad bitmap".into(),
            }),
        };
        let text = err.to_string();
        assert!(text.contains("logo.png"));
        assert!(text.contains("potrace in.pbm -s"));
        assert!(text.contains("bad bitmap"));
        assert!(err.is_external_operation());
    }

    #[test]
    fn tool_missing_names_tool_and_purpose() {
        let err = PipelineError::ToolMissing {
            tool: Tool::Inkscape,
            purpose: "export".into(),
        };
        assert_eq!(err.to_string(), "Inkscape not found (needed for export)");
        assert!(!err.is_external_operation());
    }
}
