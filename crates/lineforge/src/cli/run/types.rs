//! CLI enum types for the run command: finish mode, pad format, background.

use clap::ValueEnum;

/// Final preprocessing treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FinishMode {
    /// No finishing step
    None,
    /// Hard two-tone threshold
    Threshold,
    /// Flat grayscale palette
    Quantize,
}

impl std::fmt::Display for FinishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishMode::None => write!(f, "none"),
            FinishMode::Threshold => write!(f, "threshold"),
            FinishMode::Quantize => write!(f, "quantize"),
        }
    }
}

/// Pad stage output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PadFormat {
    Png,
    Jpg,
}

impl std::fmt::Display for PadFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PadFormat::Png => write!(f, "png"),
            PadFormat::Jpg => write!(f, "jpg"),
        }
    }
}

/// Pad canvas fill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Background {
    White,
    Black,
    /// Kept only for PNG output; JPEG falls back to white
    Transparent,
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Background::White => write!(f, "white"),
            Background::Black => write!(f, "black"),
            Background::Transparent => write!(f, "transparent"),
        }
    }
}
