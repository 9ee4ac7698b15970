//! File discovery for finding images in directories.

use std::path::Path;
use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ImageKind, ImageRef};

/// Raster extensions every stage accepts.
pub const RASTER_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "bmp", "tif", "tiff"];

/// Icon container extension, accepted only when icon handling is on.
pub const ICON_EXTENSION: &str = "ico";

/// Enumerates supported images under a file or directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileDiscovery {
    recursive: bool,
    icons: bool,
}

impl FileDiscovery {
    /// Create a new discovery instance.
    pub fn new(recursive: bool, icons: bool) -> Self {
        Self { recursive, icons }
    }

    /// Resolve all supported image files at a path.
    ///
    /// A single file yields itself if supported. A directory yields its
    /// direct children (all descendants when recursive), sorted by path.
    /// An existing path with nothing supported yields an empty list.
    /// Relative paths are made absolute against the working directory.
    pub fn resolve(&self, path: &Path) -> PipelineResult<Vec<ImageRef>> {
        if !path.exists() {
            return Err(PipelineError::NotFound(path.to_path_buf()));
        }
        let absolute = std::path::absolute(path).map_err(|e| PipelineError::io(path, e))?;
        let path = absolute.as_path();

        if path.is_file() {
            return Ok(self.classify(path).into_iter().collect());
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut files: Vec<ImageRef> = WalkDir::new(path)
            .follow_links(true)
            .min_depth(1)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| self.classify(e.path()))
            .collect();

        // Sort by path for deterministic ordering
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    /// SVG files directly inside `dir`, sorted by path.
    pub fn resolve_vectors(dir: &Path) -> PipelineResult<Vec<ImageRef>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| PipelineError::io(dir, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(image) = ImageRef::from_path(entry.path()) {
                if image.kind == ImageKind::Vector {
                    files.push(image);
                }
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn classify(&self, path: &Path) -> Option<ImageRef> {
        let image = ImageRef::from_path(path)?;
        self.is_supported(&image.extension).then_some(image)
    }

    /// Check if an extension (lowercase, no dot) is supported.
    fn is_supported(&self, extension: &str) -> bool {
        RASTER_EXTENSIONS.contains(&extension) || (self.icons && extension == ICON_EXTENSION)
    }
}
