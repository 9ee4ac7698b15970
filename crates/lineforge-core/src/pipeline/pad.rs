//! Stage B: center images on a square canvas.
//!
//! Runs in-process with the `image` crate on a blocking thread; no external
//! tool is needed.

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::config::{Background, PadFormat, PadParams};
use crate::error::{PipelineError, PipelineResult};

use super::stage::Transform;

/// Scales images to fit a `size`×`size` canvas and centers them.
#[derive(Debug, Clone, Copy)]
pub struct Pad {
    params: PadParams,
}

/// Dimensions of a `width`×`height` image scaled uniformly so its longer
/// side equals `size`.
pub fn fit_within(width: u32, height: u32, size: u32) -> (u32, u32) {
    let (w, h, s) = (width.max(1) as u64, height.max(1) as u64, size as u64);
    if w >= h {
        (size, ((h * s) / w).max(1) as u32)
    } else {
        (((w * s) / h).max(1) as u32, size)
    }
}

impl Pad {
    pub fn new(params: PadParams) -> Self {
        Self { params }
    }

    /// Whether the output keeps an alpha channel.
    fn keeps_alpha(&self) -> bool {
        self.params.background == Background::Transparent && self.params.format == PadFormat::Png
    }

    fn fill(&self) -> Rgba<u8> {
        if self.params.background == Background::Transparent && !self.keeps_alpha() {
            // JPEG has no alpha; fall back to white.
            Rgba(Background::White.rgba())
        } else {
            Rgba(self.params.background.rgba())
        }
    }

    /// Flatten, scale and center `image` on the square canvas.
    pub fn pad_image(&self, image: &DynamicImage) -> DynamicImage {
        let size = self.params.size;
        let fill = self.fill();
        let source = image.to_rgba8();
        let (width, height) = source.dimensions();

        let flat = if self.keeps_alpha() {
            source
        } else {
            let mut base = RgbaImage::from_pixel(width, height, fill);
            imageops::overlay(&mut base, &source, 0, 0);
            base
        };

        let (new_w, new_h) = fit_within(width, height, size);
        let scaled = imageops::resize(&flat, new_w, new_h, FilterType::Lanczos3);

        let mut canvas = RgbaImage::from_pixel(size, size, fill);
        let x = (size - new_w) / 2;
        let y = (size - new_h) / 2;
        imageops::overlay(&mut canvas, &scaled, x as i64, y as i64);

        let canvas = DynamicImage::ImageRgba8(canvas);
        if self.keeps_alpha() {
            canvas
        } else {
            DynamicImage::ImageRgb8(canvas.to_rgb8())
        }
    }

    /// Decode `input`, pad it, and encode to `output`.
    pub fn pad_file(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let image_err = |message: String| PipelineError::Image {
            path: input.to_path_buf(),
            message,
        };
        let image = ImageReader::open(input)
            .map_err(|e| PipelineError::io(input, e))?
            .with_guessed_format()
            .map_err(|e| PipelineError::io(input, e))?
            .decode()
            .map_err(|e| image_err(e.to_string()))?;

        let padded = self.pad_image(&image);

        match self.params.format {
            PadFormat::Png => padded
                .save_with_format(output, ImageFormat::Png)
                .map_err(|e| image_err(format!("PNG encode failed: {e}"))),
            PadFormat::Jpg => {
                let file = File::create(output).map_err(|e| PipelineError::io(output, e))?;
                let encoder =
                    JpegEncoder::new_with_quality(BufWriter::new(file), self.params.jpeg_quality);
                padded
                    .write_with_encoder(encoder)
                    .map_err(|e| image_err(format!("JPEG encode failed: {e}")))
            }
        }
    }
}

#[async_trait]
impl Transform for Pad {
    fn output_extension(&self) -> &'static str {
        self.params.format.extension()
    }

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let pad = *self;
        let (input, output) = (input.to_path_buf(), output.to_path_buf());
        let path = input.clone();
        tokio::task::spawn_blocking(move || pad.pad_file(&input, &output))
            .await
            .map_err(|e| PipelineError::Image {
                path,
                message: format!("Task join error: {e}"),
            })?
    }
}
