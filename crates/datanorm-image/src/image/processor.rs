// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, flatten to RGB, resize by policy, and encode as
// JPEG. Decoding and resizing use the `image` crate; encoding goes through
// `jpeg-encoder` for its optimized Huffman tables.

use std::path::Path;

use datanorm_core::error::DatanormError;
use datanorm_core::types::{Dimensions, ResizePolicy};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use jpeg_encoder::{ColorType as JpegColorType, Encoder};
use tracing::{debug, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Each transformation consumes `self` and returns a new `ImageProcessor`
/// wrapping the result, so steps chain:
///
/// ```ignore
/// let jpeg = ImageProcessor::open("leaf.png")?
///     .to_rgb()
///     .fit_within(600)
///     .to_jpeg_bytes(70)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// The format is sniffed from the file contents, falling back to the
    /// extension, so a PNG saved as `.jpg` still decodes.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatanormError> {
        let path = path.as_ref();
        let img = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|err| {
                DatanormError::Image(format!("failed to open {}: {}", path.display(), err))
            })?
            .decode()
            .map_err(|err| {
                DatanormError::Image(format!("failed to decode {}: {}", path.display(), err))
            })?;
        debug!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Flatten to 8-bit, 3-channel RGB.
    ///
    /// Alpha is discarded, not composited; grayscale and 16-bit images are
    /// expanded or narrowed to RGB8.
    pub fn to_rgb(self) -> Self {
        match self.image {
            DynamicImage::ImageRgb8(_) => self,
            other => Self {
                image: DynamicImage::ImageRgb8(other.to_rgb8()),
            },
        }
    }

    /// Downscale so neither side exceeds `max_side`, preserving aspect ratio.
    /// Images already within the bound are returned untouched.
    #[instrument(skip(self), fields(max_side))]
    pub fn fit_within(self, max_side: u32) -> Self {
        if self.image.width() <= max_side && self.image.height() <= max_side {
            return self;
        }
        let resized = self.image.resize(max_side, max_side, FilterType::Lanczos3);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Bounded resize complete"
        );
        Self { image: resized }
    }

    /// Resize the image to exactly `width` x `height`, ignoring aspect ratio.
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        if self.image.width() == width && self.image.height() == height {
            return self;
        }
        let resized = self
            .image
            .resize_exact(width, height, FilterType::Lanczos3);
        Self { image: resized }
    }

    /// Apply a [`ResizePolicy`].
    pub fn resize(self, policy: ResizePolicy) -> Self {
        match policy {
            ResizePolicy::Bounded { max_side } => self.fit_within(max_side),
            ResizePolicy::Exact { width, height } => self.resize_exact(width, height),
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// Huffman tables are optimized for the image, trading a second pass for
    /// a smaller file at identical pixel quality.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, DatanormError> {
        self.encode_jpeg(quality, true)
    }

    fn encode_jpeg(&self, quality: u8, optimize: bool) -> Result<Vec<u8>, DatanormError> {
        let rgb = self.image.to_rgb8();
        let (width, height) = match (u16::try_from(rgb.width()), u16::try_from(rgb.height())) {
            (Ok(w), Ok(h)) => (w, h),
            _ => {
                return Err(DatanormError::Image(format!(
                    "{}x{} exceeds the JPEG size limit of 65535 pixels per side",
                    rgb.width(),
                    rgb.height()
                )));
            }
        };

        let mut buffer = Vec::new();
        let mut encoder = Encoder::new(&mut buffer, quality);
        encoder.set_optimized_huffman_tables(optimize);
        encoder
            .encode(rgb.as_raw(), width, height, JpegColorType::Rgb)
            .map_err(|err| DatanormError::Image(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }
}
