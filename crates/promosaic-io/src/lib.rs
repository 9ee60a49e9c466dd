#![warn(missing_docs)]
//! # promosaic-io
//!
//! ## Purpose
//! Provides the source-image and persistence boundaries of the engine.
//!
//! ## Responsibilities
//! - Define backend-agnostic [`SourceImageProvider`] and [`PersistenceSink`]
//!   traits.
//! - Decode real image files and encode JPEG output through `image`.
//! - Expose deterministic synthetic/in-memory doubles for tests and CI.
//! - Derive the default `<stem>_mosaic.<ext>` output path.
//!
//! ## Data flow
//! Session asks a provider for `(width, height)` then a decoded
//! [`PixelBuffer`]. On save, the flattened buffer goes to a sink.
//!
//! ## Ownership and lifetimes
//! Decoded buffers are owned values; sinks only borrow the buffer they encode.
//!
//! ## Error model
//! Missing files, zero dimensions, and decode failures are [`SourceError`].
//! Unwritable targets and encode/write failures are [`PersistError`].
//!
//! ## Durability notes
//! [`JpegFileSink`] encodes fully in memory, writes a sibling
//! [`NamedTempFile`], and persists it over the target. A failure leaves no partial output behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;

use image::ImageReader;
use image::codecs::jpeg::JpegEncoder;
use promosaic_core::{CoreError, PixelBuffer};
use thiserror::Error;

/// JPEG quality used for saved output.
pub const OUTPUT_JPEG_QUALITY: u8 = 100;

/// Suffix appended to the input stem for the default output path.
pub const OUTPUT_STEM_SUFFIX: &str = "_mosaic";

/// Image dimensions reported by a bounds-only probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Trait implemented by source image decoders.
pub trait SourceImageProvider {
    /// Reads image dimensions without a full decode.
    ///
    /// # Errors
    /// Returns [`SourceError::NotFound`] for missing files and
    /// [`SourceError::Decode`] when the header cannot be read.
    fn probe_size(&self, path: &Path) -> Result<ImageSize, SourceError>;

    /// Fully decodes the image into ARGB32 pixels.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the file is missing or undecodable.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, SourceError>;
}

/// Trait implemented by output encoders.
pub trait PersistenceSink {
    /// Checks that `path` can be written before any encoding starts.
    ///
    /// # Errors
    /// Returns [`PersistError::Unwritable`] for rejected targets.
    fn preflight(&self, _path: &Path) -> Result<(), PersistError> {
        Ok(())
    }

    /// Encodes `image` to `path`.
    ///
    /// # Errors
    /// Returns [`PersistError`] when encoding or writing fails. Implementations
    /// must not leave partial output on failure.
    fn persist(&self, image: &PixelBuffer, path: &Path) -> Result<(), PersistError>;
}

/// File-backed provider decoding any format enabled in `image`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileProvider;

impl SourceImageProvider for ImageFileProvider {
    fn probe_size(&self, path: &Path) -> Result<ImageSize, SourceError> {
        ensure_exists(path)?;
        let (width, height) = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|error| SourceError::Decode(format!("{}: {error}", path.display())))?
            .into_dimensions()
            .map_err(|error| SourceError::Decode(format!("{}: {error}", path.display())))?;
        Ok(ImageSize { width, height })
    }

    fn decode(&self, path: &Path) -> Result<PixelBuffer, SourceError> {
        ensure_exists(path)?;
        let decoded = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|error| SourceError::Decode(format!("{}: {error}", path.display())))?
            .decode()
            .map_err(|error| SourceError::Decode(format!("{}: {error}", path.display())))?
            .to_rgba8();

        let (width, height) = decoded.dimensions();
        log::debug!(
            "stage=source action=decoded path={} size={width}x{height}",
            path.display()
        );
        Ok(PixelBuffer::from_rgba_bytes(width, height, decoded.as_raw())?)
    }
}

/// Deterministic in-memory provider for test and CI usage.
///
/// Every path resolves to the same image, except paths listed as missing.
#[derive(Debug, Clone)]
pub struct SyntheticSourceProvider {
    image: PixelBuffer,
    missing: Vec<PathBuf>,
}

impl SyntheticSourceProvider {
    /// Creates a provider serving `image` for every path.
    pub fn new(image: PixelBuffer) -> Self {
        Self {
            image,
            missing: Vec::new(),
        }
    }

    /// Marks `path` as missing.
    pub fn with_missing(mut self, path: impl Into<PathBuf>) -> Self {
        self.missing.push(path.into());
        self
    }

    fn check(&self, path: &Path) -> Result<(), SourceError> {
        if self.missing.iter().any(|missing| missing == path) {
            return Err(SourceError::NotFound(path.to_path_buf()));
        }
        Ok(())
    }
}

impl SourceImageProvider for SyntheticSourceProvider {
    fn probe_size(&self, path: &Path) -> Result<ImageSize, SourceError> {
        self.check(path)?;
        Ok(ImageSize {
            width: self.image.width(),
            height: self.image.height(),
        })
    }

    fn decode(&self, path: &Path) -> Result<PixelBuffer, SourceError> {
        self.check(path)?;
        Ok(self.image.clone())
    }
}

/// Atomic JPEG file writer.
#[derive(Debug, Clone, Copy)]
pub struct JpegFileSink {
    quality: u8,
}

impl JpegFileSink {
    /// Creates a sink encoding at `quality` (1-100).
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegFileSink {
    fn default() -> Self {
        Self::new(OUTPUT_JPEG_QUALITY)
    }
}

impl PersistenceSink for JpegFileSink {
    fn preflight(&self, path: &Path) -> Result<(), PersistError> {
        check_output_writable(path)
    }

    fn persist(&self, image: &PixelBuffer, path: &Path) -> Result<(), PersistError> {
        self.preflight(path)?;
        if image.is_empty() {
            return Err(PersistError::Encode("image has no pixels".to_string()));
        }

        let mut jpeg_bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg_bytes, self.quality)
            .encode(
                &image.to_rgb_bytes(),
                image.width(),
                image.height(),
                image::ColorType::Rgb8.into(),
            )
            .map_err(|error| PersistError::Encode(error.to_string()))?;

        write_atomically(path, &jpeg_bytes)?;
        log::info!(
            "stage=persist action=written path={} bytes={}",
            path.display(),
            jpeg_bytes.len()
        );
        Ok(())
    }
}

/// In-memory sink recording every persisted buffer, for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(PathBuf, PixelBuffer)>>,
    fail: bool,
}

impl MemorySink {
    /// Creates a sink that accepts every write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that rejects every write.
    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Snapshot of every accepted write, in order.
    ///
    /// # Errors
    /// Returns [`PersistError::Encode`] when a writer panicked while holding
    /// the record lock.
    pub fn saved(&self) -> Result<Vec<(PathBuf, PixelBuffer)>, PersistError> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .map_err(|_| PersistError::Encode("memory sink lock poisoned".to_string()))
    }
}

impl PersistenceSink for MemorySink {
    fn persist(&self, image: &PixelBuffer, path: &Path) -> Result<(), PersistError> {
        if self.fail {
            return Err(PersistError::Write {
                path: path.to_path_buf(),
                reason: "memory sink configured to fail".to_string(),
            });
        }

        let mut saved = self
            .saved
            .lock()
            .map_err(|_| PersistError::Encode("memory sink lock poisoned".to_string()))?;
        saved.push((path.to_path_buf(), image.clone()));
        Ok(())
    }
}

/// Derives `<dir>/<stem>_mosaic.<ext>` from an input path.
///
/// Inputs without an extension get the suffix appended to the whole name.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(extension) => format!(
            "{stem}{OUTPUT_STEM_SUFFIX}.{}",
            extension.to_string_lossy()
        ),
        None => format!("{stem}{OUTPUT_STEM_SUFFIX}"),
    };
    input.with_file_name(file_name)
}

/// Pre-flight check that `path` can be written.
///
/// # Errors
/// Returns [`PersistError::Unwritable`] when the parent directory is missing,
/// is not a directory, or the target itself is a directory.
pub fn check_output_writable(path: &Path) -> Result<(), PersistError> {
    let unwritable = |reason: &str| PersistError::Unwritable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if path.file_name().is_none() {
        return Err(unwritable("path has no file name"));
    }
    if path.is_dir() {
        return Err(unwritable("target is a directory"));
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match fs::metadata(parent) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Err(unwritable("parent is not a directory")),
        Err(_) => return Err(unwritable("parent directory does not exist")),
    }

    let readonly = fs::metadata(parent)
        .map(|metadata| metadata.permissions().readonly())
        .unwrap_or(false);
    if readonly {
        return Err(unwritable("parent directory is read-only"));
    }

    Ok(())
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    let write_error = |reason: String| PersistError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut staging =
        NamedTempFile::new_in(parent).map_err(|error| write_error(error.to_string()))?;
    staging
        .write_all(bytes)
        .and_then(|()| staging.as_file().sync_all())
        .map_err(|error| write_error(error.to_string()))?;
    staging
        .persist(path)
        .map_err(|error| write_error(error.error.to_string()))?;
    Ok(())
}

fn ensure_exists(path: &Path) -> Result<(), SourceError> {
    if !path.is_file() {
        return Err(SourceError::NotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Source loading error type.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File does not exist or is not a regular file.
    #[error("source image not found: {}", .0.display())]
    NotFound(PathBuf),
    /// Header or pixel data could not be decoded.
    #[error("source image decode failure: {0}")]
    Decode(String),
    /// Image reports zero width or height.
    #[error("source image has empty dimensions {width}x{height}")]
    EmptyDimensions {
        /// Reported width.
        width: u32,
        /// Reported height.
        height: u32,
    },
    /// Decoded pixels did not match the reported geometry.
    #[error("source image shape error: {0}")]
    Shape(#[from] CoreError),
}

/// Output persistence error type.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Pre-flight check rejected the target path.
    #[error("output path {} is not writable: {reason}", path.display())]
    Unwritable {
        /// Rejected target.
        path: PathBuf,
        /// Why the target was rejected.
        reason: String,
    },
    /// Encoder failure; nothing was written.
    #[error("output encode failure: {0}")]
    Encode(String),
    /// I/O failure while writing; no partial file remains.
    #[error("output write failure for {}: {reason}", path.display())]
    Write {
        /// Target path.
        path: PathBuf,
        /// Underlying I/O error text.
        reason: String,
    },
}
