//! Turn images into small, hue-ordered color palettes (colormaps).
//!
//! The pipeline:
//! 1. [`load_source`] reads a local file or URL into RGBA pixels.
//! 2. [`prepare`] optionally downsizes and drops fully transparent pixels.
//! 3. [`Extractor::extract`] clusters the pixels with k-means and orders
//!    the centroids by hue.
//! 4. [`Extractor::search_optimal`] repeats step 3 for a range of sizes and
//!    picks the elbow of the inertia curve.
//!
//! ```no_run
//! use image_to_colormap_wasm::{PrepareOptions, ResizeTarget, extract, load_source, prepare};
//!
//! let source = load_source("south_beach_sunset.jpg", None)?;
//! let pixels = prepare(&source, &PrepareOptions {
//!     resize: Some(ResizeTarget::DefaultMax),
//!     remove_transparent: false,
//! });
//! let palette = extract(&pixels, 5, None, Some(42))?.palette;
//! println!("{}: {:?}", palette.name(), palette.hex_codes());
//! # Ok::<(), image_to_colormap_wasm::PaletteError>(())
//! ```

pub mod color;
pub mod error;
pub mod extract;
pub mod knee;
pub mod optimal;
pub mod preprocess;
pub mod progress;
pub mod source;
pub mod wasm;

pub use crate::color::Color;
pub use crate::error::{PaletteError, Result};
pub use crate::extract::{Extraction, Extractor, KmeansConfig, MAX_COLORS, Palette};
pub use crate::optimal::OptimalSearch;
pub use crate::preprocess::{DEFAULT_RESIZE_MAX, PixelSet, PrepareOptions, ResizeTarget, prepare};
pub use crate::progress::{LogSink, ProgressEvent, ProgressSink, SilentSink};
#[cfg(feature = "remote")]
pub use crate::source::HttpFetcher;
pub use crate::source::{Fetch, SourceImage, load_source, load_source_bytes};

/// [`Extractor::extract`] with the default k-means settings and no progress output.
pub fn extract(
    pixels: &PixelSet,
    n_colors: i64,
    name: Option<&str>,
    seed: Option<u64>,
) -> Result<Extraction> {
    Extractor::new(KmeansConfig::default(), &SilentSink).extract(pixels, n_colors, name, seed)
}

/// [`Extractor::search_optimal`] with the default k-means settings and no progress output.
pub fn search_optimal(
    pixels: &PixelSet,
    max_colors: usize,
    name: Option<&str>,
    seed: Option<u64>,
) -> Result<OptimalSearch> {
    Extractor::new(KmeansConfig::default(), &SilentSink).search_optimal(pixels, max_colors, name, seed)
}
