use kmeans_colors::get_kmeans;
use palette::Srgb;

use crate::color::{Color, sort_by_hue};
use crate::error::{PaletteError, Result};
use crate::preprocess::PixelSet;
use crate::progress::{ProgressEvent, ProgressSink};

/// Largest palette the clustering step can label (cluster indices are `u8`).
pub const MAX_COLORS: usize = u8::MAX as usize;

/// Tuning for the k-means run behind every extraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KmeansConfig {
    /// Upper bound on Lloyd iterations.
    pub max_iter: usize,
    /// Stop once centroids move less than this between iterations.
    pub converge: f32,
}

impl Default for KmeansConfig {
    fn default() -> Self {
        Self { max_iter: 100, converge: 1e-4 }
    }
}

/// An ordered, named set of representative colors.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    name: String,
    colors: Vec<Color>,
}

impl Palette {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Colors in ascending hue order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Number of colors; always the requested cluster count.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// `#rrggbb` for every color, in palette order.
    pub fn hex_codes(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.hex()).collect()
    }

    /// Same colors back to front, named with an `_r` suffix.
    pub fn reversed(&self) -> Palette {
        Palette {
            name: format!("{}_r", self.name),
            colors: self.colors.iter().rev().copied().collect(),
        }
    }
}

/// One clustering run: the palette and how tightly it fits the pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Extraction {
    pub palette: Palette,
    /// Sum of squared distances (8-bit channel units) from each pixel to
    /// its nearest palette centroid.
    pub inertia: f64,
}

/// Runs palette extraction with a fixed configuration and progress sink.
#[derive(Clone, Copy)]
pub struct Extractor<'s> {
    config: KmeansConfig,
    sink: &'s dyn ProgressSink,
}

impl<'s> Extractor<'s> {
    pub fn new(config: KmeansConfig, sink: &'s dyn ProgressSink) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> KmeansConfig {
        self.config
    }

    pub(crate) fn sink(&self) -> &'s dyn ProgressSink {
        self.sink
    }

    /// Cluster `pixels` into `n_colors` colors.
    ///
    /// Steps performed:
    /// 1. k-means (k-means++ initialization) over the pixels in sRGB, seeded
    ///    with `seed` or with fresh entropy when `None`.
    /// 2. Centroids, already scaled to `[0, 1]`, are sorted by HSV hue
    ///    (then saturation, then value).
    /// 3. Channels at `0.0`/`1.0` are nudged inside by
    ///    [`BOUNDARY_EPSILON`](crate::color::BOUNDARY_EPSILON).
    ///
    /// The palette is named `name` when given (even if empty), otherwise
    /// after the pixel set's source.
    pub fn extract(
        &self,
        pixels: &PixelSet,
        n_colors: i64,
        name: Option<&str>,
        seed: Option<u64>,
    ) -> Result<Extraction> {
        let k = validate_n_colors(n_colors, pixels.len())?;
        let seed = seed.unwrap_or_else(fresh_seed);

        self.sink.emit(&ProgressEvent::ClusteringStarted { n_colors: k });

        let buf: Vec<Srgb<f32>> = pixels
            .pixels
            .iter()
            .map(|&[r, g, b]| Srgb::<u8>::new(r, g, b).into_format())
            .collect();
        let mut centroids =
            get_kmeans(k, self.config.max_iter, self.config.converge, false, &buf, seed).centroids;
        let inertia = inertia(&buf, &centroids);
        pad_centroids(&mut centroids, k);

        let mut colors: Vec<Color> = centroids
            .iter()
            .map(|c| Color::new(c.red as f64, c.green as f64, c.blue as f64))
            .collect();
        sort_by_hue(&mut colors);
        let colors = colors.into_iter().map(Color::clamp_boundary).collect();

        self.sink.emit(&ProgressEvent::ClusteringFinished { n_colors: k, inertia });

        Ok(Extraction {
            palette: Palette {
                name: name.map_or_else(|| pixels.name.clone(), str::to_owned),
                colors,
            },
            inertia,
        })
    }
}

fn validate_n_colors(n_colors: i64, available: usize) -> Result<usize> {
    if n_colors <= 0 {
        return Err(PaletteError::InvalidParameter(format!(
            "number of colors must be positive, got {n_colors}"
        )));
    }
    if available == 0 {
        return Err(PaletteError::InsufficientData);
    }
    if n_colors > MAX_COLORS as i64 {
        return Err(PaletteError::InvalidParameter(format!(
            "number of colors must be at most {MAX_COLORS}, got {n_colors}"
        )));
    }
    let k = n_colors as usize;
    if k > available {
        return Err(PaletteError::InvalidParameter(format!(
            "cannot form {k} colors from {available} pixels"
        )));
    }
    Ok(k)
}

/// Seed used when the platform has no entropy source.
const FALLBACK_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

fn fresh_seed() -> u64 {
    seed_or_fallback(getrandom::u64())
}

fn seed_or_fallback(seed: std::result::Result<u64, getrandom::Error>) -> u64 {
    seed.unwrap_or_else(|e| {
        log::warn!("no entropy source ({e}); unseeded palettes will repeat");
        FALLBACK_SEED
    })
}

/// k-means++ stops placing centroids once every pixel sits on one, so
/// low-variety input comes back short. Repeat existing centroids up to `k`.
fn pad_centroids(centroids: &mut Vec<Srgb<f32>>, k: usize) {
    let found = centroids.len();
    if found == 0 {
        return;
    }
    for i in found..k {
        let repeat = centroids[i % found];
        centroids.push(repeat);
    }
}

/// Sum of squared distances to the nearest centroid, in 0-255 channel units.
fn inertia(buf: &[Srgb<f32>], centroids: &[Srgb<f32>]) -> f64 {
    const SCALE: f64 = 255.0 * 255.0;
    buf.iter()
        .map(|p| {
            centroids
                .iter()
                .map(|c| {
                    let dr = (p.red - c.red) as f64;
                    let dg = (p.green - c.green) as f64;
                    let db = (p.blue - c.blue) as f64;
                    dr * dr + dg * dg + db * db
                })
                .fold(f64::INFINITY, f64::min)
        })
        .sum::<f64>()
        * SCALE
}
