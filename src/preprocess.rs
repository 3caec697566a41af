//! Turning a decoded image into the RGB pixel set fed to clustering.

use image::{ImageBuffer, Rgba, Rgba32FImage, RgbaImage, imageops::{self, FilterType}};

use crate::source::SourceImage;

/// Bounding box used by [`ResizeTarget::DefaultMax`].
pub const DEFAULT_RESIZE_MAX: (u32, u32) = (512, 512);

const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizeTarget {
    /// Fit inside [`DEFAULT_RESIZE_MAX`].
    DefaultMax,
    /// Fit inside `width × height`.
    Max { width: u32, height: u32 },
}

impl ResizeTarget {
    pub fn bounds(self) -> (u32, u32) {
        match self {
            ResizeTarget::DefaultMax => DEFAULT_RESIZE_MAX,
            ResizeTarget::Max { width, height } => (width.max(1), height.max(1)),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrepareOptions {
    pub resize: Option<ResizeTarget>,
    pub remove_transparent: bool,
}

/// RGB pixels ready for clustering.
///
/// `width`/`height` describe the grid the pixels were taken from; after
/// transparency filtering `pixels.len()` can be smaller than their product.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelSet {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<[u8; 3]>,
}

impl PixelSet {
    /// Wrap an already-flat pixel list. The grid is recorded as one row.
    pub fn from_rgb(name: impl Into<String>, pixels: Vec<[u8; 3]>) -> Self {
        Self {
            name: name.into(),
            width: row_width(pixels.len()),
            height: 1,
            pixels,
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// Pixel count as a row width, saturating at `u32::MAX`.
fn row_width(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

/// Size that fits `width × height` inside `max_w × max_h` without changing
/// the aspect ratio. Never upscales.
///
/// The scaled edge is rounded down or up, whichever keeps the aspect ratio
/// closer to the original.
pub fn thumbnail_size(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width == 0 || height == 0 || (max_w >= width && max_h >= height) {
        return (width, height);
    }

    let aspect = width as f64 / height as f64;
    let pick = |exact: f64, error: &dyn Fn(f64) -> f64| -> u32 {
        let (lo, hi) = (exact.floor(), exact.ceil());
        let best = if error(hi) < error(lo) { hi } else { lo };
        best.max(1.0) as u32
    };

    if max_w as f64 / max_h as f64 >= aspect {
        let y = max_h as f64;
        let w = pick(y * aspect, &|n| (aspect - n / y).abs());
        (w, max_h)
    } else {
        let x = max_w as f64;
        let h = pick(x / aspect, &|n| if n == 0.0 { 0.0 } else { (aspect - x / n).abs() });
        (max_w, h)
    }
}

/// Drop pixels whose alpha is exactly zero, keeping order.
pub fn filter_transparent(pixels: &[[u8; 4]]) -> Vec<[u8; 4]> {
    pixels.iter().copied().filter(|p| p[3] != 0).collect()
}

fn rgba_pixels(img: &RgbaImage) -> Vec<[u8; 4]> {
    img.pixels().map(|p| p.0).collect()
}

// ------------------------------------------------------------
// Resampling
// ------------------------------------------------------------

/// Resample in premultiplied alpha so fully transparent pixels lend no
/// color to their neighbours. Pixels whose alpha rounds to zero come back
/// as `[0, 0, 0, 0]`.
fn resize_premultiplied(img: &RgbaImage, out_w: u32, out_h: u32) -> RgbaImage {
    let premultiplied: Rgba32FImage = ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        let [r, g, b, a] = img.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        Rgba([
            r as f32 / 255.0 * alpha,
            g as f32 / 255.0 * alpha,
            b as f32 / 255.0 * alpha,
            alpha,
        ])
    });

    let resized = imageops::resize(&premultiplied, out_w, out_h, RESIZE_FILTER);

    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    ImageBuffer::from_fn(out_w, out_h, |x, y| {
        let [r, g, b, a] = resized.get_pixel(x, y).0;
        let alpha = a.clamp(0.0, 1.0);
        let alpha8 = to_u8(alpha);
        if alpha8 == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([to_u8(r / alpha), to_u8(g / alpha), to_u8(b / alpha), alpha8])
        }
    })
}

/// Apply the optional resize and transparency filter, then drop alpha.
///
/// Transparency is settled before resampling: when both are requested the
/// image is resized in premultiplied alpha and pixels left fully
/// transparent are discarded afterwards.
pub fn prepare(source: &SourceImage, options: &PrepareOptions) -> PixelSet {
    let (orig_w, orig_h) = source.image.dimensions();
    let (out_w, out_h) = match options.resize {
        Some(target) => {
            let (max_w, max_h) = target.bounds();
            thumbnail_size(orig_w, orig_h, max_w, max_h)
        }
        None => (orig_w, orig_h),
    };
    let needs_resize = (out_w, out_h) != (orig_w, orig_h);

    let rgba = match (needs_resize, options.remove_transparent) {
        (false, false) => rgba_pixels(&source.image),
        (false, true) => filter_transparent(&rgba_pixels(&source.image)),
        (true, false) => rgba_pixels(&imageops::resize(&source.image, out_w, out_h, RESIZE_FILTER)),
        (true, true) => {
            filter_transparent(&rgba_pixels(&resize_premultiplied(&source.image, out_w, out_h)))
        }
    };

    PixelSet {
        name: source.name.clone(),
        width: out_w,
        height: out_h,
        pixels: rgba.into_iter().map(|[r, g, b, _]| [r, g, b]).collect(),
    }
}
