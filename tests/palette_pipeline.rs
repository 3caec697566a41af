use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{ImageBuffer, Rgba, RgbaImage};
use image_to_colormap_wasm::{
    PaletteError, PixelSet, PrepareOptions, ResizeTarget, extract, load_source, prepare,
    search_optimal,
};

const SUNSET: [[u8; 3]; 5] = [
    [20, 20, 20],
    [235, 235, 235],
    [235, 20, 20],
    [20, 235, 20],
    [20, 20, 235],
];

/// Five 40x40 blocks of well separated colors with a little deterministic noise.
fn five_blocks() -> RgbaImage {
    ImageBuffer::from_fn(200, 40, |x, y| {
        let [r, g, b] = SUNSET[(x / 40) as usize];
        let jitter = |seed: u32| ((x * 7 + y * 13 + seed) % 13) as i16 - 6;
        let ch = |v: u8, seed: u32| (v as i16 + jitter(seed)).clamp(0, 255) as u8;
        Rgba([ch(r, 1), ch(g, 5), ch(b, 11), 255])
    })
}

/// A fresh directory per call; tests run concurrently.
fn scratch_dir() -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let dir = std::env::temp_dir().join(format!(
        "img2colormap-tests-{}-{}",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn save(img: &RgbaImage, file: &str) -> String {
    let path = scratch_dir().join(file);
    img.save(&path).unwrap();
    path.to_string_lossy().into_owned()
}

fn pixels_of(img: RgbaImage) -> PixelSet {
    let path = save(&img, "fixture.png");
    prepare(&load_source(&path, None).unwrap(), &PrepareOptions::default())
}

#[test]
fn palette_has_requested_size_and_matching_hex() {
    let pixels = pixels_of(five_blocks());
    for n in 1..=6 {
        let palette = extract(&pixels, n, Some("miami"), Some(42)).unwrap().palette;
        assert_eq!(palette.len(), n as usize);
        assert_eq!(palette.name(), "miami");
        let hex = palette.hex_codes();
        assert_eq!(hex.len(), n as usize);
        for (c, h) in palette.colors().iter().zip(&hex) {
            assert_eq!(&c.hex(), h);
            assert_eq!(h.len(), 7);
            assert!(h.starts_with('#'));
        }
    }
}

#[test]
fn no_channel_on_the_boundary() {
    let img = ImageBuffer::from_fn(20, 20, |x, _| {
        if x < 10 { Rgba([0, 0, 0, 255]) } else { Rgba([255, 255, 255, 255]) }
    });
    let palette = extract(&pixels_of(img), 2, None, Some(42)).unwrap().palette;
    for c in palette.colors() {
        assert!(c.channels().iter().all(|&v| v > 0.0 && v < 1.0), "{c:?}");
    }
    assert_eq!(palette.hex_codes(), ["#000000", "#ffffff"]);
}

#[test]
fn negative_color_count_is_rejected() {
    let err = extract(&pixels_of(five_blocks()), -100, Some("miami"), Some(42)).unwrap_err();
    assert!(matches!(err, PaletteError::InvalidParameter(_)));
}

#[test]
fn fixed_seed_is_reproducible() {
    let pixels = pixels_of(five_blocks());
    let a = extract(&pixels, 4, None, Some(42)).unwrap();
    let b = extract(&pixels, 4, None, Some(42)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn default_name_is_file_stem() {
    let path = save(&five_blocks(), "south_beach_sunset.png");
    let pixels = prepare(&load_source(&path, None).unwrap(), &PrepareOptions::default());
    let palette = extract(&pixels, 4, None, Some(42)).unwrap().palette;
    assert_eq!(palette.name(), "south_beach_sunset");
}

#[test]
fn default_resize_fits_512_box() {
    let img = RgbaImage::from_pixel(1000, 705, Rgba([90, 120, 200, 255]));
    let path = save(&img, "wide.png");
    let opts = PrepareOptions { resize: Some(ResizeTarget::DefaultMax), remove_transparent: false };
    let pixels = prepare(&load_source(&path, None).unwrap(), &opts);
    assert_eq!((pixels.width, pixels.height), (512, 361));
}

#[test]
fn transparent_pixels_are_removed() {
    let img = ImageBuffer::from_fn(30, 30, |x, y| {
        if (x + y) % 3 == 0 { Rgba([0, 0, 0, 0]) } else { Rgba([200, 100, 50, 255]) }
    });
    let path = save(&img, "logo.png");
    let source = load_source(&path, None).unwrap();

    let all = prepare(&source, &PrepareOptions::default());
    let opaque = prepare(&source, &PrepareOptions { resize: None, remove_transparent: true });
    assert!(opaque.len() < all.len());
    assert_eq!(opaque.len(), 600);
    assert_eq!(opaque.name, "logo");
}

#[test]
fn fully_transparent_image_has_nothing_to_cluster() {
    let img = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 0]));
    let path = save(&img, "ghost.png");
    let pixels = prepare(
        &load_source(&path, None).unwrap(),
        &PrepareOptions { resize: Some(ResizeTarget::DefaultMax), remove_transparent: true },
    );
    let err = extract(&pixels, 3, None, Some(42)).unwrap_err();
    assert!(matches!(err, PaletteError::InsufficientData));
}

#[test]
fn missing_file_is_source_not_found() {
    let err = load_source("tests/images/does_not_exist.jpg", None).unwrap_err();
    assert!(matches!(err, PaletteError::SourceNotFound { .. }));
}

#[test]
fn optimal_search_finds_five_blocks() {
    let pixels = pixels_of(five_blocks());
    let search = search_optimal(&pixels, 10, None, Some(42)).unwrap();

    assert_eq!(search.palettes.len(), 9);
    assert_eq!(search.best_k, Some(5));
    let best = search.best_palette().unwrap();
    assert_eq!(best.len(), 5);
    assert_eq!(best.name(), "fixture");
}

#[test]
fn inertia_shrinks_as_palettes_grow() {
    let pixels = pixels_of(five_blocks());
    let search = search_optimal(&pixels, 8, None, Some(42)).unwrap();
    let values: Vec<f64> = search.inertia.values().copied().collect();
    for pair in values.windows(2) {
        assert!(pair[1] <= pair[0] * 1.25 + 1.0, "inertia rose: {values:?}");
    }
    assert!(values[values.len() - 1] < values[0]);
}
