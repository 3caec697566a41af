//! Browser entry points.

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::extract::{Extractor, KmeansConfig, Palette};
use crate::preprocess::{PrepareOptions, ResizeTarget, prepare};
use crate::progress::SilentSink;
use crate::source::load_source_bytes;

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn hex_array(palette: &Palette) -> Array {
    let arr = Array::new();
    for hex in palette.hex_codes() {
        arr.push(&JsValue::from_str(&hex));
    }
    arr
}

fn options(remove_transparent: bool, resize: bool) -> PrepareOptions {
    PrepareOptions {
        resize: resize.then_some(ResizeTarget::DefaultMax),
        remove_transparent,
    }
}

/// Extract a palette from encoded image bytes.
///
/// Returns `{ name, hex: string[], contrast: string[] }`. The palette is
/// unnamed unless `name` is given, since uploads carry no file name.
#[wasm_bindgen]
pub fn extract_palette(
    input: Vec<u8>,
    n_colors: i32,
    name: Option<String>,
    remove_transparent: bool,
    resize: bool,
    seed: Option<u64>,
) -> Result<Object, JsValue> {
    let source = load_source_bytes(&input, "").map_err(js_err)?;
    let pixels = prepare(&source, &options(remove_transparent, resize));

    let extraction = Extractor::new(KmeansConfig::default(), &SilentSink)
        .extract(&pixels, n_colors as i64, name.as_deref(), seed)
        .map_err(js_err)?;
    let palette = extraction.palette;

    let contrast = Array::new();
    for c in palette.colors() {
        contrast.push(&JsValue::from_str(c.contrast_text()));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("name"), &JsValue::from_str(palette.name()))?;
    Reflect::set(&result, &JsValue::from_str("hex"), &hex_array(&palette))?;
    Reflect::set(&result, &JsValue::from_str("contrast"), &contrast)?;
    Ok(result)
}

/// Search palette sizes 2..=`max_colors` for the elbow.
///
/// Returns `{ best: number | null, palettes: { [k]: string[] }, inertia: { [k]: number } }`.
#[wasm_bindgen]
pub fn optimal_palette(
    input: Vec<u8>,
    max_colors: u32,
    remove_transparent: bool,
    resize: bool,
    seed: Option<u64>,
) -> Result<Object, JsValue> {
    let source = load_source_bytes(&input, "").map_err(js_err)?;
    let pixels = prepare(&source, &options(remove_transparent, resize));

    let search = Extractor::new(KmeansConfig::default(), &SilentSink)
        .search_optimal(&pixels, max_colors as usize, Some(""), seed)
        .map_err(js_err)?;

    let palettes = Object::new();
    for (k, palette) in &search.palettes {
        Reflect::set(&palettes, &JsValue::from(*k as u32), &hex_array(palette))?;
    }
    let inertia = Object::new();
    for (k, v) in &search.inertia {
        Reflect::set(&inertia, &JsValue::from(*k as u32), &JsValue::from_f64(*v))?;
    }
    let best = search
        .best_k
        .map_or(JsValue::NULL, |k| JsValue::from(k as u32));

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("best"), &best)?;
    Reflect::set(&result, &JsValue::from_str("palettes"), &palettes)?;
    Reflect::set(&result, &JsValue::from_str("inertia"), &inertia)?;
    Ok(result)
}
