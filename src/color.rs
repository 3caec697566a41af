use palette::{FromColor, Hsv, LinSrgb, Srgb};

/// Offset used to keep channels away from the exact gamut boundary.
pub const BOUNDARY_EPSILON: f64 = 1e-6;

/// A normalized sRGB color, each channel in `[0, 1]`.
///
/// Colors coming out of [`extract`](crate::Extractor::extract) never hold an
/// exact `0.0` or `1.0`; see [`Color::clamp_boundary`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

#[inline]
fn is_close(value: f64, target: f64) -> bool {
    (value - target).abs() <= 1e-8 + 1e-5 * target.abs()
}

#[inline]
fn clamp_channel(value: f64) -> f64 {
    if is_close(value, 1.0) {
        1.0 - BOUNDARY_EPSILON
    } else if is_close(value, 0.0) {
        BOUNDARY_EPSILON
    } else {
        value
    }
}

impl Color {
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Scale 8-bit channel values into `[0, 1]`.
    pub fn from_rgb8([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0)
    }

    pub fn channels(self) -> [f64; 3] {
        [self.red, self.green, self.blue]
    }

    /// `(hue, saturation, value)` with hue in `[0, 1)`.
    pub fn hsv(self) -> (f64, f64, f64) {
        let hsv: Hsv<_, f64> = Hsv::from_color(Srgb::new(self.red, self.green, self.blue));
        let hue = hsv.hue.into_positive_degrees() / 360.0;
        // 360° wraps to 0 for nearly-red hues that round up.
        (if hue >= 1.0 { 0.0 } else { hue }, hsv.saturation, hsv.value)
    }

    /// Replace channels at (or within tolerance of) `0.0`/`1.0` with values
    /// [`BOUNDARY_EPSILON`] inside the range.
    pub fn clamp_boundary(self) -> Self {
        Self::new(
            clamp_channel(self.red),
            clamp_channel(self.green),
            clamp_channel(self.blue),
        )
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        self.channels()
            .map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Lowercase `#rrggbb`.
    pub fn hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Black or white, whichever reads better on top of this color.
    pub fn contrast_text(self) -> &'static str {
        let lin: LinSrgb<f64> = Srgb::new(self.red, self.green, self.blue).into_linear();
        let luminance = 0.2126 * lin.red + 0.7152 * lin.green + 0.0722 * lin.blue;
        if luminance > 0.179 { "#000000" } else { "#ffffff" }
    }
}

/// Ascending by hue, then saturation, then value.
pub(crate) fn sort_by_hue(colors: &mut [Color]) {
    colors.sort_by(|a, b| {
        let (ha, sa, va) = a.hsv();
        let (hb, sb, vb) = b.hsv();
        ha.total_cmp(&hb)
            .then(sa.total_cmp(&sb))
            .then(va.total_cmp(&vb))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_moves_boundary_channels_inside() {
        let c = Color::new(1.0, 0.0, 0.5).clamp_boundary();
        assert_eq!(c.red, 1.0 - BOUNDARY_EPSILON);
        assert_eq!(c.green, BOUNDARY_EPSILON);
        assert_eq!(c.blue, 0.5);

        let near = Color::new(0.999_999_999, 1e-9, 0.25).clamp_boundary();
        assert_eq!(near.red, 1.0 - BOUNDARY_EPSILON);
        assert_eq!(near.green, BOUNDARY_EPSILON);
    }

    #[test]
    fn hex_survives_clamp() {
        let white = Color::new(1.0, 1.0, 1.0).clamp_boundary();
        let black = Color::new(0.0, 0.0, 0.0).clamp_boundary();
        assert_eq!(white.hex(), "#ffffff");
        assert_eq!(black.hex(), "#000000");
        assert_eq!(Color::from_rgb8([255, 128, 0]).hex(), "#ff8000");
    }

    #[test]
    fn hue_order() {
        let mut colors = vec![
            Color::from_rgb8([0, 0, 255]),
            Color::from_rgb8([0, 255, 0]),
            Color::from_rgb8([255, 0, 0]),
            Color::from_rgb8([255, 255, 0]),
        ];
        sort_by_hue(&mut colors);
        let hex: Vec<_> = colors.iter().map(|c| c.hex()).collect();
        assert_eq!(hex, ["#ff0000", "#ffff00", "#00ff00", "#0000ff"]);
    }

    #[test]
    fn equal_hue_falls_back_to_saturation_then_value() {
        let mut colors = vec![
            Color::from_rgb8([255, 0, 0]),
            Color::from_rgb8([128, 0, 0]),
            Color::from_rgb8([255, 128, 128]),
        ];
        sort_by_hue(&mut colors);
        let hex: Vec<_> = colors.iter().map(|c| c.hex()).collect();
        assert_eq!(hex, ["#ff8080", "#800000", "#ff0000"]);
    }

    #[test]
    fn text_contrast() {
        assert_eq!(Color::from_rgb8([250, 250, 250]).contrast_text(), "#000000");
        assert_eq!(Color::from_rgb8([10, 10, 60]).contrast_text(), "#ffffff");
    }
}
