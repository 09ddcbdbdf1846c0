//! Color spaces used for triangle color averaging.

use palette::{FromColor, IntoColor, Lab, LinSrgb, Srgb};
use serde::{Deserialize, Serialize};

use crate::{PixelBuffer, Rgb};

/// Space in which pixel colors are averaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Plain sRGB channel averaging
    #[default]
    Rgb,
    /// CIELAB (D65) averaging, converted back to sRGB afterwards
    Lab,
}

impl std::str::FromStr for ColorSpace {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(ColorSpace::Rgb),
            "lab" | "cielab" => Ok(ColorSpace::Lab),
            _ => Err(format!("unknown color space '{}' (expected rgb or lab)", s)),
        }
    }
}

fn rgb_to_lab(rgb: [u8; 3]) -> [f32; 3] {
    let srgb: Srgb<f32> = Srgb::new(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    );
    let lab: Lab = Lab::from_color(srgb.into_linear());
    [lab.l, lab.a, lab.b]
}

fn lab_to_rgb(l: f64, a: f64, b: f64) -> Rgb {
    let lab = Lab::new(l as f32, a as f32, b as f32);
    let lin: LinSrgb<f32> = lab.into_color();
    let srgb: Srgb<f32> = Srgb::from_linear(lin);
    [
        unit_to_byte(srgb.red),
        unit_to_byte(srgb.green),
        unit_to_byte(srgb.blue),
    ]
}

#[inline]
fn unit_to_byte(v: f32) -> u8 {
    // NaN from extreme out-of-gamut input clamps to black
    if v.is_nan() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn mean_to_byte(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Per-pixel channel values in the averaging space.
///
/// Lab values are converted once per image so each pixel is converted a
/// single time no matter how many bounding boxes overlap it.
pub(crate) enum ChannelField<'a> {
    Rgb(&'a PixelBuffer),
    Lab { width: u32, values: Vec<[f32; 3]> },
}

impl<'a> ChannelField<'a> {
    pub(crate) fn new(image: &'a PixelBuffer, space: ColorSpace) -> Self {
        match space {
            ColorSpace::Rgb => ChannelField::Rgb(image),
            ColorSpace::Lab => ChannelField::Lab {
                width: image.width(),
                values: image
                    .as_raw()
                    .chunks_exact(4)
                    .map(|px| rgb_to_lab([px[0], px[1], px[2]]))
                    .collect(),
            },
        }
    }

    /// Channel triple at pixel `(x, y)`
    #[inline]
    pub(crate) fn channels(&self, x: u32, y: u32) -> [f64; 3] {
        match self {
            ChannelField::Rgb(image) => {
                let px = image.get_pixel(x, y);
                [px[0] as f64, px[1] as f64, px[2] as f64]
            }
            ChannelField::Lab { width, values } => {
                let v = values[y as usize * *width as usize + x as usize];
                [v[0] as f64, v[1] as f64, v[2] as f64]
            }
        }
    }

    /// Convert an averaged channel triple back to display bytes
    pub(crate) fn to_rgb(&self, mean: [f64; 3]) -> Rgb {
        match self {
            ChannelField::Rgb(_) => [
                mean_to_byte(mean[0]),
                mean_to_byte(mean[1]),
                mean_to_byte(mean[2]),
            ],
            ChannelField::Lab { .. } => lab_to_rgb(mean[0], mean[1], mean[2]),
        }
    }
}

/// Running channel sum over contained pixels
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ColorAccum {
    sums: [f64; 3],
    count: u32,
}

impl ColorAccum {
    #[inline]
    pub(crate) fn add(&mut self, channels: [f64; 3]) {
        self.sums[0] += channels[0];
        self.sums[1] += channels[1];
        self.sums[2] += channels[2];
        self.count += 1;
    }

    pub(crate) fn mean(&self) -> Option<[f64; 3]> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some([self.sums[0] / n, self.sums[1] / n, self.sums[2] / n])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(rgb: [u8; 3]) -> PixelBuffer {
        image::RgbaImage::from_pixel(4, 4, image::Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    #[test]
    fn test_parse_color_space() {
        assert_eq!("rgb".parse::<ColorSpace>(), Ok(ColorSpace::Rgb));
        assert_eq!("LAB".parse::<ColorSpace>(), Ok(ColorSpace::Lab));
        assert!("hsv".parse::<ColorSpace>().is_err());
    }

    #[test]
    fn test_rgb_mean_rounds() {
        let image = solid([0, 0, 0]);
        let field = ChannelField::new(&image, ColorSpace::Rgb);
        let mut acc = ColorAccum::default();
        acc.add([10.0, 0.0, 255.0]);
        acc.add([11.0, 1.0, 255.0]);
        let mean = acc.mean().unwrap();
        // 10.5 rounds up, 0.5 rounds up
        assert_eq!(field.to_rgb(mean), [11, 1, 255]);
    }

    #[test]
    fn test_empty_accum_has_no_mean() {
        assert!(ColorAccum::default().mean().is_none());
    }

    #[test]
    fn test_lab_roundtrip_primaries() {
        let colors = [
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [128, 128, 128],
            [255, 255, 255],
            [0, 0, 0],
        ];
        for rgb in colors {
            let image = solid(rgb);
            let field = ChannelField::new(&image, ColorSpace::Lab);
            let back = field.to_rgb(field.channels(1, 2));
            for c in 0..3 {
                assert!(
                    (back[c] as i32 - rgb[c] as i32).abs() <= 1,
                    "{:?} came back as {:?}",
                    rgb,
                    back
                );
            }
        }
    }

    #[test]
    fn test_lab_out_of_gamut_is_clamped() {
        let image = solid([0, 0, 0]);
        let field = ChannelField::new(&image, ColorSpace::Lab);
        // Far outside sRGB; must clamp rather than wrap or panic
        let rgb = field.to_rgb([100.0, 127.0, -127.0]);
        assert_eq!(rgb[0], 255);
        assert_eq!(rgb[2], 255);
        let nan = field.to_rgb([f64::NAN, 0.0, 0.0]);
        assert_eq!(nan, [0, 0, 0]);
    }
}
