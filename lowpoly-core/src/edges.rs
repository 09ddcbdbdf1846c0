//! Sobel edge-strength map over image luminance.
//!
//! - Luminance uses the Rec. 601 weights `0.299 R + 0.587 G + 0.114 B`.
//! - The 3×3 Sobel pair is applied to interior pixels only; the one-pixel
//!   border ring stays zero (no clamping, no reflection).
//! - Magnitudes are rescaled so the strongest edge maps to 255. A flat image
//!   yields an all-zero map.

use crate::PixelBuffer;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Per-pixel edge strength in `[0, 255]`, row-major.
#[derive(Clone, Debug)]
pub struct EdgeMap {
    pub width: u32,
    pub height: u32,
    values: Vec<f32>,
}

#[inline]
fn luminance(rgba: &[u8]) -> f32 {
    0.299 * rgba[0] as f32 + 0.587 * rgba[1] as f32 + 0.114 * rgba[2] as f32
}

impl EdgeMap {
    /// Compute the normalized Sobel magnitude of `image`.
    pub fn from_image(image: &PixelBuffer) -> Self {
        let (width, height) = image.dimensions();
        let w = width as usize;
        let h = height as usize;

        let luma: Vec<f32> = image.as_raw().chunks_exact(4).map(luminance).collect();
        let mut values = vec![0.0f32; w * h];

        if w >= 3 && h >= 3 {
            for y in 1..h - 1 {
                let rows = [
                    &luma[(y - 1) * w..y * w],
                    &luma[y * w..(y + 1) * w],
                    &luma[(y + 1) * w..(y + 2) * w],
                ];
                let out = &mut values[y * w..(y + 1) * w];
                for x in 1..w - 1 {
                    let mut gx = 0.0;
                    let mut gy = 0.0;
                    for (ky, row) in rows.iter().enumerate() {
                        let kx_row = &SOBEL_KERNEL_X[ky];
                        let ky_row = &SOBEL_KERNEL_Y[ky];
                        gx += row[x - 1] * kx_row[0] + row[x] * kx_row[1] + row[x + 1] * kx_row[2];
                        gy += row[x - 1] * ky_row[0] + row[x] * ky_row[1] + row[x + 1] * ky_row[2];
                    }
                    out[x] = (gx * gx + gy * gy).sqrt();
                }
            }
        }

        let max = values.iter().copied().fold(0.0f32, f32::max);
        if max > 0.0 {
            let scale = 255.0 / max;
            for v in &mut values {
                *v *= scale;
            }
        }

        Self { width, height, values }
    }

    /// Edge strength at pixel `(x, y)`, in `[0, 255]`
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.values[y as usize * self.width as usize + x as usize]
    }

    /// Edge strength at pixel `(x, y)`, scaled to `[0, 1]`
    #[inline]
    pub fn normalized(&self, x: u32, y: u32) -> f32 {
        self.get(x, y) / 255.0
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }
}
