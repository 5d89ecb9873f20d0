//! Grayscale patch representation and the raster math shared by the
//! quality scorer and the similarity engine.

use crate::shared::frame::Frame;

/// A row-major 8-bit grayscale raster.
///
/// This is the feature representation every face observation carries:
/// comparisons happen between patches resized to one common reference size,
/// which makes them scale-invariant.
#[derive(Clone, Debug, PartialEq)]
pub struct GrayPatch {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl GrayPatch {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize),
            "data length must equal width * height"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Converts an RGB frame to grayscale via Rec. 601 luma weights.
    pub fn from_frame(frame: &Frame) -> Self {
        let w = frame.width() as usize;
        let h = frame.height() as usize;
        let channels = frame.channels() as usize;
        let src = frame.data();

        let mut data = Vec::with_capacity(w * h);
        for i in 0..w * h {
            let offset = i * channels;
            let gray = if channels >= 3 {
                let r = src[offset] as f64;
                let g = src[offset + 1] as f64;
                let b = src[offset + 2] as f64;
                (0.299 * r + 0.587 * g + 0.114 * b).round()
            } else {
                src[offset] as f64
            };
            data.push(gray.clamp(0.0, 255.0) as u8);
        }

        Self::new(data, frame.width(), frame.height())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[(y * self.width + x) as usize]
    }

    /// Bilinear resize to the given dimensions.
    ///
    /// Resizing an empty patch yields an empty patch.
    pub fn resized(&self, width: u32, height: u32) -> GrayPatch {
        if self.is_empty() || width == 0 || height == 0 {
            return GrayPatch::new(Vec::new(), 0, 0);
        }

        let src_w = self.width as f64;
        let src_h = self.height as f64;
        let mut data = Vec::with_capacity((width * height) as usize);

        for y in 0..height {
            let sy = ((y as f64 + 0.5) * src_h / height as f64 - 0.5).max(0.0);
            let y0 = sy.floor() as u32;
            let y1 = (y0 + 1).min(self.height - 1);
            let fy = sy - y0 as f64;
            for x in 0..width {
                let sx = ((x as f64 + 0.5) * src_w / width as f64 - 0.5).max(0.0);
                let x0 = sx.floor() as u32;
                let x1 = (x0 + 1).min(self.width - 1);
                let fx = sx - x0 as f64;

                let p00 = self.get(x0, y0) as f64;
                let p10 = self.get(x1, y0) as f64;
                let p01 = self.get(x0, y1) as f64;
                let p11 = self.get(x1, y1) as f64;

                let top = p00 + (p10 - p00) * fx;
                let bottom = p01 + (p11 - p01) * fx;
                let value = top + (bottom - top) * fy;
                data.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }

        GrayPatch::new(data, width, height)
    }

    /// Extracts a rectangular sub-patch. The region must lie inside the patch.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> GrayPatch {
        debug_assert!(x + width <= self.width && y + height <= self.height);
        let mut data = Vec::with_capacity((width * height) as usize);
        for row in y..y + height {
            for col in x..x + width {
                data.push(self.get(col, row));
            }
        }
        GrayPatch::new(data, width, height)
    }

    /// Mirror image around the vertical axis.
    pub fn flipped_horizontal(&self) -> GrayPatch {
        let mut data = Vec::with_capacity(self.data.len());
        for y in 0..self.height {
            for x in 0..self.width {
                data.push(self.get(self.width - 1 - x, y));
            }
        }
        GrayPatch::new(data, self.width, self.height)
    }

    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64
    }

    pub fn std_dev(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let var = self
            .data
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / self.data.len() as f64;
        var.sqrt()
    }
}

/// Zero-mean normalized cross-correlation between two equally-sized patches.
///
/// Returns 1.0 when both patches have zero variance (identical flats) and
/// 0.0 when only one does, mirroring the Pearson convention used elsewhere.
pub fn ncc(a: &GrayPatch, b: &GrayPatch) -> f64 {
    if a.is_empty() || b.is_empty() || a.data().len() != b.data().len() {
        return 0.0;
    }

    let mean_a = a.mean();
    let mean_b = b.mean();

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..a.data().len() {
        let da = a.data()[i] as f64 - mean_a;
        let db = b.data()[i] as f64 - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom < f64::EPSILON {
        return if var_a < f64::EPSILON && var_b < f64::EPSILON {
            1.0
        } else {
            0.0
        };
    }

    cov / denom
}

/// 3x3 Sobel gradient magnitude, normalized to [0, 1].
///
/// Border pixels are computed with edge replication. Patches smaller than
/// 3x3 yield an all-zero map.
pub fn sobel_magnitude(patch: &GrayPatch) -> Vec<f64> {
    let w = patch.width() as i64;
    let h = patch.height() as i64;
    let mut out = vec![0.0; (w * h) as usize];
    if w < 3 || h < 3 {
        return out;
    }

    let sample = |x: i64, y: i64| -> f64 {
        let cx = x.clamp(0, w - 1) as u32;
        let cy = y.clamp(0, h - 1) as u32;
        patch.get(cx, cy) as f64
    };

    // Max |gx| or |gy| is 4 * 255, so magnitude is bounded by 4*255*sqrt(2).
    let norm = 4.0 * 255.0 * std::f64::consts::SQRT_2;

    for y in 0..h {
        for x in 0..w {
            let gx = sample(x + 1, y - 1) + 2.0 * sample(x + 1, y) + sample(x + 1, y + 1)
                - sample(x - 1, y - 1)
                - 2.0 * sample(x - 1, y)
                - sample(x - 1, y + 1);
            let gy = sample(x - 1, y + 1) + 2.0 * sample(x, y + 1) + sample(x + 1, y + 1)
                - sample(x - 1, y - 1)
                - 2.0 * sample(x, y - 1)
                - sample(x + 1, y - 1);
            out[(y * w + x) as usize] = (gx * gx + gy * gy).sqrt() / norm;
        }
    }

    out
}
