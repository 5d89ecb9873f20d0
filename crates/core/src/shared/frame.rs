use ndarray::ArrayView3;

use crate::shared::bbox::BoundingBox;

/// A single video frame: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; the analysis layers
/// treat pixel data as opaque until they crop or grayscale it.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
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

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Decode-order index within the source video.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Extracts the pixels under `bbox` as a new frame.
    ///
    /// The box is clamped to frame bounds first; a box entirely outside the
    /// frame yields an empty crop (width or height 0).
    pub fn crop(&self, bbox: &BoundingBox) -> Frame {
        let clamped = bbox.clamp_to(self.width, self.height);
        let x1 = clamped.x.max(0) as usize;
        let y1 = clamped.y.max(0) as usize;
        let w = clamped.width.max(0) as usize;
        let h = clamped.height.max(0) as usize;
        let channels = self.channels as usize;

        let src = self.as_ndarray();
        let mut data = Vec::with_capacity(w * h * channels);
        for row in y1..y1 + h {
            for col in x1..x1 + w {
                for c in 0..channels {
                    data.push(src[[row, col, c]]);
                }
            }
        }

        Frame::new(data, w as u32, h as u32, self.channels, self.index)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
