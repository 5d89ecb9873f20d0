/// An axis-aligned face bounding box in source-frame pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        if self.is_degenerate() {
            return 0;
        }
        self.width as i64 * self.height as i64
    }

    /// Width divided by height; 0.0 for degenerate boxes.
    pub fn aspect_ratio(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /// A box with non-positive width or height carries no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersects the box with the `[0, width) x [0, height)` frame rect.
    ///
    /// The result may be degenerate when the box lies entirely outside.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> BoundingBox {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = (self.x + self.width).min(frame_width as i32);
        let y2 = (self.y + self.height).min(frame_height as i32);
        BoundingBox {
            x: x1,
            y: y1,
            width: (x2 - x1).max(0),
            height: (y2 - y1).max(0),
        }
    }
}
