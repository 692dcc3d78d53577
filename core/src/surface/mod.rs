//! 2D drawing surfaces
//!
//! The render loop paints into a [`Surface`]. [`PixelSurface`] is the
//! in-memory implementation used by the headless player and by tests.

mod pixel;

pub use pixel::PixelSurface;

/// RGBA color, 8 bits per channel
pub type Rgba = [u8; 4];

pub const WHITE: Rgba = [255, 255, 255, 255];
pub const BLACK: Rgba = [0, 0, 0, 255];

/// Borrowed RGBA image (4 bytes per pixel, row-major)
#[derive(Debug, Clone, Copy)]
pub struct ImageRef<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// On-screen placement of a surface, in screen-space units
///
/// `width`/`height` are the *displayed* size, which may differ from the
/// surface's pixel size when it is scaled by layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle at the origin, displayed at the given size
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("image data is {actual} bytes, expected {expected} for {width}x{height}")]
    BadImage {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to write image: {0}")]
    Capture(#[from] image::ImageError),
}

/// A 2D drawing target
pub trait Surface {
    /// Pixel width of the drawing buffer
    fn width(&self) -> u32;

    /// Pixel height of the drawing buffer
    fn height(&self) -> u32;

    /// Current on-screen rectangle. Must be queried per input event.
    fn bounding_rect(&self) -> SurfaceRect;

    /// Copy an image onto the surface with its top-left corner at (dx, dy),
    /// clipped to the surface bounds
    fn put_image(&mut self, image: &ImageRef<'_>, dx: i32, dy: i32) -> Result<(), SurfaceError>;

    /// Fill a rectangle, clipped to the surface bounds
    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba);

    fn clear(&mut self, color: Rgba) {
        let (width, height) = (self.width(), self.height());
        self.fill_rect(0, 0, width, height, color);
    }
}
