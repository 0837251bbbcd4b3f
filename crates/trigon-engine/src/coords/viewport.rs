/// Viewport rectangle in physical pixels.
///
/// The origin is always the top-left corner of the drawable surface; the
/// runtime keeps `width`/`height` equal to the current framebuffer size.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// A zero-sized viewport (minimized window) cannot be rendered into.
    #[inline]
    pub fn is_drawable(self) -> bool {
        self.width > 0 && self.height > 0
    }
}
