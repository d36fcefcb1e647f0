/// Viewport size in pixels.
///
/// Used to convert the pixel disc radius to clip space.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport matching a `width × height` texture.
    #[inline]
    pub fn from_texture_size(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// `viewportSize` uniform value, or `None` for a degenerate viewport.
    #[inline]
    pub fn size_uniform(self) -> Option<[f32; 2]> {
        self.is_valid().then_some([self.width, self.height])
    }
}
