/// Straight-alpha RGBA color with `f32` channels in `[0, 1]`.
///
/// Used both for the frame clear color and for the constant output of the
/// solid fragment stage.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Returns a copy with every channel clamped to `[0, 1]`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Converts to the `f64` clear value wgpu expects for `LoadOp::Clear`.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_opaque() {
        assert_eq!(Color::rgb(0.8, 0.5, 0.0).a, 1.0);
    }

    #[test]
    fn clamped_limits_each_channel() {
        let c = Color::rgba(1.5, -0.2, 0.5, 2.0).clamped();
        assert_eq!(c, Color::rgba(1.0, 0.0, 0.5, 1.0));
    }

    #[test]
    fn to_wgpu_widens_channels() {
        let c = Color::rgba(0.5, 0.0, 1.0, 1.0).to_wgpu();
        assert_eq!((c.r, c.g, c.b, c.a), (0.5, 0.0, 1.0, 1.0));
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(!Color::rgba(f32::NAN, 0.0, 0.0, 1.0).is_finite());
        assert!(Color::BLACK.is_finite());
    }
}
