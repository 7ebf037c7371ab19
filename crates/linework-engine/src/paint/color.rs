/// Straight-alpha RGBA color with `f32` components in `[0, 1]`.
///
/// Used for framebuffer clears. Line color comes from the fragment shader.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Dark blue background used by the line tutorial.
    pub const DARK_BLUE: Color = Color::rgba(0.0, 0.0, 0.4, 0.0);

    #[cfg(test)]
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
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

    /// Converts to the `f64` clear value wgpu expects for `LoadOp::Clear`.
    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        let c = self.clamped();
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: c.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_blue_matches_tutorial_background() {
        let c = Color::DARK_BLUE.to_wgpu();
        assert_eq!(c.r, 0.0);
        assert_eq!(c.g, 0.0);
        assert!((c.b - 0.4).abs() < 1e-6);
        assert_eq!(c.a, 0.0);
    }

    #[test]
    fn to_wgpu_clamps_out_of_range_channels() {
        let c = Color::rgba(-1.0, 2.0, 0.5, 1.5).to_wgpu();
        assert_eq!((c.r, c.g, c.b, c.a), (0.0, 1.0, 0.5, 1.0));
    }
}
