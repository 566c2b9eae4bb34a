//! Drawable surface abstraction
//!
//! A [`Surface`] is the overlay the mask is painted on and erased from. It
//! supports plain and gradient fills, a composite mode toggle between normal
//! painting and subtracting the painted region, element opacity, and a
//! best-effort per-pixel alpha read.

use thiserror::Error;

use crate::color::Color;
use crate::gradient::RadialGradient;
use crate::path::{Path, Point};
use crate::primitives::{Circle, Rect};

/// Surface errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// Pixel reads are blocked because cross-origin content was drawn
    #[error("Pixel read blocked by security restriction")]
    SecurityRestriction,

    /// The surface has no readable pixel storage
    #[error("Pixel data unavailable on this surface")]
    PixelsUnavailable,

    /// Pixel coordinate outside the surface
    #[error("Pixel ({x}, {y}) outside {width}x{height} surface")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Surface storage could not be allocated
    #[error("Cannot allocate {width}x{height} surface")]
    Allocation { width: u32, height: u32 },

    /// Image data could not be decoded
    #[error("Image decode failed: {0}")]
    Decode(String),
}

impl SurfaceError {
    /// Whether this error means pixel reads will never succeed on the surface
    pub fn is_read_blocked(&self) -> bool {
        matches!(
            self,
            SurfaceError::SecurityRestriction | SurfaceError::PixelsUnavailable
        )
    }
}

/// Result type for surface operations
pub type Result<T> = std::result::Result<T, SurfaceError>;

/// How new paint combines with what is already on the surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeMode {
    /// Paint over existing content
    #[default]
    SourceOver,
    /// Remove existing content where paint lands, weighted by paint alpha
    DestinationOut,
}

/// Fill style for shapes
#[derive(Clone, Debug, PartialEq)]
pub enum FillStyle {
    Color(Color),
    Radial(RadialGradient),
}

impl From<Color> for FillStyle {
    fn from(color: Color) -> Self {
        FillStyle::Color(color)
    }
}

impl From<RadialGradient> for FillStyle {
    fn from(gradient: RadialGradient) -> Self {
        FillStyle::Radial(gradient)
    }
}

/// 2D affine transform
///
/// Maps `(x, y)` to `(a*x + c*y + e, b*x + d*y + f)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform2D {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            e: x,
            f: y,
            ..Self::identity()
        }
    }

    pub fn rotate(angle: f32) -> Self {
        let cos = angle.cos();
        let sin = angle.sin();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Rotation by `degrees` about `(cx, cy)`, counter-clockwise as seen on a
    /// y-down screen
    pub fn rotate_ccw_about(degrees: f32, cx: f32, cy: f32) -> Self {
        Self::translate(cx, cy)
            .then(Self::rotate(-degrees.to_radians()))
            .then(Self::translate(-cx, -cy))
    }

    /// Compose so that `other` is applied first, then `self`
    pub fn then(self, other: Transform2D) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn map_point(&self, point: Point) -> Point {
        Point::new(
            self.a * point.x + self.c * point.y + self.e,
            self.b * point.x + self.d * point.y + self.f,
        )
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

/// Decoded image used to fill the mask instead of a flat color
#[derive(Clone, Debug, PartialEq)]
pub struct MaskImage {
    pub width: u32,
    pub height: u32,
    /// Straight (non-premultiplied) RGBA, row-major
    pub pixels: Vec<u8>,
    /// Drawing a cross-origin image blocks later pixel reads
    pub cross_origin: bool,
}

impl MaskImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, cross_origin: bool) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || pixels.len() != expected {
            return Err(SurfaceError::Decode(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            cross_origin,
        })
    }
}

/// A drawable 2D surface
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn composite_mode(&self) -> CompositeMode;

    fn set_composite_mode(&mut self, mode: CompositeMode);

    fn fill_rect(&mut self, rect: Rect, style: &FillStyle);

    /// Fill `rect` with `image` repeated from the surface origin
    fn fill_image(&mut self, rect: Rect, image: &MaskImage);

    fn fill_circle(&mut self, circle: Circle, style: &FillStyle);

    fn fill_path(&mut self, path: &Path, style: &FillStyle, transform: Transform2D);

    /// Alpha of the pixel at `(x, y)`
    fn read_alpha(&self, x: u32, y: u32) -> Result<u8>;

    /// Element opacity, independent of pixel content
    fn opacity(&self) -> f32;

    fn set_opacity(&mut self, opacity: f32);

    /// Alpha of the pixel containing a point in surface coordinates.
    ///
    /// Points on the far edge read the last pixel. Points outside the surface
    /// give `Ok(None)`.
    fn sample_alpha(&self, x: f32, y: f32) -> Result<Option<u8>> {
        let (Some(px), Some(py)) = (pixel_index(x, self.width()), pixel_index(y, self.height()))
        else {
            return Ok(None);
        };
        self.read_alpha(px, py).map(Some)
    }
}

/// Pixel containing coordinate `v` along an axis of `limit` pixels
fn pixel_index(v: f32, limit: u32) -> Option<u32> {
    if !v.is_finite() || v < 0.0 || v > limit as f32 || limit == 0 {
        return None;
    }
    Some((v.floor() as u32).min(limit - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Checker {
        alpha: Vec<u8>,
        width: u32,
    }

    impl Surface for Checker {
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.alpha.len() as u32 / self.width
        }
        fn composite_mode(&self) -> CompositeMode {
            CompositeMode::SourceOver
        }
        fn set_composite_mode(&mut self, _mode: CompositeMode) {}
        fn fill_rect(&mut self, _rect: Rect, _style: &FillStyle) {}
        fn fill_image(&mut self, _rect: Rect, _image: &MaskImage) {}
        fn fill_circle(&mut self, _circle: Circle, _style: &FillStyle) {}
        fn fill_path(&mut self, _path: &Path, _style: &FillStyle, _transform: Transform2D) {}
        fn read_alpha(&self, x: u32, y: u32) -> Result<u8> {
            Ok(self.alpha[(y * self.width + x) as usize])
        }
        fn opacity(&self) -> f32 {
            1.0
        }
        fn set_opacity(&mut self, _opacity: f32) {}
    }

    #[test]
    fn test_pixel_index_interior_and_edges() {
        assert_eq!(pixel_index(2.5, 4), Some(2));
        assert_eq!(pixel_index(2.0, 4), Some(2));
        assert_eq!(pixel_index(0.0, 4), Some(0));
        assert_eq!(pixel_index(4.0, 4), Some(3));
        assert_eq!(pixel_index(4.5, 4), None);
        assert_eq!(pixel_index(-0.1, 4), None);
        assert_eq!(pixel_index(f32::NAN, 4), None);
    }

    #[test]
    fn test_sample_alpha_reads_containing_pixel_only() {
        // 2x2: only the top-left pixel is erased
        let surface = Checker {
            alpha: vec![0, 255, 255, 255],
            width: 2,
        };
        assert_eq!(surface.sample_alpha(0.5, 0.5), Ok(Some(0)));
        // Corner shared with the erased pixel
        assert_eq!(surface.sample_alpha(1.0, 1.0), Ok(Some(255)));
        assert_eq!(surface.sample_alpha(1.5, 0.5), Ok(Some(255)));
        assert_eq!(surface.sample_alpha(2.0, 2.0), Ok(Some(255)));
        assert_eq!(surface.sample_alpha(3.0, 0.5), Ok(None));
    }

    #[test]
    fn test_rotate_ccw_about_center() {
        let t = Transform2D::rotate_ccw_about(90.0, 10.0, 10.0);
        // A point to the right of the center ends up above it on screen
        let p = t.map_point(Point::new(20.0, 10.0));
        assert!((p.x - 10.0).abs() < 1e-4);
        assert!((p.y - 0.0).abs() < 1e-4);
        // The center is fixed
        let c = t.map_point(Point::new(10.0, 10.0));
        assert!((c.x - 10.0).abs() < 1e-4 && (c.y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_read_blocked_classification() {
        assert!(SurfaceError::SecurityRestriction.is_read_blocked());
        assert!(SurfaceError::PixelsUnavailable.is_read_blocked());
        assert!(!SurfaceError::Decode("x".into()).is_read_blocked());
    }

    #[test]
    fn test_mask_image_rejects_short_buffer() {
        assert!(MaskImage::new(2, 2, vec![0; 15], false).is_err());
        assert!(MaskImage::new(2, 2, vec![0; 16], true).is_ok());
    }
}
