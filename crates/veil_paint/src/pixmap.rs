//! CPU raster surface backed by tiny-skia

use std::path::Path as FsPath;

use crate::color::Color;
use crate::gradient::RadialGradient;
use crate::path::{Path, PathCommand};
use crate::primitives::{Circle, Rect};
use crate::surface::{
    CompositeMode, FillStyle, MaskImage, Result, Surface, SurfaceError, Transform2D,
};

/// Raster surface with readable pixels.
///
/// Drawing a cross-origin [`MaskImage`] taints the surface; from then on
/// every pixel read fails with [`SurfaceError::SecurityRestriction`].
pub struct PixmapSurface {
    pixmap: tiny_skia::Pixmap,
    mode: CompositeMode,
    opacity: f32,
    tainted: bool,
}

impl std::fmt::Debug for PixmapSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("mode", &self.mode)
            .field("opacity", &self.opacity)
            .field("tainted", &self.tainted)
            .finish()
    }
}

impl PixmapSurface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(SurfaceError::Allocation { width, height })?;
        tracing::trace!("Allocated {}x{} pixmap surface", width, height);
        Ok(Self {
            pixmap,
            mode: CompositeMode::SourceOver,
            opacity: 1.0,
            tainted: false,
        })
    }

    /// Whether cross-origin content has been drawn
    pub fn is_tainted(&self) -> bool {
        self.tainted
    }

    /// Mark the surface as holding cross-origin content
    pub fn taint(&mut self) {
        self.tainted = true;
    }

    /// Encode the surface as PNG with element opacity applied
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.composited()?
            .encode_png()
            .map_err(|e| SurfaceError::Decode(e.to_string()))
    }

    /// Write the surface to a PNG file with element opacity applied
    pub fn save_png(&self, path: impl AsRef<FsPath>) -> Result<()> {
        self.composited()?
            .save_png(path)
            .map_err(|e| SurfaceError::Decode(e.to_string()))
    }

    fn composited(&self) -> Result<tiny_skia::Pixmap> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut out = tiny_skia::Pixmap::new(width, height)
            .ok_or(SurfaceError::Allocation { width, height })?;
        let paint = tiny_skia::PixmapPaint {
            opacity: self.opacity.clamp(0.0, 1.0),
            ..tiny_skia::PixmapPaint::default()
        };
        out.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &paint,
            tiny_skia::Transform::identity(),
            None,
        );
        Ok(out)
    }

    fn paint_for(&self, style: &FillStyle) -> Option<tiny_skia::Paint<'static>> {
        let mut paint = tiny_skia::Paint {
            anti_alias: true,
            blend_mode: blend_mode(self.mode),
            ..tiny_skia::Paint::default()
        };
        match style {
            FillStyle::Color(color) => paint.set_color(skia_color(*color)),
            FillStyle::Radial(gradient) => paint.shader = radial_shader(gradient)?,
        }
        Some(paint)
    }
}

impl Surface for PixmapSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn composite_mode(&self) -> CompositeMode {
        self.mode
    }

    fn set_composite_mode(&mut self, mode: CompositeMode) {
        self.mode = mode;
    }

    fn fill_rect(&mut self, rect: Rect, style: &FillStyle) {
        let (Some(rect), Some(paint)) = (skia_rect(rect), self.paint_for(style)) else {
            return;
        };
        self.pixmap
            .fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);
    }

    fn fill_image(&mut self, rect: Rect, image: &MaskImage) {
        let Some(source) = image_pixmap(image) else {
            tracing::warn!(
                "Skipping undrawable {}x{} mask image",
                image.width,
                image.height
            );
            return;
        };
        let Some(target) = skia_rect(rect) else {
            return;
        };
        let paint = tiny_skia::Paint {
            shader: tiny_skia::Pattern::new(
                source.as_ref(),
                tiny_skia::SpreadMode::Repeat,
                tiny_skia::FilterQuality::Nearest,
                1.0,
                tiny_skia::Transform::identity(),
            ),
            blend_mode: blend_mode(self.mode),
            anti_alias: false,
            ..tiny_skia::Paint::default()
        };
        self.pixmap
            .fill_rect(target, &paint, tiny_skia::Transform::identity(), None);

        if image.cross_origin && !self.tainted {
            tracing::debug!("Cross-origin mask image drawn; pixel reads now blocked");
            self.tainted = true;
        }
    }

    fn fill_circle(&mut self, circle: Circle, style: &FillStyle) {
        let Some(path) =
            tiny_skia::PathBuilder::from_circle(circle.center.x, circle.center.y, circle.radius)
        else {
            return;
        };
        let Some(paint) = self.paint_for(style) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            tiny_skia::Transform::identity(),
            None,
        );
    }

    fn fill_path(&mut self, path: &Path, style: &FillStyle, transform: Transform2D) {
        let (Some(path), Some(paint)) = (skia_path(path), self.paint_for(style)) else {
            return;
        };
        self.pixmap.fill_path(
            &path,
            &paint,
            tiny_skia::FillRule::Winding,
            skia_transform(transform),
            None,
        );
    }

    fn read_alpha(&self, x: u32, y: u32) -> Result<u8> {
        if self.tainted {
            return Err(SurfaceError::SecurityRestriction);
        }
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        // `Pixmap::pixel` only checks the flat index
        if x >= width || y >= height {
            return Err(SurfaceError::OutOfBounds {
                x,
                y,
                width,
                height,
            });
        }
        self.pixmap
            .pixel(x, y)
            .map(|pixel| pixel.alpha())
            .ok_or(SurfaceError::OutOfBounds {
                x,
                y,
                width,
                height,
            })
    }

    fn opacity(&self) -> f32 {
        self.opacity
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }
}

impl MaskImage {
    /// Decode a PNG into straight RGBA
    pub fn from_png(data: &[u8], cross_origin: bool) -> Result<Self> {
        let pixmap = tiny_skia::Pixmap::decode_png(data)
            .map_err(|e| SurfaceError::Decode(e.to_string()))?;
        Self::from_pixmap(&pixmap, cross_origin)
    }

    /// Load and decode a PNG file
    pub fn load(path: impl AsRef<FsPath>, cross_origin: bool) -> Result<Self> {
        let pixmap = tiny_skia::Pixmap::load_png(path.as_ref())
            .map_err(|e| SurfaceError::Decode(e.to_string()))?;
        Self::from_pixmap(&pixmap, cross_origin)
    }

    fn from_pixmap(pixmap: &tiny_skia::Pixmap, cross_origin: bool) -> Result<Self> {
        let mut pixels = Vec::with_capacity(pixmap.data().len());
        for pixel in pixmap.pixels() {
            let c = pixel.demultiply();
            pixels.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        Self::new(pixmap.width(), pixmap.height(), pixels, cross_origin)
    }
}

fn image_pixmap(image: &MaskImage) -> Option<tiny_skia::Pixmap> {
    let mut pixmap = tiny_skia::Pixmap::new(image.width, image.height)?;
    for (dst, src) in pixmap
        .pixels_mut()
        .iter_mut()
        .zip(image.pixels.chunks_exact(4))
    {
        *dst = tiny_skia::ColorU8::from_rgba(src[0], src[1], src[2], src[3]).premultiply();
    }
    Some(pixmap)
}

fn blend_mode(mode: CompositeMode) -> tiny_skia::BlendMode {
    match mode {
        CompositeMode::SourceOver => tiny_skia::BlendMode::SourceOver,
        CompositeMode::DestinationOut => tiny_skia::BlendMode::DestinationOut,
    }
}

fn skia_color(color: Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height)
}

fn skia_transform(t: Transform2D) -> tiny_skia::Transform {
    tiny_skia::Transform::from_row(t.a, t.b, t.c, t.d, t.e, t.f)
}

fn radial_shader(gradient: &RadialGradient) -> Option<tiny_skia::Shader<'static>> {
    let center = tiny_skia::Point::from_xy(gradient.center.x, gradient.center.y);
    let stops = gradient
        .stops
        .iter()
        .map(|stop| tiny_skia::GradientStop::new(stop.offset, skia_color(stop.color)))
        .collect();
    tiny_skia::RadialGradient::new(
        center,
        center,
        gradient.radius,
        stops,
        tiny_skia::SpreadMode::Pad,
        tiny_skia::Transform::identity(),
    )
}

fn skia_path(path: &Path) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(p) => builder.move_to(p.x, p.y),
            PathCommand::LineTo(p) => builder.line_to(p.x, p.y),
            PathCommand::CubicTo {
                control1,
                control2,
                end,
            } => builder.cubic_to(control1.x, control1.y, control2.x, control2.y, end.x, end.y),
            PathCommand::Close => builder.close(),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PathBuilder, Point};

    fn filled(width: u32, height: u32) -> PixmapSurface {
        let mut surface = PixmapSurface::new(width, height).unwrap();
        surface.fill_rect(
            Rect::new(0.0, 0.0, width as f32, height as f32),
            &Color::from_hex(0x666666).into(),
        );
        surface
    }

    #[test]
    fn test_fill_is_opaque() {
        let surface = filled(20, 10);
        assert_eq!(surface.read_alpha(0, 0), Ok(255));
        assert_eq!(surface.read_alpha(19, 9), Ok(255));
        assert!(matches!(
            surface.read_alpha(20, 0),
            Err(SurfaceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_read_past_row_end_does_not_wrap() {
        let mut surface = filled(20, 10);
        surface.set_composite_mode(CompositeMode::DestinationOut);
        // Clears the first pixel of row 1, the flat-index neighbour of (20, 0)
        surface.fill_rect(Rect::new(0.0, 1.0, 1.0, 1.0), &Color::BLACK.into());
        assert_eq!(surface.read_alpha(0, 1), Ok(0));
        assert_eq!(
            surface.read_alpha(20, 0),
            Err(SurfaceError::OutOfBounds {
                x: 20,
                y: 0,
                width: 20,
                height: 10
            })
        );
        assert!(matches!(
            surface.read_alpha(0, 10),
            Err(SurfaceError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_destination_out_clears_circle() {
        let mut surface = filled(40, 40);
        surface.set_composite_mode(CompositeMode::DestinationOut);
        surface.fill_circle(Circle::new(Point::new(20.0, 20.0), 8.0), &Color::BLACK.into());
        assert_eq!(surface.read_alpha(20, 20), Ok(0));
        assert_eq!(surface.read_alpha(2, 2), Ok(255));
    }

    #[test]
    fn test_feather_ring_leaves_partial_alpha() {
        let mut surface = filled(60, 60);
        surface.set_composite_mode(CompositeMode::DestinationOut);
        let ring = RadialGradient::feather_ring(Point::new(30.0, 30.0), 10.0, 20.0, Color::BLACK);
        surface.fill_circle(Circle::new(Point::new(30.0, 30.0), 20.0), &ring.into());
        assert_eq!(surface.read_alpha(30, 30), Ok(0));
        let edge = surface.read_alpha(30, 15).unwrap();
        assert!(edge > 0 && edge < 255, "edge alpha {edge}");
        assert_eq!(surface.read_alpha(1, 1), Ok(255));
    }

    #[test]
    fn test_rotated_oval_path() {
        let mut surface = filled(100, 100);
        surface.set_composite_mode(CompositeMode::DestinationOut);
        let oval = PathBuilder::oval(50.0, 50.0, 10.0, 60.0);
        let rotate = Transform2D::rotate_ccw_about(90.0, 50.0, 50.0);
        surface.fill_path(&oval, &Color::BLACK.into(), rotate);
        // Rotated a quarter turn, the long axis lies horizontally
        assert_eq!(surface.read_alpha(72, 50), Ok(0));
        assert_eq!(surface.read_alpha(50, 72), Ok(255));
    }

    #[test]
    fn test_cross_origin_image_taints() {
        let mut surface = PixmapSurface::new(8, 8).unwrap();
        let image = MaskImage::new(2, 2, vec![200; 16], true).unwrap();
        surface.fill_image(Rect::new(0.0, 0.0, 8.0, 8.0), &image);
        assert!(surface.is_tainted());
        assert_eq!(
            surface.read_alpha(1, 1),
            Err(SurfaceError::SecurityRestriction)
        );
    }

    #[test]
    fn test_same_origin_image_tiles() {
        let mut surface = PixmapSurface::new(8, 8).unwrap();
        let image = MaskImage::new(1, 1, vec![10, 20, 30, 255], false).unwrap();
        surface.fill_image(Rect::new(0.0, 0.0, 8.0, 8.0), &image);
        assert!(!surface.is_tainted());
        assert_eq!(surface.read_alpha(7, 7), Ok(255));
    }

    #[test]
    fn test_png_round_trip_keeps_size() {
        let surface = filled(6, 4);
        let png = surface.encode_png().unwrap();
        let image = MaskImage::from_png(&png, false).unwrap();
        assert_eq!((image.width, image.height), (6, 4));
        assert_eq!(image.pixels[3], 255);
    }
}
