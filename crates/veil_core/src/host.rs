//! Surface hosts
//!
//! A host knows where the masked target is and how to make surfaces for it.
//! It also resolves `maskImage` sources to decoded images.

use rustc_hash::FxHashMap;
use veil_paint::{
    CommandLog, MaskImage, PixmapSurface, RecordingSurface, Rect, Surface, SurfaceError,
};

/// Provider of target bounds, surfaces and mask images
pub trait SurfaceHost {
    type Surface: Surface + 'static;

    /// Client bounds of the masked target, `None` if it is gone
    fn bounds(&self) -> Option<Rect>;

    fn create_surface(&mut self, width: u32, height: u32)
        -> Result<Self::Surface, SurfaceError>;

    /// Decoded image for a `maskImage` source
    fn mask_image(&mut self, _source: &str) -> Option<MaskImage> {
        None
    }
}

/// Host producing tiny-skia raster surfaces
#[derive(Debug, Default)]
pub struct PixmapHost {
    bounds: Option<Rect>,
    tainted: bool,
    images: FxHashMap<String, MaskImage>,
}

impl PixmapHost {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: Some(bounds),
            ..Default::default()
        }
    }

    /// Host with no target
    pub fn detached() -> Self {
        Self::default()
    }

    /// Create every surface with pixel reads blocked
    pub fn tainted(mut self) -> Self {
        self.tainted = true;
        self
    }

    pub fn with_image(mut self, source: impl Into<String>, image: MaskImage) -> Self {
        self.images.insert(source.into(), image);
        self
    }

    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }
}

impl SurfaceHost for PixmapHost {
    type Surface = PixmapSurface;

    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn create_surface(&mut self, width: u32, height: u32) -> Result<PixmapSurface, SurfaceError> {
        let mut surface = PixmapSurface::new(width, height)?;
        if self.tainted {
            surface.taint();
        }
        Ok(surface)
    }

    fn mask_image(&mut self, source: &str) -> Option<MaskImage> {
        self.images.get(source).cloned()
    }
}

/// Host producing recording surfaces that all write to one shared log
#[derive(Debug, Default)]
pub struct RecordingHost {
    bounds: Option<Rect>,
    log: CommandLog,
}

impl RecordingHost {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: Some(bounds),
            log: CommandLog::default(),
        }
    }

    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
    }
}

impl SurfaceHost for RecordingHost {
    type Surface = RecordingSurface;

    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn create_surface(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<RecordingSurface, SurfaceError> {
        Ok(RecordingSurface::with_log(width, height, self.log.clone()))
    }
}
