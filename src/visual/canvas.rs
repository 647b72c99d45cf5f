//! Software RGBA drawing surface and the registry the engine draws through.

use bytemuck::{Pod, Zeroable};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// 8-bit RGBA colour, laid out as stored in the pixel buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const GRAY: Rgba = Rgba::opaque(128, 128, 128);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Convert HSL (hue in degrees, saturation and lightness in [0, 1]) to an opaque colour
pub fn hsl_to_rgba(hue_deg: f32, saturation: f32, lightness: f32) -> Rgba {
    let h = hue_deg.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = lightness - c / 2.0;
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba::opaque(to_byte(r), to_byte(g), to_byte(b))
}

/// Fixed-size pixel surface with rectangle fills
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize to `width` x `height` and clear to `background`
    pub fn reset(&mut self, width: u32, height: u32, background: Rgba) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, background);
    }

    /// Fill a rectangle given in float pixel coordinates, clipped to the surface.
    ///
    /// Edges round to the nearest pixel; a rectangle with positive size always
    /// covers at least one pixel in each direction.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        if !(w > 0.0 && h > 0.0) {
            return;
        }
        let Some((x0, x1)) = span(x, w, self.width) else {
            return;
        };
        let Some((y0, y1)) = span(y, h, self.height) else {
            return;
        };

        let stride = self.width as usize;
        for row in y0..y1 {
            self.pixels[row * stride + x0..row * stride + x1].fill(color);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Raw RGBA8 bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), image::ImageError> {
        image::save_buffer(
            path,
            self.as_bytes(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
        )
    }
}

/// Pixel range [start, end) covered by `start..start + len`, clipped to `limit`
fn span(start: f32, len: f32, limit: u32) -> Option<(usize, usize)> {
    let lo = start.round();
    let hi = (start + len).round().max(lo + 1.0);
    let lo = lo.max(0.0);
    let hi = hi.min(limit as f32);
    if lo >= hi {
        return None;
    }
    Some((lo as usize, hi as usize))
}

/// Canvases addressable by id, shared between the draw cycle and presenters
#[derive(Debug, Clone, Default)]
pub struct CanvasRegistry {
    canvases: Arc<Mutex<HashMap<String, Canvas>>>,
}

impl CanvasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: impl Into<String>, canvas: Canvas) {
        self.lock().insert(id.into(), canvas);
    }

    /// Run `f` on the canvas registered under `id`, if any
    pub fn with_canvas<R>(&self, id: &str, f: impl FnOnce(&mut Canvas) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    /// Copy of the canvas registered under `id`
    pub fn snapshot(&self, id: &str) -> Option<Canvas> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Canvas>> {
        self.canvases.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
