use image::{RgbaImage, imageops};

/// Straight (non-premultiplied) 8-bit RGBA.
pub type Rgba = [u8; 4];

pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// An addressable raster the core paints into and composites from.
///
/// Coordinates are signed so callers can address pixels outside the surface;
/// reads out of bounds return `None` and writes out of bounds are dropped.
pub trait RasterSurface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn read_pixel(&self, x: i64, y: i64) -> Option<Rgba>;

    fn write_pixel(&mut self, x: i64, y: i64, pixel: Rgba);

    /// Makes every pixel fully transparent.
    fn clear(&mut self);

    /// Resizes to `width`x`height`, stretching the existing content to fill it.
    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width()) && y < i64::from(self.height())
    }

    /// Draws `src` with its top-left corner at (`dx`, `dy`) using source-over,
    /// scaling the source alpha by `alpha`.
    fn draw_surface(&mut self, src: &dyn RasterSurface, dx: i64, dy: i64, alpha: f32) {
        if alpha <= 0.0 {
            return;
        }
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = dx.saturating_add(i64::from(src.width())).min(i64::from(self.width()));
        let y1 = dy.saturating_add(i64::from(src.height())).min(i64::from(self.height()));
        for y in y0..y1 {
            for x in x0..x1 {
                let Some(top) = src.read_pixel(x - dx, y - dy) else {
                    continue;
                };
                if top[3] == 0 {
                    continue;
                }
                if let Some(base) = self.read_pixel(x, y) {
                    self.write_pixel(x, y, source_over(base, top, alpha));
                }
            }
        }
    }
}

/// Porter-Duff source-over on straight alpha, with the top alpha scaled by `alpha`.
pub fn source_over(base: Rgba, top: Rgba, alpha: f32) -> Rgba {
    let top_a = f32::from(top[3]) / 255.0 * alpha.clamp(0.0, 1.0);
    if top_a <= 0.0 {
        return base;
    }
    if top_a >= 1.0 {
        return [top[0], top[1], top[2], 255];
    }
    let base_a = f32::from(base[3]) / 255.0;
    let out_a = top_a + base_a * (1.0 - top_a);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }
    let channel = |i: usize| {
        let value = (f32::from(top[i]) * top_a + f32::from(base[i]) * base_a * (1.0 - top_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Porter-Duff destination-out: removes `strength` (0..=1) of the existing alpha.
pub fn destination_out(base: Rgba, strength: f32) -> Rgba {
    let keep = 1.0 - strength.clamp(0.0, 1.0);
    let alpha = (f32::from(base[3]) * keep).round() as u8;
    if alpha == 0 {
        TRANSPARENT
    } else {
        [base[0], base[1], base[2], alpha]
    }
}

/// In-memory [`RasterSurface`] backed by an [`RgbaImage`].
#[derive(Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// A fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn fill(&mut self, pixel: Rgba) {
        for p in self.image.pixels_mut() {
            p.0 = pixel;
        }
    }

    /// Fills the intersection of the given rectangle with the surface.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: u32, height: u32, pixel: Rgba) {
        for py in y..y + i64::from(height) {
            for px in x..x + i64::from(width) {
                self.write_pixel(px, py, pixel);
            }
        }
    }

    /// Whether every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Converts to an egui image for uploading as a texture.
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(
            [self.image.width() as usize, self.image.height() as usize],
            self.image.as_raw(),
        )
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

impl RasterSurface for PixelBuffer {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn read_pixel(&self, x: i64, y: i64) -> Option<Rgba> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.image.get_pixel(x as u32, y as u32).0)
    }

    fn write_pixel(&mut self, x: i64, y: i64, pixel: Rgba) {
        if self.contains(x, y) {
            self.image.get_pixel_mut(x as u32, y as u32).0 = pixel;
        }
    }

    fn clear(&mut self) {
        self.fill(TRANSPARENT);
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == self.size() {
            return;
        }
        self.image = if self.image.width() == 0 || self.image.height() == 0 {
            RgbaImage::new(width, height)
        } else {
            imageops::resize(&self.image, width, height, imageops::FilterType::Triangle)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    #[test]
    fn test_source_over_opaque_replaces() {
        assert_eq!(source_over(RED, BLUE, 1.0), BLUE);
    }

    #[test]
    fn test_source_over_half_alpha_mixes() {
        let mixed = source_over(RED, BLUE, 0.5);
        assert_eq!(mixed[3], 255);
        assert!((i32::from(mixed[0]) - 128).abs() <= 1);
        assert!((i32::from(mixed[2]) - 128).abs() <= 1);
    }

    #[test]
    fn test_source_over_onto_transparent_keeps_color() {
        let out = source_over(TRANSPARENT, RED, 0.5);
        assert_eq!(&out[..3], &RED[..3]);
        assert_eq!(out[3], 128);
    }

    #[test]
    fn test_destination_out() {
        assert_eq!(destination_out(RED, 1.0), TRANSPARENT);
        assert_eq!(destination_out(RED, 0.0), RED);
        assert_eq!(destination_out(RED, 0.5)[3], 128);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut buffer = PixelBuffer::new(4, 4);
        assert_eq!(buffer.read_pixel(-1, 0), None);
        assert_eq!(buffer.read_pixel(4, 0), None);
        buffer.write_pixel(10, 10, RED);
        assert!(buffer.is_blank());
    }

    #[test]
    fn test_draw_surface_with_offset() {
        let mut dst = PixelBuffer::new(4, 4);
        let mut src = PixelBuffer::new(2, 2);
        src.fill(RED);
        dst.draw_surface(&src, 3, 3, 1.0);
        assert_eq!(dst.read_pixel(3, 3), Some(RED));
        assert_eq!(dst.read_pixel(2, 2), Some(TRANSPARENT));
    }

    #[test]
    fn test_draw_surface_far_offsets_draw_nothing() {
        let mut dst = PixelBuffer::new(4, 4);
        let mut src = PixelBuffer::new(2, 2);
        src.fill(RED);
        dst.draw_surface(&src, i64::MAX, 0, 1.0);
        dst.draw_surface(&src, 0, i64::MAX - 1, 1.0);
        dst.draw_surface(&src, i64::MIN, i64::MIN, 1.0);
        assert!(dst.is_blank());
    }

    #[test]
    fn test_resize_stretches_content() {
        let mut buffer = PixelBuffer::new(2, 2);
        buffer.fill(BLUE);
        buffer.resize(6, 4);
        assert_eq!(buffer.size(), (6, 4));
        assert_eq!(buffer.read_pixel(0, 0), Some(BLUE));
        assert_eq!(buffer.read_pixel(5, 3), Some(BLUE));
    }
}
