use egui::{Pos2, Rect, pos2};
use image::{GrayImage, Luma, imageops};

use super::{CompositeOp, StrokeStyle};
use crate::surface::{RasterSurface, destination_out, source_over};

/// Distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Round-capped coverage of the pixel whose center is `center`, with a one
/// pixel anti-aliased rim.
fn coverage(center: Pos2, from: Pos2, to: Pos2, radius: f32) -> f32 {
    (radius + 0.5 - segment_distance(center, from, to)).clamp(0.0, 1.0)
}

/// Rasterizes a round-capped segment from `from` to `to` (surface coordinates)
/// into `surface`.
pub fn draw_segment(surface: &mut dyn RasterSurface, from: Pos2, to: Pos2, style: &StrokeStyle) {
    if style.alpha <= 0.0 || style.width <= 0.0 {
        return;
    }
    let radius = style.width / 2.0;
    let sigma = style.blur.filter(|sigma| *sigma > 0.0);
    // a gaussian is negligible beyond three sigma
    let pad = radius + 1.0 + sigma.map_or(0.0, |s| 3.0 * s);
    let bounds = Rect::from_two_pos(from, to).expand(pad);
    let surface_rect = Rect::from_min_max(
        Pos2::ZERO,
        pos2(surface.width() as f32, surface.height() as f32),
    );
    let bounds = bounds.intersect(surface_rect);
    if !bounds.is_positive() {
        return;
    }

    let x0 = bounds.min.x.floor() as i64;
    let y0 = bounds.min.y.floor() as i64;
    let x1 = bounds.max.x.ceil() as i64;
    let y1 = bounds.max.y.ceil() as i64;

    match sigma {
        None => {
            for y in y0..y1 {
                for x in x0..x1 {
                    let center = pos2(x as f32 + 0.5, y as f32 + 0.5);
                    let c = coverage(center, from, to, radius);
                    if c > 0.0 {
                        apply(surface, x, y, style, c);
                    }
                }
            }
        }
        Some(sigma) => {
            let mask_w = (x1 - x0) as u32;
            let mask_h = (y1 - y0) as u32;
            let mut mask = GrayImage::new(mask_w, mask_h);
            for (mx, my, value) in mask.enumerate_pixels_mut() {
                let center = pos2((x0 + i64::from(mx)) as f32 + 0.5, (y0 + i64::from(my)) as f32 + 0.5);
                *value = Luma([(coverage(center, from, to, radius) * 255.0).round() as u8]);
            }
            let blurred = imageops::blur(&mask, sigma);
            for (mx, my, value) in blurred.enumerate_pixels() {
                let c = f32::from(value.0[0]) / 255.0;
                if c > 0.0 {
                    apply(surface, x0 + i64::from(mx), y0 + i64::from(my), style, c);
                }
            }
        }
    }
}

fn apply(surface: &mut dyn RasterSurface, x: i64, y: i64, style: &StrokeStyle, coverage: f32) {
    let Some(base) = surface.read_pixel(x, y) else {
        return;
    };
    let strength = style.alpha * coverage;
    let pixel = match style.op {
        CompositeOp::SourceOver => {
            let [r, g, b, _] = style.color.to_srgba_unmultiplied();
            source_over(base, [r, g, b, 255], strength)
        }
        CompositeOp::DestinationOut => destination_out(base, strength),
    };
    surface.write_pixel(x, y, pixel);
}
