use egui::Color32;

use crate::error::{PaintError, PaintResult};

/// Milliseconds per degree of hue in rainbow mode.
const RAINBOW_MS_PER_DEGREE: f64 = 50.0;

/// Formats the RGB part of a color as `#rrggbb`.
pub fn to_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Parses `#rrggbb` (leading `#` optional, case-insensitive) into an opaque color.
pub fn parse_hex(text: &str) -> PaintResult<Color32> {
    let digits = text.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(PaintError::InvalidColor(text.to_owned()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| PaintError::InvalidColor(text.to_owned()))
    };
    Ok(Color32::from_rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Converts HSL (hue in degrees, saturation and lightness in 0..=1) to an opaque color.
pub fn hsl_to_color(hue: f64, saturation: f64, lightness: f64) -> Color32 {
    let hue = hue.rem_euclid(360.0);
    let s = saturation.clamp(0.0, 1.0);
    let l = lightness.clamp(0.0, 1.0);

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = l - chroma / 2.0;
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(to_u8(r), to_u8(g), to_u8(b))
}

/// Hue of the rainbow brush at the given wall-clock time.
pub fn rainbow_hue(now_millis: f64) -> f64 {
    (now_millis / RAINBOW_MS_PER_DEGREE).rem_euclid(360.0)
}

/// Rainbow brush color: time-driven hue at full saturation and half lightness.
pub fn rainbow_color(now_millis: f64) -> Color32 {
    hsl_to_color(rainbow_hue(now_millis), 1.0, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = parse_hex("#1a2B3c").unwrap();
        assert_eq!(color, Color32::from_rgb(0x1a, 0x2b, 0x3c));
        assert_eq!(to_hex(color), "#1a2b3c");
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#zzzzzz").is_err());
        assert!(parse_hex("").is_err());
    }

    #[test]
    fn test_primary_hues() {
        assert_eq!(hsl_to_color(0.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl_to_color(120.0, 1.0, 0.5), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl_to_color(240.0, 1.0, 0.5), Color32::from_rgb(0, 0, 255));
        assert_eq!(hsl_to_color(360.0, 1.0, 0.5), Color32::from_rgb(255, 0, 0));
    }

    #[test]
    fn test_rainbow_advances_with_time() {
        assert_eq!(rainbow_hue(0.0), 0.0);
        assert_eq!(rainbow_hue(50.0 * 120.0), 120.0);
        // wraps every 18 seconds
        assert_eq!(rainbow_hue(18_000.0), 0.0);
        assert_eq!(rainbow_color(50.0 * 240.0), Color32::from_rgb(0, 0, 255));
    }
}
