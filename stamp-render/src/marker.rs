//! Marker rasterization - the payload as a tinted QR bitmap.

use image::{imageops, Luma, Rgba, RgbaImage};
use qrcode::QrCode;

use crate::error::{RenderError, RenderResult};

/// Parse a hex color like `#000`, `#2e8b57`, or `2e8b57` into RGB bytes.
///
/// # Errors
///
/// Returns [`RenderError::InvalidColor`] for anything that is not a 3- or
/// 6-digit hex triplet.
pub fn parse_hex_color(value: &str) -> RenderResult<[u8; 3]> {
    let digits = value.strip_prefix('#').unwrap_or(value);
    let invalid = || RenderError::InvalidColor(value.to_string());

    match digits.len() {
        3 => {
            let mut rgb = [0_u8; 3];
            for (slot, ch) in rgb.iter_mut().zip(digits.chars()) {
                let nibble =
                    u8::from_str_radix(&ch.to_string(), 16).map_err(|_| invalid())?;
                *slot = nibble * 0x11;
            }
            Ok(rgb)
        }
        6 => {
            let mut rgb = [0_u8; 3];
            for (index, slot) in rgb.iter_mut().enumerate() {
                let pair = digits
                    .get(index * 2..index * 2 + 2)
                    .ok_or_else(invalid)?;
                *slot = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
            }
            Ok(rgb)
        }
        _ => Err(invalid()),
    }
}

/// Rasterize `payload` as a QR bitmap with edge `size` pixels.
///
/// Dark modules take the given foreground color; light modules stay fully
/// transparent so the underlying photo shows through.
///
/// # Errors
///
/// Returns [`RenderError::Marker`] when the payload exceeds QR capacity and
/// [`RenderError::InvalidColor`] for an unparsable color.
pub fn render_marker(payload: &str, size: u32, color: &str) -> RenderResult<RgbaImage> {
    let [red, green, blue] = parse_hex_color(color)?;

    let code = QrCode::new(payload.as_bytes())
        .map_err(|error| RenderError::Marker(error.to_string()))?;
    let modules = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .min_dimensions(size, size)
        .build();

    // Integer module sizes rarely land exactly on the requested edge;
    // nearest-neighbor keeps the modules crisp when snapping to it.
    let snapped = if modules.dimensions() == (size, size) {
        modules
    } else {
        imageops::resize(&modules, size, size, imageops::FilterType::Nearest)
    };

    let mut marker = RgbaImage::new(size, size);
    for (x, y, pixel) in snapped.enumerate_pixels() {
        let tinted = if pixel[0] < 128 {
            Rgba([red, green, blue, 255])
        } else {
            Rgba([0, 0, 0, 0])
        };
        marker.put_pixel(x, y, tinted);
    }
    Ok(marker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex_forms() {
        assert_eq!(parse_hex_color("#000").expect("short"), [0, 0, 0]);
        assert_eq!(parse_hex_color("#222").expect("short"), [0x22, 0x22, 0x22]);
        assert_eq!(
            parse_hex_color("#2e8b57").expect("long"),
            [0x2e, 0x8b, 0x57]
        );
        assert_eq!(parse_hex_color("ff0000").expect("bare"), [255, 0, 0]);
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(parse_hex_color("#12").is_err());
        assert!(parse_hex_color("#zzzzzz").is_err());
        assert!(parse_hex_color("").is_err());
    }

    #[test]
    fn marker_matches_requested_size_and_tint() {
        let marker = render_marker(
            "https://www.google.com/maps/search/?api=1&query=48.856600,2.352200",
            90,
            "#2e8b57",
        )
        .expect("marker");
        assert_eq!(marker.dimensions(), (90, 90));

        let mut opaque = 0_u32;
        let mut transparent = 0_u32;
        for pixel in marker.pixels() {
            if pixel[3] == 255 {
                assert_eq!([pixel[0], pixel[1], pixel[2]], [0x2e, 0x8b, 0x57]);
                opaque += 1;
            } else {
                assert_eq!(pixel[3], 0);
                transparent += 1;
            }
        }
        // A QR has both dark modules and a light quiet zone.
        assert!(opaque > 0);
        assert!(transparent > 0);
    }

    #[test]
    fn identical_payloads_rasterize_identically() {
        let first = render_marker("same payload", 64, "#000").expect("marker");
        let second = render_marker("same payload", 64, "#000").expect("marker");
        assert_eq!(first.as_raw(), second.as_raw());
    }
}
