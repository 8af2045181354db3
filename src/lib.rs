//! Multi-channel signed distance field generation for a single font glyph:
//! orient contours, colour edges, evaluate the per-pixel field, then run
//! error correction.

pub mod bitmap;
pub mod build;
pub mod color;
pub mod color_edges;
pub mod contour;
pub mod correct;
pub mod error;
pub mod options;
pub mod orient;
pub mod render;
pub mod segment;
pub mod shape;
pub mod vector;

use ttf_parser::Face;

pub use bitmap::{GlyphMetrics, RgbBitmap};
pub use error::{Error, ErrorKind, Result};
pub use options::{CorrectionThresholds, Options};
pub use shape::Shape;

use render::Transform;
use vector::vec2;

/// Computes the `Transform` relating pixel centres to outline coordinates,
/// either with the reference autoframe formula (§6) or, when
/// `options.msdfgen_autoframe` is false, a conservative formula that applies
/// `options.padding` as a literal margin and never lets the glyph touch the
/// bitmap edge.
fn compute_transform(bounds: contour::Bounds, options: &Options) -> Transform {
    let size = options.size as f64;
    let glyph_w = bounds.width();
    let glyph_h = bounds.height();

    if options.msdfgen_autoframe {
        let p = options.range;
        let frame_w = size - p;
        let frame_h = size - p;
        let scale = (frame_w / glyph_w).min(frame_h / glyph_h);

        let translate_x = (frame_w / scale - glyph_w) / 2.0 + (p / 2.0) / scale - bounds.x_min;
        let translate_y = (frame_h / scale - glyph_h) / 2.0 + (p / 2.0) / scale - bounds.y_min;

        Transform { scale, translate: vec2(translate_x, translate_y) }
    } else {
        let frame_w = size - 2.0 * options.padding;
        let frame_h = size - 2.0 * options.padding;
        let scale = (frame_w / glyph_w).min(frame_h / glyph_h);

        let translate_x = (size / scale - glyph_w) / 2.0 - bounds.x_min;
        let translate_y = (size / scale - glyph_h) / 2.0 - bounds.y_min;

        Transform { scale, translate: vec2(translate_x, translate_y) }
    }
}

fn glyph_metrics(face: &Face, glyph_id: ttf_parser::GlyphId, bounds: Option<contour::Bounds>) -> GlyphMetrics {
    let units_per_em = face.units_per_em() as f64;
    let advance_width = face.glyph_hor_advance(glyph_id).map(|a| a as f64 / units_per_em).unwrap_or(0.0);

    match bounds {
        Some(b) => GlyphMetrics {
            advance_width,
            bearing_x: b.x_min / units_per_em,
            bearing_y: b.y_max / units_per_em,
            width: b.width() / units_per_em,
            height: b.height() / units_per_em,
        },
        None => GlyphMetrics { advance_width, ..GlyphMetrics::default() },
    }
}

/// Generates the MSDF bitmap and metrics for `codepoint` in `face`, per the
/// `size`/`padding`/`range`/... fields of `options`.
///
/// A codepoint with no glyph in the font is `ErrorKind::GlyphNotInFont`. A
/// glyph with no outline, or whose outline bounds have zero area (whitespace,
/// for instance), is not an error: it returns a uniform fully-outside bitmap
/// (all bytes 0) with metrics limited to `advance_width`.
pub fn generate_glyph(face: &Face, codepoint: char, options: &Options) -> Result<(RgbBitmap, GlyphMetrics)> {
    let glyph_id = face
        .glyph_index(codepoint)
        .ok_or_else(|| ErrorKind::GlyphNotInFont.with(format!("no glyph for U+{:04X}", codepoint as u32)))?;

    let shape = Shape::from_glyph(face, glyph_id);

    let shape = match shape {
        Some(shape) if !shape.is_degenerate() => shape,
        _ => {
            log::debug!("generate_glyph: degenerate shape for U+{:04X}, emitting blank bitmap", codepoint as u32);
            let bitmap = RgbBitmap::new(options.size, options.size);
            return Ok((bitmap, glyph_metrics(face, glyph_id, None)));
        }
    };

    let bounds = shape.bounds();
    let metrics = glyph_metrics(face, glyph_id, Some(bounds));
    let transform = compute_transform(bounds, options);

    let coloured = shape.orient_and_color(options);
    let mut bitmap = render::generate_msdf(&coloured, options.size, options.size, options.range, &transform);

    if options.error_correction {
        correct::error_correct(
            &mut bitmap,
            &coloured.contours,
            &transform,
            &options.correction_thresholds,
            options.corner_protection_radius,
        );
    }

    Ok((bitmap, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::Bounds;

    #[test]
    fn autoframe_transform_centers_glyph() {
        // non-square, not anchored at the origin: catches unit mismatches
        // that a square bounds-at-origin case would hide.
        let bounds = Bounds { x_min: 20.0, y_min: -10.0, x_max: 120.0, y_max: 40.0 };
        let options = Options { size: 32, range: 4.0, msdfgen_autoframe: true, ..Options::default() };
        let transform = compute_transform(bounds, &options);

        let margin = options.range / 2.0;
        let to_px = |x: f64| (x + transform.translate.x) * transform.scale;
        let to_py = |y: f64| (y + transform.translate.y) * transform.scale;

        // width is the binding dimension (100/28 > 50/28), so the glyph sits
        // flush against the pxrange margin on both left and right.
        assert!((to_px(bounds.x_min) - margin).abs() < 1e-9);
        assert!((to_px(bounds.x_max) - (options.size as f64 - margin)).abs() < 1e-9);

        // height has slack: the glyph must be centered within the frame,
        // with equal (and larger than the minimum margin) space top/bottom.
        let top_gap = to_py(bounds.y_min);
        let bottom_gap = options.size as f64 - to_py(bounds.y_max);
        assert!((top_gap - bottom_gap).abs() < 1e-9);
        assert!(top_gap > margin);
    }

    #[test]
    fn conservative_transform_keeps_glyph_inside() {
        let bounds = Bounds { x_min: 0.0, y_min: 0.0, x_max: 100.0, y_max: 50.0 };
        let options = Options { size: 32, padding: 2.0, msdfgen_autoframe: false, ..Options::default() };
        let transform = compute_transform(bounds, &options);

        for &(x, y) in &[(bounds.x_min, bounds.y_min), (bounds.x_max, bounds.y_max)] {
            let px = (x + transform.translate.x) * transform.scale;
            assert!(px >= options.padding - 1e-6 && px <= options.size as f64 - options.padding + 1e-6);
            let _ = y;
        }
    }

    #[test]
    fn glyph_not_in_font_error_message_includes_codepoint() {
        let err = ErrorKind::GlyphNotInFont.with(format!("no glyph for U+{:04X}", 'z' as u32));
        assert!(err.to_string().contains("007A"));
    }
}
