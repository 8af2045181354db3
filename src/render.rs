//! Per-pixel MSDF evaluation (§4.4): for each pixel, the minimum signed
//! distance per channel across every edge of every contour, pooled across
//! all contours (no global winding-forced sign — see SPEC_FULL.md).

use crate::bitmap::RgbBitmap;
use crate::color::EdgeColor;
use crate::segment::{Edge, SignedDistance};
use crate::shape::ColouredShape;
use crate::vector::{vec2, Vec2};

/// Scale + translate relating pixel centre coordinates to outline
/// coordinates (§3, §6).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translate: Vec2,
}

impl Transform {
    /// Pixel centre `(px + 0.5, py + 0.5)`, with `py` measured from the top
    /// (output row index) to outline-space `q` (outline Y points up).
    pub fn pixel_to_outline(&self, px: u32, py: u32, height: u32) -> Vec2 {
        let row_from_bottom = height - 1 - py;
        let x = (px as f64 + 0.5) / self.scale - self.translate.x;
        let y = (row_from_bottom as f64 + 0.5) / self.scale - self.translate.y;
        vec2(x, y)
    }

    /// Inverse of [`Self::pixel_to_outline`]: maps an outline-space point to
    /// fractional pixel-centre coordinates, used by error correction to find
    /// which pixels sit near a colour-boundary corner.
    pub fn outline_to_pixel(&self, q: Vec2, height: u32) -> (f64, f64) {
        let row_from_bottom = (q.y + self.translate.y) * self.scale - 0.5;
        let px = (q.x + self.translate.x) * self.scale - 0.5;
        let py = (height - 1) as f64 - row_from_bottom;
        (px, py)
    }
}

#[derive(Clone, Copy)]
struct ChannelWinner {
    distance: SignedDistance,
    edge: Option<Edge>,
    t: f64,
}

impl ChannelWinner {
    fn new() -> Self {
        ChannelWinner { distance: SignedDistance::INFINITE, edge: None, t: 0.0 }
    }

    fn consider(&mut self, edge: &Edge, distance: SignedDistance, t: f64) {
        if distance < self.distance {
            self.distance = distance;
            self.edge = Some(*edge);
            self.t = t;
        }
    }

    /// Final per-channel signed distance, promoted to a pseudo-distance when
    /// the winning closest point lies at or beyond an endpoint (§4.1.4).
    fn resolve(&self, q: Vec2) -> f64 {
        match &self.edge {
            Some(edge) => edge.segment.to_pseudo_distance(self.distance, q, self.t).distance,
            None => self.distance.distance,
        }
    }
}

fn distance_to_byte(distance: f64, range_px: f64) -> u8 {
    let value = 128.0 - 255.0 * distance / range_px;
    value.round().clamp(0.0, 255.0) as u8
}

/// Evaluates the three-channel signed distance at a single outline-space
/// point `q`, pooling every edge of every contour of `shape` (§4.4).
fn evaluate_point(shape: &ColouredShape, q: Vec2) -> [f64; 3] {
    let mut r = ChannelWinner::new();
    let mut g = ChannelWinner::new();
    let mut b = ChannelWinner::new();

    for contour in &shape.contours {
        for edge in &contour.edges {
            let (distance, t) = edge.segment.signed_distance(q);
            if edge.color.contains(EdgeColor::RED) {
                r.consider(edge, distance, t);
            }
            if edge.color.contains(EdgeColor::GREEN) {
                g.consider(edge, distance, t);
            }
            if edge.color.contains(EdgeColor::BLUE) {
                b.consider(edge, distance, t);
            }
        }
    }

    [r.resolve(q), g.resolve(q), b.resolve(q)]
}

/// Generates the MSDF bitmap for `shape` at `width x height`, with `range_px`
/// mapping to the full output byte range and `transform` relating pixel
/// centres to outline coordinates (§4.4). This is the core pure function;
/// it performs no error correction (see `crate::correct`).
pub fn generate_msdf(shape: &ColouredShape, width: u32, height: u32, range_px: f64, transform: &Transform) -> RgbBitmap {
    let mut bitmap = RgbBitmap::new(width, height);

    for py in 0..height {
        for px in 0..width {
            let q = transform.pixel_to_outline(px, py, height);
            let [dr, dg, db] = evaluate_point(shape, q);
            bitmap.set_pixel(
                px,
                py,
                [distance_to_byte(dr, range_px), distance_to_byte(dg, range_px), distance_to_byte(db, range_px)],
            );
        }
    }

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contour::Contour;
    use crate::options::Options;
    use crate::segment::EdgeSegment;
    use crate::shape::Shape;

    fn unit_square() -> ColouredShape {
        let pts = [vec2(10.0, 10.0), vec2(10.0, 90.0), vec2(90.0, 90.0), vec2(90.0, 10.0)];
        let mut c = Contour::new();
        for i in 0..4 {
            c.edges.push(EdgeSegment::Line(pts[i], pts[(i + 1) % 4]).white());
        }
        Shape::new(vec![c]).orient_and_color(&Options::default())
    }

    #[test]
    fn s1_unit_square_inside_and_outside() {
        let shape = unit_square();
        let transform = Transform { scale: 1.0, translate: vec2(0.0, 0.0) };
        let bitmap = generate_msdf(&shape, 100, 100, 4.0, &transform);

        let median = |rgb: [u8; 3]| {
            let mut v = rgb;
            v.sort_unstable();
            v[1]
        };

        // deep inside, near (50, 50) in outline space.
        let inside = median(bitmap.get_pixel(50, 49));
        assert!(inside > 200, "inside median was {inside}");

        // deep outside, near (1,1).
        let outside = median(bitmap.get_pixel(1, 98));
        assert!(outside < 50, "outside median was {outside}");
    }

    #[test]
    fn determinism_same_input_same_output() {
        let shape = unit_square();
        let transform = Transform { scale: 1.0, translate: vec2(0.0, 0.0) };
        let a = generate_msdf(&shape, 32, 32, 4.0, &transform);
        let b = generate_msdf(&shape, 32, 32, 4.0, &transform);
        assert_eq!(a, b);
    }
}
