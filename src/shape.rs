//! Shape: an ordered sequence of contours, plus orientation and colouring.

use ttf_parser::{Face, GlyphId};

use crate::build::Builder;
use crate::color_edges::color_contours;
use crate::contour::{Bounds, Contour};
use crate::options::Options;
use crate::orient::orient_contours;

#[derive(Debug, Clone)]
pub struct Shape {
    pub contours: Vec<Contour>,
}

impl Shape {
    pub fn new(contours: Vec<Contour>) -> Self {
        Shape { contours }
    }

    /// Extracts the shape from a glyph's outline. Returns `None` if the font
    /// has no outline for this glyph (e.g. whitespace), mirroring spec §7's
    /// `DegenerateShape` non-fatal path.
    pub fn from_glyph(face: &Face, glyph: GlyphId) -> Option<Self> {
        let mut builder = Builder::default();
        face.outline_glyph(glyph, &mut builder)?;
        Some(Shape { contours: builder.contours })
    }

    pub fn bounds(&self) -> Bounds {
        self.contours.iter().fold(Bounds::empty(), |acc, c| acc.union(c.bounds()))
    }

    pub fn is_degenerate(&self) -> bool {
        self.contours.is_empty() || self.bounds().area() <= 0.0
    }

    /// Re-orients every contour defensively (§4.2), then colours the edges
    /// (§4.3), producing the `ColouredShape` the evaluator consumes.
    pub fn orient_and_color(mut self, options: &Options) -> ColouredShape {
        orient_contours(&mut self.contours);
        color_contours(&mut self.contours, options);
        ColouredShape { contours: self.contours }
    }
}

/// A shape whose contours have been oriented and whose edges have all been
/// assigned a colour. This is the type the evaluator (`render`) consumes.
#[derive(Debug, Clone)]
pub struct ColouredShape {
    pub contours: Vec<Contour>,
}

impl ColouredShape {
    pub fn bounds(&self) -> Bounds {
        self.contours.iter().fold(Bounds::empty(), |acc, c| acc.union(c.bounds()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::EdgeSegment;
    use crate::vector::vec2;

    fn unit_square_cw() -> Shape {
        let pts = [vec2(10.0, 10.0), vec2(10.0, 90.0), vec2(90.0, 90.0), vec2(90.0, 10.0)];
        let mut c = Contour::new();
        for i in 0..4 {
            c.edges.push(EdgeSegment::Line(pts[i], pts[(i + 1) % 4]).white());
        }
        Shape::new(vec![c])
    }

    #[test]
    fn orientation_fixes_cw_square() {
        let shape = unit_square_cw();
        assert_eq!(shape.contours[0].winding(), -1);
        let coloured = shape.orient_and_color(&Options::default());
        assert_eq!(coloured.contours[0].winding(), 1);
    }

    #[test]
    fn degenerate_empty_shape() {
        let shape = Shape::new(vec![]);
        assert!(shape.is_degenerate());
    }
}
