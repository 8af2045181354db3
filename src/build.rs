//! Converts a `ttf-parser` glyph outline into a `Shape`.

use ttf_parser::OutlineBuilder;

use crate::contour::Contour;
use crate::segment::EdgeSegment;
use crate::vector::{vec2, Vec2};

#[derive(Default)]
pub struct Builder {
    pub contours: Vec<Contour>,
    current: Option<Contour>,
    cur_pos: Vec2,
}

impl OutlineBuilder for Builder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = Some(Contour::new());
        self.cur_pos = vec2(x as f64, y as f64);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let current = self.current.as_mut().expect("line_to before move_to");
        let next = vec2(x as f64, y as f64);
        current.edges.push(EdgeSegment::Line(self.cur_pos, next).white());
        self.cur_pos = next;
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let current = self.current.as_mut().expect("quad_to before move_to");
        let next = vec2(x as f64, y as f64);
        current.edges.push(EdgeSegment::Quadratic(self.cur_pos, vec2(x1 as f64, y1 as f64), next).white());
        self.cur_pos = next;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let current = self.current.as_mut().expect("curve_to before move_to");
        let next = vec2(x as f64, y as f64);
        current
            .edges
            .push(EdgeSegment::Cubic(self.cur_pos, vec2(x1 as f64, y1 as f64), vec2(x2 as f64, y2 as f64), next).white());
        self.cur_pos = next;
    }

    fn close(&mut self) {
        if let Some(current) = self.current.take() {
            if !current.edges.is_empty() {
                self.contours.push(current);
            }
        }
    }
}
