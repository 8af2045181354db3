//! Shape orientation (§4.2): determines the correct winding for every
//! contour and reverses whichever ones disagree with it.

use smallvec::SmallVec;

use crate::contour::Contour;
use crate::segment::EdgeSegment;
use crate::vector::Vec2;

/// A single crossing of a horizontal ray cast in the +x direction, used by
/// the point-in-contour parity test.
struct Crossing {
    x: f64,
    rising: bool,
}

fn line_crossing(p0: Vec2, p1: Vec2, q: Vec2) -> Option<Crossing> {
    if (p0.y > q.y) == (p1.y > q.y) {
        return None;
    }
    let t = (q.y - p0.y) / (p1.y - p0.y);
    let x = p0.x + t * (p1.x - p0.x);
    Some(Crossing { x, rising: p1.y > p0.y })
}

/// Crossings of a segment's curve against the horizontal line `y = q.y`,
/// found by solving the (quadratic/cubic) parametric y(t) = q.y equation. A
/// single segment crosses a horizontal line at most 3 times (cubic), so a
/// stack-allocated `SmallVec` avoids a heap allocation per segment per pixel.
fn segment_crossings(segment: &EdgeSegment, q: Vec2) -> SmallVec<[Crossing; 3]> {
    match *segment {
        EdgeSegment::Line(p0, p1) => line_crossing(p0, p1, q).into_iter().collect(),
        EdgeSegment::Quadratic(p0, p1, p2) => {
            let a = p0.y - 2.0 * p1.y + p2.y;
            let b = 2.0 * (p1.y - p0.y);
            let c = p0.y - q.y;

            let mut out = SmallVec::new();
            for &t in roots::find_roots_quadratic(a, b, c).as_ref() {
                if t >= 0.0 && t < 1.0 {
                    let point = segment.point(t);
                    let dy = 2.0 * a * t + b;
                    if dy != 0.0 {
                        out.push(Crossing { x: point.x, rising: dy > 0.0 });
                    }
                }
            }
            out
        }
        EdgeSegment::Cubic(p0, p1, p2, p3) => {
            let d = p0.y;
            let c = 3.0 * (p1.y - p0.y);
            let b = 3.0 * (p0.y - 2.0 * p1.y + p2.y);
            let a = p3.y - 3.0 * p2.y + 3.0 * p1.y - p0.y;

            let mut out = SmallVec::new();
            for &t in roots::find_roots_cubic(a, b, c, d - q.y).as_ref() {
                if t >= 0.0 && t < 1.0 {
                    let point = segment.point(t);
                    let dy = 3.0 * a * t * t + 2.0 * b * t + c;
                    if dy != 0.0 {
                        out.push(Crossing { x: point.x, rising: dy > 0.0 });
                    }
                }
            }
            out
        }
    }
}

/// Non-zero-rule winding number of `contour` around `q`, via a +x ray cast.
fn winding_number_around(contour: &Contour, q: Vec2) -> i32 {
    let mut winding = 0;
    for edge in &contour.edges {
        for crossing in segment_crossings(&edge.segment, q) {
            if crossing.x > q.x {
                winding += if crossing.rising { 1 } else { -1 };
            }
        }
    }
    winding
}

/// Orients every contour of `contours` so that the outermost contour(s) wind
/// CCW (positive signed area) and every contour enclosed by an odd number of
/// other contours winds the opposite way from one enclosed by an even number
/// (§4.2).
pub fn orient_contours(contours: &mut [Contour]) {
    if contours.is_empty() {
        return;
    }

    let bounds: Vec<_> = contours.iter().map(|c| c.bounds()).collect();

    let max_area = bounds.iter().map(|b| b.area()).fold(f64::NEG_INFINITY, f64::max);
    let tied: Vec<usize> = (0..contours.len()).filter(|&i| (bounds[i].area() - max_area).abs() <= max_area.abs() * 1e-9).collect();

    let outer_index = if tied.len() == 1 {
        tied[0]
    } else {
        // equal bounds area: the true outer contour is the one not
        // contained by any of the other tied candidates.
        tied.iter()
            .copied()
            .find(|&i| {
                !contours[i].edges.is_empty()
                    && tied.iter().all(|&j| {
                        j == i
                            || contours[j].edges.is_empty()
                            || winding_number_around(&contours[j], contours[i].edges[0].segment.start_point()) == 0
                    })
            })
            .unwrap_or(tied[0])
    };

    for i in 0..contours.len() {
        if contours[i].edges.is_empty() {
            continue;
        }

        let expected_sign = if i == outer_index {
            1
        } else {
            let probe = contours[i].edges[0].segment.start_point();
            let mut containing = 0;
            for (j, other) in contours.iter().enumerate() {
                if j == i || other.edges.is_empty() {
                    continue;
                }
                if winding_number_around(other, probe) != 0 {
                    containing += 1;
                }
            }
            if containing % 2 == 1 {
                -1
            } else {
                1
            }
        };

        let actual_sign = contours[i].winding();
        if actual_sign != 0 && actual_sign != expected_sign {
            log::debug!("orient_contours: reversing contour {i} (actual {actual_sign}, expected {expected_sign})");
            contours[i].reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::EdgeSegment;
    use crate::vector::vec2;

    fn square(cx: f64, cy: f64, r: f64, ccw: bool) -> Contour {
        let pts = if ccw {
            [vec2(cx - r, cy - r), vec2(cx + r, cy - r), vec2(cx + r, cy + r), vec2(cx - r, cy + r)]
        } else {
            [vec2(cx - r, cy - r), vec2(cx - r, cy + r), vec2(cx + r, cy + r), vec2(cx + r, cy - r)]
        };
        let mut c = Contour::new();
        for i in 0..4 {
            c.edges.push(EdgeSegment::Line(pts[i], pts[(i + 1) % 4]).white());
        }
        c
    }

    #[test]
    fn single_contour_is_forced_ccw() {
        let mut contours = vec![square(0.0, 0.0, 5.0, false)];
        assert_eq!(contours[0].winding(), -1);
        orient_contours(&mut contours);
        assert_eq!(contours[0].winding(), 1);
    }

    #[test]
    fn hole_winds_opposite_outer() {
        // outer CCW square, inner (hole) also CCW before orientation: must
        // be flipped to CW since it's contained once (odd) by the outer.
        let mut contours = vec![square(0.0, 0.0, 10.0, true), square(0.0, 0.0, 3.0, true)];
        orient_contours(&mut contours);
        assert_eq!(contours[0].winding(), 1);
        assert_eq!(contours[1].winding(), -1);
    }

    #[test]
    fn already_oriented_is_a_no_op() {
        let mut contours = vec![square(0.0, 0.0, 10.0, true), square(0.0, 0.0, 3.0, false)];
        let before: Vec<_> = contours.iter().map(|c| c.winding()).collect();
        orient_contours(&mut contours);
        let after: Vec<_> = contours.iter().map(|c| c.winding()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn outer_tie_break_uses_containment_when_bounds_area_matches() {
        // a diamond inscribed in a square: both share the same 10x10
        // bounding box (and so the same bounds area), but the diamond is
        // strictly the inner, nested contour. Placing it last exercises the
        // tie-break: a bare `max_by` over equal areas would otherwise pick
        // it (the later element) as the outer contour.
        let outer = square(0.0, 0.0, 5.0, true);

        let diamond_pts = [vec2(2.5, -2.5), vec2(5.0, 0.0), vec2(0.0, 5.0), vec2(-5.0, 0.0), vec2(0.0, -5.0)];
        let mut inner = Contour::new();
        for i in 0..diamond_pts.len() {
            inner.edges.push(EdgeSegment::Line(diamond_pts[i], diamond_pts[(i + 1) % diamond_pts.len()]).white());
        }

        assert_eq!(outer.bounds().area(), inner.bounds().area());

        let mut contours = vec![outer, inner];
        orient_contours(&mut contours);
        assert_eq!(contours[0].winding(), 1);
        assert_eq!(contours[1].winding(), -1);
    }
}
