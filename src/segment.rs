//! Edge distance algebra: line, quadratic and cubic Bézier segments, exact
//! sign-aware perpendicular/true distance to a query point, with the
//! orthogonality tiebreaker that produces sharp corners.

use crate::color::EdgeColor;
use crate::vector::{lerp, vec2, Vec2};

/// A signed distance paired with the orthogonality of the closest approach,
/// used to break ties between edges reporting equal `|distance|`.
///
/// Comparison is by `|distance|` ascending with **exact** float equality (no
/// epsilon); on an exact tie the candidate with smaller `orthogonality`
/// (more perpendicular approach) is preferred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignedDistance {
    pub distance: f64,
    pub orthogonality: f64,
}

impl SignedDistance {
    pub const INFINITE: SignedDistance = SignedDistance { distance: f64::MAX, orthogonality: 0.0 };

    pub fn new(distance: f64, orthogonality: f64) -> Self {
        SignedDistance { distance, orthogonality }
    }
}

impl PartialOrd for SignedDistance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.distance
            .abs()
            .partial_cmp(&other.distance.abs())
            .map(|c| c.then(self.orthogonality.partial_cmp(&other.orthogonality).unwrap_or(std::cmp::Ordering::Equal)))
    }
}

/// Tagged sum of the three outline segment kinds. Colourless; pairs with an
/// `EdgeColor` in `Edge`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeSegment {
    Line(Vec2, Vec2),
    Quadratic(Vec2, Vec2, Vec2),
    Cubic(Vec2, Vec2, Vec2, Vec2),
}

/// A coloured edge: the unit the colouring and evaluation passes operate on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub segment: EdgeSegment,
    pub color: EdgeColor,
}

impl EdgeSegment {
    pub fn colored(self, color: EdgeColor) -> Edge {
        Edge { segment: self, color }
    }

    pub fn white(self) -> Edge {
        self.colored(EdgeColor::WHITE)
    }

    pub fn start_point(&self) -> Vec2 {
        match *self {
            EdgeSegment::Line(p0, _) => p0,
            EdgeSegment::Quadratic(p0, _, _) => p0,
            EdgeSegment::Cubic(p0, _, _, _) => p0,
        }
    }

    pub fn end_point(&self) -> Vec2 {
        match *self {
            EdgeSegment::Line(_, p1) => p1,
            EdgeSegment::Quadratic(_, _, p2) => p2,
            EdgeSegment::Cubic(_, _, _, p3) => p3,
        }
    }

    /// Samples the segment's position at parameter `t`.
    pub fn point(&self, t: f64) -> Vec2 {
        match *self {
            EdgeSegment::Line(a, b) => lerp(a, b, t),
            EdgeSegment::Quadratic(a, b, c) => lerp(lerp(a, b, t), lerp(b, c, t), t),
            EdgeSegment::Cubic(a, b, c, d) => {
                let p12 = lerp(b, c, t);
                lerp(lerp(lerp(a, b, t), p12, t), lerp(p12, lerp(c, d, t), t), t)
            }
        }
    }

    /// Tangent direction (unnormalised) at parameter `t`.
    pub fn direction(&self, t: f64) -> Vec2 {
        match *self {
            EdgeSegment::Line(a, b) => b - a,
            EdgeSegment::Quadratic(a, b, c) => {
                let tangent = lerp(b - a, c - b, t);
                if tangent.x == 0.0 && tangent.y == 0.0 { c - a } else { tangent }
            }
            EdgeSegment::Cubic(a, b, c, d) => {
                let tangent = lerp(lerp(b - a, c - b, t), lerp(c - b, d - c, t), t);
                if tangent.x == 0.0 && tangent.y == 0.0 {
                    if t == 0.0 {
                        c - a
                    } else if t == 1.0 {
                        d - b
                    } else {
                        tangent
                    }
                } else {
                    tangent
                }
            }
        }
    }

    /// Sign of curvature at the segment's midpoint (§4.1.5). Zero for lines.
    pub fn curvature_sign(&self) -> f64 {
        match *self {
            EdgeSegment::Line(..) => 0.0,
            EdgeSegment::Quadratic(p0, p1, p2) => (p1 - p0).cross(p2 - p1).signum(),
            EdgeSegment::Cubic(p0, p1, p2, p3) => {
                // second derivative direction at t=0.5, equivalently the
                // cross product of consecutive control-polygon legs there.
                let a = lerp(p1 - p0, p2 - p1, 0.5);
                let b = lerp(p2 - p1, p3 - p2, 0.5);
                a.cross(b).signum()
            }
        }
    }

    /// Splits the segment into three sub-segments at t=1/3, 2/3.
    pub fn split_in_three(self) -> [EdgeSegment; 3] {
        match self {
            EdgeSegment::Line(a, b) => {
                let third = self.point(1.0 / 3.0);
                let two = self.point(2.0 / 3.0);
                [EdgeSegment::Line(a, third), EdgeSegment::Line(third, two), EdgeSegment::Line(two, b)]
            }
            EdgeSegment::Quadratic(a, b, c) => {
                let third = self.point(1.0 / 3.0);
                let two = self.point(2.0 / 3.0);
                [
                    EdgeSegment::Quadratic(a, lerp(a, b, 1.0 / 3.0), third),
                    EdgeSegment::Quadratic(
                        third,
                        lerp(lerp(a, b, 5.0 / 9.0), lerp(b, c, 4.0 / 9.0), 0.5),
                        two,
                    ),
                    EdgeSegment::Quadratic(two, lerp(b, c, 2.0 / 3.0), c),
                ]
            }
            EdgeSegment::Cubic(a, b, c, d) => {
                let third = self.point(1.0 / 3.0);
                let two = self.point(2.0 / 3.0);

                let first = EdgeSegment::Cubic(
                    a,
                    if a == b { a } else { lerp(a, b, 1.0 / 3.0) },
                    lerp(lerp(a, b, 1.0 / 3.0), lerp(b, c, 1.0 / 3.0), 1.0 / 3.0),
                    third,
                );

                let second = EdgeSegment::Cubic(
                    third,
                    lerp(
                        lerp(lerp(a, b, 1.0 / 3.0), lerp(b, c, 1.0 / 3.0), 1.0 / 3.0),
                        lerp(lerp(b, c, 1.0 / 3.0), lerp(c, d, 1.0 / 3.0), 1.0 / 3.0),
                        2.0 / 3.0,
                    ),
                    lerp(
                        lerp(lerp(a, b, 2.0 / 3.0), lerp(b, c, 2.0 / 3.0), 2.0 / 3.0),
                        lerp(lerp(b, c, 2.0 / 3.0), lerp(c, d, 2.0 / 3.0), 2.0 / 3.0),
                        1.0 / 3.0,
                    ),
                    two,
                );

                let third_seg = EdgeSegment::Cubic(
                    two,
                    lerp(lerp(b, c, 2.0 / 3.0), lerp(c, d, 2.0 / 3.0), 2.0 / 3.0),
                    if c == d { d } else { lerp(c, d, 2.0 / 3.0) },
                    d,
                );

                [first, second, third_seg]
            }
        }
    }

    /// Closest-point signed distance to `q`, and the parameter `t` at which
    /// it occurs (possibly outside `[0,1]`, used by the pseudo-distance
    /// conversion).
    pub fn signed_distance(&self, q: Vec2) -> (SignedDistance, f64) {
        match *self {
            EdgeSegment::Line(p0, p1) => {
                let ab = p1 - p0;
                let aq = q - p0;
                let ab_len_sqr = ab.length_sqr();
                if ab_len_sqr < 1e-12 {
                    return (SignedDistance::new(f64::INFINITY, 0.0), 0.0);
                }

                let t_raw = aq.dot(ab) / ab_len_sqr;
                let t = t_raw.clamp(0.0, 1.0);

                if t_raw > 0.0 && t_raw < 1.0 {
                    let ortho_dist = ab.orthogonal(false).normalize().dot(aq);
                    return (SignedDistance::new(ortho_dist, 0.0), t_raw);
                }

                let closest = p0 + ab * t;
                let eq = q - closest;
                let endpoint_dist = eq.length();
                let sign = -ab.cross(aq).signum();
                let sign = if sign == 0.0 { 1.0 } else { sign };
                let ortho = ab.normalize().dot(eq.normalize()).abs();
                (SignedDistance::new(sign * endpoint_dist, ortho), t_raw)
            }
            EdgeSegment::Quadratic(p0, p1, p2) => self.quadratic_signed_distance(p0, p1, p2, q),
            EdgeSegment::Cubic(p0, p1, p2, p3) => self.cubic_signed_distance(p0, p1, p2, p3, q),
        }
    }

    fn quadratic_signed_distance(&self, p0: Vec2, p1: Vec2, p2: Vec2, q: Vec2) -> (SignedDistance, f64) {
        let qa = p0 - q;
        let ab = p1 - p0;
        let br = p2 - p1 - ab;

        // dot(B(t) - q, B'(t)) = 0, expanded into a cubic in t.
        let a = br.length_sqr();
        let b = 3.0 * ab.dot(br);
        let c = 2.0 * ab.length_sqr() + qa.dot(br);
        let d = qa.dot(ab);

        let mut best_t = 0.0;
        let mut best_dist_sqr = qa.length_sqr();

        let end_dist_sqr = (p2 - q).length_sqr();
        if end_dist_sqr < best_dist_sqr {
            best_dist_sqr = end_dist_sqr;
            best_t = 1.0;
        }

        for &t in roots::find_roots_cubic(a, b, c, d).as_ref() {
            if t > 0.0 && t < 1.0 {
                let point = self.point(t);
                let dist_sqr = (point - q).length_sqr();
                if dist_sqr < best_dist_sqr {
                    best_dist_sqr = dist_sqr;
                    best_t = t;
                }
            }
        }

        self.finish_curve_distance(q, best_t, best_dist_sqr.sqrt())
    }

    fn cubic_signed_distance(&self, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, q: Vec2) -> (SignedDistance, f64) {
        let mut best_t = 0.0;
        let mut best_dist_sqr = (p0 - q).length_sqr();

        let end_dist_sqr = (p3 - q).length_sqr();
        if end_dist_sqr < best_dist_sqr {
            best_dist_sqr = end_dist_sqr;
            best_t = 1.0;
        }

        const SEEDS: usize = 9;
        const NEWTON_STEPS: usize = 4;
        for i in 0..SEEDS {
            let mut t = i as f64 / (SEEDS - 1) as f64;
            let mut prev_delta = f64::INFINITY;
            for _ in 0..NEWTON_STEPS {
                let b = self.point(t);
                let d1 = self.direction(t);
                let d2 = cubic_second_derivative(p0, p1, p2, p3, t);

                let denom = d1.length_sqr() + (b - q).dot(d2);
                if denom.abs() < 1e-12 {
                    break;
                }
                let delta = (b - q).dot(d1) / denom;
                let new_t = (t - delta).clamp(0.0, 1.0);
                if delta.abs() >= prev_delta {
                    // failing to converge; keep whatever we have and stop.
                    break;
                }
                prev_delta = delta.abs();
                t = new_t;

                let dist_sqr = (self.point(t) - q).length_sqr();
                if dist_sqr < best_dist_sqr {
                    best_dist_sqr = dist_sqr;
                    best_t = t;
                }
            }
        }

        self.finish_curve_distance(q, best_t, best_dist_sqr.sqrt())
    }

    /// Shared tail for quadratic/cubic: derives sign from the tangent cross
    /// product and orthogonality from the interior-tangent rule (§4.1.2).
    fn finish_curve_distance(&self, q: Vec2, t: f64, magnitude: f64) -> (SignedDistance, f64) {
        let closest = self.point(t);
        let to_q = q - closest;

        let tangent = if t <= 0.0 {
            self.direction(0.01)
        } else if t >= 1.0 {
            self.direction(0.99)
        } else {
            self.direction(t)
        };

        let sign = to_q.cross(tangent).signum();
        let sign = if sign == 0.0 { 1.0 } else { sign };

        let orthogonality = if t > 0.0 && t < 1.0 {
            0.0
        } else {
            let endpoint_tangent = if t <= 0.0 { self.direction(0.0) } else { self.direction(1.0) };
            endpoint_tangent.normalize().dot(to_q.normalize()).abs()
        };

        (SignedDistance::new(sign * magnitude, orthogonality), t)
    }

    /// Converts a true distance to a pseudo-distance when the closest
    /// parameter lies at or beyond an endpoint (§4.1.4): perpendicular
    /// distance to the tangent ray extended past that endpoint, accepted
    /// only when it is not larger in magnitude than the true distance.
    pub fn to_pseudo_distance(&self, distance: SignedDistance, q: Vec2, t: f64) -> SignedDistance {
        if t < 0.0 {
            let dir = self.direction(0.0).normalize();
            let aq = q - self.start_point();
            if aq.dot(dir) < 0.0 {
                let perp = aq.cross(dir);
                if perp.abs() <= distance.distance.abs() {
                    return SignedDistance::new(perp, 0.0);
                }
            }
        } else if t > 1.0 {
            let dir = self.direction(1.0).normalize();
            let bq = q - self.end_point();
            if bq.dot(dir) > 0.0 {
                let perp = bq.cross(dir);
                if perp.abs() <= distance.distance.abs() {
                    return SignedDistance::new(perp, 0.0);
                }
            }
        }
        distance
    }
}

fn cubic_second_derivative(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f64) -> Vec2 {
    (6.0 * (1.0 - t)) * (p2 - 2.0 * p1 + p0) + (6.0 * t) * (p3 - 2.0 * p2 + p1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_interior_is_perpendicular_distance() {
        let line = EdgeSegment::Line(vec2(0.0, 0.0), vec2(10.0, 0.0));
        let (sd, _) = line.signed_distance(vec2(5.0, 2.0));
        assert!((sd.distance.abs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn line_degenerate_is_inert() {
        let line = EdgeSegment::Line(vec2(3.0, 3.0), vec2(3.0, 3.0));
        let (sd, _) = line.signed_distance(vec2(0.0, 0.0));
        assert!(sd.distance.is_infinite());
    }

    #[test]
    fn line_endpoint_distance_is_euclidean() {
        let line = EdgeSegment::Line(vec2(0.0, 0.0), vec2(10.0, 0.0));
        let (sd, t) = line.signed_distance(vec2(-3.0, 4.0));
        assert!(t < 0.0);
        assert!((sd.distance.abs() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn quadratic_matches_endpoint_at_extremes() {
        let quad = EdgeSegment::Quadratic(vec2(0.0, 0.0), vec2(5.0, 10.0), vec2(10.0, 0.0));
        let (sd, t) = quad.signed_distance(vec2(0.0, 0.0));
        assert!(t.abs() < 1e-6);
        assert!(sd.distance.abs() < 1e-6);
    }

    #[test]
    fn cubic_closest_point_is_reasonable() {
        let cubic = EdgeSegment::Cubic(vec2(0.0, 0.0), vec2(0.0, 10.0), vec2(10.0, 10.0), vec2(10.0, 0.0));
        let (sd, t) = cubic.signed_distance(vec2(5.0, 5.0));
        assert!(t > 0.0 && t < 1.0);
        assert!(sd.distance.is_finite());
    }

    #[test]
    fn split_in_three_preserves_endpoints() {
        let line = EdgeSegment::Line(vec2(0.0, 0.0), vec2(9.0, 0.0));
        let [a, b, c] = line.split_in_three();
        assert_eq!(a.start_point(), vec2(0.0, 0.0));
        assert_eq!(c.end_point(), vec2(9.0, 0.0));
        assert_eq!(a.end_point(), b.start_point());
        assert_eq!(b.end_point(), c.start_point());
    }

    #[test]
    fn signed_distance_ties_prefer_more_perpendicular() {
        // Two lines meeting at a corner; a point equidistant from both but
        // more perpendicular to one must pick that one (S4).
        let a = SignedDistance::new(2.0, 0.0);
        let b = SignedDistance::new(2.0, 0.5);
        assert!(a < b);
    }
}
