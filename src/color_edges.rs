//! Edge colouring (§4.3): corner detection, spline partitioning, and colour
//! assignment so that every output channel has a nearby edge at every pixel.

use crate::color::EdgeColor;
use crate::contour::Contour;
use crate::options::Options;
use crate::segment::EdgeSegment;

fn extract_seed_bit(seed: &mut u64) -> u64 {
    let v = *seed & 1;
    *seed >>= 1;
    v
}

fn extract_seed_mod3(seed: &mut u64) -> u64 {
    let v = *seed % 3;
    *seed /= 3;
    v
}

fn init_color(seed: &mut u64) -> EdgeColor {
    const COLORS: [EdgeColor; 3] = [EdgeColor::CYAN, EdgeColor::MAGENTA, EdgeColor::YELLOW];
    COLORS[extract_seed_mod3(seed) as usize]
}

fn switch_color(color: &mut EdgeColor, seed: &mut u64) {
    let bit = extract_seed_bit(seed);
    let shifted = color.bits() << (1 + bit);
    *color = EdgeColor::from_bits((shifted | (shifted >> 3)) & EdgeColor::WHITE.bits()).unwrap();
}

fn switch_color_constrained(color: &mut EdgeColor, seed: &mut u64, banned: EdgeColor) {
    let combined = *color & banned;
    if combined == EdgeColor::RED || combined == EdgeColor::GREEN || combined == EdgeColor::BLUE {
        *color = combined ^ EdgeColor::WHITE;
    } else {
        switch_color(color, seed);
    }
}

/// For each position < n, returns -1, 0, or 1 depending on whether the
/// position is closer to the beginning, middle, or end, such that the total
/// across all positions is balanced (zero).
fn symmetrical_trichotomy(position: i32, n: i32) -> i32 {
    (3.0 + 2.875 * (position as f64) / (n as f64 - 1.0) - 1.4375 + 0.5) as i32 - 3
}

fn is_corner(a_dir: crate::vector::Vec2, b_dir: crate::vector::Vec2, threshold: f64) -> bool {
    a_dir.dot(b_dir) <= 0.0 || a_dir.cross(b_dir).abs() > threshold
}

/// Finds every corner index in `contour`: direction-based corners (§4.3) plus
/// implicit corners where curvature sign reverses between curved edges,
/// looking past zero-curvature (line) edges in between.
fn find_corners(contour: &Contour, cross_threshold: f64) -> Vec<usize> {
    let m = contour.edges.len();
    let mut corners = Vec::new();

    let mut prev = contour.edges[m - 1].segment.direction(1.0);
    for (i, edge) in contour.edges.iter().enumerate() {
        if is_corner(prev.normalize(), edge.segment.direction(0.0).normalize(), cross_threshold) {
            corners.push(i);
        }
        prev = edge.segment.direction(1.0);
    }

    let mut last_curvature: Option<f64> = None;
    for i in 0..m {
        let curvature = contour.edges[i].segment.curvature_sign();
        if curvature == 0.0 {
            continue;
        }
        if let Some(last) = last_curvature {
            if last.signum() != curvature.signum() && !corners.contains(&i) {
                corners.push(i);
            }
        }
        last_curvature = Some(curvature);
    }

    corners.sort_unstable();
    corners
}

/// Assigns colours to every edge of every contour, mutating `color` in
/// place. `seed` is the colour-cycle state, carried across contours within a
/// shape.
fn color_one_contour(contour: &mut Contour, options: &Options, seed: &mut u64, color: &mut EdgeColor) {
    if contour.edges.is_empty() {
        return;
    }

    let cross_threshold = options.angle_threshold.sin();
    let corners = find_corners(contour, cross_threshold);

    if corners.is_empty() {
        // fully smooth contour: split into three roughly equal arcs.
        switch_color(color, seed);
        let m = contour.edges.len();
        if m == 1 {
            let parts = contour.edges[0].segment.split_in_three();
            let colors = [EdgeColor::CYAN, EdgeColor::MAGENTA, EdgeColor::YELLOW];
            contour.edges = parts.into_iter().zip(colors).map(|(s, c)| s.colored(c)).collect();
            return;
        }
        // guarantee all three channels appear around the contour by
        // splitting the edge list by count, rather than leaning on the
        // channel-diversity stride (which only prevents a channel going
        // dark over a long curved run, not a 2-colour contour).
        let colors = [EdgeColor::CYAN, EdgeColor::MAGENTA, EdgeColor::YELLOW];
        let base = m / 3;
        let rem = m % 3;
        let size0 = base + if rem > 0 { 1 } else { 0 };
        let size1 = base + if rem > 1 { 1 } else { 0 };
        let boundary0 = size0;
        let boundary1 = size0 + size1;
        for (i, edge) in contour.edges.iter_mut().enumerate() {
            let group = if i < boundary0 {
                0
            } else if i < boundary1 {
                1
            } else {
                2
            };
            edge.color = colors[group];
        }
    } else if corners.len() == 1 {
        let mut colors = [EdgeColor::BLACK; 3];
        switch_color(color, seed);
        colors[0] = *color;
        colors[1] = EdgeColor::WHITE;
        switch_color(color, seed);
        colors[2] = *color;

        let corner = corners[0];
        let m = contour.edges.len();
        if m >= 3 {
            for i in 0..m {
                let idx = (corner + i) % m;
                contour.edges[idx].color = colors[(1 + symmetrical_trichotomy(i as i32, m as i32)) as usize];
            }
        } else if m == 2 {
            let a = contour.edges[corner].segment.split_in_three();
            let b = contour.edges[1 - corner].segment.split_in_three();
            let colors = colors.into_iter().flat_map(|c| [c, c]);
            contour.edges = a.into_iter().chain(b).zip(colors).map(|(s, c)| s.colored(c)).collect();
        } else {
            contour.edges = contour.edges[0]
                .segment
                .split_in_three()
                .into_iter()
                .zip(colors)
                .map(|(s, c)| s.colored(c))
                .collect();
        }
    } else {
        switch_color(color, seed);
        let initial_color = *color;

        let mut spline = 0;
        let m = contour.edges.len();
        let corners_len = corners.len();
        let start = corners[0];
        let mut curved_run = 0u32;
        for i in 0..m {
            let idx = (start + i) % m;
            if spline + 1 < corners_len && corners[spline + 1] == idx {
                spline += 1;
                curved_run = 0;
                switch_color_constrained(color, seed, if spline == corners_len - 1 { initial_color } else { EdgeColor::BLACK });
            } else {
                let is_curved = !matches!(contour.edges[idx].segment, EdgeSegment::Line(..));
                if apply_channel_diversity_stride(&mut curved_run, is_curved, options.channel_diversity_stride) {
                    log::debug!("color_contours: channel diversity stride forcing colour switch at edge {idx}");
                    switch_color_constrained(color, seed, EdgeColor::BLACK);
                }
            }
            contour.edges[idx].color = *color;
        }
    }
}

/// Ticks a curved-edge run counter and reports whether it just reached
/// `stride`, resetting it in that case (§4.3 channel-diversity fallback,
/// multi-corner regime only: a long curved run within one spline shouldn't
/// leave a channel dark). A `stride` of 0 disables the fallback.
fn apply_channel_diversity_stride(curved_run: &mut u32, is_curved: bool, stride: u32) -> bool {
    if stride == 0 || !is_curved {
        return false;
    }
    *curved_run += 1;
    if *curved_run >= stride {
        *curved_run = 0;
        true
    } else {
        false
    }
}

/// Colours every contour's edges in place, carrying the colour-cycle seed
/// state across contours within the shape (§4.3).
pub fn color_contours(contours: &mut [Contour], options: &Options) {
    let mut seed = 0u64;
    let mut color = init_color(&mut seed);
    for contour in contours.iter_mut() {
        color_one_contour(contour, options, &mut seed, &mut color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::vec2;

    fn square() -> Contour {
        let pts = [vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(10.0, 10.0), vec2(0.0, 10.0)];
        let mut c = Contour::new();
        for i in 0..4 {
            c.edges.push(EdgeSegment::Line(pts[i], pts[(i + 1) % 4]).white());
        }
        c
    }

    #[test]
    fn square_gets_four_corners_and_three_colors() {
        let c = square();
        let corners = find_corners(&c, (3f64).to_radians().sin());
        assert_eq!(corners.len(), 4);
    }

    #[test]
    fn colored_square_uses_no_black_or_white() {
        let mut contours = vec![square()];
        color_contours(&mut contours, &Options::default());
        for edge in &contours[0].edges {
            assert_ne!(edge.color, EdgeColor::BLACK);
        }
    }

    #[test]
    fn adjacent_edges_share_exactly_one_channel() {
        let mut contours = vec![square()];
        color_contours(&mut contours, &Options::default());
        let edges = &contours[0].edges;
        let m = edges.len();
        for i in 0..m {
            let a = edges[i].color;
            let b = edges[(i + 1) % m].color;
            if a != b {
                assert_eq!((a & b).bits().count_ones(), 1);
            }
        }
    }

    #[test]
    fn fully_smooth_single_edge_splits_into_three() {
        let mut c = Contour::new();
        c.edges.push(EdgeSegment::Quadratic(vec2(0.0, 0.0), vec2(5.0, 10.0), vec2(10.0, 0.0)).white());
        let mut contours = vec![c];
        color_contours(&mut contours, &Options::default());
        assert_eq!(contours[0].edges.len(), 3);
    }

    #[test]
    fn fully_smooth_multi_edge_contour_uses_all_three_colors() {
        // six near-collinear, same-curvature quadratics: no direction-based
        // or curvature-reversal corners, so this exercises the m > 1 branch
        // of the fully-smooth case.
        let mut c = Contour::new();
        for i in 0..6 {
            let x0 = i as f64 * 10.0;
            c.edges.push(EdgeSegment::Quadratic(vec2(x0, 0.0), vec2(x0 + 5.0, 0.001), vec2(x0 + 10.0, 0.0)).white());
        }
        let corners = find_corners(&c, Options::default().angle_threshold.sin());
        assert!(corners.is_empty());

        let mut contours = vec![c];
        color_contours(&mut contours, &Options::default());
        let colors: std::collections::HashSet<_> = contours[0].edges.iter().map(|e| e.color).collect();
        assert!(colors.contains(&EdgeColor::CYAN));
        assert!(colors.contains(&EdgeColor::MAGENTA));
        assert!(colors.contains(&EdgeColor::YELLOW));
    }
}
