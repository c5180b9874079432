use crate::polygon::Polygon;
use serde::{Deserialize, Serialize};

/// Points sampled along each curved side of a bezier ribbon.
const SAMPLES_PER_SIDE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RibbonStyle {
    Straight,
    Bezier,
}

/// One matched range on a track, in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RibbonSpan {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

/// Builds the ribbon connecting a matched range pair across the gap between
/// two adjacent tracks.
///
/// Endpoints are always joined start-to-start and end-to-end: a segment
/// whose ranges run in opposite order between the two tracks renders as a
/// pinched "bow-tie" region, never an error.
pub fn homology_to_ribbon(top: &RibbonSpan, bottom: &RibbonSpan, style: RibbonStyle) -> Polygon {
    match style {
        RibbonStyle::Straight => Polygon::from_points(&[
            (top.x1, top.y),
            (top.x2, top.y),
            (bottom.x2, bottom.y),
            (bottom.x1, bottom.y),
        ]),
        RibbonStyle::Bezier => {
            let mut polygon = Polygon::default();
            polygon.push(top.x1, top.y);
            polygon.push(top.x2, top.y);
            // Right side flows down, left side flows back up.
            sample_side(&mut polygon, top.x2, top.y, bottom.x2, bottom.y);
            polygon.push(bottom.x2, bottom.y);
            polygon.push(bottom.x1, bottom.y);
            sample_side(&mut polygon, bottom.x1, bottom.y, top.x1, top.y);
            polygon.close();
            polygon
        }
    }
}

/// Cubic side with both control points on the vertical midline, so the
/// ribbon leaves each track perpendicular to it.
fn sample_side(polygon: &mut Polygon, x_from: f64, y_from: f64, x_to: f64, y_to: f64) {
    let y_mid = (y_from + y_to) / 2.0;
    for i in 1..SAMPLES_PER_SIDE {
        let t = i as f64 / SAMPLES_PER_SIDE as f64;
        let (x, y) = cubic_point(
            (x_from, y_from),
            (x_from, y_mid),
            (x_to, y_mid),
            (x_to, y_to),
            t,
        );
        polygon.push(x, y);
    }
}

fn cubic_point(
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    p3: (f64, f64),
    t: f64,
) -> (f64, f64) {
    let u = 1.0 - t;
    let c0 = u * u * u;
    let c1 = 3.0 * u * u * t;
    let c2 = 3.0 * u * t * t;
    let c3 = t * t * t;
    (
        c0 * p0.0 + c1 * p1.0 + c2 * p2.0 + c3 * p3.0,
        c0 * p0.1 + c1 * p1.1 + c2 * p2.1 + c3 * p3.1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP: RibbonSpan = RibbonSpan {
        x1: 100.0,
        x2: 200.0,
        y: 10.0,
    };
    const BOTTOM: RibbonSpan = RibbonSpan {
        x1: 150.0,
        x2: 250.0,
        y: 110.0,
    };

    #[test]
    fn test_straight_ribbon_is_trapezoid() {
        let polygon = homology_to_ribbon(&TOP, &BOTTOM, RibbonStyle::Straight);
        assert_eq!(polygon.len(), 5);
        assert_eq!(polygon.x_range(), (100.0, 250.0));
        assert_eq!(polygon.y_range(), (10.0, 110.0));
    }

    #[test]
    fn test_bezier_ribbon_spans_same_region() {
        let polygon = homology_to_ribbon(&TOP, &BOTTOM, RibbonStyle::Bezier);
        assert!(polygon.len() > 2 * SAMPLES_PER_SIDE);
        assert_eq!(polygon.x_range(), (100.0, 250.0));
        assert_eq!(polygon.y_range(), (10.0, 110.0));
        // Closed outline.
        assert_eq!(polygon.xs.first(), polygon.xs.last());
        assert_eq!(polygon.ys.first(), polygon.ys.last());
    }

    #[test]
    fn test_bezier_sides_stay_inside_vertical_gap() {
        let polygon = homology_to_ribbon(&TOP, &BOTTOM, RibbonStyle::Bezier);
        for &y in &polygon.ys {
            assert!((10.0..=110.0).contains(&y));
        }
    }

    #[test]
    fn test_reversed_ranges_do_not_panic() {
        // Bottom range runs right-to-left relative to the top one.
        let reversed = RibbonSpan {
            x1: 250.0,
            x2: 150.0,
            y: 110.0,
        };
        let straight = homology_to_ribbon(&TOP, &reversed, RibbonStyle::Straight);
        let bezier = homology_to_ribbon(&TOP, &reversed, RibbonStyle::Bezier);
        assert_eq!(straight.len(), 5);
        assert!(bezier.len() > 2 * SAMPLES_PER_SIDE);
    }
}
