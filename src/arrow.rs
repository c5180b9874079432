use crate::polygon::Polygon;
use crate::track::{Gene, Strand};
use serde::{Deserialize, Serialize};

/// Fraction of the arrow length occupied by the head.
pub const DEFAULT_HEAD_LENGTH_FRACTION: f64 = 0.2;
/// Heads never get shorter than this; arrows shorter than it collapse to a
/// pure triangle.
pub const MIN_HEAD_LENGTH: f64 = 4.0;
pub const DEFAULT_BODY_HEIGHT: f64 = 10.0;
pub const DEFAULT_HEAD_HEIGHT: f64 = 20.0;

/// Geometry value object for one gene arrow: a rectangular shaft plus a
/// triangular head pointing in the strand direction, all in scene
/// coordinates (x in scaled bp, y on the track baseline).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrow {
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
    pub strand: Strand,
    pub body_height: f64,
    pub head_height: f64,
    pub head_length_fraction: f64,
}

impl Arrow {
    pub fn new(x1: f64, x2: f64, y: f64, strand: Strand) -> Self {
        Self {
            x1,
            x2,
            y,
            strand,
            body_height: DEFAULT_BODY_HEIGHT,
            head_height: DEFAULT_HEAD_HEIGHT,
            head_length_fraction: DEFAULT_HEAD_LENGTH_FRACTION,
        }
    }

    fn head_length(&self) -> f64 {
        (self.x2 - self.x1).abs() * self.head_length_fraction
    }

    /// Ordered, closed outline of the arrow. Arrows too short to carry a
    /// shaft degenerate to a triangle instead of failing.
    pub fn coordinates(&self) -> Polygon {
        let length = (self.x2 - self.x1).abs();
        let head_length = self.head_length().max(MIN_HEAD_LENGTH);
        if head_length >= length {
            return self.triangle();
        }
        let b = self.body_height / 2.0;
        let h = self.head_height / 2.0;
        let y = self.y;
        match self.strand {
            Strand::Forward => {
                let neck = self.x2 - head_length;
                Polygon::from_points(&[
                    (self.x1, y - b),
                    (neck, y - b),
                    (neck, y - h),
                    (self.x2, y),
                    (neck, y + h),
                    (neck, y + b),
                    (self.x1, y + b),
                ])
            }
            Strand::Reverse => {
                let neck = self.x1 + head_length;
                Polygon::from_points(&[
                    (self.x2, y - b),
                    (neck, y - b),
                    (neck, y - h),
                    (self.x1, y),
                    (neck, y + h),
                    (neck, y + b),
                    (self.x2, y + b),
                ])
            }
        }
    }

    fn triangle(&self) -> Polygon {
        let h = self.head_height / 2.0;
        let (base, tip) = match self.strand {
            Strand::Forward => (self.x1, self.x2),
            Strand::Reverse => (self.x2, self.x1),
        };
        Polygon::from_points(&[(base, self.y - h), (tip, self.y), (base, self.y + h)])
    }
}

/// Deterministic gene-to-polygon mapping: identical gene, scale and offset
/// always yield the identical point sequence.
pub fn gene_to_arrow(gene: &Gene, track_y: f64, px_per_bp: f64, x_offset: f64) -> Polygon {
    let x1 = gene.start as f64 * px_per_bp + x_offset;
    let x2 = gene.end as f64 * px_per_bp + x_offset;
    Arrow::new(x1, x2, track_y, gene.strand).coordinates()
}
