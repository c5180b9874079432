use serde::{Deserialize, Serialize};

/// Closed 2-D outline, stored as parallel coordinate arrays the way the
/// plot host consumes them. The first point is repeated at the end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Polygon {
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let mut polygon = Self {
            xs: Vec::with_capacity(points.len() + 1),
            ys: Vec::with_capacity(points.len() + 1),
        };
        for &(x, y) in points {
            polygon.xs.push(x);
            polygon.ys.push(y);
        }
        polygon.close();
        polygon
    }

    /// Repeats the first point at the end if not already closed.
    pub fn close(&mut self) {
        if let (Some(&x0), Some(&y0)) = (self.xs.first(), self.ys.first()) {
            if self.xs.last() != Some(&x0) || self.ys.last() != Some(&y0) {
                self.xs.push(x0);
                self.ys.push(y0);
            }
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.xs.push(x);
        self.ys.push(y);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn x_range(&self) -> (f64, f64) {
        let min = self.xs.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    pub fn y_range(&self) -> (f64, f64) {
        let min = self.ys.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (min, max)
    }

    pub fn x_center(&self) -> f64 {
        let (min, max) = self.x_range();
        (min + max) / 2.0
    }
}
