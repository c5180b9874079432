use crate::color::Color;
use crate::error::FigureError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// How percent identity maps onto the truncated colorscale window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityScaleMode {
    /// Raw identity 0..100% maps linearly onto [vmin, vmax].
    Fixed,
    /// The observed [lowest, highest] identity spans the full window.
    Extreme,
}

/// A named continuous colormap: evenly spaced RGB stops, linearly
/// interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub name: String,
    pub stops: Vec<Color>,
}

impl ColorScale {
    fn new(name: &str, hex_stops: &[(u8, u8, u8)]) -> Self {
        Self {
            name: name.to_string(),
            stops: hex_stops.iter().map(|&(r, g, b)| Color::new(r, g, b)).collect(),
        }
    }

    /// t must be finite; values slightly outside [0,1] are clamped.
    /// Scales need at least two stops to interpolate.
    pub fn sample(&self, t: f64) -> Result<Color, FigureError> {
        if !t.is_finite() {
            return Err(FigureError::invalid_domain(format!(
                "Colorscale position {t} is not finite"
            )));
        }
        if self.stops.len() < 2 {
            return Err(FigureError::invalid_domain(format!(
                "Colorscale '{}' has {} stops, needs at least two",
                self.name,
                self.stops.len()
            )));
        }
        let t = t.clamp(0.0, 1.0);
        let segments = self.stops.len() - 1;
        let position = t * segments as f64;
        let index = (position.floor() as usize).min(segments - 1);
        let fraction = position - index as f64;
        Ok(self.stops[index].lerp(&self.stops[index + 1], fraction))
    }
}

/// A colormap restricted to [vmin, vmax] of its normalized domain.
/// `sample(u)` for u in [0,1] remaps into the window; the endpoints hit
/// `base.sample(vmin)` / `base.sample(vmax)` exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruncatedScale {
    pub base: ColorScale,
    pub vmin: f64,
    pub vmax: f64,
}

impl TruncatedScale {
    pub fn sample(&self, u: f64) -> Result<Color, FigureError> {
        if !u.is_finite() {
            return Err(FigureError::invalid_domain(format!(
                "Colorscale position {u} is not finite"
            )));
        }
        let u = u.clamp(0.0, 1.0);
        let v = if u == 0.0 {
            self.vmin
        } else if u == 1.0 {
            self.vmax
        } else {
            self.vmin + u * (self.vmax - self.vmin)
        };
        self.base.sample(v)
    }
}

lazy_static! {
    /// Built-in sequential colorscales, the set the upstream GUI exposes.
    pub static ref COLOR_SCALES: Vec<ColorScale> = built_in_scales();
}

#[rustfmt::skip]
fn built_in_scales() -> Vec<ColorScale> {
    vec![
        // Colorbrewer 9-class sequential.
        ColorScale::new("Greys", &[
            (255, 255, 255), (240, 240, 240), (217, 217, 217), (189, 189, 189),
            (150, 150, 150), (115, 115, 115), (82, 82, 82), (37, 37, 37), (0, 0, 0),
        ]),
        ColorScale::new("Blues", &[
            (247, 251, 255), (222, 235, 247), (198, 219, 239), (158, 202, 225),
            (107, 174, 214), (66, 146, 198), (33, 113, 181), (8, 81, 156), (8, 48, 107),
        ]),
        ColorScale::new("Greens", &[
            (247, 252, 245), (229, 245, 224), (199, 233, 192), (161, 217, 155),
            (116, 196, 118), (65, 171, 93), (35, 139, 69), (0, 109, 44), (0, 68, 27),
        ]),
        ColorScale::new("Oranges", &[
            (255, 245, 235), (254, 230, 206), (253, 208, 162), (253, 174, 107),
            (253, 141, 60), (241, 105, 19), (217, 72, 1), (166, 54, 3), (127, 39, 4),
        ]),
        ColorScale::new("Purples", &[
            (252, 251, 253), (239, 237, 245), (218, 218, 235), (188, 189, 220),
            (158, 154, 200), (128, 125, 186), (106, 81, 163), (84, 39, 143), (63, 0, 125),
        ]),
        ColorScale::new("Reds", &[
            (255, 245, 240), (254, 224, 210), (252, 187, 161), (252, 146, 114),
            (251, 106, 74), (239, 59, 44), (203, 24, 29), (165, 15, 21), (103, 0, 13),
        ]),
        ColorScale::new("GnBu", &[
            (247, 252, 240), (224, 243, 219), (204, 235, 197), (168, 221, 181),
            (123, 204, 196), (78, 179, 211), (43, 140, 190), (8, 104, 172), (8, 64, 129),
        ]),
        ColorScale::new("YlGnBu", &[
            (255, 255, 217), (237, 248, 177), (199, 233, 180), (127, 205, 187),
            (65, 182, 196), (29, 145, 192), (34, 94, 168), (37, 52, 148), (8, 29, 88),
        ]),
        ColorScale::new("YlOrRd", &[
            (255, 255, 204), (255, 237, 160), (254, 217, 118), (254, 178, 76),
            (253, 141, 60), (252, 78, 42), (227, 26, 28), (189, 0, 38), (128, 0, 38),
        ]),
        // Matplotlib-derived continuous maps, 10 stops each.
        ColorScale::new("Viridis", &[
            (68, 1, 84), (72, 40, 120), (62, 73, 137), (49, 104, 142), (38, 130, 142),
            (31, 158, 137), (53, 183, 121), (110, 206, 88), (181, 222, 43), (253, 231, 37),
        ]),
        ColorScale::new("Plasma", &[
            (13, 8, 135), (70, 3, 159), (114, 1, 168), (156, 23, 158), (189, 55, 134),
            (216, 87, 107), (237, 121, 83), (251, 159, 58), (253, 202, 38), (240, 249, 33),
        ]),
        ColorScale::new("Inferno", &[
            (0, 0, 4), (27, 12, 65), (74, 12, 107), (120, 28, 109), (165, 44, 96),
            (207, 68, 70), (237, 105, 37), (251, 155, 6), (247, 209, 61), (252, 255, 164),
        ]),
        ColorScale::new("Magma", &[
            (0, 0, 4), (24, 15, 61), (68, 15, 118), (114, 31, 129), (158, 47, 127),
            (205, 64, 113), (241, 96, 93), (253, 150, 104), (254, 202, 141), (252, 253, 191),
        ]),
        ColorScale::new("Cividis", &[
            (0, 34, 78), (18, 53, 112), (59, 73, 108), (87, 93, 109), (112, 113, 115),
            (138, 134, 120), (165, 156, 116), (195, 179, 105), (225, 204, 85), (254, 232, 56),
        ]),
    ]
}

pub fn color_scale_names() -> Vec<&'static str> {
    COLOR_SCALES.iter().map(|scale| scale.name.as_str()).collect()
}

pub fn color_scale(name: &str) -> Result<&'static ColorScale, FigureError> {
    COLOR_SCALES
        .iter()
        .find(|scale| scale.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| FigureError::invalid_domain(format!("Unknown colorscale '{name}'")))
}

pub fn sample(name: &str, t: f64) -> Result<Color, FigureError> {
    color_scale(name)?.sample(t)
}

/// Precondition: 0 <= vmin < vmax <= 1.
pub fn truncate(name: &str, vmin: f64, vmax: f64) -> Result<TruncatedScale, FigureError> {
    if !vmin.is_finite() || !vmax.is_finite() || vmin < 0.0 || vmax > 1.0 || vmin >= vmax {
        return Err(FigureError::invalid_domain(format!(
            "Truncation window [{vmin}, {vmax}] must satisfy 0 <= vmin < vmax <= 1"
        )));
    }
    Ok(TruncatedScale {
        base: color_scale(name)?.clone(),
        vmin,
        vmax,
    })
}

/// Maps a percent identity to a color under the figure-wide scale mode.
/// In extreme mode equal extremes map to the window midpoint.
pub fn map_identity(
    identity_pct: f64,
    mode: IdentityScaleMode,
    observed_min: f64,
    observed_max: f64,
    scale: &TruncatedScale,
) -> Result<Color, FigureError> {
    let u = match mode {
        IdentityScaleMode::Fixed => identity_pct / 100.0,
        IdentityScaleMode::Extreme => {
            let span = observed_max - observed_min;
            if span == 0.0 {
                0.5
            } else {
                (identity_pct - observed_min) / span
            }
        }
    };
    scale.sample(u)
}

/// Evenly spaced samples across the truncated window, for gradient legends.
pub fn gradient_stops(scale: &TruncatedScale, n: usize) -> Result<Vec<Color>, FigureError> {
    let n = n.max(2);
    (0..n)
        .map(|i| scale.sample(i as f64 / (n - 1) as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_endpoints() {
        assert_eq!(sample("Greys", 0.0).unwrap(), Color::WHITE);
        assert_eq!(sample("Greys", 1.0).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_sample_clamps_but_rejects_non_finite() {
        assert_eq!(sample("Greys", -0.001).unwrap(), Color::WHITE);
        assert_eq!(sample("Greys", 1.001).unwrap(), Color::BLACK);
        assert!(sample("Greys", f64::NAN).is_err());
        assert!(sample("Greys", f64::INFINITY).is_err());
    }

    #[test]
    fn test_degenerate_stop_lists_rejected() {
        // Fields are public and deserializable, so a host can hand us a
        // scale with too few stops; that must error, not panic.
        let empty = ColorScale {
            name: "empty".to_string(),
            stops: vec![],
        };
        let single = ColorScale {
            name: "single".to_string(),
            stops: vec![Color::BLACK],
        };
        for scale in [empty, single] {
            let err = scale.sample(0.5).unwrap_err();
            assert_eq!(err.kind, crate::error::ErrorKind::InvalidDomain);
        }
    }

    #[test]
    fn test_unknown_scale() {
        assert!(sample("NoSuchScale", 0.5).is_err());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(color_scale("greys").is_ok());
        assert!(color_scale("VIRIDIS").is_ok());
    }

    #[test]
    fn test_truncate_endpoints_exact() {
        let truncated = truncate("Blues", 0.1, 0.75).unwrap();
        assert_eq!(truncated.sample(0.0).unwrap(), sample("Blues", 0.1).unwrap());
        assert_eq!(truncated.sample(1.0).unwrap(), sample("Blues", 0.75).unwrap());
    }

    #[test]
    fn test_truncate_rejects_bad_window() {
        assert!(truncate("Greys", 0.5, 0.5).is_err());
        assert!(truncate("Greys", 0.75, 0.25).is_err());
        assert!(truncate("Greys", -0.1, 0.5).is_err());
        assert!(truncate("Greys", 0.0, 1.1).is_err());
    }

    #[test]
    fn test_map_identity_fixed_matches_truncated_sample() {
        // Identity 87.5%, Greys truncated to [0, 0.75]: same color as
        // sampling the base scale at 0.875 * 0.75.
        let truncated = truncate("Greys", 0.0, 0.75).unwrap();
        let mapped =
            map_identity(87.5, IdentityScaleMode::Fixed, 0.0, 0.0, &truncated).unwrap();
        assert_eq!(mapped, sample("Greys", 0.875 * 0.75).unwrap());
    }

    #[test]
    fn test_map_identity_extreme_spans_window() {
        let truncated = truncate("Greys", 0.25, 0.75).unwrap();
        let low =
            map_identity(60.0, IdentityScaleMode::Extreme, 60.0, 95.0, &truncated).unwrap();
        let high =
            map_identity(95.0, IdentityScaleMode::Extreme, 60.0, 95.0, &truncated).unwrap();
        assert_eq!(low, sample("Greys", 0.25).unwrap());
        assert_eq!(high, sample("Greys", 0.75).unwrap());
    }

    #[test]
    fn test_map_identity_equal_extremes_hits_midpoint() {
        let truncated = truncate("Greys", 0.0, 1.0).unwrap();
        let mapped =
            map_identity(90.0, IdentityScaleMode::Extreme, 90.0, 90.0, &truncated).unwrap();
        assert_eq!(mapped, truncated.sample(0.5).unwrap());
    }

    #[test]
    fn test_gradient_stops() {
        let truncated = truncate("Greys", 0.0, 1.0).unwrap();
        let stops = gradient_stops(&truncated, 5).unwrap();
        assert_eq!(stops.len(), 5);
        assert_eq!(stops[0], Color::WHITE);
        assert_eq!(stops[4], Color::BLACK);
    }
}
