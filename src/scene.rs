use crate::color::Color;
use crate::error::FigureError;
use crate::polygon::Polygon;
use crate::track::{Gene, SequenceTrack};
use serde::{Deserialize, Serialize};

pub const DEFAULT_OUTLINE_WIDTH: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceCategory {
    Gene,
    Homology,
    SequenceAnnotation,
    GeneAnnotation,
    ScaleBar,
    Legend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelAnchor {
    Start,
    Middle,
    End,
}

/// A positioned text label in scene coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub anchor: LabelAnchor,
}

/// Gradient legend bar: evenly spaced color stops plus the two endpoint
/// value labels, each with its fractional position along the bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub stops: Vec<Color>,
    pub min_label: (String, f64),
    pub max_label: (String, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceGeometry {
    Polygon(Polygon),
    Label(Label),
    ColorBar(ColorBar),
}

/// Opaque payload recovering the source object of a trace for later
/// recoloring or annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceData {
    Gene(Gene),
    Homology { identity: f64 },
    None,
}

/// One drawable, addressable element of the figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub category: TraceCategory,
    pub geometry: TraceGeometry,
    pub fill: Color,
    pub outline: Color,
    pub outline_width: f64,
    pub data: TraceData,
}

impl Trace {
    pub fn polygon(&self) -> Option<&Polygon> {
        match &self.geometry {
            TraceGeometry::Polygon(polygon) => Some(polygon),
            _ => None,
        }
    }
}

/// Geometry bookkeeping fixed at figure-build time, so incremental edits
/// never re-derive coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub px_per_bp: f64,
    /// Vertical distance between adjacent track baselines.
    pub track_gap: f64,
    pub top_margin: f64,
    pub left_margin: f64,
    /// Horizontal shift per track, from the alignment option.
    pub x_offsets: Vec<f64>,
    pub width: f64,
    pub height: f64,
}

impl Layout {
    pub fn track_y(&self, track: usize) -> f64 {
        self.top_margin + track as f64 * self.track_gap
    }

    pub fn track_x(&self, track: usize, bp: u64) -> f64 {
        self.left_margin + bp as f64 * self.px_per_bp + self.x_offsets.get(track).copied().unwrap_or(0.0)
    }
}

/// Result of a category-scoped removal: maps every pre-removal index to its
/// new position, or `None` if the trace was removed. Indices before the
/// first removed trace map to themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRemap {
    map: Vec<Option<usize>>,
}

impl IndexRemap {
    pub fn remap(&self, old_index: usize) -> Option<usize> {
        self.map.get(old_index).copied().flatten()
    }

    pub fn removed_any(&self) -> bool {
        self.map.iter().any(Option::is_none)
    }

    /// Composes two remaps from consecutive removals within one action.
    pub fn then(&self, next: &IndexRemap) -> IndexRemap {
        IndexRemap {
            map: self
                .map
                .iter()
                .map(|entry| entry.and_then(|mid| next.remap(mid)))
                .collect(),
        }
    }
}

/// The figure: ordered traces plus the immutable track list and layout.
/// Trace position is the stable "curve number" the host's click events
/// address; appending never renumbers, category removal does (see
/// [`Scene::remove_by_category`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    tracks: Vec<SequenceTrack>,
    traces: Vec<Trace>,
    layout: Layout,
    /// Observed [lowest, highest] percent identity among rendered
    /// homologies, kept for extreme-mode recoloring.
    identity_extremes: Option<(f64, f64)>,
}

impl Scene {
    pub fn new(tracks: Vec<SequenceTrack>, layout: Layout) -> Self {
        Self {
            tracks,
            traces: Vec::new(),
            layout,
            identity_extremes: None,
        }
    }

    pub fn tracks(&self) -> &[SequenceTrack] {
        &self.tracks
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn trace(&self, index: usize) -> Option<&Trace> {
        self.traces.get(index)
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn identity_extremes(&self) -> Option<(f64, f64)> {
        self.identity_extremes
    }

    pub fn set_identity_extremes(&mut self, extremes: Option<(f64, f64)>) {
        self.identity_extremes = extremes;
    }

    /// Appends and returns the stable index of the new trace.
    pub fn add_trace(&mut self, trace: Trace) -> usize {
        self.traces.push(trace);
        self.traces.len() - 1
    }

    pub fn find_by_category(
        &self,
        category: TraceCategory,
    ) -> impl Iterator<Item = (usize, &Trace)> {
        self.traces
            .iter()
            .enumerate()
            .filter(move |(_, trace)| trace.category == category)
    }

    /// Removes every trace of the category. Indices of traces after the
    /// earliest removed one shift down; the returned remap tells callers
    /// (selection sets, click handlers) where each old index went. Apply it
    /// within the same action, never deferred.
    pub fn remove_by_category(&mut self, category: TraceCategory) -> IndexRemap {
        let mut map = Vec::with_capacity(self.traces.len());
        let mut kept = 0;
        for trace in &self.traces {
            if trace.category == category {
                map.push(None);
            } else {
                map.push(Some(kept));
                kept += 1;
            }
        }
        self.traces.retain(|trace| trace.category != category);
        IndexRemap { map }
    }

    /// In-place attribute mutation; geometry is untouched.
    pub fn recolor(
        &mut self,
        index: usize,
        fill: Color,
        outline: Color,
        outline_width: f64,
    ) -> Result<(), FigureError> {
        let len = self.traces.len();
        let trace = self
            .traces
            .get_mut(index)
            .ok_or_else(|| FigureError::index_out_of_range(index, len))?;
        trace.fill = fill;
        trace.outline = outline;
        trace.outline_width = outline_width;
        Ok(())
    }

    /// Changes outline only, leaving the fill alone (selection emphasis).
    pub fn set_outline(
        &mut self,
        index: usize,
        outline: Color,
        outline_width: f64,
    ) -> Result<(), FigureError> {
        let len = self.traces.len();
        let trace = self
            .traces
            .get_mut(index)
            .ok_or_else(|| FigureError::index_out_of_range(index, len))?;
        trace.outline = outline;
        trace.outline_width = outline_width;
        Ok(())
    }
}
