use crate::color::Color;
use crate::error::FigureError;
use crate::polygon::Polygon;
use crate::scene::{
    IndexRemap, Label, LabelAnchor, Scene, Trace, TraceCategory, TraceData, TraceGeometry,
    DEFAULT_OUTLINE_WIDTH,
};
use serde::{Deserialize, Serialize};

/// Vertical distance from a track baseline to its sequence label.
const SEQUENCE_LABEL_OFFSET: f64 = 38.0;
/// Vertical clearance between a gene arrow and its label.
const GENE_LABEL_OFFSET: f64 = 6.0;
/// Scale bar sits this far below the bottom track baseline.
const SCALE_BAR_OFFSET: f64 = 55.0;
const SCALE_BAR_HEIGHT: f64 = 4.0;
/// Longest fraction of the longest track the scale bar may cover.
const SCALE_BAR_MAX_FRACTION: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceLabelMode {
    None,
    Accession,
    Name,
    FileName,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneLabelPlacement {
    None,
    Top,
    Bottom,
    TopAndBottom,
}

fn label_trace(category: TraceCategory, name: String, label: Label) -> Trace {
    Trace {
        name,
        category,
        geometry: TraceGeometry::Label(label),
        fill: Color::BLACK,
        outline: Color::BLACK,
        outline_width: DEFAULT_OUTLINE_WIDTH,
        data: TraceData::None,
    }
}

/// Replaces all sequence labels with one per track in the requested mode.
/// Idempotent: existing sequence labels are removed first, so repeated
/// calls with the same mode leave the scene unchanged. The returned remap
/// reports the renumbering from the removal.
pub fn annotate_sequences(scene: &mut Scene, mode: SequenceLabelMode) -> IndexRemap {
    let remap = scene.remove_by_category(TraceCategory::SequenceAnnotation);
    let field: fn(&crate::track::SequenceTrack) -> &str = match mode {
        SequenceLabelMode::None => return remap,
        SequenceLabelMode::Accession => |track| &track.accession,
        SequenceLabelMode::Name => |track| &track.name,
        SequenceLabelMode::FileName => |track| &track.file_name,
    };
    let labels: Vec<(f64, f64, String)> = scene
        .tracks()
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let x = scene.layout().track_x(index, 0);
            let y = scene.layout().track_y(index) - SEQUENCE_LABEL_OFFSET;
            (x, y, field(track).to_string())
        })
        .collect();
    for (x, y, text) in labels {
        scene.add_trace(label_trace(
            TraceCategory::SequenceAnnotation,
            format!("sequence label: {text}"),
            Label {
                x,
                y,
                text,
                anchor: LabelAnchor::Start,
            },
        ));
    }
    remap
}

/// Replaces all gene labels, placing them above and/or below each gene
/// arrow. Label text follows the gene's preferred source (symbol vs
/// product). Idempotent like [`annotate_sequences`].
pub fn annotate_genes(scene: &mut Scene, placement: GeneLabelPlacement) -> IndexRemap {
    let remap = scene.remove_by_category(TraceCategory::GeneAnnotation);
    if placement == GeneLabelPlacement::None {
        return remap;
    }
    let mut labels: Vec<(f64, f64, String)> = Vec::new();
    for (_, trace) in scene.find_by_category(TraceCategory::Gene) {
        let (TraceData::Gene(gene), Some(polygon)) = (&trace.data, trace.polygon()) else {
            continue;
        };
        let text = gene.label();
        let x = polygon.x_center();
        let (top_y, bottom_y) = polygon.y_range();
        if matches!(
            placement,
            GeneLabelPlacement::Top | GeneLabelPlacement::TopAndBottom
        ) {
            labels.push((x, top_y - GENE_LABEL_OFFSET, text.clone()));
        }
        if matches!(
            placement,
            GeneLabelPlacement::Bottom | GeneLabelPlacement::TopAndBottom
        ) {
            labels.push((x, bottom_y + GENE_LABEL_OFFSET, text.clone()));
        }
    }
    for (x, y, text) in labels {
        scene.add_trace(label_trace(
            TraceCategory::GeneAnnotation,
            format!("gene label: {text}"),
            Label {
                x,
                y,
                text,
                anchor: LabelAnchor::Middle,
            },
        ));
    }
    remap
}

/// Adds or removes the scale bar. At most one scale-bar trace exists at any
/// time: the old one is always removed before a new one is added.
pub fn toggle_scale_bar(
    scene: &mut Scene,
    visible: bool,
) -> Result<IndexRemap, FigureError> {
    let remap = scene.remove_by_category(TraceCategory::ScaleBar);
    if !visible {
        return Ok(remap);
    }
    let longest = scene
        .tracks()
        .iter()
        .map(|track| track.length_bp)
        .max()
        .ok_or_else(|| FigureError::empty_scene("Scale bar requires at least one track"))?;
    let bar_bp = nice_length((longest as f64 * SCALE_BAR_MAX_FRACTION) as u64).max(1);
    let layout = scene.layout();
    let x1 = layout.left_margin;
    let x2 = x1 + bar_bp as f64 * layout.px_per_bp;
    let y = layout.track_y(scene.tracks().len() - 1) + SCALE_BAR_OFFSET;
    let polygon = Polygon::from_points(&[
        (x1, y),
        (x2, y),
        (x2, y + SCALE_BAR_HEIGHT),
        (x1, y + SCALE_BAR_HEIGHT),
    ]);
    scene.add_trace(Trace {
        name: format!("{bar_bp} bp"),
        category: TraceCategory::ScaleBar,
        geometry: TraceGeometry::Polygon(polygon),
        fill: Color::BLACK,
        outline: Color::BLACK,
        outline_width: DEFAULT_OUTLINE_WIDTH,
        data: TraceData::None,
    });
    Ok(remap)
}

/// Largest 1/2/5 x 10^k value not exceeding the limit.
fn nice_length(limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    let mut best = 1;
    let mut magnitude = 1u64;
    loop {
        for step in [1u64, 2, 5] {
            let candidate = match step.checked_mul(magnitude) {
                Some(v) => v,
                None => return best,
            };
            if candidate <= limit {
                best = candidate;
            }
        }
        magnitude = match magnitude.checked_mul(10) {
            Some(v) => v,
            None => return best,
        };
        if magnitude > limit {
            return best;
        }
    }
}
