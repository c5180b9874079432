use crate::annotate::{self, GeneLabelPlacement, SequenceLabelMode};
use crate::arrow::gene_to_arrow;
use crate::color::Color;
use crate::color_scale::{self, IdentityScaleMode, TruncatedScale};
use crate::error::FigureError;
use crate::ribbon::{homology_to_ribbon, RibbonSpan, RibbonStyle};
use crate::scene::{
    ColorBar, IndexRemap, Layout, Scene, Trace, TraceCategory, TraceData, TraceGeometry,
    DEFAULT_OUTLINE_WIDTH,
};
use crate::track::{Gene, HomologySegment, SequenceTrack};
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// Horizontal pixels the longest track maps onto.
const PLOT_AREA_WIDTH: f64 = 1080.0;
const TRACK_GAP: f64 = 100.0;
const TOP_MARGIN: f64 = 80.0;
const LEFT_MARGIN: f64 = 60.0;
const RIGHT_MARGIN: f64 = 60.0;
const BOTTOM_MARGIN: f64 = 140.0;
/// Ribbons attach this far from the track baseline, clear of the arrows.
const RIBBON_INSET: f64 = 12.0;
const LEGEND_WIDTH: f64 = 300.0;
const LEGEND_HEIGHT: f64 = 16.0;
const LEGEND_STOPS: usize = 16;

pub const DEFAULT_GENE_COLOR: Color = Color::new(31, 79, 204);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Figure-wide options, mirroring the host's plot controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureOptions {
    pub alignment: Alignment,
    pub ribbon_style: RibbonStyle,
    /// Homology segments shorter than this (bp) are dropped before
    /// rendering.
    pub minimum_homology_length: u64,
    pub colorscale: String,
    pub vmin: f64,
    pub vmax: f64,
    pub scale_mode: IdentityScaleMode,
    pub annotate_sequences: SequenceLabelMode,
    pub annotate_genes: GeneLabelPlacement,
    pub scale_bar: bool,
}

impl Default for FigureOptions {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            ribbon_style: RibbonStyle::Straight,
            minimum_homology_length: 0,
            colorscale: "Greys".to_string(),
            vmin: 0.0,
            vmax: 0.75,
            scale_mode: IdentityScaleMode::Fixed,
            annotate_sequences: SequenceLabelMode::None,
            annotate_genes: GeneLabelPlacement::None,
            scale_bar: true,
        }
    }
}

fn build_layout(tracks: &[SequenceTrack], alignment: Alignment) -> Layout {
    let longest = tracks
        .iter()
        .map(|track| track.length_bp)
        .max()
        .unwrap_or(1)
        .max(1) as f64;
    let px_per_bp = PLOT_AREA_WIDTH / longest;
    let x_offsets = tracks
        .iter()
        .map(|track| {
            let slack = (longest - track.length_bp as f64) * px_per_bp;
            match alignment {
                Alignment::Left => 0.0,
                Alignment::Center => slack / 2.0,
                Alignment::Right => slack,
            }
        })
        .collect();
    Layout {
        px_per_bp,
        track_gap: TRACK_GAP,
        top_margin: TOP_MARGIN,
        left_margin: LEFT_MARGIN,
        x_offsets,
        width: LEFT_MARGIN + PLOT_AREA_WIDTH + RIGHT_MARGIN,
        height: TOP_MARGIN + (tracks.len().saturating_sub(1)) as f64 * TRACK_GAP + BOTTOM_MARGIN,
    }
}

/// Builds the full figure from parsed input. Homology and gene polygons are
/// appended before any annotation, legend or scale-bar trace, so removals
/// of the latter never renumber the selectable polygons.
pub fn build_figure(
    tracks: Vec<SequenceTrack>,
    genes: &[Gene],
    homologies: &[HomologySegment],
    options: &FigureOptions,
) -> Result<Scene, FigureError> {
    if tracks.is_empty() {
        return Err(FigureError::empty_scene(
            "Figure requires at least one sequence track",
        ));
    }
    let scale = color_scale::truncate(&options.colorscale, options.vmin, options.vmax)?;
    for gene in genes {
        gene.validate(&tracks)?;
    }
    for homology in homologies {
        homology.validate(&tracks)?;
    }

    let layout = build_layout(&tracks, options.alignment);
    let mut scene = Scene::new(tracks, layout);

    let rendered: Vec<&HomologySegment> = homologies
        .iter()
        .filter(|segment| segment.length() >= options.minimum_homology_length)
        .collect();
    let extremes = match rendered.iter().map(|segment| segment.identity).minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(value) => Some((value, value)),
        MinMaxResult::MinMax(low, high) => Some((low, high)),
    };
    scene.set_identity_extremes(extremes);
    let (observed_min, observed_max) = extremes.unwrap_or((0.0, 0.0));

    // Ribbons first so arrows draw on top of them.
    for segment in &rendered {
        let layout = scene.layout();
        let (upper, lower) = if layout.track_y(segment.track_a) <= layout.track_y(segment.track_b)
        {
            (
                (segment.track_a, segment.start_a, segment.end_a),
                (segment.track_b, segment.start_b, segment.end_b),
            )
        } else {
            (
                (segment.track_b, segment.start_b, segment.end_b),
                (segment.track_a, segment.start_a, segment.end_a),
            )
        };
        let top = RibbonSpan {
            x1: layout.track_x(upper.0, upper.1),
            x2: layout.track_x(upper.0, upper.2),
            y: layout.track_y(upper.0) + RIBBON_INSET,
        };
        let bottom = RibbonSpan {
            x1: layout.track_x(lower.0, lower.1),
            x2: layout.track_x(lower.0, lower.2),
            y: layout.track_y(lower.0) - RIBBON_INSET,
        };
        let polygon = homology_to_ribbon(&top, &bottom, options.ribbon_style);
        let fill = color_scale::map_identity(
            segment.identity,
            options.scale_mode,
            observed_min,
            observed_max,
            &scale,
        )?;
        scene.add_trace(Trace {
            name: format!("homology {:.2}%", segment.identity),
            category: TraceCategory::Homology,
            geometry: TraceGeometry::Polygon(polygon),
            fill,
            outline: fill,
            outline_width: DEFAULT_OUTLINE_WIDTH,
            data: TraceData::Homology {
                identity: segment.identity,
            },
        });
    }

    for gene in genes {
        let layout = scene.layout();
        let x_offset =
            layout.left_margin + layout.x_offsets.get(gene.track).copied().unwrap_or(0.0);
        let polygon = gene_to_arrow(gene, layout.track_y(gene.track), layout.px_per_bp, x_offset);
        scene.add_trace(Trace {
            name: gene.label(),
            category: TraceCategory::Gene,
            geometry: TraceGeometry::Polygon(polygon),
            fill: DEFAULT_GENE_COLOR,
            outline: DEFAULT_GENE_COLOR,
            outline_width: DEFAULT_OUTLINE_WIDTH,
            data: TraceData::Gene(gene.clone()),
        });
    }

    rebuild_legend(&mut scene, &scale, options.scale_mode)?;
    annotate::annotate_sequences(&mut scene, options.annotate_sequences);
    annotate::annotate_genes(&mut scene, options.annotate_genes);
    annotate::toggle_scale_bar(&mut scene, options.scale_bar)?;
    Ok(scene)
}

/// Recolors every homology ribbon under a new colorscale/window/mode and
/// replaces the legend. Geometry is untouched; selection emphasis outlines
/// on homologies are reset to the new fill.
pub fn recolor_homologies(
    mut scene: Scene,
    colorscale_name: &str,
    vmin: f64,
    vmax: f64,
    mode: IdentityScaleMode,
) -> Result<Scene, FigureError> {
    let scale = color_scale::truncate(colorscale_name, vmin, vmax)?;
    let (observed_min, observed_max) = scene.identity_extremes().unwrap_or((0.0, 0.0));
    let targets: Vec<(usize, f64)> = scene
        .find_by_category(TraceCategory::Homology)
        .filter_map(|(index, trace)| match trace.data {
            TraceData::Homology { identity } => Some((index, identity)),
            _ => None,
        })
        .collect();
    for (index, identity) in targets {
        let fill =
            color_scale::map_identity(identity, mode, observed_min, observed_max, &scale)?;
        scene.recolor(index, fill, fill, DEFAULT_OUTLINE_WIDTH)?;
    }
    rebuild_legend(&mut scene, &scale, mode)?;
    Ok(scene)
}

/// Replaces sequence and gene annotations in one action. The returned
/// remap composes both removals, so cached trace indices (selection sets,
/// click handlers) can be re-resolved in one step.
pub fn set_annotations(
    mut scene: Scene,
    sequence_mode: SequenceLabelMode,
    gene_placement: GeneLabelPlacement,
) -> Result<(Scene, IndexRemap), FigureError> {
    let sequences = annotate::annotate_sequences(&mut scene, sequence_mode);
    let genes = annotate::annotate_genes(&mut scene, gene_placement);
    Ok((scene, sequences.then(&genes)))
}

pub fn toggle_scale_bar(mut scene: Scene, visible: bool) -> Result<Scene, FigureError> {
    annotate::toggle_scale_bar(&mut scene, visible)?;
    Ok(scene)
}

/// Removes any existing legend and adds a fresh gradient bar for the
/// truncated scale, so repeated colorscale changes never stack legends.
/// Skipped entirely when the figure has no homologies.
fn rebuild_legend(
    scene: &mut Scene,
    scale: &TruncatedScale,
    mode: IdentityScaleMode,
) -> Result<(), FigureError> {
    scene.remove_by_category(TraceCategory::Legend);
    let Some((observed_min, observed_max)) = scene.identity_extremes() else {
        return Ok(());
    };
    let stops = color_scale::gradient_stops(scale, LEGEND_STOPS)?;
    // In extreme mode the observed extremes pin the bar ends; in fixed mode
    // they sit at their proportional positions along the 0..100% bar.
    let (min_pos, max_pos) = match mode {
        IdentityScaleMode::Extreme => (0.0, 1.0),
        IdentityScaleMode::Fixed => (observed_min / 100.0, observed_max / 100.0),
    };
    let layout = scene.layout();
    let color_bar = ColorBar {
        x: layout.left_margin,
        y: layout.height - LEGEND_HEIGHT - 20.0,
        width: LEGEND_WIDTH,
        height: LEGEND_HEIGHT,
        stops,
        min_label: (format!("{observed_min:.1}%"), min_pos),
        max_label: (format!("{observed_max:.1}%"), max_pos),
    };
    scene.add_trace(Trace {
        name: "colorbar legend".to_string(),
        category: TraceCategory::Legend,
        geometry: TraceGeometry::ColorBar(color_bar),
        fill: Color::BLACK,
        outline: Color::BLACK,
        outline_width: DEFAULT_OUTLINE_WIDTH,
        data: TraceData::None,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::sample;
    use crate::track::{GeneLabelSource, Strand};

    fn tracks() -> Vec<SequenceTrack> {
        vec![
            SequenceTrack::new("NC_1", "plasmid A", "a.gb", 1000),
            SequenceTrack::new("NC_2", "plasmid B", "b.gb", 800),
        ]
    }

    fn gene(track: usize, start: u64, end: u64) -> Gene {
        Gene {
            track,
            start,
            end,
            strand: Strand::Forward,
            gene_name: Some("repA".to_string()),
            product: Some("replication protein".to_string()),
            label_source: GeneLabelSource::Gene,
        }
    }

    fn homology(identity: f64) -> HomologySegment {
        HomologySegment {
            track_a: 0,
            start_a: 100,
            end_a: 200,
            track_b: 1,
            start_b: 150,
            end_b: 250,
            identity,
        }
    }

    #[test]
    fn test_build_figure_empty_tracks() {
        let err =
            build_figure(vec![], &[], &[], &FigureOptions::default()).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::EmptyScene);
    }

    #[test]
    fn test_build_figure_trace_inventory() {
        let options = FigureOptions {
            annotate_sequences: SequenceLabelMode::Accession,
            annotate_genes: GeneLabelPlacement::Top,
            ..FigureOptions::default()
        };
        let scene = build_figure(
            tracks(),
            &[gene(0, 10, 300), gene(1, 50, 400)],
            &[homology(87.5)],
            &options,
        )
        .unwrap();
        assert_eq!(scene.find_by_category(TraceCategory::Homology).count(), 1);
        assert_eq!(scene.find_by_category(TraceCategory::Gene).count(), 2);
        assert_eq!(scene.find_by_category(TraceCategory::Legend).count(), 1);
        assert_eq!(
            scene
                .find_by_category(TraceCategory::SequenceAnnotation)
                .count(),
            2
        );
        assert_eq!(
            scene.find_by_category(TraceCategory::GeneAnnotation).count(),
            2
        );
        assert_eq!(scene.find_by_category(TraceCategory::ScaleBar).count(), 1);
        assert_eq!(scene.identity_extremes(), Some((87.5, 87.5)));
    }

    #[test]
    fn test_fixed_mode_homology_color() {
        // Greys truncated to [0, 0.75], identity 87.5% in fixed mode:
        // the ribbon fill equals sampling Greys at 0.875 * 0.75.
        let scene = build_figure(
            tracks(),
            &[],
            &[homology(87.5)],
            &FigureOptions::default(),
        )
        .unwrap();
        let (_, trace) = scene
            .find_by_category(TraceCategory::Homology)
            .next()
            .unwrap();
        assert_eq!(trace.fill, sample("Greys", 0.875 * 0.75).unwrap());
    }

    #[test]
    fn test_minimum_homology_length_filter() {
        let mut short = homology(90.0);
        short.end_a = 130; // 30 bp
        let options = FigureOptions {
            minimum_homology_length: 50,
            ..FigureOptions::default()
        };
        let scene = build_figure(tracks(), &[], &[short], &options).unwrap();
        assert_eq!(scene.find_by_category(TraceCategory::Homology).count(), 0);
        assert_eq!(scene.identity_extremes(), None);
        // No homologies, no legend.
        assert_eq!(scene.find_by_category(TraceCategory::Legend).count(), 0);
    }

    #[test]
    fn test_alignment_offsets() {
        let left = build_figure(tracks(), &[], &[], &FigureOptions::default()).unwrap();
        assert_eq!(left.layout().x_offsets, vec![0.0, 0.0]);

        let options = FigureOptions {
            alignment: Alignment::Right,
            ..FigureOptions::default()
        };
        let right = build_figure(tracks(), &[], &[], &options).unwrap();
        let px_per_bp = right.layout().px_per_bp;
        assert_eq!(right.layout().x_offsets[0], 0.0);
        assert_eq!(right.layout().x_offsets[1], 200.0 * px_per_bp);

        let options = FigureOptions {
            alignment: Alignment::Center,
            ..FigureOptions::default()
        };
        let center = build_figure(tracks(), &[], &[], &options).unwrap();
        assert_eq!(center.layout().x_offsets[1], 100.0 * px_per_bp);
    }

    #[test]
    fn test_recolor_homologies_replaces_legend() {
        let scene = build_figure(
            tracks(),
            &[],
            &[homology(60.0), homology(95.0)],
            &FigureOptions::default(),
        )
        .unwrap();
        let count = scene.len();
        let scene =
            recolor_homologies(scene, "Blues", 0.25, 1.0, IdentityScaleMode::Extreme).unwrap();
        assert_eq!(scene.len(), count);
        assert_eq!(scene.find_by_category(TraceCategory::Legend).count(), 1);
        let fills: Vec<Color> = scene
            .find_by_category(TraceCategory::Homology)
            .map(|(_, t)| t.fill)
            .collect();
        assert_eq!(fills[0], sample("Blues", 0.25).unwrap());
        assert_eq!(fills[1], sample("Blues", 1.0).unwrap());
    }

    #[test]
    fn test_recolor_homologies_rejects_bad_window() {
        let scene =
            build_figure(tracks(), &[], &[homology(80.0)], &FigureOptions::default()).unwrap();
        let err = recolor_homologies(scene, "Greys", 0.8, 0.2, IdentityScaleMode::Fixed)
            .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidDomain);
    }

    #[test]
    fn test_set_annotations_idempotent() {
        let scene =
            build_figure(tracks(), &[gene(0, 10, 300)], &[], &FigureOptions::default()).unwrap();
        let (scene, _) = set_annotations(
            scene,
            SequenceLabelMode::Name,
            GeneLabelPlacement::TopAndBottom,
        )
        .unwrap();
        let count = scene.len();
        let (scene, _) = set_annotations(
            scene,
            SequenceLabelMode::Name,
            GeneLabelPlacement::TopAndBottom,
        )
        .unwrap();
        assert_eq!(scene.len(), count);
    }

    #[test]
    fn test_set_annotations_remap_covers_both_removals() {
        let options = FigureOptions {
            annotate_sequences: SequenceLabelMode::Accession,
            annotate_genes: GeneLabelPlacement::Top,
            scale_bar: false,
            ..FigureOptions::default()
        };
        let scene =
            build_figure(tracks(), &[gene(0, 10, 300)], &[homology(87.5)], &options).unwrap();
        // Trace order: homology 0, gene 1, legend 2, sequence labels 3-4,
        // gene label 5.
        let (scene, remap) = set_annotations(
            scene,
            SequenceLabelMode::None,
            GeneLabelPlacement::None,
        )
        .unwrap();
        assert_eq!(remap.remap(0), Some(0));
        assert_eq!(remap.remap(1), Some(1));
        assert_eq!(remap.remap(2), Some(2));
        assert_eq!(remap.remap(3), None);
        assert_eq!(remap.remap(4), None);
        assert_eq!(remap.remap(5), None);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_invalid_gene_rejected() {
        let err = build_figure(
            tracks(),
            &[gene(0, 500, 2000)],
            &[],
            &FigureOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::InvalidRange);
    }
}
