use crate::error::FigureError;
use crate::scene::{ColorBar, Label, LabelAnchor, Scene, Trace, TraceCategory, TraceGeometry};
use serde::{Deserialize, Serialize};
use svg::node::element::path::Data;
use svg::node::element::{Definitions, Line, LinearGradient, Path, Rectangle, Stop, Text};
use svg::Document;

const BASELINE_WIDTH: f64 = 2.0;
const LABEL_FONT_SIZE: u32 = 12;
const LEGEND_FONT_SIZE: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Png,
    Jpg,
    Pdf,
    Svg,
}

fn anchor_attr(anchor: LabelAnchor) -> &'static str {
    match anchor {
        LabelAnchor::Start => "start",
        LabelAnchor::Middle => "middle",
        LabelAnchor::End => "end",
    }
}

fn polygon_path(trace: &Trace) -> Option<Path> {
    let polygon = trace.polygon()?;
    let mut points = polygon.xs.iter().zip(polygon.ys.iter());
    let (&x0, &y0) = points.next()?;
    let mut data = Data::new().move_to((x0, y0));
    for (&x, &y) in points {
        data = data.line_to((x, y));
    }
    data = data.close();
    Some(
        Path::new()
            .set("d", data)
            .set("fill", trace.fill.to_hex())
            .set("stroke", trace.outline.to_hex())
            .set("stroke-width", trace.outline_width),
    )
}

fn label_text(label: &Label) -> Text {
    Text::new(label.text.clone())
        .set("x", label.x)
        .set("y", label.y)
        .set("text-anchor", anchor_attr(label.anchor))
        .set("font-family", "monospace")
        .set("font-size", LABEL_FONT_SIZE)
        .set("fill", "#111111")
}

fn legend_nodes(bar: &ColorBar) -> (Definitions, Rectangle, Text, Text) {
    let mut gradient = LinearGradient::new()
        .set("id", "legend-gradient")
        .set("x1", "0%")
        .set("y1", "0%")
        .set("x2", "100%")
        .set("y2", "0%");
    let segments = bar.stops.len().saturating_sub(1).max(1);
    for (i, color) in bar.stops.iter().enumerate() {
        gradient = gradient.add(
            Stop::new()
                .set("offset", format!("{:.2}%", 100.0 * i as f64 / segments as f64))
                .set("stop-color", color.to_hex()),
        );
    }
    let rect = Rectangle::new()
        .set("x", bar.x)
        .set("y", bar.y)
        .set("width", bar.width)
        .set("height", bar.height)
        .set("fill", "url(#legend-gradient)")
        .set("stroke", "#000000")
        .set("stroke-width", 1);
    let label = |text: &str, pos: f64| -> Text {
        Text::new(text.to_string())
            .set("x", bar.x + pos.clamp(0.0, 1.0) * bar.width)
            .set("y", bar.y + bar.height + 14.0)
            .set("text-anchor", "middle")
            .set("font-family", "monospace")
            .set("font-size", LEGEND_FONT_SIZE)
            .set("fill", "#444444")
    };
    (
        Definitions::new().add(gradient),
        rect,
        label(&bar.min_label.0, bar.min_label.1),
        label(&bar.max_label.0, bar.max_label.1),
    )
}

/// Assembles the scene into an SVG document: white background, one
/// baseline per track, then every trace in scene order so z-order matches
/// trace order.
pub fn render_svg(scene: &Scene) -> Document {
    let layout = scene.layout();
    let mut doc = Document::new()
        .set("viewBox", (0.0, 0.0, layout.width, layout.height))
        .set("width", layout.width)
        .set("height", layout.height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", layout.width)
                .set("height", layout.height)
                .set("fill", "#ffffff"),
        );

    for (index, track) in scene.tracks().iter().enumerate() {
        doc = doc.add(
            Line::new()
                .set("x1", layout.track_x(index, 0))
                .set("y1", layout.track_y(index))
                .set("x2", layout.track_x(index, track.length_bp))
                .set("y2", layout.track_y(index))
                .set("stroke", "#000000")
                .set("stroke-width", BASELINE_WIDTH),
        );
    }

    for trace in scene.traces() {
        match &trace.geometry {
            TraceGeometry::Polygon(_) => {
                if let Some(path) = polygon_path(trace) {
                    doc = doc.add(path);
                }
                if trace.category == TraceCategory::ScaleBar {
                    if let Some(polygon) = trace.polygon() {
                        let (y_top, _) = polygon.y_range();
                        doc = doc.add(
                            Text::new(trace.name.clone())
                                .set("x", polygon.x_center())
                                .set("y", y_top - 6.0)
                                .set("text-anchor", "middle")
                                .set("font-family", "monospace")
                                .set("font-size", LEGEND_FONT_SIZE)
                                .set("fill", "#111111"),
                        );
                    }
                }
            }
            TraceGeometry::Label(label) => {
                doc = doc.add(label_text(label));
            }
            TraceGeometry::ColorBar(bar) => {
                let (defs, rect, min_label, max_label) = legend_nodes(bar);
                doc = doc.add(defs).add(rect).add(min_label).add(max_label);
            }
        }
    }
    doc
}

fn rasterize(
    scene: &Scene,
    width: u32,
    height: u32,
    scale: f64,
) -> Result<resvg::tiny_skia::Pixmap, FigureError> {
    let svg_text = render_svg(scene).to_string();
    let tree = resvg::usvg::Tree::from_str(&svg_text, &resvg::usvg::Options::default())
        .map_err(|e| FigureError::render_failure(format!("SVG parse failed: {e}")))?;
    let pixel_width = (width as f64 * scale).round() as u32;
    let pixel_height = (height as f64 * scale).round() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(pixel_width, pixel_height).ok_or_else(|| {
        FigureError::render_failure(format!(
            "Cannot allocate {pixel_width}x{pixel_height} pixmap"
        ))
    })?;
    let size = tree.size();
    let transform = resvg::tiny_skia::Transform::from_scale(
        pixel_width as f32 / size.width(),
        pixel_height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// One-shot blocking render of the scene to an image byte buffer. On
/// failure the scene is untouched and the error reported as-is; PDF is not
/// supported by the rendering backend.
pub fn export(
    scene: &Scene,
    format: ExportFormat,
    width: u32,
    height: u32,
    scale: f64,
) -> Result<Vec<u8>, FigureError> {
    if scene.tracks().is_empty() {
        return Err(FigureError::empty_scene("Nothing to export"));
    }
    if width == 0 || height == 0 || !scale.is_finite() || scale <= 0.0 {
        return Err(FigureError::render_failure(format!(
            "Invalid export dimensions {width}x{height} @ {scale}"
        )));
    }
    match format {
        ExportFormat::Svg => {
            let doc = render_svg(scene)
                .set("width", width)
                .set("height", height)
                .set("preserveAspectRatio", "none");
            Ok(doc.to_string().into_bytes())
        }
        ExportFormat::Png => {
            let pixmap = rasterize(scene, width, height, scale)?;
            pixmap
                .encode_png()
                .map_err(|e| FigureError::render_failure(format!("PNG encoding failed: {e}")))
        }
        ExportFormat::Jpg => {
            let pixmap = rasterize(scene, width, height, scale)?;
            let rgba = image::RgbaImage::from_raw(
                pixmap.width(),
                pixmap.height(),
                pixmap.take(),
            )
            .ok_or_else(|| FigureError::render_failure("Pixmap buffer size mismatch"))?;
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            let mut bytes = Vec::new();
            rgb.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
                .map_err(|e| FigureError::render_failure(format!("JPEG encoding failed: {e}")))?;
            Ok(bytes)
        }
        ExportFormat::Pdf => Err(FigureError::render_failure(
            "PDF export is not supported by the rendering backend",
        )),
    }
}
