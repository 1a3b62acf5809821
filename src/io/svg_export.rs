use std::path::PathBuf;

use geo::{Coord, Rect};
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Path};
use svg::Document;

use crate::geometry::{self, Pose};
use crate::render::Renderer;
use crate::shape::{transform_all, PosedShape, Shape};

const PALETTE: [&str; 5] = ["red", "blue", "green", "purple", "orange"];

pub fn polygon_data(points: &[Coord<f64>]) -> Data {
    let mut data = Data::new();
    if let Some((first, rest)) = points.split_first() {
        data = data.move_to((first.x as f32, first.y as f32));
        for p in rest {
            data = data.line_to((p.x as f32, p.y as f32));
        }
        data = data.close();
    }
    data
}

/// Draws every shape at its pose: the boundary stroked in a palette colour, the landmarks as dots filled with their label
pub fn configuration_to_svg(shapes: &[Shape], configuration: &[Pose]) -> Document {
    let posed = transform_all(shapes, configuration);
    posed_to_svg(&posed)
}

pub fn posed_to_svg(posed: &[PosedShape]) -> Document {
    let bbox = posed
        .iter()
        .map(|s| s.bbox)
        .reduce(|a, b| geometry::rect_union(&a, &b))
        .unwrap_or(Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 }));

    //margin of 10% around the drawing
    let margin = 0.1 * bbox.width().max(bbox.height()).max(1e-3);
    let view_x = bbox.min().x - margin;
    let view_w = bbox.width() + 2.0 * margin;
    let view_h = bbox.height() + 2.0 * margin;
    //y axis points up in the layout, down in svg
    let view_y = -bbox.max().y - margin;

    let stroke_width = 0.005 * view_w.max(view_h);
    let landmark_radius = 2.0 * stroke_width;

    let mut group = Group::new().set("transform", "scale(1,-1)");
    for (i, shape) in posed.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        group = group.add(
            Path::new()
                .set("fill", color)
                .set("fill-opacity", 0.15)
                .set("stroke", color)
                .set("stroke-opacity", 0.7)
                .set("stroke-width", stroke_width)
                .set("stroke-linejoin", "round")
                .set("d", polygon_data(shape.vertices())),
        );
    }
    for shape in posed {
        for lm in &shape.landmarks {
            group = group.add(
                Circle::new()
                    .set("cx", lm.position.x)
                    .set("cy", lm.position.y)
                    .set("r", landmark_radius)
                    .set("fill", lm.color.as_str()),
            );
        }
    }

    Document::new()
        .set("viewBox", (view_x, view_y, view_w, view_h))
        .add(group)
}

/// Renderer that keeps the SVG of the latest frame and optionally writes every `interval`-th frame to a folder
#[derive(Debug, Default)]
pub struct SvgRenderer {
    pub folder: Option<PathBuf>,
    pub interval: usize,
    pub n_frames: usize,
    pub last_frame: Option<String>,
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(folder: PathBuf, interval: usize) -> Self {
        SvgRenderer {
            folder: Some(folder),
            interval: interval.max(1),
            ..Self::default()
        }
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, shapes: &[Shape], configuration: &[Pose]) {
        let frame = self.n_frames;
        self.n_frames += 1;
        let document = configuration_to_svg(shapes, configuration);

        if let Some(folder) = &self.folder {
            if frame % self.interval.max(1) == 0 {
                let path = folder.join(format!("frame_{frame:06}.svg"));
                if let Err(e) = svg::save(&path, &document) {
                    log::warn!("[SVG] could not write {}: {}", path.display(), e);
                }
            }
        }
        self.last_frame = Some(document.to_string());
    }
}
