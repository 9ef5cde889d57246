//! Static SVG Renderer
//! Draws a compiled scene with the plotters SVG backend.
//!
//! Drawing order per view:
//! 1. Gridlines of continuous axes
//! 2. Marks (bars, symbols, lines)
//! 3. Axis lines, ticks and labels
//! 4. Color legend to the right of the plot area
//! 5. View title centered above

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::color::Rgb;
use super::scene::{Axis, Legend, MarkItem, Scene, ViewScene};
use super::RenderError;

const AXIS_COLOR: RGBColor = RGBColor(0x88, 0x88, 0x88);
const GRID_COLOR: RGBColor = RGBColor(0xdd, 0xdd, 0xdd);
const LABEL_COLOR: RGBColor = RGBColor(0x33, 0x33, 0x33);
const TICK_LENGTH: f64 = 5.0;
const LABEL_SIZE: f64 = 10.0;
const TITLE_SIZE: f64 = 11.0;
const HEADER_SIZE: f64 = 13.0;
const SWATCH: f64 = 10.0;

fn backend_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Backend(e.to_string())
}

fn pt(x: f64, y: f64) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

fn text_style(size: f64, style: FontStyle, pos: Pos) -> TextStyle<'static> {
    TextStyle::from(FontDesc::new(FontFamily::SansSerif, size, style))
        .color(&LABEL_COLOR)
        .pos(pos)
}

pub struct SvgRenderer;

impl SvgRenderer {
    /// Render the scene to a standalone SVG document.
    pub fn draw(scene: &Scene) -> Result<String, RenderError> {
        let size = (
            scene.width.ceil().max(1.0) as u32,
            scene.height.ceil().max(1.0) as u32,
        );
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
            root.fill(&WHITE).map_err(backend_err)?;
            for view in &scene.views {
                Self::draw_view(&root, view)?;
            }
            root.present().map_err(backend_err)?;
        }
        Ok(svg)
    }

    fn draw_view<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        view: &ViewScene,
    ) -> Result<(), RenderError> {
        if let Some(axis) = view.x_axis.as_ref().filter(|a| !a.discrete) {
            for tick in &axis.ticks {
                let x = view.x + tick.position;
                root.draw(&PathElement::new(
                    vec![pt(x, view.y), pt(x, view.y + view.height)],
                    GRID_COLOR.stroke_width(1),
                ))
                .map_err(backend_err)?;
            }
        }
        if let Some(axis) = view.y_axis.as_ref().filter(|a| !a.discrete) {
            for tick in &axis.ticks {
                let y = view.y + tick.position;
                root.draw(&PathElement::new(
                    vec![pt(view.x, y), pt(view.x + view.width, y)],
                    GRID_COLOR.stroke_width(1),
                ))
                .map_err(backend_err)?;
            }
        }

        Self::draw_marks(root, view)?;

        if let Some(axis) = &view.x_axis {
            Self::draw_x_axis(root, view, axis)?;
        }
        if let Some(axis) = &view.y_axis {
            Self::draw_y_axis(root, view, axis)?;
        }
        if let Some(legend) = &view.legend {
            Self::draw_legend(root, view, legend)?;
        }
        if let Some(title) = &view.title {
            let (_, top) = view.outer_origin();
            root.draw(&Text::new(
                title.clone(),
                pt(view.x + view.width / 2.0, top + 6.0),
                text_style(HEADER_SIZE, FontStyle::Bold, Pos::new(HPos::Center, VPos::Top)),
            ))
            .map_err(backend_err)?;
        }
        Ok(())
    }

    fn draw_marks<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        view: &ViewScene,
    ) -> Result<(), RenderError> {
        let (ox, oy) = (view.x, view.y);
        for mark in &view.marks {
            match mark {
                MarkItem::Rect {
                    x,
                    y,
                    width,
                    height,
                    fill,
                    opacity,
                    ..
                } => {
                    root.draw(&Rectangle::new(
                        [pt(ox + x, oy + y), pt(ox + x + width, oy + y + height)],
                        rgb(*fill).mix(*opacity).filled(),
                    ))
                    .map_err(backend_err)?;
                }
                MarkItem::Symbol {
                    x,
                    y,
                    radius,
                    fill,
                    opacity,
                    filled,
                    ..
                } => {
                    let color = rgb(*fill).mix(*opacity);
                    let style = if *filled {
                        color.filled()
                    } else {
                        color.stroke_width(1)
                    };
                    let r = radius.round().max(1.0) as i32;
                    root.draw(&Circle::new(pt(ox + x, oy + y), r, style))
                        .map_err(backend_err)?;
                }
                MarkItem::Line {
                    points,
                    stroke,
                    opacity,
                    stroke_width,
                    ..
                } => {
                    let path: Vec<(i32, i32)> =
                        points.iter().map(|(x, y)| pt(ox + x, oy + y)).collect();
                    let width = stroke_width.round().max(1.0) as u32;
                    root.draw(&PathElement::new(
                        path,
                        rgb(*stroke).mix(*opacity).stroke_width(width),
                    ))
                    .map_err(backend_err)?;
                }
            }
        }
        Ok(())
    }

    fn draw_x_axis<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        view: &ViewScene,
        axis: &Axis,
    ) -> Result<(), RenderError> {
        let base = view.y + view.height;
        root.draw(&PathElement::new(
            vec![pt(view.x, base), pt(view.x + view.width, base)],
            AXIS_COLOR.stroke_width(1),
        ))
        .map_err(backend_err)?;

        let label_pos = if axis.rotate_labels {
            Pos::new(HPos::Right, VPos::Center)
        } else {
            Pos::new(HPos::Center, VPos::Top)
        };
        let mut font = FontDesc::new(FontFamily::SansSerif, LABEL_SIZE, FontStyle::Normal);
        if axis.rotate_labels {
            font = font.transform(FontTransform::Rotate270);
        }
        let label_style = TextStyle::from(font).color(&LABEL_COLOR).pos(label_pos);

        for tick in &axis.ticks {
            let x = view.x + tick.position;
            root.draw(&PathElement::new(
                vec![pt(x, base), pt(x, base + TICK_LENGTH)],
                AXIS_COLOR.stroke_width(1),
            ))
            .map_err(backend_err)?;
            root.draw(&Text::new(
                tick.label.clone(),
                pt(x, base + TICK_LENGTH + 2.0),
                label_style.clone(),
            ))
            .map_err(backend_err)?;
        }

        root.draw(&Text::new(
            axis.title.clone(),
            pt(view.x + view.width / 2.0, base + view.margin.bottom - 4.0),
            text_style(TITLE_SIZE, FontStyle::Bold, Pos::new(HPos::Center, VPos::Bottom)),
        ))
        .map_err(backend_err)?;
        Ok(())
    }

    fn draw_y_axis<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        view: &ViewScene,
        axis: &Axis,
    ) -> Result<(), RenderError> {
        root.draw(&PathElement::new(
            vec![pt(view.x, view.y), pt(view.x, view.y + view.height)],
            AXIS_COLOR.stroke_width(1),
        ))
        .map_err(backend_err)?;

        let label_style = text_style(LABEL_SIZE, FontStyle::Normal, Pos::new(HPos::Right, VPos::Center));
        for tick in &axis.ticks {
            let y = view.y + tick.position;
            root.draw(&PathElement::new(
                vec![pt(view.x - TICK_LENGTH, y), pt(view.x, y)],
                AXIS_COLOR.stroke_width(1),
            ))
            .map_err(backend_err)?;
            root.draw(&Text::new(
                tick.label.clone(),
                pt(view.x - TICK_LENGTH - 2.0, y),
                label_style.clone(),
            ))
            .map_err(backend_err)?;
        }

        let title_style = TextStyle::from(
            FontDesc::new(FontFamily::SansSerif, TITLE_SIZE, FontStyle::Bold)
                .transform(FontTransform::Rotate270),
        )
        .color(&LABEL_COLOR)
        .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(
            axis.title.clone(),
            pt(view.x - view.margin.left + 2.0, view.y + view.height / 2.0),
            title_style,
        ))
        .map_err(backend_err)?;
        Ok(())
    }

    fn draw_legend<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        view: &ViewScene,
        legend: &Legend,
    ) -> Result<(), RenderError> {
        let left = view.x + view.width + 16.0;
        let mut y = view.y;
        root.draw(&Text::new(
            legend.title.clone(),
            pt(left, y),
            text_style(TITLE_SIZE, FontStyle::Bold, Pos::new(HPos::Left, VPos::Top)),
        ))
        .map_err(backend_err)?;
        y += 16.0;

        let label_style = text_style(LABEL_SIZE, FontStyle::Normal, Pos::new(HPos::Left, VPos::Center));
        for entry in &legend.entries {
            root.draw(&Rectangle::new(
                [pt(left, y), pt(left + SWATCH, y + SWATCH)],
                rgb(entry.color).filled(),
            ))
            .map_err(backend_err)?;
            root.draw(&Text::new(
                entry.label.clone(),
                pt(left + SWATCH + 4.0, y + SWATCH / 2.0),
                label_style.clone(),
            ))
            .map_err(backend_err)?;
            y += SWATCH + 4.0;
        }
        Ok(())
    }
}
