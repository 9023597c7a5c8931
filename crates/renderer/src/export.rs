//! Still-image output through `plotters`.

use crate::scene::{LabelRole, Panel, PlotScene};
use crate::RenderSink;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontFamily, FontStyle, RGBAColor};
use std::path::{Path, PathBuf};
use temhumi_core::{Result, TemHumiError};
use temhumi_theme::Theme;
use tracing::info;

const TITLE_SIZE: f64 = 34.0;
const AXIS_SIZE:  f64 = 24.0;
const TICK_SIZE:  f64 = 20.0;
const LABEL_SIZE: f64 = 20.0;
const STATS_SIZE: f64 = 20.0;
/// Share of the image height kept for the stats box.
const FOOTER_SHARE: f64 = 0.12;

/// Writes each scene to a PNG file, replacing it.
pub struct PngExporter {
    path:  PathBuf,
    size:  (u32, u32),
    theme: Theme,
}

impl PngExporter {
    pub fn new(path: impl Into<PathBuf>, size: (u32, u32), theme: Theme) -> Self {
        Self {
            path: path.into(),
            size,
            theme,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSink for PngExporter {
    fn draw(&mut self, scene: &PlotScene) -> Result<()> {
        let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
        paint(&root, scene, &self.theme)?;
        root.present().map_err(render_err)?;
        info!("Plot saved as: {}", self.path.display());
        Ok(())
    }
}

/// Rasterises each scene into an in-memory RGBA buffer, for windows that
/// display it as an image.
pub struct RgbaFrame {
    size:   (u32, u32),
    theme:  Theme,
    rgb:    Vec<u8>,
    pixels: Vec<u8>,
}

impl RgbaFrame {
    pub fn new(size: (u32, u32), theme: Theme) -> Self {
        let area = size.0 as usize * size.1 as usize;
        Self {
            size,
            theme,
            rgb: vec![0; area * 3],
            pixels: Vec::with_capacity(area * 4),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// RGBA bytes of the last drawn scene, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl RenderSink for RgbaFrame {
    fn draw(&mut self, scene: &PlotScene) -> Result<()> {
        {
            let root = BitMapBackend::with_buffer(&mut self.rgb, self.size).into_drawing_area();
            paint(&root, scene, &self.theme)?;
            root.present().map_err(render_err)?;
        }

        self.pixels.clear();
        for px in self.rgb.chunks_exact(3) {
            self.pixels.extend_from_slice(&[px[0], px[1], px[2], u8::MAX]);
        }
        Ok(())
    }
}

fn render_err(e: impl std::fmt::Display) -> TemHumiError {
    TemHumiError::Render(e.to_string())
}

fn font(size: f64, color: RGBAColor) -> TextStyle<'static> {
    FontDesc::new(FontFamily::SansSerif, size, FontStyle::Normal).color(&color)
}

/// Draw `scene` onto any plotters backend.
pub fn paint<DB>(root: &DrawingArea<DB, Shift>, scene: &PlotScene, theme: &Theme) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let fg = theme.foreground.to_plotters();
    root.fill(&theme.background.to_plotters()).map_err(render_err)?;

    let body = root
        .titled(scene.title, FontDesc::new(FontFamily::SansSerif, TITLE_SIZE, FontStyle::Bold).color(&fg))
        .map_err(render_err)?;

    let (_, height) = body.dim_in_pixel();
    let (plots, footer) = if scene.stats.is_empty() {
        (body.clone(), None)
    } else {
        let split = (height as f64 * (1.0 - FOOTER_SHARE)) as u32;
        let (plots, footer) = body.split_vertically(split);
        (plots, Some(footer))
    };

    let areas = plots.split_evenly((2, 1));
    for (index, (area, panel)) in areas.iter().zip(&scene.panels).enumerate() {
        let bottom = index + 1 == scene.panels.len();
        draw_panel(root, area, scene, panel, theme, bottom)?;
    }

    if let Some(footer) = footer {
        draw_stats(&footer, &scene.stats, theme)?;
    }
    Ok(())
}

fn draw_panel<DB>(
    root: &DrawingArea<DB, Shift>,
    area: &DrawingArea<DB, Shift>,
    scene: &PlotScene,
    panel: &Panel,
    theme: &Theme,
    bottom: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let fg     = theme.foreground.to_plotters();
    let grid   = theme.grid.with_alpha(0.3).to_plotters();
    let colour = theme.series(panel.kind).to_plotters();
    let range  = panel.range;

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .set_label_area_size(LabelAreaPosition::Left, 90)
        .set_label_area_size(LabelAreaPosition::Bottom, if bottom { 110 } else { 20 })
        .build_cartesian_2d(0.0..scene.span, range.min..range.max)
        .map_err(render_err)?;

    // Time labels are placed by hand below, on six-hour boundaries.
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_desc(panel.axis_title())
        .axis_desc_style(font(AXIS_SIZE, fg))
        .label_style(font(TICK_SIZE, fg))
        .axis_style(fg)
        .bold_line_style(grid)
        .light_line_style(TRANSPARENT)
        .draw()
        .map_err(render_err)?;

    for tick in &scene.hour_ticks {
        chart
            .draw_series(LineSeries::new([(tick.x, range.min), (tick.x, range.max)], grid))
            .map_err(render_err)?;
    }

    if scene.is_empty() {
        chart
            .draw_series(std::iter::once(Text::new(
                "No data",
                (scene.span / 2.0, range.min + range.span() / 2.0),
                font(AXIS_SIZE, fg).pos(Pos::new(HPos::Center, VPos::Center)),
            )))
            .map_err(render_err)?;
    }

    let visible = |&(x, _): &(f64, f64)| x >= 0.0 && x <= scene.span;
    chart
        .draw_series(LineSeries::new(
            panel.curve.iter().copied().filter(visible).map(|(x, y)| (x, range.clamp(y))),
            colour.stroke_width(3),
        ))
        .map_err(render_err)?
        .label(panel.legend.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 30, y)], colour.stroke_width(3)));

    chart
        .draw_series(
            panel
                .points
                .iter()
                .copied()
                .filter(visible)
                .map(|(x, y)| Circle::new((x, range.clamp(y)), 4, colour.mix(0.6).filled())),
        )
        .map_err(render_err)?;

    for label in &panel.labels {
        let tint = match label.role {
            LabelRole::Start     => theme.start,
            LabelRole::Now       => theme.series(panel.kind),
            LabelRole::Milestone => theme.milestone,
        }
        .to_plotters();

        let (x, y) = label.anchor;
        if !visible(&label.anchor) {
            continue;
        }
        chart
            .draw_series(std::iter::once(Circle::new((x, range.clamp(y)), 6, tint.filled())))
            .map_err(render_err)?;

        let line_height = LABEL_SIZE as i32 + 2;
        let top = -(line_height * label.lines.len() as i32) / 2;
        let style = font(LABEL_SIZE, tint).pos(Pos::new(HPos::Center, VPos::Top));
        chart
            .draw_series(label.lines.iter().enumerate().map(|(i, line)| {
                EmptyElement::at((x, label.y))
                    + Text::new(line.clone(), (0, top + i as i32 * line_height), style.clone())
            }))
            .map_err(render_err)?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(theme.background.to_plotters())
        .border_style(fg)
        .label_font(font(TICK_SIZE, fg))
        .draw()
        .map_err(render_err)?;

    if bottom {
        let hour_style = font(TICK_SIZE, fg).pos(Pos::new(HPos::Center, VPos::Top));
        let day_style  = font(TICK_SIZE, theme.date_label.to_plotters()).pos(Pos::new(HPos::Center, VPos::Top));
        for tick in &scene.hour_ticks {
            let (px, py) = chart.backend_coord(&(tick.x, range.min));
            root.draw_text(&tick.text, &hour_style, (px, py + 8)).map_err(render_err)?;
        }
        for tick in &scene.day_ticks {
            let (px, py) = chart.backend_coord(&(tick.x, range.min));
            root.draw_text(&tick.text, &day_style, (px, py + 40)).map_err(render_err)?;
        }
        let (cx, cy) = chart.backend_coord(&(scene.span / 2.0, range.min));
        root.draw_text("Time", &font(AXIS_SIZE, fg).pos(Pos::new(HPos::Center, VPos::Top)), (cx, cy + 72))
            .map_err(render_err)?;
    }

    Ok(())
}

fn draw_stats<DB>(area: &DrawingArea<DB, Shift>, lines: &[String], theme: &Theme) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let fg = theme.foreground.to_plotters();
    let line_height = STATS_SIZE as i32 + 6;
    let (width, _) = area.dim_in_pixel();
    let box_height = line_height * lines.len() as i32 + 16;
    let box_width  = (width as i32 * 2 / 3).max(400);

    area.draw(&Rectangle::new(
        [(20, 4), (20 + box_width, 4 + box_height)],
        theme.background.to_plotters().filled(),
    ))
    .map_err(render_err)?;
    area.draw(&Rectangle::new([(20, 4), (20 + box_width, 4 + box_height)], fg.stroke_width(1)))
        .map_err(render_err)?;

    for (i, line) in lines.iter().enumerate() {
        area.draw_text(line, &font(STATS_SIZE, fg), (32, 12 + i as i32 * line_height))
            .map_err(render_err)?;
    }
    Ok(())
}
