use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::chart::{self, Bar, Bounds, Figure, HistogramSeries, Panel, PanelBody};

const TITLE_FONT: (&str, u32) = ("sans-serif", 18);

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

// ---------------------------------------------------------------------------
// PNG output
// ---------------------------------------------------------------------------

/// Draw `figure` off-screen and write it to `path` as PNG.
pub fn save_png(figure: &Figure, path: &Path) -> Result<()> {
    let (width, height) = figure.size;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw_figure(&root, figure).context("drawing figure")?;
        root.present().context("finishing figure")?;
    }

    let image = RgbImage::from_raw(width, height, pixels).context("pixel buffer does not match figure size")?;
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    log::info!("Saved {}x{} figure to {}", width, height, path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Figure drawing, generic over the plotters backend
// ---------------------------------------------------------------------------

pub fn draw_figure<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let areas = root.split_evenly((figure.rows, figure.cols));
    for (index, (area, panel)) in areas.iter().zip(&figure.panels).enumerate() {
        let bounds = figure.panel_bounds(index);
        match &panel.body {
            PanelBody::Bars(bars) => draw_bars(area, panel, bars, bounds)?,
            PanelBody::Histograms(series) => draw_histograms(area, panel, series, bounds)?,
            PanelBody::Lines(lines) => draw_lines(area, panel, lines, bounds)?,
        }
    }
    Ok(())
}

fn chart_builder<'a, 'b, DB: DrawingBackend>(area: &'a DrawingArea<DB, Shift>, panel: &Panel) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .caption(&panel.title, TITLE_FONT)
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50);
    builder
}

fn draw_bars<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel, bars: &[Bar], bounds: Bounds) -> DrawResult<DB> {
    let slots = bars.len().max(1) as u32;
    let mut chart = chart_builder(area, panel).build_cartesian_2d((0..slots).into_segmented(), bounds.y.0..bounds.y.1)?;

    let category = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(slot) => bars
            .get(*slot as usize)
            .map(|bar| bar.category.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(slots as usize)
        .x_label_formatter(&category)
        .draw()?;

    chart.draw_series(bars.iter().enumerate().map(|(slot, bar)| {
        let slot = slot as u32;
        let mut rect = Rectangle::new(
            [(SegmentValue::Exact(slot), 0.0), (SegmentValue::Exact(slot + 1), bar.value)],
            bar.color.to_rgba().filled(),
        );
        rect.set_margin(0, 0, 10, 10);
        rect
    }))?;
    Ok(())
}

fn draw_histograms<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    series: &[HistogramSeries],
    bounds: Bounds,
) -> DrawResult<DB> {
    let mut chart = chart_builder(area, panel).build_cartesian_2d(bounds.x.0..bounds.x.1, bounds.y.0..bounds.y.1)?;
    configure_axes(&mut chart, panel)?;

    for hist in series {
        let style = hist.color.to_rgba().filled();
        chart
            .draw_series(
                hist.bins()
                    .filter(|&(_, _, count)| count > 0)
                    .map(move |(lower, upper, count)| Rectangle::new([(lower, 0.0), (upper, count as f64)], style)),
            )?
            .label(hist.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], style));
    }

    if panel.legend {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

fn draw_lines<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel, lines: &[chart::LineSeries], bounds: Bounds) -> DrawResult<DB> {
    let mut chart = chart_builder(area, panel).build_cartesian_2d(bounds.x.0..bounds.x.1, bounds.y.0..bounds.y.1)?;
    configure_axes(&mut chart, panel)?;

    for line in lines {
        let style = line.color.to_rgba().stroke_width(2);
        chart
            .draw_series(LineSeries::new(line.points.iter().copied(), style))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    if panel.legend {
        draw_legend(&mut chart)?;
    }
    Ok(())
}

type XyChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn configure_axes<DB: DrawingBackend>(chart: &mut XyChart<'_, DB>, panel: &Panel) -> DrawResult<DB> {
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh();
    if let Some(label) = &panel.x_label {
        mesh.x_desc(label.as_str());
    }
    if let Some(label) = &panel.y_label {
        mesh.y_desc(label.as_str());
    }
    mesh.draw()
}

fn draw_legend<'a, DB: DrawingBackend + 'a>(chart: &mut XyChart<'a, DB>) -> DrawResult<DB> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
}
