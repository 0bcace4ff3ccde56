use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints, PlotUi};

use crate::chart::{self, Bounds, Figure, HistogramSeries, Panel, PanelBody};

/// Gap between bars of one category chart, as a fraction of the slot.
const BAR_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Figure grid (central panel)
// ---------------------------------------------------------------------------

/// Lay the figure's panels out in its rows × cols grid, one egui plot each.
pub fn figure_grid(ui: &mut Ui, figure: &Figure) {
    if figure.panels.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing to plot");
        });
        return;
    }

    let rows = figure.rows.max(1);
    let cols = figure.cols.max(1);
    // Title row and spacing come out of each cell.
    let cell_height = (ui.available_height() / rows as f32 - 28.0).max(80.0);

    for row in 0..rows {
        ui.columns(cols, |columns: &mut [Ui]| {
            for (col, ui) in columns.iter_mut().enumerate() {
                let index = row * cols + col;
                let Some(panel) = figure.panels.get(index) else {
                    continue;
                };
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.label(RichText::new(&panel.title).strong());
                });
                panel_plot(ui, index, panel, figure.panel_bounds(index), cell_height);
            }
        });
    }
}

fn panel_plot(ui: &mut Ui, index: usize, panel: &Panel, bounds: Bounds, height: f32) {
    let mut plot = Plot::new(("figure_panel", index))
        .height(height)
        .include_x(bounds.x.0)
        .include_x(bounds.x.1)
        .include_y(bounds.y.0)
        .include_y(bounds.y.1)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if panel.legend {
        plot = plot.legend(Legend::default());
    }
    if let Some(label) = &panel.x_label {
        plot = plot.x_axis_label(label.as_str());
    }
    if let Some(label) = &panel.y_label {
        plot = plot.y_axis_label(label.as_str());
    }

    match &panel.body {
        PanelBody::Bars(bars) => {
            // Category names replace the integer slot positions on the x axis.
            let names: Vec<String> = bars.iter().map(|bar| bar.category.clone()).collect();
            plot.x_axis_formatter(move |mark: GridMark, _range| category_label(&names, mark.value))
                .show(ui, |plot_ui| category_bars(plot_ui, bars));
        }
        PanelBody::Histograms(series) => {
            plot.show(ui, |plot_ui| {
                for hist in series {
                    histogram_bars(plot_ui, hist);
                }
            });
        }
        PanelBody::Lines(lines) => {
            plot.show(ui, |plot_ui| {
                for line in lines {
                    line_series(plot_ui, line);
                }
            });
        }
    }
}

fn category_label(names: &[String], value: f64) -> String {
    let slot = value.round();
    if (value - slot).abs() > 1e-6 || slot < 0.0 {
        return String::new();
    }
    names.get(slot as usize).cloned().unwrap_or_default()
}

fn category_bars(plot_ui: &mut PlotUi, bars: &[chart::Bar]) {
    for (slot, bar) in bars.iter().enumerate() {
        let color = bar.color.to_color32();
        let item = Bar::new(slot as f64, bar.value)
            .width(BAR_WIDTH)
            .fill(color)
            .name(&bar.category);
        plot_ui.bar_chart(BarChart::new(vec![item]).color(color).name(&bar.category));
    }
}

fn histogram_bars(plot_ui: &mut PlotUi, hist: &HistogramSeries) {
    let color = hist.color.to_color32();
    let bars: Vec<Bar> = hist
        .bins()
        .filter(|&(_, _, count)| count > 0)
        .map(|(lower, upper, count)| {
            Bar::new((lower + upper) / 2.0, count as f64)
                .width(upper - lower)
                .fill(color)
        })
        .collect();
    plot_ui.bar_chart(BarChart::new(bars).color(color).name(&hist.label));
}

fn line_series(plot_ui: &mut PlotUi, line: &chart::LineSeries) {
    let points: PlotPoints = line.points.iter().map(|&(x, y)| [x, y]).collect();
    plot_ui.line(
        Line::new(points)
            .name(&line.label)
            .color(line.color.to_color32())
            .width(1.5),
    );
}
