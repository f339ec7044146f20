use eframe::egui::{Color32, ScrollArea, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points,
};

use crate::state::{AppState, ChartTab};

/// Rows rendered by the data tab.
const DATA_TAB_ROWS: usize = 500;

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected chart (or the data table) in the central panel.
pub fn central(ui: &mut Ui, state: &AppState) {
    if state.analysis.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyse  (File → Open…)");
        });
        return;
    }

    ui.heading(state.tab.title());
    match state.tab {
        ChartTab::RangeByType => range_box_plot(ui, state),
        ChartTab::RangeHistogram => range_histogram(ui, state),
        ChartTab::CountByYear => year_bar_chart(ui, state),
        ChartTab::RangeVsMsrp => range_vs_msrp(ui, state),
        ChartTab::TrueVsPredicted => true_vs_predicted(ui, state),
        ChartTab::Data => data_table(ui, state),
    }
}

fn category_color(state: &AppState, label: &str) -> Color32 {
    state
        .color_map
        .as_ref()
        .map(|cm| cm.color_for_label(label))
        .unwrap_or(Color32::LIGHT_BLUE)
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// Box plot: Electric Range by Vehicle Type.
fn range_box_plot(ui: &mut Ui, state: &AppState) {
    Plot::new("range_by_type")
        .legend(Legend::default())
        .x_axis_label("Vehicle Type")
        .y_axis_label("Electric Range")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (slot, (kind, stats)) in state.charts.range_boxes.iter().enumerate() {
                let x = slot as f64;
                let color = category_color(state, kind.label());
                let spread = BoxSpread::new(
                    stats.lower_whisker,
                    stats.q1,
                    stats.median,
                    stats.q3,
                    stats.upper_whisker,
                );
                let elem = BoxElem::new(x, spread)
                    .name(format!("{} (n = {})", kind.label(), stats.count))
                    .box_width(0.5)
                    .whisker_width(0.25)
                    .fill(color.gamma_multiply(0.5))
                    .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(kind.label()));

                if !stats.outliers.is_empty() {
                    let points: PlotPoints = stats.outliers.iter().map(|&v| [x, v]).collect();
                    plot_ui.points(Points::new(points).radius(2.0).color(color));
                }
            }
        });
}

/// Histogram: Electric Range Distribution.
fn range_histogram(ui: &mut Ui, state: &AppState) {
    let bars: Vec<Bar> = state
        .charts
        .range_histogram
        .iter()
        .map(|bin| {
            Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                .width(bin.end - bin.start)
                .name(format!("{:.0}–{:.0} mi", bin.start, bin.end))
        })
        .collect();

    Plot::new("range_histogram")
        .legend(Legend::default())
        .x_axis_label("Electric Range (miles)")
        .y_axis_label("Frequency")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(Color32::from_rgb(135, 206, 235))
                    .name("Electric Range"),
            );
        });
}

/// Bar chart: Count of Vehicles by Model Year.
fn year_bar_chart(ui: &mut Ui, state: &AppState) {
    let bars: Vec<Bar> = state
        .charts
        .year_counts
        .iter()
        .map(|&(year, count)| {
            Bar::new(year as f64, count as f64)
                .width(0.8)
                .name(year.to_string())
        })
        .collect();

    Plot::new("count_by_year")
        .legend(Legend::default())
        .x_axis_label("Model Year")
        .y_axis_label("Count")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Vehicles"));
        });
}

/// Scatter: Electric Range vs Base MSRP, one series per vehicle type.
fn range_vs_msrp(ui: &mut Ui, state: &AppState) {
    Plot::new("range_vs_msrp")
        .legend(Legend::default())
        .x_axis_label("Base MSRP ($)")
        .y_axis_label("Electric Range (miles)")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (kind, points) in &state.charts.msrp_points {
                let series: PlotPoints = points.iter().copied().collect();
                plot_ui.points(
                    Points::new(series)
                        .radius(2.0)
                        .color(category_color(state, kind.label()))
                        .name(kind.label()),
                );
            }
        });
}

/// Scatter: True vs Predicted Electric Range, with the identity line.
fn true_vs_predicted(ui: &mut Ui, state: &AppState) {
    let points = &state.charts.prediction_points;
    let (lo, hi) = points
        .iter()
        .flat_map(|p| p.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    Plot::new("true_vs_predicted")
        .legend(Legend::default())
        .x_axis_label("True Electric Range (miles)")
        .y_axis_label("Predicted Electric Range (miles)")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            let series: PlotPoints = points.iter().copied().collect();
            plot_ui.points(
                Points::new(series)
                    .radius(2.5)
                    .color(Color32::from_rgb(128, 0, 128))
                    .name("test rows"),
            );
            if lo.is_finite() && hi.is_finite() {
                let diagonal: PlotPoints = vec![[lo, lo], [hi, hi]].into();
                plot_ui.line(
                    Line::new(diagonal)
                        .color(Color32::GRAY)
                        .width(1.0)
                        .name("y = x"),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Data tab
// ---------------------------------------------------------------------------

/// The first visible rows of the cleaned table.
fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        return;
    };
    let table = &analysis.table;
    let rows: Vec<usize> = state
        .visible_indices
        .iter()
        .copied()
        .take(DATA_TAB_ROWS)
        .collect();

    ui.label(format!(
        "Showing {} of {} visible rows",
        rows.len(),
        state.visible_indices.len()
    ));

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .column(Column::auto())
            .columns(Column::auto().at_least(60.0), table.columns.len())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                for name in &table.columns {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows.len(), |mut row| {
                    let i = rows[row.index()];
                    row.col(|ui| {
                        ui.label(i.to_string());
                    });
                    for name in &table.columns {
                        row.col(|ui| {
                            ui.label(table.value(i, name).to_string());
                        });
                    }
                });
            });
    });
}
