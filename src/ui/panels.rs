use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, ChartTab, FILTER_COLUMNS};

// ---------------------------------------------------------------------------
// Left side panel – model summary and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(analysis) = &state.analysis else {
        ui.label("No dataset loaded.");
        return;
    };

    ui.heading("Model");
    ui.separator();
    egui::Grid::new("model_grid").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("intercept");
        ui.monospace(format!("{:.4}", analysis.model.intercept));
        ui.end_row();
        for (name, coef) in analysis
            .model
            .feature_names
            .iter()
            .zip(&analysis.model.coefficients)
        {
            ui.label(name);
            ui.monospace(format!("{coef:.6}"));
            ui.end_row();
        }
        ui.label("test MSE");
        ui.monospace(format!("{:.2}", analysis.evaluation.mse));
        ui.end_row();
        if let Some(r2) = analysis.evaluation.r_squared {
            ui.label("test R²");
            ui.monospace(format!("{r2:.4}"));
            ui.end_row();
        }
        ui.label("train / test");
        ui.monospace(format!(
            "{} / {}",
            analysis.split.n_train(),
            analysis.split.n_test()
        ));
        ui.end_row();
    });
    ui.add_space(8.0);

    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let unique: Vec<_> = FILTER_COLUMNS
        .iter()
        .map(|col| (col.to_string(), analysis.table.unique_values(col)))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (col, all_values) in &unique {
                let n_selected = state.filters.get(col).map_or(0, |s| s.len());
                let header_text = format!("{col}  ({n_selected}/{})", all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        for val in all_values {
                            let mut checked = state
                                .filters
                                .get(col)
                                .is_some_and(|selected| selected.contains(val));

                            // Vehicle types get their chart colour
                            let mut text = RichText::new(val.to_string());
                            if let Some(cm) = &state.color_map {
                                if cm.column == *col {
                                    text = text.color(cm.color_for(val));
                                }
                            }

                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(col, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, the chart tabs and the status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in ChartTab::ALL {
            if ui.selectable_label(state.tab == tab, tab.title()).clicked() {
                state.tab = tab;
            }
        }

        ui.separator();

        if let Some(analysis) = &state.analysis {
            ui.label(format!(
                "{} rows, {} visible",
                analysis.table.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open EV population data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.reload(path);
    }
}
