use eframe::egui;

use crate::analysis::Analysis;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EvRangeApp {
    pub state: AppState,
}

impl EvRangeApp {
    pub fn new(analysis: Analysis) -> Self {
        Self {
            state: AppState::new(analysis),
        }
    }
}

impl eframe::App for EvRangeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + chart tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: model summary + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart or data table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central(ui, &self.state);
        });
    }
}

/// Open the chart window and block until it is closed.
pub fn launch(analysis: Analysis) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "EV Range – Analysis",
        options,
        Box::new(|_cc| Ok(Box::new(EvRangeApp::new(analysis)))),
    )
}
