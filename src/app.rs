use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LandDashboardApp {
    pub state: AppState,
}

impl LandDashboardApp {
    /// Takes an already-configured state and performs the first load.
    pub fn new(mut state: AppState) -> Self {
        state.reload();
        Self { state }
    }
}

impl eframe::App for LandDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + refresh ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: listing table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::listings_panel(ui, &self.state);
        });
    }
}
