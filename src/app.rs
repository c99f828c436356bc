use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RetailLensApp {
    pub state: AppState,
}

impl RetailLensApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RetailLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let dashboard = match &mut self.state {
            AppState::Ready(dashboard) => dashboard,
            AppState::Failed(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    panels::fatal_error(ui, message);
                });
                return;
            }
        };

        // ---- Left side panel: navigation + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, dashboard);
            });

        // Widget changes above only mark the state dirty; recompute once here.
        dashboard.refresh();

        // ---- Top panel: title and row counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, dashboard);
        });

        // ---- Central panel: active view ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, dashboard);
        });
    }
}
