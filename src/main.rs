mod app;
mod charts;
mod color;
mod conclusion;
mod config;
mod data;
mod state;
mod ui;
mod view;

use app::RetailLensApp;
use clap::Parser;
use config::{Args, PipelineOptions};
use data::loader::SHARED_DATASET;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    let state = match SHARED_DATASET.get_or_load(&args.data) {
        Ok(raw) => AppState::ready(raw, PipelineOptions::from(&args)),
        Err(e) => {
            log::error!("Failed to load {}: {e}", args.data.display());
            AppState::failed(e.to_string())
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Retail Lens – Data Analysis Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RetailLensApp::new(state)))),
    )
}
