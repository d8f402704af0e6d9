mod app;
mod config;
mod data;
mod state;
mod ui;

use app::LandDashboardApp;
use config::{Secrets, SourceConfig};
use data::loader::{DataSource, FileSource};
use data::s3::S3Source;
use eframe::egui;
use state::AppState;

/// Resolve the configured source, or explain why there is none.
fn configured_state() -> AppState {
    let source: anyhow::Result<Box<dyn DataSource>> = Secrets::load()
        .and_then(|secrets| secrets.source())
        .and_then(|config| {
            log::debug!("Source configuration: {config:?}");
            let source: Box<dyn DataSource> = match config {
                SourceConfig::Local(path) => Box::new(FileSource::new(path)),
                SourceConfig::S3(settings) => Box::new(S3Source::new(settings)?),
            };
            Ok(source)
        });

    match source {
        Ok(source) => AppState::new(source),
        Err(e) => {
            log::error!("No data source configured: {e:#}");
            AppState::unconfigured(format!("No data source configured: {e:#}"))
        }
    }
}

fn main() -> eframe::Result {
    env_logger::init();

    let state = configured_state();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Property Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(LandDashboardApp::new(state)))),
    )
}
