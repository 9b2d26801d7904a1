mod app;
mod config;
mod event;
mod notes;
mod sync;
mod theme;
mod ui;

use app::StickiesApp;
use config::AppConfig;
use eframe::egui;
use theme::Theme;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let config = AppConfig::from_env();
    log::info!("notes file: {}", config.notes_file.display());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Sticky Notes")
            .with_inner_size([600.0, 500.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sticky Notes",
        native_options,
        Box::new(move |creation_context| {
            let theme = Theme::default();
            theme.apply_visuals(&creation_context.egui_ctx);
            Ok(Box::new(StickiesApp::new(config, theme)))
        }),
    )?;

    Ok(())
}
