mod adapter;
mod app;
mod config;
mod filter;
mod picker;
mod processing;
mod review;
mod share;
mod source;
mod state;

use app::InstafilterApp;
use config::AppConfig;

const PREVIEW_MAX_ENV: &str = "INSTAFILTER_PREVIEW_MAX";

/// Accepts a positive pixel count; anything else is ignored.
fn parse_preview_max(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|&v| v >= 64)
}

fn resolve_preview_max(env_value: Option<&str>, config: &AppConfig) -> u32 {
    env_value
        .and_then(parse_preview_max)
        .or(config.preview_max.filter(|&v| v >= 64))
        .unwrap_or(source::PREVIEW_MAX)
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let env_preview = std::env::var(PREVIEW_MAX_ENV).ok();
    let preview_max = resolve_preview_max(env_preview.as_deref(), &config);
    tracing::debug!(preview_max, "starting instafilter");

    let width = config.window_width.unwrap_or(720.0);
    let height = config.window_height.unwrap_or(860.0);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Instafilter")
            .with_app_id("instafilter")
            .with_inner_size([width, height]),
        ..Default::default()
    };

    eframe::run_native(
        "instafilter",
        native_options,
        Box::new(move |cc| Ok(Box::new(InstafilterApp::new(cc, config, preview_max)))),
    )
}
