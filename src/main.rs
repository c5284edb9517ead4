#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod config;
mod error;
mod ffmpeg;
mod job;
mod pipeline;
mod process;
mod resolution;
mod svt;
mod ui;

use app::Av1EncoderApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    // Respect RUST_LOG if set, otherwise info
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([560.0, 480.0])
            .with_min_inner_size([420.0, 360.0])
            .with_title("AV1 Encoder - SVT-AV1 GUI"),
        ..Default::default()
    };

    eframe::run_native(
        "AV1 Encoder",
        options,
        Box::new(|cc| Ok(Box::new(Av1EncoderApp::new(cc)))),
    )
}
