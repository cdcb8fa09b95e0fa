mod app;

use std::path::PathBuf;

use clap::Parser;
use eframe::egui::vec2;
use log::{error, info};

use cinegraph::ViewConfig;

use crate::app::{CinegraphApp, InitialLayout};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Movie graph as JSON (`nodes` plus `edges` or `links`). Uses the bundled sample when omitted.
    #[arg(long)]
    data: Option<PathBuf>,
    /// JSON file overriding layout and animation settings.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = InitialLayout::Force)]
    layout: InitialLayout,
    /// Logical width of the graph viewport.
    #[arg(long, default_value_t = 960.0)]
    width: f32,
    #[arg(long, default_value_t = 640.0)]
    height: f32,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ViewConfig::load_from_path(path).unwrap_or_else(|error| {
            error!("ignoring config {}: {error:#}", path.display());
            ViewConfig::default()
        }),
        None => ViewConfig::default(),
    };
    info!(
        "starting cinegraph with a {}x{} viewport",
        args.width, args.height
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "cinegraph",
        options,
        Box::new(move |cc| {
            Ok(Box::new(CinegraphApp::new(
                cc,
                args.data.clone(),
                config,
                args.layout,
                vec2(args.width, args.height),
            )))
        }),
    )
}
