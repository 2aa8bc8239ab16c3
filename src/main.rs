use std::path::PathBuf;
use std::process;

use brain_graph::app::{DataSource, GraphExplorerApp};
use brain_graph::config::AppConfig;
use clap::Parser;
use log::{debug, error, info};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph dataset (JSON with `nodes` and `edges`); the bundled sample when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Configuration file; `brain-graph.toml` is picked up when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the initial layout placement.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    debug!(args:?; "Parsed arguments");

    let mut config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            process::exit(1);
        }
    };
    if args.seed.is_some() {
        config.layout.seed = args.seed;
    }

    let source = args.data.map_or(DataSource::Sample, DataSource::File);
    info!(source:?; "Starting brain-graph");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([config.viewer.window_width, config.viewer.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "brain-graph",
        options,
        Box::new(move |cc| Ok(Box::new(GraphExplorerApp::new(cc, source, config)))),
    )
}
