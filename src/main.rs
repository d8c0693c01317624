mod app;

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Pathway skeleton JSON (metadata, nodes, links).
    pathway: PathBuf,

    /// PTM measurement list to attach to gene/protein nodes.
    #[arg(long)]
    ptm: Option<PathBuf>,

    /// Full-proteome regulation list used for up/down/not counts.
    #[arg(long)]
    proteome: Option<PathBuf>,

    /// Engine configuration overrides (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let request = app::LoadRequest {
        pathway: args.pathway,
        ptm: args.ptm,
        proteome: args.proteome,
        config: args.config,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "pathwaygraph",
        options,
        Box::new(move |cc| Ok(Box::new(app::PathwayViewerApp::new(cc, request)))),
    )
}
