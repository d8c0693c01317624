use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context, Vec2};
use log::{error, info};
use pathwaygraph::{EngineConfig, PathwayEngine, PathwayInput, SelectedLeaf};

mod graph;
mod render_utils;
mod ui;

/// Files the viewer was started with; reloading re-reads all of them.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub pathway: PathBuf,
    pub ptm: Option<PathBuf>,
    pub proteome: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

pub struct PathwayViewerApp {
    request: LoadRequest,
    state: AppState,
    reload_rx: Option<Receiver<Result<PathwayEngine, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<PathwayEngine, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    engine: PathwayEngine,
    search: String,
    details: Option<String>,
    selected_leaves: Vec<SelectedLeaf>,
    pan: Vec2,
    zoom: f32,
    layout_moving: bool,
}

fn read_input(path: &Path, what: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {what} file {}", path.display()))
}

fn load_engine(request: &LoadRequest) -> anyhow::Result<PathwayEngine> {
    let pathway = read_input(&request.pathway, "pathway")?;
    let ptm = request
        .ptm
        .as_deref()
        .map(|path| read_input(path, "PTM"))
        .transpose()?;
    let proteome = request
        .proteome
        .as_deref()
        .map(|path| read_input(path, "full proteome"))
        .transpose()?;

    let config = match &request.config {
        Some(path) => EngineConfig::from_json_str(&read_input(path, "config")?)
            .with_context(|| format!("invalid engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let input = PathwayInput::from_json(&pathway, ptm.as_deref(), proteome.as_deref())
        .context("failed to parse pathway inputs")?;
    PathwayEngine::new(input, config).context("failed to assemble pathway graph")
}

impl PathwayViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, request: LoadRequest) -> Self {
        let state = Self::start_load(request.clone());
        Self {
            request,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(request: LoadRequest) -> Receiver<Result<PathwayEngine, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_engine(&request).map_err(|error| format!("{error:#}"));
            match &result {
                Ok(_) => info!("loaded {}", request.pathway.display()),
                Err(message) => error!("{message}"),
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(request: LoadRequest) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(request),
        }
    }
}

impl eframe::App for PathwayViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(engine) => AppState::Ready(Box::new(ViewModel::new(engine))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading pathway...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load pathway");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.request.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                let source = self.request.pathway.display().to_string();
                model.show(ctx, &source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.request.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(engine) => AppState::Ready(Box::new(ViewModel::new(engine))),
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
