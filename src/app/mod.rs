use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use clap::ValueEnum;
use eframe::egui::{self, Context, Vec2};
use log::{error, info, warn};

use cinegraph::data::{Dataset, load_dataset, sample_dataset};
use cinegraph::view::NodeDetails;
use cinegraph::{GraphView, NodeId, Notice, ViewConfig};

mod canvas;
mod panels;
mod render_utils;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InitialLayout {
    Force,
    Rank,
    Year,
}

impl InitialLayout {
    fn linear_field(self) -> Option<&'static str> {
        match self {
            Self::Force => None,
            Self::Rank => Some("rank"),
            Self::Year => Some("year"),
        }
    }
}

pub struct CinegraphApp {
    data_path: Option<PathBuf>,
    config: ViewConfig,
    initial_layout: InitialLayout,
    canvas_size: Vec2,
    state: AppState,
    reload_rx: Option<Receiver<Result<Dataset, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    view: GraphView,
    dataset_label: String,
    details: Option<NodeDetails>,
    notice: Option<Notice>,
    status: Option<String>,
    search: String,
    pan: Vec2,
    zoom: f32,
    pointer_over: Option<NodeId>,
    selected: Option<NodeId>,
    click_to_add: bool,
    drag_to_connect: bool,
    edge_source: String,
    edge_target: String,
    attribute_key: String,
    attribute_value: String,
}

impl CinegraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        data_path: Option<PathBuf>,
        config: ViewConfig,
        initial_layout: InitialLayout,
        canvas_size: Vec2,
    ) -> Self {
        let state = Self::start_load(data_path.clone());
        Self {
            data_path,
            config,
            initial_layout,
            canvas_size,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(data_path: Option<PathBuf>) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = match &data_path {
                Some(path) => load_dataset(path),
                None => sample_dataset(),
            }
            .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(data_path: Option<PathBuf>) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(data_path),
        }
    }

    fn dataset_label(&self) -> String {
        match &self.data_path {
            Some(path) => path.display().to_string(),
            None => "built-in sample".to_owned(),
        }
    }

    fn ready(&self, dataset: Dataset, now: f64) -> AppState {
        AppState::Ready(Box::new(ViewModel::new(
            dataset,
            self.dataset_label(),
            self.config,
            self.canvas_size,
            self.initial_layout,
            now,
        )))
    }

    fn failed(error: String) -> AppState {
        error!("dataset load failed: {error}");
        AppState::Error(error)
    }
}

impl ViewModel {
    fn new(
        dataset: Dataset,
        dataset_label: String,
        config: ViewConfig,
        canvas_size: Vec2,
        initial_layout: InitialLayout,
        now: f64,
    ) -> Self {
        let mut view = GraphView::new(config, canvas_size);
        view.tick(now);
        let report = view.load(&dataset.nodes, &dataset.edges);
        view.enable_click_to_add();
        view.enable_drag_to_connect();

        let mut status = (!report.rejected.is_empty())
            .then(|| format!("{} items rejected while loading", report.rejected.len()));
        if let Some(field) = initial_layout.linear_field()
            && let Err(error) = view.switch_to_linear_layout(field)
        {
            status = Some(error.to_string());
        }

        Self {
            view,
            dataset_label,
            details: None,
            notice: None,
            status,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            pointer_over: None,
            selected: None,
            click_to_add: true,
            drag_to_connect: true,
            edge_source: String::new(),
            edge_target: String::new(),
            attribute_key: String::new(),
            attribute_value: String::new(),
        }
    }
}

impl eframe::App for CinegraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(dataset)) => transition = Some(Ok(dataset)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading movie graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the movie graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = Self::start_load(self.data_path.clone());
                    return;
                }
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, now, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    info!("reloading dataset");
                    self.reload_rx = Some(Self::spawn_load(self.data_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            warn!("reload worker disconnected");
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = match result {
                Ok(dataset) => self.ready(dataset, now),
                Err(error) => Self::failed(error),
            };
            ctx.request_repaint();
        }
    }
}
