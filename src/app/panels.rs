use std::collections::HashSet;

use eframe::egui::{self, Align, Context, Layout, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde_json::Value;

use cinegraph::NodeId;
use cinegraph::layout::LayoutMode;
use cinegraph::model::NodeField;
use cinegraph::view::{DetailSlot, LabelField};

use super::ViewModel;

const MAX_SUGGESTIONS: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Edited values are stored as JSON when they parse, otherwise as text.
fn parse_attribute_value(raw: &str) -> Value {
    serde_json::from_str(raw.trim()).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

impl ViewModel {
    pub(super) fn show(
        &mut self,
        ctx: &Context,
        now: f64,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        let animating = self.view.tick(now);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("cinegraph");
                    ui.separator();
                    ui.label(format!("data: {}", self.dataset_label));
                    ui.label(format!("nodes: {}", self.view.model().node_count()));
                    ui.label(format!("edges: {}", self.view.model().edge_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.layout_text());
                        if let Some(status) = &self.status {
                            ui.label(RichText::new(status).weak());
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading movie graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui, now);
            }
        });

        self.draw_notice(ctx);

        if animating {
            ctx.request_repaint();
        }
    }

    fn layout_text(&self) -> String {
        match self.view.mode() {
            LayoutMode::Force => "layout: force-directed".to_owned(),
            LayoutMode::Linear(layout) => format!("layout: linear by {}", layout.field.label()),
        }
    }

    fn draw_notice(&mut self, ctx: &Context) {
        let Some(notice) = self.notice else {
            return;
        };

        let response = egui::Modal::new(egui::Id::new("edge_notice")).show(ctx, |ui| {
            ui.set_width(260.0);
            ui.heading("Edge rejected");
            ui.add_space(6.0);
            ui.label(notice.to_string());
            ui.add_space(10.0);
            ui.button("OK").clicked()
        });
        if response.inner || response.should_close() {
            self.notice = None;
        }
    }

    fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();

        ui.label(RichText::new("Layout").strong());
        ui.horizontal_wrapped(|ui| {
            if ui
                .selectable_label(self.view.mode().is_force(), "Force")
                .on_hover_text("Physics layout: linked movies attract, all others repel.")
                .clicked()
            {
                self.view.switch_to_force_layout();
                self.status = None;
            }
            for field in NodeField::LINEAR {
                let active = matches!(
                    self.view.mode(),
                    LayoutMode::Linear(layout) if layout.field == field
                );
                let text = format!("By {}", field.label());
                if ui
                    .selectable_label(active, text)
                    .on_hover_text("Arc diagram ordered along the x axis.")
                    .clicked()
                {
                    self.status = self
                        .view
                        .switch_to_linear_layout(field.label())
                        .err()
                        .map(|error| error.to_string());
                }
            }
        });

        ui.separator();
        ui.label(RichText::new("Labels").strong());
        let current = LabelField::from_selector(self.view.label_selector());
        egui::ComboBox::from_id_salt("label_field")
            .selected_text(current.map_or("None", LabelField::title))
            .show_ui(ui, |ui| {
                for field in LabelField::ALL {
                    if ui
                        .selectable_label(current == Some(field), field.title())
                        .clicked()
                    {
                        self.view.set_label_selector(field.selector());
                    }
                }
            });
        ui.horizontal(|ui| {
            if ui.button("Show all").clicked() {
                self.view.show_all_labels();
            }
            if ui.button("Hide all").clicked() {
                self.view.hide_all_labels();
            }
        });

        ui.separator();
        self.draw_search(ui);

        ui.separator();
        ui.label(RichText::new("Editing").strong());
        if ui
            .checkbox(&mut self.click_to_add, "Click empty canvas to add a movie")
            .changed()
        {
            if self.click_to_add {
                self.view.enable_click_to_add();
            } else {
                self.view.disable_click_to_add();
            }
        }
        if ui
            .checkbox(&mut self.drag_to_connect, "Drag between movies to connect")
            .changed()
        {
            if self.drag_to_connect {
                self.view.enable_drag_to_connect();
            } else {
                self.view.disable_drag_to_connect();
            }
        }

        let selected = self.selected.clone();
        ui.add_enabled_ui(selected.is_some(), |ui| {
            let label = match &selected {
                Some(id) => format!("Remove movie {id}"),
                None => "Remove selected movie".to_owned(),
            };
            if ui.button(label).clicked()
                && let Some(id) = &selected
            {
                self.remove_selected(id);
            }
        });

        ui.add_space(4.0);
        ui.label("Remove edge (source -> target)");
        ui.horizontal(|ui| {
            ui.add(egui::TextEdit::singleline(&mut self.edge_source).desired_width(90.0));
            ui.add(egui::TextEdit::singleline(&mut self.edge_target).desired_width(90.0));
            if ui.button("Remove").clicked() {
                let source = self.edge_source.trim().to_owned();
                let target = self.edge_target.trim().to_owned();
                self.status = match self.view.remove_edge(&source, &target) {
                    Ok(_) => Some(format!("removed edge {source} -> {target}")),
                    Err(error) => Some(error.to_string()),
                };
            }
        });

        ui.separator();
        self.draw_attribute_editor(ui);
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Search").strong())
            .on_hover_text("Exact match on rank, id, name, genre, cast, director, writer or title.");
        let response = ui.text_edit_singleline(&mut self.search);
        let submitted =
            response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));

        ui.horizontal(|ui| {
            if ui.button("Find").clicked() || submitted {
                self.run_query();
            }
            if ui.button("Clear").clicked() {
                self.search.clear();
                self.view.clear_highlight();
                self.view.hide_all_labels();
                self.status = None;
            }
        });

        let query = self.search.trim().to_owned();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut suggestions = self
            .view
            .model()
            .nodes()
            .iter()
            .filter_map(|node| {
                let name = node.field_text(NodeField::Name, 0)?;
                let score = fuzzy_match_score(&matcher, &name, &query)?;
                Some((score, name))
            })
            .collect::<Vec<_>>();
        suggestions.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        suggestions.dedup_by(|a, b| a.1 == b.1);

        for (_, name) in suggestions.into_iter().take(MAX_SUGGESTIONS) {
            if name != query && ui.link(name.as_str()).clicked() {
                self.search = name;
                self.run_query();
            }
        }
    }

    fn run_query(&mut self) {
        let token = self.search.trim().to_owned();
        let matches = self.view.query(&token);
        self.status = Some(match matches.len() {
            0 => format!("no movie matches {token:?}"),
            1 => "1 match".to_owned(),
            count => format!("{count} matches"),
        });
    }

    fn remove_selected(&mut self, id: &NodeId) {
        self.status = match self.view.remove_node(id.as_str()) {
            Ok(removed) => Some(format!(
                "removed {id} and {} edges",
                removed.edges.len()
            )),
            Err(error) => Some(error.to_string()),
        };
        self.selected = None;
        if self.pointer_over.as_ref() == Some(id) {
            self.pointer_over = None;
            self.details = None;
        }
    }

    fn draw_attribute_editor(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Edit attribute").strong());
        let Some(id) = self.selected.clone() else {
            ui.label("Select a movie on the canvas to edit it.");
            return;
        };
        let Some(node) = self.view.model().node(id.as_str()) else {
            ui.label("Selected movie no longer exists.");
            return;
        };

        let mut keys = node.attributes.keys().cloned().collect::<Vec<_>>();
        keys.insert(0, "rank".to_owned());
        egui::ComboBox::from_id_salt("attribute_key")
            .selected_text(if self.attribute_key.is_empty() {
                "attribute"
            } else {
                self.attribute_key.as_str()
            })
            .show_ui(ui, |ui| {
                for key in keys {
                    let selected = self.attribute_key == key;
                    if ui.selectable_label(selected, key.as_str()).clicked() {
                        self.attribute_key = key;
                    }
                }
            });

        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.attribute_value);
            if ui.button("Apply").clicked() {
                let value = parse_attribute_value(&self.attribute_value);
                self.status = match self.view.update_attribute(id.as_str(), &self.attribute_key, value)
                {
                    Ok(()) => Some(format!("updated {} on {id}", self.attribute_key)),
                    Err(error) => Some(error.to_string()),
                };
            }
        });
    }

    fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Movie Details");
        ui.add_space(6.0);

        match &self.details {
            None => {
                ui.label("Hover a movie to see its details.");
            }
            Some(details) => {
                egui::Grid::new("movie_details")
                    .num_columns(2)
                    .striped(true)
                    .show(ui, |ui| {
                        for slot in DetailSlot::ALL {
                            ui.label(RichText::new(slot.label()).strong());
                            match (slot, details.get(slot)) {
                                (DetailSlot::Image, Some(link)) => {
                                    ui.hyperlink_to("poster", link);
                                }
                                (_, Some(text)) => {
                                    ui.label(text);
                                }
                                (_, None) => {
                                    ui.label(RichText::new("-").weak());
                                }
                            }
                            ui.end_row();
                        }
                    });
            }
        }

        ui.separator();
        ui.label(RichText::new("Selection").strong());
        let Some(id) = &self.selected else {
            ui.label("Press a movie to select it.");
            return;
        };
        let Some(node) = self.view.model().node(id.as_str()) else {
            ui.label("Selected movie no longer exists.");
            return;
        };

        ui.label(format!("id: {}", node.id));
        ui.label(format!("degree: {}", node.degree));
        let neighbours = self
            .view
            .model()
            .edges()
            .iter()
            .filter(|edge| edge.touches(id.as_str()))
            .map(|edge| {
                if edge.source == *id {
                    edge.target.clone()
                } else {
                    edge.source.clone()
                }
            })
            .collect::<HashSet<_>>();
        if !neighbours.is_empty() {
            let mut neighbours = neighbours.into_iter().collect::<Vec<_>>();
            neighbours.sort();
            ui.label(format!(
                "connected to: {}",
                neighbours
                    .iter()
                    .map(NodeId::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        egui::ScrollArea::vertical()
            .id_salt("selection_attributes")
            .max_height(280.0)
            .show(ui, |ui| {
                for (key, value) in &node.attributes {
                    ui.label(format!("{key}: {value}"));
                }
            });
    }
}
