use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use pathwaygraph::NodeIdx;

use super::super::ViewModel;

const SEARCH_RESULT_LIMIT: usize = 30;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let metadata = self.engine.metadata().clone();
        ui.heading(if metadata.title.is_empty() {
            "Untitled pathway"
        } else {
            metadata.title.as_str()
        });
        if !metadata.identifier.is_empty() {
            ui.small(format!("{}  ({})", metadata.identifier, metadata.organism));
        }
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            if ui.button("Expand all PTMs").clicked() {
                self.engine.expand_all();
            }
            if ui.button("Collapse all PTMs").clicked() {
                self.engine.collapse_all();
            }
        });
        if ui.button("Clear selection").clicked() {
            self.engine.clear_selection();
            self.absorb_engine_events();
        }

        ui.separator();
        ui.label(RichText::new("Details").strong());
        match &self.details {
            Some(text) => {
                egui::ScrollArea::vertical()
                    .id_salt("details_scroll")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        ui.label(text.as_str());
                    });
            }
            None => {
                ui.label("Click a gene or PTM to see its measurements.");
            }
        }

        ui.separator();
        ui.label(
            RichText::new(format!(
                "Selected measurements: {}",
                self.engine.selected_leaf_count()
            ))
            .strong(),
        );
        egui::ScrollArea::vertical()
            .id_salt("selected_leaves_scroll")
            .max_height(160.0)
            .auto_shrink([false, true])
            .show_rows(ui, 18.0, self.selected_leaves.len(), |ui, row_range| {
                for leaf in &self.selected_leaves[row_range] {
                    ui.small(format!("{}  ({} fields)", leaf.node_id, leaf.details.len()));
                }
            });

        ui.separator();
        ui.label(RichText::new("Search").strong());
        ui.text_edit_singleline(&mut self.search);
        let query = self.search.trim().to_owned();
        if query.is_empty() {
            return;
        }

        let matches = self.search_matches(&query);
        if matches.is_empty() {
            ui.label("No node label matches.");
            return;
        }

        let mut downstream_of = None;
        let mut focus = None;
        egui::ScrollArea::vertical()
            .id_salt("search_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for &index in &matches {
                    let node = self.engine.graph().node(index);
                    ui.horizontal(|ui| {
                        if ui
                            .link(node.kind.label())
                            .on_hover_text(node.id.as_str())
                            .clicked()
                        {
                            focus = Some(index);
                        }
                        if ui.small_button("select downstream").clicked() {
                            downstream_of = Some(node.id.clone());
                        }
                    });
                }
            });

        if let Some(index) = focus {
            self.focus_node(index);
        }
        if let Some(id) = downstream_of {
            self.engine.select_downstream(&id);
            self.absorb_engine_events();
        }
    }

    fn search_matches(&self, query: &str) -> Vec<NodeIdx> {
        let graph = self.engine.graph();
        let matcher = SkimMatcherV2::default();
        let mut scored = graph
            .node_indices()
            .filter_map(|index| {
                let kind = &graph.node(index).kind;
                let label = kind.label();
                if kind.is_ptm_like() || label.is_empty() {
                    return None;
                }
                fuzzy_match_score(&matcher, label, query).map(|score| (score, index))
            })
            .collect::<Vec<_>>();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored
            .into_iter()
            .take(SEARCH_RESULT_LIMIT)
            .map(|(_, index)| index)
            .collect()
    }
}
