use std::collections::HashSet;

use crate::model::{GraphModel, Node, NodeField, NodeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelField {
    Name,
    Genre,
    Director,
    Id,
}

impl LabelField {
    pub const ALL: [LabelField; 4] = [Self::Name, Self::Genre, Self::Director, Self::Id];

    pub fn from_selector(selector: &str) -> Option<Self> {
        match selector {
            "movieName" | "name" => Some(Self::Name),
            "genre" => Some(Self::Genre),
            "director" | "director_name" => Some(Self::Director),
            "movieID" | "id" => Some(Self::Id),
            _ => None,
        }
    }

    pub fn selector(self) -> &'static str {
        match self {
            Self::Name => "movieName",
            Self::Genre => "genre",
            Self::Director => "director",
            Self::Id => "movieID",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Name => "Movie name",
            Self::Genre => "Genre",
            Self::Director => "Director",
            Self::Id => "Movie ID",
        }
    }

    fn node_field(self) -> NodeField {
        match self {
            Self::Name => NodeField::Name,
            Self::Genre => NodeField::Genre,
            Self::Director => NodeField::Director,
            Self::Id => NodeField::Id,
        }
    }
}

pub fn label_text(node: &Node, index: usize, selector: &str) -> String {
    LabelField::from_selector(selector)
        .and_then(|field| node.field_text(field.node_field(), index))
        .unwrap_or_default()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    Default,
    Focused,
    Unfocused,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Highlight {
    focused: Option<HashSet<NodeId>>,
}

impl Highlight {
    pub fn set(&mut self, ids: impl IntoIterator<Item = NodeId>) {
        self.focused = Some(ids.into_iter().collect());
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }

    pub fn is_active(&self) -> bool {
        self.focused.is_some()
    }

    pub fn node(&self, id: &NodeId) -> Emphasis {
        match &self.focused {
            None => Emphasis::Default,
            Some(focused) if focused.contains(id) => Emphasis::Focused,
            Some(_) => Emphasis::Unfocused,
        }
    }

    pub fn edge(&self, source: &NodeId, target: &NodeId) -> Emphasis {
        match &self.focused {
            None => Emphasis::Default,
            Some(focused) if focused.contains(source) || focused.contains(target) => {
                Emphasis::Default
            }
            Some(_) => Emphasis::Unfocused,
        }
    }

    pub fn forget(&mut self, id: &str) {
        if let Some(focused) = &mut self.focused {
            focused.remove(id);
        }
    }
}

pub fn query(model: &GraphModel, token: &str) -> Vec<NodeId> {
    model
        .nodes()
        .iter()
        .enumerate()
        .filter(|(index, node)| {
            NodeField::SEARCHABLE.iter().any(|&field| match field {
                // Writer matches either spelling of its attribute.
                NodeField::Writer => field.attribute_keys().iter().any(|key| {
                    node.attributes
                        .get(*key)
                        .and_then(crate::model::value_text)
                        .is_some_and(|text| text == token)
                }),
                _ => node
                    .field_text(field, *index)
                    .is_some_and(|text| text == token),
            })
        })
        .map(|(_, node)| node.id.clone())
        .collect()
}

pub fn show_all(model: &mut GraphModel) {
    for node in model.nodes_mut() {
        node.show_text = true;
    }
}

pub fn hide_all(model: &mut GraphModel) {
    for node in model.nodes_mut() {
        node.show_text = false;
    }
}

pub fn set_labeled(model: &mut GraphModel, ids: &HashSet<NodeId>) {
    for node in model.nodes_mut() {
        node.show_text = ids.contains(&node.id);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use crate::model::RawNode;

    use super::*;

    fn catalogue() -> GraphModel {
        let mut model = GraphModel::new();
        model.load(
            &[
                RawNode::new("tt01", 1)
                    .with_attribute("name", "Heat")
                    .with_attribute("genre", "Crime")
                    .with_attribute("director_name", "Michael Mann"),
                RawNode::new("tt02", "2")
                    .with_attribute("name", "Alien")
                    .with_attribute("genre", "Horror")
                    .with_attribute("writter_name", "Dan O'Bannon"),
                RawNode::new("tt03", 3)
                    .with_attribute("name", "Thief")
                    .with_attribute("genre", "Crime"),
            ],
            &[],
            Vec2::ZERO,
        );
        model
    }

    #[test]
    fn query_matches_fields_exactly() {
        let model = catalogue();

        assert_eq!(query(&model, "Crime"), vec![NodeId::from("tt01"), NodeId::from("tt03")]);
        // Rank of the second node and container index of the third.
        assert_eq!(query(&model, "2"), vec![NodeId::from("tt02"), NodeId::from("tt03")]);
        assert_eq!(query(&model, "Dan O'Bannon"), vec![NodeId::from("tt02")]);
        assert_eq!(query(&model, "0"), vec![NodeId::from("tt01")]);
        assert!(query(&model, "crime").is_empty());
        assert!(query(&model, "Inception").is_empty());
    }

    #[test]
    fn label_selector_resolves_known_fields_only() {
        let model = catalogue();
        let node = &model.nodes()[0];

        assert_eq!(label_text(node, 0, "movieName"), "Heat");
        assert_eq!(label_text(node, 0, "director"), "Michael Mann");
        assert_eq!(label_text(node, 0, "movieID"), "tt01");
        assert_eq!(label_text(node, 0, "budget"), "");
        assert_eq!(label_text(&model.nodes()[2], 2, "director"), "");
    }

    #[test]
    fn highlight_dims_edges_away_from_matches() {
        let mut highlight = Highlight::default();
        let (a, b, c) = (NodeId::from("a"), NodeId::from("b"), NodeId::from("c"));
        assert_eq!(highlight.node(&a), Emphasis::Default);

        highlight.set([a.clone()]);
        assert_eq!(highlight.node(&a), Emphasis::Focused);
        assert_eq!(highlight.node(&b), Emphasis::Unfocused);
        assert_eq!(highlight.edge(&a, &b), Emphasis::Default);
        assert_eq!(highlight.edge(&b, &c), Emphasis::Unfocused);

        highlight.clear();
        assert_eq!(highlight.edge(&b, &c), Emphasis::Default);
    }

    #[test]
    fn labeled_set_replaces_previous_labels() {
        let mut model = catalogue();
        show_all(&mut model);
        set_labeled(&mut model, &HashSet::from([NodeId::from("tt02")]));

        let shown = model
            .nodes()
            .iter()
            .filter(|node| node.show_text)
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(shown, vec!["tt02"]);

        hide_all(&mut model);
        assert!(model.nodes().iter().all(|node| !node.show_text));
    }
}
