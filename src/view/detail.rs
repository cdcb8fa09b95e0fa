use crate::model::{Node, NodeField};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetailSlot {
    Image,
    Name,
    Id,
    Rank,
    Year,
    Rating,
    Duration,
    Genre,
    Director,
}

impl DetailSlot {
    pub const ALL: [DetailSlot; 9] = [
        Self::Image,
        Self::Name,
        Self::Id,
        Self::Rank,
        Self::Year,
        Self::Rating,
        Self::Duration,
        Self::Genre,
        Self::Director,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Name => "Name",
            Self::Id => "ID",
            Self::Rank => "Rank",
            Self::Year => "Year",
            Self::Rating => "Rating",
            Self::Duration => "Duration",
            Self::Genre => "Genre",
            Self::Director => "Director",
        }
    }

    fn field(self) -> NodeField {
        match self {
            Self::Image => NodeField::Image,
            Self::Name => NodeField::Name,
            Self::Id => NodeField::Id,
            Self::Rank => NodeField::Rank,
            Self::Year => NodeField::Year,
            Self::Rating => NodeField::Rating,
            Self::Duration => NodeField::Duration,
            Self::Genre => NodeField::Genre,
            Self::Director => NodeField::Director,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeDetails {
    slots: Vec<(DetailSlot, String)>,
}

impl NodeDetails {
    pub fn from_node(node: &Node, index: usize) -> Self {
        let slots = DetailSlot::ALL
            .iter()
            .filter_map(|&slot| {
                node.field_text(slot.field(), index)
                    .map(|text| (slot, text))
            })
            .collect();
        Self { slots }
    }

    pub fn get(&self, slot: DetailSlot) -> Option<&str> {
        self.slots
            .iter()
            .find(|(candidate, _)| *candidate == slot)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (DetailSlot, &str)> {
        self.slots.iter().map(|(slot, text)| (*slot, text.as_str()))
    }
}

pub trait DetailSink {
    fn publish(&mut self, details: NodeDetails);
    fn clear(&mut self);
}

impl DetailSink for Option<NodeDetails> {
    fn publish(&mut self, details: NodeDetails) {
        *self = Some(details);
    }

    fn clear(&mut self) {
        *self = None;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;
    use serde_json::json;

    use super::*;

    #[test]
    fn slots_read_their_source_attributes() {
        let mut node = Node::new("tt0111161", Vec2::ZERO);
        node.rank = Some(1.0);
        for (key, value) in [
            ("name", json!("The Shawshank Redemption")),
            ("year", json!(1994)),
            ("imdb_rating", json!(9.3)),
            ("director_name", json!("Frank Darabont")),
            ("small_img_link", json!("https://example.org/poster.jpg")),
        ] {
            node.attributes.insert(key.to_owned(), value);
        }

        let details = NodeDetails::from_node(&node, 0);

        assert_eq!(details.get(DetailSlot::Id), Some("tt0111161"));
        assert_eq!(details.get(DetailSlot::Rank), Some("1"));
        assert_eq!(details.get(DetailSlot::Rating), Some("9.3"));
        assert_eq!(details.get(DetailSlot::Director), Some("Frank Darabont"));
        assert_eq!(
            details.get(DetailSlot::Image),
            Some("https://example.org/poster.jpg")
        );
        assert_eq!(details.get(DetailSlot::Genre), None);
    }

    #[test]
    fn option_sink_holds_the_latest_publish() {
        let mut sink: Option<NodeDetails> = None;
        sink.publish(NodeDetails::from_node(&Node::new("a", Vec2::ZERO), 0));
        assert_eq!(sink.as_ref().and_then(|d| d.get(DetailSlot::Id)), Some("a"));

        sink.clear();
        assert!(sink.is_none());
    }
}
