use crate::error::GraphError;
use crate::model::{GraphModel, NodeField};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f32, f32),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    /// A collapsed domain maps everything onto the middle of the range.
    pub fn map(&self, value: f64) -> f32 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() <= f64::EPSILON {
            return (r0 + r1) * 0.5;
        }
        let t = ((value - d0) / span) as f32;
        r0 + (r1 - r0) * t
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

pub fn field_values(model: &GraphModel, field: NodeField) -> Result<Vec<f64>, GraphError> {
    if !NodeField::LINEAR.contains(&field) {
        return Err(GraphError::UnsupportedLayoutField(field.label().to_owned()));
    }

    model
        .nodes()
        .iter()
        .map(|node| {
            node.numeric_field(field)
                .ok_or_else(|| GraphError::NonNumericField {
                    field: field.label().to_owned(),
                    id: node.id.to_string(),
                })
        })
        .collect()
}

pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values.iter().fold(None, |acc, &value| match acc {
        None => Some((value, value)),
        Some((min, max)) => Some((min.min(value), max.max(value))),
    })
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use crate::model::RawNode;

    use super::*;

    #[test]
    fn scale_maps_domain_onto_range() {
        let scale = LinearScale::new((1.0, 11.0), (20.0, 120.0));
        assert_eq!(scale.map(1.0), 20.0);
        assert_eq!(scale.map(6.0), 70.0);
        assert_eq!(scale.map(11.0), 120.0);
    }

    #[test]
    fn collapsed_domain_uses_range_midpoint() {
        let scale = LinearScale::new((5.0, 5.0), (20.0, 120.0));
        assert_eq!(scale.map(5.0), 70.0);
    }

    #[test]
    fn non_numeric_year_is_rejected() {
        let mut model = GraphModel::new();
        model.load(
            &[
                RawNode::new("a", 1).with_attribute("year", 1999),
                RawNode::new("b", 2).with_attribute("year", "unknown"),
            ],
            &[],
            Vec2::ZERO,
        );

        assert_eq!(
            field_values(&model, NodeField::Year),
            Err(GraphError::NonNumericField {
                field: "year".to_owned(),
                id: "b".to_owned(),
            })
        );
        assert_eq!(
            field_values(&model, NodeField::Genre),
            Err(GraphError::UnsupportedLayoutField("genre".to_owned()))
        );
    }

    #[test]
    fn extent_of_empty_values_is_none() {
        assert_eq!(extent(&[]), None);
        assert_eq!(extent(&[3.0, -1.0, 8.0]), Some((-1.0, 8.0)));
    }
}
