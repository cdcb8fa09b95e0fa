use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde_json::{Map, Value};

use crate::model::{RawEdge, RawNode};

const SAMPLE: &str = include_str!("../data/sample.json");

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    parse_dataset(&raw).with_context(|| format!("failed to parse dataset {}", path.display()))
}

pub fn sample_dataset() -> Result<Dataset> {
    parse_dataset(SAMPLE).context("built-in sample dataset is invalid")
}

/// Parses `{ "nodes": [...], "edges": [...] }`. `links` is accepted for the
/// edge list, and numeric ids are read as their decimal text.
pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("dataset must be a JSON object"))?;

    let nodes = object
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("dataset has no nodes array"))?
        .iter()
        .enumerate()
        .map(|(index, value)| parse_node(value).with_context(|| format!("invalid node #{index}")))
        .collect::<Result<Vec<_>>>()?;

    let edges = match object.get("edges").or_else(|| object.get("links")) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, value)| {
                parse_edge(value).with_context(|| format!("invalid edge #{index}"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => return Err(anyhow!("dataset edges must be an array")),
    };

    debug!("parsed dataset: {} nodes, {} edges", nodes.len(), edges.len());
    Ok(Dataset { nodes, edges })
}

fn parse_node(value: &Value) -> Result<RawNode> {
    let mut fields: Map<String, Value> = value
        .as_object()
        .cloned()
        .ok_or_else(|| anyhow!("node must be an object"))?;

    let id = fields
        .remove("id")
        .as_ref()
        .and_then(id_text)
        .ok_or_else(|| anyhow!("node is missing a string or numeric id"))?;
    let rank = fields.remove("rank");
    let x = fields.remove("x").as_ref().and_then(Value::as_f64).map(|x| x as f32);
    let y = fields.remove("y").as_ref().and_then(Value::as_f64).map(|y| y as f32);

    Ok(RawNode {
        id,
        rank,
        x,
        y,
        attributes: fields,
    })
}

fn parse_edge(value: &Value) -> Result<RawEdge> {
    let endpoint = |key: &str| {
        value
            .get(key)
            .and_then(id_text)
            .ok_or_else(|| anyhow!("edge is missing {key}"))
    };
    Ok(RawEdge::new(endpoint("source")?, endpoint("target")?))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
