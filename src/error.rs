use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node not found with id {0}")]
    UnknownNode(String),
    #[error("attribute {key} not found on node {id}")]
    UnknownAttribute { id: String, key: String },
    #[error("attribute {0} cannot be changed after load")]
    ImmutableAttribute(String),
    #[error("rank of node {id} is not numeric: {value}")]
    InvalidRank { id: String, value: String },
    #[error("no edge from {source_id} to {target_id}")]
    UnknownEdge { source_id: String, target_id: String },
    #[error("node id {0} is already in use")]
    DuplicateNodeId(String),
    #[error("self loops not allowed (node {0})")]
    SelfLoop(String),
    #[error("edge already exists between {source_id} and {target_id}")]
    DuplicateEdge { source_id: String, target_id: String },
    #[error("edge {source_id} -> {target_id} references a missing node")]
    UnresolvedEdge { source_id: String, target_id: String },
    #[error("field {field} of node {id} is not numeric")]
    NonNumericField { field: String, id: String },
    #[error("field {0} cannot drive a linear layout")]
    UnsupportedLayoutField(String),
}
