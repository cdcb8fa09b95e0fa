//! Layout and interaction engine for an editable movie graph.
//!
//! [`view::GraphView`] is the entry point: it owns the [`model::GraphModel`],
//! the [`layout::LayoutEngine`] and the render [`render::Scene`], and turns
//! pointer events into structural edits.

pub mod config;
pub mod data;
pub mod error;
pub mod layout;
pub mod model;
pub mod render;
pub mod util;
pub mod view;

pub use config::ViewConfig;
pub use error::GraphError;
pub use model::{GraphModel, NodeId, RawEdge, RawNode};
pub use view::{GraphView, Notice, PointerEvent};
