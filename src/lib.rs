//! Pathway graph engine: merges a pathway skeleton with PTM and proteome
//! measurements, lays it out with a small force simulation and tracks the
//! selection and expand/collapse state a viewer needs.

pub mod config;
pub mod engine;
pub mod error;
pub mod pathway;
mod util;

pub use config::{EngineConfig, InteractionConfig, LabelMetrics, PhysicsConfig};
pub use engine::{ClickTarget, EngineEvent, PathwayEngine, SelectedLeaf};
pub use error::GraphError;
pub use pathway::{Graph, NodeIdx, PathwayInput};
