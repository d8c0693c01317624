mod assemble;
mod index;
mod input;
mod model;
mod resolve;

pub use assemble::{AssembledGraph, assemble};
pub use index::RegulationIndex;
pub use input::{
    GeneProteinRecord, GroupRecord, InertRecord, PathwayDocument, PathwayInput,
    ProteomeMeasurement, PtmMeasurement, SkeletonLink, SkeletonNode,
};
pub use model::{
    BINDING_ASSOCIATION, Details, Endpoint, GeneProtein, Graph, Group, Link, LinkGeometry,
    LinkIdx, LinkKind, Node, NodeGeometry, NodeIdx, NodeKind, NodeShape, PTM_LINK_TYPE,
    PathwayMetadata, Ptm, PtmSummary, Regulation, RegulationCounts,
};
pub use resolve::resolve;

use crate::error::GraphError;

/// Assembles and resolves the full graph in one step.
pub fn build_graph(input: PathwayInput) -> Result<Graph, GraphError> {
    resolve(assemble(input))
}
