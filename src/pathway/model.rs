use std::collections::HashMap;

use eframe::egui::{Rect, Vec2};
use serde::Deserialize;

/// Free-form measurement annotations carried through to notifications.
pub type Details = serde_json::Map<String, serde_json::Value>;

pub const BINDING_ASSOCIATION: &str = "binding/association";
pub const PTM_LINK_TYPE: &str = "ptmlink";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkIdx(pub usize);

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathwayMetadata {
    pub identifier: String,
    pub organism: String,
    pub title: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Regulation {
    Up,
    Down,
    Unregulated,
}

impl Regulation {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "-" | "not" | "unregulated" => Some(Self::Unregulated),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Unregulated => "-",
        }
    }

    pub(crate) fn id_fragment(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Unregulated => "not",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegulationCounts {
    pub up: u32,
    pub down: u32,
    pub not: u32,
}

impl RegulationCounts {
    pub fn record(&mut self, regulation: Regulation) {
        match regulation {
            Regulation::Up => self.up += 1,
            Regulation::Down => self.down += 1,
            Regulation::Unregulated => self.not += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.up + self.down + self.not
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
    Circle,
    Rectangle,
    Polygon,
}

#[derive(Clone, Copy, Debug)]
pub struct NodeGeometry {
    pub shape: NodeShape,
    pub left_x: f32,
    pub right_x: f32,
    pub label_width: f32,
}

impl NodeGeometry {
    pub fn half_width(&self) -> f32 {
        (self.right_x - self.left_x) * 0.5
    }
}

#[derive(Clone, Debug)]
pub struct GeneProtein {
    pub label: String,
    pub gene_names: Vec<String>,
    pub accessions: Vec<String>,
    pub group_id: Option<String>,
    pub group: Option<NodeIdx>,
    pub details: Option<Details>,
    /// `None` until at least one full-proteome entry matched this node.
    pub counts: Option<RegulationCounts>,
}

#[derive(Clone, Debug, Default)]
pub struct Group {
    pub label: Option<String>,
    pub component_ids: Vec<String>,
    pub components: Vec<NodeIdx>,
    pub hull: Vec<Vec2>,
    pub centroid: Option<Vec2>,
    pub bounds: Option<Rect>,
}

#[derive(Clone, Debug)]
pub struct Ptm {
    pub owner_id: String,
    pub owner: Option<NodeIdx>,
    pub regulation: Regulation,
    pub gene_names: Vec<String>,
    pub accessions: Vec<String>,
    pub details: Details,
    pub summary_id: Option<String>,
    pub summary: Option<NodeIdx>,
}

#[derive(Clone, Debug)]
pub struct PtmSummary {
    pub owner_id: String,
    pub owner: Option<NodeIdx>,
    pub regulation: Regulation,
    pub count_label: String,
    pub member_ids: Vec<String>,
    pub members: Vec<NodeIdx>,
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    GeneProtein(GeneProtein),
    Group(Group),
    Compound { label: String },
    PathwayRef { label: String },
    Misc { label: String },
    Ptm(Ptm),
    PtmSummary(PtmSummary),
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::GeneProtein(_) => "gene_protein",
            Self::Group(_) => "group",
            Self::Compound { .. } => "compound",
            Self::PathwayRef { .. } => "pathway",
            Self::Misc { .. } => "misc",
            Self::Ptm(_) => "ptm",
            Self::PtmSummary(_) => "ptm_summary",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::GeneProtein(gene) => &gene.label,
            Self::Group(group) => group.label.as_deref().unwrap_or(""),
            Self::Compound { label } | Self::PathwayRef { label } | Self::Misc { label } => label,
            Self::Ptm(_) => "",
            Self::PtmSummary(summary) => &summary.count_label,
        }
    }

    pub fn shape(&self) -> NodeShape {
        match self {
            Self::Group(_) => NodeShape::Polygon,
            Self::Compound { .. } | Self::Ptm(_) | Self::PtmSummary(_) => NodeShape::Circle,
            Self::GeneProtein(gene) if gene.label.is_empty() => NodeShape::Circle,
            Self::GeneProtein(_) | Self::PathwayRef { .. } | Self::Misc { .. } => {
                NodeShape::Rectangle
            }
        }
    }

    /// PTM leaves and summary badges; both hang off an owner via a tether link.
    pub fn is_ptm_like(&self) -> bool {
        matches!(self, Self::Ptm(_) | Self::PtmSummary(_))
    }

    pub fn owner(&self) -> Option<NodeIdx> {
        match self {
            Self::Ptm(ptm) => ptm.owner,
            Self::PtmSummary(summary) => summary.owner,
            _ => None,
        }
    }

    pub fn regulation(&self) -> Option<Regulation> {
        match self {
            Self::Ptm(ptm) => Some(ptm.regulation),
            Self::PtmSummary(summary) => Some(summary.regulation),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub fixed: Option<Vec2>,
    pub visible: bool,
    /// `None` only for PTM-like nodes that have not yet inherited their owner's state.
    pub selected: Option<bool>,
    pub geometry: NodeGeometry,
}

impl Node {
    pub fn new(id: String, kind: NodeKind, pos: Vec2) -> Self {
        let selected = if kind.is_ptm_like() { None } else { Some(true) };
        let visible = !matches!(kind, NodeKind::Ptm(_));
        let shape = kind.shape();

        Self {
            id,
            kind,
            pos,
            velocity: Vec2::ZERO,
            fixed: None,
            visible,
            selected,
            geometry: NodeGeometry {
                shape,
                left_x: pos.x,
                right_x: pos.x,
                label_width: 0.0,
            },
        }
    }

    pub fn details(&self) -> Option<&Details> {
        match &self.kind {
            NodeKind::GeneProtein(gene) => gene.details.as_ref(),
            NodeKind::Ptm(ptm) => Some(&ptm.details),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    Relation,
    PtmTether,
    SummaryTether,
}

/// A resolved link endpoint: a node, or another link acting as an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Node(NodeIdx),
    Link(LinkIdx),
}

impl Endpoint {
    pub fn node(self) -> Option<NodeIdx> {
        match self {
            Self::Node(index) => Some(index),
            Self::Link(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LinkGeometry {
    pub source: Vec2,
    pub target: Vec2,
    pub rim_source: Vec2,
    pub rim_target: Vec2,
}

impl LinkGeometry {
    pub fn midpoint(&self) -> Vec2 {
        (self.source + self.target) * 0.5
    }
}

#[derive(Clone, Debug)]
pub struct Link {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub types: Vec<String>,
    pub kind: LinkKind,
    pub source: Option<Endpoint>,
    pub target: Option<Endpoint>,
    pub source_is_anchor: bool,
    pub target_is_anchor: bool,
    /// Set when an endpoint could not be resolved; broken links are inert.
    pub broken: bool,
    pub geometry: LinkGeometry,
}

impl Link {
    pub fn new(
        id: String,
        source_id: String,
        target_id: String,
        types: Vec<String>,
        kind: LinkKind,
    ) -> Self {
        Self {
            id,
            source_id,
            target_id,
            types,
            kind,
            source: None,
            target: None,
            source_is_anchor: false,
            target_is_anchor: false,
            broken: false,
            geometry: LinkGeometry::default(),
        }
    }

    pub fn is_tether(&self) -> bool {
        matches!(self.kind, LinkKind::PtmTether | LinkKind::SummaryTether)
    }

    pub fn is_undirected(&self) -> bool {
        self.types.iter().any(|kind| kind == BINDING_ASSOCIATION)
    }

    pub fn has_anchor(&self) -> bool {
        self.source_is_anchor || self.target_is_anchor
    }

    pub fn endpoints(&self) -> Option<(Endpoint, Endpoint)> {
        if self.broken {
            return None;
        }
        self.source.zip(self.target)
    }
}

/// Arena holding every entity of the merged graph; cross references are indices into it.
#[derive(Clone, Debug)]
pub struct Graph {
    pub metadata: PathwayMetadata,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub(crate) node_index: HashMap<String, NodeIdx>,
    pub(crate) link_index: HashMap<String, LinkIdx>,
    pub(crate) outgoing: Vec<Vec<LinkIdx>>,
    pub(crate) incoming: Vec<Vec<LinkIdx>>,
}

impl Graph {
    pub fn node(&self, index: NodeIdx) -> &Node {
        &self.nodes[index.0]
    }

    pub fn node_mut(&mut self, index: NodeIdx) -> &mut Node {
        &mut self.nodes[index.0]
    }

    pub fn link(&self, index: LinkIdx) -> &Link {
        &self.links[index.0]
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeIdx> {
        self.node_index.get(id).copied()
    }

    pub fn link_by_id(&self, id: &str) -> Option<LinkIdx> {
        self.link_index.get(id).copied()
    }

    pub fn endpoint_id(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Node(index) => &self.node(index).id,
            Endpoint::Link(index) => &self.link(index).id,
        }
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (0..self.nodes.len()).map(NodeIdx)
    }

    /// Links whose resolved source is the given node.
    pub fn outgoing_links(&self, index: NodeIdx) -> &[LinkIdx] {
        &self.outgoing[index.0]
    }

    /// Links whose resolved target is the given node.
    pub fn incoming_links(&self, index: NodeIdx) -> &[LinkIdx] {
        &self.incoming[index.0]
    }

    pub fn summaries(&self) -> impl Iterator<Item = (NodeIdx, &PtmSummary)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| match &node.kind {
                NodeKind::PtmSummary(summary) => Some((NodeIdx(index), summary)),
                _ => None,
            })
    }

    pub fn set_selected(&mut self, index: NodeIdx, selected: bool) {
        self.nodes[index.0].selected = Some(selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regulation_tags_parse_case_insensitively() {
        assert_eq!(Regulation::parse("UP"), Some(Regulation::Up));
        assert_eq!(Regulation::parse(" down "), Some(Regulation::Down));
        assert_eq!(Regulation::parse("-"), Some(Regulation::Unregulated));
        assert_eq!(Regulation::parse("sideways"), None);
    }

    #[test]
    fn ptm_nodes_start_hidden_without_selection_state() {
        let ptm = Node::new(
            "ptm-a-0".to_owned(),
            NodeKind::Ptm(Ptm {
                owner_id: "a".to_owned(),
                owner: None,
                regulation: Regulation::Up,
                gene_names: Vec::new(),
                accessions: Vec::new(),
                details: Details::new(),
                summary_id: None,
                summary: None,
            }),
            Vec2::ZERO,
        );
        assert!(!ptm.visible);
        assert_eq!(ptm.selected, None);
        assert_eq!(ptm.geometry.shape, NodeShape::Circle);
    }

    #[test]
    fn unlabeled_gene_renders_as_circle() {
        let kind = NodeKind::GeneProtein(GeneProtein {
            label: String::new(),
            gene_names: Vec::new(),
            accessions: Vec::new(),
            group_id: None,
            group: None,
            details: None,
            counts: None,
        });
        assert_eq!(kind.shape(), NodeShape::Circle);
    }
}
