use std::fmt::Write as _;

use crate::pathway::{Details, Graph, Node, NodeIdx, NodeKind};
use crate::util::format_detail_value;

use super::selection::is_selected;

/// Selected PTM leaf or measured gene/protein, as reported to listeners.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedLeaf {
    pub node_id: String,
    pub details: Details,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    SelectionChanged(Vec<SelectedLeaf>),
    /// Formatted description of the clicked entity, `None` to clear.
    Details(Option<String>),
}

/// Leaves are PTM nodes and gene/protein nodes that carry measurement details.
pub(crate) fn is_leaf(node: &Node) -> bool {
    match &node.kind {
        NodeKind::Ptm(_) => true,
        NodeKind::GeneProtein(gene) => gene.details.is_some(),
        _ => false,
    }
}

pub(crate) fn selected_leaves(graph: &Graph) -> Vec<SelectedLeaf> {
    graph
        .node_indices()
        .filter(|&index| is_leaf(graph.node(index)) && is_selected(graph, index))
        .filter_map(|index| {
            let node = graph.node(index);
            node.details().map(|details| SelectedLeaf {
                node_id: node.id.clone(),
                details: details.clone(),
            })
        })
        .collect()
}

pub(crate) fn selected_leaf_count(graph: &Graph) -> usize {
    graph
        .node_indices()
        .filter(|&index| is_leaf(graph.node(index)) && is_selected(graph, index))
        .count()
}

fn push_details(text: &mut String, details: &Details) {
    for (key, value) in details {
        let _ = write!(text, "\n{key}: {}", format_detail_value(value));
    }
}

/// Human readable text for the details panel; only PTM and gene/protein nodes have one.
pub fn describe(graph: &Graph, index: NodeIdx) -> Option<String> {
    let node = graph.node(index);
    match &node.kind {
        NodeKind::Ptm(ptm) => {
            let owner = ptm
                .owner
                .map_or(ptm.owner_id.as_str(), |owner| graph.node(owner).kind.label());
            let mut text = format!("PTM on {owner} ({})", ptm.regulation.tag());
            if !ptm.gene_names.is_empty() {
                let _ = write!(text, "\nGenes: {}", ptm.gene_names.join(", "));
            }
            if !ptm.accessions.is_empty() {
                let _ = write!(text, "\nAccessions: {}", ptm.accessions.join(", "));
            }
            push_details(&mut text, &ptm.details);
            Some(text)
        }
        NodeKind::GeneProtein(gene) => {
            let mut text = if gene.label.is_empty() {
                node.id.clone()
            } else {
                gene.label.clone()
            };
            if !gene.gene_names.is_empty() {
                let _ = write!(text, "\nGenes: {}", gene.gene_names.join(", "));
            }
            if !gene.accessions.is_empty() {
                let _ = write!(text, "\nAccessions: {}", gene.accessions.join(", "));
            }
            if let Some(counts) = gene.counts {
                let _ = write!(
                    text,
                    "\nProteome: {} up, {} down, {} not regulated",
                    counts.up, counts.down, counts.not
                );
            }
            if let Some(details) = &gene.details {
                push_details(&mut text, details);
            }
            Some(text)
        }
        _ => None,
    }
}
