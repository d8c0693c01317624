use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use log::warn;

use crate::error::GraphError;

use super::assemble::AssembledGraph;
use super::model::{Endpoint, Graph, LinkIdx, Node, NodeIdx, NodeKind};

/// Turns id-based ownership, membership and link endpoints into arena references.
pub fn resolve(assembled: AssembledGraph) -> Result<Graph, GraphError> {
    let AssembledGraph {
        metadata,
        mut nodes,
        mut links,
    } = assembled;

    let mut node_index = HashMap::with_capacity(nodes.len());
    for (index, node) in nodes.iter().enumerate() {
        if node_index.insert(node.id.clone(), NodeIdx(index)).is_some() {
            return Err(GraphError::DuplicateNodeId(node.id.clone()));
        }
    }

    let mut link_index = HashMap::with_capacity(links.len());
    for (index, link) in links.iter().enumerate() {
        if link_index.insert(link.id.clone(), LinkIdx(index)).is_some() {
            return Err(GraphError::DuplicateLinkId(link.id.clone()));
        }
    }

    resolve_ownership(&mut nodes, &node_index);
    resolve_groups(&mut nodes, &node_index);

    for link in &mut links {
        let source = resolve_endpoint(&link.source_id, &node_index, &link_index);
        let target = resolve_endpoint(&link.target_id, &node_index, &link_index);
        link.source = source;
        link.target = target;
        link.source_is_anchor = matches!(source, Some(Endpoint::Link(_)));
        link.target_is_anchor = matches!(target, Some(Endpoint::Link(_)));
        if source.is_none() || target.is_none() {
            warn!(
                "link `{}` ({} -> {}) has an endpoint matching neither a node nor a link; excluding it",
                link.id, link.source_id, link.target_id
            );
            link.broken = true;
        }
    }

    // Anchors must land on a link whose own endpoints are plain nodes.
    let unresolved = links
        .iter()
        .enumerate()
        .filter(|(_, link)| link.broken || link.has_anchor())
        .map(|(index, _)| LinkIdx(index))
        .collect::<HashSet<_>>();
    for link in &mut links {
        if link.broken {
            continue;
        }
        let chained = [link.source, link.target].into_iter().any(|endpoint| {
            matches!(endpoint, Some(Endpoint::Link(anchor)) if unresolved.contains(&anchor))
        });
        if chained {
            warn!(
                "link `{}` anchors on a link that is itself anchored or broken; excluding it",
                link.id
            );
            link.broken = true;
        }
    }

    let mut outgoing = vec![Vec::new(); nodes.len()];
    let mut incoming = vec![Vec::new(); nodes.len()];
    for (index, link) in links.iter().enumerate() {
        let Some((source, target)) = link.endpoints() else {
            continue;
        };
        if let Endpoint::Node(source) = source {
            outgoing[source.0].push(LinkIdx(index));
        }
        if let Endpoint::Node(target) = target {
            incoming[target.0].push(LinkIdx(index));
        }
    }

    Ok(Graph {
        metadata,
        nodes,
        links,
        node_index,
        link_index,
        outgoing,
        incoming,
    })
}

fn resolve_endpoint(
    id: &str,
    node_index: &HashMap<String, NodeIdx>,
    link_index: &HashMap<String, LinkIdx>,
) -> Option<Endpoint> {
    node_index
        .get(id)
        .map(|&index| Endpoint::Node(index))
        .or_else(|| link_index.get(id).map(|&index| Endpoint::Link(index)))
}

fn resolve_ownership(nodes: &mut [Node], node_index: &HashMap<String, NodeIdx>) {
    let mut members_by_summary: HashMap<NodeIdx, Vec<NodeIdx>> = HashMap::new();

    for (index, node) in nodes.iter_mut().enumerate() {
        match &mut node.kind {
            NodeKind::Ptm(ptm) => {
                ptm.owner = node_index.get(&ptm.owner_id).copied();
                ptm.summary = ptm
                    .summary_id
                    .as_ref()
                    .and_then(|id| node_index.get(id).copied());
                if let Some(summary) = ptm.summary {
                    members_by_summary
                        .entry(summary)
                        .or_default()
                        .push(NodeIdx(index));
                }
            }
            NodeKind::PtmSummary(summary) => {
                summary.owner = node_index.get(&summary.owner_id).copied();
            }
            _ => {}
        }
    }

    for (summary_index, members) in members_by_summary {
        if let NodeKind::PtmSummary(summary) = &mut nodes[summary_index.0].kind {
            summary.members = members;
        }
    }
}

/// Membership is the union of the group's component list and genes naming the group.
///
/// A gene belongs to one group at most: the lowest-indexed group claiming it keeps it.
fn resolve_groups(nodes: &mut [Node], node_index: &HashMap<String, NodeIdx>) {
    let mut members_by_group: BTreeMap<NodeIdx, Vec<NodeIdx>> = BTreeMap::new();

    for (index, node) in nodes.iter().enumerate() {
        match &node.kind {
            NodeKind::Group(group) => {
                let members = members_by_group.entry(NodeIdx(index)).or_default();
                for component_id in &group.component_ids {
                    match node_index.get(component_id) {
                        Some(&member)
                            if matches!(nodes[member.0].kind, NodeKind::GeneProtein(_)) =>
                        {
                            if !members.contains(&member) {
                                members.push(member);
                            }
                        }
                        Some(_) => warn!(
                            "group `{}` lists non gene/protein node `{component_id}`; ignoring it",
                            node.id
                        ),
                        None => warn!(
                            "group `{}` lists unknown node `{component_id}`; ignoring it",
                            node.id
                        ),
                    }
                }
            }
            NodeKind::GeneProtein(gene) => {
                let Some(group_id) = &gene.group_id else {
                    continue;
                };
                match node_index.get(group_id) {
                    Some(&group) if matches!(nodes[group.0].kind, NodeKind::Group(_)) => {
                        let members = members_by_group.entry(group).or_default();
                        if !members.contains(&NodeIdx(index)) {
                            members.push(NodeIdx(index));
                        }
                    }
                    _ => warn!(
                        "node `{}` names unknown group `{group_id}`; ignoring membership",
                        node.id
                    ),
                }
            }
            _ => {}
        }
    }

    let mut claimed: HashMap<NodeIdx, NodeIdx> = HashMap::new();
    for (group_index, mut members) in members_by_group {
        members.sort();
        members.retain(|&member| match claimed.entry(member) {
            Entry::Vacant(slot) => {
                slot.insert(group_index);
                true
            }
            Entry::Occupied(slot) => {
                warn!(
                    "node `{}` already belongs to group `{}`; dropping it from group `{}`",
                    nodes[member.0].id,
                    nodes[slot.get().0].id,
                    nodes[group_index.0].id
                );
                false
            }
        });
        for &member in &members {
            if let NodeKind::GeneProtein(gene) = &mut nodes[member.0].kind {
                gene.group = Some(group_index);
            }
        }

        let component_ids = members
            .iter()
            .map(|member| nodes[member.0].id.clone())
            .collect::<Vec<_>>();
        if let NodeKind::Group(group) = &mut nodes[group_index.0].kind {
            group.component_ids = component_ids;
            group.components = members;
        }
    }
}
