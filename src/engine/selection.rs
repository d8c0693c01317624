use std::collections::HashMap;

use log::debug;

use crate::pathway::{Endpoint, Graph, LinkIdx, NodeIdx, NodeKind};

/// Effective selection: PTM-like nodes without their own state follow their owner.
pub fn is_selected(graph: &Graph, index: NodeIdx) -> bool {
    let node = graph.node(index);
    match node.selected {
        Some(selected) => selected,
        None => node
            .kind
            .owner()
            .and_then(|owner| graph.node(owner).selected)
            .unwrap_or(true),
    }
}

pub fn node_dimmed(graph: &Graph, index: NodeIdx) -> bool {
    !is_selected(graph, index)
}

/// Both resolved endpoints selected; an anchor counts only when both ends of the anchored link are.
pub fn link_highlighted(graph: &Graph, link: LinkIdx) -> bool {
    graph
        .link(link)
        .endpoints()
        .is_some_and(|(source, target)| {
            endpoint_selected(graph, source) && endpoint_selected(graph, target)
        })
}

fn endpoint_selected(graph: &Graph, endpoint: Endpoint) -> bool {
    match endpoint {
        Endpoint::Node(index) => is_selected(graph, index),
        Endpoint::Link(anchor) => graph.link(anchor).endpoints().is_some_and(|(source, target)| {
            [source, target]
                .into_iter()
                .all(|end| end.node().is_some_and(|index| is_selected(graph, index)))
        }),
    }
}

/// Freezes inherited state so later bulk updates do not flip it implicitly.
pub(crate) fn settle_inherited(graph: &mut Graph) {
    for index in 0..graph.nodes.len() {
        if graph.nodes[index].selected.is_none() {
            let inherited = is_selected(graph, NodeIdx(index));
            graph.nodes[index].selected = Some(inherited);
        }
    }
}

fn set_all(graph: &mut Graph, selected: bool) {
    for node in &mut graph.nodes {
        node.selected = Some(selected);
    }
}

/// Applies a confirmed single click on a node; returns the node's new state.
pub fn apply_node_click(graph: &mut Graph, target: NodeIdx, modifier: bool) -> bool {
    settle_inherited(graph);
    let was_selected = is_selected(graph, target);
    if !modifier {
        set_all(graph, false);
    }

    let selected = !(modifier && was_selected);
    graph.set_selected(target, selected);

    let tethered = graph
        .incoming_links(target)
        .iter()
        .filter(|&&link| graph.link(link).is_tether())
        .filter_map(|&link| graph.link(link).source.and_then(Endpoint::node))
        .collect::<Vec<_>>();
    for ptm in tethered {
        graph.set_selected(ptm, selected);
    }

    // Selecting a PTM drags its owner in; deselecting never pushes back up.
    if selected && let Some(owner) = graph.node(target).kind.owner() {
        graph.set_selected(owner, true);
    }

    let members = match &graph.node(target).kind {
        NodeKind::PtmSummary(cluster) => cluster.members.clone(),
        NodeKind::Group(group) => group.components.clone(),
        _ => Vec::new(),
    };
    for member in members {
        graph.set_selected(member, selected);
    }

    selected
}

/// Empty-canvas click: everything back to selected.
pub fn clear_selection(graph: &mut Graph) {
    set_all(graph, true);
}

/// Resolves a link endpoint to the node a traversal should continue on.
fn traversal_node(graph: &Graph, endpoint: Endpoint, forward: bool) -> Option<NodeIdx> {
    match endpoint {
        Endpoint::Node(index) => Some(index),
        Endpoint::Link(anchor) => graph.link(anchor).endpoints().and_then(|(source, target)| {
            if forward {
                target.node()
            } else {
                source.node()
            }
        }),
    }
}

/// Selects `start` and everything reachable downstream of it, deselecting the rest.
///
/// Following a link forward also follows the links anchored on it.
pub fn select_downstream(graph: &mut Graph, start: NodeIdx) -> usize {
    set_all(graph, false);

    let mut anchored_on: HashMap<LinkIdx, Vec<LinkIdx>> = HashMap::new();
    for (index, link) in graph.links.iter().enumerate() {
        if let Some((Endpoint::Link(anchor), _)) = link.endpoints()
            && !link.is_tether()
        {
            anchored_on.entry(anchor).or_default().push(LinkIdx(index));
        }
    }

    let mut reached = 0;
    let mut stack = vec![start];
    while let Some(index) = stack.pop() {
        if graph.node(index).selected == Some(true) {
            continue;
        }
        graph.set_selected(index, true);
        reached += 1;

        for &link in graph.incoming_links(index) {
            let link = graph.link(link);
            let Some((source, _)) = link.endpoints() else {
                continue;
            };
            if link.is_tether() || link.is_undirected() {
                stack.extend(traversal_node(graph, source, false));
            }
        }

        let mut forward = graph
            .outgoing_links(index)
            .iter()
            .copied()
            .filter(|&link| !graph.link(link).is_tether())
            .collect::<Vec<_>>();
        while let Some(link) = forward.pop() {
            if let Some((_, target)) = graph.link(link).endpoints() {
                stack.extend(traversal_node(graph, target, true));
            }
            if let Some(hanging) = anchored_on.remove(&link) {
                forward.extend(hanging);
            }
        }

        if let NodeKind::Group(group) = &graph.node(index).kind {
            stack.extend(group.components.iter().copied());
        }
    }

    debug!(
        "downstream of `{}` selected {reached} nodes",
        graph.node(start).id
    );
    reached
}
