use eframe::egui::Vec2;
use log::debug;

use crate::pathway::{Graph, NodeIdx, NodeKind};
use crate::util::stable_pair;

/// Shows every member of a summarized cluster in place of its badge.
///
/// Members appear around the badge position with a small stable spread so the
/// collision force can fan them out. Returns `false` when `summary` is not a
/// summary node or the cluster is already expanded.
pub fn expand_summary(graph: &mut Graph, summary: NodeIdx) -> bool {
    let node = graph.node(summary);
    let NodeKind::PtmSummary(cluster) = &node.kind else {
        debug!("expand ignored: `{}` is not a summary node", node.id);
        return false;
    };
    if !node.visible {
        return false;
    }

    let origin = node.pos;
    let members = cluster.members.clone();
    for member in members {
        let node = graph.node_mut(member);
        let (jx, jy) = stable_pair(&node.id);
        node.pos = origin + Vec2::new(jx, jy);
        node.velocity = Vec2::ZERO;
        node.visible = true;
    }
    graph.node_mut(summary).visible = false;
    true
}

/// Folds the cluster containing `ptm` back into its summary badge.
pub fn collapse_cluster(graph: &mut Graph, ptm: NodeIdx) -> bool {
    let node = graph.node(ptm);
    let NodeKind::Ptm(leaf) = &node.kind else {
        debug!("collapse ignored: `{}` is not a PTM node", node.id);
        return false;
    };
    let Some(summary) = leaf.summary else {
        debug!("collapse ignored: `{}` has no summary node", node.id);
        return false;
    };
    if !node.visible {
        return false;
    }

    let anchor = node.pos;
    let members = match &graph.node(summary).kind {
        NodeKind::PtmSummary(cluster) => cluster.members.clone(),
        _ => return false,
    };
    for member in members {
        graph.node_mut(member).visible = false;
    }

    let badge = graph.node_mut(summary);
    badge.pos = anchor;
    badge.velocity = Vec2::ZERO;
    badge.visible = true;
    true
}

pub fn expand_all(graph: &mut Graph) -> usize {
    let summaries = graph.summaries().map(|(index, _)| index).collect::<Vec<_>>();
    summaries
        .into_iter()
        .filter(|&summary| expand_summary(graph, summary))
        .count()
}

pub fn collapse_all(graph: &mut Graph) -> usize {
    let leaders = graph
        .summaries()
        .filter_map(|(_, cluster)| cluster.members.first().copied())
        .collect::<Vec<_>>();
    leaders
        .into_iter()
        .filter(|&ptm| collapse_cluster(graph, ptm))
        .count()
}

/// Badge visible and every member hidden, or the reverse, for every cluster.
pub fn clusters_consistent(graph: &Graph) -> bool {
    graph.summaries().all(|(index, cluster)| {
        let badge_visible = graph.node(index).visible;
        !cluster.members.is_empty()
            && cluster
                .members
                .iter()
                .all(|&member| graph.node(member).visible != badge_visible)
    })
}

/// One-shot gate that keeps PTM-like nodes out of the picture until the first layout settles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum RevealTimer {
    Unarmed,
    Pending { deadline: f64 },
    Revealed,
}

impl RevealTimer {
    /// Arms on the first poll; returns `true` exactly once, when the delay elapses.
    pub(crate) fn poll(&mut self, now: f64, delay_secs: f64) -> bool {
        match *self {
            Self::Unarmed => {
                if delay_secs <= 0.0 {
                    *self = Self::Revealed;
                    return true;
                }
                *self = Self::Pending {
                    deadline: now + delay_secs,
                };
                false
            }
            Self::Pending { deadline } if now >= deadline => {
                *self = Self::Revealed;
                true
            }
            Self::Pending { .. } | Self::Revealed => false,
        }
    }

    pub(crate) fn is_revealed(self) -> bool {
        self == Self::Revealed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathway::{GeneProteinRecord, PathwayInput, PtmMeasurement, SkeletonNode, build_graph};

    fn clustered_graph() -> Graph {
        let entry = |regulation: &str| PtmMeasurement {
            gene_names: vec!["AKT1".to_owned()],
            regulation: regulation.to_owned(),
            ..PtmMeasurement::default()
        };
        build_graph(PathwayInput {
            nodes: vec![SkeletonNode::GeneProtein(GeneProteinRecord {
                id: "a".to_owned(),
                label: "AKT1".to_owned(),
                gene_names: vec!["AKT1".to_owned()],
                ..GeneProteinRecord::default()
            })],
            ptm: vec![entry("up"), entry("up"), entry("up"), entry("down")],
            ..PathwayInput::default()
        })
        .unwrap()
    }

    fn summary_for(graph: &Graph, size: usize) -> (NodeIdx, Vec<NodeIdx>) {
        graph
            .summaries()
            .find(|(_, cluster)| cluster.members.len() == size)
            .map(|(index, cluster)| (index, cluster.members.clone()))
            .unwrap()
    }

    #[test]
    fn expand_then_collapse_swaps_badge_and_members() {
        let mut graph = clustered_graph();
        assert!(clusters_consistent(&graph));
        let (summary, members) = summary_for(&graph, 3);

        assert!(expand_summary(&mut graph, summary));
        assert!(!graph.node(summary).visible);
        assert!(members.iter().all(|&member| graph.node(member).visible));
        assert!(clusters_consistent(&graph));

        assert!(collapse_cluster(&mut graph, members[1]));
        assert!(graph.node(summary).visible);
        assert!(members.iter().all(|&member| !graph.node(member).visible));
        assert!(clusters_consistent(&graph));
    }

    #[test]
    fn repeated_transitions_are_ignored() {
        let mut graph = clustered_graph();
        let (summary, members) = summary_for(&graph, 3);

        assert!(!collapse_cluster(&mut graph, members[0]));
        assert!(expand_summary(&mut graph, summary));
        assert!(!expand_summary(&mut graph, summary));
        assert!(!expand_summary(&mut graph, NodeIdx(0)));
        assert!(clusters_consistent(&graph));
    }

    #[test]
    fn expand_all_and_collapse_all_cover_every_cluster() {
        let mut graph = clustered_graph();

        assert_eq!(expand_all(&mut graph), 2);
        assert!(graph.summaries().all(|(index, _)| !graph.node(index).visible));
        assert!(clusters_consistent(&graph));

        assert_eq!(collapse_all(&mut graph), 2);
        assert!(graph.summaries().all(|(index, _)| graph.node(index).visible));
        assert!(clusters_consistent(&graph));
    }

    #[test]
    fn reveal_timer_fires_once_after_delay() {
        let mut timer = RevealTimer::Unarmed;
        assert!(!timer.poll(10.0, 1.5));
        assert!(!timer.poll(11.0, 1.5));
        assert!(timer.poll(11.5, 1.5));
        assert!(timer.is_revealed());
        assert!(!timer.poll(20.0, 1.5));
    }
}
