use std::collections::{BTreeMap, HashMap, HashSet};

use eframe::egui::vec2;
use log::{debug, info, warn};

use crate::util::{canonical_accession, sorted_unique};

use super::index::RegulationIndex;
use super::input::{PathwayInput, ProteomeMeasurement, PtmMeasurement, SkeletonLink, SkeletonNode};
use super::model::{
    GeneProtein, Group, Link, LinkKind, Node, NodeIdx, NodeKind, PTM_LINK_TYPE, PathwayMetadata,
    Ptm, PtmSummary, Regulation,
};

/// Merged but still id-linked node and link lists, ready for reference resolution.
#[derive(Clone, Debug)]
pub struct AssembledGraph {
    pub metadata: PathwayMetadata,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

pub fn assemble(input: PathwayInput) -> AssembledGraph {
    let PathwayInput {
        metadata,
        nodes: skeleton,
        links: skeleton_links,
        ptm,
        full_proteome,
    } = input;

    let mut nodes = skeleton.into_iter().map(skeleton_node).collect::<Vec<_>>();
    let skeleton_count = nodes.len();
    let mut links = relation_links(skeleton_links);

    let index = RegulationIndex::build(&nodes);
    let ptm_count = attach_ptms(&mut nodes, &mut links, &index, &ptm);
    let counted_owners = count_regulation(&mut nodes, &index, &full_proteome);

    info!(
        "assembled pathway `{}`: {} skeleton nodes, {} PTM nodes, {} summaries, {} owners with proteome counts",
        metadata.identifier,
        skeleton_count,
        ptm_count,
        nodes.len() - skeleton_count - ptm_count,
        counted_owners
    );

    AssembledGraph {
        metadata,
        nodes,
        links,
    }
}

fn skeleton_node(record: SkeletonNode) -> Node {
    match record {
        SkeletonNode::GeneProtein(record) => {
            let gene_names = sorted_unique(&record.gene_names);
            let label = if record.label.trim().is_empty() {
                gene_names.first().cloned().unwrap_or_default()
            } else {
                record.label
            };
            Node::new(
                record.id,
                NodeKind::GeneProtein(GeneProtein {
                    label,
                    gene_names,
                    accessions: sorted_unique(&record.uniprot_accs),
                    group_id: record.group_id,
                    group: None,
                    details: record.details,
                    counts: None,
                }),
                vec2(record.x, record.y),
            )
        }
        SkeletonNode::Group(record) => Node::new(
            record.id,
            NodeKind::Group(Group {
                label: record.label,
                component_ids: record.component_node_ids,
                ..Group::default()
            }),
            vec2(0.0, 0.0),
        ),
        SkeletonNode::Compound(record) => Node::new(
            record.id,
            NodeKind::Compound {
                label: record.label,
            },
            vec2(record.x, record.y),
        ),
        SkeletonNode::PathwayRef(record) => Node::new(
            record.id,
            NodeKind::PathwayRef {
                label: record.label,
            },
            vec2(record.x, record.y),
        ),
        SkeletonNode::Misc(record) => Node::new(
            record.id,
            NodeKind::Misc {
                label: record.label,
            },
            vec2(record.x, record.y),
        ),
    }
}

/// Links without an id get `relation-<position>`; collisions with explicit ids are suffixed.
fn relation_links(records: Vec<SkeletonLink>) -> Vec<Link> {
    let mut taken = records
        .iter()
        .filter_map(|record| record.id.clone())
        .collect::<HashSet<_>>();

    records
        .into_iter()
        .enumerate()
        .map(|(position, record)| {
            let id = match record.id {
                Some(id) => id,
                None => {
                    let mut candidate = format!("relation-{position}");
                    let mut suffix = 1usize;
                    while taken.contains(&candidate) {
                        candidate = format!("relation-{position}-{suffix}");
                        suffix += 1;
                    }
                    taken.insert(candidate.clone());
                    candidate
                }
            };
            Link::new(
                id,
                record.source_id,
                record.target_id,
                record.types,
                LinkKind::Relation,
            )
        })
        .collect()
}

/// Identifier keys of one measurement, accessions first, each list sorted and unique.
fn measurement_keys(gene_names: &[String], accessions: &[String]) -> Vec<String> {
    let accessions = accessions
        .iter()
        .map(|accession| canonical_accession(accession).to_owned())
        .collect::<Vec<_>>();
    let mut keys = sorted_unique(&accessions);
    keys.extend(sorted_unique(gene_names));
    keys
}

/// Matched owners of one entry, each at most once, in key order.
fn matched_owners(index: &RegulationIndex, keys: &[String]) -> Vec<NodeIdx> {
    let mut visited = HashSet::new();
    let mut owners = Vec::new();
    for key in keys {
        for &owner in index.lookup(key) {
            if visited.insert(owner) {
                owners.push(owner);
            }
        }
    }
    owners
}

pub(crate) fn attach_ptms(
    nodes: &mut Vec<Node>,
    links: &mut Vec<Link>,
    index: &RegulationIndex,
    measurements: &[PtmMeasurement],
) -> usize {
    let mut sequence: HashMap<NodeIdx, usize> = HashMap::new();
    let mut clusters: BTreeMap<(NodeIdx, Regulation), Vec<NodeIdx>> = BTreeMap::new();
    let mut created = 0usize;

    for (position, measurement) in measurements.iter().enumerate() {
        let Some(regulation) = Regulation::parse(&measurement.regulation) else {
            warn!(
                "skipping PTM entry {position}: unrecognized regulation `{}`",
                measurement.regulation
            );
            continue;
        };

        let gene_names = sorted_unique(&measurement.gene_names);
        let accessions = sorted_unique(&measurement.uniprot_accs);
        let keys = measurement_keys(&gene_names, &accessions);
        let owners = matched_owners(index, &keys);
        if owners.is_empty() {
            debug!("PTM entry {position} matched no pathway node");
        }

        for owner in owners {
            let (owner_id, owner_pos) = {
                let owner_node = &nodes[owner.0];
                (owner_node.id.clone(), owner_node.pos)
            };
            let counter = sequence.entry(owner).or_insert(0);
            let ptm_id = format!("ptm-{owner_id}-{counter}");
            *counter += 1;

            let ptm_index = NodeIdx(nodes.len());
            nodes.push(Node::new(
                ptm_id.clone(),
                NodeKind::Ptm(Ptm {
                    owner_id: owner_id.clone(),
                    owner: None,
                    regulation,
                    gene_names: gene_names.clone(),
                    accessions: accessions.clone(),
                    details: measurement.details.clone(),
                    summary_id: None,
                    summary: None,
                }),
                owner_pos,
            ));
            links.push(Link::new(
                format!("ptmlink-{ptm_id}"),
                ptm_id,
                owner_id,
                vec![PTM_LINK_TYPE.to_owned()],
                LinkKind::PtmTether,
            ));
            clusters.entry((owner, regulation)).or_default().push(ptm_index);
            created += 1;
        }
    }

    for ((owner, regulation), members) in clusters {
        let (owner_id, owner_pos) = {
            let owner_node = &nodes[owner.0];
            (owner_node.id.clone(), owner_node.pos)
        };
        let summary_id = format!("ptmsummary-{owner_id}-{}", regulation.id_fragment());

        let mut member_ids = Vec::with_capacity(members.len());
        for member in &members {
            let node = &mut nodes[member.0];
            if let NodeKind::Ptm(ptm) = &mut node.kind {
                ptm.summary_id = Some(summary_id.clone());
            }
            member_ids.push(node.id.clone());
        }

        nodes.push(Node::new(
            summary_id.clone(),
            NodeKind::PtmSummary(PtmSummary {
                owner_id: owner_id.clone(),
                owner: None,
                regulation,
                count_label: members.len().to_string(),
                member_ids,
                members: Vec::new(),
            }),
            owner_pos,
        ));
        links.push(Link::new(
            format!("ptmlink-{summary_id}"),
            summary_id,
            owner_id,
            vec![PTM_LINK_TYPE.to_owned()],
            LinkKind::SummaryTether,
        ));
    }

    created
}

/// Annotates matched owners with up/down/not counts; returns how many owners were touched.
pub(crate) fn count_regulation(
    nodes: &mut [Node],
    index: &RegulationIndex,
    entries: &[ProteomeMeasurement],
) -> usize {
    let mut touched = HashSet::new();

    for (position, entry) in entries.iter().enumerate() {
        let Some(regulation) = Regulation::parse(&entry.regulation) else {
            debug!(
                "ignoring proteome entry {position}: unrecognized regulation `{}`",
                entry.regulation
            );
            continue;
        };

        let keys = measurement_keys(&entry.gene_names, &entry.uniprot_accs);
        for owner in matched_owners(index, &keys) {
            if let NodeKind::GeneProtein(gene) = &mut nodes[owner.0].kind {
                gene.counts.get_or_insert_default().record(regulation);
                touched.insert(owner);
            }
        }
    }

    touched.len()
}
