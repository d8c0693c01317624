use std::collections::HashMap;

use crate::util::canonical_accession;

use super::model::{Node, NodeIdx, NodeKind};

/// Lookup from gene symbol or canonical accession to the skeleton nodes carrying it.
#[derive(Debug, Default)]
pub struct RegulationIndex {
    by_key: HashMap<String, Vec<NodeIdx>>,
}

impl RegulationIndex {
    pub fn build(nodes: &[Node]) -> Self {
        let mut by_key: HashMap<String, Vec<NodeIdx>> = HashMap::new();

        for (index, node) in nodes.iter().enumerate() {
            let NodeKind::GeneProtein(gene) = &node.kind else {
                continue;
            };

            let keys = gene
                .gene_names
                .iter()
                .map(|name| name.trim())
                .chain(gene.accessions.iter().map(|acc| canonical_accession(acc)))
                .filter(|key| !key.is_empty());

            for key in keys {
                let entry = by_key.entry(key.to_owned()).or_default();
                if !entry.contains(&NodeIdx(index)) {
                    entry.push(NodeIdx(index));
                }
            }
        }

        Self { by_key }
    }

    pub fn lookup(&self, key: &str) -> &[NodeIdx] {
        self.by_key
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use super::*;
    use crate::pathway::model::GeneProtein;

    fn gene(id: &str, names: &[&str], accessions: &[&str]) -> Node {
        Node::new(
            id.to_owned(),
            NodeKind::GeneProtein(GeneProtein {
                label: names.first().copied().unwrap_or_default().to_owned(),
                gene_names: names.iter().map(|name| (*name).to_owned()).collect(),
                accessions: accessions.iter().map(|acc| (*acc).to_owned()).collect(),
                group_id: None,
                group: None,
                details: None,
                counts: None,
            }),
            Vec2::ZERO,
        )
    }

    #[test]
    fn indexes_names_and_canonical_accessions() {
        let nodes = vec![gene("1", &["MAPK1", "ERK2"], &["P28482-2"])];
        let index = RegulationIndex::build(&nodes);

        assert_eq!(index.lookup("MAPK1"), &[NodeIdx(0)]);
        assert_eq!(index.lookup("ERK2"), &[NodeIdx(0)]);
        assert_eq!(index.lookup("P28482"), &[NodeIdx(0)]);
        assert!(index.lookup("P28482-2").is_empty());
        assert_eq!(index.key_count(), 3);
    }

    #[test]
    fn one_key_fans_out_to_several_nodes() {
        let nodes = vec![
            gene("1", &["MAPK1"], &[]),
            Node::new(
                "c1".to_owned(),
                NodeKind::Compound {
                    label: "MAPK1".to_owned(),
                },
                Vec2::ZERO,
            ),
            gene("2", &["MAPK1"], &["P28482"]),
        ];
        let index = RegulationIndex::build(&nodes);

        assert_eq!(index.lookup("MAPK1"), &[NodeIdx(0), NodeIdx(2)]);
    }

    #[test]
    fn isoforms_of_one_node_are_indexed_once() {
        let nodes = vec![gene("1", &[], &["P28482-1", "P28482-2"])];
        let index = RegulationIndex::build(&nodes);

        assert_eq!(index.lookup("P28482"), &[NodeIdx(0)]);
    }
}
