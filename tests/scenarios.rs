use eframe::egui::vec2;
use pathwaygraph::engine::{EngineEvent, clusters_consistent, is_selected};
use pathwaygraph::pathway::{
    Endpoint, GeneProteinRecord, Graph, InertRecord, LinkKind, NodeKind, PathwayInput,
    ProteomeMeasurement, PtmMeasurement, Regulation, RegulationCounts, SkeletonLink, SkeletonNode,
    build_graph,
};
use pathwaygraph::{EngineConfig, GraphError, NodeIdx, PathwayEngine};
use pretty_assertions::assert_eq;

fn gene(id: &str, name: &str, x: f32, y: f32) -> SkeletonNode {
    SkeletonNode::GeneProtein(GeneProteinRecord {
        id: id.to_owned(),
        label: name.to_owned(),
        gene_names: vec![name.to_owned()],
        x,
        y,
        ..GeneProteinRecord::default()
    })
}

fn compound(id: &str, x: f32, y: f32) -> SkeletonNode {
    SkeletonNode::Compound(InertRecord {
        id: id.to_owned(),
        label: String::new(),
        x,
        y,
    })
}

fn relation(id: Option<&str>, source: &str, target: &str, kind: &str) -> SkeletonLink {
    SkeletonLink {
        id: id.map(str::to_owned),
        source_id: source.to_owned(),
        target_id: target.to_owned(),
        types: vec![kind.to_owned()],
    }
}

fn ptm(name: &str, regulation: &str) -> PtmMeasurement {
    PtmMeasurement {
        gene_names: vec![name.to_owned()],
        regulation: regulation.to_owned(),
        ..PtmMeasurement::default()
    }
}

fn selected_ids(graph: &Graph) -> Vec<String> {
    graph
        .node_indices()
        .filter(|&index| is_selected(graph, index))
        .map(|index| graph.node(index).id.clone())
        .collect()
}

#[test]
fn single_ptm_entry_creates_one_leaf_one_badge_and_two_tethers() {
    let graph = build_graph(PathwayInput {
        nodes: vec![gene("A", "GENEA", 0.0, 0.0), gene("B", "GENEB", 200.0, 0.0)],
        links: vec![relation(None, "A", "B", "activation")],
        ptm: vec![ptm("GENEA", "up")],
        ..PathwayInput::default()
    })
    .unwrap();

    let ptms = graph
        .nodes
        .iter()
        .filter_map(|node| match &node.kind {
            NodeKind::Ptm(ptm) => Some((node.id.as_str(), ptm.owner_id.as_str())),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(ptms, vec![("ptm-A-0", "A")]);

    let (_, summary) = graph.summaries().next().unwrap();
    assert_eq!(graph.summaries().count(), 1);
    assert_eq!(summary.owner_id, "A");
    assert_eq!(summary.count_label, "1");
    assert_eq!(summary.regulation, Regulation::Up);

    let kinds = graph.links.iter().map(|link| link.kind).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![LinkKind::Relation, LinkKind::PtmTether, LinkKind::SummaryTether]
    );

    let b = graph.node_by_id("B").unwrap();
    assert!(graph.incoming_links(b).iter().all(|&link| !graph.link(link).is_tether()));
}

#[test]
fn proteome_entries_count_by_regulation() {
    let graph = build_graph(PathwayInput {
        nodes: vec![gene("D", "GENED", 0.0, 0.0)],
        full_proteome: vec![
            ProteomeMeasurement {
                gene_names: vec!["GENED".to_owned()],
                regulation: "up".to_owned(),
                ..ProteomeMeasurement::default()
            },
            ProteomeMeasurement {
                gene_names: vec!["GENED".to_owned()],
                regulation: "up".to_owned(),
                ..ProteomeMeasurement::default()
            },
            ProteomeMeasurement {
                gene_names: vec!["GENED".to_owned()],
                regulation: "down".to_owned(),
                ..ProteomeMeasurement::default()
            },
        ],
        ..PathwayInput::default()
    })
    .unwrap();

    let NodeKind::GeneProtein(d) = &graph.nodes[0].kind else {
        panic!("expected gene node");
    };
    assert_eq!(
        d.counts,
        Some(RegulationCounts {
            up: 2,
            down: 1,
            not: 0
        })
    );
}

#[test]
fn link_anchored_on_relation_four_sits_on_its_midpoint() {
    let engine = PathwayEngine::new(
        PathwayInput {
            nodes: vec![
                compound("4a", 0.0, 0.0),
                compound("4b", 120.0, 40.0),
                compound("5", 60.0, 200.0),
            ],
            links: vec![
                relation(None, "3", "4a", "activation"),
                relation(None, "x", "y", "activation"),
                relation(None, "z", "w", "activation"),
                relation(None, "q", "r", "activation"),
                relation(None, "4a", "4b", "activation"),
                relation(Some("to-5"), "relation-4", "5", "activation"),
            ],
            ..PathwayInput::default()
        },
        EngineConfig::default(),
    )
    .unwrap();
    let graph = engine.graph();

    let anchor = graph.link_by_id("relation-4").unwrap();
    assert!(!graph.link(anchor).broken);

    let anchored = graph.link(graph.link_by_id("to-5").unwrap());
    assert!(anchored.source_is_anchor);
    assert!(!anchored.target_is_anchor);
    assert_eq!(anchored.source, Some(Endpoint::Link(anchor)));
    assert_eq!(anchored.geometry.source, vec2(60.0, 20.0));

    // Unresolvable endpoints are excluded rather than failing the graph.
    for broken in ["relation-0", "relation-1", "relation-2", "relation-3"] {
        let index = graph.link_by_id(broken).unwrap();
        assert!(graph.link(index).broken);
    }
}

#[test]
fn resolved_endpoints_read_back_their_ids() {
    let graph = build_graph(PathwayInput {
        nodes: vec![gene("A", "GENEA", 0.0, 0.0), gene("B", "GENEB", 100.0, 0.0)],
        links: vec![
            relation(Some("ab"), "A", "B", "activation"),
            relation(Some("to-b"), "ab", "B", "activation"),
        ],
        ..PathwayInput::default()
    })
    .unwrap();

    for link in graph.links.iter().filter(|link| !link.broken) {
        let (source, target) = link.endpoints().unwrap();
        assert_eq!(graph.endpoint_id(source), link.source_id);
        assert_eq!(graph.endpoint_id(target), link.target_id);
    }
    let anchored = graph.link(graph.link_by_id("to-b").unwrap());
    assert!(matches!(anchored.source, Some(Endpoint::Link(_))));
}

#[test]
fn duplicate_ids_fail_construction() {
    let result = PathwayEngine::new(
        PathwayInput {
            nodes: vec![gene("A", "GENEA", 0.0, 0.0), compound("A", 10.0, 0.0)],
            ..PathwayInput::default()
        },
        EngineConfig::default(),
    );
    assert!(matches!(result, Err(GraphError::DuplicateNodeId(id)) if id == "A"));
}

fn interactive_engine() -> PathwayEngine {
    PathwayEngine::new(
        PathwayInput {
            nodes: vec![
                gene("A", "GENEA", 0.0, 0.0),
                gene("B", "GENEB", 200.0, 0.0),
                gene("C", "GENEC", 400.0, 0.0),
            ],
            links: vec![
                relation(None, "A", "B", "activation"),
                relation(None, "B", "C", "activation"),
            ],
            ptm: vec![
                ptm("GENEA", "up"),
                ptm("GENEA", "up"),
                ptm("GENEA", "up"),
                ptm("GENEB", "down"),
            ],
            ..PathwayInput::default()
        },
        EngineConfig::default(),
    )
    .unwrap()
}

#[test]
fn plain_click_replaces_previous_selection() {
    let mut engine = interactive_engine();
    let a = engine.graph().node_by_id("A").unwrap();
    let b = engine.graph().node_by_id("B").unwrap();

    engine.select_node(b, false);
    engine.select_node(a, false);

    assert_eq!(
        selected_ids(engine.graph()),
        vec!["A", "ptm-A-0", "ptm-A-1", "ptm-A-2", "ptmsummary-A-up"]
    );

    let events = engine.drain_events();
    let last_leaves = events.iter().rev().find_map(|event| match event {
        EngineEvent::SelectionChanged(leaves) => Some(
            leaves
                .iter()
                .map(|leaf| leaf.node_id.as_str())
                .collect::<Vec<_>>(),
        ),
        EngineEvent::Details(_) => None,
    });
    assert_eq!(last_leaves, Some(vec!["ptm-A-0", "ptm-A-1", "ptm-A-2"]));
}

#[test]
fn canvas_click_clears_dimming_and_details() {
    let mut engine = interactive_engine();
    let a = engine.graph().node_by_id("A").unwrap();
    let c = engine.graph().node_by_id("C").unwrap();

    engine.click_node(a, false, 1.0);
    engine.poll(2.0);
    assert!(engine.node_dimmed(c));

    engine.click_canvas(3.0);
    engine.poll(4.0);
    assert!(!engine.node_dimmed(c));
    let events = engine.drain_events();
    assert!(events.contains(&EngineEvent::Details(None)));
}

#[test]
fn expanding_and_collapsing_a_three_member_cluster() {
    let mut engine = interactive_engine();
    let summary = engine.graph().node_by_id("ptmsummary-A-up").unwrap();
    let members = ["ptm-A-0", "ptm-A-1", "ptm-A-2"]
        .map(|id| engine.graph().node_by_id(id).unwrap());

    assert!(engine.expand_summary(summary));
    let visible_ptms = engine
        .graph()
        .nodes
        .iter()
        .filter(|node| matches!(node.kind, NodeKind::Ptm(_)) && node.visible)
        .map(|node| node.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(visible_ptms, vec!["ptm-A-0", "ptm-A-1", "ptm-A-2"]);
    assert!(!engine.graph().node(summary).visible);
    assert!(clusters_consistent(engine.graph()));

    for _ in 0..60 {
        engine.tick();
        assert!(clusters_consistent(engine.graph()));
    }

    assert!(engine.collapse_ptm(members[2]));
    assert!(members.iter().all(|&member| !engine.graph().node(member).visible));
    assert!(engine.graph().node(summary).visible);
    assert!(clusters_consistent(engine.graph()));
}

#[test]
fn double_click_toggles_cluster_through_debounce() {
    let mut engine = interactive_engine();
    let summary = engine.graph().node_by_id("ptmsummary-A-up").unwrap();

    engine.click_node(summary, false, 1.0);
    engine.click_node(summary, false, 1.1);
    assert!(!engine.graph().node(summary).visible);

    let member = engine.graph().node_by_id("ptm-A-1").unwrap();
    engine.click_node(member, false, 2.0);
    engine.click_node(member, false, 2.05);
    assert!(engine.graph().node(summary).visible);

    engine.poll(10.0);
    assert!(engine.drain_events().is_empty());
}

#[test]
fn downstream_selection_is_a_superset_and_idempotent() {
    let mut engine = interactive_engine();
    let graph = engine.graph();
    let b = graph.node_by_id("B").unwrap();
    let forward = graph
        .outgoing_links(b)
        .iter()
        .filter_map(|&link| graph.link(link).target.and_then(Endpoint::node))
        .collect::<Vec<NodeIdx>>();

    engine.select_downstream("B");
    let first = selected_ids(engine.graph());
    for index in forward.iter().copied().chain([b]) {
        assert!(is_selected(engine.graph(), index));
    }

    engine.select_downstream("GENEB");
    let second = selected_ids(engine.graph());
    assert_eq!(first, second);
    assert_eq!(first, vec!["B", "C", "ptm-B-0", "ptmsummary-B-down"]);
}

#[test]
fn pathway_json_round_trip_through_engine() {
    let pathway = r#"{
        "metadata": { "identifier": "hsa04151", "organism": "hsa", "title": "PI3K-Akt" },
        "nodes": [
            { "type": "gene_protein", "id": "10", "label": "AKT1", "geneNames": ["AKT1"],
              "uniprotAccs": ["P31749"], "x": 0, "y": 0 },
            { "type": "gene_protein", "id": "11", "label": "MTOR", "geneNames": ["MTOR"],
              "uniprotAccs": ["P42345"], "x": 150, "y": 0 }
        ],
        "links": [ { "sourceId": "10", "targetId": "11", "types": ["activation"] } ]
    }"#;
    let ptm = r#"[
        { "uniprotAccs": ["P31749-2"], "geneNames": ["AKT1"], "regulation": "up",
          "details": { "site": "S473" } }
    ]"#;

    let input = PathwayInput::from_json(pathway, Some(ptm), None).unwrap();
    let mut engine = PathwayEngine::new(input, EngineConfig::default()).unwrap();
    assert_eq!(engine.metadata().title, "PI3K-Akt");

    let leaf = engine.graph().node_by_id("ptm-10-0").unwrap();
    engine.select_node(leaf, false);
    let events = engine.drain_events();
    assert!(matches!(
        &events[0],
        EngineEvent::Details(Some(text)) if text.starts_with("PTM on AKT1 (up)") && text.contains("site: S473")
    ));
    assert_eq!(engine.selected_leaf_count(), 1);
}
