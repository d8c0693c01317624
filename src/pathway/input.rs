use serde::Deserialize;

use crate::error::GraphError;

use super::model::{Details, PathwayMetadata};

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneProteinRecord {
    #[serde(alias = "nodeId")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub gene_names: Vec<String>,
    #[serde(default)]
    pub uniprot_accs: Vec<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub details: Option<Details>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    #[serde(alias = "nodeId")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub component_node_ids: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InertRecord {
    #[serde(alias = "nodeId")]
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SkeletonNode {
    GeneProtein(GeneProteinRecord),
    Group(GroupRecord),
    Compound(InertRecord),
    #[serde(rename = "pathway")]
    PathwayRef(InertRecord),
    Misc(InertRecord),
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkeletonLink {
    #[serde(default)]
    pub id: Option<String>,
    pub source_id: String,
    pub target_id: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtmMeasurement {
    #[serde(default)]
    pub gene_names: Vec<String>,
    #[serde(default)]
    pub uniprot_accs: Vec<String>,
    pub regulation: String,
    #[serde(default)]
    pub details: Details,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteomeMeasurement {
    #[serde(default)]
    pub gene_names: Vec<String>,
    #[serde(default)]
    pub uniprot_accs: Vec<String>,
    pub regulation: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PathwayDocument {
    #[serde(default)]
    pub metadata: PathwayMetadata,
    pub nodes: Vec<SkeletonNode>,
    #[serde(default)]
    pub links: Vec<SkeletonLink>,
}

/// Everything the engine consumes at construction time.
#[derive(Clone, Debug, Default)]
pub struct PathwayInput {
    pub metadata: PathwayMetadata,
    pub nodes: Vec<SkeletonNode>,
    pub links: Vec<SkeletonLink>,
    pub ptm: Vec<PtmMeasurement>,
    pub full_proteome: Vec<ProteomeMeasurement>,
}

impl PathwayInput {
    pub fn from_document(document: PathwayDocument) -> Self {
        Self {
            metadata: document.metadata,
            nodes: document.nodes,
            links: document.links,
            ptm: Vec::new(),
            full_proteome: Vec::new(),
        }
    }

    pub fn from_json(
        pathway: &str,
        ptm: Option<&str>,
        full_proteome: Option<&str>,
    ) -> Result<Self, GraphError> {
        let document: PathwayDocument =
            serde_json::from_str(pathway).map_err(|source| GraphError::InvalidInput {
                what: "pathway",
                source,
            })?;
        let mut input = Self::from_document(document);

        if let Some(raw) = ptm {
            input.ptm = serde_json::from_str(raw)
                .map_err(|source| GraphError::InvalidInput { what: "PTM", source })?;
        }

        if let Some(raw) = full_proteome {
            input.full_proteome =
                serde_json::from_str(raw).map_err(|source| GraphError::InvalidInput {
                    what: "full proteome",
                    source,
                })?;
        }

        Ok(input)
    }
}
