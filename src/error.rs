use thiserror::Error;

/// Integrity failures detected while building the pathway graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate node id `{0}` in merged pathway graph")]
    DuplicateNodeId(String),

    #[error("duplicate link id `{0}` in merged pathway graph")]
    DuplicateLinkId(String),

    #[error("invalid {what} input: {source}")]
    InvalidInput {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
