use derive_more::Display;

use crate::types::{CommId, VInt};

/// Result alias used by the detection core.
pub type Result<T> = std::result::Result<T, LouvainError>;

/// Errors raised by the detection core. None of them is recoverable for the current run.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum LouvainError {
    /// The graph has no edges, so modularity (normalized by 2m) is undefined.
    #[display(fmt = "graph with {} vertices has no edges, modularity is undefined", vertex_count)]
    InvalidGraph { vertex_count: usize },

    /// Gain was requested for a vertex that is still a member of the target community.
    #[display(fmt = "vertex {} must be isolated before evaluating community {:?}", vertex, community)]
    InvalidPrecondition { vertex: VInt, community: CommId },

    /// A vertex sits in zero or several communities, or a community id is dead.
    #[display(fmt = "inconsistent partition: {}", _0)]
    InconsistentPartition(String),

    /// More vertices than a `VInt` can address.
    #[display(fmt = "vertex index {} does not fit in a 32-bit vertex id", index)]
    VertexOverflow { index: usize },
}

impl std::error::Error for LouvainError {}

impl LouvainError {
    pub(crate) fn inconsistent(msg: impl Into<String>) -> Self {
        LouvainError::InconsistentPartition(msg.into())
    }
}
