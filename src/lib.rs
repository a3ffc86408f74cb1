//! Louvain modularity community detection on undirected multigraphs.

pub mod coarsen;
pub mod config;
pub mod error;
pub mod graph;
pub mod labeled;
pub mod local_move;
pub mod logger;
pub mod louvain;
pub mod modularity;
pub mod partition;
pub mod types;

#[cfg(test)]
mod fixtures;

pub use crate::error::{LouvainError, Result};
pub use crate::graph::{GraphView, MultiGraph};
pub use crate::labeled::LabeledGraph;
pub use crate::louvain::{get_communities, Detection, Level, Louvain};
pub use crate::modularity::{gain, modularity};
pub use crate::partition::{Community, Partition};
pub use crate::types::{CommId, Members, VInt};
