use log::debug;

use crate::error::{LouvainError, Result};
use crate::graph::GraphView;
use crate::partition::Partition;

/// Phase 2: collapse every community into one vertex.
///
/// Vertex `i` of the result is the `i`-th live community of `partition` in creation order.
/// Each edge instance `(u, v)` becomes one edge between the communities of `u` and `v`, so inner
/// edges turn into self-loops and multiplicities are kept exactly.
pub fn coarsen<G: GraphView>(graph: &G, partition: &Partition) -> Result<G> {
    if partition.vertex_count() != graph.node_count() {
        return Err(LouvainError::inconsistent(format!(
            "partition covers {} vertices, graph has {}",
            partition.vertex_count(),
            graph.node_count()
        )));
    }
    let assignment = partition.dense_assignment()?;
    let coarse = G::build_from_edges(
        partition.len(),
        graph
            .edges()
            .map(|(u, v)| (assignment[u as usize], assignment[v as usize])),
    );
    debug!(
        "Zooming out: {} vertices -> {} vertices, {} edges kept",
        graph.node_count(),
        coarse.node_count(),
        coarse.edge_count()
    );
    Ok(coarse)
}
