use std::collections::HashSet;

use log::{debug, trace};

use crate::error::{LouvainError, Result};
use crate::graph::GraphView;
use crate::modularity::gain;
use crate::partition::Partition;
use crate::types::{CommId, VInt};

/// Result of one local moving phase.
#[derive(Debug, Clone)]
pub struct LocalMoveOutcome {
    /// Whether any vertex moved during the phase.
    pub changed: bool,
    /// The partition at the fixed point, complete and validated.
    pub partition: Partition,
    /// Number of passes over the vertex set.
    pub passes: usize,
}

/// Phase 1: start from singletons and greedily move vertices to the neighboring community with
/// the best modularity gain until a pass changes nothing.
///
/// Passes are capped at the vertex count; reaching the cap is treated as converged.
pub fn local_move<G: GraphView>(graph: &G) -> Result<LocalMoveOutcome> {
    local_move_with_pass_cap(graph, graph.node_count())
}

pub(crate) fn local_move_with_pass_cap<G: GraphView>(
    graph: &G,
    max_passes: usize,
) -> Result<LocalMoveOutcome> {
    if graph.edge_count() == 0 {
        return Err(LouvainError::InvalidGraph {
            vertex_count: graph.node_count(),
        });
    }

    // Communities are created in vertex enumeration order.
    let order: Vec<VInt> = graph.nodes().collect();
    let mut partition = Partition::singletons(graph.node_count());

    let mut changed_globally = false;
    let mut converged = false;
    let mut passes = 0usize;
    while passes < max_passes {
        passes += 1;
        let mut moves = 0usize;
        for &vertex in &order {
            if move_vertex(graph, &mut partition, vertex)? {
                moves += 1;
            }
        }
        debug!(
            "Local move pass {}: {} moves, {} communities left",
            passes,
            moves,
            partition.len()
        );
        if moves == 0 {
            converged = true;
            break;
        }
        changed_globally = true;
    }
    if !converged {
        debug!("Local move stopped at the pass cap of {}", max_passes);
    }

    partition.validate()?;
    Ok(LocalMoveOutcome {
        changed: changed_globally,
        partition,
        passes,
    })
}

/// Evaluate one vertex: isolate it, pick the best community, put it back. Returns whether it
/// ended up in a different community.
fn move_vertex<G: GraphView>(graph: &G, partition: &mut Partition, vertex: VInt) -> Result<bool> {
    // Snapshot: the vertex leaves its community, the cost of going back is the baseline.
    let old_community = partition.isolate(vertex)?;
    let baseline = gain(graph, partition, vertex, old_community)?;

    // Decide: first-seen maximum over the distinct communities of the neighbors.
    let target = match best_neighbor_community(graph, partition, vertex)? {
        Some((community, best)) if best > baseline => community,
        _ => old_community,
    };

    // Commit.
    partition.commit(vertex, target)?;
    if partition.community_of(vertex) != Some(target) || !partition.contains(target, vertex) {
        return Err(LouvainError::inconsistent(format!(
            "vertex {} was not placed in community {:?}",
            vertex, target
        )));
    }
    partition.release_if_empty(old_community);

    if target != old_community {
        trace!("Move vertex {} from community {:?} to {:?}", vertex, old_community, target);
    }
    Ok(target != old_community)
}

fn best_neighbor_community<G: GraphView>(
    graph: &G,
    partition: &Partition,
    vertex: VInt,
) -> Result<Option<(CommId, f64)>> {
    let mut best: Option<(CommId, f64)> = None;
    let mut visited: HashSet<CommId> = HashSet::new();

    for neighbor in graph.neighbors(vertex) {
        // A self-loop does not name a candidate.
        if neighbor == vertex {
            continue;
        }
        let community = partition.community_of(neighbor).ok_or_else(|| {
            LouvainError::inconsistent(format!("neighbor {} is not in any community", neighbor))
        })?;
        if !visited.insert(community) {
            continue;
        }
        let dq = gain(graph, partition, vertex, community)?;
        // Strictly greater, so ties keep the earlier candidate.
        if best.map_or(true, |(_, best_dq)| dq > best_dq) {
            best = Some((community, dq));
        }
    }
    Ok(best)
}
