//! Modularity of a partition and the gain of moving one isolated vertex into a community.
//!
//! With m the number of edge instances, the gain of inserting vertex i into community C is
//!
//! ```text
//! dQ = [(S_in + k_i_in) / 2m - ((S_tot + k_i) / 2m)^2] - [S_in / 2m - (S_tot / 2m)^2 - (k_i / 2m)^2]
//! ```
//!
//! where S_in is the number of edges inside C, S_tot is S_in plus the edges leaving C, k_i is
//! the degree of i and k_i_in the number of edges between i and the members of C.

use crate::error::{LouvainError, Result};
use crate::graph::GraphView;
use crate::partition::Partition;
use crate::types::{CommId, VInt};

/// Edge counts of one community, the inputs of [`gain`] that do not depend on the vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommunityTotals {
    pub sigma_in: usize,
    pub sigma_tot: usize,
}

impl CommunityTotals {
    /// Counts of the live `community`, in one sweep over its members' adjacency.
    pub fn of<G: GraphView>(
        graph: &G,
        partition: &Partition,
        community: CommId,
    ) -> Result<CommunityTotals> {
        let members = partition.members(community).ok_or_else(|| {
            LouvainError::inconsistent(format!("community {:?} is not live", community))
        })?;
        let mut degree_sum = 0usize;
        let mut inner_stubs = 0usize;
        for &vertex in members {
            degree_sum += graph.degree(vertex);
            for (neighbor, count) in graph.weighted_neighbors(vertex) {
                if partition.community_of(neighbor) == Some(community) {
                    inner_stubs += if neighbor == vertex { 2 * count } else { count };
                }
            }
        }
        // The member degrees count inner edges twice and leaving edges once.
        let sigma_in = inner_stubs / 2;
        Ok(CommunityTotals {
            sigma_in,
            sigma_tot: degree_sum - sigma_in,
        })
    }
}

/// Normalizer 2m, refusing graphs without edges.
fn stub_count<G: GraphView>(graph: &G) -> Result<f64> {
    match graph.edge_count() {
        0 => Err(LouvainError::InvalidGraph {
            vertex_count: graph.node_count(),
        }),
        m => Ok(2.0 * m as f64),
    }
}

/// Change in modularity from inserting the isolated `vertex` into `community`.
///
/// `vertex` must not be a member of `community`. The value may be negative; evaluated against
/// the community the vertex was just taken out of, it is the baseline a move has to beat.
pub fn gain<G: GraphView>(
    graph: &G,
    partition: &Partition,
    vertex: VInt,
    community: CommId,
) -> Result<f64> {
    let two_m = stub_count(graph)?;
    if partition.contains(community, vertex) {
        return Err(LouvainError::InvalidPrecondition { vertex, community });
    }

    let totals = CommunityTotals::of(graph, partition, community)?;
    let k_i_in: usize = graph
        .weighted_neighbors(vertex)
        .filter(|&(neighbor, _)| partition.community_of(neighbor) == Some(community))
        .map(|(_, count)| count)
        .sum();
    let k_i = graph.degree(vertex);

    Ok(gain_from_counts(totals, k_i, k_i_in, two_m))
}

#[inline]
fn gain_from_counts(totals: CommunityTotals, k_i: usize, k_i_in: usize, two_m: f64) -> f64 {
    let sigma_in = totals.sigma_in as f64;
    let sigma_tot = totals.sigma_tot as f64;
    let k_i = k_i as f64;
    let k_i_in = k_i_in as f64;

    let after = (sigma_in + k_i_in) / two_m - ((sigma_tot + k_i) / two_m).powi(2);
    let before = sigma_in / two_m - (sigma_tot / two_m).powi(2) - (k_i / two_m).powi(2);
    after - before
}

/// Modularity Q of a complete partition.
///
/// `Q = sum_c [L_c / m - (d_c / 2m)^2]` with L_c the edges inside c and d_c the summed degree
/// of its members. Coarsening keeps Q, so a coarse partition scores like its flattened form on
/// the original graph.
pub fn modularity<G: GraphView>(graph: &G, partition: &Partition) -> Result<f64> {
    let two_m = stub_count(graph)?;
    if partition.vertex_count() != graph.node_count() {
        return Err(LouvainError::inconsistent(format!(
            "partition covers {} vertices, graph has {}",
            partition.vertex_count(),
            graph.node_count()
        )));
    }
    partition.validate()?;

    let q: f64 = partition
        .iter()
        .map(|community| {
            let inner = graph.induced_edge_count(community.members()) as f64;
            let degree: usize = community.members().iter().map(|&v| graph.degree(v)).sum();
            2.0 * inner / two_m - (degree as f64 / two_m).powi(2)
        })
        .sum();
    Ok(q)
}
