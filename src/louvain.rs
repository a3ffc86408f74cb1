//! Multi-level Louvain community detection (Blondel et al. 2008).
//!
//! 1. **Local moving**: start with every vertex in its own community and move single vertices
//!    to the neighboring community with the best modularity gain until nothing moves.
//! 2. **Coarsening**: collapse every community into one vertex, keeping every edge instance,
//!    so inner edges become self-loops.
//! 3. Repeat on the coarse graph until a local moving phase changes nothing.
//!
//! The original vertices behind each coarse vertex are tracked level by level, the final
//! coarse vertices are the communities.

use log::info;
use serde::Serialize;

use crate::coarsen::coarsen;
use crate::config::LouvainConfig;
use crate::error::Result;
use crate::graph::{GraphView, MultiGraph};
use crate::local_move::local_move;
use crate::modularity::modularity;
use crate::partition::Partition;
use crate::types::Members;

/// Partition of the original vertices after one coarsening step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub communities: Vec<Members>,
    pub modularity: f64,
}

/// Final communities plus the hierarchy that led to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Disjoint, non-empty groups of original vertices covering the whole vertex set.
    pub communities: Vec<Members>,
    pub modularity: f64,
    /// One entry per coarsening step, coarsest last.
    pub levels: Vec<Level>,
}

/// Louvain community detection.
#[derive(Debug, Clone, Default)]
pub struct Louvain {
    config: LouvainConfig,
}

impl Louvain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LouvainConfig) -> Self {
        Louvain { config }
    }

    /// Stop after `levels` coarsening steps.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.config.max_levels = Some(levels);
        self
    }

    pub fn config(&self) -> &LouvainConfig {
        &self.config
    }

    /// Communities of `graph` as groups of its vertex ids.
    pub fn detect<G: GraphView>(&self, graph: &G) -> Result<Vec<Members>> {
        Ok(self.run(graph)?.communities)
    }

    /// Partition of the original vertices after every coarsening step.
    pub fn detect_levels<G: GraphView>(&self, graph: &G) -> Result<Vec<Level>> {
        Ok(self.run(graph)?.levels)
    }

    /// Run the full hierarchy.
    pub fn run<G: GraphView>(&self, graph: &G) -> Result<Detection> {
        // Work on an owned multigraph from here on, whatever the input is.
        let mut level_graph = MultiGraph::build_from_edges(graph.node_count(), graph.edges());
        // Original vertices behind every vertex of the current level.
        let mut node_repr: Vec<Members> = graph.nodes().map(|v| vec![v]).collect();
        let mut levels: Vec<Level> = Vec::new();

        let final_modularity = loop {
            if self.config.max_levels.map_or(false, |max| levels.len() >= max) {
                info!("Stopping after {} levels", levels.len());
                break modularity(&level_graph, &Partition::singletons(level_graph.node_count()))?;
            }

            let outcome = local_move(&level_graph)?;
            let q = modularity(&level_graph, &outcome.partition)?;
            if !outcome.changed {
                break q;
            }

            node_repr = outcome
                .partition
                .iter()
                .map(|community| {
                    community
                        .members()
                        .iter()
                        .flat_map(|&v| node_repr[v as usize].iter().copied())
                        .collect()
                })
                .collect();
            level_graph = coarsen(&level_graph, &outcome.partition)?;

            info!(
                "Level {}: {} communities after {} passes, modularity {:.6}",
                levels.len() + 1,
                node_repr.len(),
                outcome.passes,
                q
            );
            levels.push(Level {
                communities: node_repr.clone(),
                modularity: q,
            });
        };

        Ok(Detection {
            communities: node_repr,
            modularity: final_modularity,
            levels,
        })
    }
}

/// Communities of `graph` with the default settings.
pub fn get_communities<G: GraphView>(graph: &G) -> Result<Vec<Members>> {
    Louvain::new().detect(graph)
}

#[cfg(test)]
mod test_louvain {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::error::LouvainError;
    use crate::fixtures::{three_triangles, two_cliques};
    use crate::graph::{GraphView, MultiGraph};
    use crate::local_move::local_move;
    use crate::louvain::{get_communities, Louvain};
    use crate::modularity::modularity;
    use crate::partition::Partition;
    use crate::types::Members;

    fn as_sets(communities: &[Members]) -> BTreeSet<BTreeSet<u32>> {
        communities.iter().map(|c| c.iter().copied().collect()).collect()
    }

    fn assert_covers(communities: &[Members], vertex_count: usize) {
        let mut all: Vec<u32> = communities.iter().flatten().copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..vertex_count as u32).collect::<Vec<_>>());
        assert!(communities.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn test_two_cliques() {
        let g = two_cliques();
        let communities = get_communities(&g).unwrap();
        assert_covers(&communities, g.node_count());
        let expected: BTreeSet<BTreeSet<u32>> =
            vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]].iter().map(|c| c.iter().copied().collect()).collect();
        assert_eq!(as_sets(&communities), expected);
    }

    #[test]
    fn test_three_triangles() {
        let g = three_triangles();
        let detection = Louvain::new().run(g.graph()).unwrap();
        assert_covers(&detection.communities, 10);
        assert_eq!(detection.levels.len(), 1);
        let labeled: BTreeSet<BTreeSet<u32>> = detection
            .communities
            .iter()
            .map(|c| c.iter().map(|&v| *g.label(v).unwrap()).collect())
            .collect();
        let expected: BTreeSet<BTreeSet<u32>> = vec![vec![10], vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]
            .iter()
            .map(|c| c.iter().copied().collect())
            .collect();
        assert_eq!(labeled, expected);
        assert!(detection.modularity > 0.0);
    }

    #[test]
    fn test_fixed_point_returns_singletons() {
        let g = MultiGraph::from_edges(vec![(0, 0), (1, 1), (2, 2), (2, 2)].into_iter());
        assert!(!local_move(&g).unwrap().changed);
        let detection = Louvain::new().run(&g).unwrap();
        assert_eq!(detection.communities, vec![vec![0], vec![1], vec![2]]);
        assert!(detection.levels.is_empty());
    }

    #[test]
    fn test_max_levels() {
        let g = two_cliques();
        let detection = Louvain::new().with_max_levels(0).run(&g).unwrap();
        assert_eq!(detection.communities.len(), g.node_count());
        assert!(detection.levels.is_empty());

        let one = Louvain::new().with_max_levels(1).run(&g).unwrap();
        assert!(one.levels.len() <= 1);
        assert_covers(&one.communities, g.node_count());
    }

    #[test]
    fn test_detect_levels() {
        let g = two_cliques();
        let levels = Louvain::new().detect_levels(&g).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].communities.len(), 2);
        assert!(levels[0].modularity > 0.3);
    }

    #[test]
    fn test_no_edges() {
        let g = MultiGraph::with_nodes(4);
        assert_eq!(get_communities(&g), Err(LouvainError::InvalidGraph { vertex_count: 4 }));
        assert_eq!(
            Louvain::new().with_max_levels(0).run(&g),
            Err(LouvainError::InvalidGraph { vertex_count: 4 })
        );
    }

    #[test]
    fn test_levels_get_coarser() {
        let g = ring_of_cliques(6, 4);
        let detection = Louvain::new().run(&g).unwrap();
        let mut previous = g.node_count();
        for level in &detection.levels {
            assert_covers(&level.communities, g.node_count());
            assert!(level.communities.len() < previous);
            previous = level.communities.len();
        }
        assert_eq!(detection.communities.len(), previous);
        assert!(detection.levels.len() <= g.node_count());
    }

    #[test]
    fn test_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for round in 0..20 {
            let vertex_count = rng.gen_range(2..40u32);
            let edge_count = rng.gen_range(1..120);
            let mut g = MultiGraph::with_nodes(vertex_count as usize);
            for _ in 0..edge_count {
                g.insert_edge(rng.gen_range(0..vertex_count), rng.gen_range(0..vertex_count));
            }

            let detection = Louvain::new().run(&g).unwrap();
            assert_covers(&detection.communities, g.node_count());
            assert!(detection.levels.len() <= g.node_count(), "round {}", round);

            // The reported score is the score of the reported partition on the input graph.
            let partition = Partition::from_groups(g.node_count(), &detection.communities).unwrap();
            let q = modularity(&g, &partition).unwrap();
            assert!((q - detection.modularity).abs() < 1e-9, "round {}", round);
        }
    }

    fn ring_of_cliques(cliques: u32, size: u32) -> MultiGraph {
        let mut g = MultiGraph::new();
        for c in 0..cliques {
            let base = c * size;
            for i in 0..size {
                for j in (i + 1)..size {
                    g.insert_edge(base + i, base + j);
                }
            }
            g.insert_edge(base + size - 1, ((c + 1) % cliques) * size);
        }
        g
    }
}
