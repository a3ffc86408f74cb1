use fixedbitset::FixedBitSet;

use crate::error::Result;
use crate::types::{to_vint, vint_range, VInt};

/// Read-only topology accessor the detection core runs on.
///
/// Vertices are dense indices `0..node_count()`. Parallel edges and self-loops are counted
/// instance by instance everywhere, a self-loop contributes 2 to the degree.
pub trait GraphView {
    /// Number of vertices.
    fn node_count(&self) -> usize;

    /// Stable vertex enumeration of this graph instance.
    fn nodes(&self) -> impl Iterator<Item = VInt> + '_ {
        vint_range(self.node_count())
    }

    /// Total number of edge instances (m).
    fn edge_count(&self) -> usize;

    /// Every edge instance exactly once, in insertion order.
    fn edges(&self) -> impl Iterator<Item = (VInt, VInt)> + '_;

    /// Total incident edge multiplicity, self-loops counted twice.
    fn degree(&self, node: VInt) -> usize;

    /// Number of edge instances between `a` and `b`, `a == b` gives the self-loop count.
    fn multiplicity(&self, a: VInt, b: VInt) -> usize;

    /// Number of edge instances with both endpoints in `node_set`.
    fn induced_edge_count(&self, node_set: &[VInt]) -> usize;

    /// Distinct neighbors in first-seen order with the number of edge instances to each,
    /// including `node` itself when it has a self-loop.
    fn weighted_neighbors(&self, node: VInt) -> impl Iterator<Item = (VInt, usize)> + '_;

    /// Distinct neighbors in first-seen order, including `node` itself when it has a self-loop.
    fn neighbors(&self, node: VInt) -> impl Iterator<Item = VInt> + '_ {
        self.weighted_neighbors(node).map(|(n, _)| n)
    }

    /// Build a fresh multigraph with `node_count` vertices from edge instances.
    fn build_from_edges(node_count: usize, edges: impl IntoIterator<Item = (VInt, VInt)>) -> Self
    where
        Self: Sized;
}

/// Membership bitset of `node_set` over `node_count` vertices.
fn member_set(node_count: usize, node_set: &[VInt]) -> FixedBitSet {
    let mut inside = FixedBitSet::with_capacity(node_count);
    for &v in node_set {
        inside.insert(v as usize);
    }
    inside
}

/// Undirected multigraph over dense vertex ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiGraph {
    // Per vertex: (neighbor, number of parallel edges), in the order neighbors were first seen.
    pub(crate) adj_list: Vec<Vec<(VInt, usize)>>,
    pub(crate) degrees: Vec<usize>,
    // Every edge instance in insertion order.
    pub(crate) edge_list: Vec<(VInt, VInt)>,
}

impl MultiGraph {
    pub fn new() -> MultiGraph {
        // Create a new empty multigraph.
        MultiGraph::default()
    }

    pub fn with_nodes(node_count: usize) -> MultiGraph {
        MultiGraph {
            adj_list: vec![Vec::new(); node_count],
            degrees: vec![0; node_count],
            edge_list: Vec::new(),
        }
    }

    /// Build a multigraph from edge instances, the vertex set is `0..=max endpoint`.
    pub fn from_edges(edges_iter: impl Iterator<Item = (VInt, VInt)>) -> MultiGraph {
        let mut graph = MultiGraph::new();
        for (u, v) in edges_iter {
            graph.insert_edge(u, v);
        }
        graph
    }

    /// Append a new isolated vertex and return its id.
    pub fn insert_vertex(&mut self) -> Result<VInt> {
        let vertex = to_vint(self.adj_list.len())?;
        self.adj_list.push(Vec::new());
        self.degrees.push(0);
        Ok(vertex)
    }

    /// Add one edge instance, growing the vertex set when an endpoint is new.
    pub fn insert_edge(&mut self, u: VInt, v: VInt) {
        let needed = u.max(v) as usize + 1;
        if needed > self.adj_list.len() {
            self.adj_list.resize_with(needed, Vec::new);
            self.degrees.resize(needed, 0);
        }

        self.edge_list.push((u, v));
        Self::bump(&mut self.adj_list[u as usize], v);
        if u != v {
            Self::bump(&mut self.adj_list[v as usize], u);
        }
        // A self-loop adds two stubs to the same vertex.
        self.degrees[u as usize] += 1;
        self.degrees[v as usize] += 1;
    }

    #[inline]
    fn bump(neighbors: &mut Vec<(VInt, usize)>, target: VInt) {
        match neighbors.iter_mut().find(|(n, _)| *n == target) {
            Some((_, count)) => *count += 1,
            None => neighbors.push((target, 1)),
        }
    }

    #[inline]
    fn adjacency(&self, node: VInt) -> &[(VInt, usize)] {
        self.adj_list.get(node as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn self_loops(&self, node: VInt) -> usize {
        self.multiplicity(node, node)
    }

    pub fn print_graph(&self) {
        for (vertex, neighbors) in self.adj_list.iter().enumerate() {
            let rendered: Vec<String> = neighbors.iter().map(|(n, c)| format!("{}x{}", n, c)).collect();
            println!("{} -> [{}]", vertex, rendered.join(", "));
        }
    }
}

impl GraphView for MultiGraph {
    fn node_count(&self) -> usize {
        self.adj_list.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_list.len()
    }

    fn edges(&self) -> impl Iterator<Item = (VInt, VInt)> + '_ {
        self.edge_list.iter().copied()
    }

    fn degree(&self, node: VInt) -> usize {
        self.degrees.get(node as usize).copied().unwrap_or(0)
    }

    fn multiplicity(&self, a: VInt, b: VInt) -> usize {
        self.adjacency(a)
            .iter()
            .find(|(n, _)| *n == b)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    fn induced_edge_count(&self, node_set: &[VInt]) -> usize {
        let inside = member_set(self.node_count(), node_set);
        // Each inner edge is seen from both endpoints, a self-loop only once.
        let mut stubs = 0usize;
        for &v in node_set {
            for &(n, count) in self.adjacency(v) {
                if inside.contains(n as usize) {
                    stubs += if n == v { 2 * count } else { count };
                }
            }
        }
        stubs / 2
    }

    fn weighted_neighbors(&self, node: VInt) -> impl Iterator<Item = (VInt, usize)> + '_ {
        self.adjacency(node).iter().copied()
    }

    fn build_from_edges(node_count: usize, edges: impl IntoIterator<Item = (VInt, VInt)>) -> Self {
        let mut graph = MultiGraph::with_nodes(node_count);
        for (u, v) in edges {
            graph.insert_edge(u, v);
        }
        graph
    }
}
