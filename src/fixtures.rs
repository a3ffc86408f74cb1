use crate::graph::MultiGraph;
use crate::labeled::LabeledGraph;

/// Three triangles 1-2-3, 4-5-6, 7-8-9 attached to hub 10.
pub(crate) fn three_triangles() -> LabeledGraph<u32> {
    LabeledGraph::from_adjacency(vec![
        (1, vec![2, 3, 10]),
        (2, vec![1, 3]),
        (3, vec![1, 2]),
        (4, vec![5, 6, 10]),
        (5, vec![4, 6]),
        (6, vec![4, 5]),
        (7, vec![8, 9, 10]),
        (8, vec![7, 9]),
        (9, vec![7, 8]),
        (10, vec![1, 4, 7]),
    ])
    .unwrap()
}

/// Two 4-cliques {0..3} and {4..7} joined by the bridge 3-4.
pub(crate) fn two_cliques() -> MultiGraph {
    let mut g = MultiGraph::new();
    for base in [0u32, 4] {
        for i in 0..4 {
            for j in (i + 1)..4 {
                g.insert_edge(base + i, base + j);
            }
        }
    }
    g.insert_edge(3, 4);
    g
}
