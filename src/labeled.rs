use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, bail, Context};

use crate::config::READ_BUFFER_SIZE;
use crate::error::Result;
use crate::graph::MultiGraph;
use crate::louvain::{Detection, Louvain};
use crate::types::{Members, VInt};

/// A multigraph whose vertices carry external labels.
///
/// Labels are translated to dense vertex ids on ingestion, in first-seen order, and back when
/// communities are reported.
#[derive(Debug, Clone)]
pub struct LabeledGraph<L> {
    graph: MultiGraph,
    labels: Vec<L>,
    index: HashMap<L, VInt>,
}

impl<L: Clone + Eq + Hash> Default for LabeledGraph<L> {
    fn default() -> Self {
        LabeledGraph {
            graph: MultiGraph::new(),
            labels: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<L: Clone + Eq + Hash> LabeledGraph<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vertex id of `label`, creating the vertex on first sight. Fails once the vertex ids
    /// are used up.
    pub fn add_node(&mut self, label: L) -> Result<VInt> {
        if let Some(&vertex) = self.index.get(&label) {
            return Ok(vertex);
        }
        let vertex = self.graph.insert_vertex()?;
        self.labels.push(label.clone());
        self.index.insert(label, vertex);
        Ok(vertex)
    }

    /// Add one edge instance between two labels; a repeated call adds a parallel edge.
    pub fn insert_edge(&mut self, a: L, b: L) -> Result<()> {
        let u = self.add_node(a)?;
        let v = self.add_node(b)?;
        self.graph.insert_edge(u, v);
        Ok(())
    }

    pub fn from_edges(edges: impl IntoIterator<Item = (L, L)>) -> Result<Self> {
        let mut labeled = Self::new();
        for (a, b) in edges {
            labeled.insert_edge(a, b)?;
        }
        Ok(labeled)
    }

    /// Build from an adjacency listing. All keys become vertices first, in order. An edge listed
    /// from both of its endpoints is added once.
    pub fn from_adjacency(adjacency: impl IntoIterator<Item = (L, Vec<L>)>) -> Result<Self> {
        let adjacency: Vec<(L, Vec<L>)> = adjacency.into_iter().collect();
        let mut labeled = Self::new();
        for (label, _) in &adjacency {
            labeled.add_node(label.clone())?;
        }
        let mut seen: HashSet<L> = HashSet::new();
        for (label, neighbors) in adjacency {
            for neighbor in neighbors {
                if !seen.contains(&neighbor) {
                    labeled.insert_edge(label.clone(), neighbor)?;
                }
            }
            seen.insert(label);
        }
        Ok(labeled)
    }

    pub fn graph(&self) -> &MultiGraph {
        &self.graph
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn label(&self, vertex: VInt) -> Option<&L> {
        self.labels.get(vertex as usize)
    }

    pub fn vertex_of(&self, label: &L) -> Option<VInt> {
        self.index.get(label).copied()
    }

    /// Replace vertex ids by their labels.
    pub fn translate(&self, groups: &[Members]) -> Vec<Vec<L>> {
        groups
            .iter()
            .map(|group| group.iter().map(|&v| self.labels[v as usize].clone()).collect())
            .collect()
    }

    /// Communities with the default settings, as groups of labels.
    pub fn communities(&self) -> Result<Vec<Vec<L>>> {
        self.communities_with(&Louvain::new())
    }

    pub fn communities_with(&self, louvain: &Louvain) -> Result<Vec<Vec<L>>> {
        let communities = louvain.detect(&self.graph)?;
        Ok(self.translate(&communities))
    }

    /// Full run, vertex ids left as they are; use [`LabeledGraph::translate`] on the groups.
    pub fn run(&self, louvain: &Louvain) -> Result<Detection> {
        louvain.run(&self.graph)
    }
}

impl LabeledGraph<String> {
    /// Load a whitespace separated edge list, one `u v` pair per line.
    ///
    /// A line with a single label declares an isolated vertex, columns after the second are
    /// ignored, blank lines and lines starting with `#` or `%` are skipped.
    pub fn from_txt_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let graph_file = File::open(path)
            .with_context(|| format!("failed to open graph file {}", path.display()))?;
        Self::from_txt_reader(BufReader::with_capacity(READ_BUFFER_SIZE, graph_file))
            .with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn from_txt_reader(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut labeled = Self::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read line {}", line_no + 1))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let Some(u) = tokens.next() else {
                continue;
            };
            let added = match tokens.next() {
                Some(v) => labeled.insert_edge(u.to_owned(), v.to_owned()),
                None => labeled.add_node(u.to_owned()).map(|_| ()),
            };
            added.with_context(|| format!("line {}", line_no + 1))?;
        }
        Ok(labeled)
    }
}

impl LabeledGraph<u32> {
    /// Load a `.graph` file: a header line, then `v <id> <label> ...` vertex lines and
    /// `e <src> <dst>` edge lines. Every edge line is one undirected edge.
    pub fn from_graph_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let graph_file = File::open(path)
            .with_context(|| format!("failed to open graph file {}", path.display()))?;
        Self::from_graph_reader(BufReader::with_capacity(READ_BUFFER_SIZE, graph_file))
            .with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn from_graph_reader(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut labeled = Self::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read line {}", line_no + 1))?;
            if line_no == 0 {
                // The first line is the header, just skip it.
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let parse = |index: usize| -> anyhow::Result<u32> {
                let token = tokens
                    .get(index)
                    .ok_or_else(|| anyhow!("line {}: missing field {}", line_no + 1, index))?;
                token
                    .parse()
                    .with_context(|| format!("line {}: invalid vertex id {:?}", line_no + 1, token))
            };
            match tokens.first() {
                None => continue,
                Some(&"v") => {
                    labeled
                        .add_node(parse(1)?)
                        .with_context(|| format!("line {}", line_no + 1))?;
                }
                Some(&"e") => {
                    let (src, dst) = (parse(1)?, parse(2)?);
                    for id in [src, dst] {
                        if labeled.vertex_of(&id).is_none() {
                            bail!("line {}: edge uses undeclared vertex {}", line_no + 1, id);
                        }
                    }
                    labeled
                        .insert_edge(src, dst)
                        .with_context(|| format!("line {}", line_no + 1))?;
                }
                Some(other) => bail!("line {}: unknown record {:?}", line_no + 1, other),
            }
        }
        Ok(labeled)
    }
}
