//! Undirected overlap graph
//!
//! Adjacency-list multigraph over the dense vertex ids `0..V` produced by the
//! identifier index. The vertex count is fixed at construction; edges are
//! appended during the build phase and the structure is read-only afterwards.
//!
//! Parallel edges and self-loops are deliberately preserved: the corpus can
//! report the same contig pair more than once (and symmetrically), and degree
//! and edge counts are expected to reflect that raw multiplicity.

use ahash::AHashMap;

/// Fixed-vertex-count undirected multigraph.
#[derive(Debug, Clone)]
pub struct OverlapGraph {
    adjacency: Vec<Vec<u32>>,
}

impl OverlapGraph {
    /// Allocate `vertex_count` empty adjacency lists. The vertex count is
    /// immutable for the lifetime of the graph.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
        }
    }

    /// Append `v` to `u`'s adjacency list and `u` to `v`'s.
    ///
    /// Both endpoints must be valid vertex ids; the identifier index
    /// guarantees that for edges built from indexed shards, so an
    /// out-of-range id here is a caller bug and panics.
    pub fn add_edge(&mut self, u: u32, v: u32) {
        self.adjacency[u as usize].push(v);
        self.adjacency[v as usize].push(u);
    }

    pub fn num_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Total edge count. Every insertion appends one entry to each endpoint,
    /// so the degree sum is exactly twice the edge count. O(V), uncached.
    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Neighbors of `v`, with multiplicity, in insertion order.
    pub fn neighbors(&self, v: u32) -> &[u32] {
        &self.adjacency[v as usize]
    }

    pub fn degree(&self, v: u32) -> usize {
        self.adjacency[v as usize].len()
    }

    /// Histogram mapping degree value to the number of vertices with that
    /// degree. Isolated vertices contribute to the 0 bucket.
    pub fn degree_distribution(&self) -> AHashMap<usize, usize> {
        let mut histogram = AHashMap::new();
        for adj in &self.adjacency {
            *histogram.entry(adj.len()).or_insert(0) += 1;
        }
        histogram
    }
}
