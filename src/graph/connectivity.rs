//! Connected-component analysis
//!
//! Iterative depth-first traversal with an explicit stack; spruce-scale
//! components are far too deep for the call stack.

use crate::graph::store::OverlapGraph;

/// Component sizes in discovery order: vertices are scanned in ascending id
/// order and each unvisited one seeds a new component.
///
/// The visited check happens on pop, not on push, so a vertex may sit on the
/// stack more than once; duplicates are discarded cheaply when popped and
/// each vertex is counted exactly once. Sizes always sum to the vertex count.
pub fn connected_components(graph: &OverlapGraph) -> Vec<usize> {
    let mut components = Vec::new();
    let mut visited = vec![false; graph.num_vertices()];
    let mut stack: Vec<u32> = Vec::new();

    for start in 0..graph.num_vertices() as u32 {
        if visited[start as usize] {
            continue;
        }
        let mut size = 0usize;
        stack.push(start);
        while let Some(v) = stack.pop() {
            if visited[v as usize] {
                continue;
            }
            visited[v as usize] = true;
            size += 1;
            for &adjacent in graph.neighbors(v) {
                if !visited[adjacent as usize] {
                    stack.push(adjacent);
                }
            }
        }
        components.push(size);
    }
    components
}
