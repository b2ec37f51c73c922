use crate::error::{GraphError, GraphResult};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Unweighted adjacency structure over vertex identities.
///
/// Vertices are kept in insertion order and adjacency lists in edge insertion
/// order, so every traversal over the graph is deterministic. Acyclicity is a
/// precondition of the callers, not something the graph checks.
#[derive(Clone, Debug)]
pub struct Graph<V> {
    directed: bool,
    vertices: Vec<V>,
    index: HashMap<V, usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
    out_degree: Vec<usize>,
}

impl<V> Default for Graph<V>
where
    V: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Graph<V>
where
    V: Clone + Eq + Hash + Debug,
{
    /// Empty directed graph.
    pub fn new() -> Self {
        Self::with_direction(true)
    }

    /// Empty undirected graph; every edge is mirrored.
    pub fn undirected() -> Self {
        Self::with_direction(false)
    }

    fn with_direction(directed: bool) -> Self {
        Self {
            directed,
            vertices: Vec::new(),
            index: HashMap::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
            in_degree: Vec::new(),
            out_degree: Vec::new(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, v: &V) -> bool {
        self.index.contains_key(v)
    }

    /// Insert a vertex if absent and return its position.
    pub fn add_vertex(&mut self, v: V) -> usize {
        if let Some(&pos) = self.index.get(&v) {
            return pos;
        }
        let pos = self.vertices.len();
        self.index.insert(v.clone(), pos);
        self.vertices.push(v);
        self.successors.push(Vec::new());
        self.predecessors.push(Vec::new());
        self.in_degree.push(0);
        self.out_degree.push(0);
        pos
    }

    /// Insert the edge `parent -> child`, adding missing vertices.
    ///
    /// Returns `true` when the ordered pair was not present before. Degree
    /// counters only move on first insertion.
    pub fn add_edge(&mut self, parent: V, child: V) -> bool {
        let p = self.add_vertex(parent);
        let c = self.add_vertex(child);
        let inserted = self.link(p, c);
        if !self.directed && p != c {
            self.link(c, p);
        }
        inserted
    }

    fn link(&mut self, p: usize, c: usize) -> bool {
        if self.successors[p].contains(&c) {
            return false;
        }
        self.successors[p].push(c);
        self.predecessors[c].push(p);
        self.out_degree[p] += 1;
        self.in_degree[c] += 1;
        true
    }

    /// Remove the edge `parent -> child`. Returns whether an edge was removed.
    pub fn remove_edge(&mut self, parent: &V, child: &V) -> GraphResult<bool> {
        let p = self.position(parent)?;
        let c = self.position(child)?;
        let removed = self.unlink(p, c);
        if !self.directed && p != c {
            self.unlink(c, p);
        }
        Ok(removed)
    }

    fn unlink(&mut self, p: usize, c: usize) -> bool {
        let Some(at) = self.successors[p].iter().position(|&s| s == c) else {
            return false;
        };
        self.successors[p].remove(at);
        self.predecessors[c].retain(|&q| q != p);
        self.out_degree[p] -= 1;
        self.in_degree[c] -= 1;
        true
    }

    pub fn has_edge(&self, parent: &V, child: &V) -> GraphResult<bool> {
        let p = self.position(parent)?;
        let c = self.position(child)?;
        Ok(self.successors[p].contains(&c))
    }

    pub(crate) fn position(&self, v: &V) -> GraphResult<usize> {
        self.index
            .get(v)
            .copied()
            .ok_or_else(|| GraphError::VertexNotFound(format!("{v:?}")))
    }

    pub(crate) fn vertex_at(&self, pos: usize) -> &V {
        &self.vertices[pos]
    }

    pub(crate) fn successor_positions(&self, pos: usize) -> &[usize] {
        &self.successors[pos]
    }

    /// Direct successors of `v` in edge insertion order.
    pub fn successors(&self, v: &V) -> GraphResult<impl Iterator<Item = &V> + '_> {
        let pos = self.position(v)?;
        Ok(self.successors[pos].iter().map(move |&s| &self.vertices[s]))
    }

    /// Direct predecessors of `v` in edge insertion order.
    pub fn predecessors(&self, v: &V) -> GraphResult<impl Iterator<Item = &V> + '_> {
        let pos = self.position(v)?;
        Ok(self.predecessors[pos].iter().map(move |&p| &self.vertices[p]))
    }

    pub fn in_degree(&self, v: &V) -> GraphResult<usize> {
        Ok(self.in_degree[self.position(v)?])
    }

    pub fn out_degree(&self, v: &V) -> GraphResult<usize> {
        Ok(self.out_degree[self.position(v)?])
    }

    /// Vertices without incoming edges, in insertion order.
    pub fn zero_in_degree_vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices
            .iter()
            .zip(&self.in_degree)
            .filter(|(_, &d)| d == 0)
            .map(|(v, _)| v)
    }

    /// Vertices without outgoing edges, in insertion order.
    pub fn zero_out_degree_vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.vertices
            .iter()
            .zip(&self.out_degree)
            .filter(|(_, &d)| d == 0)
            .map(|(v, _)| v)
    }

    /// All vertices in insertion order.
    pub fn vertex_set(&self) -> &[V] {
        &self.vertices
    }

    /// All stored ordered pairs. Undirected graphs report both directions.
    pub fn edges(&self) -> impl Iterator<Item = (&V, &V)> + '_ {
        self.successors.iter().enumerate().flat_map(move |(p, succ)| {
            succ.iter()
                .map(move |&c| (&self.vertices[p], &self.vertices[c]))
        })
    }

    /// Copy of the graph with every edge reversed.
    pub fn reversed(&self) -> Self {
        let mut out = Self::with_direction(self.directed);
        for v in &self.vertices {
            out.add_vertex(v.clone());
        }
        for (p, c) in self.edges() {
            out.add_edge(c.clone(), p.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Graph<&'static str> {
        let mut g = Graph::new();
        g.add_edge("D", "G");
        g.add_edge("I", "G");
        g.add_edge("I", "S");
        g.add_edge("G", "L");
        g
    }

    fn degrees_consistent(g: &Graph<&'static str>) -> bool {
        g.vertex_set().iter().all(|v| {
            g.in_degree(v).unwrap() == g.predecessors(v).unwrap().count()
                && g.out_degree(v).unwrap() == g.successors(v).unwrap().count()
        })
    }

    #[test]
    fn test_degrees_track_edges() {
        let g = student();
        assert_eq!(g.len(), 5);
        assert_eq!(g.in_degree(&"G").unwrap(), 2);
        assert_eq!(g.out_degree(&"I").unwrap(), 2);
        assert_eq!(g.in_degree(&"D").unwrap(), 0);
        assert!(degrees_consistent(&g));
    }

    #[test]
    fn test_duplicate_edge_counts_once() {
        let mut g = student();
        assert!(!g.add_edge("D", "G"));
        assert_eq!(g.in_degree(&"G").unwrap(), 2);
        assert_eq!(g.out_degree(&"D").unwrap(), 1);
        assert!(degrees_consistent(&g));
    }

    #[test]
    fn test_successor_order_is_insertion_order() {
        let mut g = Graph::new();
        g.add_edge("A", "Z");
        g.add_edge("A", "B");
        g.add_edge("A", "M");
        let succ: Vec<_> = g.successors(&"A").unwrap().copied().collect();
        assert_eq!(succ, vec!["Z", "B", "M"]);
    }

    #[test]
    fn test_zero_in_degree() {
        let g = student();
        let roots: Vec<_> = g.zero_in_degree_vertices().copied().collect();
        assert_eq!(roots, vec!["D", "I"]);
        let leaves: Vec<_> = g.zero_out_degree_vertices().copied().collect();
        assert_eq!(leaves, vec!["S", "L"]);
    }

    #[test]
    fn test_unknown_vertex() {
        let g = student();
        assert!(matches!(
            g.successors(&"X"),
            Err(GraphError::VertexNotFound(_))
        ));
        assert!(g.predecessors(&"X").is_err());
        assert!(g.in_degree(&"X").is_err());
    }

    #[test]
    fn test_remove_edge() {
        let mut g = student();
        assert!(g.remove_edge(&"I", &"G").unwrap());
        assert!(!g.remove_edge(&"I", &"G").unwrap());
        assert_eq!(g.in_degree(&"G").unwrap(), 1);
        assert!(!g.has_edge(&"I", &"G").unwrap());
        assert!(degrees_consistent(&g));
    }

    #[test]
    fn test_reversed() {
        let r = student().reversed();
        assert!(r.has_edge(&"L", &"G").unwrap());
        assert!(r.has_edge(&"G", &"D").unwrap());
        assert_eq!(r.edges().count(), 4);
        let roots: Vec<_> = r.zero_in_degree_vertices().copied().collect();
        assert_eq!(roots, vec!["S", "L"]);
    }

    #[test]
    fn test_undirected_mirrors() {
        let mut g = Graph::undirected();
        g.add_edge(1, 2);
        assert!(!g.is_directed());
        assert!(g.has_edge(&2, &1).unwrap());
        assert_eq!(g.in_degree(&1).unwrap(), 1);
        assert_eq!(g.edges().count(), 2);
    }
}
