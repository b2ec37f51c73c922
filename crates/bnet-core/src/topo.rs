//! Topological ordering over a [`Graph`].
//!
//! Two traversals are provided. Both walk successors in edge insertion order,
//! so their output is deterministic for a given construction sequence.
//!
//! - [`TopoSort::dfs`] pushes each vertex onto one LIFO stack after all of its
//!   successors are finished and drains the stack at the end. Parents always
//!   precede children. This is the order the network uses.
//! - [`TopoSort::bfs`] seeds a FIFO queue with every root and marks a vertex
//!   visited the first time any predecessor reaches it. A vertex whose parents
//!   sit at different depths (one reached through a longer path) can be emitted
//!   before that parent. It is kept as a level-order view of the graph and
//!   must not drive sampling.

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

/// Traversal state for one graph. Borrowed, never mutates the graph.
pub struct TopoSort<'g, V> {
    graph: &'g Graph<V>,
}

/// Visited marks by vertex position, shared across single-source calls.
#[derive(Clone, Debug, Default)]
pub struct Visited(Vec<bool>);

impl Visited {
    pub fn for_graph<V>(graph: &Graph<V>) -> Self
    where
        V: Clone + Eq + Hash + Debug,
    {
        Self(vec![false; graph.len()])
    }

    fn mark(&mut self, pos: usize) -> bool {
        if pos >= self.0.len() {
            self.0.resize(pos + 1, false);
        }
        !std::mem::replace(&mut self.0[pos], true)
    }

    fn is_marked(&self, pos: usize) -> bool {
        self.0.get(pos).copied().unwrap_or(false)
    }
}

impl<'g, V> TopoSort<'g, V>
where
    V: Clone + Eq + Hash + Debug,
{
    pub fn new(graph: &'g Graph<V>) -> Self {
        Self { graph }
    }

    fn require_directed(&self) -> GraphResult<()> {
        if self.graph.is_directed() {
            Ok(())
        } else {
            Err(GraphError::Undirected)
        }
    }

    /// Depth-first topological order over the whole graph.
    pub fn dfs(&self) -> GraphResult<Vec<V>> {
        self.require_directed()?;
        let mut visited = Visited::for_graph(self.graph);
        let mut stack = Vec::with_capacity(self.graph.len());
        for root in self.graph.zero_in_degree_vertices() {
            let pos = self.graph.position(root)?;
            if visited.mark(pos) {
                self.finish(pos, &mut visited, &mut stack);
            }
        }
        Ok(self.drain(stack))
    }

    /// Depth-first order of everything reachable from `start` that is not
    /// already in `visited`.
    pub fn dfs_from(&self, start: &V, visited: &mut Visited) -> GraphResult<Vec<V>> {
        self.require_directed()?;
        let pos = self.graph.position(start)?;
        let mut stack = Vec::new();
        if visited.mark(pos) {
            self.finish(pos, visited, &mut stack);
        }
        Ok(self.drain(stack))
    }

    fn finish(&self, pos: usize, visited: &mut Visited, stack: &mut Vec<usize>) {
        for &next in self.graph.successor_positions(pos) {
            if visited.mark(next) {
                self.finish(next, visited, stack);
            }
        }
        stack.push(pos);
    }

    fn drain(&self, mut stack: Vec<usize>) -> Vec<V> {
        let mut order = Vec::with_capacity(stack.len());
        while let Some(pos) = stack.pop() {
            order.push(self.graph.vertex_at(pos).clone());
        }
        order
    }

    /// Breadth-first level order over the whole graph. See the module docs
    /// for why this is not a topological order on irregular graphs.
    pub fn bfs(&self) -> GraphResult<Vec<V>> {
        self.require_directed()?;
        let mut visited = Visited::for_graph(self.graph);
        let mut queue = VecDeque::new();
        for root in self.graph.zero_in_degree_vertices() {
            let pos = self.graph.position(root)?;
            if visited.mark(pos) {
                queue.push_back(pos);
            }
        }
        Ok(self.sweep(queue, &mut visited))
    }

    /// Breadth-first order from a single start vertex.
    pub fn bfs_from(&self, start: &V, visited: &mut Visited) -> GraphResult<Vec<V>> {
        self.require_directed()?;
        let pos = self.graph.position(start)?;
        if visited.is_marked(pos) {
            return Ok(Vec::new());
        }
        visited.mark(pos);
        Ok(self.sweep(VecDeque::from([pos]), visited))
    }

    fn sweep(&self, mut queue: VecDeque<usize>, visited: &mut Visited) -> Vec<V> {
        let mut order = Vec::new();
        while let Some(pos) = queue.pop_front() {
            for &next in self.graph.successor_positions(pos) {
                if visited.mark(next) {
                    queue.push_back(next);
                }
            }
            order.push(self.graph.vertex_at(pos).clone());
        }
        order
    }
}

/// True when every edge of `graph` points forward in `order`.
pub fn is_topological<V>(graph: &Graph<V>, order: &[V]) -> bool
where
    V: Clone + Eq + Hash + Debug,
{
    let rank: std::collections::HashMap<&V, usize> =
        order.iter().enumerate().map(|(i, v)| (v, i)).collect();
    order.len() == graph.len()
        && graph
            .edges()
            .all(|(p, c)| matches!((rank.get(p), rank.get(c)), (Some(a), Some(b)) if a < b))
}
