//! Provides a DFS visitor yielding the edges of a pattern.
//!
//! See [`EdgeDfs`] for details.

use crate::{Expr, FaninId, NodeId, PatternHandle, PatternKind, VarId};

/// Read access to a pattern graph, shared by the builder and the compiled snapshot.
pub trait PatternGraph {
    fn node_count(&self) -> usize;

    /// Variable of an input node, `None` for gates.
    fn input_var(&self, id: NodeId) -> Option<VarId>;

    /// Fanins of a gate, `None` for inputs.
    fn fanins(&self, id: NodeId) -> Option<[PatternHandle; 2]>;

    fn node_kind(&self, id: NodeId) -> PatternKind;

    /// The expression computed by `handle`, keeping the binary structure of the graph.
    fn handle_expr(&self, handle: PatternHandle) -> Expr {
        let id = handle.get_node_id();
        let expr = match (self.input_var(id), self.fanins(id)) {
            (Some(var), _) => Expr::posi_literal(var),
            (None, Some([fanin0, fanin1])) => {
                let operands = vec![self.handle_expr(fanin0), self.handle_expr(fanin1)];
                match self.node_kind(id) {
                    PatternKind::Xor => Expr::Xor(operands),
                    _ => Expr::And(operands),
                }
            }
            (None, None) => Expr::Zero,
        };
        if handle.get_inv() { !expr } else { expr }
    }
}

/// Edge of a gate: the gate and which of its fanins.
pub type Edge = (NodeId, FaninId);

enum Visit {
    Node(NodeId),
    Edge(NodeId, FaninId),
}

/// A DFS visitor yielding the fanin edges of the gates below a root.
///
/// For each gate reached for the first time, its fanin 0 edge is yielded, then the whole fanin 0
/// cone, then its fanin 1 edge and the fanin 1 cone. Inputs yield nothing but are tracked to
/// compute [`input_num`].
///
/// The visitation marks can be reused for another root with [`restart`], which is cheaper than
/// allocating a new visitor for each pattern of a large graph.
///
/// [`input_num`]: EdgeDfs::input_num
/// [`restart`]: EdgeDfs::restart
///
/// Example:
///
/// ```rust
/// use clibcomp::{PatternGraphBuilder, PatternHandle, PatternOp, dfs::EdgeDfs};
/// let mut builder = PatternGraphBuilder::new();
/// let a = PatternHandle::new(builder.make_input(0), false);
/// let b = PatternHandle::new(builder.make_input(1), false);
/// let root = builder.make_node(PatternOp::And, a, b);
/// let mut dfs = EdgeDfs::new(builder.node_num());
/// dfs.restart(root.get_node_id());
/// let mut edges = Vec::new();
/// while let Some(edge) = dfs.next(&builder) {
///     edges.push(edge);
/// }
/// assert_eq!(edges.len(), 2);
/// assert_eq!(dfs.input_num(), 2);
/// ```
///
/// Inspired by [petgraph DFS](https://docs.rs/petgraph/latest/petgraph/visit/struct.Dfs.html).
pub struct EdgeDfs {
    stack: Vec<Visit>,
    seen: Vec<bool>,
    /// Nodes marked since the last restart.
    touched: Vec<NodeId>,
    input_num: usize,
}

impl EdgeDfs {
    /// Creates a visitor for graphs of up to `node_num` nodes, with nothing to visit yet.
    pub fn new(node_num: usize) -> Self {
        EdgeDfs {
            stack: Vec::new(),
            seen: vec![false; node_num],
            touched: Vec::new(),
            input_num: 0,
        }
    }

    /// Clears the marks and starts again from `root`.
    pub fn restart(&mut self, root: NodeId) {
        for id in self.touched.drain(..) {
            self.seen[id] = false;
        }
        self.stack.clear();
        self.stack.push(Visit::Node(root));
        self.input_num = 0;
    }

    /// One plus the largest input variable reached so far, 0 if none.
    pub fn input_num(&self) -> usize {
        self.input_num
    }

    /// Yield the next edge of the DFS, or None if it is done.
    pub fn next(&mut self, graph: &impl PatternGraph) -> Option<Edge> {
        while let Some(visit) = self.stack.pop() {
            match visit {
                Visit::Edge(id, fanin_id) => return Some((id, fanin_id)),
                Visit::Node(id) => {
                    if let Some(var) = graph.input_var(id) {
                        self.input_num = self.input_num.max(var + 1);
                        continue;
                    }
                    if self.seen[id] {
                        continue;
                    }
                    self.seen[id] = true;
                    self.touched.push(id);
                    if let Some([fanin0, fanin1]) = graph.fanins(id) {
                        self.stack.push(Visit::Node(fanin1.get_node_id()));
                        self.stack.push(Visit::Edge(id, FaninId::Fanin1));
                        self.stack.push(Visit::Node(fanin0.get_node_id()));
                        self.stack.push(Visit::Edge(id, FaninId::Fanin0));
                    }
                }
            }
        }
        None
    }
}
