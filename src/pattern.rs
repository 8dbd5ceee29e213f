//! Module defining the [`PatternGraphBuilder`], as well as [`PatternNode`], [`PatternHandle`] and
//! some other relevant structs.
//!
//! The builder owns a single hash-consed DAG of two-input AND/XOR nodes shared by every pattern.
//! Registering an expression for a class enumerates all the binary factorizations of that
//! expression into the DAG; each factorization root becomes a [`PatternRecord`].

pub mod edge;
pub mod isomorphic;
pub mod node;
pub mod shape;

use std::collections::HashMap;

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

pub use edge::{FaninId, PatternHandle};
pub use node::{NodeId, PatternKind, PatternNode};

use crate::{
    ClassId, Expr, VarId,
    dfs::PatternGraph,
    enumerate::{MultiCombination, MultisetPermutation, Partition},
};
use isomorphic::expr_equivalent;
use shape::{MAX_LEAVES, ShapeToken};

/// Initial bucket count of the structural hash index.
const INITIAL_BUCKETS: usize = 1024;

/// Operators accepted by [`PatternGraphBuilder::make_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOp {
    And,
    /// Stored as an AND with inverted fanins and output.
    Or,
    Xor,
}

/// One factorization kept for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatternRecord {
    pub root: PatternHandle,
    pub class_id: ClassId,
}

/// What [`PatternGraphBuilder::register_expression`] did with an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// New patterns were added (possibly zero if they all existed for the class already).
    Registered(usize),
    /// A structurally equivalent expression was already registered for this class.
    Duplicate,
    /// The expression has constants or an operator with too many operands.
    Unsupported,
}

/// Structural hash key of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey {
    kind: PatternKind,
    fanin0: PatternHandle,
    fanin1: PatternHandle,
}

impl NodeKey {
    fn of(node: &PatternNode) -> Option<Self> {
        let [fanin0, fanin1] = node.get_fanins()?;
        Some(NodeKey {
            kind: node.kind(),
            fanin0,
            fanin1,
        })
    }
}

/// No constants and no operator with less than two operands.
fn is_factorizable(expr: &Expr) -> bool {
    match expr {
        Expr::Zero | Expr::One => false,
        Expr::Literal { .. } => true,
        _ => expr.operands().len() >= 2 && expr.operands().iter().all(is_factorizable),
    }
}

/// Builder of the shared pattern graph.
///
/// ```rust
/// use clibcomp::{Expr, PatternGraphBuilder, RegisterOutcome};
/// let mut builder = PatternGraphBuilder::new();
/// let f = Expr::posi_literal(0) & Expr::posi_literal(1) & Expr::posi_literal(2);
/// assert_eq!(builder.register_expression(&f, 0), RegisterOutcome::Registered(1));
/// assert_eq!(builder.register_expression(&f, 0), RegisterOutcome::Duplicate);
/// ```
#[derive(Debug, Clone)]
pub struct PatternGraphBuilder {
    /// Input node of each variable, dense from variable 0.
    inputs: Vec<NodeId>,
    /// All nodes, `nodes[id]` has id `id`.
    nodes: Vec<PatternNode>,
    index: FxHashMap<NodeKey, NodeId>,
    bucket_num: usize,
    /// The index is rebuilt with twice the buckets once it holds more gates than this.
    next_limit: usize,
    patterns: Vec<PatternRecord>,
    /// Same records as `patterns`, for lookup.
    pattern_set: FxHashSet<PatternRecord>,
    exprs: HashMap<ClassId, Vec<Expr>>,
    max_fanin: usize,
}

impl Default for PatternGraphBuilder {
    fn default() -> Self {
        PatternGraphBuilder::new()
    }
}

fn load_limit(bucket_num: usize) -> usize {
    bucket_num * 18 / 10
}

impl PatternGraphBuilder {
    pub fn new() -> Self {
        PatternGraphBuilder::with_max_fanin(MAX_LEAVES)
    }

    /// A builder skipping expressions with an operator of more than `max_fanin` operands
    /// (clamped to `2..=8`).
    pub fn with_max_fanin(max_fanin: usize) -> Self {
        PatternGraphBuilder {
            inputs: Vec::new(),
            nodes: Vec::new(),
            index: FxHashMap::with_capacity_and_hasher(INITIAL_BUCKETS, Default::default()),
            bucket_num: INITIAL_BUCKETS,
            next_limit: load_limit(INITIAL_BUCKETS),
            patterns: Vec::new(),
            pattern_set: FxHashSet::default(),
            exprs: HashMap::new(),
            max_fanin: max_fanin.clamp(2, MAX_LEAVES),
        }
    }

    /// Retrieves a node from its id.
    pub fn get_node(&self, id: NodeId) -> Option<&PatternNode> {
        self.nodes.get(id)
    }

    /// All nodes, in creation order.
    pub fn get_nodes(&self) -> &[PatternNode] {
        &self.nodes
    }

    pub fn node_num(&self) -> usize {
        self.nodes.len()
    }

    /// Number of input nodes, which is also one plus the largest variable seen.
    pub fn input_num(&self) -> usize {
        self.inputs.len()
    }

    /// Input node of variable `var`, if it was created.
    pub fn get_input_node(&self, var: VarId) -> Option<NodeId> {
        self.inputs.get(var).copied()
    }

    pub fn get_patterns(&self) -> &[PatternRecord] {
        &self.patterns
    }

    pub fn pattern_num(&self) -> usize {
        self.patterns.len()
    }

    /// Number of patterns kept for `class_id`.
    pub fn class_pattern_num(&self, class_id: ClassId) -> usize {
        self.patterns
            .iter()
            .filter(|p| p.class_id == class_id)
            .count()
    }

    /// Expressions registered so far for `class_id`.
    pub fn get_expressions(&self, class_id: ClassId) -> &[Expr] {
        self.exprs.get(&class_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the input node of `var`.
    ///
    /// Input nodes are created densely: asking for `var` also creates the input nodes of every
    /// smaller variable not seen yet.
    pub fn make_input(&mut self, var: VarId) -> NodeId {
        while self.inputs.len() <= var {
            let id = self.nodes.len();
            self.nodes.push(PatternNode::Input {
                id,
                var: self.inputs.len(),
            });
            self.inputs.push(id);
        }
        self.inputs[var]
    }

    /// Returns the gate `op(left, right)`, creating it unless a structurally equal one exists.
    ///
    /// OR is turned into AND by De Morgan. XOR fanin inversions are moved to the output.
    /// Fanins are not reordered: `make_node(And, a, b)` and `make_node(And, b, a)` are two nodes.
    pub fn make_node(&mut self, op: PatternOp, left: PatternHandle, right: PatternHandle) -> PatternHandle {
        let (key, inv) = match op {
            PatternOp::And => (
                NodeKey {
                    kind: PatternKind::And,
                    fanin0: left,
                    fanin1: right,
                },
                false,
            ),
            PatternOp::Or => (
                NodeKey {
                    kind: PatternKind::And,
                    fanin0: !left,
                    fanin1: !right,
                },
                true,
            ),
            PatternOp::Xor => (
                NodeKey {
                    kind: PatternKind::Xor,
                    fanin0: left.regular(),
                    fanin1: right.regular(),
                },
                left.inv ^ right.inv,
            ),
        };
        if let Some(&id) = self.index.get(&key) {
            return PatternHandle::new(id, inv);
        }

        let id = self.nodes.len();
        self.nodes.push(match key.kind {
            PatternKind::Xor => PatternNode::Xor {
                id,
                fanin0: key.fanin0,
                fanin1: key.fanin1,
            },
            _ => PatternNode::And {
                id,
                fanin0: key.fanin0,
                fanin1: key.fanin1,
            },
        });
        self.index.insert(key, id);
        if self.index.len() > self.next_limit {
            self.bucket_num *= 2;
            self.next_limit = load_limit(self.bucket_num);
            self.rebuild_index();
        }
        PatternHandle::new(id, inv)
    }

    fn rebuild_index(&mut self) {
        let mut index = FxHashMap::with_capacity_and_hasher(self.bucket_num, Default::default());
        for node in &self.nodes {
            if let Some(key) = NodeKey::of(node) {
                index.insert(key, node.get_id());
            }
        }
        self.index = index;
    }

    /// Adds every binary factorization of `expr` to the patterns of `class_id`.
    ///
    /// Nothing is done if an equivalent expression (same structure up to the order of operands)
    /// was registered for `class_id` before, or if the expression cannot be factorized
    /// (constants, operators with less than 2 or more than the maximum number of operands).
    pub fn register_expression(&mut self, expr: &Expr, class_id: ClassId) -> RegisterOutcome {
        if !self.is_supported(expr) {
            return RegisterOutcome::Unsupported;
        }
        let known = self.exprs.entry(class_id).or_default();
        if known.iter().any(|e| expr_equivalent(e, expr)) {
            return RegisterOutcome::Duplicate;
        }
        known.push(expr.clone());

        let mut added = 0;
        for root in self.enumerate(expr) {
            let record = PatternRecord { root, class_id };
            if self.pattern_set.insert(record) {
                self.patterns.push(record);
                added += 1;
            }
        }
        trace!("class {class_id}: {added} patterns for {expr:?}");
        RegisterOutcome::Registered(added)
    }

    fn is_supported(&self, expr: &Expr) -> bool {
        expr.max_fanin() <= self.max_fanin && is_factorizable(expr)
    }

    /// All distinct factorizations of `expr`.
    fn enumerate(&mut self, expr: &Expr) -> Vec<PatternHandle> {
        let op = match expr {
            Expr::Literal { var, inv } => {
                return vec![PatternHandle::new(self.make_input(*var), *inv)];
            }
            Expr::And(_) => PatternOp::And,
            Expr::Or(_) => PatternOp::Or,
            Expr::Xor(_) => PatternOp::Xor,
            Expr::Zero | Expr::One => return Vec::new(),
        };
        let operands = expr.operands();
        let n = operands.len();
        let variants: Vec<Vec<PatternHandle>> =
            operands.iter().map(|e| self.enumerate(e)).collect();
        let sizes: Vec<usize> = variants.iter().map(Vec::len).collect();

        let mut list = Vec::new();
        for choice in MultiCombination::new(&sizes) {
            let chosen: Vec<PatternHandle> = choice
                .iter()
                .enumerate()
                .map(|(i, &k)| variants[i][k])
                .collect();

            // Isomorphic operands are interchangeable, only their label order matters.
            let mut partition = Partition::new(n);
            for a in 1..n {
                for b in 0..a {
                    if !partition.same(a, b) && self.is_isomorphic(chosen[a], chosen[b]) {
                        partition.merge(a, b);
                    }
                }
            }
            let groups = partition.groups();
            let counts: Vec<usize> = groups.iter().map(Vec::len).collect();

            for labels in MultisetPermutation::new(&counts) {
                let mut next = vec![0; groups.len()];
                let leaves: Vec<PatternHandle> = labels
                    .iter()
                    .map(|&g| {
                        let leaf = chosen[groups[g][next[g]]];
                        next[g] += 1;
                        leaf
                    })
                    .collect();
                for tree in shape::shapes(n) {
                    let mut pos = 0;
                    let root = self.build_tree(op, &leaves, tree, &mut pos);
                    if !list.contains(&root) {
                        list.push(root);
                    }
                }
            }
        }
        list
    }

    /// Builds the tree described by `tree[*pos..]` bottom-up.
    fn build_tree(
        &mut self,
        op: PatternOp,
        leaves: &[PatternHandle],
        tree: &[ShapeToken],
        pos: &mut usize,
    ) -> PatternHandle {
        let token = tree[*pos];
        *pos += 1;
        match token {
            ShapeToken::Leaf(i) => leaves[i],
            ShapeToken::Op => {
                let left = self.build_tree(op, leaves, tree, pos);
                let right = self.build_tree(op, leaves, tree, pos);
                self.make_node(op, left, right)
            }
        }
    }
}

impl PatternGraph for PatternGraphBuilder {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn input_var(&self, id: NodeId) -> Option<VarId> {
        self.nodes[id].get_input_var()
    }

    fn fanins(&self, id: NodeId) -> Option<[PatternHandle; 2]> {
        self.nodes[id].get_fanins()
    }

    fn node_kind(&self, id: NodeId) -> PatternKind {
        self.nodes[id].kind()
    }
}
