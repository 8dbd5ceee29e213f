//! Flat, read-only copy of the pattern graph.
//!
//! A [`Snapshot`] is a handful of `u32` arrays:
//! - `node_info[n]` holds the [`PatternKind`] code of node `n` in its two low bits, and the
//!   variable of an input node above them;
//! - `edges[2 * n + pos]` encodes fanin `pos` of gate `n` as `from * 2 + inv` (0 for inputs);
//! - per pattern: its class, its root (`node * 2 + inv`), its input count, and its edge ids in
//!   DFS order, stored back to back with `pat_edge_offsets` delimiting them.
//!
//! Input nodes come first, so the input node of variable `i` is node `i`.

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    ClassId, Expr, FaninId, LibraryError, NodeId, PatternGraphBuilder, PatternHandle, PatternKind,
    PatternNode, Result, VarId,
    dfs::{EdgeDfs, PatternGraph},
};

/// The arrays of a [`Snapshot`], without any consistency guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSnapshot {
    pub node_info: Vec<u32>,
    pub edges: Vec<u32>,
    pub pat_class: Vec<u32>,
    pub pat_root: Vec<u32>,
    pub pat_input_num: Vec<u32>,
    pub pat_edge_offsets: Vec<u32>,
    pub pat_edges: Vec<u32>,
}

/// Immutable pattern graph, safe to share between threads.
///
/// Deserializing checks the same invariants as [`Snapshot::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot", into = "RawSnapshot")]
pub struct Snapshot {
    raw: RawSnapshot,
    input_num: usize,
}

/// One pattern of a [`Snapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternView<'a> {
    class_id: ClassId,
    root: PatternHandle,
    input_num: usize,
    edges: &'a [u32],
}

impl<'a> PatternView<'a> {
    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn root(&self) -> PatternHandle {
        self.root
    }

    pub fn root_node(&self) -> NodeId {
        self.root.get_node_id()
    }

    pub fn root_inv(&self) -> bool {
        self.root.get_inv()
    }

    /// One plus the largest variable reached from the root.
    pub fn input_num(&self) -> usize {
        self.input_num
    }

    /// Edge ids of the pattern, in DFS order from the root.
    pub fn edge_list(&self) -> &'a [u32] {
        self.edges
    }
}

fn encode(id: u32, inv: bool) -> u32 {
    id * 2 + u32::from(inv)
}

fn decode(code: u32) -> PatternHandle {
    PatternHandle::new((code >> 1) as usize, code & 1 == 1)
}

impl Snapshot {
    /// Copies the graph and the patterns of `builder`.
    pub fn freeze(builder: &PatternGraphBuilder) -> Snapshot {
        let nodes = builder.get_nodes();
        let mut order: Vec<NodeId> = (0..builder.input_num())
            .filter_map(|var| builder.get_input_node(var))
            .collect();
        order.extend(
            nodes
                .iter()
                .filter(|node| !node.is_input())
                .map(PatternNode::get_id),
        );
        let mut new_id = vec![0u32; nodes.len()];
        for (id, &old) in order.iter().enumerate() {
            new_id[old] = id as u32;
        }
        let handle_code = |h: PatternHandle| encode(new_id[h.get_node_id()], h.get_inv());

        let mut raw = RawSnapshot::default();
        for &old in &order {
            let node = &nodes[old];
            match node.get_fanins() {
                Some([fanin0, fanin1]) => {
                    raw.node_info.push(node.kind().code());
                    raw.edges.push(handle_code(fanin0));
                    raw.edges.push(handle_code(fanin1));
                }
                None => {
                    let var = node.get_input_var().unwrap_or_default() as u32;
                    raw.node_info.push(PatternKind::Input.code() | var << 2);
                    raw.edges.extend([0, 0]);
                }
            }
        }

        let mut dfs = EdgeDfs::new(nodes.len());
        raw.pat_edge_offsets.push(0);
        for record in builder.get_patterns() {
            dfs.restart(record.root.get_node_id());
            while let Some((id, fanin_id)) = dfs.next(builder) {
                raw.pat_edges
                    .push(new_id[id] * 2 + usize::from(fanin_id) as u32);
            }
            raw.pat_class.push(record.class_id as u32);
            raw.pat_root.push(handle_code(record.root));
            raw.pat_input_num.push(dfs.input_num() as u32);
            raw.pat_edge_offsets.push(raw.pat_edges.len() as u32);
        }

        info!(
            "froze {} nodes, {} patterns, {} pattern edges",
            raw.node_info.len(),
            raw.pat_class.len(),
            raw.pat_edges.len()
        );
        Snapshot {
            raw,
            input_num: builder.input_num(),
        }
    }

    /// Checks the arrays and wraps them.
    ///
    /// Inputs must come first with node `i` standing for variable `i`, gates must only point
    /// to earlier nodes, XOR fanins must be regular and every pattern must reference existing
    /// nodes and gate edges.
    pub fn from_raw(raw: RawSnapshot) -> Result<Snapshot> {
        let invalid = |msg: String| Err(LibraryError::InvalidSnapshot(msg));
        let node_num = raw.node_info.len();
        if raw.edges.len() != 2 * node_num {
            return invalid(format!(
                "{} edges for {} nodes",
                raw.edges.len(),
                node_num
            ));
        }

        let mut input_num = 0;
        for (id, &info) in raw.node_info.iter().enumerate() {
            let Some(kind) = PatternKind::from_code(info & 3) else {
                return invalid(format!("node {id} has kind code {}", info & 3));
            };
            if kind == PatternKind::Input {
                if input_num != id {
                    return invalid(format!("input node {id} comes after a gate"));
                }
                if (info >> 2) as usize != id {
                    return invalid(format!("input node {id} has variable {}", info >> 2));
                }
                input_num += 1;
                continue;
            }
            for pos in 0..2 {
                let fanin = decode(raw.edges[2 * id + pos]);
                if fanin.get_node_id() >= id {
                    return invalid(format!("gate {id} has fanin {}", fanin.get_node_id()));
                }
                if kind == PatternKind::Xor && fanin.get_inv() {
                    return invalid(format!("xor gate {id} has an inverted fanin"));
                }
            }
        }

        let pat_num = raw.pat_class.len();
        if raw.pat_root.len() != pat_num
            || raw.pat_input_num.len() != pat_num
            || raw.pat_edge_offsets.len() != pat_num + 1
        {
            return invalid(format!("pattern arrays disagree on {pat_num} patterns"));
        }
        if raw.pat_edge_offsets.first() != Some(&0)
            || raw.pat_edge_offsets.windows(2).any(|w| w[0] > w[1])
            || raw.pat_edge_offsets.last().copied() != Some(raw.pat_edges.len() as u32)
        {
            return invalid("pattern edge offsets are not a partition".to_string());
        }
        for (i, &root) in raw.pat_root.iter().enumerate() {
            if (root >> 1) as usize >= node_num {
                return invalid(format!("pattern {i} has root {}", root >> 1));
            }
        }
        for &edge in &raw.pat_edges {
            let to = (edge >> 1) as usize;
            if to < input_num || to >= node_num {
                return invalid(format!("pattern edge {edge} does not enter a gate"));
            }
        }
        Ok(Snapshot { raw, input_num })
    }

    pub fn into_raw(self) -> RawSnapshot {
        self.raw
    }

    pub fn as_raw(&self) -> &RawSnapshot {
        &self.raw
    }

    pub fn node_num(&self) -> usize {
        self.raw.node_info.len()
    }

    /// Number of input nodes.
    pub fn input_num(&self) -> usize {
        self.input_num
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn node_kind(&self, id: NodeId) -> PatternKind {
        match self.raw.node_info[id] & 3 {
            0 => PatternKind::Input,
            1 => PatternKind::And,
            _ => PatternKind::Xor,
        }
    }

    /// Variable of input node `id`.
    ///
    /// # Panics
    /// If `id` is out of range or not an input.
    pub fn input_id(&self, id: NodeId) -> VarId {
        assert!(id < self.input_num, "node {id} is not an input");
        (self.raw.node_info[id] >> 2) as VarId
    }

    /// Input node of variable `var`.
    ///
    /// # Panics
    /// If no pattern uses `var`.
    pub fn input_node(&self, var: VarId) -> NodeId {
        assert!(var < self.input_num, "no input node for variable {var}");
        var
    }

    pub fn edge_num(&self) -> usize {
        self.raw.edges.len()
    }

    /// Source node of `edge`.
    ///
    /// # Panics
    /// If `edge` is out of range.
    pub fn edge_from(&self, edge: usize) -> NodeId {
        (self.raw.edges[edge] >> 1) as NodeId
    }

    /// Gate `edge` enters.
    pub fn edge_to(&self, edge: usize) -> NodeId {
        edge / 2
    }

    pub fn edge_pos(&self, edge: usize) -> FaninId {
        FaninId::from(edge & 1)
    }

    /// # Panics
    /// If `edge` is out of range.
    pub fn edge_inv(&self, edge: usize) -> bool {
        self.raw.edges[edge] & 1 == 1
    }

    pub fn pat_num(&self) -> usize {
        self.raw.pat_class.len()
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn pattern(&self, id: usize) -> PatternView<'_> {
        let begin = self.raw.pat_edge_offsets[id] as usize;
        let end = self.raw.pat_edge_offsets[id + 1] as usize;
        PatternView {
            class_id: self.raw.pat_class[id] as ClassId,
            root: decode(self.raw.pat_root[id]),
            input_num: self.raw.pat_input_num[id] as usize,
            edges: &self.raw.pat_edges[begin..end],
        }
    }

    pub fn patterns(&self) -> impl Iterator<Item = PatternView<'_>> {
        (0..self.pat_num()).map(|id| self.pattern(id))
    }

    /// Largest input count over all patterns.
    pub fn max_input(&self) -> usize {
        self.raw
            .pat_input_num
            .iter()
            .copied()
            .max()
            .unwrap_or_default() as usize
    }

    /// The function of pattern `id`, rebuilt from the graph.
    ///
    /// # Panics
    /// If `id` is out of range.
    pub fn pattern_expr(&self, id: usize) -> Expr {
        self.handle_expr(self.pattern(id).root())
    }
}

impl PatternGraph for Snapshot {
    fn node_count(&self) -> usize {
        self.node_num()
    }

    fn input_var(&self, id: NodeId) -> Option<VarId> {
        (id < self.input_num).then(|| self.input_id(id))
    }

    fn fanins(&self, id: NodeId) -> Option<[PatternHandle; 2]> {
        (id >= self.input_num).then(|| {
            [
                decode(self.raw.edges[2 * id]),
                decode(self.raw.edges[2 * id + 1]),
            ]
        })
    }

    fn node_kind(&self, id: NodeId) -> PatternKind {
        Snapshot::node_kind(self, id)
    }
}

impl TryFrom<RawSnapshot> for Snapshot {
    type Error = LibraryError;

    fn try_from(raw: RawSnapshot) -> Result<Self> {
        Snapshot::from_raw(raw)
    }
}

impl From<Snapshot> for RawSnapshot {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.into_raw()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Classifier, CompileOptions, Expr, RegisterOutcome};

    fn lit(var: VarId) -> Expr {
        Expr::posi_literal(var)
    }

    fn small_builder() -> PatternGraphBuilder {
        let mut builder = PatternGraphBuilder::new();
        let f = lit(0) & lit(1);
        builder.register_expression(&f, 0);
        // Inputs 2 and 3 are created after the first gate.
        let g = lit(1) ^ lit(2) ^ Expr::nega_literal(3);
        assert!(matches!(
            builder.register_expression(&g, 1),
            RegisterOutcome::Registered(_)
        ));
        builder.register_expression(&(lit(0) | Expr::nega_literal(1)), 2);
        builder
    }

    #[test]
    fn freeze_test() {
        let builder = small_builder();
        let snapshot = Snapshot::freeze(&builder);
        assert_eq!(snapshot.node_num(), builder.node_num());
        assert_eq!(snapshot.input_num(), 4);
        assert_eq!(snapshot.pat_num(), builder.pattern_num());
        assert_eq!(snapshot.max_input(), 4);
        assert_eq!(snapshot.node_kind(4), PatternKind::And);
        for var in 0..4 {
            let node = snapshot.input_node(var);
            assert_eq!(node, var);
            assert_eq!(snapshot.node_kind(node), PatternKind::Input);
            assert_eq!(snapshot.input_id(node), var);
        }
        for (i, record) in builder.get_patterns().iter().enumerate() {
            let view = snapshot.pattern(i);
            assert_eq!(view.class_id(), record.class_id);
            assert_eq!(view.root_inv(), record.root.get_inv());
            assert_eq!(snapshot.pattern_expr(i), builder.handle_expr(record.root));
        }
    }

    #[test]
    fn edge_list_test() {
        let mut builder = PatternGraphBuilder::new();
        builder.register_expression(&(lit(0) & (lit(1) | Expr::nega_literal(2))), 0);
        let snapshot = Snapshot::freeze(&builder);
        assert_eq!(snapshot.pat_num(), 4);
        for view in snapshot.patterns() {
            let edges = view.edge_list();
            assert_eq!(edges.len(), 4);
            assert_eq!(view.input_num(), 3);
            // DFS from the root: the first edge enters the root through fanin 0.
            assert_eq!(snapshot.edge_to(edges[0] as usize), view.root_node());
            assert_eq!(snapshot.edge_pos(edges[0] as usize), FaninId::Fanin0);
            let to_root = edges
                .iter()
                .filter(|&&e| snapshot.edge_to(e as usize) == view.root_node())
                .count();
            assert_eq!(to_root, 2);
            for &e in edges {
                assert!(snapshot.edge_from(e as usize) < snapshot.edge_to(e as usize));
            }
        }
        // The OR is an AND of inverted fanins with an inverted output.
        let or_edges: Vec<usize> = (0..snapshot.edge_num())
            .filter(|&e| snapshot.edge_to(e) >= snapshot.input_num())
            .filter(|&e| snapshot.edge_from(e) != snapshot.input_node(0))
            .filter(|&e| snapshot.edge_from(e) < snapshot.input_num())
            .collect();
        // Two orders of `b | !c`, each with one inverted fanin.
        assert_eq!(or_edges.len(), 4);
        let inverted = or_edges.iter().filter(|&&e| snapshot.edge_inv(e)).count();
        assert_eq!(inverted, 2);
    }

    #[test]
    fn library_patterns_test() {
        let classifier = Classifier::new(CompileOptions::default());
        let builder = classifier.builder().clone();
        let snapshot = Snapshot::freeze(&builder);
        assert_eq!(snapshot.pat_num(), builder.pattern_num());
        for view in snapshot.patterns().take(200) {
            let class = classifier.get_class(view.class_id()).unwrap();
            let signature = class.get_signature();
            assert!(view.input_num() <= signature.input_num());
        }
        // Every pattern computes the canonical function of its class.
        for i in (0..snapshot.pat_num()).step_by(7) {
            let view = snapshot.pattern(i);
            let signature = classifier.get_class(view.class_id()).unwrap().get_signature();
            let n = signature.input_num();
            let table = snapshot.pattern_expr(i).to_truth_table(n).unwrap();
            assert_eq!(Some(&table), signature.output_func(0));
        }
    }

    #[test]
    fn serde_test() {
        let snapshot = Snapshot::freeze(&small_builder());
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn from_raw_test() {
        let snapshot = Snapshot::freeze(&small_builder());
        let raw = snapshot.clone().into_raw();
        assert_eq!(Snapshot::from_raw(raw.clone()).unwrap(), snapshot);

        let mut forward = raw.clone();
        let last = forward.node_info.len() - 1;
        forward.edges[2 * last] = encode(last as u32, false);
        assert!(matches!(
            Snapshot::from_raw(forward),
            Err(LibraryError::InvalidSnapshot(_))
        ));

        let mut offsets = raw.clone();
        offsets.pat_edge_offsets.pop();
        assert!(Snapshot::from_raw(offsets).is_err());

        let mut kind = raw.clone();
        kind.node_info[last] = 3;
        assert!(Snapshot::from_raw(kind).is_err());

        let mut moved_input = raw;
        moved_input.node_info[0] = PatternKind::Input.code() | 5 << 2;
        assert!(Snapshot::from_raw(moved_input).is_err());
    }

    #[test]
    fn empty_test() {
        let snapshot = Snapshot::freeze(&PatternGraphBuilder::new());
        assert_eq!(snapshot.node_num(), 0);
        assert_eq!(snapshot.pat_num(), 0);
        assert_eq!(snapshot.max_input(), 0);
        assert_eq!(snapshot.as_raw().pat_edge_offsets, vec![0]);
    }

    #[test]
    fn thread_safety_test() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Snapshot>();
    }
}
