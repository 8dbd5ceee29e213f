//! Structural equivalence checks.
//!
//! [`expr_equivalent`] compares expressions up to the order of operands of every operator.
//! [`PatternGraphBuilder::is_isomorphic`] compares the trees rooted at two handles up to a
//! renaming of their inputs.

use std::collections::HashMap;

use super::{NodeId, PatternGraphBuilder, PatternHandle, PatternNode};
use crate::{Expr, VarId, enumerate::Permutations};

/// True if `a` and `b` only differ by the order of operands.
/// Literals must match exactly (same variable, same polarity).
pub fn expr_equivalent(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Zero, Expr::Zero) | (Expr::One, Expr::One) => true,
        (Expr::Literal { .. }, Expr::Literal { .. }) => a == b,
        (Expr::And(xs), Expr::And(ys)) | (Expr::Or(xs), Expr::Or(ys)) | (Expr::Xor(xs), Expr::Xor(ys)) => {
            xs.len() == ys.len()
                && Permutations::new(xs.len())
                    .any(|perm| perm.iter().enumerate().all(|(i, &j)| expr_equivalent(&xs[i], &ys[j])))
        }
        _ => false,
    }
}

/// Records `from -> to` in `map`, false if `from` is already bound elsewhere.
fn bind(map: &mut HashMap<VarId, VarId>, from: VarId, to: VarId) -> bool {
    *map.entry(from).or_insert(to) == to
}

impl PatternGraphBuilder {
    /// True if the trees of `a` and `b` are equal up to a one-to-one renaming of inputs.
    ///
    /// Fanin order matters: `a & b` and `b & !a` are not isomorphic, `a & !b` and `c & !d` are.
    pub fn is_isomorphic(&self, a: PatternHandle, b: PatternHandle) -> bool {
        let mut forward = HashMap::new();
        let mut backward = HashMap::new();
        a.inv == b.inv && self.isomorphic_nodes(a.node, b.node, &mut forward, &mut backward)
    }

    fn isomorphic_nodes(
        &self,
        a: NodeId,
        b: NodeId,
        forward: &mut HashMap<VarId, VarId>,
        backward: &mut HashMap<VarId, VarId>,
    ) -> bool {
        match (&self.nodes[a], &self.nodes[b]) {
            (PatternNode::Input { var: va, .. }, PatternNode::Input { var: vb, .. }) => {
                bind(forward, *va, *vb) && bind(backward, *vb, *va)
            }
            (
                PatternNode::And {
                    fanin0: a0,
                    fanin1: a1,
                    ..
                },
                PatternNode::And {
                    fanin0: b0,
                    fanin1: b1,
                    ..
                },
            )
            | (
                PatternNode::Xor {
                    fanin0: a0,
                    fanin1: a1,
                    ..
                },
                PatternNode::Xor {
                    fanin0: b0,
                    fanin1: b1,
                    ..
                },
            ) => {
                a0.inv == b0.inv
                    && a1.inv == b1.inv
                    && self.isomorphic_nodes(a0.node, b0.node, forward, backward)
                    && self.isomorphic_nodes(a1.node, b1.node, forward, backward)
            }
            _ => false,
        }
    }
}
