//! A [`PatternHandle`] points at a [`PatternNode`] and can be complemented (indicates the presence of a NOT gate).
//!
//! [`PatternNode`]: crate::PatternNode

use std::ops::Not;

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Which fanin of a two-input gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaninId {
    Fanin0,
    Fanin1,
}

impl From<usize> for FaninId {
    /// Position of a fanin in its gate, as in snapshot edge ids.
    ///
    /// # Panics
    /// If `pos` is neither 0 nor 1.
    fn from(pos: usize) -> Self {
        match pos {
            0 => FaninId::Fanin0,
            1 => FaninId::Fanin1,
            _ => panic!("no fanin at position {pos}"),
        }
    }
}

impl From<FaninId> for usize {
    fn from(fanin_id: FaninId) -> Self {
        fanin_id as usize
    }
}

/// A reference to a pattern node, used both as node fanin and as pattern root.
///
/// The handle carries an inverter according to the value of `inv`.
///
/// ```rust
/// use clibcomp::PatternHandle;
/// let h = PatternHandle::new(3, false);
/// assert_eq!(!h, PatternHandle::new(3, true));
/// assert!(h.is_complement_of(&!h));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternHandle {
    /// The node the handle points at.
    pub(super) node: NodeId,
    /// Complemented handle.
    pub(super) inv: bool,
}

impl Not for PatternHandle {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        self.inv = !self.inv;
        self
    }
}

impl PatternHandle {
    pub fn new(node: NodeId, inv: bool) -> Self {
        PatternHandle { node, inv }
    }

    pub fn get_node_id(&self) -> NodeId {
        self.node
    }

    pub fn get_inv(&self) -> bool {
        self.inv
    }

    /// The same handle without inversion.
    pub fn regular(self) -> Self {
        PatternHandle::new(self.node, false)
    }

    pub fn is_complement_of(&self, other: &PatternHandle) -> bool {
        self.node == other.node && self.inv ^ other.inv
    }
}
