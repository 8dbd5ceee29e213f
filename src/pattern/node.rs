use serde::{Deserialize, Serialize};

use super::{FaninId, PatternHandle};
use crate::VarId;

/// A node id.
///
/// Ids are dense, assigned in creation order, and never reused.
pub type NodeId = usize;

/// Kind of a pattern node, with its 2-bit code in compiled snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternKind {
    Input = 0,
    And = 1,
    Xor = 2,
}

impl PatternKind {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(PatternKind::Input),
            1 => Some(PatternKind::And),
            2 => Some(PatternKind::Xor),
            _ => None,
        }
    }
}

/// A node of the pattern graph.
///
/// Nodes are created by [`PatternGraphBuilder`] and never change afterwards.
///
/// [`PatternGraphBuilder`]: crate::PatternGraphBuilder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternNode {
    /// A leaf standing for input variable `var`.
    Input { id: NodeId, var: VarId },
    /// A two-input AND gate.
    And {
        id: NodeId,
        fanin0: PatternHandle,
        fanin1: PatternHandle,
    },
    /// A two-input XOR gate. Its fanins are never inverted.
    Xor {
        id: NodeId,
        fanin0: PatternHandle,
        fanin1: PatternHandle,
    },
}

impl PatternNode {
    pub fn get_id(&self) -> NodeId {
        match self {
            PatternNode::Input { id, .. }
            | PatternNode::And { id, .. }
            | PatternNode::Xor { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            PatternNode::Input { .. } => PatternKind::Input,
            PatternNode::And { .. } => PatternKind::And,
            PatternNode::Xor { .. } => PatternKind::Xor,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, PatternNode::Input { .. })
    }

    pub fn is_and(&self) -> bool {
        matches!(self, PatternNode::And { .. })
    }

    pub fn is_xor(&self) -> bool {
        matches!(self, PatternNode::Xor { .. })
    }

    /// Variable of an input node.
    pub fn get_input_var(&self) -> Option<VarId> {
        match self {
            PatternNode::Input { var, .. } => Some(*var),
            _ => None,
        }
    }

    /// Both fanins of a gate, `None` for inputs.
    pub fn get_fanins(&self) -> Option<[PatternHandle; 2]> {
        match self {
            PatternNode::Input { .. } => None,
            PatternNode::And { fanin0, fanin1, .. } | PatternNode::Xor { fanin0, fanin1, .. } => {
                Some([*fanin0, *fanin1])
            }
        }
    }

    pub fn get_fanin(&self, fanin_id: FaninId) -> Option<PatternHandle> {
        let [fanin0, fanin1] = self.get_fanins()?;
        match fanin_id {
            FaninId::Fanin0 => Some(fanin0),
            FaninId::Fanin1 => Some(fanin1),
        }
    }
}
