//! Groups and classes registered before any library cell, so their ids are always known.

use serde::{Deserialize, Serialize};

use super::{ClassId, GroupId};

/// Smallest gate arity with a builtin group.
pub const MIN_ARITY: usize = 2;
/// Largest AND/OR/NAND/NOR arity with a builtin group.
pub const MAX_AND_ARITY: usize = 8;
/// Largest XOR/XNOR arity with a builtin group.
pub const MAX_XOR_ARITY: usize = 4;
/// Number of `(has_q, has_xq, has_clear, has_preset)` combinations.
pub const SEQ_CLASS_NUM: usize = 12;

/// The four single-input (or constant) functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinLogic {
    Zero = 0,
    One = 1,
    Buffer = 2,
    Inverter = 3,
}

/// Code of a plain flip-flop/latch flavor, in `0..12`.
///
/// # Panics
/// If neither `has_q` nor `has_xq` is set.
pub fn seq_code(has_q: bool, has_xq: bool, has_clear: bool, has_preset: bool) -> usize {
    let q_code = match (has_q, has_xq) {
        (true, false) => 0,
        (false, true) => 1,
        (true, true) => 2,
        (false, false) => panic!("a flip-flop or latch needs at least one output"),
    };
    (q_code << 2) | usize::from(has_clear) | (usize::from(has_preset) << 1)
}

/// Inverse of [`seq_code`]: `(has_q, has_xq, has_clear, has_preset)`.
pub fn seq_flavor(code: usize) -> (bool, bool, bool, bool) {
    let (has_q, has_xq) = match code >> 2 {
        0 => (true, false),
        1 => (false, true),
        _ => (true, true),
    };
    (has_q, has_xq, code & 1 == 1, code & 2 == 2)
}

/// Ids of the builtin groups and classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Builtins {
    pub(super) logic: [GroupId; 4],
    /// Indexed by arity minus [`MIN_ARITY`].
    pub(super) and: Vec<GroupId>,
    pub(super) or: Vec<GroupId>,
    pub(super) nand: Vec<GroupId>,
    pub(super) nor: Vec<GroupId>,
    pub(super) xor: Vec<GroupId>,
    pub(super) xnor: Vec<GroupId>,
    pub(super) mux2: GroupId,
    pub(super) mux4: GroupId,
    pub(super) ff: [ClassId; SEQ_CLASS_NUM],
    pub(super) latch: [ClassId; SEQ_CLASS_NUM],
}

fn by_arity(groups: &[GroupId], arity: usize) -> Option<GroupId> {
    arity
        .checked_sub(MIN_ARITY)
        .and_then(|i| groups.get(i))
        .copied()
}

impl Builtins {
    /// Group of the constants, the buffer or the inverter.
    pub fn logic_group(&self, logic: BuiltinLogic) -> GroupId {
        self.logic[logic as usize]
    }

    /// Group of the positive AND of `arity` inputs, for `2..=8` inputs.
    pub fn and_group(&self, arity: usize) -> Option<GroupId> {
        by_arity(&self.and, arity)
    }

    pub fn or_group(&self, arity: usize) -> Option<GroupId> {
        by_arity(&self.or, arity)
    }

    pub fn nand_group(&self, arity: usize) -> Option<GroupId> {
        by_arity(&self.nand, arity)
    }

    pub fn nor_group(&self, arity: usize) -> Option<GroupId> {
        by_arity(&self.nor, arity)
    }

    /// Group of the XOR of `arity` inputs, for `2..=4` inputs.
    pub fn xor_group(&self, arity: usize) -> Option<GroupId> {
        by_arity(&self.xor, arity)
    }

    pub fn xnor_group(&self, arity: usize) -> Option<GroupId> {
        by_arity(&self.xnor, arity)
    }

    /// Group of `d0 & !s | d1 & s` with inputs `(d0, d1, s)`.
    pub fn mux2_group(&self) -> GroupId {
        self.mux2
    }

    /// Group of the 4-to-1 multiplexer with inputs `(d0, d1, d2, d3, s0, s1)`.
    pub fn mux4_group(&self) -> GroupId {
        self.mux4
    }

    /// Class of the plain flip-flop with the given outputs and asynchronous pins.
    ///
    /// # Panics
    /// If neither `has_q` nor `has_xq` is set.
    pub fn ff_class(&self, has_q: bool, has_xq: bool, has_clear: bool, has_preset: bool) -> ClassId {
        self.ff[seq_code(has_q, has_xq, has_clear, has_preset)]
    }

    /// Class of the plain latch with the given outputs and asynchronous pins.
    ///
    /// # Panics
    /// If neither `has_q` nor `has_xq` is set.
    pub fn latch_class(&self, has_q: bool, has_xq: bool, has_clear: bool, has_preset: bool) -> ClassId {
        self.latch[seq_code(has_q, has_xq, has_clear, has_preset)]
    }
}
