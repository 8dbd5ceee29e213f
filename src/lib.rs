pub mod cell;
pub mod classify;
pub mod dfs;
pub mod enumerate;
pub mod error;
pub mod expr;
pub mod library;
pub mod npn;
pub mod options;
pub mod pattern;
pub mod signature;
pub mod snapshot;
pub mod truth_table;

// Re-exporting symbols and modules.
pub use cell::{Cell, CellKind, CellOutput, CellPin, ClearPresetValue, PinDirection, SeqInfo};
pub use classify::{
    BuiltinLogic, Builtins, CellClass, CellGroup, CellId, ClassId, Classifier, GroupId,
};
pub use error::{LibraryError, Result};
pub use expr::{Expr, VarId};
pub use library::CompiledLibrary;
pub use npn::{NpnMap, VarMap};
pub use options::CompileOptions;
pub use pattern::{
    FaninId, NodeId, PatternGraphBuilder, PatternHandle, PatternKind, PatternNode, PatternOp,
    PatternRecord, RegisterOutcome,
};
pub use signature::{OutputFuncs, SeqFuncs, SeqKind, Signature, SignatureKind};
pub use snapshot::{PatternView, RawSnapshot, Snapshot};
pub use truth_table::TruthTable;
