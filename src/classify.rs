//! Module defining the [`Classifier`], which sorts cells into [`CellGroup`]s and [`CellClass`]es.
//!
//! A group gathers the cells with exactly the same [`Signature`]. A class gathers the groups whose
//! signatures are NPN equivalent; each group keeps the transform to the class's canonical signature.
//! Only single-output, non-tristate logic signatures are canonicalized: any other group is the
//! only member of its class.
//!
//! While classifying, the expression of every new single-output logic group is rewritten in the
//! canonical variables of its class and handed to the [`PatternGraphBuilder`].

pub mod builtin;
pub mod class;
pub mod group;

use std::collections::HashMap;

use log::{debug, info};

pub use builtin::{BuiltinLogic, Builtins};
pub use class::CellClass;
pub use group::CellGroup;

use crate::{
    Cell, CompileOptions, CompiledLibrary, Expr, NpnMap, PatternGraphBuilder, RegisterOutcome,
    Result, SeqKind, Signature, Snapshot, npn::automorphisms,
};
use builtin::{MAX_AND_ARITY, MAX_XOR_ARITY, MIN_ARITY, SEQ_CLASS_NUM, seq_flavor};

/// A group id, assigned in creation order.
pub type GroupId = usize;
/// A class id, assigned in creation order.
pub type ClassId = usize;
/// A cell id: the rank of the cell among the cells added to the classifier.
pub type CellId = usize;

/// State of a compile pass.
///
/// ```rust
/// use clibcomp::{Cell, Classifier, CompileOptions, Expr};
/// let mut classifier = Classifier::new(CompileOptions::default());
/// let nand = !(Expr::posi_literal(0) & Expr::posi_literal(1));
/// let cell = Cell::logic("NAND2X1", &["A", "B"], "Y", nand).unwrap();
/// let group = classifier.add_cell(&cell).unwrap();
/// assert_eq!(Some(group), classifier.builtins().nand_group(2));
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    options: CompileOptions,
    builder: PatternGraphBuilder,
    groups: Vec<CellGroup>,
    classes: Vec<CellClass>,
    /// Signature fingerprint to group.
    group_index: HashMap<String, GroupId>,
    /// Canonical signature fingerprint to class.
    class_index: HashMap<String, ClassId>,
    cell_names: Vec<String>,
    /// Group of every cell, indexed by [`CellId`].
    cell_groups: Vec<GroupId>,
    builtins: Builtins,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(CompileOptions::default())
    }
}

impl Classifier {
    /// Creates a classifier holding the builtin groups and classes only.
    pub fn new(options: CompileOptions) -> Self {
        let mut classifier = Classifier {
            options,
            builder: PatternGraphBuilder::new(),
            groups: Vec::new(),
            classes: Vec::new(),
            group_index: HashMap::new(),
            class_index: HashMap::new(),
            cell_names: Vec::new(),
            cell_groups: Vec::new(),
            builtins: Builtins::default(),
        };
        classifier.register_builtins();
        classifier
    }

    fn register_builtins(&mut self) {
        let lit = Expr::posi_literal;
        let nlit = Expr::nega_literal;
        let and = |n: usize| Expr::and((0..n).map(lit).collect());
        let xor = |n: usize| Expr::xor((0..n).map(lit).collect());

        let logic = [Expr::Zero, Expr::One, lit(0), nlit(0)].map(|e| self.find_expr_group(&e));
        let and_groups = (MIN_ARITY..=MAX_AND_ARITY)
            .map(|n| self.find_expr_group(&and(n)))
            .collect();
        let xor_groups = (MIN_ARITY..=MAX_XOR_ARITY)
            .map(|n| self.find_expr_group(&xor(n)))
            .collect();
        let mux2 = self.find_expr_group(&(lit(0) & nlit(2) | lit(1) & lit(2)));
        let mux4 = self.find_expr_group(
            &(lit(0) & nlit(4) & nlit(5)
                | lit(1) & lit(4) & nlit(5)
                | lit(2) & nlit(4) & lit(5)
                | lit(3) & lit(4) & lit(5)),
        );
        let or_groups = (MIN_ARITY..=MAX_AND_ARITY)
            .map(|n| self.find_expr_group(&Expr::or((0..n).map(lit).collect())))
            .collect();
        let nand_groups = (MIN_ARITY..=MAX_AND_ARITY)
            .map(|n| self.find_expr_group(&!and(n)))
            .collect();
        let nor_groups = (MIN_ARITY..=MAX_AND_ARITY)
            .map(|n| self.find_expr_group(&!Expr::or((0..n).map(lit).collect())))
            .collect();
        let xnor_groups = (MIN_ARITY..=MAX_XOR_ARITY)
            .map(|n| self.find_expr_group(&!xor(n)))
            .collect();

        let mut seq_classes = |kind: SeqKind| -> [ClassId; SEQ_CLASS_NUM] {
            std::array::from_fn(|code| {
                let (has_q, has_xq, has_clear, has_preset) = seq_flavor(code);
                let sig = Signature::sequential(kind, has_q, has_xq, has_clear, has_preset);
                let (group_id, _) = self.find_group(&sig);
                self.groups[group_id].class_id
            })
        };
        let ff = seq_classes(SeqKind::FlipFlop);
        let latch = seq_classes(SeqKind::Latch);

        self.builtins = Builtins {
            logic,
            and: and_groups,
            or: or_groups,
            nand: nand_groups,
            nor: nor_groups,
            xor: xor_groups,
            xnor: xnor_groups,
            mux2,
            mux4,
            ff,
            latch,
        };
    }

    /// Places `cell` in its group, creating the group (and its class) if needed.
    ///
    /// Cells without any defined output function each get a group and a class of their own.
    pub fn add_cell(&mut self, cell: &Cell) -> Result<GroupId> {
        let cell_id = self.cell_names.len();
        let group_id = if !cell.has_logic() {
            let class_id = self.new_class(Signature::default());
            self.new_group(
                class_id,
                NpnMap::identity(cell.input_num(), cell.output_num()),
            )
        } else {
            let sig = Signature::from_cell(cell)?;
            let (group_id, created) = self.find_group(&sig);
            if sig.is_canonicalizable() && (created || self.options.register_all_expressions) {
                if let Some(expr) = &cell.output(0).logic {
                    self.register_patterns(expr, group_id);
                }
            }
            group_id
        };
        self.cell_names.push(cell.name().to_string());
        self.cell_groups.push(group_id);
        self.groups[group_id].cells.push(cell_id);
        debug!("cell {} ({cell_id}) -> group {group_id}", cell.name());
        Ok(group_id)
    }

    /// Group of a single-output function, registering its patterns if the group is new.
    fn find_expr_group(&mut self, expr: &Expr) -> GroupId {
        let sig = Signature::from_expr(expr);
        let (group_id, created) = self.find_group(&sig);
        if created || self.options.register_all_expressions {
            self.register_patterns(expr, group_id);
        }
        group_id
    }

    /// Group of `sig`, and whether it was just created.
    fn find_group(&mut self, sig: &Signature) -> (GroupId, bool) {
        let key = sig.fingerprint();
        if let Some(&id) = self.group_index.get(&key) {
            return (id, false);
        }
        // Only eligible signatures have a canonical form, the others are their own class.
        let (rep, map) = sig.canonical_form().unwrap_or_else(|_| {
            (
                sig.clone(),
                NpnMap::identity(sig.input_num(), sig.output_num()),
            )
        });
        let class_id = self.find_class(rep);
        let id = self.new_group(class_id, map);
        self.group_index.insert(key, id);
        (id, true)
    }

    fn find_class(&mut self, rep: Signature) -> ClassId {
        let key = rep.fingerprint();
        if let Some(&id) = self.class_index.get(&key) {
            return id;
        }
        let id = self.new_class(rep);
        self.class_index.insert(key, id);
        id
    }

    fn new_class(&mut self, signature: Signature) -> ClassId {
        let idmaps = if signature.is_canonicalizable()
            && signature.input_num() <= self.options.max_automorphism_inputs
        {
            signature
                .output_func(0)
                .map(automorphisms)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        let id = self.classes.len();
        debug!(
            "new class {id}: {} ({} automorphisms)",
            signature.fingerprint(),
            idmaps.len()
        );
        self.classes.push(CellClass {
            id,
            signature,
            idmaps,
            groups: Vec::new(),
        });
        id
    }

    fn new_group(&mut self, class_id: ClassId, map: NpnMap) -> GroupId {
        let id = self.groups.len();
        debug!("new group {id} in class {class_id}");
        self.groups.push(CellGroup {
            id,
            class_id,
            map,
            cells: Vec::new(),
        });
        self.classes[class_id].groups.push(id);
        id
    }

    /// Registers `expr`, a function of `group_id`, in the canonical variables of its class.
    fn register_patterns(&mut self, expr: &Expr, group_id: GroupId) {
        let group = &self.groups[group_id];
        let class_id = group.class_id;
        let input_num = self.classes[class_id].signature.input_num();
        // Constants, buffers and inverters are not worth a pattern.
        if input_num <= 1 {
            return;
        }
        if input_num > self.options.pattern_input_limit() {
            debug!("class {class_id}: no pattern for a function of {input_num} inputs");
            return;
        }
        let cexpr = expr.xform(&group.map);
        if self.builder.register_expression(&cexpr, class_id) == RegisterOutcome::Unsupported {
            debug!("class {class_id}: expression {cexpr:?} cannot be factorized");
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn builder(&self) -> &PatternGraphBuilder {
        &self.builder
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn group_num(&self) -> usize {
        self.groups.len()
    }

    pub fn get_group(&self, id: GroupId) -> Option<&CellGroup> {
        self.groups.get(id)
    }

    pub fn get_groups(&self) -> &[CellGroup] {
        &self.groups
    }

    pub fn class_num(&self) -> usize {
        self.classes.len()
    }

    pub fn get_class(&self, id: ClassId) -> Option<&CellClass> {
        self.classes.get(id)
    }

    pub fn get_classes(&self) -> &[CellClass] {
        &self.classes
    }

    /// Names of the cells added so far, indexed by [`CellId`].
    pub fn get_cell_names(&self) -> &[String] {
        &self.cell_names
    }

    pub fn get_cell_group(&self, id: CellId) -> Option<GroupId> {
        self.cell_groups.get(id).copied()
    }

    /// Freezes the pattern graph and hands everything over to an immutable library.
    pub fn finish(self) -> CompiledLibrary {
        let snapshot = Snapshot::freeze(&self.builder);
        info!(
            "compiled {} cells: {} groups, {} classes, {} patterns",
            self.cell_names.len(),
            self.groups.len(),
            self.classes.len(),
            snapshot.pat_num()
        );
        CompiledLibrary {
            groups: self.groups,
            classes: self.classes,
            builtins: self.builtins,
            cell_names: self.cell_names,
            cell_groups: self.cell_groups,
            snapshot,
        }
    }
}
