use serde::{Deserialize, Serialize};

use crate::{
    Builtins, Cell, CellClass, CellGroup, CellId, ClassId, Classifier, CompileOptions, GroupId,
    PatternView, Result, Snapshot,
};

/// Result of a compile pass: the cell classification and the frozen pattern graph.
///
/// Nothing can be added to a compiled library, so it can be shared freely between threads.
///
/// ```rust
/// use clibcomp::{Cell, CompileOptions, CompiledLibrary, Expr};
/// let nand = Cell::logic(
///     "NAND2",
///     &["A", "B"],
///     "Y",
///     !(Expr::posi_literal(0) & Expr::posi_literal(1)),
/// )
/// .unwrap();
/// let library = CompiledLibrary::compile([&nand], CompileOptions::default()).unwrap();
/// let group = library.cell_group(0);
/// assert_eq!(library.builtins().nand_group(2), Some(group));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledLibrary {
    pub(crate) groups: Vec<CellGroup>,
    pub(crate) classes: Vec<CellClass>,
    pub(crate) builtins: Builtins,
    pub(crate) cell_names: Vec<String>,
    pub(crate) cell_groups: Vec<GroupId>,
    pub(crate) snapshot: Snapshot,
}

impl CompiledLibrary {
    /// Classifies `cells` in order, registers their patterns and freezes the result.
    ///
    /// Cell ids are positions in `cells`.
    pub fn compile<'a>(
        cells: impl IntoIterator<Item = &'a Cell>,
        options: CompileOptions,
    ) -> Result<Self> {
        let mut classifier = Classifier::new(options);
        for cell in cells {
            classifier.add_cell(cell)?;
        }
        Ok(classifier.finish())
    }

    pub fn group_num(&self) -> usize {
        self.groups.len()
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn group(&self, id: GroupId) -> &CellGroup {
        &self.groups[id]
    }

    pub fn groups(&self) -> &[CellGroup] {
        &self.groups
    }

    pub fn class_num(&self) -> usize {
        self.classes.len()
    }

    /// # Panics
    /// If `id` is out of range.
    pub fn class(&self, id: ClassId) -> &CellClass {
        &self.classes[id]
    }

    pub fn classes(&self) -> &[CellClass] {
        &self.classes
    }

    /// Class of group `id`.
    ///
    /// # Panics
    /// If `id` is out of range.
    pub fn group_class(&self, id: GroupId) -> &CellClass {
        &self.classes[self.groups[id].get_class_id()]
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    pub fn cell_num(&self) -> usize {
        self.cell_names.len()
    }

    pub fn cell_names(&self) -> &[String] {
        &self.cell_names
    }

    /// Group holding cell `id`.
    ///
    /// # Panics
    /// If `id` is out of range.
    pub fn cell_group(&self, id: CellId) -> GroupId {
        self.cell_groups[id]
    }

    /// Id of the cell named `name`, the first one if several share it.
    pub fn find_cell(&self, name: &str) -> Option<CellId> {
        self.cell_names.iter().position(|n| n == name)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Patterns of class `id`.
    pub fn class_patterns(&self, id: ClassId) -> impl Iterator<Item = PatternView<'_>> {
        self.snapshot
            .patterns()
            .filter(move |view| view.class_id() == id)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        BuiltinLogic, CellKind, CellOutput, CellPin, Expr, LibraryError, PinDirection, SeqInfo,
        dfs::PatternGraph,
    };

    fn lit(var: usize) -> Expr {
        Expr::posi_literal(var)
    }

    fn cells() -> Vec<Cell> {
        let pins = |inputs: &[&str]| {
            let mut pins: Vec<CellPin> = inputs
                .iter()
                .map(|name| CellPin::new(*name, PinDirection::Input))
                .collect();
            pins.push(CellPin::new("Q", PinDirection::Output));
            pins
        };
        vec![
            Cell::logic("INV", &["A"], "Y", Expr::nega_literal(0)).unwrap(),
            Cell::logic("AOI21", &["A", "B", "C"], "Y", !((lit(0) & lit(1)) | lit(2))).unwrap(),
            Cell::logic("OAI21", &["A", "B", "C"], "Y", !((lit(0) | lit(1)) & lit(2))).unwrap(),
            Cell::logic("AO21", &["B", "C", "A"], "Y", lit(2) | (lit(0) & lit(1))).unwrap(),
            Cell::new(
                "DFF",
                pins(&["CK", "D"]),
                vec![CellOutput::logic(lit(2))],
                CellKind::FlipFlop(SeqInfo::new(lit(0), lit(1))),
            )
            .unwrap(),
            Cell::new(
                "BLACKBOX",
                pins(&["A"]),
                vec![CellOutput::default()],
                CellKind::Logic,
            )
            .unwrap(),
        ]
    }

    #[test]
    fn compile_test() {
        let cells = cells();
        let library = CompiledLibrary::compile(&cells, CompileOptions::default()).unwrap();
        assert_eq!(library.cell_num(), cells.len());
        assert_eq!(library.find_cell("OAI21"), Some(2));
        assert_eq!(library.find_cell("NOPE"), None);

        let inv = library.cell_group(0);
        assert_eq!(inv, library.builtins().logic_group(BuiltinLogic::Inverter));

        // AOI21 and AO21 are the same function up to pin order and output polarity.
        let aoi = library.cell_group(1);
        let ao = library.cell_group(3);
        assert_ne!(aoi, ao);
        assert_eq!(library.group(aoi).get_class_id(), library.group(ao).get_class_id());
        // OAI21 is the dual: inverting every input of AOI21 gives !OAI21.
        let oai = library.cell_group(2);
        assert_eq!(library.group(oai).get_class_id(), library.group(aoi).get_class_id());

        let class = library.group_class(aoi);
        assert_eq!(class.get_signature().input_num(), 3);
        assert!(class.get_groups().contains(&oai));
        assert!(library.class_patterns(class.get_id()).count() > 0);
        for view in library.class_patterns(class.get_id()) {
            assert_eq!(view.input_num(), 3);
        }

        let dff = library.cell_group(4);
        assert_eq!(
            library.group(dff).get_class_id(),
            library.builtins().ff_class(true, false, false, false)
        );

        let black_box = library.cell_group(5);
        assert_eq!(library.group(black_box).get_cells(), &[5]);
        for id in 0..library.cell_num() {
            assert!(library.group(library.cell_group(id)).get_cells().contains(&id));
        }
        assert_eq!(library.group_num(), library.groups().len());
        assert_eq!(library.class_num(), library.classes().len());
    }

    #[test]
    fn pattern_function_test() {
        let cells = cells();
        let library = CompiledLibrary::compile(&cells, CompileOptions::default()).unwrap();
        let snapshot = library.snapshot();
        let class = library.group_class(library.cell_group(1));
        let canon = class.get_signature().output_func(0).unwrap();
        let ids: Vec<usize> = (0..snapshot.pat_num())
            .filter(|&i| snapshot.pattern(i).class_id() == class.get_id())
            .collect();
        assert!(!ids.is_empty());
        for i in ids {
            let root = snapshot.pattern(i).root();
            let table = snapshot.handle_expr(root).to_truth_table(3).unwrap();
            assert_eq!(&table, canon);
        }
    }

    #[test]
    fn invalid_cell_test() {
        let bad = Cell::logic("BAD", &["A"], "Y", lit(0) & lit(1));
        assert!(matches!(bad, Err(LibraryError::InvalidCell { .. })));
    }

    #[test]
    fn serde_test() {
        let cells = cells();
        let library = CompiledLibrary::compile(&cells, CompileOptions::default()).unwrap();
        let json = serde_json::to_string(&library).unwrap();
        let back: CompiledLibrary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, library);
    }

    #[test]
    #[should_panic]
    fn group_out_of_range_test() {
        let library = CompiledLibrary::compile([], CompileOptions::default()).unwrap();
        library.group(library.group_num());
    }

    #[test]
    #[should_panic]
    fn cell_out_of_range_test() {
        let cells = cells();
        let library = CompiledLibrary::compile(&cells, CompileOptions::default()).unwrap();
        library.cell_group(cells.len());
    }

    #[test]
    fn thread_safety_test() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompiledLibrary>();
    }
}
