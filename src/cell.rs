//! Cell records as handed over by the library parsers.
//!
//! Variables of a cell's expressions are numbered after its pins: the input pins in order,
//! then the inout pins. Sequential cells may also use the present state `IQ`
//! (variable [`Cell::state_var`]) and its complement `IQN` (the next variable).

use serde::{Deserialize, Serialize};

use crate::{Expr, LibraryError, Result, VarId};

/// Direction of a cell pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
    Inout,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPin {
    pub name: String,
    pub direction: PinDirection,
}

impl CellPin {
    pub fn new(name: impl Into<String>, direction: PinDirection) -> Self {
        CellPin {
            name: name.into(),
            direction,
        }
    }
}

/// State of `IQ`/`IQN` when clear and preset are active at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClearPresetValue {
    /// Low.
    L,
    /// High.
    H,
    /// No change.
    N,
    /// Toggle.
    T,
    /// Unknown (or not specified).
    #[default]
    X,
}

/// Sequential behavior of a flip-flop or a latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqInfo {
    /// Clock of a flip-flop, enable of a latch.
    pub clock: Expr,
    /// Next state of a flip-flop, data in of a latch.
    pub next_state: Expr,
    pub clear: Option<Expr>,
    pub preset: Option<Expr>,
    pub clear_preset_var1: ClearPresetValue,
    pub clear_preset_var2: ClearPresetValue,
}

impl SeqInfo {
    pub fn new(clock: Expr, next_state: Expr) -> Self {
        SeqInfo {
            clock,
            next_state,
            clear: None,
            preset: None,
            clear_preset_var1: ClearPresetValue::default(),
            clear_preset_var2: ClearPresetValue::default(),
        }
    }

    pub fn with_clear(mut self, clear: Expr) -> Self {
        self.clear = Some(clear);
        self
    }

    pub fn with_preset(mut self, preset: Expr) -> Self {
        self.preset = Some(preset);
        self
    }

    fn exprs(&self) -> impl Iterator<Item = &Expr> {
        [Some(&self.clock), Some(&self.next_state), self.clear.as_ref(), self.preset.as_ref()]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    Logic,
    FlipFlop(SeqInfo),
    Latch(SeqInfo),
}

impl CellKind {
    pub fn seq_info(&self) -> Option<&SeqInfo> {
        match self {
            CellKind::Logic => None,
            CellKind::FlipFlop(info) | CellKind::Latch(info) => Some(info),
        }
    }
}

/// Functions attached to one output pin. `None` means undefined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellOutput {
    pub logic: Option<Expr>,
    /// The output is driven when this is true.
    pub tristate: Option<Expr>,
}

impl CellOutput {
    pub fn logic(expr: Expr) -> Self {
        CellOutput {
            logic: Some(expr),
            tristate: None,
        }
    }
}

/// A library cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    name: String,
    pins: Vec<CellPin>,
    /// One entry per output pin, then per inout pin.
    outputs: Vec<CellOutput>,
    kind: CellKind,
}

impl Cell {
    /// Creates a cell, checking that `outputs` matches the output and inout pins and that every
    /// expression only uses variables the cell has.
    pub fn new(
        name: impl Into<String>,
        pins: Vec<CellPin>,
        outputs: Vec<CellOutput>,
        kind: CellKind,
    ) -> Result<Self> {
        let cell = Cell {
            name: name.into(),
            pins,
            outputs,
            kind,
        };
        let invalid = |reason: String| LibraryError::InvalidCell {
            cell: cell.name.clone(),
            reason,
        };

        if cell.outputs.len() != cell.output_num() {
            return Err(invalid(format!(
                "{} output functions for {} output pins",
                cell.outputs.len(),
                cell.output_num()
            )));
        }
        let var_num = cell.var_num();
        let exprs = cell
            .outputs
            .iter()
            .flat_map(|o| o.logic.iter().chain(o.tristate.iter()))
            .chain(cell.kind.seq_info().into_iter().flat_map(SeqInfo::exprs));
        for expr in exprs {
            if expr.input_size() > var_num {
                return Err(invalid(format!(
                    "expression uses variable {} but the cell has {} variables",
                    expr.input_size() - 1,
                    var_num
                )));
            }
        }
        Ok(cell)
    }

    /// Creates a single-output combinational cell.
    /// Input pins get variables `0..inputs.len()` in order.
    pub fn logic(name: impl Into<String>, inputs: &[&str], output: &str, expr: Expr) -> Result<Self> {
        let pins = inputs
            .iter()
            .map(|&pin| CellPin::new(pin, PinDirection::Input))
            .chain(std::iter::once(CellPin::new(output, PinDirection::Output)))
            .collect();
        Cell::new(name, pins, vec![CellOutput::logic(expr)], CellKind::Logic)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pins(&self) -> &[CellPin] {
        &self.pins
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    fn count_pins(&self, direction: PinDirection) -> usize {
        self.pins.iter().filter(|p| p.direction == direction).count()
    }

    /// Number of input variables (input and inout pins).
    pub fn input_num(&self) -> usize {
        self.count_pins(PinDirection::Input) + self.count_pins(PinDirection::Inout)
    }

    /// Number of outputs (output and inout pins).
    pub fn output_num(&self) -> usize {
        self.count_pins(PinDirection::Output) + self.count_pins(PinDirection::Inout)
    }

    /// Variable of the present state `IQ`, `IQN` being the next one.
    pub fn state_var(&self) -> VarId {
        self.input_num()
    }

    /// Number of variables expressions may use.
    pub fn var_num(&self) -> usize {
        match self.kind {
            CellKind::Logic => self.input_num(),
            _ => self.input_num() + 2,
        }
    }

    pub fn output(&self, o: usize) -> &CellOutput {
        &self.outputs[o]
    }

    pub fn outputs(&self) -> &[CellOutput] {
        &self.outputs
    }

    pub fn is_logic(&self) -> bool {
        matches!(self.kind, CellKind::Logic)
    }

    /// True if the cell has outputs and all of them have a defined function.
    pub fn has_logic(&self) -> bool {
        !self.outputs.is_empty() && self.outputs.iter().all(|o| o.logic.is_some())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn logic_cell_test() {
        let f = Expr::posi_literal(0) & Expr::posi_literal(1);
        let cell = Cell::logic("AND2", &["A", "B"], "Y", f.clone()).unwrap();
        assert_eq!(cell.input_num(), 2);
        assert_eq!(cell.output_num(), 1);
        assert!(cell.is_logic());
        assert!(cell.has_logic());
        assert_eq!(cell.output(0).logic, Some(f));
    }

    #[test]
    fn invalid_cell_test() {
        let f = Expr::posi_literal(0) & Expr::posi_literal(2);
        assert!(matches!(
            Cell::logic("BAD", &["A", "B"], "Y", f),
            Err(LibraryError::InvalidCell { .. })
        ));

        let pins = vec![
            CellPin::new("A", PinDirection::Input),
            CellPin::new("Y", PinDirection::Output),
            CellPin::new("Z", PinDirection::Output),
        ];
        assert!(Cell::new("BAD", pins, vec![CellOutput::default()], CellKind::Logic).is_err());
    }

    #[test]
    fn sequential_cell_test() {
        // DFF with active-low clear: pins CK, D, RN, Q.
        let pins = vec![
            CellPin::new("CK", PinDirection::Input),
            CellPin::new("D", PinDirection::Input),
            CellPin::new("RN", PinDirection::Input),
            CellPin::new("Q", PinDirection::Output),
        ];
        let info = SeqInfo::new(Expr::posi_literal(0), Expr::posi_literal(1))
            .with_clear(Expr::nega_literal(2));
        let cell = Cell::new(
            "DFFR",
            pins.clone(),
            vec![CellOutput::logic(Expr::posi_literal(3))],
            CellKind::FlipFlop(info.clone()),
        )
        .unwrap();
        assert_eq!(cell.state_var(), 3);
        assert_eq!(cell.var_num(), 5);

        // IQN is fine, one past it is not.
        let bad = Cell::new(
            "DFFR",
            pins,
            vec![CellOutput::logic(Expr::posi_literal(5))],
            CellKind::FlipFlop(info),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn black_box_test() {
        let pins = vec![
            CellPin::new("A", PinDirection::Input),
            CellPin::new("Y", PinDirection::Output),
        ];
        let cell = Cell::new("BB", pins, vec![CellOutput::default()], CellKind::Logic).unwrap();
        assert!(!cell.has_logic());
    }
}
