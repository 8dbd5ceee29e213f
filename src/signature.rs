//! Behavioral signatures of cells.
//!
//! A [`Signature`] describes what a cell does, regardless of its name and pin names:
//! its kind, its input/output counts and the truth table of every relevant function.
//! Two cells with equal signatures are interchangeable.
//!
//! Sequential signatures are functions of `input_num + 2` variables:
//! variable 0 is the present state `IQ`, 1 is `IQN`, and the pins follow from variable 2 on.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{
    Cell, CellKind, ClearPresetValue, Expr, LibraryError, NpnMap, Result, TruthTable, VarId,
    npn::canonical_map,
};

/// Sequential cell flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeqKind {
    FlipFlop,
    Latch,
}

/// Functions of the state element of a sequential signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeqFuncs {
    pub clock: TruthTable,
    pub next_state: TruthTable,
    pub clear: Option<TruthTable>,
    pub preset: Option<TruthTable>,
    /// Only meaningful when both clear and preset exist.
    pub clear_preset: [ClearPresetValue; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureKind {
    Logic,
    FlipFlop(SeqFuncs),
    Latch(SeqFuncs),
}

/// Functions of one output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputFuncs {
    pub logic: Option<TruthTable>,
    pub tristate: Option<TruthTable>,
}

/// The behavior of a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    kind: SignatureKind,
    input_num: usize,
    outputs: Vec<OutputFuncs>,
}

impl Default for Signature {
    /// The empty signature (no inputs, no outputs), used for cells without any function.
    fn default() -> Self {
        Signature {
            kind: SignatureKind::Logic,
            input_num: 0,
            outputs: Vec::new(),
        }
    }
}

fn push_table(s: &mut String, table: Option<&TruthTable>) {
    if let Some(table) = table {
        s.push_str(&table.to_hex());
    }
    s.push(':');
}

impl Signature {
    /// Signature of a single-output combinational function.
    /// The input count is the [`input_size`](Expr::input_size) of `expr`.
    pub fn from_expr(expr: &Expr) -> Self {
        Signature {
            kind: SignatureKind::Logic,
            input_num: expr.input_size(),
            outputs: vec![OutputFuncs {
                logic: Some(expr.truth_table()),
                tristate: None,
            }],
        }
    }

    /// Signature of a plain flip-flop or latch.
    ///
    /// The inputs are clock (variable 2), data (variable 3), then clear and preset if present.
    /// The outputs are `Q` (`IQ`) if `has_q`, then `XQ` (`IQN`) if `has_xq`.
    ///
    /// # Panics
    /// If neither `has_q` nor `has_xq` is set.
    pub fn sequential(
        kind: SeqKind,
        has_q: bool,
        has_xq: bool,
        has_clear: bool,
        has_preset: bool,
    ) -> Self {
        assert!(has_q || has_xq, "a sequential signature needs an output");
        let var_num = 4 + usize::from(has_clear) + usize::from(has_preset);
        let lit = |var: VarId| TruthTable::literal(var_num, var, false);
        let preset_var = if has_clear { 5 } else { 4 };
        let funcs = SeqFuncs {
            clock: lit(2),
            next_state: lit(3),
            clear: has_clear.then(|| lit(4)),
            preset: has_preset.then(|| lit(preset_var)),
            clear_preset: [ClearPresetValue::X; 2],
        };
        let outputs = [(has_q, 0), (has_xq, 1)]
            .into_iter()
            .filter(|&(present, _)| present)
            .map(|(_, var)| OutputFuncs {
                logic: Some(lit(var)),
                tristate: None,
            })
            .collect();
        Signature {
            kind: match kind {
                SeqKind::FlipFlop => SignatureKind::FlipFlop(funcs),
                SeqKind::Latch => SignatureKind::Latch(funcs),
            },
            input_num: var_num - 2,
            outputs,
        }
    }

    /// Signature of any cell.
    pub fn from_cell(cell: &Cell) -> Result<Self> {
        let ni = cell.input_num();
        let info = cell.kind().seq_info();
        let var_num = if info.is_some() { ni + 2 } else { ni };
        // Pins are shifted to make room for IQ/IQN in front.
        let table = |expr: &Expr| -> Result<TruthTable> {
            if info.is_none() {
                return expr.to_truth_table(var_num);
            }
            expr.map_literals(&|var, inv| {
                let var = if var < ni { var + 2 } else { var - ni };
                Expr::literal(var, inv)
            })
            .to_truth_table(var_num)
        };

        let kind = match cell.kind() {
            CellKind::Logic => SignatureKind::Logic,
            CellKind::FlipFlop(info) | CellKind::Latch(info) => {
                let funcs = SeqFuncs {
                    clock: table(&info.clock)?,
                    next_state: table(&info.next_state)?,
                    clear: info.clear.as_ref().map(table).transpose()?,
                    preset: info.preset.as_ref().map(table).transpose()?,
                    clear_preset: if info.clear.is_some() && info.preset.is_some() {
                        [info.clear_preset_var1, info.clear_preset_var2]
                    } else {
                        [ClearPresetValue::X; 2]
                    },
                };
                if matches!(cell.kind(), CellKind::FlipFlop(_)) {
                    SignatureKind::FlipFlop(funcs)
                } else {
                    SignatureKind::Latch(funcs)
                }
            }
        };
        let outputs = cell
            .outputs()
            .iter()
            .map(|o| {
                Ok(OutputFuncs {
                    logic: o.logic.as_ref().map(table).transpose()?,
                    tristate: o.tristate.as_ref().map(table).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Signature {
            kind,
            input_num: ni,
            outputs,
        })
    }

    pub fn kind(&self) -> &SignatureKind {
        &self.kind
    }

    pub fn is_logic(&self) -> bool {
        matches!(self.kind, SignatureKind::Logic)
    }

    pub fn is_ff(&self) -> bool {
        matches!(self.kind, SignatureKind::FlipFlop(_))
    }

    pub fn is_latch(&self) -> bool {
        matches!(self.kind, SignatureKind::Latch(_))
    }

    /// Structural bits: kind in bits 0-1 (0 logic, 1 flip-flop, 2 latch),
    /// clear presence in bit 2, preset presence in bit 3.
    pub fn type_bits(&self) -> u8 {
        let kind = match self.kind {
            SignatureKind::Logic => 0,
            SignatureKind::FlipFlop(_) => 1,
            SignatureKind::Latch(_) => 2,
        };
        kind | (u8::from(self.has_clear()) << 2) | (u8::from(self.has_preset()) << 3)
    }

    pub fn input_num(&self) -> usize {
        self.input_num
    }

    pub fn output_num(&self) -> usize {
        self.outputs.len()
    }

    fn seq_funcs(&self) -> Option<&SeqFuncs> {
        match &self.kind {
            SignatureKind::Logic => None,
            SignatureKind::FlipFlop(funcs) | SignatureKind::Latch(funcs) => Some(funcs),
        }
    }

    /// Clock (flip-flop) or enable (latch) function.
    pub fn clock(&self) -> Option<&TruthTable> {
        self.seq_funcs().map(|f| &f.clock)
    }

    /// Next state (flip-flop) or data in (latch) function.
    pub fn next_state(&self) -> Option<&TruthTable> {
        self.seq_funcs().map(|f| &f.next_state)
    }

    pub fn has_clear(&self) -> bool {
        self.clear_func().is_some()
    }

    pub fn clear_func(&self) -> Option<&TruthTable> {
        self.seq_funcs().and_then(|f| f.clear.as_ref())
    }

    pub fn has_preset(&self) -> bool {
        self.preset_func().is_some()
    }

    pub fn preset_func(&self) -> Option<&TruthTable> {
        self.seq_funcs().and_then(|f| f.preset.as_ref())
    }

    pub fn has_logic(&self, o: usize) -> bool {
        self.outputs[o].logic.is_some()
    }

    pub fn output_func(&self, o: usize) -> Option<&TruthTable> {
        self.outputs[o].logic.as_ref()
    }

    pub fn is_tristate(&self, o: usize) -> bool {
        self.outputs[o].tristate.is_some()
    }

    pub fn tristate_func(&self, o: usize) -> Option<&TruthTable> {
        self.outputs[o].tristate.as_ref()
    }

    /// Textual key, equal for two signatures if and only if they are equal.
    pub fn fingerprint(&self) -> String {
        let mut s = format!("{}:{}:{}:", self.type_bits(), self.input_num, self.output_num());
        if let Some(funcs) = self.seq_funcs() {
            push_table(&mut s, Some(&funcs.clock));
            push_table(&mut s, Some(&funcs.next_state));
            if funcs.clear.is_some() {
                push_table(&mut s, funcs.clear.as_ref());
            }
            if funcs.preset.is_some() {
                push_table(&mut s, funcs.preset.as_ref());
            }
            if funcs.clear.is_some() && funcs.preset.is_some() {
                let [cpv1, cpv2] = funcs.clear_preset;
                let _ = write!(s, "{cpv1:?}{cpv2:?}:");
            }
        }
        for output in &self.outputs {
            let bits = u8::from(output.logic.is_some()) | (u8::from(output.tristate.is_some()) << 1);
            let _ = write!(s, "{bits}:");
            if output.logic.is_some() {
                push_table(&mut s, output.logic.as_ref());
            }
            if output.tristate.is_some() {
                push_table(&mut s, output.tristate.as_ref());
            }
        }
        s
    }

    /// True for single-output, non-tristate, pure logic signatures.
    pub fn is_canonicalizable(&self) -> bool {
        self.is_logic()
            && self.output_num() == 1
            && self.outputs[0].logic.is_some()
            && self.outputs[0].tristate.is_none()
    }

    /// The NPN canonical signature, and the transform bringing this signature to it.
    pub fn canonical_form(&self) -> Result<(Signature, NpnMap)> {
        let func = match (&self.kind, self.outputs.as_slice()) {
            (
                SignatureKind::Logic,
                [
                    OutputFuncs {
                        logic: Some(func),
                        tristate: None,
                    },
                ],
            ) => func,
            _ => return Err(LibraryError::NotCanonicalizable),
        };
        let map = canonical_map(func);
        let canonical = Signature {
            kind: SignatureKind::Logic,
            input_num: self.input_num,
            outputs: vec![OutputFuncs {
                logic: Some(func.xform(&map)),
                tristate: None,
            }],
        };
        Ok((canonical, map))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CellOutput, CellPin, PinDirection, SeqInfo};

    #[test]
    fn ff_signature_test() {
        let sig = Signature::sequential(SeqKind::FlipFlop, true, false, false, false);
        assert!(sig.is_ff());
        assert_eq!(sig.input_num(), 2);
        assert_eq!(sig.output_num(), 1);
        assert_eq!(sig.clock(), Some(&TruthTable::literal(4, 2, false)));
        assert_eq!(sig.next_state(), Some(&TruthTable::literal(4, 3, false)));
        assert!(!sig.has_clear());
        assert!(!sig.has_preset());
        assert_eq!(sig.output_func(0), Some(&TruthTable::literal(4, 0, false)));
        assert_eq!(sig.type_bits(), 1);

        let sig = Signature::sequential(SeqKind::FlipFlop, true, false, true, false);
        assert_eq!(sig.input_num(), 3);
        assert!(sig.has_clear());
        assert_eq!(sig.clear_func(), Some(&TruthTable::literal(5, 4, false)));
        assert_eq!(sig.type_bits(), 0b101);

        let sig = Signature::sequential(SeqKind::FlipFlop, true, false, true, true);
        assert_eq!(sig.input_num(), 4);
        assert!(sig.has_preset());
        assert_eq!(sig.preset_func(), Some(&TruthTable::literal(6, 5, false)));
    }

    #[test]
    fn latch_signature_test() {
        let sig = Signature::sequential(SeqKind::Latch, true, true, false, true);
        assert!(sig.is_latch());
        assert_eq!(sig.input_num(), 3);
        assert_eq!(sig.output_num(), 2);
        assert_eq!(sig.output_func(0), Some(&TruthTable::literal(5, 0, false)));
        assert_eq!(sig.output_func(1), Some(&TruthTable::literal(5, 1, false)));
        assert_eq!(sig.preset_func(), Some(&TruthTable::literal(5, 4, false)));
        assert_eq!(sig.type_bits(), 0b1010);

        let xq_only = Signature::sequential(SeqKind::Latch, false, true, false, false);
        assert_eq!(xq_only.output_func(0), Some(&TruthTable::literal(4, 1, false)));
        assert_ne!(xq_only.fingerprint(), sig.fingerprint());
    }

    #[test]
    fn cell_matches_synthetic_test() {
        let pins = vec![
            CellPin::new("CK", PinDirection::Input),
            CellPin::new("D", PinDirection::Input),
            CellPin::new("Q", PinDirection::Output),
            CellPin::new("QN", PinDirection::Output),
        ];
        // Q = IQ (variable 2), QN = IQN (variable 3).
        let cell = Cell::new(
            "DFF",
            pins,
            vec![
                CellOutput::logic(Expr::posi_literal(2)),
                CellOutput::logic(Expr::posi_literal(3)),
            ],
            CellKind::FlipFlop(SeqInfo::new(Expr::posi_literal(0), Expr::posi_literal(1))),
        )
        .unwrap();
        let sig = Signature::from_cell(&cell).unwrap();
        let synthetic = Signature::sequential(SeqKind::FlipFlop, true, true, false, false);
        assert_eq!(sig, synthetic);
        assert_eq!(sig.fingerprint(), synthetic.fingerprint());
    }

    #[test]
    fn fingerprint_test() {
        let f = Expr::posi_literal(0) & Expr::posi_literal(1);
        let sig = Signature::from_expr(&f);
        assert_eq!(sig.fingerprint(), "0:2:1:1:8:");
        let cell = Cell::logic("AND2", &["A", "B"], "Y", f).unwrap();
        assert_eq!(Signature::from_cell(&cell).unwrap(), sig);

        let pins = vec![
            CellPin::new("A", PinDirection::Input),
            CellPin::new("EN", PinDirection::Input),
            CellPin::new("Y", PinDirection::Output),
        ];
        let tbuf = Cell::new(
            "TBUF",
            pins,
            vec![CellOutput {
                logic: Some(Expr::posi_literal(0)),
                tristate: Some(Expr::posi_literal(1)),
            }],
            CellKind::Logic,
        )
        .unwrap();
        let sig = Signature::from_cell(&tbuf).unwrap();
        assert!(sig.is_tristate(0));
        assert!(!sig.is_canonicalizable());
        assert_eq!(sig.fingerprint(), "0:2:1:3:a:c:");
        assert!(matches!(sig.canonical_form(), Err(LibraryError::NotCanonicalizable)));
    }

    #[test]
    fn canonical_form_test() {
        let f = Expr::posi_literal(0) & Expr::nega_literal(1);
        let g = Expr::nega_literal(0) & Expr::posi_literal(1);
        let (cf, mf) = Signature::from_expr(&f).canonical_form().unwrap();
        let (cg, mg) = Signature::from_expr(&g).canonical_form().unwrap();
        assert_eq!(cf, cg);
        assert_ne!(mf, mg);
        assert_eq!(f.truth_table().xform(&mf), *cf.output_func(0).unwrap());
    }
}
