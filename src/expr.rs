//! Boolean expressions over indexed variables, as produced by the library parsers.

use std::ops::{BitAnd, BitOr, BitXor, Not};

use crate::{LibraryError, NpnMap, Result, TruthTable};

/// A variable index.
pub type VarId = usize;

/// A Boolean expression.
///
/// Operators have arbitrary fan-in. The constructors ([`Expr::and`], [`Expr::or`], [`Expr::xor`]
/// and the `&`, `|`, `^` operators) flatten nested operands of the same operator, so that
/// `a & b & c` is a single AND with three operands.
///
/// ```rust
/// use clibcomp::Expr;
/// let a = Expr::posi_literal(0);
/// let b = Expr::posi_literal(1);
/// let c = Expr::posi_literal(2);
/// let f = a & b & c;
/// assert_eq!(f.operands().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    Zero,
    One,
    Literal { var: VarId, inv: bool },
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Xor(Vec<Expr>),
}

fn flatten(operands: Vec<Expr>, is_same: impl Fn(&Expr) -> bool) -> Vec<Expr> {
    let mut flat = Vec::with_capacity(operands.len());
    for operand in operands {
        if is_same(&operand) {
            flat.extend(operand.into_operands());
        } else {
            flat.push(operand);
        }
    }
    flat
}

impl Expr {
    pub fn literal(var: VarId, inv: bool) -> Self {
        Expr::Literal { var, inv }
    }

    pub fn posi_literal(var: VarId) -> Self {
        Expr::literal(var, false)
    }

    pub fn nega_literal(var: VarId) -> Self {
        Expr::literal(var, true)
    }

    /// AND of `operands` (a single operand is returned as is).
    pub fn and(operands: Vec<Expr>) -> Self {
        let mut flat = flatten(operands, |e| matches!(e, Expr::And(_)));
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Expr::And(flat)
    }

    /// OR of `operands` (a single operand is returned as is).
    pub fn or(operands: Vec<Expr>) -> Self {
        let mut flat = flatten(operands, |e| matches!(e, Expr::Or(_)));
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Expr::Or(flat)
    }

    /// XOR of `operands` (a single operand is returned as is).
    pub fn xor(operands: Vec<Expr>) -> Self {
        let mut flat = flatten(operands, |e| matches!(e, Expr::Xor(_)));
        if flat.len() == 1 {
            return flat.remove(0);
        }
        Expr::Xor(flat)
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Zero | Expr::One)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal { .. })
    }

    pub fn is_op(&self) -> bool {
        matches!(self, Expr::And(_) | Expr::Or(_) | Expr::Xor(_))
    }

    /// Operands of an operator, empty for constants and literals.
    pub fn operands(&self) -> &[Expr] {
        match self {
            Expr::And(operands) | Expr::Or(operands) | Expr::Xor(operands) => operands,
            _ => &[],
        }
    }

    fn into_operands(self) -> Vec<Expr> {
        match self {
            Expr::And(operands) | Expr::Or(operands) | Expr::Xor(operands) => operands,
            _ => Vec::new(),
        }
    }

    /// One plus the largest variable index used, 0 if there is none.
    pub fn input_size(&self) -> usize {
        match self {
            Expr::Zero | Expr::One => 0,
            Expr::Literal { var, .. } => var + 1,
            _ => self.operands().iter().map(Expr::input_size).max().unwrap_or(0),
        }
    }

    /// Largest operand count of any operator in the expression.
    pub fn max_fanin(&self) -> usize {
        self.operands()
            .iter()
            .map(Expr::max_fanin)
            .fold(self.operands().len(), usize::max)
    }

    /// Rebuilds the expression with every literal replaced by `f(var, inv)`.
    ///
    /// The operator structure is kept as is (no flattening).
    pub fn map_literals(&self, f: &impl Fn(VarId, bool) -> Expr) -> Expr {
        let map_all = |operands: &[Expr]| -> Vec<Expr> {
            operands.iter().map(|e| e.map_literals(f)).collect()
        };
        match self {
            Expr::Zero => Expr::Zero,
            Expr::One => Expr::One,
            Expr::Literal { var, inv } => f(*var, *inv),
            Expr::And(operands) => Expr::And(map_all(operands)),
            Expr::Or(operands) => Expr::Or(map_all(operands)),
            Expr::Xor(operands) => Expr::Xor(map_all(operands)),
        }
    }

    /// Applies an NPN transform (only its first output is used): variable `i` is replaced by
    /// `imap(i)`, then the whole expression is inverted if `omap(0)` is.
    ///
    /// # Panics
    /// If the expression uses a variable the transform does not map.
    pub fn xform(&self, map: &NpnMap) -> Expr {
        let body = self.map_literals(&|var, inv| {
            let m = map.imap(var);
            Expr::literal(m.var, inv ^ m.inv)
        });
        if map.output_num() > 0 && map.omap(0).inv {
            !body
        } else {
            body
        }
    }

    /// The truth table of the expression as a function of `input_num` inputs.
    pub fn to_truth_table(&self, input_num: usize) -> Result<TruthTable> {
        let size = self.input_size();
        if size > input_num {
            return Err(LibraryError::VarOutOfRange {
                var: size - 1,
                input_num,
            });
        }
        Ok(self.eval(input_num))
    }

    /// The truth table of the expression over its own [`input_size`](Expr::input_size).
    pub fn truth_table(&self) -> TruthTable {
        self.eval(self.input_size())
    }

    fn eval(&self, n: usize) -> TruthTable {
        match self {
            Expr::Zero => TruthTable::zero(n),
            Expr::One => TruthTable::one(n),
            Expr::Literal { var, inv } => TruthTable::literal(n, *var, *inv),
            Expr::And(operands) => operands
                .iter()
                .fold(TruthTable::one(n), |acc, e| acc & e.eval(n)),
            Expr::Or(operands) => operands
                .iter()
                .fold(TruthTable::zero(n), |acc, e| acc | e.eval(n)),
            Expr::Xor(operands) => operands
                .iter()
                .fold(TruthTable::zero(n), |acc, e| acc ^ e.eval(n)),
        }
    }
}

impl Not for Expr {
    type Output = Self;

    /// Pushed down to the literals: De Morgan for AND/OR, first operand for XOR.
    fn not(self) -> Self::Output {
        match self {
            Expr::Zero => Expr::One,
            Expr::One => Expr::Zero,
            Expr::Literal { var, inv } => Expr::Literal { var, inv: !inv },
            Expr::And(operands) => Expr::Or(operands.into_iter().map(|e| !e).collect()),
            Expr::Or(operands) => Expr::And(operands.into_iter().map(|e| !e).collect()),
            Expr::Xor(mut operands) => {
                if let Some(first) = operands.first_mut() {
                    *first = !std::mem::replace(first, Expr::Zero);
                    Expr::Xor(operands)
                } else {
                    Expr::One
                }
            }
        }
    }
}

impl BitAnd for Expr {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Expr::and(vec![self, rhs])
    }
}

impl BitOr for Expr {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Expr::or(vec![self, rhs])
    }
}

impl BitXor for Expr {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        Expr::xor(vec![self, rhs])
    }
}
