//! Fixed-width truth tables.
//!
//! Row `r` of a function with `n` inputs holds the output value when input `i` is set to bit `i` of `r`.

use std::{
    cmp::Ordering,
    fmt::Write,
    ops::{BitAnd, BitOr, BitXor, Not},
};

use serde::{Deserialize, Serialize};

use crate::{NpnMap, VarId};

/// Masks of the rows where variable `i < 6` is set, within one word.
const VAR_MASKS: [u64; 6] = [
    0xAAAA_AAAA_AAAA_AAAA,
    0xCCCC_CCCC_CCCC_CCCC,
    0xF0F0_F0F0_F0F0_F0F0,
    0xFF00_FF00_FF00_FF00,
    0xFFFF_0000_FFFF_0000,
    0xFFFF_FFFF_0000_0000,
];

/// The truth table of a single-output Boolean function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TruthTable {
    input_num: usize,
    /// Unused high bits (functions with less than 6 inputs) are always cleared.
    words: Vec<u64>,
}

fn word_num(input_num: usize) -> usize {
    if input_num < 6 { 1 } else { 1 << (input_num - 6) }
}

fn valid_mask(input_num: usize) -> u64 {
    if input_num >= 6 {
        u64::MAX
    } else {
        (1u64 << (1 << input_num)) - 1
    }
}

impl TruthTable {
    /// The constant 0 function.
    pub fn zero(input_num: usize) -> Self {
        TruthTable {
            input_num,
            words: vec![0; word_num(input_num)],
        }
    }

    /// The constant 1 function.
    pub fn one(input_num: usize) -> Self {
        !TruthTable::zero(input_num)
    }

    /// The function `x_var` (or `!x_var` if `inv`).
    ///
    /// # Panics
    /// If `var >= input_num`.
    pub fn literal(input_num: usize, var: VarId, inv: bool) -> Self {
        assert!(
            var < input_num,
            "variable {var} out of range for {input_num} inputs"
        );
        let mask = valid_mask(input_num);
        let words = (0..word_num(input_num))
            .map(|w| {
                let word = if var < 6 {
                    VAR_MASKS[var]
                } else if (w >> (var - 6)) & 1 == 1 {
                    u64::MAX
                } else {
                    0
                };
                (if inv { !word } else { word }) & mask
            })
            .collect();
        TruthTable { input_num, words }
    }

    pub fn input_num(&self) -> usize {
        self.input_num
    }

    pub fn row_num(&self) -> usize {
        1 << self.input_num
    }

    /// Output value for the given row.
    pub fn value(&self, row: usize) -> bool {
        (self.words[row >> 6] >> (row & 63)) & 1 == 1
    }

    pub(crate) fn set_value(&mut self, row: usize, value: bool) {
        let bit = 1u64 << (row & 63);
        if value {
            self.words[row >> 6] |= bit;
        } else {
            self.words[row >> 6] &= !bit;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Number of ones among the rows where `var` has value `value`.
    pub fn cofactor_count(&self, var: VarId, value: bool) -> usize {
        self.words
            .iter()
            .enumerate()
            .map(|(w, &word)| {
                let selected = if var < 6 {
                    if value { word & VAR_MASKS[var] } else { word & !VAR_MASKS[var] }
                } else if ((w >> (var - 6)) & 1 == 1) == value {
                    word
                } else {
                    0
                };
                selected.count_ones() as usize
            })
            .sum()
    }

    /// True if swapping inputs `a` and `b` leaves the function unchanged.
    pub fn is_symmetric(&self, a: VarId, b: VarId) -> bool {
        if a == b {
            return true;
        }
        let (bit_a, bit_b) = (1usize << a, 1usize << b);
        (0..self.row_num())
            .filter(|row| row & bit_a == 0 && row & bit_b != 0)
            .all(|row| self.value(row) == self.value(row ^ bit_a ^ bit_b))
    }

    /// Applies an NPN transform (only its first output is used).
    ///
    /// The result `g` satisfies `g(y) = f(x) ^ omap(0).inv` where `x_i = y[imap(i).var] ^ imap(i).inv`.
    ///
    /// # Panics
    /// If the transform does not have exactly as many inputs as the function.
    pub fn xform(&self, map: &NpnMap) -> TruthTable {
        assert_eq!(map.input_num(), self.input_num);
        let oinv = map.output_num() > 0 && map.omap(0).inv;
        let mut res = TruthTable::zero(self.input_num);
        for row in 0..self.row_num() {
            let src = (0..self.input_num).fold(0, |acc, i| {
                let m = map.imap(i);
                let bit = ((row >> m.var) & 1 == 1) ^ m.inv;
                acc | (usize::from(bit) << i)
            });
            res.set_value(row, self.value(src) ^ oinv);
        }
        res
    }

    /// Hexadecimal rendering, most significant row first, fixed width for a given input count.
    pub fn to_hex(&self) -> String {
        let width = if self.input_num < 2 {
            1
        } else if self.input_num < 6 {
            1 << (self.input_num - 2)
        } else {
            16
        };
        let mut s = String::with_capacity(width * self.words.len());
        for word in self.words.iter().rev() {
            // Writing into a String never fails.
            let _ = write!(s, "{word:0width$x}");
        }
        s
    }

    fn zip_with(self, rhs: &TruthTable, op: impl Fn(u64, u64) -> u64) -> TruthTable {
        assert_eq!(
            self.input_num, rhs.input_num,
            "truth tables have different input counts"
        );
        let words = self
            .words
            .iter()
            .zip(&rhs.words)
            .map(|(&a, &b)| op(a, b))
            .collect();
        TruthTable {
            input_num: self.input_num,
            words,
        }
    }
}

impl Not for TruthTable {
    type Output = Self;

    fn not(mut self) -> Self::Output {
        let mask = valid_mask(self.input_num);
        for word in self.words.iter_mut() {
            *word = !*word & mask;
        }
        self
    }
}

impl BitAnd for TruthTable {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |a, b| a & b)
    }
}

impl BitOr for TruthTable {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |a, b| a | b)
    }
}

impl BitXor for TruthTable {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.zip_with(&rhs, |a, b| a ^ b)
    }
}

impl Ord for TruthTable {
    /// Fewer inputs first, then numeric order of the tables read as big integers.
    fn cmp(&self, other: &Self) -> Ordering {
        self.input_num
            .cmp(&other.input_num)
            .then_with(|| self.words.iter().rev().cmp(other.words.iter().rev()))
    }
}

impl PartialOrd for TruthTable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::VarMap;

    #[test]
    fn literal_test() {
        let a = TruthTable::literal(2, 0, false);
        let b = TruthTable::literal(2, 1, false);
        assert_eq!(a.to_hex(), "a");
        assert_eq!(b.to_hex(), "c");
        assert_eq!((a.clone() & b.clone()).to_hex(), "8");
        assert_eq!((a.clone() | b.clone()).to_hex(), "e");
        assert_eq!((a ^ b).to_hex(), "6");
        assert_eq!(TruthTable::literal(2, 0, true).to_hex(), "5");

        // Wide literals span several words.
        let x7 = TruthTable::literal(8, 7, false);
        assert_eq!(x7.count_ones(), 128);
        assert!(!x7.value(127));
        assert!(x7.value(128));
        assert_eq!(
            x7.to_hex(),
            format!("{}{}", "f".repeat(32), "0".repeat(32))
        );
    }

    #[test]
    fn constant_test() {
        assert_eq!(TruthTable::one(3).count_ones(), 8);
        assert_eq!(TruthTable::zero(7).count_ones(), 0);
        assert_eq!(TruthTable::one(0).to_hex(), "1");
        assert_eq!(!TruthTable::one(4), TruthTable::zero(4));
    }

    #[test]
    fn cofactor_test() {
        // f = x0 & x1 | x2
        let f = (TruthTable::literal(3, 0, false) & TruthTable::literal(3, 1, false))
            | TruthTable::literal(3, 2, false);
        assert_eq!(f.count_ones(), 5);
        assert_eq!(f.cofactor_count(0, true), 3);
        assert_eq!(f.cofactor_count(0, false), 2);
        assert_eq!(f.cofactor_count(2, true), 4);
        assert_eq!(f.cofactor_count(2, false), 1);

        let g = TruthTable::literal(7, 6, false) & TruthTable::literal(7, 0, false);
        assert_eq!(g.cofactor_count(6, true), 32);
        assert_eq!(g.cofactor_count(6, false), 0);
    }

    #[test]
    fn symmetry_test() {
        let f = (TruthTable::literal(3, 0, false) & TruthTable::literal(3, 1, false))
            | TruthTable::literal(3, 2, false);
        assert!(f.is_symmetric(0, 1));
        assert!(!f.is_symmetric(0, 2));
        assert!(!f.is_symmetric(2, 1));
    }

    #[test]
    fn xform_test() {
        // f = x0 & !x1, map x0 -> y1, x1 -> !y0: g = y1 & y0
        let f = TruthTable::literal(2, 0, false) & TruthTable::literal(2, 1, true);
        let map = NpnMap::new(
            vec![VarMap::new(1, false), VarMap::new(0, true)],
            vec![VarMap::new(0, false)],
        );
        let g = f.xform(&map);
        assert_eq!(g.to_hex(), "8");
        // Output inversion.
        let map = NpnMap::new(
            vec![VarMap::new(0, false), VarMap::new(1, false)],
            vec![VarMap::new(0, true)],
        );
        assert_eq!(f.xform(&map), !f.clone());
    }

    #[test]
    fn order_test() {
        let a = TruthTable::literal(2, 0, false);
        let b = TruthTable::literal(2, 1, false);
        assert!(a < b);
        assert!(TruthTable::one(1) < TruthTable::zero(2));
        let hi = TruthTable::literal(7, 6, false);
        let lo = TruthTable::literal(7, 5, false);
        assert!(lo < hi);
    }
}
