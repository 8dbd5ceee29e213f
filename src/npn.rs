//! NPN transforms and canonicalization of single-output functions.
//!
//! Two functions are NPN equivalent if one can be obtained from the other by permuting inputs,
//! inverting some inputs and/or inverting the output.
//! [`canonical_map`] picks one representative per equivalence class: the smallest table (see
//! [`TruthTable`]'s ordering) among the candidates left once polarities and input order are
//! normalized by ones counts. The search is a branch and bound over input positions, most
//! significant rows first.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{TruthTable, VarId, enumerate::Permutations};

/// Destination of one variable under a transform, possibly inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarMap {
    pub var: VarId,
    pub inv: bool,
}

impl VarMap {
    pub fn new(var: VarId, inv: bool) -> Self {
        VarMap { var, inv }
    }
}

/// An input/output permutation with per-pin polarity.
///
/// Input `i` of the source function becomes input `imap(i).var` of the destination,
/// inverted if `imap(i).inv`. Same for outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NpnMap {
    inputs: Vec<VarMap>,
    outputs: Vec<VarMap>,
}

impl NpnMap {
    pub fn new(inputs: Vec<VarMap>, outputs: Vec<VarMap>) -> Self {
        NpnMap { inputs, outputs }
    }

    pub fn identity(input_num: usize, output_num: usize) -> Self {
        NpnMap {
            inputs: (0..input_num).map(|i| VarMap::new(i, false)).collect(),
            outputs: (0..output_num).map(|o| VarMap::new(o, false)).collect(),
        }
    }

    /// Single-output map sending input `order[p]` to position `p`, with input polarities `inv`
    /// (indexed by source input) and output polarity `oinv`.
    pub fn from_order(order: &[VarId], inv: &[bool], oinv: bool) -> Self {
        let mut inputs = vec![VarMap::new(0, false); order.len()];
        for (pos, &src) in order.iter().enumerate() {
            inputs[src] = VarMap::new(pos, inv[src]);
        }
        NpnMap {
            inputs,
            outputs: vec![VarMap::new(0, oinv)],
        }
    }

    pub fn input_num(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_num(&self) -> usize {
        self.outputs.len()
    }

    pub fn imap(&self, i: VarId) -> VarMap {
        self.inputs[i]
    }

    pub fn omap(&self, o: usize) -> VarMap {
        self.outputs[o]
    }

    pub fn is_identity(&self) -> bool {
        let id = |(i, m): (usize, &VarMap)| m.var == i && !m.inv;
        self.inputs.iter().enumerate().all(id) && self.outputs.iter().enumerate().all(id)
    }

    /// The transform undoing this one.
    pub fn inverse(&self) -> NpnMap {
        let invert = |maps: &[VarMap]| {
            let mut res = vec![VarMap::new(0, false); maps.len()];
            for (src, m) in maps.iter().enumerate() {
                res[m.var] = VarMap::new(src, m.inv);
            }
            res
        };
        NpnMap {
            inputs: invert(&self.inputs),
            outputs: invert(&self.outputs),
        }
    }
}

/// A partial canonical candidate.
///
/// `base` is the input point read by the most significant row, `order[k]` the input placed at
/// position `k`. Row `m` counted from the top reads `base` with the inputs of the set bits of `m`
/// flipped, so placing position `k` fixes rows `2^k..2^(k+1)` from the top.
#[derive(Debug, Clone)]
struct Branch {
    oinv: bool,
    base: usize,
    order: Vec<VarId>,
}

impl Branch {
    fn top_row(&self, func: &TruthTable, m: usize) -> bool {
        let point = self
            .order
            .iter()
            .enumerate()
            .filter(|&(k, _)| (m >> k) & 1 == 1)
            .fold(self.base, |acc, (_, &var)| acc ^ (1 << var));
        func.value(point) ^ self.oinv
    }

    fn base_bit(&self, var: VarId) -> bool {
        (self.base >> var) & 1 == 1
    }
}

/// Branches whose rows fixed so far are the smallest seen.
#[derive(Debug, Default)]
struct Frontier {
    rows: Option<Vec<bool>>,
    branches: Vec<Branch>,
}

impl Frontier {
    fn offer(&mut self, rows: Vec<bool>, branch: Branch) {
        match self.rows.as_ref().map(|best| rows.cmp(best)) {
            Some(Ordering::Greater) => {}
            Some(Ordering::Equal) => self.branches.push(branch),
            _ => {
                self.rows = Some(rows);
                self.branches.clear();
                self.branches.push(branch);
            }
        }
    }
}

/// The transform bringing `func` to its NPN canonical form.
///
/// `func.xform(&canonical_map(func))` is the same table for every member of an NPN class.
///
/// Candidates have the output polarity with at most half ones, input polarities whose positive
/// cofactor has no more ones than the negative one, and inputs sorted by that count; ties are
/// open. The smallest candidate table is built one input position at a time, keeping only the
/// partial candidates whose fixed rows are minimal. Two swap-symmetric inputs with the same base
/// value lead to the same rows, so only one of them is tried.
pub fn canonical_map(func: &TruthTable) -> NpnMap {
    let n = func.input_num();
    let half = func.row_num() / 2;
    let output_choices: &[bool] = match (2 * func.count_ones()).cmp(&func.row_num()) {
        Ordering::Less => &[false],
        Ordering::Greater => &[true],
        Ordering::Equal => &[false, true],
    };
    let symmetric: Vec<Vec<bool>> = (0..n)
        .map(|a| (0..n).map(|b| func.is_symmetric(a, b)).collect())
        .collect();

    // Per output polarity: the sort key of every input, and the keys sorted by position.
    let mut keys: [(Vec<usize>, Vec<usize>); 2] = Default::default();
    let mut frontier = Frontier::default();
    for &oinv in output_choices {
        let mut base = 0;
        let mut free = Vec::new();
        let mut var_keys = Vec::with_capacity(n);
        for var in 0..n {
            let mut pos = func.cofactor_count(var, true);
            let mut neg = func.cofactor_count(var, false);
            if oinv {
                (pos, neg) = (half - pos, half - neg);
            }
            match pos.cmp(&neg) {
                Ordering::Less => base |= 1 << var,
                Ordering::Greater => {}
                Ordering::Equal => free.push(var),
            }
            var_keys.push(pos.min(neg));
        }
        for bits in 0..(1usize << free.len()) {
            let base = free
                .iter()
                .enumerate()
                .filter(|&(k, _)| (bits >> k) & 1 == 1)
                .fold(base, |acc, (_, &var)| acc | (1 << var));
            let branch = Branch {
                oinv,
                base,
                order: Vec::with_capacity(n),
            };
            frontier.offer(vec![branch.top_row(func, 0)], branch);
        }
        let mut sorted = var_keys.clone();
        sorted.sort_unstable();
        keys[usize::from(oinv)] = (var_keys, sorted);
    }

    for k in 0..n {
        let mut next = Frontier::default();
        for branch in &frontier.branches {
            let (var_keys, sorted) = &keys[usize::from(branch.oinv)];
            let allowed =
                |var: VarId| !branch.order.contains(&var) && var_keys[var] == sorted[k];
            for var in (0..n).filter(|&var| allowed(var)) {
                if (0..var).any(|t| {
                    allowed(t) && symmetric[var][t] && branch.base_bit(t) == branch.base_bit(var)
                }) {
                    continue;
                }
                let mut child = branch.clone();
                child.order.push(var);
                let rows = ((1 << k)..(1 << (k + 1)))
                    .map(|m| child.top_row(func, m))
                    .collect();
                next.offer(rows, child);
            }
        }
        frontier = next;
    }

    match frontier.branches.first() {
        Some(branch) => {
            let inv: Vec<bool> = (0..n).map(|var| !branch.base_bit(var)).collect();
            NpnMap::from_order(&branch.order, &inv, branch.oinv)
        }
        None => NpnMap::identity(n, 1),
    }
}

/// Every non-identity transform mapping `func` onto itself.
///
/// This is exhaustive over all `2 * 2^n * n!` transforms, callers bound `n`.
pub fn automorphisms(func: &TruthTable) -> Vec<NpnMap> {
    let n = func.input_num();
    let mut list = Vec::new();
    for order in Permutations::new(n) {
        for bits in 0..(1usize << n) {
            let inv: Vec<bool> = (0..n).map(|i| (bits >> i) & 1 == 1).collect();
            for oinv in [false, true] {
                let map = NpnMap::from_order(&order, &inv, oinv);
                if !map.is_identity() && func.xform(&map) == *func {
                    list.push(map);
                }
            }
        }
    }
    list
}

#[cfg(test)]
mod test {
    use std::time::{Duration, Instant};

    use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

    use super::*;

    fn lit(n: usize, var: VarId, inv: bool) -> TruthTable {
        TruthTable::literal(n, var, inv)
    }

    fn canon(func: &TruthTable) -> TruthTable {
        func.xform(&canonical_map(func))
    }

    #[test]
    fn and_or_same_class_test() {
        let and2 = lit(2, 0, false) & lit(2, 1, false);
        let or2 = lit(2, 0, false) | lit(2, 1, false);
        let nand2 = !(and2.clone());
        let mixed = lit(2, 0, true) & lit(2, 1, false);
        assert_eq!(canon(&and2), canon(&or2));
        assert_eq!(canon(&and2), canon(&nand2));
        assert_eq!(canon(&and2), canon(&mixed));
        // The canonical AND is the NOR table (single one at row 0).
        assert_eq!(canon(&and2).to_hex(), "1");
        assert_ne!(canon(&and2), canon(&(lit(2, 0, false) ^ lit(2, 1, false))));
    }

    #[test]
    fn permuted_inputs_test() {
        // f = x0 & (x1 | x2), g = x2 & (x0 | x1)
        let f = lit(3, 0, false) & (lit(3, 1, false) | lit(3, 2, false));
        let g = lit(3, 2, false) & (lit(3, 0, false) | lit(3, 1, false));
        let h = lit(3, 0, false) & lit(3, 1, false) & lit(3, 2, false);
        assert_eq!(canon(&f), canon(&g));
        assert_ne!(canon(&f), canon(&h));
        assert_ne!(canonical_map(&f), canonical_map(&g));
    }

    #[test]
    fn mux_test() {
        // mux(d0, d1, s) in two different pin orders and polarities.
        let n = 3;
        let m1 = (lit(n, 0, false) & lit(n, 2, true)) | (lit(n, 1, false) & lit(n, 2, false));
        let m2 = (lit(n, 2, true) & lit(n, 0, false)) | (lit(n, 1, false) & lit(n, 0, true));
        let m3 = !((lit(n, 0, false) & lit(n, 2, true)) | (lit(n, 1, true) & lit(n, 2, false)));
        assert_eq!(canon(&m1), canon(&m2));
        assert_eq!(canon(&m1), canon(&m3));
    }

    #[test]
    fn wide_function_test() {
        // Parity with one extra AND input, 7 inputs, in two pin orders.
        let n = 7;
        let f = (0..6).fold(TruthTable::zero(n), |acc, i| acc ^ lit(n, i, false)) & lit(n, 6, false);
        let g = (1..7).fold(TruthTable::zero(n), |acc, i| acc ^ lit(n, i, i == 3)) & lit(n, 0, true);
        assert_eq!(canon(&f), canon(&g));
    }

    fn random_table(rng: &mut StdRng, n: usize) -> TruthTable {
        let mut table = TruthTable::zero(n);
        for row in 0..table.row_num() {
            table.set_value(row, rng.gen_bool(0.5));
        }
        table
    }

    fn random_map(rng: &mut StdRng, n: usize) -> NpnMap {
        let mut order: Vec<VarId> = (0..n).collect();
        order.shuffle(rng);
        let inv: Vec<bool> = (0..n).map(|_| rng.gen_bool(0.5)).collect();
        NpnMap::from_order(&order, &inv, rng.gen_bool(0.5))
    }

    #[test]
    fn random_class_test() {
        let mut rng = StdRng::seed_from_u64(42);
        for n in 1..=6 {
            for _ in 0..50 {
                let f = random_table(&mut rng, n);
                let g = f.xform(&random_map(&mut rng, n));
                assert_eq!(canon(&f), canon(&g));
            }
        }
    }

    #[test]
    fn balanced_wide_function_test() {
        // f = x0 ^ g(x1..x7): every cofactor of f is balanced.
        let n = 8;
        let mut rng = StdRng::seed_from_u64(7);
        let g = random_table(&mut rng, n - 1);
        let mut f = TruthTable::zero(n);
        for row in 0..f.row_num() {
            f.set_value(row, g.value(row >> 1) ^ (row & 1 == 1));
        }
        for var in 0..n {
            assert_eq!(f.cofactor_count(var, true), f.cofactor_count(var, false));
        }

        let start = Instant::now();
        let moved = f.xform(&random_map(&mut rng, n));
        assert_eq!(canon(&f), canon(&moved));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn inverse_test() {
        let f = lit(3, 0, false) & (lit(3, 1, true) | lit(3, 2, false));
        let map = canonical_map(&f);
        let c = f.xform(&map);
        assert_eq!(c.xform(&map.inverse()), f);
        assert!(NpnMap::identity(3, 1).is_identity());
        assert!(!map.is_identity() || c == f);
    }

    #[test]
    fn automorphisms_test() {
        // AND2 is fixed by swapping its inputs only.
        let and2 = lit(2, 0, false) & lit(2, 1, false);
        let autos = automorphisms(&and2);
        assert_eq!(autos.len(), 1);
        assert_eq!(autos[0].imap(0), VarMap::new(1, false));
        assert_eq!(autos[0].imap(1), VarMap::new(0, false));
        for map in &autos {
            assert_eq!(and2.xform(map), and2);
        }

        // XOR2: 2 orders x 4 input phases x matching output phase, minus identity.
        let xor2 = lit(2, 0, false) ^ lit(2, 1, false);
        assert_eq!(automorphisms(&xor2).len(), 7);

        // AND3: every input permutation, nothing else.
        let and3 = lit(3, 0, false) & lit(3, 1, false) & lit(3, 2, false);
        let autos = automorphisms(&and3);
        assert_eq!(autos.len(), 5);
        assert!(autos.iter().all(|m| !m.omap(0).inv));

        // A buffer is fixed by inverting both its input and its output.
        let buf = automorphisms(&lit(1, 0, false));
        assert_eq!(buf, vec![NpnMap::from_order(&[0], &[true], true)]);
    }
}
