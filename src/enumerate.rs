//! Combinatorial generators used by the pattern enumerator and the NPN canonicalizer.
//!
//! All generators are plain [`Iterator`]s yielding owned vectors, in lexicographic order.

/// Rearranges `seq` into its lexicographic successor (duplicates allowed).
/// Returns false, leaving `seq` untouched, if `seq` was already the last arrangement.
fn next_permutation(seq: &mut [usize]) -> bool {
    if seq.len() < 2 {
        return false;
    }
    let mut i = seq.len() - 1;
    while i > 0 && seq[i - 1] >= seq[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }
    let mut j = seq.len() - 1;
    while seq[j] <= seq[i - 1] {
        j -= 1;
    }
    seq.swap(i - 1, j);
    seq[i..].reverse();
    true
}

/// All permutations of `0..n`.
///
/// ```rust
/// use clibcomp::enumerate::Permutations;
/// let perms: Vec<Vec<usize>> = Permutations::new(3).collect();
/// assert_eq!(perms.len(), 6);
/// assert_eq!(perms[1], vec![0, 2, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct Permutations {
    current: Option<Vec<usize>>,
}

impl Permutations {
    pub fn new(n: usize) -> Self {
        Permutations {
            current: Some((0..n).collect()),
        }
    }
}

impl Iterator for Permutations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut succ = current.clone();
        if next_permutation(&mut succ) {
            self.current = Some(succ);
        }
        Some(current)
    }
}

/// All orderings of a multiset of group labels.
///
/// Group `g` appears `counts[g]` times in every yielded sequence.
/// Orderings that only swap two occurrences of the same label are yielded once.
#[derive(Debug, Clone)]
pub struct MultisetPermutation {
    current: Option<Vec<usize>>,
}

impl MultisetPermutation {
    pub fn new(counts: &[usize]) -> Self {
        let seq = counts
            .iter()
            .enumerate()
            .flat_map(|(label, &count)| std::iter::repeat_n(label, count))
            .collect();
        MultisetPermutation { current: Some(seq) }
    }
}

impl Iterator for MultisetPermutation {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut succ = current.clone();
        if next_permutation(&mut succ) {
            self.current = Some(succ);
        }
        Some(current)
    }
}

/// All ways to pick one representative from each of several groups.
///
/// Group `g` has `sizes[g]` candidates; a yielded vector holds the chosen index for each group.
/// Nothing is yielded if one of the groups is empty.
#[derive(Debug, Clone)]
pub struct MultiCombination {
    sizes: Vec<usize>,
    current: Option<Vec<usize>>,
}

impl MultiCombination {
    pub fn new(sizes: &[usize]) -> Self {
        let current = if sizes.contains(&0) {
            None
        } else {
            Some(vec![0; sizes.len()])
        };
        MultiCombination {
            sizes: sizes.to_vec(),
            current,
        }
    }
}

impl Iterator for MultiCombination {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        let mut succ = current.clone();
        // Odometer, last group spins fastest.
        for pos in (0..succ.len()).rev() {
            succ[pos] += 1;
            if succ[pos] < self.sizes[pos] {
                self.current = Some(succ);
                break;
            }
            succ[pos] = 0;
        }
        Some(current)
    }
}

/// A union-find partition of `0..n`.
#[derive(Debug, Clone)]
pub struct Partition {
    parent: Vec<usize>,
}

impl Partition {
    pub fn new(n: usize) -> Self {
        Partition {
            parent: (0..n).collect(),
        }
    }

    /// Representative of the block holding `x`.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merges the blocks of `a` and `b`.
    pub fn merge(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }

    pub fn same(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// The blocks, ordered by their smallest element, each block sorted.
    pub fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut slot_of_root = vec![usize::MAX; self.parent.len()];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for x in 0..self.parent.len() {
            let root = self.find(x);
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot_of_root[root]].push(x);
        }
        groups
    }
}
