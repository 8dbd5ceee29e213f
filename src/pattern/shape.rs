//! Unlabeled full binary tree shapes.
//!
//! A shape is stored in preorder: [`ShapeToken::Op`] for an internal node, followed by its left
//! then right subtree, and [`ShapeToken::Leaf`] for a leaf, numbered left to right.
//! Mirror images are the same shape, so only one of them is listed: the larger subtree
//! (or, for equal sizes, the later one in the table) is always on the left.

use std::sync::OnceLock;

/// Largest number of leaves the table covers.
pub const MAX_LEAVES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeToken {
    Op,
    Leaf(usize),
}

pub type Shape = Vec<ShapeToken>;

/// Appends `tree` to `out`, numbering its leaves from `*next_leaf`.
fn renumber(tree: &[ShapeToken], next_leaf: &mut usize, out: &mut Shape) {
    for token in tree {
        match token {
            ShapeToken::Op => out.push(ShapeToken::Op),
            ShapeToken::Leaf(_) => {
                out.push(ShapeToken::Leaf(*next_leaf));
                *next_leaf += 1;
            }
        }
    }
}

fn join(left: &[ShapeToken], right: &[ShapeToken]) -> Shape {
    let mut shape = Vec::with_capacity(left.len() + right.len() + 1);
    shape.push(ShapeToken::Op);
    let mut next_leaf = 0;
    renumber(left, &mut next_leaf, &mut shape);
    renumber(right, &mut next_leaf, &mut shape);
    shape
}

fn build_table() -> Vec<Vec<Shape>> {
    let mut table: Vec<Vec<Shape>> = vec![Vec::new(), vec![vec![ShapeToken::Leaf(0)]]];
    for n in 2..=MAX_LEAVES {
        let mut shapes = Vec::new();
        for right_size in 1..=n / 2 {
            let left_size = n - right_size;
            for (i, left) in table[left_size].iter().enumerate() {
                for (j, right) in table[right_size].iter().enumerate() {
                    if left_size == right_size && j > i {
                        break;
                    }
                    shapes.push(join(left, right));
                }
            }
        }
        table.push(shapes);
    }
    table
}

/// All shapes with `leaf_num` leaves, or an empty slice outside `1..=MAX_LEAVES`.
pub fn shapes(leaf_num: usize) -> &'static [Shape] {
    static TABLE: OnceLock<Vec<Vec<Shape>>> = OnceLock::new();
    TABLE
        .get_or_init(build_table)
        .get(leaf_num)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shape_count_test() {
        let counts: Vec<usize> = (1..=MAX_LEAVES).map(|n| shapes(n).len()).collect();
        assert_eq!(counts, vec![1, 1, 1, 2, 3, 6, 11, 23]);
        assert!(shapes(0).is_empty());
        assert!(shapes(MAX_LEAVES + 1).is_empty());
    }

    #[test]
    fn shape_layout_test() {
        use ShapeToken::*;
        assert_eq!(shapes(2), &[vec![Op, Leaf(0), Leaf(1)]]);
        assert_eq!(shapes(3), &[vec![Op, Op, Leaf(0), Leaf(1), Leaf(2)]]);
        assert_eq!(
            shapes(4),
            &[
                vec![Op, Op, Op, Leaf(0), Leaf(1), Leaf(2), Leaf(3)],
                vec![Op, Op, Leaf(0), Leaf(1), Op, Leaf(2), Leaf(3)],
            ]
        );
        for n in 1..=MAX_LEAVES {
            for shape in shapes(n) {
                let leaves: Vec<usize> = shape
                    .iter()
                    .filter_map(|t| match t {
                        Leaf(i) => Some(*i),
                        Op => None,
                    })
                    .collect();
                assert_eq!(leaves, (0..n).collect::<Vec<_>>());
                assert_eq!(shape.len(), 2 * n - 1);
            }
        }
    }
}
