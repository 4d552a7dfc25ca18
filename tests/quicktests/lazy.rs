use lazy_bst::lazy::LazyTree;
use lazy_bst::Error;

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and two sets: one with every element ever inserted and
/// one with the elements that are still live. This way we can ensure that after a random
/// smattering of inserts and removes the tree agrees with both.
fn do_ops<T>(
    ops: &[Op<T>],
    tree: &mut LazyTree<T>,
    all: &mut BTreeSet<T>,
    live: &mut BTreeSet<T>,
) where
    T: Ord + Clone,
{
    for op in ops {
        match op {
            Op::Insert(x) => {
                all.insert(x.clone());
                assert_eq!(tree.insert(x.clone()), live.insert(x.clone()));
            }
            Op::Remove(x) => {
                let result = tree.remove(x);
                if all.contains(x) {
                    assert_eq!(result, Ok(live.remove(x)));
                } else {
                    assert_eq!(result, Err(Error::NotFound));
                }
            }
            Op::Clear => {
                tree.clear();
                all.clear();
                live.clear();
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = LazyTree::new();
    let mut all = BTreeSet::new();
    let mut live = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut all, &mut live);

    let mut soft = Vec::new();
    tree.traverse_soft(|x| soft.push(*x));
    let mut hard = Vec::new();
    tree.traverse_hard(|x| hard.push(*x));

    tree.size() == live.len()
        && tree.size_hard() == all.len()
        && soft.iter().eq(live.iter())
        && hard.iter().eq(all.iter())
        && all.iter().all(|x| tree.contains(x) == live.contains(x))
}

#[quickcheck]
fn clear_then_rebuild(xs: Vec<i8>, deletes: Vec<i8>, ys: Vec<i8>) -> bool {
    let mut tree: LazyTree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        let _ = tree.remove(delete);
    }
    tree.clear();
    tree.extend(ys.iter().copied());

    // Nothing from before the clear survives, deleted or not.
    let ys: BTreeSet<_> = ys.into_iter().collect();
    tree.size() == ys.len()
        && tree.size_hard() == ys.len()
        && tree.deleted_count() == 0
        && tree.iter_hard().eq(ys.iter())
}

#[quickcheck]
fn distinct_inserts_size_matches(xs: Vec<i8>) -> bool {
    let tree: LazyTree<_> = xs.iter().copied().collect();
    let distinct: HashSet<_> = xs.iter().collect();

    tree.size() == distinct.len() && tree.size_hard() == distinct.len()
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: LazyTree<_> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.find(x).is_none())
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: LazyTree<_> = xs.iter().copied().collect();
    let size = tree.size();
    let hard_size = tree.size_hard();
    for delete in &deletes {
        let _ = tree.remove(delete);
    }

    let mut still_present = xs.clone();
    still_present.retain(|x| !deletes.contains(x));
    let removed_correctly = deletes.iter().all(|x| !tree.contains(x))
        && still_present.iter().all(|x| tree.find(x) == Some(x));

    // Putting everything back resurrects nodes instead of allocating new ones.
    for x in &xs {
        tree.insert(*x);
    }

    removed_correctly && tree.size() == size && tree.size_hard() == hard_size
}

#[quickcheck]
fn clone_is_independent(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: LazyTree<_> = xs.iter().copied().collect();
    for delete in &deletes {
        let _ = tree.remove(delete);
    }

    let cloned = tree.clone();
    let before: Vec<_> = cloned.iter_hard().copied().collect();
    tree.clear();

    tree.size_hard() == 0
        && cloned.iter_hard().copied().eq(before)
        && cloned.size() == cloned.iter().count()
}
