//! The generic radix tree: an arena of [`Branch`]es with split semantics, exact/prefix/
//! approximate search, and the three standard traversal orders.

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use crate::branch::{Branch, BranchIdx, SearchResult};
use crate::edit::EditColumn;
use crate::processor::NodeData;

/// Generic base radix tree over character type `C` and per-branch payload `N`.
///
/// `C` must be cheaply comparable and hashable (it keys the children map); `N` is whatever
/// extra bookkeeping a branch carries (nothing, for a plain `WordTree`; leaf-weight
/// accumulators, for `KernelSuffixTree`).
#[derive(Debug, Clone)]
pub struct RadixTree<C, N> {
    arena: Vec<Branch<C, N>>,
}

impl<C, N> RadixTree<C, N>
where
    C: Eq + Hash + Clone,
    N: NodeData,
{
    pub fn new() -> Self {
        let root = Branch {
            source: Rc::from(Vec::new().into_boxed_slice()),
            start: 0,
            length: 0,
            word_start: 0,
            children: HashMap::new(),
            parent: None,
            suffix_link: Some(BranchIdx::root()),
            node_data: N::default(),
        };
        RadixTree { arena: vec![root] }
    }

    /// Installs a fresh root, dropping every previously allocated branch.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn root() -> BranchIdx {
        BranchIdx::root()
    }

    #[inline]
    pub fn is_root(&self, idx: BranchIdx) -> bool {
        idx == BranchIdx::root()
    }

    #[inline]
    pub fn branch(&self, idx: BranchIdx) -> &Branch<C, N> {
        // safe because every BranchIdx handed out by this tree addresses a pushed arena slot
        // that is never removed (only `clear()` discards the whole arena and starts over)
        unsafe { self.arena.get_unchecked(idx.index()) }
    }

    #[inline]
    pub fn branch_mut(&mut self, idx: BranchIdx) -> &mut Branch<C, N> {
        unsafe { self.arena.get_unchecked_mut(idx.index()) }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    fn first_char(&self, idx: BranchIdx) -> C {
        let b = self.branch(idx);
        b.source[b.start].clone()
    }

    pub(crate) fn push_branch(&mut self, branch: Branch<C, N>) -> BranchIdx {
        let idx = BranchIdx::new(self.arena.len());
        self.arena.push(branch);
        idx
    }

    /// Attaches `child` under `parent` keyed by `child`'s first character. Panics if a child
    /// with that character already exists (an invalid-argument programmer error, per the
    /// "no two siblings share a first character" invariant).
    pub fn add_child(&mut self, parent: BranchIdx, child: BranchIdx) {
        let key = self.first_char(child);
        let slot = self.branch_mut(parent).children.entry(key);
        match slot {
            std::collections::hash_map::Entry::Occupied(_) => {
                panic!("add_child: a child with this first character already exists")
            }
            std::collections::hash_map::Entry::Vacant(v) => {
                v.insert(child);
            }
        }
        self.branch_mut(child).parent = Some(parent);
    }

    /// Idempotent-on-miss removal of a child keyed by `key`.
    pub fn remove_child(&mut self, parent: BranchIdx, key: &C) {
        self.branch_mut(parent).children.remove(key);
    }

    /// Splits `branch_idx` at `offset` (`0 < offset < length`), inserting a new upper branch
    /// that takes over the original's parent slot and the prefix `[start, start+offset)`. The
    /// original branch shrinks to `[start+offset, start+length)` and becomes the new branch's
    /// sole child.
    pub fn split(&mut self, branch_idx: BranchIdx, offset: usize) -> BranchIdx {
        let (source, orig_start, orig_length, word_start, parent) = {
            let b = self.branch(branch_idx);
            assert!(
                offset > 0 && offset < b.length,
                "split offset out of range: {} not in (0, {})",
                offset,
                b.length
            );
            (b.source.clone(), b.start, b.length, b.word_start, b.parent)
        };

        let upper = Branch {
            source: source.clone(),
            start: orig_start,
            length: offset,
            word_start,
            children: HashMap::new(),
            parent,
            suffix_link: None,
            node_data: N::default(),
        };
        let upper_idx = self.push_branch(upper);

        if let Some(p) = parent {
            let key = source[orig_start].clone();
            self.branch_mut(p).children.insert(key, upper_idx);
        }

        {
            let b = self.branch_mut(branch_idx);
            b.start = orig_start + offset;
            b.length = orig_length - offset;
            b.parent = Some(upper_idx);
        }
        let lower_key = source[orig_start + offset].clone();
        self.branch_mut(upper_idx).children.insert(lower_key, branch_idx);

        upper_idx
    }

    pub(crate) fn walk_prefix(&self, word: &[C], from_index: usize, from_branch: BranchIdx) -> (BranchIdx, usize, usize) {
        let mut branch = from_branch;
        let mut offset = 0usize;
        let mut widx = from_index;
        loop {
            let blen = self.branch(branch).length;
            while offset < blen && widx < word.len() {
                let b = self.branch(branch);
                if b.source[b.start + offset] == word[widx] {
                    offset += 1;
                    widx += 1;
                } else {
                    break;
                }
            }
            if offset < blen || widx == word.len() {
                return (branch, offset, widx);
            }
            match self.branch(branch).children.get(&word[widx]).copied() {
                Some(child) => {
                    branch = child;
                    offset = 0;
                }
                None => return (branch, offset, widx),
            }
        }
    }

    /// Walks downward from `from_branch` (at `from_index` into `word`) matching characters;
    /// returns the deepest match position reached.
    pub fn longest_common_prefix(&self, word: &[C], from_index: usize, from_branch: BranchIdx) -> SearchResult {
        let (branch, offset, _) = self.walk_prefix(word, from_index, from_branch);
        SearchResult::new(branch, offset, 0.0)
    }

    /// Returns a result only if the entire `word` was consumed by the walk.
    pub fn exact_search(&self, word: &[C]) -> Option<SearchResult> {
        let (branch, offset, widx) = self.walk_prefix(word, 0, BranchIdx::root());
        if widx == word.len() {
            Some(SearchResult::new(branch, offset, 0.0))
        } else {
            None
        }
    }

    /// Finds the branch where `word` ends, then returns one result per branch in its
    /// DFS-reachable subtree (including itself if non-root). Empty if `word` diverges.
    pub fn exact_prefix_search(&self, word: &[C]) -> Vec<SearchResult> {
        let (branch, offset, widx) = self.walk_prefix(word, 0, BranchIdx::root());
        if widx != word.len() {
            return Vec::new();
        }
        let mut results = Vec::new();
        if !self.is_root(branch) {
            results.push(SearchResult::new(branch, offset, 0.0));
        }
        let children: Vec<BranchIdx> = self.branch(branch).children.values().copied().collect();
        for child in children {
            self.dfs_visit(child, |idx| {
                results.push(SearchResult::new(idx, self.branch(idx).length, 0.0));
            });
        }
        results
    }

    /// Depth-first pre-order walk starting at `start`, visiting `start` itself first. Uses an
    /// explicit stack (the teacher's `lcp_stack` is the precedent for this over recursion).
    pub fn dfs_visit<F: FnMut(BranchIdx)>(&self, start: BranchIdx, mut visit: F) {
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            visit(idx);
            stack.extend(self.branch(idx).children.values().copied());
        }
    }

    /// Accumulates a value bottom-up: `f` receives a branch and the already-computed values of
    /// its children, and returns this branch's value.
    pub fn post_order_process<T, F>(&self, start: BranchIdx, f: &mut F) -> T
    where
        F: FnMut(BranchIdx, Vec<T>) -> T,
    {
        let children: Vec<BranchIdx> = self.branch(start).children.values().copied().collect();
        let child_values: Vec<T> = children.into_iter().map(|c| self.post_order_process(c, f)).collect();
        f(start, child_values)
    }

    /// Propagates a value top-down: `f` receives a branch and its parent's value (the seed
    /// value for `start` itself), and returns this branch's value, which becomes the seed for
    /// its children.
    pub fn pre_order_process<T, F>(&self, start: BranchIdx, seed: T, f: &mut F)
    where
        T: Clone,
        F: FnMut(BranchIdx, &T) -> T,
    {
        let value = f(start, &seed);
        let children: Vec<BranchIdx> = self.branch(start).children.values().copied().collect();
        for child in children {
            self.pre_order_process(child, value.clone(), f);
        }
    }

    /// Depth-first, edit-distance-pruned search: returns every terminal leaf whose stored word
    /// is within `max_distance` of `word` under `distance_fn`.
    pub fn approximate_search<F>(&self, word: &[C], max_distance: f64, distance_fn: F) -> Vec<SearchResult>
    where
        F: Fn(&C, &C) -> f64 + Copy,
    {
        let mut results = Vec::new();
        if word.is_empty() {
            let initial = EditColumn::create_initial(0, max_distance, None);
            if !initial.is_empty() {
                self.approximate_search_rec(BranchIdx::root(), word, max_distance, distance_fn, &initial, &mut results);
            }
            return results;
        }
        let initial = EditColumn::create_initial(word.len(), max_distance, None);
        self.approximate_search_rec(BranchIdx::root(), word, max_distance, distance_fn, &initial, &mut results);
        results
    }

    fn approximate_search_rec<F>(
        &self,
        branch_idx: BranchIdx,
        word: &[C],
        max_distance: f64,
        distance_fn: F,
        incoming: &EditColumn,
        results: &mut Vec<SearchResult>,
    ) where
        F: Fn(&C, &C) -> f64 + Copy,
    {
        let branch = self.branch(branch_idx);
        let length = branch.length;
        let mut current = incoming.clone();
        for offset in 0..length {
            let b = self.branch(branch_idx);
            let col_char = b.source[b.start + offset].clone();
            match EditColumn::create_next(word, max_distance, offset as isize, None, distance_fn, &current, &col_char, None) {
                Some(next) => {
                    current = next;
                    let b = self.branch(branch_idx);
                    if offset == length - 1 && b.children.is_empty() {
                        let row = word.len() as isize - 1;
                        let value = current.get(row);
                        if value <= max_distance {
                            results.push(SearchResult::new(branch_idx, offset + 1, value));
                        }
                    }
                }
                None => return, // prune: the whole subtree rooted here cannot match
            }
        }
        let children: Vec<BranchIdx> = self.branch(branch_idx).children.values().copied().collect();
        for child in children {
            self.approximate_search_rec(child, word, max_distance, distance_fn, &current, results);
        }
    }
}

impl<C, N> Default for RadixTree<C, N>
where
    C: Eq + Hash + Clone,
    N: NodeData,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::NoData;

    fn make_leaf(tree: &mut RadixTree<char, NoData>, source: Rc<[char]>, start: usize, length: usize, word_start: usize) -> BranchIdx {
        tree.push_branch(Branch {
            source,
            start,
            length,
            word_start,
            children: HashMap::new(),
            parent: None,
            suffix_link: None,
            node_data: NoData,
        })
    }

    #[test]
    fn split_preserves_invariants() {
        let mut tree: RadixTree<char, NoData> = RadixTree::new();
        let word: Rc<[char]> = Rc::from("cartoon".chars().collect::<Vec<_>>().into_boxed_slice());
        let leaf = make_leaf(&mut tree, word.clone(), 0, 7, 0);
        tree.add_child(BranchIdx::root(), leaf);

        let upper = tree.split(leaf, 3); // "car" | "toon"
        assert_eq!(tree.branch(upper).length(), 3);
        assert_eq!(tree.branch(leaf).length(), 4);
        assert_eq!(tree.branch(leaf).start(), 3);
        assert_eq!(tree.branch(leaf).parent(), Some(upper));
        assert_eq!(tree.branch(upper).parent(), Some(BranchIdx::root()));
        assert_eq!(tree.branch(BranchIdx::root()).children().get(&'c'), Some(&upper));
        assert_eq!(tree.branch(upper).children().get(&'t'), Some(&leaf));
    }

    #[test]
    #[should_panic]
    fn add_child_rejects_duplicate_first_character() {
        let mut tree: RadixTree<char, NoData> = RadixTree::new();
        let word: Rc<[char]> = Rc::from("aa".chars().collect::<Vec<_>>().into_boxed_slice());
        let a = make_leaf(&mut tree, word.clone(), 0, 1, 0);
        let b = make_leaf(&mut tree, word, 1, 1, 0);
        tree.add_child(BranchIdx::root(), a);
        tree.add_child(BranchIdx::root(), b);
    }
}
