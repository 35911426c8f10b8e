//! `SuffixTree`: Ukkonen-style online construction of a generalized suffix tree over a union
//! of sequences, plus the `Node` (explicit/implicit position) abstraction and matching
//! statistics.

use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::branch::{Branch, BranchIdx, SearchResult};
use crate::processor::{NoData, NodeData, NullProcessor, WordItemProcessor};
use crate::radix_tree::RadixTree;

/// A position in the tree: explicit when `offset == branch.length()` (this includes the root,
/// whose length is always zero), implicit when `0 < offset < branch.length()`.
///
/// By convention this crate never constructs a non-root `Node` with `offset == 0` — the
/// position "at the top of a branch" is always represented as the explicit node at the end of
/// the parent's edge instead, so there is exactly one way to name any given tree position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    branch: BranchIdx,
    offset: usize,
}

impl Node {
    #[inline]
    pub fn root() -> Self {
        Node {
            branch: BranchIdx::root(),
            offset: 0,
        }
    }

    #[inline]
    pub fn branch(&self) -> BranchIdx {
        self.branch
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// One entry of a [`MatchingStatistics`] computation: the longest prefix of `query[start..]`
/// present anywhere in the tree, and the tree position realizing that match.
#[derive(Debug, Clone, Copy)]
pub struct MatchEntry {
    pub start: usize,
    pub length: usize,
    pub node: Node,
    pub floor: Node,
    pub ceil: Node,
}

/// For every suffix of a query, the length of its longest prefix occurring anywhere in the
/// indexed set, computed in O(n) total.
#[derive(Debug, Clone)]
pub struct MatchingStatistics {
    pub entries: Vec<MatchEntry>,
}

/// Generalized suffix tree: `add_word` inserts every suffix of `word` via Ukkonen's
/// construction, amortized O(|word|) per call.
pub struct SuffixTree<C, D, N = NoData, P = NullProcessor>
where
    C: Eq + Hash + Clone,
    N: NodeData,
    P: WordItemProcessor<C, D, N>,
{
    tree: RadixTree<C, N>,
    processor: P,
    _item: PhantomData<D>,
}

impl<C, D, N, P> SuffixTree<C, D, N, P>
where
    C: Eq + Hash + Clone,
    N: NodeData,
    P: WordItemProcessor<C, D, N>,
{
    pub fn with_processor(processor: P) -> Self {
        SuffixTree {
            tree: RadixTree::new(),
            processor,
            _item: PhantomData,
        }
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn tree(&self) -> &RadixTree<C, N> {
        &self.tree
    }

    pub fn branch(&self, idx: BranchIdx) -> &Branch<C, N> {
        self.tree.branch(idx)
    }

    pub fn branch_mut(&mut self, idx: BranchIdx) -> &mut Branch<C, N> {
        self.tree.branch_mut(idx)
    }

    #[inline]
    fn is_explicit(&self, node: Node) -> bool {
        node.offset == self.tree.branch(node.branch).length()
    }

    /// Looks up a child by first character (explicit position) or compares the next character
    /// along the current edge (implicit position).
    pub fn try_advance(&self, node: Node, c: C) -> Option<Node> {
        if self.is_explicit(node) {
            let child = self.tree.branch(node.branch).children().get(&c).copied()?;
            Some(Node { branch: child, offset: 1 })
        } else {
            let b = self.tree.branch(node.branch);
            if b.source()[b.start() + node.offset] == c {
                Some(Node {
                    branch: node.branch,
                    offset: node.offset + 1,
                })
            } else {
                None
            }
        }
    }

    /// Nearest explicit node at-or-above `node`.
    pub fn get_floor(&self, node: Node) -> Node {
        if self.is_explicit(node) {
            node
        } else {
            let parent = self
                .tree
                .branch(node.branch)
                .parent()
                .expect("implicit node's branch always has a parent");
            Node {
                branch: parent,
                offset: self.tree.branch(parent).length(),
            }
        }
    }

    /// Nearest explicit node at-or-below `node`.
    pub fn get_ceil(&self, node: Node) -> Node {
        if self.is_explicit(node) {
            node
        } else {
            Node {
                branch: node.branch,
                offset: self.tree.branch(node.branch).length(),
            }
        }
    }

    /// Encodes the suffix-link rules: go to the nearest explicit parent, follow its suffix
    /// link (dropping one extra character first if that parent is the root, since root's own
    /// suffix link is a no-op), then fast-scan down by segment skips.
    pub fn follow_link(&self, node: Node) -> Option<Node> {
        if self.tree.is_root(node.branch) {
            return Some(node);
        }
        if self.is_explicit(node) {
            let link = self.tree.branch(node.branch).suffix_link()?;
            let link_len = self.tree.branch(link).length();
            return Some(Node { branch: link, offset: link_len });
        }

        let parent = self
            .tree
            .branch(node.branch)
            .parent()
            .expect("implicit node's branch always has a parent");
        let b = self.tree.branch(node.branch);
        let mut word_pos = b.start();
        let mut remaining = node.offset;
        let source = b.source().clone();

        let mut cursor = if self.tree.is_root(parent) {
            remaining -= 1;
            word_pos += 1;
            BranchIdx::root()
        } else {
            self.tree.branch(parent).suffix_link()?
        };

        if remaining == 0 {
            return Some(Node {
                branch: cursor,
                offset: self.tree.branch(cursor).length(),
            });
        }

        loop {
            let ch = source[word_pos].clone();
            let child = self.tree.branch(cursor).children().get(&ch).copied()?;
            let child_len = self.tree.branch(child).length();
            if child_len < remaining {
                remaining -= child_len;
                word_pos += child_len;
                cursor = child;
            } else if child_len == remaining {
                return Some(Node {
                    branch: child,
                    offset: child_len,
                });
            } else {
                return Some(Node {
                    branch: child,
                    offset: remaining,
                });
            }
        }
    }

    /// Attaches `new_branch` as a child of `node`'s position. If `node` was implicit, the
    /// branch it sits on is split first; returns the freshly-split internal branch in that
    /// case, so the caller can resolve its suffix link.
    fn add_branch(&mut self, node: Node, new_branch: Branch<C, N>) -> (BranchIdx, Option<BranchIdx>) {
        if self.is_explicit(node) {
            let idx = self.tree.push_branch(new_branch);
            self.tree.add_child(node.branch, idx);
            (idx, None)
        } else {
            let upper = self.tree.split(node.branch, node.offset);
            let idx = self.tree.push_branch(new_branch);
            self.tree.add_child(upper, idx);
            (idx, Some(upper))
        }
    }

    /// When the last character of a word lands on an already-present path (the word was
    /// observed, not newly created), walks from the nearest explicit node down to that
    /// position up the chain of suffix links to the root, invoking the `WordItemProcessor` on
    /// every branch visited. This is how a suffix that coincides with a previously inserted
    /// suffix still gets its weight recorded on every branch along its own suffix path.
    fn walk_suffix_links_from(&mut self, node: Node, word: &[C], item: &D) {
        let mut cursor = self.get_floor(node).branch();
        loop {
            self.processor.on_word_add(word, item, self.tree.branch_mut(cursor));
            if self.tree.is_root(cursor) {
                break;
            }
            match self.tree.branch(cursor).suffix_link() {
                Some(link) => cursor = link,
                None => break,
            }
        }
    }

    /// Inserts every suffix of `word` (Ukkonen's construction). `word` must end with a
    /// sentinel character unique to this call so every suffix terminates at an explicit leaf.
    pub fn add_word(&mut self, word: &[C], item: D) {
        if word.is_empty() {
            return;
        }
        let source: Rc<[C]> = Rc::from(word.to_vec().into_boxed_slice());
        let mut active = Node::root();
        let mut height = 0usize;
        let mut previous_leaf: Option<BranchIdx> = None;

        for i in 0..word.len() {
            let c = word[i].clone();
            let mut previous_split: Option<BranchIdx> = None;

            loop {
                if let Some(next) = self.try_advance(active, c.clone()) {
                    active = next;
                    height += 1;
                    if i == word.len() - 1 {
                        self.walk_suffix_links_from(active, word, &item);
                    }
                    break;
                }

                let word_start = i - height;
                let leaf_branch = Branch {
                    source: source.clone(),
                    start: i,
                    length: word.len() - i,
                    word_start,
                    children: Default::default(),
                    parent: None,
                    suffix_link: Some(BranchIdx::root()),
                    node_data: N::default(),
                };
                let (leaf_idx, split_internal) = self.add_branch(active, leaf_branch);
                self.processor.on_word_add(word, &item, self.tree.branch_mut(leaf_idx));

                if let Some(prev) = previous_leaf {
                    self.tree.branch_mut(prev).suffix_link = Some(leaf_idx);
                }
                previous_leaf = Some(leaf_idx);

                if let Some(internal) = split_internal {
                    self.tree.branch_mut(internal).suffix_link = Some(BranchIdx::root());
                    if let Some(prev_split) = previous_split {
                        self.tree.branch_mut(prev_split).suffix_link = Some(internal);
                    }
                    previous_split = Some(internal);
                    // `active` pointed at an implicit offset into the branch that `add_branch`
                    // just split; that branch was mutated in place (its `start`/`length`
                    // shifted to the lower half), so the old (branch, offset) pair no longer
                    // names the same position. The split point is now the explicit top half.
                    active = Node {
                        branch: internal,
                        offset: self.tree.branch(internal).length(),
                    };
                }

                if self.tree.is_root(active.branch) {
                    break;
                }
                match self.follow_link(active) {
                    Some(linked) => {
                        active = linked;
                        height -= 1;
                    }
                    None => {
                        active = Node::root();
                        height = 0;
                        break;
                    }
                }
            }
        }
    }

    /// `true` if `word` occurs anywhere in the indexed sequences (a substring check, not
    /// requiring termination at a leaf).
    pub fn contains(&self, word: &[C]) -> bool {
        let (_, _, widx) = self.tree.walk_prefix(word, 0, RadixTree::root());
        widx == word.len()
    }

    pub fn exact_search(&self, word: &[C]) -> Option<SearchResult> {
        self.tree.exact_search(word)
    }

    pub fn exact_prefix_search(&self, word: &[C]) -> Vec<SearchResult> {
        self.tree.exact_prefix_search(word)
    }

    pub fn longest_common_prefix(&self, word: &[C], from_index: usize, from_branch: BranchIdx) -> SearchResult {
        self.tree.longest_common_prefix(word, from_index, from_branch)
    }

    pub fn approximate_search<F>(&self, word: &[C], max_distance: f64, distance_fn: F) -> Vec<SearchResult>
    where
        F: Fn(&C, &C) -> f64 + Copy,
    {
        self.tree.approximate_search(word, max_distance, distance_fn)
    }

    /// For each suffix of `query`, the length of its longest prefix present anywhere in the
    /// tree, in O(|query|) total.
    pub fn get_matching_statistics(&self, query: &[C]) -> MatchingStatistics {
        let n = query.len();
        let mut entries = Vec::with_capacity(n);
        let mut node = Node::root();
        let mut match_length = 0usize;

        for i in 0..n {
            while i + match_length < n {
                let c = query[i + match_length].clone();
                match self.try_advance(node, c) {
                    Some(next) => {
                        node = next;
                        match_length += 1;
                    }
                    None => break,
                }
            }
            let floor = self.get_floor(node);
            let ceil = self.get_ceil(node);
            entries.push(MatchEntry {
                start: i,
                length: match_length,
                node,
                floor,
                ceil,
            });

            if self.tree.is_root(node.branch) {
                match_length = 0;
            } else {
                match self.follow_link(node) {
                    Some(linked) => {
                        node = linked;
                        match_length -= 1;
                    }
                    None => {
                        node = Node::root();
                        match_length = 0;
                    }
                }
            }
        }

        MatchingStatistics { entries }
    }
}

impl<C, D, N, P> SuffixTree<C, D, N, P>
where
    C: Eq + Hash + Clone,
    N: NodeData,
    P: WordItemProcessor<C, D, N> + Default,
{
    pub fn new() -> Self {
        Self::with_processor(P::default())
    }
}

impl<C, D, N, P> Default for SuffixTree<C, D, N, P>
where
    C: Eq + Hash + Clone,
    N: NodeData,
    P: WordItemProcessor<C, D, N> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn longest_common_prefix_finds_internal_substring() {
        let mut st: SuffixTree<char, ()> = SuffixTree::new();
        st.add_word(&chars("banana$"), ());

        let result = st.longest_common_prefix(&chars("nan"), 0, BranchIdx::root());
        let matched: String = st.branch(result.branch).matched_word(result.match_end_offset).iter().collect();
        assert_eq!(matched, "nan");
    }

    #[test]
    fn contains_reports_substrings_and_rejects_non_substrings() {
        let mut st: SuffixTree<char, ()> = SuffixTree::new();
        st.add_word(&chars("banana$"), ());
        assert!(st.contains(&chars("nan")));
        assert!(st.contains(&chars("banana")));
        assert!(!st.contains(&chars("xyz")));
    }

    #[test]
    fn matching_statistics_reports_exact_longest_occurrence() {
        let mut st: SuffixTree<char, ()> = SuffixTree::new();
        st.add_word(&chars("banana$"), ());

        // "ana" is a substring of "banana$" (positions 1..4); "na" and "a" are substrings too,
        // so every suffix of the query matches in full.
        let stats = st.get_matching_statistics(&chars("ana"));
        let lengths: Vec<usize> = stats.entries.iter().map(|e| e.length).collect();
        assert_eq!(lengths, vec![3, 2, 1]);
    }

    #[test]
    fn matching_statistics_on_empty_tree_is_all_zero() {
        let st: SuffixTree<char, ()> = SuffixTree::new();
        let stats = st.get_matching_statistics(&chars("abc"));
        assert!(stats.entries.iter().all(|e| e.length == 0));
    }

    #[test]
    fn generalized_tree_indexes_union_of_two_words() {
        let mut st: SuffixTree<char, ()> = SuffixTree::new();
        st.add_word(&chars("kitten$"), ());
        st.add_word(&chars("sitting#"), ());
        assert!(st.contains(&chars("itt")));
        assert!(st.contains(&chars("sit")));
        assert!(st.contains(&chars("ten")));
    }
}
