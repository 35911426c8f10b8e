//! `KernelSuffixTree`: the all-substrings string kernel of Vishwanathan & Smola (2004),
//! evaluated against a query in `O(|q|)` after one linear preprocessing pass over the indexed
//! sequences.
//!
//! `K(q, T) = Σ_{s ∈ T} weight(s) · Σ_{u substring of q} Σ_{u occurs in s} w(|u|)`: every
//! (start, length) substring of the query contributes `w(length)` once for every weighted
//! occurrence of that exact substring among the indexed sequences. Evaluating this directly
//! would cost `O(|q|^2)`; instead `ComputeKernel` walks `q`'s matching statistics once and, for
//! each suffix of `q`, folds its whole contribution (every prefix length up to the longest
//! match) into a single `floor`/`ceil` lookup:
//!
//! - `floor.node_data.weight` already holds the total contribution of every substring of `q`'s
//!   suffix that ends at an *explicit* ancestor on the matched path (precomputed once, shared
//!   across every query).
//! - the remainder — the partial edge from that explicit ancestor down to the actual matched
//!   depth — shares one count (`ceil.node_data.descendant_leaves_sum`, the same leaf-weight sum
//!   as the matched position itself, since no branch point lies between them) across a run of
//!   lengths, so it collapses to `count * compute_weight(start_len, end_len)`.

use std::hash::Hash;

use crate::branch::BranchIdx;
use crate::processor::{KernelData, KernelNodeData, KernelWordItemProcessor, WeightedItem};
use crate::suffix_tree::{MatchEntry, SuffixTree};

/// `compute_weight(start_len, end_len)` returns the telescoped sum
/// `Σ_{ℓ=start_len}^{end_len-1} w(ℓ)`. Must be `O(1)` and non-negative for `start_len <= end_len`.
pub trait WeightFunction {
    fn compute_weight(&self, start_len: usize, end_len: usize) -> f64;
}

/// `w(i) = 1` for every length: the kernel counts every common substring occurrence equally.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumWeight;

impl WeightFunction for SumWeight {
    #[inline]
    fn compute_weight(&self, start_len: usize, end_len: usize) -> f64 {
        (end_len - start_len) as f64
    }
}

/// `w(i) = lambda^i`: longer common substrings are discounted geometrically.
#[derive(Debug, Clone, Copy)]
pub struct ExpWeight {
    pub lambda: f64,
}

impl Default for ExpWeight {
    fn default() -> Self {
        ExpWeight { lambda: 0.5 }
    }
}

impl WeightFunction for ExpWeight {
    fn compute_weight(&self, start_len: usize, end_len: usize) -> f64 {
        if (self.lambda - 1.0).abs() < 1e-6 {
            return (end_len - start_len) as f64;
        }
        (self.lambda.powi(start_len as i32) - self.lambda.powi(end_len as i32)) / (1.0 - self.lambda)
    }
}

/// Wraps a [`SuffixTree`] whose node payload accumulates weighted leaf counts, adding the
/// post-order/pre-order preprocessing pass and query-based kernel evaluation.
///
/// Preprocessing is memoized: any call to `add_word` or `clear` invalidates it, and the next
/// `compute_kernel` call redoes it.
pub struct KernelSuffixTree<C, D, W = SumWeight>
where
    C: Eq + Hash + Clone,
    D: WeightedItem,
    W: WeightFunction,
{
    inner: SuffixTree<C, D, KernelData, KernelWordItemProcessor>,
    weight: W,
    preprocessed: bool,
}

impl<C, D, W> KernelSuffixTree<C, D, W>
where
    C: Eq + Hash + Clone,
    D: WeightedItem,
    W: WeightFunction,
{
    pub fn with_weight(weight: W) -> Self {
        KernelSuffixTree {
            inner: SuffixTree::new(),
            weight,
            preprocessed: false,
        }
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.preprocessed = false;
    }

    /// Inserts every suffix of `word`, weighted by `item.weight()`. Invalidates any
    /// previously computed preprocessing.
    pub fn add_word(&mut self, word: &[C], item: D) {
        self.inner.add_word(word, item);
        self.preprocessed = false;
    }

    pub fn contains(&self, word: &[C]) -> bool {
        self.inner.contains(word)
    }

    /// Post-order: folds each branch's own `descendant_leaves_sum` up from its children (the
    /// `KernelWordItemProcessor` only ever wrote the leaf-local contribution at insertion time),
    /// then stashes this branch's own *local* weight contribution -
    /// `descendant_leaves_sum * compute_weight(start_len, end_len)` for this branch's own edge -
    /// into `node_data.weight`, ready to be turned into a running root-to-branch sum by
    /// `propagate_weight`.
    fn accumulate_leaf_sums(&mut self, idx: BranchIdx) -> f64 {
        let children: Vec<BranchIdx> = self.inner.branch(idx).children().values().copied().collect();
        let mut sum = self.inner.branch(idx).node_data().descendant_leaves_sum();
        for child in children {
            sum += self.accumulate_leaf_sums(child);
        }

        let branch = self.inner.branch(idx);
        let start_len = branch.start() - branch.word_start() + 1;
        let end_len = start_len + branch.length();
        let local_weight = sum * self.weight.compute_weight(start_len, end_len);

        let node_data = self.inner.branch_mut(idx).node_data_mut();
        *node_data.descendant_leaves_sum_mut() = sum;
        *node_data.weight_mut() = local_weight;
        sum
    }

    /// Pre-order: turns each branch's local weight (set above) into the running sum along the
    /// root-to-branch path, `weight(v) = weight(parent(v)) + local_weight(v)`.
    fn propagate_weight(&mut self, idx: BranchIdx, parent_weight: f64) {
        let own_total = parent_weight + self.inner.branch(idx).node_data().weight();
        *self.inner.branch_mut(idx).node_data_mut().weight_mut() = own_total;

        let children: Vec<BranchIdx> = self.inner.branch(idx).children().values().copied().collect();
        for child in children {
            self.propagate_weight(child, own_total);
        }
    }

    fn preprocess(&mut self) {
        if self.preprocessed {
            return;
        }
        self.accumulate_leaf_sums(BranchIdx::root());
        self.propagate_weight(BranchIdx::root(), 0.0);
        self.preprocessed = true;
    }

    fn entry_contribution(&self, entry: &MatchEntry) -> f64 {
        let end_len = entry.length + 1;
        let start_len = end_len - entry.node.offset();
        let floor_weight = self.inner.branch(entry.floor.branch()).node_data().weight();
        let ceil_count = self.inner.branch(entry.ceil.branch()).node_data().descendant_leaves_sum();
        floor_weight + ceil_count * self.weight.compute_weight(start_len, end_len)
    }

    /// Evaluates `K(q, T)` against every sequence indexed so far. Runs the preprocessing pass
    /// first if it's stale.
    pub fn compute_kernel(&mut self, query: &[C]) -> f64 {
        self.preprocess();
        let stats = self.inner.get_matching_statistics(query);
        stats
            .entries
            .iter()
            .filter(|entry| entry.length > 0)
            .map(|entry| self.entry_contribution(entry))
            .sum()
    }
}

impl<C, D, W> KernelSuffixTree<C, D, W>
where
    C: Eq + Hash + Clone,
    D: WeightedItem,
    W: WeightFunction + Default,
{
    pub fn new() -> Self {
        Self::with_weight(W::default())
    }
}

impl<C, D, W> Default for KernelSuffixTree<C, D, W>
where
    C: Eq + Hash + Clone,
    D: WeightedItem,
    W: WeightFunction + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UnitItem;
    impl WeightedItem for UnitItem {
        fn weight(&self) -> f64 {
            1.0
        }
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn sum_weight_telescopes_to_the_length_difference() {
        let w = SumWeight;
        assert_eq!(w.compute_weight(0, 5), 5.0);
        assert_eq!(w.compute_weight(2, 5), 3.0);
    }

    #[test]
    fn exp_weight_telescopes_to_a_geometric_partial_sum() {
        let w = ExpWeight { lambda: 0.5 };
        // w(1) + w(2) = 0.5 + 0.25
        assert!((w.compute_weight(0, 2) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn single_character_word_self_query_matches_squared_counts() {
        let mut kt: KernelSuffixTree<char, UnitItem, SumWeight> = KernelSuffixTree::new();
        kt.add_word(&chars("a$"), UnitItem);
        // substrings of "a$": "a"(count 1), "$"(count 1), "a$"(count 1); querying the word
        // against itself sums, per query substring, its own count -> 1+1+1 = 3.
        let value = kt.compute_kernel(&chars("a$"));
        assert!((value - 3.0).abs() < 1e-9);
    }

    #[test]
    fn self_query_on_repeated_substring_matches_squared_count() {
        let mut kt: KernelSuffixTree<char, UnitItem, SumWeight> = KernelSuffixTree::new();
        kt.add_word(&chars("aa$"), UnitItem);
        // Querying a word against itself folds each distinct substring's occurrences against
        // themselves, so this reduces to the classic self-kernel: "a"(count 2) contributes
        // 2*2 = 4 (once per occurrence), "$"(1), "aa"(1), "a$"(1), "aa$"(1) -> 4+1+1+1+1 = 8.
        let value = kt.compute_kernel(&chars("aa$"));
        assert!((value - 8.0).abs() < 1e-9);
    }

    #[test]
    fn cross_query_sums_weighted_occurrences_across_both_hosts() {
        let mut kt: KernelSuffixTree<char, UnitItem, SumWeight> = KernelSuffixTree::new();
        kt.add_word(&chars("aba\u{1}"), UnitItem);
        kt.add_word(&chars("bab\u{2}"), UnitItem);

        // Hand counted against the two hosts "aba"+sentinel and "bab"+sentinel:
        // start 0 ("aba"): "a"->3, "ab"->2, "aba"->1 = 6
        // start 1 ("ba"):  "b"->3, "ba"->2           = 5
        // start 2 ("a"):   "a"->3                    = 3
        // total = 14
        let value = kt.compute_kernel(&chars("aba"));
        assert!((value - 14.0).abs() < 1e-9);
    }

    #[test]
    fn query_disjoint_from_corpus_contributes_nothing() {
        let mut kt: KernelSuffixTree<char, UnitItem, SumWeight> = KernelSuffixTree::new();
        kt.add_word(&chars("aaa$"), UnitItem);
        let value = kt.compute_kernel(&chars("zzz"));
        assert_eq!(value, 0.0);
    }

    #[test]
    fn kernel_is_stable_across_repeated_calls_without_reinsertion() {
        let mut kt: KernelSuffixTree<char, UnitItem, SumWeight> = KernelSuffixTree::new();
        kt.add_word(&chars("banana$"), UnitItem);
        let first = kt.compute_kernel(&chars("ana"));
        let second = kt.compute_kernel(&chars("ana"));
        assert_eq!(first, second);
    }
}
