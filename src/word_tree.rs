//! `WordTree`: a radix tree whose insertion policy indexes whole sequences, O(|w|) per insert.

use std::hash::Hash;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::branch::{Branch, BranchIdx, SearchResult};
use crate::processor::{NoData, NodeData, NullProcessor, WordItemProcessor};
use crate::radix_tree::RadixTree;

/// Whole-word radix tree: `add_word` inserts the entire sequence as one path from the root,
/// splitting existing branches as needed — a standard Patricia-trie insertion, not Ukkonen's
/// suffix construction (that's [`crate::suffix_tree::SuffixTree`]).
pub struct WordTree<C, D, N = NoData, P = NullProcessor>
where
    C: Eq + Hash + Clone,
    N: NodeData,
    P: WordItemProcessor<C, D, N>,
{
    tree: RadixTree<C, N>,
    processor: P,
    _item: PhantomData<D>,
}

impl<C, D, N, P> WordTree<C, D, N, P>
where
    C: Eq + Hash + Clone,
    N: NodeData,
    P: WordItemProcessor<C, D, N>,
{
    pub fn with_processor(processor: P) -> Self {
        WordTree {
            tree: RadixTree::new(),
            processor,
            _item: PhantomData,
        }
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn branch(&self, idx: BranchIdx) -> &Branch<C, N> {
        self.tree.branch(idx)
    }

    /// Inserts `word` as a whole sequence, in `O(|word|)`. Re-inserting a word that is already
    /// present does not create a new branch; it invokes the processor again on the existing
    /// terminal branch, so e.g. a `StorageProcessor` sees every item ever added for that word.
    pub fn add_word(&mut self, word: &[C], item: D) {
        let source: Rc<[C]> = Rc::from(word.to_vec().into_boxed_slice());
        let (branch, offset, widx) = self.tree.walk_prefix(word, 0, RadixTree::root());

        let target = if widx == word.len() {
            if offset == self.tree.branch(branch).length() {
                branch
            } else {
                self.tree.split(branch, offset)
            }
        } else {
            let parent = if offset == self.tree.branch(branch).length() {
                branch
            } else {
                self.tree.split(branch, offset)
            };
            let leaf = self.tree.push_branch(Branch {
                source,
                start: widx,
                length: word.len() - widx,
                word_start: 0,
                children: Default::default(),
                parent: None,
                suffix_link: None,
                node_data: N::default(),
            });
            self.tree.add_child(parent, leaf);
            leaf
        };

        self.processor.on_word_add(word, &item, self.tree.branch_mut(target));
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
}

impl<C, D, N, P> WordTree<C, D, N, P>
where
    C: Eq + Hash + Clone,
    N: NodeData,
    P: WordItemProcessor<C, D, N> + Default,
{
    pub fn new() -> Self {
        Self::with_processor(P::default())
    }
}

impl<C, D, N, P> Default for WordTree<C, D, N, P>
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
    fn exact_prefix_search_finds_all_three_words() {
        let mut tree: WordTree<char, ()> = WordTree::new();
        tree.add_word(&chars("cat$"), ());
        tree.add_word(&chars("car$"), ());
        tree.add_word(&chars("cart$"), ());

        let results = tree.exact_prefix_search(&chars("ca"));
        assert_eq!(results.len(), 3);
        let mut words: Vec<String> = results
            .iter()
            .map(|r| {
                let b = tree.branch(r.branch);
                b.matched_word(r.match_end_offset).iter().collect()
            })
            .collect();
        words.sort();
        assert_eq!(words, vec!["car$".to_string(), "cart$".to_string(), "cat$".to_string()]);
    }

    #[test]
    fn exact_search_requires_full_word() {
        let mut tree: WordTree<char, ()> = WordTree::new();
        tree.add_word(&chars("banana"), ());
        assert!(tree.exact_search(&chars("banana")).is_some());
        assert!(tree.exact_search(&chars("ban")).is_none());
    }

    #[test]
    fn duplicate_insertion_invokes_processor_again() {
        use crate::processor::{StorageData, StorageNodeData, StorageProcessor};
        let mut tree: WordTree<char, u32, StorageData<u32>, StorageProcessor> = WordTree::new();
        tree.add_word(&chars("x"), 1);
        tree.add_word(&chars("x"), 2);
        let result = tree.exact_search(&chars("x")).unwrap();
        assert_eq!(tree.branch(result.branch).node_data().word_items(), &[1, 2]);
    }
}
