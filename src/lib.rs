//! Indexing and approximate matching over sequences of generic elements.
//!
//! Four structures share one underlying radix tree (`radix_tree::RadixTree`):
//!
//! - [`WordTree`] indexes whole sequences for exact and prefix lookup (a Patricia trie).
//! - [`SuffixTree`] indexes every suffix of every inserted sequence via Ukkonen's online
//!   construction, and computes matching statistics against a query.
//! - [`KernelSuffixTree`] wraps a `SuffixTree` to evaluate the all-substrings string kernel of
//!   Vishwanathan & Smola (2004).
//! - [`edit`] provides banded dynamic-programming edit distance, used internally for
//!   approximate search and exposed directly for callers that just want a distance or a
//!   replay-able edit script.
//!
//! Sequences are `&[C]` for any `C: Eq + Hash + Clone`; callers wanting suffix-tree leaves to
//! terminate cleanly should append a per-sequence sentinel character unique to that sequence
//! before calling `add_word`, the same way a byte string is conventionally terminated with a
//! character absent from the alphabet.

pub mod branch;
pub mod edit;
pub mod kernel_tree;
pub mod processor;
pub mod radix_tree;
pub mod suffix_tree;
pub mod word_tree;

pub use branch::{Branch, BranchIdx, SearchResult};
pub use edit::{edit_distance, standard_distance, EditColumn, EditCommand, EditMatrix};
pub use kernel_tree::{ExpWeight, KernelSuffixTree, SumWeight, WeightFunction};
pub use processor::{
    KernelData, KernelNodeData, KernelWordItemProcessor, NoData, NodeData, NullProcessor, StorageData, StorageNodeData,
    StorageProcessor, WeightedItem, WordItemProcessor,
};
pub use radix_tree::RadixTree;
pub use suffix_tree::{MatchEntry, MatchingStatistics, Node, SuffixTree};
pub use word_tree::WordTree;
