//! The `WordItemProcessor` strategy hook and the node/item trait families it is parameterized
//! over.
//!
//! This is deliberately a family of small traits rather than a class hierarchy: each tree
//! flavor only requires the capability it actually needs from `N` (and, for kernel trees,
//! from `D`).

use crate::branch::Branch;

/// Base bound every node payload must satisfy: constructible with no extra information.
pub trait NodeData: Default {}
impl<T: Default> NodeData for T {}

/// A node payload with nothing in it, used by plain `WordTree`/`SuffixTree` instances that
/// don't need per-branch bookkeeping beyond the tree structure itself.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct NoData;

/// Node payload capability required by [`crate::kernel_tree::KernelSuffixTree`]: a mutable
/// descendant-leaves weight sum and a mutable accumulated-weight field.
pub trait KernelNodeData: NodeData {
    fn descendant_leaves_sum(&self) -> f64;
    fn descendant_leaves_sum_mut(&mut self) -> &mut f64;
    fn weight(&self) -> f64;
    fn weight_mut(&mut self) -> &mut f64;
}

/// Stock node payload satisfying [`KernelNodeData`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KernelData {
    descendant_leaves_sum: f64,
    weight: f64,
}

impl KernelNodeData for KernelData {
    #[inline]
    fn descendant_leaves_sum(&self) -> f64 {
        self.descendant_leaves_sum
    }
    #[inline]
    fn descendant_leaves_sum_mut(&mut self) -> &mut f64 {
        &mut self.descendant_leaves_sum
    }
    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }
    #[inline]
    fn weight_mut(&mut self) -> &mut f64 {
        &mut self.weight
    }
}

/// Node payload capability required when a [`StorageProcessor`] accumulates word items
/// directly onto branches.
pub trait StorageNodeData<D>: NodeData {
    fn add_word_item(&mut self, item: D);
    fn word_items(&self) -> &[D];
}

/// Stock node payload satisfying [`StorageNodeData`].
#[derive(Debug, Clone)]
pub struct StorageData<D> {
    items: Vec<D>,
}

impl<D> Default for StorageData<D> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<D> StorageNodeData<D> for StorageData<D> {
    #[inline]
    fn add_word_item(&mut self, item: D) {
        self.items.push(item);
    }
    #[inline]
    fn word_items(&self) -> &[D] {
        &self.items
    }
}

/// Per-word-item weight accessor required by kernel trees.
pub trait WeightedItem {
    fn weight(&self) -> f64;
}

/// A caller-supplied policy invoked whenever the core assigns a word item to a branch.
///
/// This is the sole configuration surface for tree insertion behavior beyond the structural
/// algorithm itself.
pub trait WordItemProcessor<C, D, N> {
    fn on_word_add(&mut self, word: &[C], item: &D, branch: &mut Branch<C, N>);
}

/// No-op processor: the word item is not recorded anywhere beyond the tree structure it
/// carved out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProcessor;

impl<C, D, N> WordItemProcessor<C, D, N> for NullProcessor {
    #[inline]
    fn on_word_add(&mut self, _word: &[C], _item: &D, _branch: &mut Branch<C, N>) {}
}

/// Appends each word item to the branch's `node_data` via [`StorageNodeData::add_word_item`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageProcessor;

impl<C, D, N> WordItemProcessor<C, D, N> for StorageProcessor
where
    D: Clone,
    N: StorageNodeData<D>,
{
    #[inline]
    fn on_word_add(&mut self, _word: &[C], item: &D, branch: &mut Branch<C, N>) {
        branch.node_data_mut().add_word_item(item.clone());
    }
}

/// Increments `node_data.descendant_leaves_sum` by `item.weight()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KernelWordItemProcessor;

impl<C, D, N> WordItemProcessor<C, D, N> for KernelWordItemProcessor
where
    D: WeightedItem,
    N: KernelNodeData,
{
    #[inline]
    fn on_word_add(&mut self, _word: &[C], item: &D, branch: &mut Branch<C, N>) {
        *branch.node_data_mut().descendant_leaves_sum_mut() += item.weight();
    }
}
