//! A sparse-set keeps track of which values of an initial domain are still present. It allows
//! O(1) removals, O(1) membership checks, O(1) access to the `i`-th present element and
//! O(|D|) traversal of the present elements.
//!
//! The first [`SparseSet::len`] entries of the dense vector are the present elements; removing an
//! element swaps it behind that boundary. The removed elements are kept in the vector so that the
//! dense vector is never reallocated while solving.
//!
//! # Bibliography
//! \[1\] V. le C. de Saint-Marcq, P. Schaus, C. Solnon, and C. Lecoutre, ‘Sparse-sets for domain
//! implementation’, in CP workshop on Techniques foR Implementing Constraint programming Systems
//! (TRICS), 2013, pp. 1–10.

use crate::cpbp_assert_moderate;
use crate::cpbp_assert_simple;

#[derive(Debug, Clone)]
pub(crate) struct SparseSet<T> {
    /// The number of elements which are currently present
    size: usize,
    /// The first [`size`][SparseSet::size] elements are present
    dense: Vec<T>,
    /// For every mapped element its position in [`dense`][SparseSet::dense], or `usize::MAX` if
    /// the element was never part of the set
    indices: Vec<usize>,
    /// An injective function mapping an element to a slot in [`indices`][SparseSet::indices]
    mapping: fn(&T) -> usize,
}

impl<T> SparseSet<T> {
    /// Creates a set containing `input`; it is assumed that `mapping` is injective over the
    /// provided elements and that the elements do not contain duplicates.
    pub(crate) fn new(input: Vec<T>, mapping: fn(&T) -> usize) -> Self {
        let capacity = input.iter().map(|element| mapping(element) + 1).max();
        let mut indices = vec![usize::MAX; capacity.unwrap_or(0)];
        for (position, element) in input.iter().enumerate() {
            cpbp_assert_simple!(
                indices[mapping(element)] == usize::MAX,
                "duplicate element in sparse set"
            );
            indices[mapping(element)] = position;
        }

        SparseSet {
            size: input.len(),
            dense: input,
            indices,
            mapping,
        }
    }

    /// Returns how many elements are present.
    pub(crate) fn len(&self) -> usize {
        self.size
    }

    /// Returns the `index`-th present element; panics if `index >= len()`.
    pub(crate) fn get(&self, index: usize) -> &T {
        cpbp_assert_simple!(index < self.size);
        &self.dense[index]
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.dense.swap(i, j);
        self.indices[(self.mapping)(&self.dense[i])] = i;
        self.indices[(self.mapping)(&self.dense[j])] = j;
    }

    fn position(&self, element: &T) -> Option<usize> {
        self.indices
            .get((self.mapping)(element))
            .copied()
            .filter(|&position| position != usize::MAX)
    }

    /// Determines whether `element` is present.
    pub(crate) fn contains(&self, element: &T) -> bool {
        self.position(element)
            .is_some_and(|position| position < self.size)
    }

    /// Removes `element`; returns whether it was present.
    pub(crate) fn remove(&mut self, element: &T) -> bool {
        match self.position(element) {
            Some(position) if position < self.size => {
                self.size -= 1;
                self.swap(position, self.size);
                cpbp_assert_moderate!(!self.contains(element));
                true
            }
            _ => false,
        }
    }

    /// Removes every element except `element`; returns whether `element` was present.
    pub(crate) fn keep_only(&mut self, element: &T) -> bool {
        match self.position(element) {
            Some(position) if position < self.size => {
                self.swap(position, 0);
                self.size = 1;
                true
            }
            _ => false,
        }
    }

    /// Iterates over the present elements, in no particular order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.dense[..self.size].iter()
    }
}
