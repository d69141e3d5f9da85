//! Union-Find (disjoint set) data structure.
//!
//! Used by the stop detector to merge stop events whose medoids fall
//! within the spatial merge threshold. Path compression keeps repeated
//! `find` calls cheap; `groups()` output is deterministic (members
//! sorted) regardless of insertion order.

use std::collections::HashMap;
use std::hash::Hash;

/// A generic Union-Find over hashable elements.
#[derive(Debug)]
pub struct UnionFind<T: Eq + Hash + Clone> {
    parent: HashMap<T, T>,
    rank: HashMap<T, usize>,
}

impl<T: Eq + Hash + Clone> Default for UnionFind<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> UnionFind<T> {
    /// Create an empty Union-Find.
    pub fn new() -> Self {
        Self {
            parent: HashMap::new(),
            rank: HashMap::new(),
        }
    }

    /// Add an element as its own singleton set. No-op if already present.
    pub fn make_set(&mut self, item: T) {
        if !self.parent.contains_key(&item) {
            self.parent.insert(item.clone(), item.clone());
            self.rank.insert(item, 0);
        }
    }

    /// Find the root of an element's set, compressing the path.
    ///
    /// The element is added as a singleton if it was never seen.
    pub fn find(&mut self, item: &T) -> T {
        self.make_set(item.clone());

        // Walk to the root
        let mut root = item.clone();
        while self.parent[&root] != root {
            root = self.parent[&root].clone();
        }

        // Path compression: point every node on the walk at the root
        let mut current = item.clone();
        while self.parent[&current] != root {
            let next = self.parent[&current].clone();
            self.parent.insert(current, root.clone());
            current = next;
        }

        root
    }

    /// Merge the sets containing the two elements (union by rank).
    pub fn union(&mut self, a: &T, b: &T) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        let rank_a = self.rank[&root_a];
        let rank_b = self.rank[&root_b];

        if rank_a < rank_b {
            self.parent.insert(root_a, root_b);
        } else if rank_a > rank_b {
            self.parent.insert(root_b, root_a);
        } else {
            self.parent.insert(root_b, root_a.clone());
            self.rank.insert(root_a, rank_a + 1);
        }
    }

    /// Whether two elements are in the same set.
    pub fn connected(&mut self, a: &T, b: &T) -> bool {
        self.find(a) == self.find(b)
    }

    /// Number of elements tracked.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether no elements are tracked.
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

impl<T: Eq + Hash + Clone + Ord> UnionFind<T> {
    /// All sets, keyed by root, with members sorted for determinism.
    pub fn groups(&mut self) -> HashMap<T, Vec<T>> {
        let items: Vec<T> = self.parent.keys().cloned().collect();
        let mut groups: HashMap<T, Vec<T>> = HashMap::new();

        for item in items {
            let root = self.find(&item);
            groups.entry(root).or_default().push(item);
        }

        for members in groups.values_mut() {
            members.sort();
        }

        groups
    }
}
