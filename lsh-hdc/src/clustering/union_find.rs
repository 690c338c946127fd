use std::collections::BTreeMap;

use ahash::AHashMap;

use crate::clustering::Label;

/// Disjoint-set forest over arbitrary labels.
///
/// Labels are interned into an arena; `parent` and `rank` are indexed by the
/// interned position. Union by rank with path compression.
///
/// ```
/// use lsh_hdc::clustering::UnionFind;
///
/// let mut uf = UnionFind::new();
/// uf.union(0, 1);
/// uf.union(2, 3);
/// uf.union(3, 0);
/// assert_eq!(uf.sets(), vec![vec![0, 1, 2, 3]]);
/// ```
#[derive(Clone, Debug)]
pub struct UnionFind<L: Label> {
    index: AHashMap<L, usize>,
    labels: Vec<L>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl<L: Label> Default for UnionFind<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> UnionFind<L> {
    pub fn new() -> Self {
        UnionFind {
            index: AHashMap::new(),
            labels: Vec::new(),
            parent: Vec::new(),
            rank: Vec::new(),
        }
    }

    /// Number of labels in the forest.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Adds `label` as a singleton unless it is already present.
    pub fn insert(&mut self, label: L) -> usize {
        if let Some(&i) = self.index.get(&label) {
            return i;
        }
        let i = self.labels.len();
        self.index.insert(label.clone(), i);
        self.labels.push(label);
        self.parent.push(i);
        self.rank.push(0);
        i
    }

    /// Representative of the set containing `label`, `None` for unseen labels.
    pub fn find(&mut self, label: &L) -> Option<&L> {
        let i = *self.index.get(label)?;
        let root = self.find_root(i);
        Some(&self.labels[root])
    }

    fn find_root(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`, inserting either one if unseen.
    pub fn union(&mut self, a: L, b: L) {
        let ia = self.insert(a);
        let ib = self.insert(b);
        let (ra, rb) = (self.find_root(ia), self.find_root(ib));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    /// Puts every label of `labels` into one set. A single label is just inserted.
    pub fn union_all<I>(&mut self, labels: I)
    where
        I: IntoIterator<Item = L>,
    {
        let mut labels = labels.into_iter();
        let first = match labels.next() {
            Some(first) => first,
            None => return,
        };
        self.insert(first.clone());
        for label in labels {
            self.union(first.clone(), label);
        }
    }

    pub fn num_sets(&self) -> usize {
        (0..self.parent.len())
            .filter(|&i| self.parent[i] == i)
            .count()
    }

    /// All equivalence classes. Members are sorted ascending and classes are
    /// ordered by their smallest member, so the result does not depend on the
    /// order in which unions were made.
    pub fn sets(&mut self) -> Vec<Vec<L>> {
        let mut by_root: BTreeMap<usize, Vec<L>> = BTreeMap::new();
        for i in 0..self.labels.len() {
            let root = self.find_root(i);
            by_root.entry(root).or_default().push(self.labels[i].clone());
        }
        let mut sets: Vec<Vec<L>> = by_root
            .into_values()
            .map(|mut members| {
                members.sort();
                members
            })
            .collect();
        sets.sort_by(|a, b| a[0].cmp(&b[0]));
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_simple_cluster() {
        let mut uf = UnionFind::new();
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(3, 0);
        assert_eq!(uf.sets(), vec![vec![0, 1, 2, 3]]);
        assert_eq!(uf.num_sets(), 1);
    }

    #[test]
    fn test_union_order_does_not_matter() {
        let unions = [(0, 1), (2, 3), (3, 0)];
        for permutation in unions.iter().permutations(unions.len()) {
            let mut uf = UnionFind::new();
            for &&(a, b) in &permutation {
                uf.union(a, b);
            }
            assert_eq!(uf.sets(), vec![vec![0, 1, 2, 3]]);
        }
    }

    #[test]
    fn test_find() {
        let mut uf = UnionFind::new();
        uf.union("b", "a");
        uf.insert("c");
        let root = *uf.find(&"a").unwrap();
        assert_eq!(uf.find(&"b"), Some(&root));
        assert_eq!(uf.find(&"a"), Some(&root));
        assert_eq!(uf.find(&"c"), Some(&"c"));
        assert_eq!(uf.find(&"z"), None);
    }

    #[test]
    fn test_sets_are_ordered_by_min_member() {
        let mut uf = UnionFind::new();
        uf.union_all(vec![9, 7, 8]);
        uf.union_all(vec![5]);
        uf.union_all(vec![6, 1]);
        uf.union_all(Vec::new());
        assert_eq!(uf.len(), 6);
        assert_eq!(uf.sets(), vec![vec![1, 6], vec![5], vec![7, 8, 9]]);
    }
}
