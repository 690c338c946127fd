use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::error::Result;

/// In-process map/shuffle/reduce over rayon.
///
/// Input is cut into `num_partitions` contiguous partitions that are mapped (and
/// optionally combined) independently. `shuffle` is the barrier: it groups all
/// pairs by key, in key order, so reducers see the same groups on every run.
/// Values inside a group keep partition order, which reducers must not rely on.
#[derive(Clone, Copy, Debug)]
pub struct LocalExecutor {
    num_partitions: usize,
}

impl LocalExecutor {
    pub fn new(num_partitions: usize) -> Self {
        LocalExecutor {
            num_partitions: num_partitions.max(1),
        }
    }

    pub fn num_partitions(&self) -> usize {
        self.num_partitions
    }

    pub fn partition<T>(&self, items: Vec<T>) -> Vec<Vec<T>> {
        let chunk_size = (items.len() + self.num_partitions - 1) / self.num_partitions;
        let mut partitions = Vec::with_capacity(self.num_partitions);
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            partitions.push(items.by_ref().take(chunk_size).collect());
        }
        partitions
    }

    /// Applies `mapper` to every input. Output stays partitioned.
    pub fn map<I, K, V, M>(&self, inputs: Vec<I>, mapper: M) -> Result<Vec<Vec<(K, V)>>>
    where
        I: Send,
        K: Send,
        V: Send,
        M: Fn(I) -> Result<Vec<(K, V)>> + Sync,
    {
        self.partition(inputs)
            .into_par_iter()
            .map(|partition| -> Result<Vec<(K, V)>> {
                let mut pairs = Vec::new();
                for input in partition {
                    pairs.extend(mapper(input)?);
                }
                Ok(pairs)
            })
            .collect()
    }

    /// Groups each partition's pairs by key and runs `combiner` on every group,
    /// before anything crosses a partition boundary.
    pub fn combine<K, V, C>(&self, partitions: Vec<Vec<(K, V)>>, combiner: C) -> Vec<Vec<(K, V)>>
    where
        K: Ord + Send,
        V: Send,
        C: Fn(K, Vec<V>) -> Vec<(K, V)> + Sync,
    {
        partitions
            .into_par_iter()
            .map(|partition| {
                group_by_key(partition)
                    .into_iter()
                    .flat_map(|(key, values)| combiner(key, values))
                    .collect()
            })
            .collect()
    }

    pub fn shuffle<K, V, P>(&self, pairs: P) -> Vec<(K, Vec<V>)>
    where
        K: Ord,
        P: IntoIterator<Item = (K, V)>,
    {
        group_by_key(pairs)
    }

    pub fn reduce<K, V, O, R>(&self, groups: Vec<(K, Vec<V>)>, reducer: R) -> Result<Vec<O>>
    where
        K: Send,
        V: Send,
        O: Send,
        R: Fn(K, Vec<V>) -> Result<Vec<O>> + Sync,
    {
        let outputs: Vec<Vec<O>> = groups
            .into_par_iter()
            .map(|(key, values)| reducer(key, values))
            .collect::<Result<_>>()?;
        Ok(outputs.into_iter().flatten().collect())
    }
}

fn group_by_key<K, V, P>(pairs: P) -> Vec<(K, Vec<V>)>
where
    K: Ord,
    P: IntoIterator<Item = (K, V)>,
{
    let mut groups: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_partition() {
        let executor = LocalExecutor::new(3);
        let partitions = executor.partition((0..7).collect::<Vec<_>>());
        assert_eq!(partitions, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert!(executor.partition(Vec::<u8>::new()).is_empty());
        assert_eq!(LocalExecutor::new(0).num_partitions(), 1);
    }

    #[test]
    fn test_word_count() {
        let executor = LocalExecutor::new(2);
        let lines = vec!["a b", "b c", "c a b"];
        let mapped = executor
            .map(lines, |line| Ok(line.split(' ').map(|w| (w, 1usize)).collect()))
            .unwrap();
        let combined = executor.combine(mapped, |word, counts| vec![(word, counts.iter().sum())]);
        // a combiner leaves at most one pair per key in each partition
        assert!(combined.iter().all(|p| p.len() <= 3));
        let counts = executor
            .reduce(executor.shuffle(combined.into_iter().flatten()), |word, counts| {
                Ok(vec![(word, counts.iter().sum::<usize>())])
            })
            .unwrap();
        assert_eq!(counts, vec![("a", 2), ("b", 3), ("c", 2)]);
    }

    #[test]
    fn test_errors_fail_the_stage() {
        let executor = LocalExecutor::new(4);
        let result = executor.map((0..10).collect(), |i: u32| {
            if i == 7 {
                Err(Error::MalformedRecord(format!("record {}", i)))
            } else {
                Ok(vec![(i, i)])
            }
        });
        assert!(matches!(result, Err(Error::MalformedRecord(_))));
    }
}
