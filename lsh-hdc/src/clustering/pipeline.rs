use serde::Serialize;
use tracing::{debug, info};

use crate::clustering::stages::{
    combine_candidates, confirmed_links, merge_reduce, pivot_bucket, reduce_candidates,
    resolve_components, MergePair,
};
use crate::clustering::{CandidateKey, LocalExecutor};
use crate::error::Result;
use crate::sketch::{Member, SketchSource};

/// Number of merge rounds. Chains of duplicates that need more hops to link up
/// stay split and are left out of the result.
pub const MERGE_ROUNDS: usize = 2;

/// Counts collected while a pipeline runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub records: usize,
    /// `(bucket, member)` pairs emitted by the mapper.
    pub candidate_pairs: usize,
    /// Buckets holding at least two members.
    pub buckets: usize,
    /// Confirmed records left after each merge round.
    pub confirmed_per_round: Vec<usize>,
    pub clusters: usize,
}

#[derive(Clone, Debug)]
pub struct ClusterRun<L> {
    /// Connected components, members ascending, ordered by smallest member.
    pub clusters: Vec<Vec<L>>,
    pub stats: PipelineStats,
}

type Pair<S> = MergePair<<S as SketchSource>::Label, <S as SketchSource>::Sketch>;

/// Runs the cluster stages in-process.
///
/// ```
/// use lsh_hdc::clustering::ClusterPipeline;
/// use lsh_hdc::sketch::{JsonRecordAccessor, MinHashSketchSource};
/// use lsh_hdc::ClusterConfig;
/// use serde_json::json;
///
/// let config = ClusterConfig { include_prefix: false, ..ClusterConfig::default() };
/// let source = MinHashSketchSource::new(&config, JsonRecordAccessor::default()).unwrap();
/// let text = "the quick brown fox jumps over the lazy dog";
/// let records: Vec<_> = (0..3)
///     .map(|i| json!({"object": {"post_id": i, "user_id": i, "content": text}}))
///     .collect();
/// let run = ClusterPipeline::new(source, 2).run(&records).unwrap();
/// assert_eq!(run.clusters, vec![vec!["0", "1", "2"]]);
/// ```
pub struct ClusterPipeline<S: SketchSource> {
    source: S,
    executor: LocalExecutor,
}

impl<S: SketchSource> ClusterPipeline<S> {
    pub fn new(source: S, num_partitions: usize) -> Self {
        ClusterPipeline {
            source,
            executor: LocalExecutor::new(num_partitions),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn run(&self, records: &[S::Record]) -> Result<ClusterRun<S::Label>> {
        let mut stats = PipelineStats {
            records: records.len(),
            ..PipelineStats::default()
        };

        let buckets = self.generate_candidates(records, &mut stats)?;
        let mut pairs: Vec<Pair<S>> = self
            .executor
            .map(buckets, |(key, members)| Ok(pivot_bucket(key, members).into_iter().collect()))?
            .into_iter()
            .flatten()
            .collect();

        for round in 0..MERGE_ROUNDS {
            pairs = self.merge_round(pairs)?;
            let confirmed = pairs.iter().filter(|(_, value)| value.is_confirmed()).count();
            debug!(round, records = pairs.len(), confirmed, "merge round done");
            stats.confirmed_per_round.push(confirmed);
        }

        let clusters = self.resolve(pairs)?;
        stats.clusters = clusters.len();
        info!(
            records = stats.records,
            buckets = stats.buckets,
            clusters = stats.clusters,
            "clustering finished"
        );
        Ok(ClusterRun { clusters, stats })
    }

    /// Stage 1: buckets with at least two distinct members, in key order.
    pub fn generate_candidates(
        &self,
        records: &[S::Record],
        stats: &mut PipelineStats,
    ) -> Result<Vec<(CandidateKey, Vec<Member<S>>)>> {
        let mapped = self
            .executor
            .map(records.iter().collect(), |record| self.source.mapper(record))?;
        stats.candidate_pairs = mapped.iter().map(Vec::len).sum();

        let combined = self.executor.combine(mapped, |key, values| {
            combine_candidates(&self.source, key, values)
        });
        let groups = self.executor.shuffle(combined.into_iter().flatten());
        let buckets = self.executor.reduce(groups, |key, values| {
            Ok(reduce_candidates(&self.source, key, values).into_iter().collect())
        })?;
        stats.buckets = buckets.len();
        debug!(
            candidate_pairs = stats.candidate_pairs,
            buckets = stats.buckets,
            "candidate generation done"
        );
        Ok(buckets)
    }

    /// Stages 2 and 3: groups pairs by key and runs the merge reducer once.
    pub fn merge_round(&self, pairs: Vec<Pair<S>>) -> Result<Vec<Pair<S>>> {
        let groups = self.executor.shuffle(pairs);
        self.executor
            .reduce(groups, |pivot, values| merge_reduce(&self.source, pivot, values))
    }

    /// Stage 4: connected components over the confirmed records.
    pub fn resolve(&self, pairs: Vec<Pair<S>>) -> Result<Vec<Vec<S::Label>>> {
        let links = self.executor.map(pairs, |(key, value)| {
            Ok(confirmed_links(key, value).map(|labels| ((), labels)).into_iter().collect())
        })?;
        let groups = self.executor.shuffle(links.into_iter().flatten());
        let components = self
            .executor
            .reduce(groups, |_, links| Ok(resolve_components(links)))?;
        Ok(components.into_iter().map(|(_, members)| members).collect())
    }
}
