//! Distributed-style resolution of LSH bucket collisions into duplicate clusters.
//!
//! The work is split into pure stage functions ([`stages`]) that a map/reduce
//! orchestrator composes. [`ClusterPipeline`] runs them in-process on top of
//! [`LocalExecutor`]:
//!
//! 1. candidate generation: the sketch source maps each record to LSH buckets; the
//!    bucket aggregation runs as combiner and reducer, singleton buckets are dropped.
//! 2. every bucket is re-keyed by its smallest label (the pivot) and merged.
//! 3. a second merge round over the groups left unconfirmed by the first.
//! 4. confirmed links are unioned into connected components.

pub mod executor;
pub mod pipeline;
pub mod stages;
mod union_find;

use std::fmt::Debug;
use std::hash::Hash;

use crate::minhash::SubSignature;

pub use self::executor::LocalExecutor;
pub use self::pipeline::{ClusterPipeline, ClusterRun, PipelineStats, MERGE_ROUNDS};
pub use self::union_find::UnionFind;

/// Record identifiers. Labels must be totally ordered so that pivots are chosen
/// the same way no matter in which order values reach a reducer.
pub trait Label: Ord + Hash + Clone + Debug + Send + Sync {}

impl<T> Label for T where T: Ord + Hash + Clone + Debug + Send + Sync {}

/// An LSH bucket: the band that produced it and the band's projected values.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateKey {
    pub band: usize,
    pub values: SubSignature,
}

impl CandidateKey {
    pub fn new(band: usize, values: SubSignature) -> Self {
        CandidateKey { band, values }
    }
}

/// A record's label together with its sketch.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SketchRecord<L, S> {
    pub label: L,
    pub sketch: S,
}

impl<L, S> SketchRecord<L, S> {
    pub fn new(label: L, sketch: S) -> Self {
        SketchRecord { label, sketch }
    }
}

/// Payload exchanged between merge rounds.
///
/// `provenance` is the bucket that proposed `members` for the key's cluster.
/// `None` marks members already confirmed as duplicates of the key.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergeValue<L, S> {
    pub provenance: Option<CandidateKey>,
    pub members: Vec<SketchRecord<L, S>>,
}

impl<L, S> MergeValue<L, S> {
    pub fn confirmed(members: Vec<SketchRecord<L, S>>) -> Self {
        MergeValue {
            provenance: None,
            members,
        }
    }

    pub fn unconfirmed(provenance: CandidateKey, members: Vec<SketchRecord<L, S>>) -> Self {
        MergeValue {
            provenance: Some(provenance),
            members,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.provenance.is_none()
    }
}
