//! Producers of labeled sketches and LSH candidate buckets.

mod records;

use std::fmt::Debug;
use std::hash::Hash;

use tracing::trace;

use crate::clustering::{CandidateKey, Label, SketchRecord};
use crate::config::ClusterConfig;
use crate::error::Result;
use crate::minhash::{compute_minhash_distance, create_sig_selectors, MinHasher, Selector};
use crate::text::shingle_words;

pub use self::records::{AcceptAll, ContentFilter, JsonRecordAccessor, MinTokens, RecordAccessor};

/// A candidate bucket member produced by `S`.
pub type Member<S> = SketchRecord<<S as SketchSource>::Label, <S as SketchSource>::Sketch>;

/// Feeds the cluster pipeline: turns records into candidate buckets and
/// compares sketches.
pub trait SketchSource: Sync {
    type Record: Sync;
    type Label: Label;
    type Sketch: Clone + Ord + Hash + Debug + Send + Sync;

    /// Emits one `(bucket, member)` pair per band of the record's signature.
    /// Records that produce no signature emit nothing.
    fn mapper(&self, record: &Self::Record) -> Result<Vec<(CandidateKey, Member<Self>)>>;

    /// Aggregates the members of one bucket. Used both as combiner and as reducer,
    /// so applying it to its own output must not change anything.
    fn reducer(
        &self,
        key: CandidateKey,
        mut values: Vec<Member<Self>>,
    ) -> (CandidateKey, Vec<Member<Self>>) {
        values.sort();
        values.dedup_by(|a, b| a.label == b.label);
        (key, values)
    }

    fn sketch_distance(&self, a: &Self::Sketch, b: &Self::Sketch) -> Result<f64>;

    fn max_dist(&self) -> f64;

    fn min_support(&self) -> usize;
}

/// Text records sketched by MinHash signatures and banded into LSH buckets.
///
/// The full signature is the sketch; two sketches are compared by the fraction
/// of positions where they differ.
pub struct MinHashSketchSource<A: RecordAccessor> {
    accessor: A,
    filter: Box<dyn ContentFilter>,
    min_hasher: MinHasher,
    selectors: Vec<Selector>,
    shingle_size: usize,
    include_prefix: bool,
    max_dist: f64,
    min_support: usize,
}

impl<A: RecordAccessor> MinHashSketchSource<A> {
    pub fn new(config: &ClusterConfig, accessor: A) -> Result<Self> {
        config.validate()?;
        let family = config
            .hash_family
            .new_family(config.num_hashes, config.num_buckets, config.seed)?;
        let selectors =
            create_sig_selectors(config.num_hashes, config.band_width, config.selector_mode)?;
        Ok(MinHashSketchSource {
            accessor,
            filter: Box::new(AcceptAll),
            min_hasher: MinHasher::new(family, config.shingle_hasher, config.seed),
            selectors,
            shingle_size: config.shingle_size,
            include_prefix: config.include_prefix,
            max_dist: config.max_dist,
            min_support: config.min_support,
        })
    }

    /// Records whose body `filter` rejects get no signature.
    pub fn with_filter<F: ContentFilter + 'static>(mut self, filter: F) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn accessor(&self) -> &A {
        &self.accessor
    }

    pub fn num_bands(&self) -> usize {
        self.selectors.len()
    }

    /// MinHash signature of a record, `None` if it is filtered out or has no words.
    pub fn signature(&self, record: &A::Record) -> Result<Option<Vec<u64>>> {
        let body = self.accessor.body(record)?;
        if !self.filter.accept(body) {
            return Ok(None);
        }
        let mut shingles = shingle_words(body, self.shingle_size);
        if shingles.is_empty() {
            return Ok(None);
        }
        if self.include_prefix {
            if let Some(prefix) = self.accessor.prefix(record) {
                shingles.push(format!("\u{0}prefix:{}", prefix));
            }
        }
        Ok(self.min_hasher.create_signature(shingles.iter()))
    }
}

impl<A: RecordAccessor> SketchSource for MinHashSketchSource<A> {
    type Record = A::Record;
    type Label = A::Label;
    type Sketch = Vec<u64>;

    fn mapper(&self, record: &A::Record) -> Result<Vec<(CandidateKey, Member<Self>)>> {
        let label = self.accessor.label(record)?;
        let signature = match self.signature(record)? {
            Some(signature) => signature,
            None => {
                trace!(?label, "no signature for record");
                return Ok(Vec::new());
            }
        };
        Ok(self
            .selectors
            .iter()
            .map(|selector| {
                (
                    CandidateKey::new(selector.band_key, selector.select(&signature)),
                    SketchRecord::new(label.clone(), signature.clone()),
                )
            })
            .collect())
    }

    fn sketch_distance(&self, a: &Vec<u64>, b: &Vec<u64>) -> Result<f64> {
        compute_minhash_distance(a, b)
    }

    fn max_dist(&self) -> f64 {
        self.max_dist
    }

    fn min_support(&self) -> usize {
        self.min_support
    }
}
