mod banding;
mod hash_family;
mod hashers;

use std::collections::HashSet;
use std::hash::Hash;
use std::iter::FromIterator;

pub use self::banding::{create_sig_selectors, BandIndices, Selector, SelectorMode, SubSignature};
pub use self::hash_family::{HashFamilies, HashFamily, MultiplyHashFamily, XorHashFamily};
pub use self::hashers::{Sha1Hasher, ShingleHashers};

use crate::error::{Error, Result};

/// Builds MinHash signatures: position `i` of a signature is the minimum of the
/// `i`-th hash function over the hashed shingles of a document.
pub struct MinHasher {
    family: Box<dyn HashFamily>,
    shingle_hasher: ShingleHashers,
    seed: u64,
}

impl MinHasher {
    pub fn new(family: Box<dyn HashFamily>, shingle_hasher: ShingleHashers, seed: u64) -> Self {
        MinHasher {
            family,
            shingle_hasher,
            seed,
        }
    }

    pub fn num_hashes(&self) -> usize {
        self.family.num_hashes()
    }

    /// Returns `None` when `iter` yields no shingles.
    pub fn create_signature<T, U>(&self, iter: T) -> Option<Vec<u64>>
    where
        T: Iterator<Item = U>,
        U: Hash,
    {
        let hashes: Vec<u64> = iter
            .map(|item| self.shingle_hasher.hash_one(&item, self.seed))
            .collect();
        if hashes.is_empty() {
            return None;
        }
        let signature = (0..self.family.num_hashes())
            .map(|index| {
                hashes
                    .iter()
                    .map(|hash| self.family.hash_at(index, *hash))
                    .min()
                    .unwrap_or(u64::MAX)
            })
            .collect();
        Some(signature)
    }
}

pub fn compute_jaccard_similarity<T, U>(iter_1: T, iter_2: T) -> f32
where
    T: Iterator<Item = U>,
    U: Hash + Eq,
{
    let h1 = HashSet::<U>::from_iter(iter_1);
    let h2 = HashSet::<U>::from_iter(iter_2);
    let intersection_len = h1.intersection(&h2).count();
    let union_len = h1.len() + h2.len() - intersection_len;
    if union_len == 0 {
        return 1.0;
    }
    intersection_len as f32 / union_len as f32
}

/// Estimates jaccard similarity as the fraction of equal positions of two signatures.
/// # Examples
///
/// ```
/// use lsh_hdc::minhash::compute_minhash_similarity;
///
/// let m1 = [1, 2, 3, 4, 5, 6];
/// let m2 = [1, 2, 3, 7, 5, 8];
/// assert!((compute_minhash_similarity(&m1, &m2).unwrap() - 0.666) < 0.01);
/// assert!(compute_minhash_similarity(&m1, &m2[..3]).is_err());
/// ```
pub fn compute_minhash_similarity<T>(min_hashes_1: &[T], min_hashes_2: &[T]) -> Result<f64>
where
    T: Eq,
{
    if min_hashes_1.len() != min_hashes_2.len() {
        return Err(Error::DistanceComputation {
            expected: min_hashes_1.len(),
            found: min_hashes_2.len(),
        });
    }
    let num_hashes = min_hashes_1.len();
    if num_hashes == 0 {
        return Ok(1.0);
    }
    let matches: u64 = min_hashes_1
        .iter()
        .zip(min_hashes_2.iter())
        .map(|(min_hash_1, min_hash_2)| (min_hash_1 == min_hash_2) as u64)
        .sum();
    Ok((matches as f64) / (num_hashes as f64))
}

pub fn compute_minhash_distance<T>(min_hashes_1: &[T], min_hashes_2: &[T]) -> Result<f64>
where
    T: Eq,
{
    Ok(1.0 - compute_minhash_similarity(min_hashes_1, min_hashes_2)?)
}
