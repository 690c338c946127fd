use std::fmt;
use std::str::FromStr;

use rand::distributions::{Distribution, Uniform};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A family of `num_hashes` pseudorandom hash functions over integers.
///
/// Implementations draw their parameters once, at construction, from a generator
/// seeded with the caller's seed. After that `hashn` is a pure function of the input:
/// the same family hashing the same value always yields the same sequence.
///
/// Hash values are not reduced into `num_buckets`; callers apply the modulo
/// wherever bucket assignment is needed.
pub trait HashFamily: Send + Sync {
    /// Number of hash functions in the family.
    fn num_hashes(&self) -> usize;

    /// Value of the `index`-th hash function on `x`.
    fn hash_at(&self, index: usize, x: u64) -> u64;

    /// All `num_hashes` hashes of `x`, in function order.
    fn hashn(&self, x: u64) -> Vec<u64> {
        (0..self.num_hashes()).map(|i| self.hash_at(i, x)).collect()
    }
}

/// Xors the low 32 bits of the input with a random 32-bit mask per function.
///
/// Every function is its own inverse on 32-bit values:
///
/// ```
/// use lsh_hdc::minhash::{HashFamily, XorHashFamily};
///
/// let family = XorHashFamily::new(4, 10, 7);
/// let x = 0xdead_beef_u64;
/// for i in 0..4 {
///     assert_eq!(family.hashn(family.hashn(x)[i])[i], x & 0xffff_ffff);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct XorHashFamily {
    masks: Vec<u32>,
}

impl XorHashFamily {
    /// `num_buckets` is accepted for interface parity and does not affect the masks.
    pub fn new(num_hashes: usize, _num_buckets: u64, seed: u64) -> Self {
        let mut rng = Pcg64::seed_from_u64(seed);
        XorHashFamily {
            masks: (0..num_hashes).map(|_| rng.gen::<u32>()).collect(),
        }
    }
}

impl HashFamily for XorHashFamily {
    fn num_hashes(&self) -> usize {
        self.masks.len()
    }

    #[inline]
    fn hash_at(&self, index: usize, x: u64) -> u64 {
        (x & 0xffff_ffff) ^ self.masks[index] as u64
    }
}

/// Hashes of the form `a * (x >> 4) + b * x + c` with `a`, `b`, `c` drawn
/// uniformly from `[1, num_buckets]`. Arithmetic wraps at 64 bits.
#[derive(Clone, Debug)]
pub struct MultiplyHashFamily {
    params: Vec<(u64, u64, u64)>,
}

impl MultiplyHashFamily {
    pub fn new(num_hashes: usize, num_buckets: u64, seed: u64) -> Result<Self> {
        if num_buckets == 0 {
            return Err(Error::config(
                "num_buckets",
                "multiply hash family needs at least one bucket",
            ));
        }
        let mut rng = Pcg64::seed_from_u64(seed);
        let range = Uniform::new_inclusive(1, num_buckets);
        Ok(MultiplyHashFamily {
            params: (0..num_hashes)
                .map(|_| {
                    (
                        range.sample(&mut rng),
                        range.sample(&mut rng),
                        range.sample(&mut rng),
                    )
                })
                .collect(),
        })
    }
}

impl HashFamily for MultiplyHashFamily {
    fn num_hashes(&self) -> usize {
        self.params.len()
    }

    #[inline]
    fn hash_at(&self, index: usize, x: u64) -> u64 {
        let (a, b, c) = self.params[index];
        a.wrapping_mul(x >> 4)
            .wrapping_add(b.wrapping_mul(x))
            .wrapping_add(c)
    }
}

/// Selects a hash family implementation by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum HashFamilies {
    Xor,
    Multiply,
}

impl HashFamilies {
    pub fn new_family(
        &self,
        num_hashes: usize,
        num_buckets: u64,
        seed: u64,
    ) -> Result<Box<dyn HashFamily>> {
        match self {
            HashFamilies::Xor => Ok(Box::new(XorHashFamily::new(num_hashes, num_buckets, seed))),
            HashFamilies::Multiply => Ok(Box::new(MultiplyHashFamily::new(
                num_hashes,
                num_buckets,
                seed,
            )?)),
        }
    }
}

impl FromStr for HashFamilies {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.to_lowercase().as_str() {
            "xor" => Ok(HashFamilies::Xor),
            "multiply" => Ok(HashFamilies::Multiply),
            _ => Err(Error::config(
                "hash_family",
                format!(
                    "unsupported hash family [{}]. Supported families [xor, multiply].",
                    input
                ),
            )),
        }
    }
}

impl TryFrom<String> for HashFamilies {
    type Error = Error;

    fn try_from(input: String) -> Result<Self> {
        input.parse()
    }
}

impl fmt::Display for HashFamilies {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HashFamilies::Xor => write!(f, "xor"),
            HashFamilies::Multiply => write!(f, "multiply"),
        }
    }
}
