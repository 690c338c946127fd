use fnv::FnvHasher;
use seahash::SeaHasher;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use siphasher::sip::SipHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Stable hashers that turn shingles into the integers fed to a [`HashFamily`].
///
/// All of them produce the same value for the same input across processes,
/// unlike `std`'s `RandomState`, which keeps signatures reproducible between runs.
///
/// [`HashFamily`]: crate::minhash::HashFamily
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ShingleHashers {
    Fnv,
    Sip,
    Sha1,
    Sea,
}

impl ShingleHashers {
    /// Creates a fresh hasher. Only `Sip` is keyed by the seed.
    pub fn new_hasher(&self, seed: u64) -> Box<dyn Hasher> {
        match self {
            ShingleHashers::Fnv => Box::new(FnvHasher::default()),
            ShingleHashers::Sip => Box::new(SipHasher::new_with_keys(seed, seed ^ SIP_KEY_MIX)),
            ShingleHashers::Sha1 => Box::new(Sha1Hasher::new()),
            ShingleHashers::Sea => Box::new(SeaHasher::new()),
        }
    }

    pub fn hash_one<U: Hash + ?Sized>(&self, item: &U, seed: u64) -> u64 {
        let mut hasher = self.new_hasher(seed);
        item.hash(&mut hasher);
        hasher.finish()
    }
}

const SIP_KEY_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

impl FromStr for ShingleHashers {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.to_lowercase().as_str() {
            "fnv" => Ok(ShingleHashers::Fnv),
            "sip" => Ok(ShingleHashers::Sip),
            "sha1" => Ok(ShingleHashers::Sha1),
            "sea" => Ok(ShingleHashers::Sea),
            _ => Err(Error::config(
                "shingle_hasher",
                format!(
                    "unsupported hasher [{}]. Supported hashers [fnv, sip, sha1, sea].",
                    input
                ),
            )),
        }
    }
}

impl TryFrom<String> for ShingleHashers {
    type Error = Error;

    fn try_from(input: String) -> Result<Self> {
        input.parse()
    }
}

impl fmt::Display for ShingleHashers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Buffers written bytes and reports the first 8 bytes of their SHA-1 digest.
pub struct Sha1Hasher {
    bytes: Vec<u8>,
}

impl Sha1Hasher {
    pub fn new() -> Self {
        Sha1Hasher { bytes: Vec::new() }
    }
}

impl Default for Sha1Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Sha1Hasher {
    fn finish(&self) -> u64 {
        let mut sha = Sha1::new();
        sha.update(self.bytes.as_slice());
        let digest = sha.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[0..8]);
        u64::from_be_bytes(head)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }
}
