use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::minhash::{HashFamilies, SelectorMode, ShingleHashers};

const MERSENNE_PRIME_31: u64 = (1 << 31) - 1;

/// Parameters of one clustering run.
///
/// Built once, validated, then passed by reference to every stage. Fields missing
/// from a serialized config take their defaults.
///
/// ```
/// use lsh_hdc::ClusterConfig;
///
/// let config = ClusterConfig::from_json_str(r#"{"num_hashes": 12, "band_width": 4}"#).unwrap();
/// assert_eq!(config.num_bands().unwrap(), 3);
/// assert!(ClusterConfig::from_json_str(r#"{"num_hashes": 12, "band_width": 5}"#).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub hash_family: HashFamilies,
    /// Signature width.
    pub num_hashes: usize,
    /// Upper bound of the multiply family's random parameters.
    pub num_buckets: u64,
    pub seed: u64,
    /// Number of signature positions per band.
    pub band_width: usize,
    pub selector_mode: SelectorMode,
    /// Number of consecutive words per shingle.
    pub shingle_size: usize,
    pub shingle_hasher: ShingleHashers,
    /// Adds the record's grouping prefix (e.g. the author) as one more shingle.
    pub include_prefix: bool,
    /// Largest sketch distance at which a candidate joins a pivot's cluster.
    pub max_dist: f64,
    /// Smallest number of distinct buckets a candidate must share with a pivot.
    pub min_support: usize,
    /// Clusters are written only when they have more members than this.
    pub min_cluster_size: usize,
    pub num_partitions: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            hash_family: HashFamilies::Multiply,
            num_hashes: 12,
            num_buckets: MERSENNE_PRIME_31,
            seed: 0,
            band_width: 3,
            selector_mode: SelectorMode::Disjoint,
            shingle_size: 4,
            shingle_hasher: ShingleHashers::Fnv,
            include_prefix: true,
            max_dist: 0.5,
            min_support: 2,
            min_cluster_size: 1,
            num_partitions: 4,
        }
    }
}

fn check_name<T: FromStr<Err = Error>>(config: &Value, field: &str) -> Result<()> {
    match config.get(field).and_then(Value::as_str) {
        Some(name) => name.parse::<T>().map(|_| ()),
        None => Ok(()),
    }
}

impl ClusterConfig {
    /// Parses and validates a JSON config. Enum fields are matched
    /// case-insensitively and unknown names are configuration errors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        check_name::<HashFamilies>(&value, "hash_family")?;
        check_name::<SelectorMode>(&value, "selector_mode")?;
        check_name::<ShingleHashers>(&value, "shingle_hasher")?;
        let config: ClusterConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_hashes == 0 {
            return Err(Error::config("num_hashes", "signature needs at least one hash"));
        }
        if self.band_width == 0 || self.band_width > self.num_hashes {
            return Err(Error::config(
                "band_width",
                format!("must be in [1, {}], got {}", self.num_hashes, self.band_width),
            ));
        }
        if self.selector_mode == SelectorMode::Disjoint && self.num_hashes % self.band_width != 0 {
            return Err(Error::config(
                "band_width",
                format!(
                    "band width {} does not divide signature width {}",
                    self.band_width, self.num_hashes
                ),
            ));
        }
        if self.hash_family == HashFamilies::Multiply && self.num_buckets == 0 {
            return Err(Error::config("num_buckets", "must be positive"));
        }
        if self.shingle_size == 0 {
            return Err(Error::config("shingle_size", "must be positive"));
        }
        if self.max_dist.is_nan() || self.max_dist < 0.0 {
            return Err(Error::config(
                "max_dist",
                format!("must be a non-negative number, got {}", self.max_dist),
            ));
        }
        if self.min_support == 0 {
            return Err(Error::config("min_support", "must be positive"));
        }
        if self.num_partitions == 0 {
            return Err(Error::config("num_partitions", "must be positive"));
        }
        Ok(())
    }

    /// Number of bands the configured selector mode produces.
    pub fn num_bands(&self) -> Result<usize> {
        Ok(crate::minhash::create_sig_selectors(
            self.num_hashes,
            self.band_width,
            self.selector_mode,
        )?
        .len())
    }
}
