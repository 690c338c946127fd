use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Index positions of one band, ascending.
pub type BandIndices = SmallVec<[usize; 8]>;

/// Values of a signature projected through a selector.
pub type SubSignature = SmallVec<[u64; 8]>;

/// How a signature is cut into bands.
///
/// * `Disjoint` tiles the signature into contiguous, non-overlapping windows
///   (classic banding from chapter 3 of Mining of Massive Datasets).
/// * `Cyclic` takes one `band_width` window per start offset, wrapping around the
///   end of the signature. Linear in the signature width, more bands than `Disjoint`.
/// * `Exhaustive` takes every `band_width`-subset of positions, `C(n, k)` bands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SelectorMode {
    Disjoint,
    Cyclic,
    Exhaustive,
}

impl FromStr for SelectorMode {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.to_lowercase().as_str() {
            "disjoint" => Ok(SelectorMode::Disjoint),
            "cyclic" => Ok(SelectorMode::Cyclic),
            "exhaustive" => Ok(SelectorMode::Exhaustive),
            _ => Err(Error::config(
                "selector_mode",
                format!(
                    "unsupported selector mode [{}]. Supported modes [disjoint, cyclic, exhaustive].",
                    input
                ),
            )),
        }
    }
}

impl TryFrom<String> for SelectorMode {
    type Error = Error;

    fn try_from(input: String) -> Result<Self> {
        input.parse()
    }
}

impl fmt::Display for SelectorMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SelectorMode::Disjoint => write!(f, "disjoint"),
            SelectorMode::Cyclic => write!(f, "cyclic"),
            SelectorMode::Exhaustive => write!(f, "exhaustive"),
        }
    }
}

/// One band: a key identifying the band and the signature positions it reads.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Selector {
    pub band_key: usize,
    pub indices: BandIndices,
}

impl Selector {
    /// Projects `signature` onto this band's positions.
    ///
    /// Panics if the signature is shorter than the width the selector was built for.
    #[inline]
    pub fn select<T: Copy>(&self, signature: &[T]) -> SmallVec<[T; 8]> {
        self.indices.iter().map(|&i| signature[i]).collect()
    }
}

/// Builds the selectors for a `sig_width` signature cut into bands of `band_width`.
///
/// The result depends only on the arguments: the same triple always produces the
/// same selectors in the same order. `band_key` is the position of the selector in
/// the returned list.
///
/// # Examples
///
/// ```
/// use lsh_hdc::minhash::{create_sig_selectors, SelectorMode};
///
/// let signature: Vec<u64> = (0..9).collect();
/// let bands: Vec<Vec<u64>> = create_sig_selectors(9, 3, SelectorMode::Disjoint)
///     .unwrap()
///     .iter()
///     .map(|selector| selector.select(&signature).to_vec())
///     .collect();
/// assert_eq!(bands, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]);
/// ```
pub fn create_sig_selectors(
    sig_width: usize,
    band_width: usize,
    mode: SelectorMode,
) -> Result<Vec<Selector>> {
    if sig_width == 0 {
        return Err(Error::config("sig_width", "signature width must be positive"));
    }
    if band_width == 0 {
        return Err(Error::config("band_width", "band width must be positive"));
    }
    if band_width > sig_width {
        return Err(Error::config(
            "band_width",
            format!(
                "band width {} exceeds signature width {}",
                band_width, sig_width
            ),
        ));
    }
    let bands: Vec<BandIndices> = match mode {
        SelectorMode::Disjoint => {
            if sig_width % band_width != 0 {
                return Err(Error::config(
                    "band_width",
                    format!(
                        "band width {} does not divide signature width {}",
                        band_width, sig_width
                    ),
                ));
            }
            (0..sig_width / band_width)
                .map(|band| (band * band_width..(band + 1) * band_width).collect())
                .collect()
        }
        SelectorMode::Cyclic => {
            let windows: BTreeSet<BandIndices> = (0..sig_width)
                .map(|start| {
                    let mut window: BandIndices = (start..start + band_width)
                        .map(|i| i % sig_width)
                        .collect();
                    window.sort_unstable();
                    window
                })
                .collect();
            windows.into_iter().collect()
        }
        SelectorMode::Exhaustive => (0..sig_width)
            .combinations(band_width)
            .map(BandIndices::from_vec)
            .collect(),
    };
    Ok(bands
        .into_iter()
        .enumerate()
        .map(|(band_key, indices)| Selector { band_key, indices })
        .collect())
}
