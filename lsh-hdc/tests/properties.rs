use std::collections::BTreeSet;

use lsh_hdc::clustering::UnionFind;
use lsh_hdc::minhash::{
    create_sig_selectors, HashFamily, MultiplyHashFamily, SelectorMode, XorHashFamily,
};
use proptest::prelude::*;

fn binomial(n: usize, k: usize) -> usize {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

proptest! {
    #[test]
    fn test_xor_family_inverts_itself(x in any::<u64>(), num_hashes in 1usize..16, seed in any::<u64>()) {
        let family = XorHashFamily::new(num_hashes, 0, seed);
        let hashes = family.hashn(x);
        prop_assert_eq!(hashes.len(), num_hashes);
        for (i, &h) in hashes.iter().enumerate() {
            prop_assert_eq!(family.hashn(h)[i], x & 0xffff_ffff);
        }
    }

    #[test]
    fn test_multiply_single_bucket_outputs_are_equal(x in any::<u64>(), num_hashes in 1usize..16, seed in any::<u64>()) {
        let family = MultiplyHashFamily::new(num_hashes, 1, seed).unwrap();
        let hashes = family.hashn(x);
        prop_assert!(hashes.iter().all(|&h| h == hashes[0]));
    }

    #[test]
    fn test_selector_counts(sig_width in 1usize..12, band_width in 1usize..6) {
        prop_assume!(band_width <= sig_width);

        let exhaustive = create_sig_selectors(sig_width, band_width, SelectorMode::Exhaustive).unwrap();
        prop_assert_eq!(exhaustive.len(), binomial(sig_width, band_width));

        let cyclic = create_sig_selectors(sig_width, band_width, SelectorMode::Cyclic).unwrap();
        prop_assert!(cyclic.len() <= sig_width);

        for selector in exhaustive.iter().chain(cyclic.iter()) {
            prop_assert_eq!(selector.indices.len(), band_width);
            prop_assert!(selector.indices.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(selector.indices.iter().all(|&i| i < sig_width));
        }
        let distinct: BTreeSet<_> = cyclic.iter().map(|s| s.indices.clone()).collect();
        prop_assert_eq!(distinct.len(), cyclic.len());

        let disjoint = create_sig_selectors(sig_width, band_width, SelectorMode::Disjoint);
        if sig_width % band_width == 0 {
            let covered: Vec<usize> = disjoint
                .unwrap()
                .iter()
                .flat_map(|s| s.indices.to_vec())
                .collect();
            prop_assert_eq!(covered, (0..sig_width).collect::<Vec<_>>());
        } else {
            prop_assert!(disjoint.is_err());
        }
    }

    #[test]
    fn test_union_order_does_not_change_partition(
        (pairs, shuffled) in prop::collection::vec((0u32..30, 0u32..30), 0..40)
            .prop_flat_map(|p| (Just(p.clone()), Just(p).prop_shuffle())),
    ) {
        let mut a = UnionFind::new();
        for (x, y) in pairs {
            a.union(x, y);
        }
        let mut b = UnionFind::new();
        for (x, y) in shuffled {
            b.union(y, x);
        }
        prop_assert_eq!(a.sets(), b.sets());
        prop_assert_eq!(a.num_sets(), b.num_sets());
    }
}
