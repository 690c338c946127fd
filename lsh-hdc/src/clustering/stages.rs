//! Stage functions of the cluster pipeline.
//!
//! Every function here is pure and gives the same result for any order of the
//! values it receives, so an orchestrator may shuffle, partition and retry freely.

use std::collections::{BTreeMap, BTreeSet};

use crate::clustering::{CandidateKey, Label, MergeValue, SketchRecord, UnionFind};
use crate::error::Result;
use crate::sketch::{Member, SketchSource};

/// A merge-round record: a member keyed with the members proposed or confirmed for it.
pub type MergePair<L, S> = (SketchRecord<L, S>, MergeValue<L, S>);

/// Stage 1 combiner: aggregates one bucket inside a partition.
pub fn combine_candidates<S: SketchSource>(
    source: &S,
    key: CandidateKey,
    values: Vec<Member<S>>,
) -> Vec<(CandidateKey, Member<S>)> {
    let (key, values) = source.reducer(key, values);
    values
        .into_iter()
        .map(|value| (key.clone(), value))
        .collect()
}

/// Stage 1 reducer: aggregates a bucket and keeps it only if it holds a collision.
pub fn reduce_candidates<S: SketchSource>(
    source: &S,
    key: CandidateKey,
    values: Vec<Member<S>>,
) -> Option<(CandidateKey, Vec<Member<S>>)> {
    let (key, values) = source.reducer(key, values);
    if values.len() > 1 {
        Some((key, values))
    } else {
        None
    }
}

/// Keys a group of members by its smallest one. The rest become an unconfirmed
/// proposal from `provenance`. Groups of fewer than two members carry no link.
pub fn pivot_bucket<L: Label, S: Ord>(
    provenance: CandidateKey,
    mut members: Vec<SketchRecord<L, S>>,
) -> Option<MergePair<L, S>> {
    members.sort();
    let mut members = members.into_iter();
    let pivot = members.next()?;
    let rest: Vec<_> = members.collect();
    if rest.is_empty() {
        return None;
    }
    Some((pivot, MergeValue::unconfirmed(provenance, rest)))
}

/// Merge reducer, run once per merge round.
///
/// Starting from the pivot plus everything already confirmed for it, accepts each
/// proposed member that at least `min_support` distinct buckets propose and whose
/// sketch lies within `max_dist` of the pivot's. When the cluster has grown past
/// the pivot, every member is emitted with all its peers as confirmed. Proposals
/// are then stripped of clustered members and whatever is left is re-keyed by its
/// new smallest member for the next round.
pub fn merge_reduce<S: SketchSource>(
    source: &S,
    pivot: Member<S>,
    values: Vec<MergeValue<S::Label, S::Sketch>>,
) -> Result<Vec<MergePair<S::Label, S::Sketch>>> {
    let mut clustered: BTreeMap<S::Label, S::Sketch> = BTreeMap::new();
    clustered.insert(pivot.label.clone(), pivot.sketch.clone());

    let mut proposals = Vec::new();
    for value in values {
        match value.provenance {
            None => clustered.extend(
                value
                    .members
                    .into_iter()
                    .map(|member| (member.label, member.sketch)),
            ),
            Some(bucket) => proposals.push((bucket, value.members)),
        }
    }
    proposals.sort();
    proposals.dedup();

    let mut support: BTreeMap<&S::Label, BTreeSet<&CandidateKey>> = BTreeMap::new();
    let mut candidates: BTreeMap<&S::Label, &S::Sketch> = BTreeMap::new();
    for (bucket, members) in &proposals {
        for member in members {
            support.entry(&member.label).or_default().insert(bucket);
            candidates.entry(&member.label).or_insert(&member.sketch);
        }
    }

    let mut accepted = Vec::new();
    for (label, sketch) in candidates {
        if clustered.contains_key(label) || support[label].len() < source.min_support() {
            continue;
        }
        if source.sketch_distance(&pivot.sketch, sketch)? <= source.max_dist() {
            accepted.push((label.clone(), sketch.clone()));
        }
    }
    clustered.extend(accepted);

    let mut output = Vec::new();
    if clustered.len() > 1 {
        for (label, sketch) in &clustered {
            let peers = clustered
                .iter()
                .filter(|(peer, _)| *peer != label)
                .map(|(peer, peer_sketch)| SketchRecord::new(peer.clone(), peer_sketch.clone()))
                .collect();
            output.push((
                SketchRecord::new(label.clone(), sketch.clone()),
                MergeValue::confirmed(peers),
            ));
        }
    }

    for (bucket, members) in proposals {
        let remaining = members
            .into_iter()
            .filter(|member| !clustered.contains_key(&member.label))
            .collect();
        output.extend(pivot_bucket(bucket, remaining));
    }
    Ok(output)
}

/// Stage 4 mapper: the labels one confirmed record links together.
pub fn confirmed_links<L: Label, S>(key: SketchRecord<L, S>, value: MergeValue<L, S>) -> Option<Vec<L>> {
    if !value.is_confirmed() {
        return None;
    }
    let mut labels = Vec::with_capacity(value.members.len() + 1);
    labels.push(key.label);
    labels.extend(value.members.into_iter().map(|member| member.label));
    Some(labels)
}

/// Stage 4 reducer: connected components of all links, numbered in order of
/// their smallest member.
pub fn resolve_components<L: Label>(links: Vec<Vec<L>>) -> Vec<(usize, Vec<L>)> {
    let mut uf = UnionFind::new();
    for labels in links {
        uf.union_all(labels);
    }
    uf.sets().into_iter().enumerate().collect()
}
