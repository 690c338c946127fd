use lsh_hdc::clustering::{CandidateKey, ClusterPipeline, SketchRecord, MERGE_ROUNDS};
use lsh_hdc::output::{build_cluster_records, index_by_label, write_clusters};
use lsh_hdc::sketch::{JsonRecordAccessor, Member, MinHashSketchSource, MinTokens, SketchSource};
use lsh_hdc::{ClusterConfig, Error, Result};
use proptest::prelude::*;
use serde_json::{json, Value};
use smallvec::smallvec;

/// Records placed on a line, with their candidate buckets given explicitly.
#[derive(Clone, Debug)]
struct Point {
    label: u32,
    position: i64,
    buckets: Vec<u64>,
}

fn point(label: u32, position: i64, buckets: &[u64]) -> Point {
    Point {
        label,
        position,
        buckets: buckets.to_vec(),
    }
}

struct LineSource {
    max_dist: f64,
    min_support: usize,
}

impl SketchSource for LineSource {
    type Record = Point;
    type Label = u32;
    type Sketch = i64;

    fn mapper(&self, record: &Point) -> Result<Vec<(CandidateKey, Member<Self>)>> {
        Ok(record
            .buckets
            .iter()
            .map(|&bucket| {
                (
                    CandidateKey::new(bucket as usize, smallvec![bucket]),
                    SketchRecord::new(record.label, record.position),
                )
            })
            .collect())
    }

    fn sketch_distance(&self, a: &i64, b: &i64) -> Result<f64> {
        Ok((a - b).abs() as f64)
    }

    fn max_dist(&self) -> f64 {
        self.max_dist
    }

    fn min_support(&self) -> usize {
        self.min_support
    }
}

fn line_pipeline(num_partitions: usize) -> ClusterPipeline<LineSource> {
    let source = LineSource {
        max_dist: 1.0,
        min_support: 2,
    };
    ClusterPipeline::new(source, num_partitions)
}

#[test]
fn test_close_records_cluster_and_far_record_is_absent() {
    let points = vec![
        point(1, 0, &[0, 1, 2]),
        point(2, 0, &[0, 1, 2]),
        point(3, 1, &[0, 1, 2]),
        point(4, 10, &[0, 1]),
    ];
    let run = line_pipeline(2).run(&points).unwrap();
    assert_eq!(run.clusters, vec![vec![1, 2, 3]]);
    assert_eq!(run.stats.records, 4);
    assert_eq!(run.stats.candidate_pairs, 11);
    assert_eq!(run.stats.buckets, 3);
    assert_eq!(run.stats.clusters, 1);
}

#[test]
fn test_single_band_collision_is_not_enough() {
    let points = vec![point(1, 0, &[0, 1]), point(2, 0, &[0, 2]), point(3, 0, &[3])];
    let run = line_pipeline(1).run(&points).unwrap();
    assert!(run.clusters.is_empty());
    assert_eq!(run.stats.buckets, 1);
}

#[test]
fn test_merge_stops_after_two_rounds() {
    // every point collides with every other, but only pairs are close
    let points: Vec<Point> = [(1, 0), (2, 0), (3, 10), (4, 10), (5, 20), (6, 20)]
        .iter()
        .map(|&(label, position)| point(label, position, &[0, 1]))
        .collect();
    let run = line_pipeline(3).run(&points).unwrap();
    // 5 and 6 would need a third round
    assert_eq!(run.clusters, vec![vec![1, 2], vec![3, 4]]);
    assert_eq!(run.stats.confirmed_per_round.len(), MERGE_ROUNDS);
    assert_eq!(run.stats.confirmed_per_round, vec![2, 6]);
}

#[test]
fn test_transitive_links_are_resolved() {
    // 1 and 3 are too far apart but both link to 2
    let points = vec![
        point(1, 0, &[0, 1]),
        point(2, 1, &[0, 1, 2, 3]),
        point(3, 2, &[2, 3]),
    ];
    let run = line_pipeline(2).run(&points).unwrap();
    assert_eq!(run.clusters, vec![vec![1, 2, 3]]);
}

fn points() -> impl Strategy<Value = Vec<Point>> {
    prop::collection::vec((0i64..5, prop::collection::btree_set(0u64..4, 0..4)), 1..20).prop_map(
        |items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (position, buckets))| Point {
                    label: i as u32,
                    position,
                    buckets: buckets.into_iter().collect(),
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn test_clusters_do_not_depend_on_input_order(
        (points, shuffled) in points().prop_flat_map(|p| (Just(p.clone()), Just(p).prop_shuffle())),
        num_partitions in 1usize..6,
    ) {
        let expected = line_pipeline(1).run(&points).unwrap();
        let actual = line_pipeline(num_partitions).run(&shuffled).unwrap();
        prop_assert_eq!(&actual.clusters, &expected.clusters);
        prop_assert_eq!(actual.stats, expected.stats);
        for cluster in &actual.clusters {
            prop_assert!(cluster.len() > 1);
            prop_assert!(cluster.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

fn posts() -> Vec<Value> {
    let texts = [
        ("a1", "u1", "Open house this Sunday at 42 Elm Street, three bedrooms and a big garden"),
        ("a2", "u2", "OPEN HOUSE this Sunday at 42 Elm Street: three bedrooms and a big garden!"),
        ("a3", "u3", "Open house this Sunday at 42 Elm Street, three bedrooms and a big garden"),
        ("b1", "u1", "The committee meets on Thursday to discuss the budget for next year"),
        ("c1", "u4", "ok"),
    ];
    texts
        .iter()
        .map(|(id, user, text)| json!({"object": {"post_id": id, "user_id": user, "content": text}}))
        .collect()
}

#[test]
fn test_text_records_end_to_end() {
    let config = ClusterConfig {
        include_prefix: false,
        num_hashes: 24,
        band_width: 4,
        ..ClusterConfig::default()
    };
    let source = MinHashSketchSource::new(&config, JsonRecordAccessor::default())
        .unwrap()
        .with_filter(MinTokens(3));
    let pipeline = ClusterPipeline::new(source, config.num_partitions);
    let posts = posts();
    let run = pipeline.run(&posts).unwrap();
    assert_eq!(run.clusters, vec![vec!["a1", "a2", "a3"]]);

    let index = index_by_label(pipeline.source().accessor(), &posts).unwrap();
    let clusters = build_cluster_records(&run.clusters, &index, config.min_cluster_size).unwrap();
    let mut buf = Vec::new();
    write_clusters(&mut buf, &clusters).unwrap();
    let lines: Vec<Value> = String::from_utf8(buf)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["length"], 3);
    assert_eq!(lines[0]["members"]["a2"]["object"]["user_id"], "u2");
}

#[test]
fn test_runs_are_reproducible() {
    let config = ClusterConfig {
        hash_family: "xor".parse().unwrap(),
        seed: 42,
        ..ClusterConfig::default()
    };
    let run = |posts: &[Value]| {
        let source = MinHashSketchSource::new(&config, JsonRecordAccessor::default()).unwrap();
        ClusterPipeline::new(source, 3).run(posts).unwrap()
    };
    let posts = posts();
    let first = run(&posts);
    let mut reversed = posts.clone();
    reversed.reverse();
    let second = run(&reversed);
    assert_eq!(first.clusters, second.clusters);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn test_malformed_record_fails_the_run() {
    let config = ClusterConfig::default();
    let source = MinHashSketchSource::new(&config, JsonRecordAccessor::default()).unwrap();
    let mut posts = posts();
    posts.push(json!({"object": {"post_id": "x"}}));
    let result = ClusterPipeline::new(source, 2).run(&posts);
    assert!(matches!(result, Err(Error::MalformedRecord(_))));
}
