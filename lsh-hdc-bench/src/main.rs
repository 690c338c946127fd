mod generate_clusters;
mod metrics;

use std::time::Instant;

use fxhash::{FxHashMap, FxHashSet};
use lsh_hdc::clustering::ClusterPipeline;
use lsh_hdc::sketch::{JsonRecordAccessor, MinHashSketchSource};
use lsh_hdc::ClusterConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::generate_clusters::*;
use crate::metrics::Metrics;

fn run_clustering(generated_clusters: &[GeneratedCluster], config: &ClusterConfig) -> lsh_hdc::Result<()> {
    let records = to_records(generated_clusters);
    let source = MinHashSketchSource::new(config, JsonRecordAccessor::default())?;
    let pipeline = ClusterPipeline::new(source, config.num_partitions);
    info!(records = records.len(), selector_mode = %config.selector_mode, "starting clustering");

    let now = Instant::now();
    let run = pipeline.run(&records)?;
    let elapsed = now.elapsed();
    let total: usize = run.clusters.iter().map(Vec::len).sum();
    println!(
        "Elapsed millis {}. Num clusters {}. Total points {}",
        elapsed.as_millis(),
        run.clusters.len(),
        total
    );
    println!("{}", serde_json::to_string(&run.stats)?);

    let cluster_of: FxHashMap<&str, usize> = run
        .clusters
        .iter()
        .enumerate()
        .flat_map(|(i, cluster)| cluster.iter().map(move |label| (label.as_str(), i)))
        .collect();

    let mut metrics = Metrics::new();
    for generated_cluster in generated_clusters {
        let reference: FxHashSet<&str> = generated_cluster
            .posts
            .iter()
            .map(|(label, _)| label.as_str())
            .collect();
        // the found cluster holding most of the reference posts
        let mut votes: FxHashMap<usize, usize> = FxHashMap::default();
        for label in &reference {
            if let Some(&i) = cluster_of.get(label) {
                *votes.entry(i).or_default() += 1;
            }
        }
        let best = votes.into_iter().max_by_key(|&(i, count)| (count, std::cmp::Reverse(i)));
        let found: FxHashSet<&str> = match best {
            Some((i, _)) => run.clusters[i].iter().map(String::as_str).collect(),
            None => FxHashSet::default(),
        };
        metrics.update_metrics(&found, &reference);
    }
    println!("{:?}", metrics.get_result());
    Ok(())
}

fn main() -> lsh_hdc::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ClusterConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => ClusterConfig {
            include_prefix: false,
            ..ClusterConfig::default()
        },
    };

    let generator = ClusterGenerator::new(0.6, 20, 30, 500, 300_000, DifferenceMode::SameIndices, config.seed);
    let generated_clusters = generator.generate();
    println!("Generated {} clusters", generated_clusters.len());
    run_clustering(&generated_clusters, &config)?;

    let generator = ClusterGenerator {
        mode: DifferenceMode::DiffIndices,
        ..generator
    };
    run_clustering(&generator.generate(), &config)
}
