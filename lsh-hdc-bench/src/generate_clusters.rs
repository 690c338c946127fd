use rand::distributions::Uniform;
use rand::prelude::{Distribution, StdRng};
use rand::SeedableRng;
use rayon::prelude::*;
use serde_json::{json, Value};

pub struct GeneratedCluster {
    pub id: usize,
    /// Posts as `(label, text)`.
    pub posts: Vec<(String, String)>,
}

/// DifferenceMode indicates whether the edited words of a cluster's posts sit in
/// the same or in different positions.
///
/// With SameIndices we choose num_changes random positions once per cluster and
/// replace the words at those positions in every post of the cluster.
/// With DiffIndices every post gets its own random positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DifferenceMode {
    SameIndices,
    DiffIndices,
}

pub struct ClusterGenerator {
    pub jaccard_similarity: f64,
    pub cluster_size: usize,
    pub post_num_words: usize,
    pub num_clusters: usize,
    pub vocabulary_size: usize,
    pub mode: DifferenceMode,
    pub seed: u64,
}

impl ClusterGenerator {
    pub fn new(
        jaccard_similarity: f64,
        cluster_size: usize,
        post_num_words: usize,
        num_clusters: usize,
        vocabulary_size: usize,
        mode: DifferenceMode,
        seed: u64,
    ) -> Self {
        ClusterGenerator {
            jaccard_similarity,
            cluster_size,
            post_num_words,
            num_clusters,
            vocabulary_size,
            mode,
            seed,
        }
    }

    pub fn generate(&self) -> Vec<GeneratedCluster> {
        let num_changes = self.num_changes();
        tracing::info!(num_changes, "generating clusters");
        (0..self.num_clusters)
            .into_par_iter()
            .map(|id| self.generate_cluster(id, num_changes))
            .collect()
    }

    /// Largest number of replaced words that keeps the jaccard similarity of a
    /// post to its cluster's original above the required one.
    fn num_changes(&self) -> usize {
        let mut k = 1;
        let n = self.post_num_words as f64;
        while (n - k as f64) / (n + k as f64) > self.jaccard_similarity {
            k += 1
        }
        k - 1
    }

    fn generate_cluster(&self, id: usize, num_changes: usize) -> GeneratedCluster {
        let mut rng = StdRng::seed_from_u64(self.seed ^ (id as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15));
        let words = Uniform::new(0, self.vocabulary_size);
        let positions = Uniform::new(0, self.post_num_words);
        let original: Vec<usize> = words.sample_iter(&mut rng).take(self.post_num_words).collect();
        let same_positions: Vec<usize> = positions.sample_iter(&mut rng).take(num_changes).collect();

        let posts = (0..self.cluster_size)
            .map(|member| {
                let mut post = original.clone();
                for j in 0..num_changes {
                    let position = match self.mode {
                        DifferenceMode::SameIndices => same_positions[j],
                        DifferenceMode::DiffIndices => positions.sample(&mut rng),
                    };
                    post[position] = words.sample(&mut rng);
                }
                let text: Vec<String> = post.iter().map(|w| format!("w{}", w)).collect();
                (format!("{}-{}", id, member), text.join(" "))
            })
            .collect();
        GeneratedCluster { id, posts }
    }
}

/// Renders generated posts as JSON records in the default accessor layout.
pub fn to_records(clusters: &[GeneratedCluster]) -> Vec<Value> {
    clusters
        .iter()
        .flat_map(|cluster| {
            cluster.posts.iter().map(move |(label, text)| {
                json!({"object": {"post_id": label, "user_id": cluster.id, "content": text}})
            })
        })
        .collect()
}
