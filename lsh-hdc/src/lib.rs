/*!
Near-duplicate clustering of text records with MinHash signatures and
Locality Sensitive Hashing.

Records are shingled and signed, each signature is cut into bands, and records
colliding in a band become candidates. Candidates are confirmed against their
pivot in two map/reduce merge rounds and the confirmed links are resolved into
connected components.

* [MinHash](https://en.wikipedia.org/wiki/MinHash)
* [LSH banding](https://en.wikipedia.org/wiki/Locality-sensitive_hashing)

## Example

 ```
 use lsh_hdc::clustering::ClusterPipeline;
 use lsh_hdc::output::{build_cluster_records, index_by_label};
 use lsh_hdc::sketch::{JsonRecordAccessor, MinHashSketchSource};
 use lsh_hdc::ClusterConfig;
 use serde_json::json;

 let config = ClusterConfig::from_json_str(r#"{"include_prefix": false}"#).unwrap();
 let posts = [
     (1, "Win a free cruise to the Bahamas, click the link in our bio now"),
     (2, "Win a free cruise to the Bahamas, click the link in our bio now!"),
     (3, "Win a FREE cruise to the Bahamas: click the link in our bio now"),
     (4, "Had a lovely walk along the river with the dog this morning"),
 ];
 let records: Vec<_> = posts
     .iter()
     .map(|(id, text)| json!({"object": {"post_id": id, "content": text}}))
     .collect();

 let source = MinHashSketchSource::new(&config, JsonRecordAccessor::default()).unwrap();
 let run = ClusterPipeline::new(source, config.num_partitions).run(&records).unwrap();
 assert_eq!(run.clusters, vec![vec!["1", "2", "3"]]);

 let index = index_by_label(&JsonRecordAccessor::default(), &records).unwrap();
 let clusters = build_cluster_records(&run.clusters, &index, config.min_cluster_size).unwrap();
 assert_eq!(clusters[0].length, 3);
 ```
*/

pub mod clustering;
pub mod config;
pub mod error;
pub mod minhash;
pub mod output;
pub mod sketch;
pub mod text;

pub use config::ClusterConfig;
pub use error::{Error, Result};
