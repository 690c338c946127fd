use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::Write;

use ahash::AHashMap;
use serde::Serialize;

use crate::clustering::Label;
use crate::error::{Error, Result};
use crate::sketch::RecordAccessor;

/// One emitted cluster: the original records keyed by label.
#[derive(Clone, Debug, Serialize)]
pub struct ClusterRecord<'a, R> {
    pub cluster_id: usize,
    pub length: usize,
    pub members: BTreeMap<String, &'a R>,
}

/// Indexes records by label. Two records with the same label are an error.
pub fn index_by_label<'a, A: RecordAccessor>(
    accessor: &A,
    records: &'a [A::Record],
) -> Result<AHashMap<A::Label, &'a A::Record>> {
    let mut index = AHashMap::with_capacity(records.len());
    for record in records {
        let label = accessor.label(record)?;
        if index.contains_key(&label) {
            return Err(Error::DuplicateLabel {
                label: format!("{:?}", label),
            });
        }
        index.insert(label, record);
    }
    Ok(index)
}

/// Turns clusters of labels into output records.
///
/// Clusters with no more than `min_cluster_size` members are dropped. The rest
/// are ordered by descending size, ties broken by smallest label, and numbered
/// in that order.
pub fn build_cluster_records<'a, L, R>(
    clusters: &[Vec<L>],
    records: &AHashMap<L, &'a R>,
    min_cluster_size: usize,
) -> Result<Vec<ClusterRecord<'a, R>>>
where
    L: Label + Display,
{
    let mut kept: Vec<&Vec<L>> = clusters
        .iter()
        .filter(|cluster| cluster.len() > min_cluster_size)
        .collect();
    kept.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.iter().min().cmp(&b.iter().min())));

    let mut output = Vec::with_capacity(kept.len());
    for (cluster_id, cluster) in kept.into_iter().enumerate() {
        let mut members = BTreeMap::new();
        for label in cluster {
            let record = records
                .get(label)
                .ok_or_else(|| Error::MalformedRecord(format!("no record for label {}", label)))?;
            if members.insert(label.to_string(), *record).is_some() {
                return Err(Error::DuplicateLabel {
                    label: label.to_string(),
                });
            }
        }
        output.push(ClusterRecord {
            cluster_id,
            length: members.len(),
            members,
        });
    }
    Ok(output)
}

/// Writes one JSON object per line.
pub fn write_clusters<W: Write, R: Serialize>(
    mut writer: W,
    clusters: &[ClusterRecord<'_, R>],
) -> Result<()> {
    for cluster in clusters {
        serde_json::to_writer(&mut writer, cluster)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::JsonRecordAccessor;
    use serde_json::{json, Value};

    fn records() -> Vec<Value> {
        (1..=6)
            .map(|i| json!({"object": {"post_id": i, "content": format!("post {}", i)}}))
            .collect()
    }

    #[test]
    fn test_clusters_are_sorted_and_numbered() {
        let records = records();
        let index = index_by_label(&JsonRecordAccessor::default(), &records).unwrap();
        let clusters = vec![
            vec!["5".to_string()],
            vec!["3".to_string(), "4".to_string()],
            vec!["1".to_string(), "2".to_string()],
            vec!["6".to_string()],
        ];
        let output = build_cluster_records(&clusters, &index, 1).unwrap();
        let ids: Vec<(usize, Vec<&str>)> = output
            .iter()
            .map(|c| (c.cluster_id, c.members.keys().map(String::as_str).collect()))
            .collect();
        assert_eq!(ids, vec![(0, vec!["1", "2"]), (1, vec!["3", "4"])]);
        assert_eq!(output[0].length, 2);
    }

    #[test]
    fn test_duplicate_labels_fail() {
        let mut records = records();
        records.push(json!({"object": {"post_id": "2", "content": "again"}}));
        assert!(matches!(
            index_by_label(&JsonRecordAccessor::default(), &records),
            Err(Error::DuplicateLabel { .. })
        ));

        let index = index_by_label(&JsonRecordAccessor::default(), &records[..6]).unwrap();
        let clusters = vec![vec!["1".to_string(), "1".to_string()]];
        assert!(matches!(
            build_cluster_records(&clusters, &index, 1),
            Err(Error::DuplicateLabel { .. })
        ));
    }

    #[test]
    fn test_write_json_lines() {
        let records = records();
        let index = index_by_label(&JsonRecordAccessor::default(), &records).unwrap();
        let clusters = vec![vec!["1".to_string(), "2".to_string()]];
        let output = build_cluster_records(&clusters, &index, 1).unwrap();
        let mut buf = Vec::new();
        write_clusters(&mut buf, &output).unwrap();
        let line: Value = serde_json::from_slice(buf.strip_suffix(b"\n").unwrap()).unwrap();
        assert_eq!(line["cluster_id"], 0);
        assert_eq!(line["length"], 2);
        assert_eq!(line["members"]["2"]["object"]["content"], "post 2");
    }
}
