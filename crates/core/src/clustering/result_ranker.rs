use crate::clustering::person_cluster::PersonCluster;
use crate::shared::frame::Frame;

/// One person in final output order, renumbered so ids are 1-based ranks.
#[derive(Clone, Debug)]
pub struct RankedPerson {
    /// 1-based position in the ranked output.
    pub id: u32,
    pub quality: f64,
    /// Whole-second appearance times, ascending.
    pub timestamps: Vec<u64>,
    /// Best crop seen for this person.
    pub representative: Frame,
}

/// Orders clusters by representative quality, best first, and keeps at
/// most `max_count` of them.
///
/// Quality ties fall back to cluster id, so earlier-discovered people win
/// and the ordering stays deterministic.
pub fn rank(clusters: Vec<PersonCluster>, max_count: usize) -> Vec<RankedPerson> {
    let mut clusters = clusters;
    clusters.sort_by(|a, b| {
        b.quality()
            .partial_cmp(&a.quality())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id().cmp(&b.id()))
    });
    clusters.truncate(max_count);

    clusters
        .into_iter()
        .enumerate()
        .map(|(position, cluster)| {
            let quality = cluster.quality();
            let timestamps = cluster.timestamps().collect();
            RankedPerson {
                id: position as u32 + 1,
                quality,
                timestamps,
                representative: cluster.into_representative().crop,
            }
        })
        .collect()
}
