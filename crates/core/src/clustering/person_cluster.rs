use std::collections::BTreeSet;

use crate::clustering::observation::FaceObservation;
use crate::shared::frame::Frame;
use crate::shared::gray::GrayPatch;

/// One person discovered so far: the best observation seen for them plus
/// every whole second they appeared at.
///
/// The timestamp set is ordered and deduplicated by construction, so the
/// final report never has to sort or uniquify.
#[derive(Clone, Debug)]
pub struct PersonCluster {
    id: u32,
    representative: FaceObservation,
    timestamps: BTreeSet<u64>,
}

impl PersonCluster {
    pub fn new(id: u32, observation: FaceObservation) -> Self {
        let mut timestamps = BTreeSet::new();
        timestamps.insert(observation.timestamp_whole_secs());
        Self {
            id,
            representative: observation,
            timestamps,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Quality of the current representative.
    pub fn quality(&self) -> f64 {
        self.representative.quality
    }

    pub fn feature(&self) -> &GrayPatch {
        &self.representative.feature
    }

    pub fn representative_crop(&self) -> &Frame {
        &self.representative.crop
    }

    pub fn timestamps(&self) -> impl Iterator<Item = u64> + '_ {
        self.timestamps.iter().copied()
    }

    pub fn appearance_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Absorbs a matching observation. The representative is swapped only
    /// when the newcomer scores strictly higher, so an equal-quality later
    /// frame never displaces the earlier one. Returns whether a swap
    /// happened.
    pub fn observe(&mut self, observation: FaceObservation) -> bool {
        self.timestamps.insert(observation.timestamp_whole_secs());
        if observation.quality > self.representative.quality {
            self.representative = observation;
            true
        } else {
            false
        }
    }

    pub fn into_representative(self) -> FaceObservation {
        self.representative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bbox::BoundingBox;
    use approx::assert_relative_eq;

    fn observation(timestamp_secs: f64, quality: f64, shade: u8) -> FaceObservation {
        FaceObservation {
            crop: Frame::new(vec![shade; 32 * 32 * 3], 32, 32, 3, 0),
            feature: GrayPatch::new(vec![shade; 64 * 64], 64, 64),
            bbox: BoundingBox::new(0, 0, 64, 64),
            timestamp_secs,
            quality,
        }
    }

    #[test]
    fn test_new_cluster_records_first_timestamp() {
        let cluster = PersonCluster::new(0, observation(12.7, 0.5, 100));
        assert_eq!(cluster.timestamps().collect::<Vec<_>>(), vec![12]);
        assert_eq!(cluster.appearance_count(), 1);
    }

    #[test]
    fn test_timestamps_deduplicate_within_a_second() {
        let mut cluster = PersonCluster::new(0, observation(5.1, 0.5, 100));
        cluster.observe(observation(5.9, 0.4, 100));
        assert_eq!(cluster.appearance_count(), 1);
    }

    #[test]
    fn test_timestamps_come_out_sorted() {
        let mut cluster = PersonCluster::new(0, observation(30.0, 0.5, 100));
        cluster.observe(observation(10.0, 0.4, 100));
        cluster.observe(observation(20.0, 0.4, 100));
        assert_eq!(cluster.timestamps().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_higher_quality_replaces_representative() {
        let mut cluster = PersonCluster::new(0, observation(0.0, 0.5, 100));
        assert!(cluster.observe(observation(1.0, 0.8, 200)));
        assert_relative_eq!(cluster.quality(), 0.8);
        assert_eq!(cluster.representative_crop().data()[0], 200);
    }

    #[test]
    fn test_equal_quality_keeps_earlier_representative() {
        let mut cluster = PersonCluster::new(0, observation(0.0, 0.5, 100));
        assert!(!cluster.observe(observation(1.0, 0.5, 200)));
        assert_eq!(cluster.representative_crop().data()[0], 100);
    }

    #[test]
    fn test_lower_quality_keeps_representative() {
        let mut cluster = PersonCluster::new(0, observation(0.0, 0.5, 100));
        assert!(!cluster.observe(observation(1.0, 0.3, 200)));
        assert_relative_eq!(cluster.quality(), 0.5);
        assert_eq!(cluster.appearance_count(), 2);
    }
}
