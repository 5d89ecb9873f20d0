use log::{debug, warn};

use crate::clustering::observation::FaceObservation;
use crate::clustering::person_cluster::PersonCluster;
use crate::matching::similarity::SimilarityEngine;

/// Where an ingested observation ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assignment {
    /// Started a new cluster with this id.
    New(u32),
    /// Absorbed into the existing cluster with this id.
    Duplicate(u32),
}

/// Online cluster store: observations arrive one at a time in frame order
/// and are matched greedily against the representatives seen so far.
///
/// Assignment is final. A later, better representative can replace a
/// cluster's image, but observations are never re-clustered, so the
/// cluster count only ever grows. Ids are 1-based and never reused.
pub struct ClusterStore {
    engine: SimilarityEngine,
    threshold: f64,
    clusters: Vec<PersonCluster>,
    next_id: u32,
    rejected: u64,
    last_timestamp: f64,
}

impl ClusterStore {
    pub fn new(engine: SimilarityEngine, threshold: f64) -> Self {
        Self {
            engine,
            threshold,
            clusters: Vec::new(),
            next_id: 1,
            rejected: 0,
            last_timestamp: 0.0,
        }
    }

    /// Matches the observation against every cluster and either absorbs it
    /// into the best match or opens a new cluster.
    ///
    /// A match requires the best similarity to strictly exceed the
    /// threshold; on equal similarity the lowest cluster id wins because
    /// clusters are scanned in creation order. Malformed observations are
    /// counted and dropped, returning `None`.
    ///
    /// Callers feed observations in frame order; debug builds assert the
    /// timestamps never go backwards.
    pub fn ingest(&mut self, observation: FaceObservation) -> Option<Assignment> {
        if observation.is_malformed() {
            self.rejected += 1;
            warn!(
                "dropping malformed observation at t={:.2}s ({} rejected so far)",
                observation.timestamp_secs, self.rejected
            );
            return None;
        }

        debug_assert!(
            observation.timestamp_secs >= self.last_timestamp,
            "observations must arrive in timestamp order"
        );
        self.last_timestamp = observation.timestamp_secs;

        let mut best: Option<(usize, f64)> = None;
        for (index, cluster) in self.clusters.iter().enumerate() {
            let similarity = self.engine.similarity(cluster.feature(), &observation.feature);
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((index, similarity));
            }
        }

        if let Some((index, similarity)) = best {
            if similarity > self.threshold {
                let cluster = &mut self.clusters[index];
                let id = cluster.id();
                let swapped = cluster.observe(observation);
                debug!(
                    "observation matched cluster {id} (similarity {similarity:.3}, \
                     {} appearances, representative {})",
                    cluster.appearance_count(),
                    if swapped { "replaced" } else { "kept" }
                );
                return Some(Assignment::Duplicate(id));
            }
        }

        let id = self.next_id;
        self.next_id += 1;
        debug!("observation opened cluster {id}");
        self.clusters.push(PersonCluster::new(id, observation));
        Some(Assignment::New(id))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Observations dropped as malformed since construction.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn clusters(&self) -> &[PersonCluster] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<PersonCluster> {
        self.clusters
    }
}
