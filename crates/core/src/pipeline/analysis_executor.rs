use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::clustering::cluster_store::ClusterStore;
use crate::pipeline::frame_analyzer::FrameAnalyzer;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_sampler::FrameSampler;
use crate::video::domain::video_reader::VideoReader;

/// Configuration for one execution run.
pub struct ExecutionConfig {
    pub sampler: FrameSampler,
    /// Called once per processed frame; returning false cancels the run.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    pub cancelled: Arc<AtomicBool>,
}

/// Counters describing what one run saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub frames_scanned: usize,
    pub frames_sampled: usize,
    /// Raw detector hits across all sampled frames, before quality gating.
    pub faces_detected: usize,
    /// Observations the cluster store actually took in.
    pub observations_accepted: usize,
}

/// Abstracts how the read → detect → score → cluster loop is executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (serial, threaded). Implementations must feed
/// observations to the store in frame order regardless of how they
/// parallelize the work before it.
pub trait AnalysisExecutor: Send {
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        analyzers: Vec<FrameAnalyzer>,
        store: &mut ClusterStore,
        metadata: &VideoMetadata,
        logger: &mut dyn PipelineLogger,
        config: ExecutionConfig,
    ) -> Result<ExecutionStats, Box<dyn std::error::Error>>;
}
