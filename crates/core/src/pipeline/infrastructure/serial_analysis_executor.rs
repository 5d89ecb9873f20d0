use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::clustering::cluster_store::ClusterStore;
use crate::pipeline::analysis_executor::{AnalysisExecutor, ExecutionConfig, ExecutionStats};
use crate::pipeline::frame_analyzer::FrameAnalyzer;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Single-threaded executor: decode, sample, analyze, and cluster in one
/// loop. The reference behavior the threaded executor must match.
pub struct SerialAnalysisExecutor;

impl SerialAnalysisExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SerialAnalysisExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisExecutor for SerialAnalysisExecutor {
    fn execute(
        &self,
        mut reader: Box<dyn VideoReader>,
        analyzers: Vec<FrameAnalyzer>,
        store: &mut ClusterStore,
        metadata: &VideoMetadata,
        logger: &mut dyn PipelineLogger,
        config: ExecutionConfig,
    ) -> Result<ExecutionStats, Box<dyn std::error::Error>> {
        let mut analyzer = analyzers
            .into_iter()
            .next()
            .ok_or("No frame analyzer provided")?;

        let fps = metadata.fps;
        let total = metadata.total_frames;
        let mut stats = ExecutionStats::default();
        let mut first_error: Option<Box<dyn std::error::Error>> = None;

        for frame_result in reader.frames() {
            if config.cancelled.load(Ordering::Relaxed) {
                break;
            }

            let frame = match frame_result {
                Ok(frame) => frame,
                Err(e) => {
                    first_error = Some(e);
                    break;
                }
            };
            stats.frames_scanned += 1;

            if config.sampler.should_sample(frame.index()) {
                stats.frames_sampled += 1;
                let timestamp = config.sampler.timestamp_secs(frame.index(), fps);

                let started = Instant::now();
                let analysis = match analyzer.analyze(&frame, timestamp) {
                    Ok(analysis) => analysis,
                    Err(e) => {
                        first_error = Some(e);
                        break;
                    }
                };
                logger.timing("analyze", started.elapsed().as_secs_f64() * 1000.0);

                stats.faces_detected += analysis.faces_detected;
                for observation in analysis.observations {
                    if store.ingest(observation).is_some() {
                        stats.observations_accepted += 1;
                    }
                }
                logger.metric("clusters", store.len() as f64);
            }

            logger.progress(stats.frames_scanned, total);
            if let Some(ref callback) = config.on_progress {
                if !callback(stats.frames_scanned, total) {
                    config.cancelled.store(true, Ordering::Relaxed);
                    first_error = Some("Cancelled".into());
                    break;
                }
            }
        }

        reader.close();

        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}
