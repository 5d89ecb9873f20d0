use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::clustering::cluster_store::ClusterStore;
use crate::clustering::result_ranker::{rank, RankedPerson};
use crate::matching::similarity::SimilarityEngine;
use crate::pipeline::analysis_config::AnalysisConfig;
use crate::pipeline::analysis_executor::{AnalysisExecutor, ExecutionConfig};
use crate::pipeline::frame_analyzer::FrameAnalyzer;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::report::{image_filename, AnalysisReport};
use crate::video::domain::frame_sampler::FrameSampler;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;

/// Orchestrates the full analysis: open the video, run the executor over
/// its frames, rank the resulting clusters, save each person's best crop,
/// and assemble the report.
///
/// Wires domain components together and delegates frame processing to an
/// `AnalysisExecutor`. This is a single-use struct: `execute` consumes
/// the owned components, so calling it twice will fail.
pub struct AnalyzeVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    analyzers: Option<Vec<FrameAnalyzer>>,
    image_writer: Box<dyn ImageWriter>,
    executor: Box<dyn AnalysisExecutor>,
    config: AnalysisConfig,
    logger: Box<dyn PipelineLogger>,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    cancelled: Arc<AtomicBool>,
}

impl AnalyzeVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn VideoReader>,
        analyzers: Vec<FrameAnalyzer>,
        image_writer: Box<dyn ImageWriter>,
        executor: Box<dyn AnalysisExecutor>,
        config: AnalysisConfig,
        logger: Box<dyn PipelineLogger>,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            reader: Some(reader),
            analyzers: Some(analyzers),
            image_writer,
            executor,
            config,
            logger,
            on_progress,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        input: &Path,
        faces_dir: &Path,
    ) -> Result<AnalysisReport, Box<dyn std::error::Error>> {
        let mut reader = self.reader.take().ok_or("Analysis already executed")?;
        let analyzers = self.analyzers.take().ok_or("Analysis already executed")?;

        let metadata = reader.open(input)?;
        self.logger.info(&format!(
            "Opened {} ({}x{}, {:.1} fps, {} frames, {:.1}s)",
            input.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames,
            metadata.duration_secs()
        ));

        let engine = SimilarityEngine::new(self.config.similarity.clone());
        let mut store = ClusterStore::new(engine, self.config.dedup_threshold);

        let exec_config = ExecutionConfig {
            sampler: FrameSampler::new(self.config.sample_interval),
            on_progress: self.on_progress.take(),
            cancelled: self.cancelled.clone(),
        };

        let stats = self.executor.execute(
            reader,
            analyzers,
            &mut store,
            &metadata,
            self.logger.as_mut(),
            exec_config,
        )?;

        let rejected = store.rejected();
        let people = rank(store.into_clusters(), self.config.max_people);
        self.save_representatives(&people, faces_dir)?;

        let report = AnalysisReport::from_ranked(&people);
        self.logger.info(&format!(
            "Found {} people in {} sampled frames \
             ({} detections, {} accepted, {} rejected)",
            report.total_people,
            stats.frames_sampled,
            stats.faces_detected,
            stats.observations_accepted,
            rejected
        ));
        self.logger.summary();

        Ok(report)
    }

    fn save_representatives(
        &self,
        people: &[RankedPerson],
        faces_dir: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        for person in people {
            let path = faces_dir.join(image_filename(person.id));
            self.image_writer.write(&path, &person.representative)?;
        }
        Ok(())
    }
}
