use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::clustering::cluster_store::ClusterStore;
use crate::pipeline::analysis_executor::{AnalysisExecutor, ExecutionConfig, ExecutionStats};
use crate::pipeline::frame_analyzer::{FrameAnalysis, FrameAnalyzer};
use crate::pipeline::infrastructure::reorder_buffer::ReorderBuffer;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

type SendError = Box<dyn std::error::Error + Send + Sync>;

/// A sampled frame on its way to a worker.
struct SampledFrame {
    seq: usize,
    index: usize,
    timestamp_secs: f64,
    payload: Result<Frame, SendError>,
}

/// A worker's output for one sampled frame.
struct AnalyzedFrame {
    seq: usize,
    index: usize,
    result: Result<FrameAnalysis, SendError>,
}

/// What the reader thread counted before it stopped.
struct ReaderTally {
    frames_scanned: usize,
    frames_sampled: usize,
}

/// Executes the analysis with a dedicated reader thread and a pool of
/// detection workers.
///
/// Layout: `reader → workers (detect + score) → main [reorder/cluster]`
///
/// Detection dominates runtime and is per-frame independent, so frames
/// fan out across workers. A sequence-numbered reorder buffer restores
/// sampling order before clustering, which keeps results identical to
/// the serial executor.
pub struct ThreadedAnalysisExecutor {
    channel_capacity: usize,
}

impl ThreadedAnalysisExecutor {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for ThreadedAnalysisExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisExecutor for ThreadedAnalysisExecutor {
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        analyzers: Vec<FrameAnalyzer>,
        store: &mut ClusterStore,
        metadata: &VideoMetadata,
        logger: &mut dyn PipelineLogger,
        config: ExecutionConfig,
    ) -> Result<ExecutionStats, Box<dyn std::error::Error>> {
        if analyzers.is_empty() {
            return Err("No frame analyzer provided".into());
        }

        let cap = self.channel_capacity;
        let fps = metadata.fps;
        let total = metadata.total_frames;

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<SampledFrame>(cap);
        let (result_tx, result_rx) = crossbeam_channel::bounded::<AnalyzedFrame>(cap);

        let reader_handle = spawn_reader(reader, frame_tx, &config, fps);
        let worker_handles: Vec<_> = analyzers
            .into_iter()
            .map(|analyzer| {
                spawn_worker(
                    analyzer,
                    frame_rx.clone(),
                    result_tx.clone(),
                    config.cancelled.clone(),
                )
            })
            .collect();
        drop(frame_rx);
        drop(result_tx);

        let (mut stats, main_error) =
            run_cluster_loop(&result_rx, store, logger, &config, total);
        drop(result_rx);

        let (tally, join_error) = join_threads(reader_handle, worker_handles);
        stats.frames_scanned = tally.frames_scanned;
        stats.frames_sampled = tally.frames_sampled;

        match main_error.or(join_error) {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}

fn spawn_reader(
    mut reader: Box<dyn VideoReader>,
    frame_tx: crossbeam_channel::Sender<SampledFrame>,
    config: &ExecutionConfig,
    fps: f64,
) -> std::thread::JoinHandle<ReaderTally> {
    let cancelled = config.cancelled.clone();
    let sampler = config.sampler;

    std::thread::spawn(move || {
        let mut tally = ReaderTally {
            frames_scanned: 0,
            frames_sampled: 0,
        };

        for frame_result in reader.frames() {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }

            let message = match frame_result {
                Ok(frame) => {
                    tally.frames_scanned += 1;
                    if !sampler.should_sample(frame.index()) {
                        continue;
                    }
                    let seq = tally.frames_sampled;
                    tally.frames_sampled += 1;
                    SampledFrame {
                        seq,
                        index: frame.index(),
                        timestamp_secs: sampler.timestamp_secs(frame.index(), fps),
                        payload: Ok(frame),
                    }
                }
                Err(e) => SampledFrame {
                    seq: tally.frames_sampled,
                    index: tally.frames_scanned,
                    timestamp_secs: 0.0,
                    payload: Err(e.to_string().into()),
                },
            };

            let is_read_error = message.payload.is_err();
            if frame_tx.send(message).is_err() || is_read_error {
                break;
            }
        }
        reader.close();
        tally
    })
}

fn spawn_worker(
    mut analyzer: FrameAnalyzer,
    frame_rx: crossbeam_channel::Receiver<SampledFrame>,
    result_tx: crossbeam_channel::Sender<AnalyzedFrame>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        for sampled in frame_rx {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }

            let result = match sampled.payload {
                Ok(frame) => analyzer
                    .analyze(&frame, sampled.timestamp_secs)
                    .map_err(|e| -> SendError { e.to_string().into() }),
                Err(e) => Err(e),
            };

            let message = AnalyzedFrame {
                seq: sampled.seq,
                index: sampled.index,
                result,
            };
            if result_tx.send(message).is_err() {
                break;
            }
        }
    })
}

/// Main-thread loop: reorder worker output by sequence number and feed the
/// cluster store in sampling order.
fn run_cluster_loop(
    result_rx: &crossbeam_channel::Receiver<AnalyzedFrame>,
    store: &mut ClusterStore,
    logger: &mut dyn PipelineLogger,
    config: &ExecutionConfig,
    total: usize,
) -> (ExecutionStats, Option<Box<dyn std::error::Error>>) {
    let mut stats = ExecutionStats::default();
    let mut buffer: ReorderBuffer<AnalyzedFrame> = ReorderBuffer::new();

    for analyzed in result_rx {
        for ready in buffer.push(analyzed.seq, analyzed) {
            let analysis = match ready.result {
                Ok(analysis) => analysis,
                Err(e) => {
                    config.cancelled.store(true, Ordering::Relaxed);
                    return (stats, Some(e.to_string().into()));
                }
            };

            stats.faces_detected += analysis.faces_detected;
            for observation in analysis.observations {
                if store.ingest(observation).is_some() {
                    stats.observations_accepted += 1;
                }
            }
            logger.metric("clusters", store.len() as f64);

            logger.progress(ready.index + 1, total);
            if let Some(ref callback) = config.on_progress {
                if !callback(ready.index + 1, total) {
                    config.cancelled.store(true, Ordering::Relaxed);
                    return (stats, Some("Cancelled".into()));
                }
            }
        }
    }

    (stats, None)
}

/// Joins all pipeline threads and coalesces the first failure seen.
fn join_threads(
    reader_handle: std::thread::JoinHandle<ReaderTally>,
    worker_handles: Vec<std::thread::JoinHandle<()>>,
) -> (ReaderTally, Option<Box<dyn std::error::Error>>) {
    let mut first_error: Option<Box<dyn std::error::Error>> = None;

    let tally = match reader_handle.join() {
        Ok(tally) => tally,
        Err(_) => {
            first_error = Some("Reader thread panicked".into());
            ReaderTally {
                frames_scanned: 0,
                frames_sampled: 0,
            }
        }
    };

    for handle in worker_handles {
        if handle.join().is_err() && first_error.is_none() {
            first_error = Some("Worker thread panicked".into());
        }
    }

    (tally, first_error)
}
