use std::path::PathBuf;
use std::process;

use clap::Parser;

use facetally_core::detection::infrastructure::seeta_face_detector::SeetaFaceDetector;
use facetally_core::pipeline::analysis_config::AnalysisConfig;
use facetally_core::pipeline::analysis_executor::AnalysisExecutor;
use facetally_core::pipeline::analyze_video_use_case::AnalyzeVideoUseCase;
use facetally_core::pipeline::frame_analyzer::FrameAnalyzer;
use facetally_core::pipeline::infrastructure::serial_analysis_executor::SerialAnalysisExecutor;
use facetally_core::pipeline::infrastructure::threaded_analysis_executor::ThreadedAnalysisExecutor;
use facetally_core::pipeline::pipeline_logger::{
    NullPipelineLogger, PipelineLogger, StdoutPipelineLogger,
};
use facetally_core::scoring::quality_scorer::QualityScorer;
use facetally_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use facetally_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Count the distinct people in a video and report when each appears.
#[derive(Parser)]
#[command(name = "facetally")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// SeetaFace detection model file (.bin).
    #[arg(long)]
    model: PathBuf,

    /// Directory where each person's best face crop is saved.
    #[arg(long, default_value = "faces")]
    faces_dir: PathBuf,

    /// JSON config file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analyze every Nth frame.
    #[arg(long)]
    sample_interval: Option<usize>,

    /// Similarity two faces must exceed to count as the same person (0.0-1.0).
    #[arg(long)]
    threshold: Option<f64>,

    /// Most people kept in the report.
    #[arg(long)]
    max_people: Option<usize>,

    /// Smallest face the detector will report, in pixels.
    #[arg(long, default_value = "20")]
    min_face_size: u32,

    /// Detection worker threads (0 = pick from available cores).
    #[arg(long)]
    workers: Option<usize>,

    /// Suppress progress output and the timing summary.
    #[arg(long)]
    quiet: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        let message = serde_json::json!({ "error": e.to_string() });
        println!("{message}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    validate(&cli, &config)?;

    let detector = SeetaFaceDetector::from_file(&cli.model, cli.min_face_size)?;

    let workers = match config.workers {
        0 => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        n => n,
    };
    log::info!("Using {workers} detection worker(s)");

    let analyzers: Vec<FrameAnalyzer> = (0..workers.max(1))
        .map(|_| {
            FrameAnalyzer::new(
                Box::new(detector.duplicate()),
                QualityScorer::new(config.quality),
                config.similarity.reference_size,
            )
        })
        .collect();

    let executor: Box<dyn AnalysisExecutor> = if workers <= 1 {
        Box::new(SerialAnalysisExecutor::new())
    } else {
        Box::new(ThreadedAnalysisExecutor::new())
    };

    let logger: Box<dyn PipelineLogger> = if cli.quiet {
        Box::new(NullPipelineLogger)
    } else {
        Box::new(StdoutPipelineLogger::default())
    };

    let progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>> = if cli.quiet {
        None
    } else {
        Some(Box::new(|current, total| {
            eprint!("\rScanning frame {current}/{total}");
            true
        }))
    };

    let mut use_case = AnalyzeVideoUseCase::new(
        Box::new(FfmpegReader::new()),
        analyzers,
        Box::new(ImageFileWriter::new()),
        executor,
        config,
        logger,
        progress,
        None,
    );

    let report = use_case.execute(&cli.input, &cli.faces_dir)?;
    if !cli.quiet {
        eprintln!();
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    log::info!(
        "Saved {} face crop(s) to {}",
        report.total_people,
        cli.faces_dir.display()
    );
    Ok(())
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    if let Some(interval) = cli.sample_interval {
        config.sample_interval = interval;
    }
    if let Some(threshold) = cli.threshold {
        config.dedup_threshold = threshold;
    }
    if let Some(max_people) = cli.max_people {
        config.max_people = max_people;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    Ok(config)
}

fn validate(cli: &Cli, config: &AnalysisConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !cli.model.exists() {
        return Err(format!("Model file not found: {}", cli.model.display()).into());
    }
    if !(0.0..=1.0).contains(&config.dedup_threshold) {
        return Err(format!(
            "Threshold must be between 0.0 and 1.0, got {}",
            config.dedup_threshold
        )
        .into());
    }
    if config.sample_interval == 0 {
        return Err("Sample interval must be at least 1".into());
    }
    if cli.min_face_size == 0 {
        return Err("Minimum face size must be at least 1 pixel".into());
    }
    Ok(())
}
