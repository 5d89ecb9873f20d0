pub mod analysis_config;
pub mod analysis_executor;
pub mod analyze_video_use_case;
pub mod frame_analyzer;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod report;
