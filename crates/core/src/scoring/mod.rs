pub mod completeness;
pub mod quality_config;
pub mod quality_scorer;
