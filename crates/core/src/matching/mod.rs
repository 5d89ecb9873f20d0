pub mod similarity;
pub mod similarity_config;
