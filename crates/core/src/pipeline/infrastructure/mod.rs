pub mod reorder_buffer;
pub mod serial_analysis_executor;
pub mod threaded_analysis_executor;
